use super::locale::MessageKey;

/// A single check applied to the raw submitted value of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must contain something other than whitespace.
    Required,
    /// Value must look like an email address. Blank values pass.
    Email,
    /// At least `n` characters. Blank values pass.
    MinLength(usize),
    /// At most `n` characters. Blank values pass.
    MaxLength(usize),
}

impl Rule {
    pub fn check(&self, value: &str) -> bool {
        if value.trim().is_empty() {
            return !matches!(self, Rule::Required);
        }

        match *self {
            Rule::Required => true,
            Rule::Email => is_email(value),
            Rule::MinLength(n) => value.chars().count() >= n,
            Rule::MaxLength(n) => value.chars().count() <= n,
        }
    }

    pub(crate) fn message_key(&self) -> MessageKey {
        match self {
            Rule::Required => MessageKey::Required,
            Rule::Email => MessageKey::Email,
            Rule::MinLength(_) => MessageKey::MinLength,
            Rule::MaxLength(_) => MessageKey::MaxLength,
        }
    }

    pub(crate) fn param(&self) -> Option<usize> {
        match *self {
            Rule::MinLength(n) | Rule::MaxLength(n) => Some(n),
            _ => None,
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };

    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

/// Declares one field of a form: the name it is posted under, the label used
/// in messages and the rules it must pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rules: &'static [Rule],
    /// Secret values are never echoed back to the client.
    pub secret: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            rules: &[],
            secret: false,
        }
    }

    pub const fn rules(self, rules: &'static [Rule]) -> Self {
        Self { rules, ..self }
    }

    pub const fn secret(self) -> Self {
        Self {
            secret: true,
            ..self
        }
    }

    /// First rule `value` fails, if any.
    pub fn first_failure(&self, value: &str) -> Option<Rule> {
        self.rules.iter().copied().find(|rule| !rule.check(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(Rule::Required.check("a"));
        assert!(!Rule::Required.check(""));
        assert!(!Rule::Required.check("   "));
    }

    #[test]
    fn test_email() {
        assert!(Rule::Email.check("xun@example.com"));
        assert!(Rule::Email.check("first.last+tag@sub.example.org"));
        assert!(!Rule::Email.check("not-an-email"));
        assert!(!Rule::Email.check("a@b"));
        assert!(!Rule::Email.check("a@@example.com"));
        assert!(!Rule::Email.check("a b@example.com"));
        assert!(!Rule::Email.check("@example.com"));
        assert!(!Rule::Email.check("a@example..com"));
        // blank values are left to `Required`
        assert!(Rule::Email.check(""));
    }

    #[test]
    fn test_lengths_count_characters() {
        assert!(Rule::MinLength(3).check("äöü"));
        assert!(!Rule::MinLength(4).check("äöü"));
        assert!(Rule::MaxLength(3).check("äöü"));
        assert!(!Rule::MaxLength(2).check("äöü"));
        assert!(Rule::MinLength(8).check(""));
    }

    #[test]
    fn test_first_failure_is_in_declaration_order() {
        const EMAIL: FieldSpec = FieldSpec::new("email", "Email").rules(&[Rule::Required, Rule::Email]);

        assert_eq!(EMAIL.first_failure(""), Some(Rule::Required));
        assert_eq!(EMAIL.first_failure("nope"), Some(Rule::Email));
        assert_eq!(EMAIL.first_failure("xun@example.com"), None);
    }
}
