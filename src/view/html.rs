//! Small helpers for templates written as Rust functions.

use serde_json::Value;

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Looks up a dotted path such as `values.email`.
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |value, key| value.get(key))
}

/// The value at `path` rendered as escaped text; empty when missing or null.
pub fn text(data: &Value, path: &str) -> String {
    match lookup(data, path) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => escape(s),
        Some(other) => escape(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_text_follows_paths() {
        let data = json!({ "values": { "email": "a<b" }, "count": 3, "none": null });

        assert_eq!(text(&data, "values.email"), "a&lt;b");
        assert_eq!(text(&data, "count"), "3");
        assert_eq!(text(&data, "none"), "");
        assert_eq!(text(&data, "values.missing"), "");
    }
}
