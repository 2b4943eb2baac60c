//! Form binding and validation.
//!
//! A [`BoundForm`] decodes a urlencoded body into a typed value, keeps the
//! raw submitted pairs for re-rendering, and collects localized errors from
//! the rules its [`FormSchema`] declares.

use crate::handler::Context;
use hyper::header::CONTENT_TYPE;
use mime_guess::mime::{self, Mime};
use serde::{Serialize, Serializer, de::DeserializeOwned};
use std::collections::BTreeMap;

mod error;
pub mod locale;
mod rules;

pub use error::DecodeError;
pub use rules::{FieldSpec, Rule};

/// A type that can be bound from a posted form.
///
/// `FIELDS` lists the validated fields in the order their rules run.
///
/// ```
/// use serde::Deserialize;
/// use viewchain::form::{FieldSpec, FormSchema, Rule};
///
/// #[derive(Deserialize)]
/// struct Signup {
///     email: String,
/// }
///
/// impl FormSchema for Signup {
///     const FIELDS: &'static [FieldSpec] =
///         &[FieldSpec::new("email", "Email").rules(&[Rule::Required, Rule::Email])];
/// }
/// ```
pub trait FormSchema: DeserializeOwned {
    const FIELDS: &'static [FieldSpec];

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|spec| spec.name == name)
    }
}

/// A message attached to a form; `field` is `None` for form-level messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug)]
pub struct BoundForm<T> {
    pub data: T,
    raw: Vec<(String, String)>,
    errors: Vec<FieldError>,
}

impl<T: FormSchema> BoundForm<T> {
    /// Decodes the request body of `ctx`.
    pub fn bind(ctx: &Context) -> Result<Self, DecodeError> {
        Self::decode(ctx.header(CONTENT_TYPE), ctx.body())
    }

    /// Decodes a urlencoded `body`. A missing content type is accepted.
    pub fn decode(content_type: Option<&str>, body: &[u8]) -> Result<Self, DecodeError> {
        if let Some(content_type) = content_type {
            check_content_type(content_type)?;
        }

        let body = std::str::from_utf8(body).map_err(|_| DecodeError::InvalidUtf8)?;
        let data: T = serde_urlencoded::from_str(body)?;
        let raw = form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();

        Ok(Self {
            data,
            raw,
            errors: Vec::new(),
        })
    }

    /// Runs the declared rules and returns whether the form is valid.
    ///
    /// Each field reports only its first failing rule; every field is
    /// checked. Messages use the first of `langs` with a catalog. Errors
    /// from a previous call are replaced, messages added by hand are kept.
    pub fn validate<I>(&mut self, langs: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let catalog = locale::resolve(langs);
        self.errors.retain(|error| error.field.is_none());

        for spec in T::FIELDS {
            let failure = spec.first_failure(self.raw_value(spec.name).unwrap_or_default());
            if let Some(rule) = failure {
                self.errors.push(FieldError {
                    field: Some(spec.name.to_owned()),
                    message: catalog.message(rule.message_key(), spec.label, rule.param()),
                });
            }
        }

        self.is_valid()
    }

    /// Submitted value of `field`, `None` for secret fields.
    pub fn value(&self, field: &str) -> Option<&str> {
        if T::field(field).is_some_and(|spec| spec.secret) {
            return None;
        }
        self.raw_value(field)
    }

    /// What a view needs to re-render the form.
    pub fn view(&self) -> FormView {
        let mut view = FormView {
            valid: self.is_valid(),
            ..FormView::default()
        };

        for (name, value) in &self.raw {
            if T::field(name).is_some_and(|spec| spec.secret) {
                continue;
            }
            view.values.entry(name.clone()).or_insert_with(|| value.clone());
        }

        for error in &self.errors {
            match &error.field {
                Some(field) => {
                    view.errors
                        .entry(field.clone())
                        .or_insert_with(|| error.message.clone());
                }
                None => view.messages.push(error.message.clone()),
            }
        }

        view
    }
}

impl<T> BoundForm<T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field.as_deref() == Some(field))
            .map(|error| error.message.as_str())
    }

    /// Every message, field and form-level, in the order they were added.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|error| error.message.as_str())
    }

    /// Attaches a form-level message, e.g. rejected credentials.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    /// Attaches a message to `field`, e.g. an address that is already taken.
    /// The next `validate` replaces it along with the rule failures.
    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: Some(field.into()),
            message: message.into(),
        });
    }

    fn raw_value(&self, field: &str) -> Option<&str> {
        self.raw
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }
}

impl<T: FormSchema> Serialize for BoundForm<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}

/// Serializable snapshot of a form: submitted non-secret values, the first
/// error per field and form-level messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
    pub messages: Vec<String>,
    pub valid: bool,
}

impl Default for FormView {
    /// The empty form of an initial GET.
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
            messages: Vec::new(),
            valid: true,
        }
    }
}

fn check_content_type(content_type: &str) -> Result<(), DecodeError> {
    let unsupported = || DecodeError::UnsupportedContentType(content_type.to_owned());
    let parsed: Mime = content_type.parse().map_err(|_| unsupported())?;

    if parsed.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        Ok(())
    } else {
        Err(unsupported())
    }
}
