//! Translated validation messages.
//!
//! A [`Catalog`] is picked from the client's accepted languages: each tag is
//! tried as is, then by its primary subtag (`fr-CA` → `fr`). English is used
//! when nothing matches.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageKey {
    Required,
    Email,
    MinLength,
    MaxLength,
}

/// Message templates of one language. `{field}` and `{param}` are
/// substituted when a message is built.
#[derive(Debug)]
pub struct Catalog {
    lang: &'static str,
    required: &'static str,
    email: &'static str,
    min_length: &'static str,
    max_length: &'static str,
}

pub const DEFAULT_LANGUAGE: &str = "en";

static CATALOGS: Lazy<FxHashMap<&'static str, Catalog>> = Lazy::new(|| {
    let catalogs = [
        Catalog {
            lang: "en",
            required: "{field} is a required field",
            email: "{field} must be a valid email address",
            min_length: "{field} must be at least {param} characters in length",
            max_length: "{field} must be a maximum of {param} characters in length",
        },
        Catalog {
            lang: "fr",
            required: "{field} est un champ obligatoire",
            email: "{field} doit être une adresse email valide",
            min_length: "{field} doit faire une taille minimum de {param} caractères",
            max_length: "{field} doit faire une taille maximum de {param} caractères",
        },
        Catalog {
            lang: "de",
            required: "{field} ist ein Pflichtfeld",
            email: "{field} muss eine gültige E-Mail-Adresse sein",
            min_length: "{field} muss mindestens {param} Zeichen lang sein",
            max_length: "{field} darf maximal {param} Zeichen lang sein",
        },
        Catalog {
            lang: "zh",
            required: "{field}为必填字段",
            email: "{field}必须是一个有效的邮箱",
            min_length: "{field}长度必须至少为{param}个字符",
            max_length: "{field}长度不能超过{param}个字符",
        },
    ];

    catalogs
        .into_iter()
        .map(|catalog| (catalog.lang, catalog))
        .collect()
});

impl Catalog {
    pub fn lang(&self) -> &'static str {
        self.lang
    }

    pub(crate) fn message(&self, key: MessageKey, field: &str, param: Option<usize>) -> String {
        let template = match key {
            MessageKey::Required => self.required,
            MessageKey::Email => self.email,
            MessageKey::MinLength => self.min_length,
            MessageKey::MaxLength => self.max_length,
        };

        let message = template.replace("{field}", field);
        match param {
            Some(param) => message.replace("{param}", &param.to_string()),
            None => message,
        }
    }
}

fn lookup(tag: &str) -> Option<&'static Catalog> {
    let tag = tag.trim().to_ascii_lowercase();
    if let Some(catalog) = CATALOGS.get(tag.as_str()) {
        return Some(catalog);
    }

    let primary = tag.split(['-', '_']).next()?;
    CATALOGS.get(primary)
}

/// Catalog for the first supported tag, English otherwise.
pub fn resolve<I>(tags: I) -> &'static Catalog
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    tags.into_iter()
        .find_map(|tag| lookup(tag.as_ref()))
        .unwrap_or_else(|| &CATALOGS[DEFAULT_LANGUAGE])
}

/// Languages messages are available in.
pub fn supported() -> impl Iterator<Item = &'static str> {
    CATALOGS.keys().copied()
}
