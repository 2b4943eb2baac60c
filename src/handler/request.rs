use smallvec::SmallVec;
use std::{cmp::Ordering, collections::HashMap};

/// Wrapper type for route parameters.
#[derive(Debug, Clone, Default)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub(crate) fn from_matched(params: &matchit::Params<'_, '_>) -> Self {
        Self(
            params
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        )
    }

    /// Returns a parameter by key as `Option<&str>`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if the specified key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of stored parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// One entry of an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTag {
    tag: String,
    quality: f32,
}

impl LanguageTag {
    pub fn as_str(&self) -> &str {
        &self.tag
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// The primary subtag, `fr` for `fr-CA`.
    pub fn primary(&self) -> &str {
        self.tag.split('-').next().unwrap_or(&self.tag)
    }
}

impl AsRef<str> for LanguageTag {
    fn as_ref(&self) -> &str {
        &self.tag
    }
}

/// Languages a client accepts, most preferred first.
///
/// Entries with equal quality keep their header order. `q=0` entries are
/// dropped and an unparsable quality counts as `1`.
#[derive(Debug, Clone, Default)]
pub struct AcceptLanguage(SmallVec<[LanguageTag; 4]>);

impl AcceptLanguage {
    pub fn parse(header: &str) -> Self {
        let mut tags: SmallVec<[LanguageTag; 4]> = header
            .split(',')
            .filter_map(|item| {
                let mut parts = item.split(';');
                let tag = parts.next()?.trim();
                if tag.is_empty() {
                    return None;
                }

                let quality = parts
                    .find_map(|param| param.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().unwrap_or(1.0))
                    .unwrap_or(1.0)
                    .min(1.0);

                (quality > 0.0).then(|| LanguageTag {
                    tag: tag.to_owned(),
                    quality,
                })
            })
            .collect();

        // sort_by is stable
        tags.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
        Self(tags)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LanguageTag> {
        self.0.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(LanguageTag::as_str)
    }

    pub fn first(&self) -> Option<&LanguageTag> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a AcceptLanguage {
    type Item = &'a LanguageTag;
    type IntoIter = std::slice::Iter<'a, LanguageTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for AcceptLanguage {
    type Item = LanguageTag;
    type IntoIter = smallvec::IntoIter<[LanguageTag; 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
