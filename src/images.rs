#![forbid(unsafe_code)]

//! Thumbnail and avatar URL resolution.

use serde::{Deserialize, Deserializer};

use crate::raw::{Lenient, lenient};

/// Image candidates in any of the shapes the upstream uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    /// Ordered by quality; the first entry has the highest priority.
    Many(Vec<Lenient<ImageDescriptor>>),
    One(ImageDescriptor),
    Url(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<u32>,
}

impl ImageDescriptor {
    fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

impl ImageField {
    /// URL of the first candidate that actually carries one.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            ImageField::Many(candidates) => candidates
                .iter()
                .filter_map(Lenient::get)
                .find_map(ImageDescriptor::usable_url),
            ImageField::One(descriptor) => descriptor.usable_url(),
            ImageField::Url(url) => Some(url.trim()).filter(|url| !url.is_empty()),
        }
    }
}

/// Field adapter for list-only image fields: anything but a list reads as
/// absent.
pub(crate) fn image_list<'de, D>(deserializer: D) -> Result<Option<ImageField>, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<ImageField> = lenient(deserializer)?;
    Ok(field.filter(|field| matches!(field, ImageField::Many(_))))
}

/// Walks a fallback chain of optional image fields and returns the first
/// resolvable URL, or an empty string.
pub fn first_image<'a>(chain: impl IntoIterator<Item = Option<&'a ImageField>>) -> String {
    chain
        .into_iter()
        .flatten()
        .find_map(ImageField::resolve)
        .map(str::to_string)
        .unwrap_or_default()
}
