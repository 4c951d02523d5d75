#![forbid(unsafe_code)]

//! Lenient model of the items returned by the upstream scraping client.
//!
//! The upstream emits different shapes for list feeds (search, home,
//! trending) and for single-item lookups, and individual fields switch
//! between several encodings. Every field below is optional and decoded
//! through [`lenient`], so a value of an unexpected type simply reads as
//! absent instead of rejecting the whole item.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::images::{ImageField, image_list};
use crate::text::RichText;

/// Decodes a field and swallows type mismatches, turning them into `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Element wrapper for collections where one malformed entry must not
/// discard its well-formed siblings.
#[derive(Debug, Clone)]
pub struct Lenient<T>(pub Option<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self(serde_json::from_value(value).ok()))
    }
}

impl<T> Lenient<T> {
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

/// Identifiers arrive as strings most of the time, occasionally as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Text(String),
    Number(i64),
}

impl IdField {
    pub fn to_id(&self) -> String {
        match self {
            IdField::Text(value) => value.trim().to_string(),
            IdField::Number(value) => value.to_string(),
        }
    }
}

/// A counter that is either an exact number or a localized display string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CountField {
    Number(f64),
    Text(RichText),
}

impl CountField {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CountField::Number(value) => Some(*value),
            CountField::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&RichText> {
        match self {
            CountField::Number(_) => None,
            CountField::Text(text) => Some(text),
        }
    }
}

/// `duration` is raw seconds on most items but a `{ text }` object on some
/// related-item payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Seconds(f64),
    Text(RichText),
}

/// Channel information as it appears on feed items (`author`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    Name(String),
    Object(AuthorInfo),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<IdField>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<RichText>,
    #[serde(default, deserialize_with = "image_list")]
    pub thumbnails: Option<ImageField>,
    #[serde(default, deserialize_with = "lenient")]
    pub best_thumbnail: Option<ImageField>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_verified: Option<bool>,
}

/// Channel information as it appears on detail payloads and on records that
/// were already normalized once (`channel`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelField {
    Name(String),
    Object(ChannelInfo),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<IdField>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub avatar: Option<ImageField>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<ImageField>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<AuthorInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub subscriber_count: Option<CountField>,
}

/// One badge drawn on top of a thumbnail (duration, "SHORTS", "LIVE", ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailOverlay {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub style: Option<String>,
}

/// Everything the normalizer and the classifier may look at on an upstream
/// item. Feed-style and detail-style names live side by side; see
/// [`crate::video::normalize`] for the order they are consulted in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVideoItem {
    #[serde(default, deserialize_with = "lenient")]
    pub video_id: Option<IdField>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<IdField>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub description_snippet: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_description: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub view_count: Option<CountField>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_view_count: Option<CountField>,
    #[serde(default, deserialize_with = "lenient")]
    pub views: Option<CountField>,
    #[serde(default, deserialize_with = "lenient")]
    pub like_count: Option<CountField>,
    #[serde(default, deserialize_with = "lenient")]
    pub published: Option<RichText>,
    #[serde(default, deserialize_with = "lenient")]
    pub publish_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub length_text: Option<RichText>,
    #[serde(default, rename = "durationFormatted", deserialize_with = "lenient")]
    pub duration_formatted: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<DurationField>,
    #[serde(default, deserialize_with = "image_list")]
    pub thumbnails: Option<ImageField>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<ImageField>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<AuthorField>,
    #[serde(default, deserialize_with = "lenient")]
    pub channel: Option<ChannelField>,
    #[serde(default, deserialize_with = "lenient")]
    pub channel_id: Option<IdField>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<Vec<Lenient<String>>>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail_overlays: Option<Vec<Lenient<ThumbnailOverlay>>>,
}

impl RawVideoItem {
    /// Builds an item from any JSON value. Non-objects produce an empty item.
    ///
    /// Detail payloads keep their fields under `basic_info`; those are lifted
    /// to the top level wherever the top level has nothing (or `null`) for
    /// the same key.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let mut merged: Map<String, Value> = map.clone();
        if let Some(Value::Object(basic_info)) = map.get("basic_info") {
            for (key, nested) in basic_info {
                if merged.get(key).is_none_or(Value::is_null) {
                    merged.insert(key.clone(), nested.clone());
                }
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    /// First identifiable id, feed-style `video_id` before `id`.
    pub fn video_id(&self) -> String {
        [self.video_id.as_ref(), self.id.as_ref()]
            .into_iter()
            .flatten()
            .map(IdField::to_id)
            .find(|id| !id.is_empty())
            .unwrap_or_default()
    }

    pub fn author_info(&self) -> Option<&AuthorInfo> {
        match self.author.as_ref()? {
            AuthorField::Name(_) => None,
            AuthorField::Object(info) => Some(info),
        }
    }

    pub fn channel_info(&self) -> Option<&ChannelInfo> {
        match self.channel.as_ref()? {
            ChannelField::Name(_) => None,
            ChannelField::Object(info) => Some(info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_values_produce_empty_items() {
        for value in [json!(null), json!(42), json!("abc"), json!([1, 2])] {
            let item = RawVideoItem::from_value(&value);
            assert!(item.title.is_none());
            assert_eq!(item.video_id(), "");
        }
    }

    #[test]
    fn mistyped_fields_read_as_absent() {
        let item = RawVideoItem::from_value(&json!({
            "video_id": { "nested": true },
            "id": "abc123",
            "title": 17,
            "thumbnails": "not-a-list",
            "tags": ["music", 5, "live"],
        }));
        assert_eq!(item.video_id(), "abc123");
        assert!(item.title.is_none());
        assert!(item.thumbnails.is_none());
        let tags: Vec<_> = item
            .tags
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(Lenient::get)
            .cloned()
            .collect();
        assert_eq!(tags, vec!["music".to_string(), "live".to_string()]);
    }

    #[test]
    fn basic_info_fields_are_lifted_without_overriding_top_level() {
        let item = RawVideoItem::from_value(&json!({
            "title": "Top level",
            "description": null,
            "basic_info": {
                "id": "xyz",
                "title": "Nested",
                "description": "From basic info",
            },
        }));
        assert_eq!(item.video_id(), "xyz");
        assert!(matches!(item.title, Some(RichText::Plain(ref t)) if t == "Top level"));
        assert!(matches!(item.description, Some(RichText::Plain(ref t)) if t == "From basic info"));
    }

    #[test]
    fn list_only_image_fields_reject_other_shapes() {
        let item = RawVideoItem::from_value(&json!({
            "thumbnails": { "url": "single.jpg" },
            "thumbnail": "fallback.jpg",
            "author": { "thumbnails": "avatar.jpg", "best_thumbnail": { "url": "best.jpg" } },
        }));
        assert!(item.thumbnails.is_none());
        assert!(item.thumbnail.is_some());
        let author = item.author_info().unwrap();
        assert!(author.thumbnails.is_none());
        assert!(author.best_thumbnail.is_some());
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let item = RawVideoItem::from_value(&json!({ "id": 1234 }));
        assert_eq!(item.video_id(), "1234");
    }

    #[test]
    fn author_may_be_a_plain_name() {
        let item = RawVideoItem::from_value(&json!({ "author": "Plain Channel" }));
        assert!(matches!(item.author, Some(AuthorField::Name(ref n)) if n == "Plain Channel"));
        assert!(item.author_info().is_none());
    }
}
