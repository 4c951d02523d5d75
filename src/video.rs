#![forbid(unsafe_code)]

//! Canonical video records.
//!
//! Everything the presentation layer renders goes through [`normalize`]. It
//! accepts both the list-feed shape and the detail-page shape of upstream
//! items and always produces a fully populated record: no optional fields,
//! documented defaults (`0`, `""`, `false`) wherever the source is silent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duration::{DurationValue, format_duration, parse_duration_seconds};
use crate::images::first_image;
use crate::published::{UNKNOWN_PUBLISHED, format_published};
use crate::raw::{AuthorField, ChannelField, DurationField, IdField, Lenient, RawVideoItem};
use crate::text::{extract_text, first_text};
use crate::views::{count_field, format_views, view_count};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub views: u64,
    pub uploaded_at: String,
    pub duration_formatted: String,
    pub thumbnail: Thumbnail,
    pub channel: ChannelSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub id: String,
    pub name: String,
    pub verified: bool,
    pub avatar: String,
}

/// A canonical record plus the fields only the single-video page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: CanonicalVideo,
    /// Short display form of `views`, e.g. `"2,5 Mn"`.
    pub views_label: String,
    pub likes: u64,
    pub tags: Vec<String>,
    pub duration_seconds: u64,
    pub subscriber_count: u64,
    pub embed_url: String,
}

/// Normalizes an untyped upstream item.
pub fn normalize_value(value: &Value) -> CanonicalVideo {
    normalize(&RawVideoItem::from_value(value))
}

/// Builds the canonical record. Per field, feed-style names are consulted
/// before detail-style names, then the default applies.
pub fn normalize(item: &RawVideoItem) -> CanonicalVideo {
    CanonicalVideo {
        id: item.video_id(),
        title: extract_text(item.title.as_ref()),
        description: first_text([
            item.description_snippet.as_ref(),
            item.description.as_ref(),
            item.short_description.as_ref(),
        ]),
        views: view_count(item),
        uploaded_at: uploaded_at(item),
        duration_formatted: duration_label(item),
        thumbnail: Thumbnail {
            url: first_image([item.thumbnails.as_ref(), item.thumbnail.as_ref()]),
        },
        channel: ChannelSummary {
            id: channel_id(item),
            name: channel_name(item),
            verified: channel_verified(item),
            avatar: channel_avatar(item),
        },
    }
}

/// Normalizes a single-video payload. `requested_id` backfills the id when
/// the payload does not carry one and is used for the embed URL.
pub fn normalize_detail(item: &RawVideoItem, requested_id: &str) -> VideoDetail {
    let mut video = normalize(item);
    if video.id.is_empty() {
        video.id = requested_id.trim().to_string();
    }

    let duration_seconds = match item.duration {
        Some(DurationField::Seconds(seconds)) if seconds > 0.0 => seconds.floor() as u64,
        _ => parse_duration_seconds(&video.duration_formatted).unwrap_or(0),
    };
    let tags = item
        .tags
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(Lenient::get)
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    let subscriber_count = count_field(
        item.channel_info()
            .and_then(|channel| channel.subscriber_count.as_ref()),
    );
    let embed_url = if video.id.is_empty() {
        String::new()
    } else {
        format!("https://www.youtube.com/embed/{}", video.id)
    };

    VideoDetail {
        views_label: format_views(video.views),
        likes: count_field(item.like_count.as_ref()),
        tags,
        duration_seconds,
        subscriber_count,
        embed_url,
        video,
    }
}

fn uploaded_at(item: &RawVideoItem) -> String {
    let published = extract_text(item.published.as_ref());
    if !published.trim().is_empty() {
        return format_published(&published);
    }
    match item.publish_date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => format_published(date),
        _ => UNKNOWN_PUBLISHED.to_string(),
    }
}

/// `length_text`, then `durationFormatted`, then `duration`. Zero seconds is
/// what live streams report and reads as "no duration".
fn duration_label(item: &RawVideoItem) -> String {
    let length_text = extract_text(item.length_text.as_ref());
    if !length_text.is_empty() {
        return length_text;
    }
    if let Some(formatted) = item.duration_formatted.as_deref().filter(|text| !text.is_empty()) {
        return format_duration(Some(DurationValue::Text(formatted)));
    }
    match &item.duration {
        Some(DurationField::Seconds(seconds)) if *seconds >= 1.0 => {
            format_duration(Some(DurationValue::Seconds(seconds.floor() as u64)))
        }
        Some(DurationField::Text(text)) => text.to_plain(),
        _ => String::new(),
    }
}

fn channel_name(item: &RawVideoItem) -> String {
    let from_author = match &item.author {
        Some(AuthorField::Name(name)) => name.trim().to_string(),
        Some(AuthorField::Object(author)) => extract_text(author.name.as_ref()),
        None => String::new(),
    };
    if !from_author.is_empty() {
        return from_author;
    }
    match &item.channel {
        Some(ChannelField::Name(name)) => name.trim().to_string(),
        Some(ChannelField::Object(channel)) => extract_text(channel.name.as_ref()),
        None => String::new(),
    }
}

fn channel_verified(item: &RawVideoItem) -> bool {
    let author = item.author_info().and_then(|author| author.is_verified);
    let channel = item.channel_info();
    author.unwrap_or(false)
        || channel.and_then(|channel| channel.verified).unwrap_or(false)
        || channel.and_then(|channel| channel.is_verified).unwrap_or(false)
}

fn channel_avatar(item: &RawVideoItem) -> String {
    let author = item.author_info();
    let channel = item.channel_info();
    first_image([
        author.and_then(|author| author.thumbnails.as_ref()),
        author.and_then(|author| author.best_thumbnail.as_ref()),
        channel.and_then(|channel| channel.avatar.as_ref()),
        channel.and_then(|channel| channel.thumbnail.as_ref()),
        channel
            .and_then(|channel| channel.author.as_ref())
            .and_then(|author| author.best_thumbnail.as_ref()),
    ])
}

fn channel_id(item: &RawVideoItem) -> String {
    [
        item.author_info().and_then(|author| author.id.as_ref()),
        item.channel_info().and_then(|channel| channel.id.as_ref()),
        item.channel_id.as_ref(),
    ]
    .into_iter()
    .flatten()
    .map(IdField::to_id)
    .find(|id| !id.is_empty())
    .unwrap_or_default()
}
