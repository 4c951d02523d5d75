#![forbid(unsafe_code)]

//! Feed assembly on top of an [`UpstreamClient`].
//!
//! Primary fetches (the list itself, the requested item) propagate upstream
//! failures. Related-content fetches never do: each step of a fallback chain
//! is tried in order, the first step that yields items wins, and an exhausted
//! chain produces an empty list.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::raw::RawVideoItem;
use crate::shorts::is_short;
use crate::upstream::{SearchFilters, UpstreamClient};
use crate::video::{CanonicalVideo, VideoDetail, normalize, normalize_detail, normalize_value};

pub const HOME_FEED_CAP: usize = 20;
pub const TRENDING_CAP: usize = 50;
pub const SEARCH_DEFAULT_LIMIT: usize = 20;
pub const SEARCH_MAX_LIMIT: usize = 50;
pub const SHORTS_DEFAULT_LIMIT: usize = 100;
pub const SHORTS_QUERY: &str = "shorts";
pub const RELATED_SHORTS_CAP: usize = 10;
pub const RELATED_VIDEOS_CAP: usize = 15;
pub const FALLBACK_RELATED_QUERY: &str = "music";
pub const EMPTY_HOME_MESSAGE: &str = "Ana sayfa boş görünüyor. Arama yaparak başlayın!";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub videos: Vec<CanonicalVideo>,
    pub is_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeedPage {
    fn new(videos: Vec<CanonicalVideo>) -> Self {
        Self {
            is_empty: videos.is_empty(),
            videos,
            message: None,
        }
    }
}

/// Single-item page: the item plus related items (shorts and videos alike).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPage {
    pub video: VideoDetail,
    pub related_videos: Vec<CanonicalVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
}

/// Per-request orchestration over a borrowed client handle.
pub struct FeedAggregator<'a, C: UpstreamClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: UpstreamClient + ?Sized> FeedAggregator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Home feed, at most 20 items however large `limit` is.
    pub async fn home(&self, limit: Option<usize>) -> FeedResult<FeedPage> {
        let limit = limit.unwrap_or(HOME_FEED_CAP).min(HOME_FEED_CAP);
        let items = self.client.home_feed().await?;
        let mut page = FeedPage::new(take_normalized(items, limit));
        if page.is_empty {
            page.message = Some(EMPTY_HOME_MESSAGE.to_string());
        }
        Ok(page)
    }

    pub async fn trending(&self) -> FeedResult<FeedPage> {
        let items = self.client.trending().await?;
        Ok(FeedPage::new(take_normalized(items, TRENDING_CAP)))
    }

    /// Video search. `limit` defaults to 20 and is capped at 50.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> FeedResult<FeedPage> {
        let query = required("query", query)?;
        let limit = limit.unwrap_or(SEARCH_DEFAULT_LIMIT).min(SEARCH_MAX_LIMIT);
        let items = self.client.search(query, &SearchFilters::videos()).await?;
        Ok(FeedPage::new(take_normalized(items, limit)))
    }

    /// Short-form listing: a fixed search narrowed by the overlay heuristic.
    pub async fn shorts(&self, limit: Option<usize>) -> FeedResult<FeedPage> {
        let limit = limit.unwrap_or(SHORTS_DEFAULT_LIMIT);
        let items = self
            .client
            .search(SHORTS_QUERY, &SearchFilters::short_videos())
            .await?;
        let videos = items
            .iter()
            .map(RawVideoItem::from_value)
            .filter(is_short)
            .take(limit)
            .map(|item| normalize(&item))
            .collect();
        Ok(FeedPage::new(videos))
    }

    pub async fn short_detail(&self, id: &str) -> FeedResult<DetailPage> {
        let id = media_id(id)?;
        let payload = self
            .client
            .shorts_info(id)
            .await?
            .ok_or_else(|| FeedError::NotFound(format!("short {id}")))?;
        let video = normalize_detail(&RawVideoItem::from_value(&payload), id);
        let related_videos = self.related_shorts(id).await;
        Ok(DetailPage {
            video,
            related_videos,
        })
    }

    pub async fn video_detail(&self, id: &str) -> FeedResult<DetailPage> {
        let id = media_id(id)?;
        let payload = self
            .client
            .video_info(id)
            .await?
            .ok_or_else(|| FeedError::NotFound(format!("video {id}")))?;
        let video = normalize_detail(&RawVideoItem::from_value(&payload), id);
        let related_videos = self.related_videos(&video.video.title).await;
        Ok(DetailPage {
            video,
            related_videos,
        })
    }

    pub async fn suggestions(&self, query: &str) -> FeedResult<Suggestions> {
        let query = required("query", query)?;
        let suggestions = self.client.search_suggestions(query).await?;
        Ok(Suggestions { suggestions })
    }

    /// Other shorts from the shorts search, minus the one being viewed.
    async fn related_shorts(&self, current_id: &str) -> Vec<CanonicalVideo> {
        match self
            .client
            .search(SHORTS_QUERY, &SearchFilters::short_videos())
            .await
        {
            Ok(items) => items
                .iter()
                .map(RawVideoItem::from_value)
                .filter(|item| item.video_id() != current_id)
                .take(RELATED_SHORTS_CAP)
                .map(|item| normalize(&item))
                .collect(),
            Err(err) => {
                warn!(id = %current_id, error = %format!("{err:#}"), "related shorts unavailable");
                Vec::new()
            }
        }
    }

    /// Title-derived search first, then the home feed.
    async fn related_videos(&self, title: &str) -> Vec<CanonicalVideo> {
        let query = related_query(title);
        match self.client.search(&query, &SearchFilters::videos()).await {
            Ok(items) if !items.is_empty() => return take_normalized(items, RELATED_VIDEOS_CAP),
            Ok(_) => debug!(%query, "related search returned nothing, using home feed"),
            Err(err) => {
                warn!(%query, error = %format!("{err:#}"), "related search failed, using home feed")
            }
        }

        match self.client.home_feed().await {
            Ok(items) => take_normalized(items, RELATED_VIDEOS_CAP),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "home feed fallback failed, no related videos");
                Vec::new()
            }
        }
    }
}

/// First three words of the title, or a generic query for untitled items.
pub fn related_query(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().take(3).collect();
    if words.is_empty() {
        FALLBACK_RELATED_QUERY.to_string()
    } else {
        words.join(" ")
    }
}

fn take_normalized(items: Vec<Value>, limit: usize) -> Vec<CanonicalVideo> {
    items.iter().take(limit).map(normalize_value).collect()
}

fn required<'q>(name: &str, value: &'q str) -> FeedResult<&'q str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FeedError::InvalidRequest(format!("{name} is required")));
    }
    Ok(trimmed)
}

/// Ids are opaque platform tokens made of URL-safe characters.
fn media_id(value: &str) -> FeedResult<&str> {
    let id = required("id", value)?;
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FeedError::InvalidRequest(format!("invalid id {id:?}")));
    }
    Ok(id)
}
