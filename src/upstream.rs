#![forbid(unsafe_code)]

//! The upstream video-platform client seam.
//!
//! The scraping client itself is an opaque collaborator. [`UpstreamClient`]
//! is what the feed layer depends on; [`HttpUpstream`] implements it against
//! a bridge process that hosts the scraping client and answers in JSON.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::UpstreamSettings;
use crate::text::extract_text_value;

/// Result type filter for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Video,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Video => "video",
        }
    }
}

/// Length filter for searches; `Short` is under four minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFilter {
    Short,
}

impl DurationFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationFilter::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub kind: Option<SearchKind>,
    pub duration: Option<DurationFilter>,
}

impl SearchFilters {
    pub fn videos() -> Self {
        Self {
            kind: Some(SearchKind::Video),
            duration: None,
        }
    }

    pub fn short_videos() -> Self {
        Self {
            kind: Some(SearchKind::Video),
            duration: Some(DurationFilter::Short),
        }
    }
}

/// Operations the feed layer needs from the upstream platform.
///
/// Feeds return raw, heterogeneous items. Single-item lookups return `None`
/// when the platform has no such item; every other failure is an error.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn home_feed(&self) -> Result<Vec<Value>>;

    async fn trending(&self) -> Result<Vec<Value>>;

    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Value>>;

    async fn video_info(&self, id: &str) -> Result<Option<Value>>;

    async fn shorts_info(&self, id: &str) -> Result<Option<Value>>;

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>>;
}

/// JSON-over-HTTP client for the scraping bridge.
///
/// ureq is blocking, so every call hops onto the blocking thread pool.
#[derive(Clone)]
pub struct HttpUpstream {
    agent: ureq::Agent,
    settings: UpstreamSettings,
}

impl HttpUpstream {
    pub fn new(settings: UpstreamSettings, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, settings }
    }

    /// Session parameters sent with every request.
    fn session_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("location", self.settings.location.clone()),
            ("lang", self.settings.lang.clone()),
            ("client_type", self.settings.client_type.clone()),
            ("session_cache", self.settings.enable_session_cache.to_string()),
            ("safety_mode", self.settings.enable_safety_mode.to_string()),
        ]
    }

    /// GETs `path` and decodes the JSON body. A 404 maps to `Ok(None)`.
    async fn get_json(
        &self,
        path: String,
        params: Vec<(&'static str, String)>,
    ) -> Result<Option<Value>> {
        let url = format!("{}{}", self.settings.base_url, path);
        let agent = self.agent.clone();
        let mut query = self.session_params();
        query.extend(params);

        debug!(%url, "upstream request");
        tokio::task::spawn_blocking(move || {
            let mut request = agent.get(&url);
            for (key, value) in &query {
                request = request.query(key, value);
            }
            match request.call() {
                Ok(response) => response
                    .into_json::<Value>()
                    .map(Some)
                    .with_context(|| format!("decoding upstream response from {url}")),
                Err(ureq::Error::Status(404, _)) => Ok(None),
                Err(ureq::Error::Status(code, _)) => {
                    Err(anyhow!("upstream returned HTTP {code} for {url}"))
                }
                Err(err) => Err(anyhow!(err).context(format!("requesting {url}"))),
            }
        })
        .await
        .context("upstream request task failed")?
    }

    async fn get_items(&self, path: &str, params: Vec<(&'static str, String)>) -> Result<Vec<Value>> {
        let body = self
            .get_json(path.to_string(), params)
            .await?
            .ok_or_else(|| anyhow!("upstream endpoint {path} not found"))?;
        Ok(extract_items(body))
    }
}

/// Feed endpoints answer either with a bare array or with `{ "videos": [...] }`.
fn extract_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("videos") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn extract_suggestions(body: Value) -> Vec<String> {
    let items = match body {
        Value::Object(mut map) => map.remove("suggestions").unwrap_or(Value::Null),
        other => other,
    };
    match items {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => text,
                other => extract_text_value(&other),
            })
            .filter(|text| !text.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn id_path(prefix: &str, id: &str) -> Result<String> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!("refusing to request invalid id {id:?}"));
    }
    Ok(format!("{prefix}/{id}"))
}

fn search_params(query: &str, filters: &SearchFilters) -> Vec<(&'static str, String)> {
    let mut params = vec![("q", query.to_string())];
    if let Some(kind) = filters.kind {
        params.push(("type", kind.as_str().to_string()));
    }
    if let Some(duration) = filters.duration {
        params.push(("duration", duration.as_str().to_string()));
    }
    params
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn home_feed(&self) -> Result<Vec<Value>> {
        self.get_items("/home", Vec::new()).await
    }

    async fn trending(&self) -> Result<Vec<Value>> {
        self.get_items("/trending", Vec::new()).await
    }

    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Value>> {
        self.get_items("/search", search_params(query, filters)).await
    }

    async fn video_info(&self, id: &str) -> Result<Option<Value>> {
        self.get_json(id_path("/video", id)?, Vec::new()).await
    }

    async fn shorts_info(&self, id: &str) -> Result<Option<Value>> {
        self.get_json(id_path("/shorts", id)?, Vec::new()).await
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>> {
        let body = self
            .get_json("/suggestions".to_string(), vec![("q", query.to_string())])
            .await?
            .unwrap_or(Value::Null);
        Ok(extract_suggestions(body))
    }
}
