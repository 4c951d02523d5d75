#![forbid(unsafe_code)]

//! Axum backend exposing the normalized feeds as JSON.
//!
//! Handlers stay thin: parse the query, run one feed operation under the
//! request timeout, map the outcome to a response. All decisions about
//! fallbacks and defaults live in the library.

use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use axum::{
    Json, Router,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::Deserialize;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tubefeed::config::{RuntimeOverrides, resolve_runtime_settings};
use tubefeed::feed::{DetailPage, FeedAggregator, FeedError, FeedPage, FeedResult, Suggestions};
use tubefeed::upstream::{HttpUpstream, UpstreamClient};

#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Serves normalized video feeds as JSON")]
struct BackendArgs {
    /// Listen address (overrides TUBEFEED_HOST).
    #[arg(long)]
    host: Option<String>,
    /// Listen port (overrides TUBEFEED_PORT).
    #[arg(long)]
    port: Option<u16>,
    /// Base URL of the scraping bridge (overrides UPSTREAM_URL).
    #[arg(long)]
    upstream_url: Option<String>,
    /// Alternative dotenv file.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

impl BackendArgs {
    fn into_overrides(self) -> RuntimeOverrides {
        RuntimeOverrides {
            host: self.host,
            port: self.port,
            upstream_url: self.upstream_url,
            env_path: self.env_file,
        }
    }
}

fn parse_host_arg(value: &str) -> Result<IpAddr> {
    value
        .parse::<IpAddr>()
        .context("expected a valid IPv4 or IPv6 address for --host/TUBEFEED_HOST")
}

#[derive(Clone)]
struct AppState {
    client: Arc<dyn UpstreamClient>,
    request_timeout: Duration,
}

impl AppState {
    fn feed(&self) -> FeedAggregator<'_, dyn UpstreamClient> {
        FeedAggregator::new(self.client.as_ref())
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    fn timeout() -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            message: "upstream did not answer in time".into(),
        }
    }
}

/// Upstream details are logged, never returned to the caller.
impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::NotFound(_) => Self::not_found(err.to_string()),
            FeedError::InvalidRequest(message) => Self::bad_request(message),
            FeedError::Upstream(source) => {
                error!(error = %format!("{source:#}"), "upstream request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let args = BackendArgs::parse();
    let settings = resolve_runtime_settings(args.into_overrides())?;
    let host = parse_host_arg(&settings.host)?;

    let client: Arc<dyn UpstreamClient> = Arc::new(HttpUpstream::new(
        settings.upstream.clone(),
        settings.request_timeout,
    ));
    let state = AppState {
        client,
        request_timeout: settings.request_timeout,
    };

    let addr = SocketAddr::new(host, settings.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!(%addr, upstream = %settings.upstream.base_url, "API server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tubefeed=debug,backend=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|value| matches!(value.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/homepage", get(homepage))
        .route("/api/trending", get(trending))
        .route("/api/search", get(search))
        .route("/api/suggestions", get(suggestions))
        .route("/api/shorts", get(list_shorts))
        .route("/api/shorts/{id}", get(get_short))
        .route("/api/video/{id}", get(get_video))
        .fallback(api_not_found)
        .with_state(state)
}

async fn shutdown_signal() {
    // A failed handler install only affects graceful shutdown.
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to install Ctrl+C handler");
    }
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("endpoint not found")
}

/// Runs one feed operation under the request-level timeout.
async fn with_timeout<T>(
    timeout: Duration,
    operation: impl Future<Output = FeedResult<T>>,
) -> ApiResult<T> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(ApiError::timeout()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryParams {
    q: Option<String>,
    limit: Option<usize>,
}

async fn homepage(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<FeedPage>> {
    with_timeout(state.request_timeout, state.feed().home(params.limit))
        .await
        .map(Json)
}

async fn trending(State(state): State<AppState>) -> ApiResult<Json<FeedPage>> {
    with_timeout(state.request_timeout, state.feed().trending())
        .await
        .map(Json)
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<FeedPage>> {
    let query = params.q.unwrap_or_default();
    with_timeout(state.request_timeout, state.feed().search(&query, params.limit))
        .await
        .map(Json)
}

async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Suggestions>> {
    let query = params.q.unwrap_or_default();
    with_timeout(state.request_timeout, state.feed().suggestions(&query))
        .await
        .map(Json)
}

async fn list_shorts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<FeedPage>> {
    with_timeout(state.request_timeout, state.feed().shorts(params.limit))
        .await
        .map(Json)
}

async fn get_short(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<DetailPage>> {
    with_timeout(state.request_timeout, state.feed().short_detail(&id))
        .await
        .map(Json)
}

async fn get_video(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<DetailPage>> {
    with_timeout(state.request_timeout, state.feed().video_detail(&id))
        .await
        .map(Json)
}
