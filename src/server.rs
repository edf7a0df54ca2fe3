//! HTTP server: routing, authentication and the chat-completion handler
//!
//! Control flow per request is strictly linear:
//! receive → method check → authenticate → parse/validate → forward → relay.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::Response;
use axum::routing::{any, get};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::{pretty_json, ProxyError};
use crate::request::ChatRequest;
use crate::upstream::UpstreamClient;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Shared request-handler state: the immutable configuration and the
/// upstream client.
pub struct AppState {
    config: Config,
    upstream: UpstreamClient,
    started_at: DateTime<Utc>,
    start_instant: Instant,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self {
            config,
            upstream,
            started_at: Utc::now(),
            start_instant: Instant::now(),
        })
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    started_at: DateTime<Utc>,
    uptime_secs: u64,
    version: &'static str,
}

pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);
    Router::new()
        .route(CHAT_COMPLETIONS_PATH, any(chat_completions))
        .route("/v1/models", get(list_models))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve until the process is terminated.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = router(AppState::new(config)?);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to address: {}", addr))?;

    tracing::info!(
        "listening on {}",
        listener.local_addr().context("failed to get local address")?
    );

    axum::serve(listener, app)
        .await
        .context("failed to start server")?;

    Ok(())
}

async fn chat_completions(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    tracing::info!(method = %method, path = CHAT_COMPLETIONS_PATH, "Request received");

    if method != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    authenticate(&headers, &state.config)?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|_| ProxyError::invalid_request("Invalid JSON in request body"))?;
    let request = ChatRequest::from_value(value)?;
    let payload = request.into_payload(&state.config.default_model);

    tracing::info!(
        model = %payload.model,
        message_count = payload.messages.len(),
        max_tokens = payload.max_tokens,
        temperature = payload.temperature as f64,
        "Chat request"
    );

    let result = state.upstream.chat_completions(&payload).await?;
    Ok(pretty_json(StatusCode::OK, &result))
}

/// Compare the bearer token against the configured credential.
///
/// An empty configured credential rejects everything. The token itself is
/// never logged.
fn authenticate(headers: &HeaderMap, config: &Config) -> Result<(), ProxyError> {
    let token = bearer_token(headers);
    tracing::debug!(token_provided = token.is_some(), "Auth attempt");

    match token {
        Some(token) if !config.api_key.is_empty() && token == config.api_key => Ok(()),
        _ => Err(ProxyError::InvalidApiKey),
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Header lookup and the `Bearer` prefix are case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim_start();
    (!token.is_empty()).then_some(token)
}

async fn list_models(State(state): State<Arc<AppState>>) -> Response {
    pretty_json(
        StatusCode::OK,
        &json!({
            "object": "list",
            "data": [
                {
                    "id": state.config.default_model,
                    "object": "model",
                    "owned_by": "kuaecloud",
                }
            ]
        }),
    )
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let response = HealthResponse {
        status: "ok",
        started_at: state.started_at,
        uptime_secs: state.start_instant.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    };
    pretty_json(
        StatusCode::OK,
        &serde_json::to_value(&response).unwrap_or_default(),
    )
}
