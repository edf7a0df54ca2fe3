//! Outbound client for the fixed upstream chat-completion API
//!
//! One synchronous request/response cycle, no retries: any failure is
//! terminal for the inbound request and maps onto the `api_error` kind.

use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use serde_json::Value;

use crate::config::Config;
use crate::error::ProxyError;
use crate::request::UpstreamPayload;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// How much of a non-JSON upstream body is kept for diagnostics.
const LOGGED_BODY_LIMIT: usize = 500;

/// Client for the upstream API, built once at startup.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    chat_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            chat_url: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
        })
    }

    /// Forward a chat-completion payload and return the upstream's parsed
    /// JSON body.
    ///
    /// Failure mapping:
    /// - transport error → 500 `API request failed: <error>`
    /// - non-JSON body → 500 `Invalid response from upstream API`
    /// - non-200 status → that status, `Upstream API error: <message>`
    pub async fn chat_completions(&self, payload: &UpstreamPayload) -> Result<Value, ProxyError> {
        tracing::debug!(url = %self.chat_url, "Calling upstream API");

        let response = self
            .http
            .post(&self.chat_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        tracing::debug!(
            http_code = status,
            response_length = body.len(),
            "Upstream response"
        );

        let result: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!(response = truncate(&body, LOGGED_BODY_LIMIT), "Invalid JSON from upstream");
                return Err(ProxyError::api(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Invalid response from upstream API",
                ));
            }
        };

        if status != 200 {
            let message = result
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            tracing::debug!(http_code = status, error = message, "Upstream error");
            return Err(ProxyError::api(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                format!("Upstream API error: {message}"),
            ));
        }

        Ok(result)
    }
}

fn transport_error(error: reqwest::Error) -> ProxyError {
    ProxyError::api(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("API request failed: {error}"),
    )
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
