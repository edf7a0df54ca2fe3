//! Error taxonomy and the uniform error envelope
//!
//! Every failure, local or upstream-relayed, is surfaced to the caller as
//! `{"error": {"message": ..., "type": ..., "param": null}}`.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

/// A terminal request failure.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Client-caused: malformed JSON, missing/invalid fields.
    #[error("{0}")]
    InvalidRequest(String),

    /// Client-caused: anything but POST on the chat endpoint.
    #[error("Only POST method is supported")]
    MethodNotAllowed,

    /// Authentication failure.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Failure originating from or while talking to the upstream.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

impl ProxyError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn api(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The `type` field of the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::MethodNotAllowed => "invalid_request_error",
            Self::InvalidApiKey => "invalid_api_key",
            Self::Api { .. } => "api_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::Api { status, .. } => *status,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!(
            kind = self.kind(),
            status = self.status().as_u16(),
            error = %self,
            "Request failed"
        );
        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": self.kind(),
                "param": null,
            }
        });
        pretty_json(self.status(), &body)
    }
}

/// Serialize a JSON value pretty-printed, Unicode left unescaped.
pub(crate) fn pretty_json(status: StatusCode, value: &Value) -> Response {
    let body = serde_json::to_string_pretty(value).unwrap_or_default();
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
