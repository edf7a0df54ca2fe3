//! Inbound chat-completion request schema
//!
//! The body is validated at the boundary: `messages` must be present and
//! array-typed, the remaining fields are optional with documented defaults.
//! Message entries themselves are relayed untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProxyError;

/// `max_tokens` forwarded when the caller omits one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// `temperature` forwarded when the caller omits one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A validated inbound request. Unknown fields are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<Value>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// The exact body forwarded to the upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<Value>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// Validate a parsed JSON body.
    ///
    /// A missing or non-array `messages` field is a client error; a
    /// wrong-typed optional field is too, with the serde error attached.
    pub fn from_value(value: Value) -> Result<Self, ProxyError> {
        if !value.get("messages").map(Value::is_array).unwrap_or(false) {
            return Err(ProxyError::invalid_request(
                "Missing or invalid messages field",
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ProxyError::invalid_request(format!("Invalid request body: {e}")))
    }

    /// Apply defaults and produce the outbound payload.
    pub fn into_payload(self, default_model: &str) -> UpstreamPayload {
        UpstreamPayload {
            model: self.model.unwrap_or_else(|| default_model.to_string()),
            messages: self.messages,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        }
    }
}
