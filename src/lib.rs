//! KUAE Cloud coding-plan local API proxy
//!
//! A single-endpoint, OpenAI-compatible HTTP proxy:
//! - Authenticates callers against a locally configured secret
//! - Validates and defaults chat-completion request fields
//! - Forwards to the fixed KUAE Cloud upstream and relays the response
//! - Translates every failure into a uniform error envelope

pub mod config;
pub mod error;
pub mod request;
pub mod server;
pub mod telemetry;
pub mod upstream;

pub use config::Config;
pub use error::ProxyError;
pub use request::{ChatRequest, UpstreamPayload};
pub use server::{router, serve, AppState};
pub use upstream::UpstreamClient;
