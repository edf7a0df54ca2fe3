//! Configuration for the proxy
//!
//! The shared secret is resolved from:
//! - `.env` in the working directory (preferred), key `kuaecloud_coding_plan`
//! - `api-key.ini` (legacy), `[key]` section, key `kuaecloud-coding_plan`
//!
//! A missing credential is not an error: authentication then fails closed
//! on every request.

use std::path::{Path, PathBuf};

/// Fixed upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://coding-plan-endpoint.kuaecloud.net/v1";

/// Model forwarded when the caller omits one.
pub const DEFAULT_MODEL: &str = "GLM-4.7";

/// Primary configuration file name.
pub const ENV_FILE: &str = ".env";

/// Legacy fallback configuration file name.
pub const LEGACY_FILE: &str = "api-key.ini";

const PRIMARY_KEY: &str = "kuaecloud_coding_plan";
const LEGACY_SECTION: &str = "key";
const LEGACY_KEY: &str = "kuaecloud-coding_plan";

/// Immutable proxy configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret: authenticates inbound callers and the upstream call.
    pub api_key: String,

    /// Upstream API base URL.
    pub base_url: String,

    /// Model substituted when a request omits `model`.
    pub default_model: String,

    /// Whether diagnostic logging is active.
    pub debug: bool,

    /// Append-only diagnostics log file.
    pub log_file: PathBuf,

    /// Listener host.
    pub host: String,

    /// Listener port.
    pub port: u16,
}

impl Config {
    /// Resolve configuration from the current working directory.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::load_from(&std::env::current_dir()?))
    }

    /// Resolve configuration from a specific directory.
    ///
    /// Missing configuration files yield an empty credential rather than
    /// an error.
    pub fn load_from(dir: &Path) -> Self {
        let primary = read_primary_key(&dir.join(ENV_FILE));
        let (legacy_key, legacy_debug) = read_legacy_ini(&dir.join(LEGACY_FILE));

        let api_key = primary.or(legacy_key).unwrap_or_default();
        let debug = resolve_debug(std::env::var("DEBUG").ok().as_deref(), legacy_debug);

        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            debug,
            log_file: dir.join("api.log"),
            host: std::env::var("PROXY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PROXY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

/// Extract the credential from the primary key=value file.
///
/// Comment and blank lines are skipped; malformed lines are ignored.
/// The first occurrence of the key wins.
fn read_primary_key(path: &Path) -> Option<String> {
    let iter = dotenvy::from_path_iter(path).ok()?;
    for (key, value) in iter.filter_map(Result::ok) {
        if key == PRIMARY_KEY {
            let value = value.trim().to_string();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Parse the legacy ini file, returning the credential (if any) and the
/// top-level `debug` flag (if any).
fn read_legacy_ini(path: &Path) -> (Option<String>, Option<bool>) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return (None, None);
    };

    let mut section: Option<String> = None;
    let mut api_key = None;
    let mut debug = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Some(name.trim().to_string());
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"');
        match (section.as_deref(), key) {
            (Some(LEGACY_SECTION), LEGACY_KEY) if api_key.is_none() => {
                if !value.is_empty() {
                    api_key = Some(value.to_string());
                }
            }
            (None, "debug") => debug = Some(truthy(value)),
            _ => {}
        }
    }

    (api_key, debug)
}

/// Debug mode: `DEBUG=true` in the environment, or a truthy legacy ini flag.
fn resolve_debug(env_value: Option<&str>, legacy: Option<bool>) -> bool {
    env_value == Some("true") || legacy.unwrap_or(false)
}

fn truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
