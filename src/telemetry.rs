//! Diagnostics logging
//!
//! Lifecycle events are appended as JSON lines to a local log file.
//! With debug mode off only warnings and errors are recorded. Logging is
//! best-effort: initialization or write failures never abort a response.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Install the global subscriber: JSON lines to the configured log file
/// plus a compact console layer.
///
/// The returned guard flushes the file writer on drop; hold it for the
/// process lifetime.
pub fn init(config: &Config) -> anyhow::Result<WorkerGuard> {
    let dir = config.log_file.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = config
        .log_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "api.log".to_string());

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.debug {
            EnvFilter::new("debug,hyper=info,reqwest=info,h2=info,rustls=info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(fmt::layer().json().with_writer(non_blocking))
        .try_init()
        .ok();

    tracing::info!(
        log_file = %config.log_file.display(),
        debug = config.debug,
        "Telemetry initialized"
    );

    Ok(guard)
}
