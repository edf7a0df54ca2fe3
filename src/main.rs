//! KUAE Cloud local API proxy daemon.

use anyhow::Result;
use kuae_proxy::{server, telemetry, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let _guard = telemetry::init(&config)?;

    if config.api_key.is_empty() {
        tracing::warn!("no API key configured; all requests will be rejected");
    }

    server::serve(config).await
}
