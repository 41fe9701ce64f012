//! Dataform trigger entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — flags and environment variables (see [`config`]).
//! 2. **Wire observability** — JSON or pretty logs plus an optional OTLP
//!    exporter (see [`telemetry`]).
//! 3. **Construct infrastructure** — one `DataformClient` with its token
//!    source, created here and shared by every request.
//! 4. **Serve** — bind `0.0.0.0:$PORT` and run the `listener` router until
//!    SIGTERM/SIGINT, letting in-flight requests finish.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dataform::{
    DataformClient, DataformClientConfig, MetadataServerTokenSource, StaticTokenSource,
    TokenSource,
};
use listener::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let telemetry = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(e) = &result {
        error!(error = ?e, "Dataform trigger exited with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: Config) -> Result<()> {
    let settings = config.trigger_settings()?;

    let tokens: Arc<dyn TokenSource> = match &config.access_token {
        Some(token) => {
            info!("Using configured access token");
            Arc::new(StaticTokenSource::new(token.clone()))
        }
        None => {
            let http = reqwest::Client::builder()
                .timeout(config.request_timeout())
                .build()
                .context("failed to build metadata server HTTP client")?;
            Arc::new(MetadataServerTokenSource::new(http))
        }
    };

    let client = DataformClient::new(
        DataformClientConfig {
            base_url: config.api_base_url.clone(),
            request_timeout: config.request_timeout(),
        },
        tokens,
    )
    .context("failed to construct Dataform client")?;

    info!(
        project_id = %settings.project_id,
        region = %settings.region,
        service_account = %settings.service_account,
        base_url = client.base_url(),
        "Dataform client ready"
    );

    let tcp = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    listener::serve(
        tcp,
        AppState::new(Arc::new(client), settings),
        listener::shutdown_signal(),
    )
    .await
    .context("HTTP server failed")
}
