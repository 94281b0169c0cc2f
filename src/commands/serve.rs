//! `mneme serve`

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use mneme::config::Config;
use mneme::{http, startup};

pub async fn execute(config_path: Option<&Path>, port: Option<u16>, log_json: bool) -> Result<()> {
    init_tracing(log_json);

    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let metrics = if config.server.metrics {
        Some(http::metrics::install_recorder()?)
    } else {
        None
    };

    let state = startup::build_state(&config, metrics).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(environment = %config.environment, "Starting mneme");

    http::serve(listener, state).await
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
