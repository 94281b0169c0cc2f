//! HTTP API.
//!
//! Endpoints:
//! - `POST /api/memory/store` - Create a memory
//! - `POST /api/memory/retrieve` - One memory by id, or the most recent ones
//! - `DELETE /api/memory/delete` - Delete a memory
//! - `GET|POST /api/preferences` - Per-user preference document
//! - `GET /api/kv-health` - KV store diagnostics
//! - `GET /health` - Liveness
//! - `GET /metrics` - Prometheus metrics (when enabled)

pub mod error;
mod handlers;
pub mod metrics;
mod types;
mod validation;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::kv::KvStore;
use crate::memory::MemoryService;

pub use error::AppError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Memory facade over the backend selected at startup.
    pub memory: MemoryService,
    /// Raw key-value handle for preferences and diagnostics.
    pub kv: KvStore,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(memory: MemoryService, kv: KvStore) -> Self {
        Self {
            memory,
            kv,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("memory", &self.memory)
            .field("kv", &self.kv)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/memory/store", post(handlers::store))
        .route("/api/memory/retrieve", post(handlers::retrieve))
        .route("/api/memory/delete", delete(handlers::delete))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).post(handlers::save_preferences),
        )
        .route("/api/kv-health", get(handlers::kv_health));

    if state.metrics.is_some() {
        app = app.route("/metrics", get(handlers::prometheus_metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Serves the API on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr: SocketAddr = listener.local_addr().context("Failed to read bound address")?;
    info!(
        %addr,
        backend = %state.memory.backend_kind(),
        kv = state.kv.backend_name(),
        "HTTP API listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
