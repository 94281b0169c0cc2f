//! Health, diagnostics and metrics handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::super::AppState;
use super::super::types::{HealthResponse, KvHealthResponse};
use crate::kv::KvStore;

/// GET /health - Liveness and selected memory backend.
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.memory.backend_kind(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
struct KvHealthFailure {
    success: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn kv_failure(error: &'static str, details: Option<String>) -> Response {
    warn!(error, details = ?details, "KV health check failed");
    let body = KvHealthFailure {
        success: false,
        error,
        details,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// GET /api/kv-health - Ping the KV store and round-trip a throwaway key.
pub(crate) async fn kv_health(State(state): State<AppState>) -> Response {
    let kv = &state.kv;

    let ping_result = match kv.ping().await {
        Ok(reply) => reply,
        Err(e) => return kv_failure("Ping failed", Some(format!("{e:#}"))),
    };

    let now = chrono::Utc::now().timestamp_millis();
    let test_key = format!("test:{now}");
    let test_value = json!({ "message": "Test successful", "timestamp": now });

    let retrieved = match round_trip(kv, &test_key, &test_value).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return kv_failure("Get returned no data", None),
        Err(e) => return kv_failure("Set/get test failed", Some(format!("{e:#}"))),
    };
    let retrieved_data = serde_json::from_slice(&retrieved)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&retrieved).into_owned()));

    info!(backend = kv.backend_name(), ping = %ping_result, "KV health check passed");
    Json(KvHealthResponse {
        success: true,
        backend: kv.backend_name(),
        ping_result,
        test_key,
        test_value,
        retrieved_data,
    })
    .into_response()
}

/// Writes, reads back and deletes `key`.
async fn round_trip(kv: &KvStore, key: &str, value: &Value) -> anyhow::Result<Option<Vec<u8>>> {
    kv.set(key, value.to_string().as_bytes()).await?;
    let retrieved = kv.get(key).await;
    kv.delete(key).await?;
    retrieved
}

/// GET /metrics - Prometheus text exposition.
pub(crate) async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
