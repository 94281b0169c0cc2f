//! Prometheus counters for the HTTP API.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::memory::MemoryType;

/// Installs the global Prometheus recorder and returns its render handle.
///
/// Can only succeed once per process.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// Counts a memory operation that passed validation.
pub(crate) fn record_memory_operation(operation: &'static str, memory_type: MemoryType) {
    ::metrics::counter!(
        "mneme_memory_operations_total",
        "operation" => operation,
        "type" => memory_type.as_str()
    )
    .increment(1);
}

/// Counts a failed request by error code.
pub(crate) fn record_http_error(code: &'static str) {
    ::metrics::counter!("mneme_http_errors_total", "code" => code).increment(1);
}

pub(crate) fn record_preferences_operation(operation: &'static str) {
    ::metrics::counter!("mneme_preferences_operations_total", "operation" => operation)
        .increment(1);
}
