//! Wiring from configuration to a ready [`AppState`].

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use crate::config::Config;
use crate::http::AppState;
use crate::kv::{KvStore, redact_token};
use crate::memory::{BackendKind, MemoryService};
use crate::reliability::{RetryConfig, retry_anyhow};

/// Opens the KV store the configuration selects.
///
/// The remote store must answer a `PING` before this returns; transient
/// failures are retried with backoff.
///
/// # Errors
///
/// Returns an error if the remote store is selected and its credentials are
/// missing or invalid, or it cannot be reached.
pub async fn connect_kv(config: &Config, retry: RetryConfig) -> Result<KvStore> {
    match config.backend_kind() {
        BackendKind::Local => Ok(KvStore::memory()),
        BackendKind::Remote => {
            let rest = config
                .rest_config()
                .context("Remote store selected but credentials are incomplete")?;
            info!(
                url = %rest.url,
                token = %redact_token(&rest.token),
                "Connecting to remote KV store"
            );

            let kv = KvStore::rest(&rest)?;
            let pong = retry_anyhow(retry, "kv ping", || kv.ping())
                .await
                .context("Remote KV store is unreachable")?;
            info!(reply = %pong, "Remote KV store reachable");
            Ok(kv)
        },
    }
}

/// Builds handler state for `config`, selecting the memory backend once.
///
/// # Errors
///
/// See [`connect_kv`].
pub async fn build_state(config: &Config, metrics: Option<PrometheusHandle>) -> Result<AppState> {
    let kind = config.backend_kind();
    let kv = connect_kv(config, RetryConfig::startup()).await?;

    let memory = match kind {
        BackendKind::Remote => MemoryService::remote(kv.clone()),
        BackendKind::Local => MemoryService::local(),
    };
    info!(
        backend = %kind,
        environment = %config.environment,
        "Memory backend selected"
    );

    let state = AppState::new(memory, kv);
    Ok(match metrics {
        Some(handle) => state.with_metrics(handle),
        None => state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_development_uses_local_backends() {
        let config = Config {
            environment: "development".to_string(),
            ..Config::default()
        };
        let state = build_state(&config, None).await.unwrap();
        assert_eq!(state.memory.backend_kind(), BackendKind::Local);
        assert_eq!(state.kv.backend_name(), "memory");
        assert!(state.metrics.is_none());
    }

    #[tokio::test]
    async fn test_remote_without_credentials_fails() {
        let err = build_state(&Config::default(), None).await.unwrap_err();
        assert!(format!("{err:#}").contains("UPSTASH_REDIS_REST_URL"));
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails_after_retries() {
        let mut config = Config::default();
        // Port 9 (discard) on localhost is closed in test environments.
        config.store.rest_url = Some("http://127.0.0.1:9".to_string());
        config.store.rest_token = Some("tok".to_string());
        config.store.request_timeout_secs = 1;

        let retry = RetryConfig::startup()
            .with_max_retries(1)
            .with_initial_delay(std::time::Duration::from_millis(5));
        let err = connect_kv(&config, retry).await.unwrap_err();
        assert!(format!("{err:#}").contains("unreachable"));
    }
}
