//! Retry utilities with exponential backoff.
//!
//! Only the startup connectivity probe retries. Memory operations are never
//! retried: a failed write surfaces to the caller as-is.
//!
//! # Example
//!
//! ```rust,ignore
//! use mneme::reliability::retry::{retry_anyhow, RetryConfig};
//!
//! let pong = retry_anyhow(RetryConfig::startup(), "kv ping", || kv.ping()).await?;
//! ```

use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::{Instrument, debug, info_span, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles delay each retry).
    pub factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Config for the startup probe: a handful of quick attempts so a cold
    /// KV endpoint does not fail the boot, without stalling it for long.
    #[must_use]
    pub fn startup() -> Self {
        Self {
            max_retries: 4,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            factor: 2.0,
        }
    }

    /// Set maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    fn build_backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries as usize)
            .with_factor(self.factor)
            .with_jitter()
    }
}

/// Retry an async operation with exponential backoff.
///
/// `is_retryable` decides which errors are worth another attempt; any other
/// error is returned immediately.
pub async fn retry_async<F, Fut, T, E, R>(
    config: RetryConfig,
    operation: F,
    is_retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let backoff = config.build_backoff();
    let max_retries = config.max_retries;

    let mut attempt = 0u32;
    let notify = |err: &E, dur: Duration| {
        attempt += 1;
        warn!(
            attempt = attempt,
            max_retries = max_retries,
            next_delay_ms = dur.as_millis() as u64,
            error = %format!("{err:#}"),
            "Retry attempt failed, will retry"
        );
    };

    operation
        .retry(backoff)
        .when(move |e| is_retryable(e))
        .notify(notify)
        .await
}

/// Retry an async operation that returns `anyhow::Result`, retrying only
/// errors that [`is_transient_error`] accepts.
///
/// Retry warnings are emitted inside a span carrying `operation_name`.
pub async fn retry_anyhow<F, Fut, T>(
    config: RetryConfig,
    operation_name: &str,
    operation: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let span = info_span!("retry", operation = %operation_name);
    retry_async(config, operation, is_transient_error)
        .instrument(span)
        .await
}

/// Determine if an error is transient and worth retrying.
///
/// The whole cause chain is inspected. Returns `true` for:
/// - Unreachable endpoints, refused or reset connections
/// - Timeouts
/// - Temporary DNS failures
/// - HTTP 5xx, 408, 429
///
/// Authentication failures and malformed replies are permanent.
pub fn is_transient_error(error: &anyhow::Error) -> bool {
    let msg = format!("{error:#}").to_lowercase();

    if msg.contains("could not reach")
        || msg.contains("connection refused")
        || msg.contains("connection reset")
        || msg.contains("connection closed")
        || msg.contains("broken pipe")
        || msg.contains("network unreachable")
        || msg.contains("host unreachable")
    {
        debug!("Transient error detected: connection issue");
        return true;
    }

    if msg.contains("timed out") || msg.contains("timeout") || msg.contains("deadline exceeded") {
        debug!("Transient error detected: timeout");
        return true;
    }

    if msg.contains("dns") && (msg.contains("temporary") || msg.contains("again")) {
        debug!("Transient error detected: DNS issue");
        return true;
    }

    if msg.contains("status 5")
        || msg.contains("status 408")
        || msg.contains("status 429")
        || msg.contains("too many requests")
        || msg.contains("service unavailable")
        || msg.contains("gateway timeout")
        || msg.contains("bad gateway")
    {
        debug!("Transient error detected: HTTP server error");
        return true;
    }

    false
}
