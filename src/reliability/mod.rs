//! Reliability primitives.

pub mod retry;

pub use retry::{RetryConfig, is_transient_error, retry_anyhow, retry_async};
