//! Backend trait for the KV client.
//!
//! Defines the small command set the memory layer needs from a key-value
//! store, enabling pluggable storage (hosted REST store, in-process map, test
//! doubles).

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Backend trait for key-value storage.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// Backends provide no cross-key atomicity; concurrent writers to the same
/// key resolve as last-write-wins.
///
/// # Example
///
/// ```ignore
/// use mneme::kv::{KvBackend, MemoryBackend};
///
/// let backend = MemoryBackend::new();
/// backend.set("key", b"value".to_vec()).await?;
/// backend.expire("key", Duration::from_secs(60)).await?;
/// let value = backend.get("key").await?;
/// ```
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a value, overwriting any existing one.
    ///
    /// Overwriting clears any expiry previously set on the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Deletes a key.
    ///
    /// Returns the number of keys removed (`0` or `1`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Lists all live keys matching a glob pattern (`*` matches any run of
    /// characters).
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or the storage operation fails.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Sets a key to expire after `ttl`.
    ///
    /// Returns `Ok(false)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Checks connectivity, returning the backend's reply (`"PONG"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    async fn ping(&self) -> Result<String>;

    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &'static str;
}
