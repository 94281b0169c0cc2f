//! High-level `KvStore` wrapper over backend implementations.
//!
//! Provides a convenient API that wraps any `KvBackend` implementation.

use super::backend::KvBackend;
use super::memory::MemoryBackend;
use super::rest::{RestBackend, RestConfig};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// High-level key-value store handle.
///
/// Wraps a `KvBackend` implementation and provides a consistent API
/// regardless of the underlying storage mechanism.
///
/// # Thread Safety
///
/// `KvStore` is `Clone` and can be shared across tasks. The underlying
/// backend handles concurrent access.
///
/// # Example
///
/// ```ignore
/// use mneme::kv::KvStore;
/// use std::time::Duration;
///
/// let store = KvStore::memory();
/// store.set("session:123", b"user_data").await?;
/// store.expire("session:123", Duration::from_secs(3600)).await?;
///
/// if let Some(data) = store.get("session:123").await? {
///     println!("Found: {} bytes", data.len());
/// }
/// ```
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn KvBackend>,
}

impl KvStore {
    /// Creates a `KvStore` talking to a hosted REST key-value endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is missing or invalid.
    pub fn rest(config: &RestConfig) -> Result<Self> {
        let backend = RestBackend::new(config)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Creates a `KvStore` backed by an in-process map.
    ///
    /// All data is lost when the process exits.
    pub fn memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
        }
    }

    /// Creates a `KvStore` with a custom backend.
    ///
    /// Tests use this to wrap recording or failing backends.
    pub fn custom<B: KvBackend>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Retrieves a value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.backend.get(key).await
    }

    /// Stores a value, overwriting any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.backend.set(key, value.to_vec()).await
    }

    /// Deletes a key, returning how many keys were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn delete(&self, key: &str) -> Result<u64> {
        self.backend.delete(key).await
    }

    /// Lists keys matching a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.backend.keys(pattern).await
    }

    /// Sets a key to expire after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.backend.expire(key, ttl).await
    }

    /// Checks connectivity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn ping(&self) -> Result<String> {
        self.backend.ping().await
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}
