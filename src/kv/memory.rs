//! In-memory KV storage backend.
//!
//! Provides a fast, non-persistent key-value store using DashMap for
//! concurrent access. Serves the KV side of the local development setup and
//! doubles as the KV store in tests.

use super::backend::KvBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entry stored in the memory backend with optional expiration.
#[derive(Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn new(value: Vec<u8>) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory key-value storage backend using DashMap.
///
/// All data is lost when the process exits. Expired entries are removed
/// lazily when they are touched by `get`, `keys` or `expire`.
///
/// # Thread Safety
///
/// `MemoryBackend` is `Clone`; clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the store (including expired).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Removes an entry if it exists and has expired. Returns true if removed.
    fn evict_if_expired(&self, key: &str) -> bool {
        self.data
            .remove_if(key, |_, entry| entry.is_expired())
            .is_some()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.evict_if_expired(key) {
            return Ok(None);
        }
        Ok(self.data.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_string(), MemoryEntry::new(value));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        if self.evict_if_expired(key) {
            return Ok(0);
        }
        Ok(u64::from(self.data.remove(key).is_some()))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = glob::Pattern::new(pattern)
            .with_context(|| format!("Invalid key pattern '{pattern}'"))?;

        let mut keys = Vec::new();
        let mut expired_keys = Vec::new();

        for entry in self.data.iter() {
            let key = entry.key();
            if !pattern.matches(key) {
                continue;
            }
            if entry.value().is_expired() {
                expired_keys.push(key.clone());
            } else {
                keys.push(key.clone());
            }
        }

        for key in expired_keys {
            self.evict_if_expired(&key);
        }

        Ok(keys)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        if self.evict_if_expired(key) {
            return Ok(false);
        }
        match self.data.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<String> {
        Ok("PONG".to_string())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
