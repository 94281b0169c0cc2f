//! Memory store over a key-value backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::kv::KvStore;

use super::clock::{Clock, SystemClock};
use super::error::{Error, Result};
use super::id::{IdGenerator, newest_first};
use super::store::MemoryStore;
use super::types::{Memory, MemoryType, NewMemory};

/// Stores each record as JSON under `memory:{type}:{id}` in a [`KvStore`].
///
/// TTLs are handed to the backend with `EXPIRE` and also checked on read,
/// so a record past its lifetime is never returned even if the backend has
/// not evicted it yet.
pub struct RemoteMemoryStore {
    kv: KvStore,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
}

impl RemoteMemoryStore {
    pub fn new(kv: KvStore) -> Self {
        Self::with_clock(kv, Arc::new(SystemClock))
    }

    pub fn with_clock(kv: KvStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            kv,
            ids: IdGenerator::new(),
            clock,
        }
    }

    fn decode(key: &str, bytes: &[u8]) -> Result<Memory> {
        serde_json::from_slice(bytes).map_err(|e| Error::serialization(key, e))
    }
}

impl std::fmt::Debug for RemoteMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteMemoryStore")
            .field("kv", &self.kv)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MemoryStore for RemoteMemoryStore {
    async fn store_memory(&self, new: NewMemory) -> Result<Memory> {
        let (timestamp, id) = self.ids.next(self.clock.now_millis());
        let memory = new.into_memory(id, timestamp);
        let key = memory.key();

        let json = serde_json::to_vec(&memory).map_err(|e| Error::serialization(&key, e))?;
        self.kv
            .set(&key, &json)
            .await
            .map_err(|e| Error::backend(format!("store memory (key: {key})"), e))?;

        if let Some(ttl) = memory.ttl_duration() {
            self.kv
                .expire(&key, ttl)
                .await
                .map_err(|e| Error::backend(format!("set expiry (key: {key})"), e))?;
        }

        debug!(key = %key, ttl = ?memory.ttl, "Stored memory");
        Ok(memory)
    }

    async fn get_memory(&self, memory_type: MemoryType, id: &str) -> Result<Option<Memory>> {
        let key = memory_type.key(id);
        let Some(bytes) = self.kv.get(&key).await.map_err(|e| {
            Error::backend(format!("read memory (type: {memory_type}, id: {id})"), e)
        })?
        else {
            return Ok(None);
        };

        let memory = Self::decode(&key, &bytes)?;
        if memory.is_expired_at(self.clock.now_millis()) {
            debug!(key = %key, "Memory expired");
            return Ok(None);
        }
        Ok(Some(memory))
    }

    async fn get_recent_memories(
        &self,
        memory_type: MemoryType,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut keys = self.kv.keys(&memory_type.pattern()).await.map_err(|e| {
            Error::backend(format!("list memories (type: {memory_type})"), e)
        })?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        keys.sort_by(|a, b| newest_first(a, b));
        keys.truncate(limit);

        let now = self.clock.now_millis();
        let mut memories = Vec::with_capacity(keys.len());
        for key in keys {
            match self.kv.get(&key).await {
                Ok(Some(bytes)) => match Self::decode(&key, &bytes) {
                    Ok(memory) if memory.is_expired_at(now) => {
                        debug!(key = %key, "Skipping expired memory");
                    },
                    Ok(memory) => memories.push(memory),
                    Err(e) => warn!(key = %key, error = %e, "Skipping malformed memory"),
                },
                Ok(None) => debug!(key = %key, "Memory disappeared while listing"),
                Err(e) => warn!(
                    key = %key,
                    error = %format!("{e:#}"),
                    "Failed to fetch memory, skipping"
                ),
            }
        }

        Ok(memories)
    }

    async fn delete_memory(&self, memory_type: MemoryType, id: &str) -> Result<bool> {
        let removed = self.kv.delete(&memory_type.key(id)).await.map_err(|e| {
            Error::backend(format!("delete memory (type: {memory_type}, id: {id})"), e)
        })?;
        Ok(removed == 1)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
