//! Process-local memory store.
//!
//! Records are kept as JSON text in one concurrent map per memory type and
//! are lost when the process exits. Expired records are dropped the first
//! time a read path touches them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::error::{Error, Result};
use super::id::{IdGenerator, newest_first};
use super::store::MemoryStore;
use super::types::{Memory, MemoryType, NewMemory};

pub struct LocalMemoryStore {
    records: HashMap<MemoryType, DashMap<String, String>>,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
}

impl LocalMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let records = MemoryType::ALL
            .into_iter()
            .map(|t| (t, DashMap::new()))
            .collect();
        Self {
            records,
            ids: IdGenerator::new(),
            clock,
        }
    }

    /// Number of records held for a type, expired ones included.
    pub fn len(&self, memory_type: MemoryType) -> usize {
        self.bucket(memory_type).len()
    }

    /// Whether no records of any type are held.
    pub fn is_empty(&self) -> bool {
        self.records.values().all(DashMap::is_empty)
    }

    fn bucket(&self, memory_type: MemoryType) -> &DashMap<String, String> {
        // Every type gets a bucket in `with_clock`.
        &self.records[&memory_type]
    }

    /// Loads `id`, removing it if it has expired.
    fn load(&self, memory_type: MemoryType, id: &str, now: i64) -> Result<Option<Memory>> {
        let bucket = self.bucket(memory_type);
        let Some(json) = bucket.get(id).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        let key = memory_type.key(id);
        let memory: Memory =
            serde_json::from_str(&json).map_err(|e| Error::serialization(&key, e))?;
        if memory.is_expired_at(now) {
            bucket.remove_if(id, |_, current| *current == json);
            debug!(key = %key, "Evicted expired memory");
            return Ok(None);
        }
        Ok(Some(memory))
    }
}

impl Default for LocalMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = MemoryType::ALL
            .into_iter()
            .map(|t| (t.as_str(), self.len(t)))
            .collect();
        f.debug_struct("LocalMemoryStore")
            .field("records", &counts)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MemoryStore for LocalMemoryStore {
    async fn store_memory(&self, new: NewMemory) -> Result<Memory> {
        let (timestamp, id) = self.ids.next(self.clock.now_millis());
        let memory = new.into_memory(id, timestamp);
        let key = memory.key();

        let json = serde_json::to_string(&memory).map_err(|e| Error::serialization(&key, e))?;
        self.bucket(memory.memory_type).insert(memory.id.clone(), json);

        debug!(key = %key, ttl = ?memory.ttl, "Stored memory locally");
        Ok(memory)
    }

    async fn get_memory(&self, memory_type: MemoryType, id: &str) -> Result<Option<Memory>> {
        self.load(memory_type, id, self.clock.now_millis())
    }

    async fn get_recent_memories(
        &self,
        memory_type: MemoryType,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = self
            .bucket(memory_type)
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort_by(|a, b| newest_first(a, b));

        let now = self.clock.now_millis();
        let mut memories = Vec::with_capacity(limit.min(ids.len()));
        for id in ids {
            if memories.len() == limit {
                break;
            }
            match self.load(memory_type, &id, now) {
                Ok(Some(memory)) => memories.push(memory),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Skipping malformed memory"),
            }
        }

        Ok(memories)
    }

    async fn delete_memory(&self, memory_type: MemoryType, id: &str) -> Result<bool> {
        let Some((_, json)) = self.bucket(memory_type).remove(id) else {
            return Ok(false);
        };

        // An expired record was already gone as far as readers could tell.
        let expired = serde_json::from_str::<Memory>(&json)
            .is_ok_and(|m| m.is_expired_at(self.clock.now_millis()));
        debug!(key = %memory_type.key(id), expired, "Deleted local memory");
        Ok(!expired)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
