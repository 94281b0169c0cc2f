//! The storage contract shared by the remote and local memory stores.

use async_trait::async_trait;

use super::error::Result;
use super::types::{Memory, MemoryType, NewMemory};

/// Persistence for memory records.
///
/// Implementations must be safe to call from many tasks at once. There is
/// no cross-operation locking: concurrent writes to distinct ids never
/// conflict and a list may or may not include a record stored while it runs.
///
/// # Expiry
///
/// A record whose TTL has elapsed reads as absent from every method.
///
/// # Recent queries
///
/// [`get_recent_memories`](MemoryStore::get_recent_memories) is
/// best-effort. It selects the `limit` newest ids of a type by the numeric
/// timestamp encoded in each id, then loads them. Records that vanish,
/// expire or fail to load in between are skipped, so the result can be
/// shorter than `limit` even when more records exist.
#[async_trait]
pub trait MemoryStore: Send + Sync + 'static {
    /// Assigns an id and timestamp, persists the record and returns it.
    async fn store_memory(&self, new: NewMemory) -> Result<Memory>;

    /// Loads one record. `Ok(None)` when absent or expired.
    async fn get_memory(&self, memory_type: MemoryType, id: &str) -> Result<Option<Memory>>;

    /// Up to `limit` records of a type, newest first.
    async fn get_recent_memories(
        &self,
        memory_type: MemoryType,
        limit: usize,
    ) -> Result<Vec<Memory>>;

    /// Removes one record. `true` only when a record was actually removed.
    async fn delete_memory(&self, memory_type: MemoryType, id: &str) -> Result<bool>;

    /// Short backend name used in logs and health output.
    fn name(&self) -> &'static str;
}
