//! Memory access facade.
//!
//! [`MemoryService`] is what the HTTP layer talks to. The backend behind it
//! is chosen once at startup with [`BackendKind::select`] and never changes
//! for the life of the process.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::constants::{
    DEFAULT_INTERACTION_LIMIT, DEFAULT_MOOD_LIMIT, DEVELOPMENT_ENV, INTERACTION_TTL_SECS,
    MOOD_TTL_SECS,
};
use crate::kv::KvStore;

use super::error::Result;
use super::local::LocalMemoryStore;
use super::remote::RemoteMemoryStore;
use super::store::MemoryStore;
use super::types::{Memory, MemoryType, NewMemory};

/// Which memory backend serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted key-value store.
    Remote,
    /// Process-local map.
    Local,
}

impl BackendKind {
    /// Local only for development without the remote store forced on.
    pub fn select(use_remote: bool, environment: &str) -> Self {
        if !use_remote && environment == DEVELOPMENT_ENV {
            Self::Local
        } else {
            Self::Remote
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cheap-clone handle over the selected [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryService {
    store: Arc<dyn MemoryStore>,
    kind: BackendKind,
}

impl MemoryService {
    /// Remote backend over `kv`.
    pub fn remote(kv: KvStore) -> Self {
        Self::with_store(RemoteMemoryStore::new(kv), BackendKind::Remote)
    }

    /// Fresh process-local backend.
    pub fn local() -> Self {
        Self::with_store(LocalMemoryStore::new(), BackendKind::Local)
    }

    pub fn with_store<S: MemoryStore>(store: S, kind: BackendKind) -> Self {
        Self {
            store: Arc::new(store),
            kind,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub async fn store_memory(&self, new: NewMemory) -> Result<Memory> {
        self.store.store_memory(new).await
    }

    pub async fn get_memory(&self, memory_type: MemoryType, id: &str) -> Result<Option<Memory>> {
        self.store.get_memory(memory_type, id).await
    }

    pub async fn get_recent_memories(
        &self,
        memory_type: MemoryType,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        self.store.get_recent_memories(memory_type, limit).await
    }

    pub async fn delete_memory(&self, memory_type: MemoryType, id: &str) -> Result<bool> {
        self.store.delete_memory(memory_type, id).await
    }

    /// Stores an interaction. Without an explicit TTL it lives for a day.
    pub async fn store_interaction(
        &self,
        content: impl Into<String>,
        user_id: Option<String>,
        ttl: Option<i64>,
    ) -> Result<Memory> {
        let new = NewMemory::new(MemoryType::Interaction, content)
            .with_user_id(user_id)
            .with_ttl(Some(ttl.unwrap_or(INTERACTION_TTL_SECS)));
        self.store_memory(new).await
    }

    pub async fn get_recent_interactions(&self, limit: Option<usize>) -> Result<Vec<Memory>> {
        self.get_recent_memories(
            MemoryType::Interaction,
            limit.unwrap_or(DEFAULT_INTERACTION_LIMIT),
        )
        .await
    }

    /// Stores a mood entry, kept for seven days.
    pub async fn store_mood(
        &self,
        content: impl Into<String>,
        user_id: Option<String>,
    ) -> Result<Memory> {
        let new = NewMemory::new(MemoryType::Mood, content)
            .with_user_id(user_id)
            .with_ttl(Some(MOOD_TTL_SECS));
        self.store_memory(new).await
    }

    pub async fn get_recent_moods(&self, limit: Option<usize>) -> Result<Vec<Memory>> {
        self.get_recent_memories(MemoryType::Mood, limit.unwrap_or(DEFAULT_MOOD_LIMIT))
            .await
    }
}

impl fmt::Debug for MemoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryService")
            .field("backend", &self.kind)
            .field("store", &self.store.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        assert_eq!(BackendKind::select(false, "development"), BackendKind::Local);
        assert_eq!(BackendKind::select(true, "development"), BackendKind::Remote);
        assert_eq!(BackendKind::select(false, "production"), BackendKind::Remote);
        assert_eq!(BackendKind::select(true, "production"), BackendKind::Remote);
        assert_eq!(BackendKind::select(false, "test"), BackendKind::Remote);
        assert_eq!(BackendKind::select(false, ""), BackendKind::Remote);
    }

    #[test]
    fn test_backend_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(BackendKind::Local).unwrap(),
            serde_json::json!("local")
        );
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }
}
