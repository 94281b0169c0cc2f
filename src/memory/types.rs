//! Memory record types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::Error;

/// Kind of memory. Each kind lives in its own key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// An exchange with the assistant.
    Interaction,
    /// A daily mood entry.
    Mood,
    /// A user preference.
    Preference,
    /// A free-form note.
    Note,
}

impl MemoryType {
    /// Every memory type, in declaration order.
    pub const ALL: [Self; 4] = [Self::Interaction, Self::Mood, Self::Preference, Self::Note];

    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interaction => "interaction",
            Self::Mood => "mood",
            Self::Preference => "preference",
            Self::Note => "note",
        }
    }

    /// Key namespace for this type, e.g. `memory:note`.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Interaction => "memory:interaction",
            Self::Mood => "memory:mood",
            Self::Preference => "memory:preference",
            Self::Note => "memory:note",
        }
    }

    /// Full store key for a record id: `{prefix}:{id}`.
    pub fn key(self, id: &str) -> String {
        format!("{}:{id}", self.prefix())
    }

    /// Glob pattern matching every key of this type.
    pub fn pattern(self) -> String {
        format!("{}:*", self.prefix())
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidType(s.to_string()))
    }
}

/// A stored memory record. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// `{millis}-{suffix}`, assigned at creation.
    pub id: String,
    /// Namespace of the record.
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    /// Payload.
    pub content: String,
    /// Owning user, if any. Not checked against any user store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Arbitrary extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Lifetime in seconds, counted from `timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

impl Memory {
    /// Store key of this record.
    pub fn key(&self) -> String {
        self.memory_type.key(&self.id)
    }

    /// Expiry instant in epoch milliseconds, when a positive TTL is set.
    pub fn expires_at(&self) -> Option<i64> {
        self.ttl
            .filter(|ttl| *ttl > 0)
            .map(|ttl| self.timestamp.saturating_add(ttl.saturating_mul(1000)))
    }

    /// Whether the record's TTL has elapsed at `now` (epoch ms).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }

    /// TTL as a duration, when positive.
    pub fn ttl_duration(&self) -> Option<Duration> {
        positive_ttl(self.ttl)
    }
}

fn positive_ttl(ttl: Option<i64>) -> Option<Duration> {
    ttl.and_then(|secs| u64::try_from(secs).ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Input for creating a memory: everything except `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMemory {
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

impl NewMemory {
    pub fn new(memory_type: MemoryType, content: impl Into<String>) -> Self {
        Self {
            memory_type,
            content: content.into(),
            user_id: None,
            metadata: None,
            ttl: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Option<i64>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Completes the record with its server-assigned identity.
    pub fn into_memory(self, id: String, timestamp: i64) -> Memory {
        Memory {
            id,
            memory_type: self.memory_type,
            content: self.content,
            user_id: self.user_id,
            timestamp,
            metadata: self.metadata,
            ttl: self.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory(ttl: Option<i64>) -> Memory {
        NewMemory::new(MemoryType::Note, "hello")
            .with_ttl(ttl)
            .into_memory("1700000000000-abc".to_string(), 1_700_000_000_000)
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("mood".parse::<MemoryType>().unwrap(), MemoryType::Mood);
        assert_eq!(
            "interaction".parse::<MemoryType>().unwrap(),
            MemoryType::Interaction
        );
        assert!("bogus".parse::<MemoryType>().is_err());
        assert!("Note".parse::<MemoryType>().is_err());
        assert!("".parse::<MemoryType>().is_err());
    }

    #[test]
    fn test_keys_and_patterns() {
        assert_eq!(MemoryType::Note.key("1-a"), "memory:note:1-a");
        assert_eq!(MemoryType::Mood.pattern(), "memory:mood:*");
        assert_eq!(memory(None).key(), "memory:note:1700000000000-abc");
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let value = serde_json::to_value(memory(None)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1700000000000-abc",
                "type": "note",
                "content": "hello",
                "timestamp": 1_700_000_000_000_i64,
            })
        );

        let mut full = memory(Some(60));
        full.user_id = Some("u1".to_string());
        let value = serde_json::to_value(full).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["ttl"], 60);
    }

    #[test]
    fn test_expiry() {
        let m = memory(Some(60));
        assert_eq!(m.expires_at(), Some(1_700_000_060_000));
        assert!(!m.is_expired_at(1_700_000_059_999));
        assert!(m.is_expired_at(1_700_000_060_000));
        assert_eq!(m.ttl_duration(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_non_positive_ttl_never_expires() {
        for ttl in [None, Some(0), Some(-5)] {
            let m = memory(ttl);
            assert_eq!(m.expires_at(), None);
            assert!(!m.is_expired_at(i64::MAX));
            assert_eq!(m.ttl_duration(), None);
        }
    }
}
