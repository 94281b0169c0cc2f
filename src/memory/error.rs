//! Error types for memory operations.

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by memory stores and the memory service.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A string that is not one of the four memory types.
    #[error("invalid memory type '{0}' (expected interaction, mood, preference or note)")]
    InvalidType(String),

    /// The key-value backend failed. The message carries the whole cause chain.
    #[error("failed to {operation}: {source:#}")]
    Backend {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// A record could not be encoded or decoded.
    #[error("malformed memory record at '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Wraps a backend failure with the operation it interrupted.
    pub fn backend(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Backend {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Wraps a JSON failure for the record stored at `key`.
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_backend_error_includes_cause_chain() {
        let cause: anyhow::Result<()> =
            Err(anyhow::anyhow!("connection refused")).context("KV command GET failed");
        let err = Error::backend("read memory (type: note, id: 1-a)", cause.unwrap_err());
        let msg = err.to_string();
        assert!(msg.starts_with("failed to read memory (type: note, id: 1-a)"));
        assert!(msg.contains("KV command GET failed"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_invalid_type_message() {
        let err = Error::InvalidType("bogus".to_string());
        assert!(err.to_string().contains("'bogus'"));
    }
}
