//! Key-value client with pluggable backends.
//!
//! The memory layer only needs a handful of commands from its store: `GET`,
//! `SET`, `DEL`, `KEYS`, `EXPIRE` and `PING`. Backends:
//!
//! - **RestBackend**: hosted Redis-compatible store over its REST protocol
//! - **MemoryBackend**: in-process map (local development and tests)
//!
//! # Example
//!
//! ```ignore
//! use mneme::kv::{KvStore, RestConfig};
//!
//! // In-process
//! let store = KvStore::memory();
//! store.set("key", b"value").await?;
//!
//! // Hosted
//! let store = KvStore::rest(&RestConfig { url, token, timeout })?;
//! store.set("key", b"value").await?;
//! ```

mod backend;
mod memory;
mod rest;
mod store;


// Re-export the public API
pub use backend::KvBackend;
pub use memory::MemoryBackend;
pub use rest::{RestBackend, RestConfig, redact_token};
pub use store::KvStore;
