//! Memory records and their storage.
//!
//! - [`MemoryStore`]: storage contract
//! - [`RemoteMemoryStore`]: records in a key-value store
//! - [`LocalMemoryStore`]: records in process memory
//! - [`MemoryService`]: facade over whichever store was selected at startup

pub mod clock;
pub mod error;
pub mod id;
pub mod local;
pub mod remote;
pub mod service;
pub mod store;
pub mod types;


pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use id::{IdGenerator, newest_first, parse_timestamp};
pub use local::LocalMemoryStore;
pub use remote::RemoteMemoryStore;
pub use service::{BackendKind, MemoryService};
pub use store::MemoryStore;
pub use types::{Memory, MemoryType, NewMemory};
