//! HTTP API handlers organized by resource.

pub mod memory;
pub mod preferences;
pub mod system;

// Re-export all handlers for use in routing
pub(crate) use memory::{delete, retrieve, store};
pub(crate) use preferences::{get_preferences, save_preferences};
pub(crate) use system::{health, kv_health, prometheus_metrics};
