//! CLI command implementations.
//!
//! - [`serve`] - Run the HTTP API
//! - [`check`] - Validate configuration and inspect the KV store

pub mod check;
pub mod serve;
