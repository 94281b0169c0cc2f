//! mneme: time-stamped memory records for AI assistants.
//!
//! Records live in a key-value store under `memory:{type}:{id}` keys, either
//! a hosted Redis-compatible store reached over its REST protocol or a
//! process-local map for development. An axum HTTP API exposes them.
//!
//! - [`memory`] - record types, stores and the [`memory::MemoryService`] facade
//! - [`kv`] - key-value client
//! - [`http`] - HTTP API
//! - [`config`] - TOML and environment configuration

pub mod config;
pub mod constants;
pub mod http;
pub mod kv;
pub mod memory;
pub mod paths;
pub mod reliability;
pub mod startup;
