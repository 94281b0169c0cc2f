//! Response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::memory::{BackendKind, Memory};

/// `POST /api/memory/store`
#[derive(Debug, Serialize)]
pub(crate) struct StoreResponse {
    pub id: String,
    pub success: bool,
    pub memory: Memory,
}

/// `POST /api/memory/retrieve` with an id.
#[derive(Debug, Serialize)]
pub(crate) struct MemoryResponse {
    pub memory: Memory,
}

/// `POST /api/memory/retrieve` without an id.
#[derive(Debug, Serialize)]
pub(crate) struct RecentResponse {
    pub count: usize,
    pub results: Vec<Memory>,
}

/// `DELETE /api/memory/delete`
#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
    pub backend: BackendKind,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KvHealthResponse {
    pub success: bool,
    pub backend: &'static str,
    pub ping_result: String,
    pub test_key: String,
    pub test_value: Value,
    pub retrieved_data: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct PreferencesResponse {
    pub preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SuccessResponse {
    pub success: bool,
}
