//! Memory CRUD handlers.
//!
//! Each handler validates the whole body before it touches the store, so a
//! rejected request never causes backend traffic.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use super::super::types::{DeleteResponse, MemoryResponse, RecentResponse, StoreResponse};
use super::super::validation::{self, RetrieveRequest};
use super::super::{AppError, AppState, metrics};

/// POST /api/memory/store - Create a memory record.
pub(crate) async fn store(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StoreResponse>, AppError> {
    let body = validation::parse_json(&body)?;
    let new = validation::store_request(&body)?;
    metrics::record_memory_operation("store", new.memory_type);

    let memory = state.memory.store_memory(new).await?;
    info!(key = %memory.key(), ttl = ?memory.ttl, "Memory stored");

    Ok(Json(StoreResponse {
        id: memory.id.clone(),
        success: true,
        memory,
    }))
}

/// POST /api/memory/retrieve - Fetch one memory by id, or the most recent ones.
pub(crate) async fn retrieve(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body = validation::parse_json(&body)?;
    let RetrieveRequest {
        memory_type,
        id,
        limit,
    } = validation::retrieve_request(&body)?;

    if let Some(id) = id {
        metrics::record_memory_operation("get", memory_type);
        let memory = state
            .memory
            .get_memory(memory_type, &id)
            .await?
            .ok_or_else(|| AppError::NotFound("Memory not found".to_string()))?;
        debug!(key = %memory.key(), "Memory retrieved");
        return Ok(Json(MemoryResponse { memory }).into_response());
    }

    metrics::record_memory_operation("recent", memory_type);
    let results = state.memory.get_recent_memories(memory_type, limit).await?;
    debug!(memory_type = %memory_type, limit, count = results.len(), "Recent memories retrieved");

    Ok(Json(RecentResponse {
        count: results.len(),
        results,
    })
    .into_response())
}

/// DELETE /api/memory/delete - Delete a memory that exists.
pub(crate) async fn delete(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DeleteResponse>, AppError> {
    let body = validation::parse_json(&body)?;
    let req = validation::delete_request(&body)?;
    metrics::record_memory_operation("delete", req.memory_type);

    if state
        .memory
        .get_memory(req.memory_type, &req.id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Memory not found".to_string()));
    }

    if !state.memory.delete_memory(req.memory_type, &req.id).await? {
        return Err(AppError::DeleteFailed("Failed to delete memory".to_string()));
    }
    info!(key = %req.memory_type.key(&req.id), "Memory deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Memory deleted successfully",
        id: req.id,
    }))
}
