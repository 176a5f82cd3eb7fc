//! Memory operation handlers: add, get, update, delete, search, connected.
//!
//! Not-found on get maps to 404; update/delete on a missing id report
//! `updated: false` / `deleted: false` inside a successful envelope, since
//! service-level not-found is a boolean/null result rather than an error.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use memograph_core::memory::service::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_THRESHOLD, DEFAULT_TRAVERSAL_DEPTH,
};
use memograph_types::memory::{Memory, MemoryWrite, Metadata};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMemoryRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

pub async fn add_memory(
    State(state): State<AppState>,
    Json(request): Json<AddMemoryRequest>,
) -> Result<ApiResponse<MemoryWrite>, AppError> {
    let write = state
        .memory_service
        .add_memory(&request.content, request.metadata)
        .await?;
    Ok(ApiResponse::ok(write))
}

pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Memory>, AppError> {
    match state.memory_service.get_memory(&id).await? {
        Some(memory) => Ok(ApiResponse::ok(memory)),
        None => Err(AppError::NotFound("memory not found".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemoryRequest {
    pub content: Option<String>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub updated: bool,
}

pub async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMemoryRequest>,
) -> Result<ApiResponse<Updated>, AppError> {
    let updated = state
        .memory_service
        .update_memory(&id, request.content.as_deref(), request.metadata)
        .await?;
    Ok(ApiResponse::ok(Updated { updated }))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Deleted>, AppError> {
    let deleted = state.memory_service.delete_memory(&id).await?;
    Ok(ApiResponse::ok(Deleted { deleted }))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_threshold() -> f32 {
    DEFAULT_SEARCH_THRESHOLD
}

pub async fn search_memories(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<ApiResponse<Vec<Memory>>, AppError> {
    let memories = state
        .memory_service
        .search_memories(&request.query, request.limit, request.threshold)
        .await?;
    Ok(ApiResponse::ok(memories))
}

#[derive(Debug, Deserialize)]
pub struct ConnectedParams {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_TRAVERSAL_DEPTH
}

pub async fn get_connected_memories(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ConnectedParams>,
) -> Result<ApiResponse<Vec<Memory>>, AppError> {
    let memories = state
        .memory_service
        .get_connected_memories(&id, params.max_depth)
        .await?;
    Ok(ApiResponse::ok(memories))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults() {
        let request: SearchRequest = serde_json::from_str(r#"{"query":"capital"}"#).unwrap();
        assert_eq!(request.limit, 10);
        assert_eq!(request.threshold, 0.5);
    }

    #[test]
    fn test_add_request_defaults_empty_metadata() {
        let request: AddMemoryRequest = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
        assert!(request.metadata.is_empty());
    }

    #[test]
    fn test_connected_params_default_depth() {
        let params: ConnectedParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.max_depth, 2);
    }
}
