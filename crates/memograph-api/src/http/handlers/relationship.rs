//! Relationship operation handlers: add, list, update, delete.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use memograph_types::memory::Metadata;
use memograph_types::relationship::{Direction, Relationship, RelationshipFilter};

use crate::http::error::AppError;
use crate::http::handlers::memory::{Deleted, Updated};
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddRelationshipRequest {
    pub from_memory_id: Uuid,
    pub to_memory_id: Uuid,
    pub relationship_type: String,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_strength() -> f64 {
    1.0
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: Uuid,
}

pub async fn add_relationship(
    State(state): State<AppState>,
    Json(request): Json<AddRelationshipRequest>,
) -> Result<ApiResponse<Created>, AppError> {
    let id = state
        .memory_service
        .add_relationship(
            request.from_memory_id,
            request.to_memory_id,
            &request.relationship_type,
            request.strength,
            request.metadata,
        )
        .await?;
    Ok(ApiResponse::ok(Created { id }))
}

#[derive(Debug, Deserialize)]
pub struct RelationshipQuery {
    pub memory_id: Option<Uuid>,
    pub relationship_type: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    pub min_strength: Option<f64>,
    pub limit: Option<i64>,
}

pub async fn get_relationships(
    State(state): State<AppState>,
    Query(params): Query<RelationshipQuery>,
) -> Result<ApiResponse<Vec<Relationship>>, AppError> {
    let defaults = RelationshipFilter::default();
    let filter = RelationshipFilter {
        memory_id: params.memory_id,
        relationship_type: params.relationship_type,
        direction: params.direction,
        min_strength: params.min_strength.unwrap_or(defaults.min_strength),
        limit: params.limit.unwrap_or(defaults.limit),
    };
    let relationships = state.memory_service.get_relationships(filter).await?;
    Ok(ApiResponse::ok(relationships))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRelationshipRequest {
    pub strength: Option<f64>,
    pub metadata: Option<Metadata>,
}

pub async fn update_relationship(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRelationshipRequest>,
) -> Result<ApiResponse<Updated>, AppError> {
    let updated = state
        .memory_service
        .update_relationship(&id, request.strength, request.metadata)
        .await?;
    Ok(ApiResponse::ok(Updated { updated }))
}

pub async fn delete_relationship(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Deleted>, AppError> {
    let deleted = state.memory_service.delete_relationship(&id).await?;
    Ok(ApiResponse::ok(Deleted { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_defaults() {
        let json = format!(
            r#"{{"from_memory_id":"{}","to_memory_id":"{}","relationship_type":"references"}}"#,
            Uuid::now_v7(),
            Uuid::now_v7()
        );
        let request: AddRelationshipRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.strength, 1.0);
        assert!(request.metadata.is_empty());
    }

    #[test]
    fn test_relationship_query_defaults_to_both() {
        let params: RelationshipQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(params.direction, Direction::Both);
        assert!(params.memory_id.is_none());
    }
}
