//! MemoryStore trait definition.
//!
//! CRUD for memories and relationships, plus the optional embedding side
//! table. Implementations live in memograph-infra (e.g. `SqliteMemoryStore`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use memograph_types::error::RepositoryError;
use memograph_types::memory::{Memory, MemoryPatch};
use memograph_types::relationship::{Relationship, RelationshipFilter, RelationshipPatch};
use uuid::Uuid;

/// Storage trait for the memory/relationship data engine.
///
/// Contracts:
/// - Reads on a missing id return `Ok(None)`, never an error.
/// - Updates/deletes on a missing id return `Ok(false)` (no-op).
/// - `updated_at` advances only on memory content/metadata updates, not on
///   relationship or embedding writes.
/// - `nearest_by_embedding` is usable only when `has_vector_index()` is
///   true; callers check the capability flag rather than catching errors.
pub trait MemoryStore: Send + Sync {
    /// Persist a new memory row.
    fn create_memory(
        &self,
        memory: &Memory,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_memory(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Memory>, RepositoryError>> + Send;

    /// Apply a partial update, advancing `updated_at`. An empty patch is an
    /// existence check. Returns whether a row matched.
    fn update_memory(
        &self,
        id: &Uuid,
        patch: &MemoryPatch,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete a memory and, in the same write transaction, every
    /// relationship referencing it as either endpoint. Returns whether a
    /// memory row was removed.
    fn delete_memory(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Persist a new relationship row. Endpoint existence is NOT validated:
    /// edges to not-yet-existing memories are accepted.
    fn create_relationship(
        &self,
        relationship: &Relationship,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Query relationships, ordered by strength descending then creation
    /// time descending, capped at `filter.limit`.
    fn get_relationships(
        &self,
        filter: &RelationshipFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Relationship>, RepositoryError>> + Send;

    /// Apply a partial update. Relationships track no `updated_at`.
    /// An empty patch is an existence check. Returns whether a row matched.
    fn update_relationship(
        &self,
        id: &Uuid,
        patch: &RelationshipPatch,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    fn delete_relationship(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert or overwrite the embedding row for a memory.
    fn upsert_embedding(
        &self,
        id: &Uuid,
        vector: &[f32],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove the embedding row for a memory, if any.
    fn delete_embedding(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Linear-scan nearest-neighbor query by cosine distance: rows within
    /// `max_distance` of `query`, ascending by distance, capped at `limit`,
    /// resolved to their memory records.
    fn nearest_by_embedding(
        &self,
        query: &[f32],
        max_distance: f32,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Memory>, RepositoryError>> + Send;

    /// Case-sensitive substring containment scan over memory content,
    /// most-recently-created first, capped at `limit`.
    fn search_content(
        &self,
        needle: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Memory>, RepositoryError>> + Send;

    /// Whether the vector index subsystem initialized successfully.
    fn has_vector_index(&self) -> bool;
}
