//! Memory service: embedding-synchronized writes, similarity search with
//! substring fallback, relationship CRUD, and bounded-depth graph traversal.
//!
//! The service holds the storage and embedder handles as fields and issues
//! operations sequentially within each call; concurrency across calls is
//! whatever the storage engine provides. Every read re-queries storage --
//! there are no cached copies.

use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use memograph_types::error::{EmbedderError, MemoryError};
use memograph_types::memory::{IndexSync, Memory, MemoryPatch, MemoryWrite, Metadata};
use memograph_types::relationship::{Relationship, RelationshipFilter, RelationshipPatch};

use super::embedder::Embedder;
use super::store::MemoryStore;

/// Default result cap for similarity search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default similarity floor for the vector search path. Converted to a
/// cosine distance bound as `1 - threshold`.
pub const DEFAULT_SEARCH_THRESHOLD: f32 = 0.5;

/// Default hop bound for graph traversal.
pub const DEFAULT_TRAVERSAL_DEPTH: usize = 2;

/// Service implementing the memory/relationship data engine.
///
/// Generic over the storage and embedder traits so memograph-core never
/// depends on memograph-infra.
pub struct MemoryService<S: MemoryStore, E: Embedder> {
    store: S,
    embedder: E,
}

impl<S: MemoryStore, E: Embedder> MemoryService<S, E> {
    pub fn new(store: S, embedder: E) -> Self {
        Self { store, embedder }
    }

    /// Add a memory.
    ///
    /// The embedding round-trip happens first and its failure fails the whole
    /// call: a new memory must not silently lack an embedding unless the
    /// vector subsystem itself is disabled. The embedding row write that
    /// follows the primary insert is best-effort; its outcome is reported in
    /// [`MemoryWrite::index`] and never fails the call.
    pub async fn add_memory(
        &self,
        content: &str,
        metadata: Metadata,
    ) -> Result<MemoryWrite, MemoryError> {
        if content.is_empty() {
            return Err(MemoryError::Validation(
                "content cannot be empty".to_string(),
            ));
        }

        let vector = self.embed_one(content).await?;

        let now = Utc::now();
        let memory = Memory {
            id: Uuid::now_v7(),
            content: content.to_string(),
            metadata,
            created_at: now,
            updated_at: now,
        };
        self.store.create_memory(&memory).await?;

        let index = self.sync_embedding(&memory.id, &vector).await;
        Ok(MemoryWrite {
            id: memory.id,
            index,
        })
    }

    pub async fn get_memory(&self, id: &Uuid) -> Result<Option<Memory>, MemoryError> {
        Ok(self.store.get_memory(id).await?)
    }

    /// Update a memory's content and/or metadata.
    ///
    /// Returns false when the memory does not exist, true as a no-op when
    /// neither field is given. A content change regenerates the embedding
    /// (generation failure propagates, same asymmetry as [`Self::add_memory`])
    /// and best-effort overwrites the embedding row. A given metadata
    /// document replaces the stored one wholesale.
    pub async fn update_memory(
        &self,
        id: &Uuid,
        content: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<bool, MemoryError> {
        if self.store.get_memory(id).await?.is_none() {
            return Ok(false);
        }
        if content.is_none() && metadata.is_none() {
            return Ok(true);
        }
        if content == Some("") {
            return Err(MemoryError::Validation(
                "content cannot be empty".to_string(),
            ));
        }

        let vector = match content {
            Some(text) => Some(self.embed_one(text).await?),
            None => None,
        };

        let patch = MemoryPatch {
            content: content.map(str::to_string),
            metadata,
        };
        let updated = self.store.update_memory(id, &patch).await?;

        if updated {
            if let Some(vector) = vector {
                self.sync_embedding(id, &vector).await;
            }
        }
        Ok(updated)
    }

    /// Delete a memory. The storage layer cascades relationship removal;
    /// the embedding row is deleted best-effort afterwards.
    pub async fn delete_memory(&self, id: &Uuid) -> Result<bool, MemoryError> {
        let deleted = self.store.delete_memory(id).await?;
        if let Err(e) = self.store.delete_embedding(id).await {
            warn!(memory_id = %id, error = %e, "failed to delete embedding row");
        }
        Ok(deleted)
    }

    /// Similarity search with fallback.
    ///
    /// When the vector index is available, the query is embedded and matched
    /// by cosine distance with `max_distance = 1 - threshold`. On any failure
    /// in that path -- provider down, malformed state, storage error -- the
    /// call falls back to a case-sensitive substring scan, most-recent first.
    /// The two strategies are never merged within one call.
    pub async fn search_memories(
        &self,
        query: &str,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<Memory>, MemoryError> {
        if self.store.has_vector_index() {
            match self.vector_search(query, limit, threshold).await {
                Ok(memories) => return Ok(memories),
                Err(e) => {
                    warn!(error = %e, "semantic search failed, falling back to substring scan");
                }
            }
        } else {
            debug!("vector index disabled, using substring scan");
        }
        Ok(self.store.search_content(query, limit).await?)
    }

    async fn vector_search(
        &self,
        query: &str,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<Memory>, MemoryError> {
        let vector = self.embed_one(query).await?;
        let max_distance = 1.0 - threshold;
        Ok(self
            .store
            .nearest_by_embedding(&vector, max_distance, limit)
            .await?)
    }

    /// Create a relationship between two memories.
    ///
    /// Endpoint existence is not validated: an edge naming a memory that does
    /// not (yet) exist is accepted and simply never matches queries until the
    /// memory appears.
    pub async fn add_relationship(
        &self,
        from_memory_id: Uuid,
        to_memory_id: Uuid,
        relationship_type: &str,
        strength: f64,
        metadata: Metadata,
    ) -> Result<Uuid, MemoryError> {
        if relationship_type.is_empty() {
            return Err(MemoryError::Validation(
                "relationship_type cannot be empty".to_string(),
            ));
        }

        let relationship = Relationship {
            id: Uuid::now_v7(),
            from_memory_id,
            to_memory_id,
            relationship_type: relationship_type.to_string(),
            strength,
            metadata,
            created_at: Utc::now(),
        };
        self.store.create_relationship(&relationship).await?;
        Ok(relationship.id)
    }

    pub async fn get_relationships(
        &self,
        filter: RelationshipFilter,
    ) -> Result<Vec<Relationship>, MemoryError> {
        Ok(self.store.get_relationships(&filter).await?)
    }

    /// Update a relationship's strength and/or metadata. Same no-op and
    /// missing-id semantics as [`Self::update_memory`]; relationships track
    /// no `updated_at`.
    pub async fn update_relationship(
        &self,
        id: &Uuid,
        strength: Option<f64>,
        metadata: Option<Metadata>,
    ) -> Result<bool, MemoryError> {
        let patch = RelationshipPatch { strength, metadata };
        Ok(self.store.update_relationship(id, &patch).await?)
    }

    pub async fn delete_relationship(&self, id: &Uuid) -> Result<bool, MemoryError> {
        Ok(self.store.delete_relationship(id).await?)
    }

    /// Breadth-first traversal over the undirected view of the relationship
    /// graph.
    ///
    /// Returns the memory records for every node reached within 1..=max_depth
    /// hops of `start`, excluding `start` itself. Edge direction is ignored
    /// for reachability. Node ids that resolve to no memory record are
    /// silently omitted. One relationship query per explored node.
    pub async fn get_connected_memories(
        &self,
        start: &Uuid,
        max_depth: usize,
    ) -> Result<Vec<Memory>, MemoryError> {
        let mut visited: HashSet<Uuid> = HashSet::from([*start]);
        let mut frontier: VecDeque<(Uuid, usize)> = VecDeque::from([(*start, 0)]);
        let mut connected: Vec<Uuid> = Vec::new();

        while let Some((node, depth)) = frontier.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let edges = self
                .store
                .get_relationships(&RelationshipFilter::touching(node))
                .await?;
            for edge in edges {
                let neighbor = if edge.from_memory_id == node {
                    edge.to_memory_id
                } else {
                    edge.from_memory_id
                };
                if visited.insert(neighbor) {
                    connected.push(neighbor);
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        let mut memories = Vec::with_capacity(connected.len());
        for id in connected {
            if let Some(memory) = self.store.get_memory(&id).await? {
                memories.push(memory);
            }
        }
        Ok(memories)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            MemoryError::Embedding(EmbedderError::Http(
                "provider returned no vectors".to_string(),
            ))
        })
    }

    async fn sync_embedding(&self, id: &Uuid, vector: &[f32]) -> IndexSync {
        if !self.store.has_vector_index() {
            return IndexSync::Skipped;
        }
        match self.store.upsert_embedding(id, vector).await {
            Ok(()) => IndexSync::Synced,
            Err(e) => {
                warn!(memory_id = %id, error = %e, "failed to sync embedding row");
                IndexSync::Failed
            }
        }
    }
}
