//! SQLite memory store implementation.
//!
//! Implements `MemoryStore` from `memograph-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, RFC 3339 text
//! timestamps, JSON-text metadata parsed leniently on read.
//!
//! The vector index is a plain side table (`memory_embeddings`) holding each
//! vector as little-endian f32 bytes; nearest-neighbor queries are a linear
//! scan with cosine distance computed in process. The index is a startup
//! capability: `with_vector_index` validates the configured dimension against
//! any stored rows and soft-disables on mismatch.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, warn};
use uuid::Uuid;

use memograph_core::memory::store::MemoryStore;
use memograph_types::error::RepositoryError;
use memograph_types::memory::{Memory, MemoryPatch, Metadata};
use memograph_types::relationship::{
    Direction, Relationship, RelationshipFilter, RelationshipPatch,
};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MemoryStore`.
pub struct SqliteMemoryStore {
    pool: DatabasePool,
    vector: Option<VectorIndex>,
}

#[derive(Debug, Clone, Copy)]
struct VectorIndex {
    dimension: usize,
}

impl SqliteMemoryStore {
    /// Create a new store with the vector index disabled.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool, vector: None }
    }

    /// Enable the vector index for `dimension`-wide embeddings.
    ///
    /// Soft-fails: a zero dimension, a stored-row width that contradicts the
    /// configured dimension, or an inspection error all leave the index
    /// disabled (logged), never error. Absence of the index must not prevent
    /// memory CRUD.
    pub async fn with_vector_index(mut self, dimension: usize) -> Self {
        if dimension == 0 {
            warn!("vector index disabled: dimension must be nonzero");
            self.vector = None;
            return self;
        }

        let sample: Result<Option<(i64,)>, sqlx::Error> =
            sqlx::query_as("SELECT length(embedding) FROM memory_embeddings LIMIT 1")
                .fetch_optional(&self.pool.reader)
                .await;

        match sample {
            Ok(Some((width,))) if width != (dimension * 4) as i64 => {
                warn!(
                    stored_dimension = width / 4,
                    configured_dimension = dimension,
                    "vector index disabled: stored embedding width does not match configuration"
                );
                self.vector = None;
            }
            Ok(_) => {
                self.vector = Some(VectorIndex { dimension });
            }
            Err(e) => {
                warn!(error = %e, "vector index disabled: could not inspect memory_embeddings");
                self.vector = None;
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MemoryRow {
    id: String,
    content: String,
    metadata: String,
    created_at: String,
    updated_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_memory(self) -> Result<Memory, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid memory id: {e}")))?;
        Ok(Memory {
            id,
            content: self.content,
            metadata: parse_metadata(&self.metadata),
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct RelationshipRow {
    id: String,
    from_memory_id: String,
    to_memory_id: String,
    relationship_type: String,
    strength: f64,
    metadata: String,
    created_at: String,
}

impl RelationshipRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            from_memory_id: row.try_get("from_memory_id")?,
            to_memory_id: row.try_get("to_memory_id")?,
            relationship_type: row.try_get("relationship_type")?,
            strength: row.try_get("strength")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_relationship(self) -> Result<Relationship, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid relationship id: {e}")))?;
        let from_memory_id = Uuid::parse_str(&self.from_memory_id)
            .map_err(|e| RepositoryError::Query(format!("invalid from_memory_id: {e}")))?;
        let to_memory_id = Uuid::parse_str(&self.to_memory_id)
            .map_err(|e| RepositoryError::Query(format!("invalid to_memory_id: {e}")))?;
        Ok(Relationship {
            id,
            from_memory_id,
            to_memory_id,
            relationship_type: self.relationship_type,
            strength: self.strength,
            metadata: parse_metadata(&self.metadata),
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Lenient metadata parse: an absent or unparsable document reads back as an
/// empty mapping, never an error.
fn parse_metadata(s: &str) -> Metadata {
    serde_json::from_str(s).unwrap_or_default()
}

fn serialize_metadata(metadata: &Metadata) -> Result<String, RepositoryError> {
    serde_json::to_string(metadata)
        .map_err(|e| RepositoryError::Query(format!("invalid metadata: {e}")))
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ---------------------------------------------------------------------------
// MemoryStore implementation
// ---------------------------------------------------------------------------

impl MemoryStore for SqliteMemoryStore {
    async fn create_memory(&self, memory: &Memory) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO memories (id, content, metadata, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(memory.id.to_string())
        .bind(&memory.content)
        .bind(serialize_metadata(&memory.metadata)?)
        .bind(format_datetime(&memory.created_at))
        .bind(format_datetime(&memory.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_memory(&self, id: &Uuid) -> Result<Option<Memory>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM memories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let memory_row =
                    MemoryRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(memory_row.into_memory()?))
            }
            None => Ok(None),
        }
    }

    async fn update_memory(&self, id: &Uuid, patch: &MemoryPatch) -> Result<bool, RepositoryError> {
        if patch.is_empty() {
            let row = sqlx::query("SELECT 1 FROM memories WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            return Ok(row.is_some());
        }

        let metadata_json = match &patch.metadata {
            Some(metadata) => Some(serialize_metadata(metadata)?),
            None => None,
        };

        let mut sql = String::from("UPDATE memories SET updated_at = ?");
        if patch.content.is_some() {
            sql.push_str(", content = ?");
        }
        if metadata_json.is_some() {
            sql.push_str(", metadata = ?");
        }
        sql.push_str(" WHERE id = ?");

        let mut query = sqlx::query(&sql).bind(format_datetime(&Utc::now()));
        if let Some(content) = &patch.content {
            query = query.bind(content);
        }
        if let Some(metadata) = &metadata_json {
            query = query.bind(metadata);
        }
        let result = query
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_memory(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        let id_text = id.to_string();

        // Cascade and primary delete in one write transaction: no dangling
        // relationship may survive a memory deletion.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM relationships WHERE from_memory_id = ? OR to_memory_id = ?")
            .bind(&id_text)
            .bind(&id_text)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(&id_text)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO relationships (id, from_memory_id, to_memory_id, relationship_type, strength, metadata, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(relationship.id.to_string())
        .bind(relationship.from_memory_id.to_string())
        .bind(relationship.to_memory_id.to_string())
        .bind(&relationship.relationship_type)
        .bind(relationship.strength)
        .bind(serialize_metadata(&relationship.metadata)?)
        .bind(format_datetime(&relationship.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_relationships(
        &self,
        filter: &RelationshipFilter,
    ) -> Result<Vec<Relationship>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM relationships WHERE strength >= ?");
        if filter.memory_id.is_some() {
            match filter.direction {
                Direction::From => sql.push_str(" AND from_memory_id = ?"),
                Direction::To => sql.push_str(" AND to_memory_id = ?"),
                Direction::Both => {
                    sql.push_str(" AND (from_memory_id = ? OR to_memory_id = ?)");
                }
            }
        }
        if filter.relationship_type.is_some() {
            sql.push_str(" AND relationship_type = ?");
        }
        sql.push_str(" ORDER BY strength DESC, created_at DESC");
        sql.push_str(&format!(" LIMIT {}", filter.limit));

        let mut query = sqlx::query(&sql).bind(filter.min_strength);
        if let Some(memory_id) = &filter.memory_id {
            let id_text = memory_id.to_string();
            query = query.bind(id_text.clone());
            if filter.direction == Direction::Both {
                query = query.bind(id_text);
            }
        }
        if let Some(relationship_type) = &filter.relationship_type {
            query = query.bind(relationship_type);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut relationships = Vec::with_capacity(rows.len());
        for row in &rows {
            let relationship_row = RelationshipRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            relationships.push(relationship_row.into_relationship()?);
        }
        Ok(relationships)
    }

    async fn update_relationship(
        &self,
        id: &Uuid,
        patch: &RelationshipPatch,
    ) -> Result<bool, RepositoryError> {
        if patch.is_empty() {
            let row = sqlx::query("SELECT 1 FROM relationships WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            return Ok(row.is_some());
        }

        let metadata_json = match &patch.metadata {
            Some(metadata) => Some(serialize_metadata(metadata)?),
            None => None,
        };

        // Relationships track no updated_at; only the given fields change.
        let mut sets: Vec<&str> = Vec::new();
        if patch.strength.is_some() {
            sets.push("strength = ?");
        }
        if metadata_json.is_some() {
            sets.push("metadata = ?");
        }
        let sql = format!(
            "UPDATE relationships SET {} WHERE id = ?",
            sets.join(", ")
        );

        let mut query = sqlx::query(&sql);
        if let Some(strength) = patch.strength {
            query = query.bind(strength);
        }
        if let Some(metadata) = &metadata_json {
            query = query.bind(metadata);
        }
        let result = query
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_relationship(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM relationships WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_embedding(&self, id: &Uuid, vector: &[f32]) -> Result<(), RepositoryError> {
        if let Some(index) = &self.vector {
            if vector.len() != index.dimension {
                return Err(RepositoryError::Query(format!(
                    "embedding has {} dimensions, index expects {}",
                    vector.len(),
                    index.dimension
                )));
            }
        }

        sqlx::query(
            r#"INSERT INTO memory_embeddings (id, embedding) VALUES (?, ?)
               ON CONFLICT(id) DO UPDATE SET embedding = excluded.embedding"#,
        )
        .bind(id.to_string())
        .bind(encode_embedding(vector))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete_embedding(&self, id: &Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM memory_embeddings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn nearest_by_embedding(
        &self,
        query: &[f32],
        max_distance: f32,
        limit: usize,
    ) -> Result<Vec<Memory>, RepositoryError> {
        let Some(index) = &self.vector else {
            return Err(RepositoryError::Query(
                "vector index not initialized".to_string(),
            ));
        };
        if query.len() != index.dimension {
            return Err(RepositoryError::Query(format!(
                "query has {} dimensions, index expects {}",
                query.len(),
                index.dimension
            )));
        }

        let rows: Vec<(String, Vec<u8>)> =
            sqlx::query_as("SELECT id, embedding FROM memory_embeddings")
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut scored: Vec<(f32, String)> = Vec::new();
        for (id, bytes) in rows {
            if bytes.len() != index.dimension * 4 {
                debug!(memory_id = %id, "skipping embedding row with unexpected width");
                continue;
            }
            let vector = decode_embedding(&bytes);
            let distance = cosine_distance(query, &vector);
            if distance <= max_distance {
                scored.push((distance, id));
            }
        }
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        // Stale index rows (no matching memory) are dropped silently.
        let mut memories = Vec::with_capacity(scored.len());
        for (_, id) in scored {
            let row = sqlx::query("SELECT * FROM memories WHERE id = ?")
                .bind(&id)
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            if let Some(row) = row {
                let memory_row =
                    MemoryRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                memories.push(memory_row.into_memory()?);
            }
        }
        Ok(memories)
    }

    async fn search_content(
        &self,
        needle: &str,
        limit: usize,
    ) -> Result<Vec<Memory>, RepositoryError> {
        // instr() is case-sensitive, unlike LIKE.
        let sql = format!(
            "SELECT * FROM memories WHERE instr(content, ?) > 0 ORDER BY created_at DESC LIMIT {limit}"
        );
        let rows = sqlx::query(&sql)
            .bind(needle)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut memories = Vec::with_capacity(rows.len());
        for row in &rows {
            let memory_row =
                MemoryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            memories.push(memory_row.into_memory()?);
        }
        Ok(memories)
    }

    fn has_vector_index(&self) -> bool {
        self.vector.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memograph_core::memory::embedder::Embedder;
    use memograph_core::memory::service::MemoryService;
    use memograph_types::error::EmbedderError;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn test_store() -> SqliteMemoryStore {
        SqliteMemoryStore::new(test_pool().await)
            .with_vector_index(3)
            .await
    }

    fn make_memory(content: &str) -> Memory {
        let now = Utc::now();
        Memory {
            id: Uuid::now_v7(),
            content: content.to_string(),
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn make_relationship(from: Uuid, to: Uuid, rel_type: &str, strength: f64) -> Relationship {
        Relationship {
            id: Uuid::now_v7(),
            from_memory_id: from,
            to_memory_id: to,
            relationship_type: rel_type.to_string(),
            strength,
            metadata: Metadata::new(),
            created_at: Utc::now(),
        }
    }

    fn meta(key: &str, value: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert(key.to_string(), serde_json::json!(value));
        m
    }

    // --- Memory CRUD ---

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = test_store().await;
        let mut memory = make_memory("User runs Linux");
        memory.metadata = meta("source", "observed");

        store.create_memory(&memory).await.unwrap();
        let loaded = store.get_memory(&memory.id).await.unwrap().unwrap();

        assert_eq!(loaded.content, "User runs Linux");
        assert_eq!(loaded.metadata, meta("source", "observed"));
        assert_eq!(loaded.id, memory.id);
    }

    #[tokio::test]
    async fn test_missing_id_contracts() {
        let store = test_store().await;
        let unknown = Uuid::now_v7();

        assert!(store.get_memory(&unknown).await.unwrap().is_none());
        assert!(!store.delete_memory(&unknown).await.unwrap());
        let patch = MemoryPatch {
            content: Some("x".to_string()),
            metadata: None,
        };
        assert!(!store.update_memory(&unknown, &patch).await.unwrap());
        assert!(!store.delete_relationship(&unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_memory_advances_updated_at() {
        let store = test_store().await;
        let memory = make_memory("before");
        store.create_memory(&memory).await.unwrap();

        let patch = MemoryPatch {
            content: Some("after".to_string()),
            metadata: None,
        };
        assert!(store.update_memory(&memory.id, &patch).await.unwrap());

        let loaded = store.get_memory(&memory.id).await.unwrap().unwrap();
        assert_eq!(loaded.content, "after");
        assert!(loaded.updated_at >= memory.updated_at);
        assert_eq!(loaded.created_at, memory.created_at);
    }

    #[tokio::test]
    async fn test_update_memory_metadata_only() {
        let store = test_store().await;
        let mut memory = make_memory("constant");
        memory.metadata = meta("old", "value");
        store.create_memory(&memory).await.unwrap();

        let patch = MemoryPatch {
            content: None,
            metadata: Some(meta("new", "value")),
        };
        assert!(store.update_memory(&memory.id, &patch).await.unwrap());

        let loaded = store.get_memory(&memory.id).await.unwrap().unwrap();
        assert_eq!(loaded.content, "constant");
        assert_eq!(loaded.metadata, meta("new", "value"));
    }

    #[tokio::test]
    async fn test_empty_patch_is_existence_check() {
        let store = test_store().await;
        let memory = make_memory("here");
        store.create_memory(&memory).await.unwrap();

        let empty = MemoryPatch::default();
        assert!(store.update_memory(&memory.id, &empty).await.unwrap());
        assert!(!store.update_memory(&Uuid::now_v7(), &empty).await.unwrap());

        // The existence check must not advance updated_at.
        let loaded = store.get_memory(&memory.id).await.unwrap().unwrap();
        assert_eq!(
            format_datetime(&loaded.updated_at),
            format_datetime(&memory.updated_at)
        );
    }

    #[tokio::test]
    async fn test_unparsable_metadata_reads_as_empty() {
        let store = test_store().await;
        let memory = make_memory("broken metadata");
        store.create_memory(&memory).await.unwrap();

        sqlx::query("UPDATE memories SET metadata = 'not json' WHERE id = ?")
            .bind(memory.id.to_string())
            .execute(&store.pool.writer)
            .await
            .unwrap();

        let loaded = store.get_memory(&memory.id).await.unwrap().unwrap();
        assert!(loaded.metadata.is_empty());
    }

    // --- Relationships ---

    #[tokio::test]
    async fn test_delete_memory_cascades_relationships() {
        let store = test_store().await;
        let a = make_memory("A");
        let b = make_memory("B");
        store.create_memory(&a).await.unwrap();
        store.create_memory(&b).await.unwrap();

        let rel = make_relationship(a.id, b.id, "references", 1.0);
        store.create_relationship(&rel).await.unwrap();

        assert!(store.delete_memory(&a.id).await.unwrap());

        let filter = RelationshipFilter {
            memory_id: Some(b.id),
            ..Default::default()
        };
        assert!(store.get_relationships(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dangling_relationship_insert_is_accepted() {
        let store = test_store().await;
        let rel = make_relationship(Uuid::now_v7(), Uuid::now_v7(), "speculative", 0.4);
        store.create_relationship(&rel).await.unwrap();

        let all = store
            .get_relationships(&RelationshipFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].relationship_type, "speculative");
    }

    #[tokio::test]
    async fn test_relationship_ordering_strength_then_recency() {
        let store = test_store().await;
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let mut older = make_relationship(a, b, "tie", 0.5);
        older.created_at = Utc::now() - chrono::Duration::seconds(60);
        let newer = make_relationship(a, b, "tie", 0.5);
        let strongest = make_relationship(a, b, "top", 0.9);

        store.create_relationship(&older).await.unwrap();
        store.create_relationship(&newer).await.unwrap();
        store.create_relationship(&strongest).await.unwrap();

        let all = store
            .get_relationships(&RelationshipFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, strongest.id);
        // Equal strength: newer creation time first.
        assert_eq!(all[1].id, newer.id);
        assert_eq!(all[2].id, older.id);
    }

    #[tokio::test]
    async fn test_relationship_direction_filters() {
        let store = test_store().await;
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let outgoing = make_relationship(a, b, "out", 1.0);
        let incoming = make_relationship(b, a, "in", 1.0);
        store.create_relationship(&outgoing).await.unwrap();
        store.create_relationship(&incoming).await.unwrap();

        let from_only = store
            .get_relationships(&RelationshipFilter {
                memory_id: Some(a),
                direction: Direction::From,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(from_only.len(), 1);
        assert_eq!(from_only[0].id, outgoing.id);

        let to_only = store
            .get_relationships(&RelationshipFilter {
                memory_id: Some(a),
                direction: Direction::To,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(to_only.len(), 1);
        assert_eq!(to_only[0].id, incoming.id);

        let both = store
            .get_relationships(&RelationshipFilter {
                memory_id: Some(a),
                direction: Direction::Both,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(both.len(), 2);
    }

    #[tokio::test]
    async fn test_relationship_min_strength_inclusive() {
        let store = test_store().await;
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        store
            .create_relationship(&make_relationship(a, b, "weak", 0.3))
            .await
            .unwrap();
        store
            .create_relationship(&make_relationship(a, b, "exact", 0.5))
            .await
            .unwrap();
        store
            .create_relationship(&make_relationship(a, b, "strong", 0.9))
            .await
            .unwrap();

        let filtered = store
            .get_relationships(&RelationshipFilter {
                memory_id: Some(a),
                min_strength: 0.5,
                ..Default::default()
            })
            .await
            .unwrap();
        let types: Vec<&str> = filtered
            .iter()
            .map(|r| r.relationship_type.as_str())
            .collect();
        assert_eq!(types, vec!["strong", "exact"]);
    }

    #[tokio::test]
    async fn test_relationship_type_and_limit() {
        let store = test_store().await;
        let a = Uuid::now_v7();
        for i in 0..5 {
            store
                .create_relationship(&make_relationship(
                    a,
                    Uuid::now_v7(),
                    if i % 2 == 0 { "even" } else { "odd" },
                    1.0,
                ))
                .await
                .unwrap();
        }

        let evens = store
            .get_relationships(&RelationshipFilter {
                relationship_type: Some("even".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(evens.len(), 3);

        let capped = store
            .get_relationships(&RelationshipFilter {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_update_relationship_partial() {
        let store = test_store().await;
        let rel = make_relationship(Uuid::now_v7(), Uuid::now_v7(), "mutable", 0.1);
        store.create_relationship(&rel).await.unwrap();

        let patch = RelationshipPatch {
            strength: Some(0.7),
            metadata: None,
        };
        assert!(store.update_relationship(&rel.id, &patch).await.unwrap());

        let loaded = store
            .get_relationships(&RelationshipFilter::default())
            .await
            .unwrap();
        assert_eq!(loaded[0].strength, 0.7);
        assert_eq!(loaded[0].relationship_type, "mutable");

        let empty = RelationshipPatch::default();
        assert!(store.update_relationship(&rel.id, &empty).await.unwrap());
        assert!(
            !store
                .update_relationship(&Uuid::now_v7(), &patch)
                .await
                .unwrap()
        );
    }

    // --- Embeddings and vector search ---

    #[tokio::test]
    async fn test_upsert_embedding_overwrites() {
        let store = test_store().await;
        let memory = make_memory("vectored");
        store.create_memory(&memory).await.unwrap();

        store
            .upsert_embedding(&memory.id, &[1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert_embedding(&memory.id, &[0.0, 1.0, 0.0])
            .await
            .unwrap();

        let hits = store
            .nearest_by_embedding(&[0.0, 1.0, 0.0], 0.01, 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, memory.id);
    }

    #[tokio::test]
    async fn test_upsert_embedding_rejects_wrong_dimension() {
        let store = test_store().await;
        let err = store
            .upsert_embedding(&Uuid::now_v7(), &[1.0, 0.0])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("dimensions"));
    }

    #[tokio::test]
    async fn test_nearest_orders_by_distance_and_caps() {
        let store = test_store().await;
        let exact = make_memory("exact");
        let close = make_memory("close");
        let far = make_memory("far");
        for m in [&exact, &close, &far] {
            store.create_memory(m).await.unwrap();
        }
        store
            .upsert_embedding(&exact.id, &[1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert_embedding(&close.id, &[0.9, 0.1, 0.0])
            .await
            .unwrap();
        store
            .upsert_embedding(&far.id, &[0.0, 1.0, 0.0])
            .await
            .unwrap();

        let hits = store
            .nearest_by_embedding(&[1.0, 0.0, 0.0], 0.5, 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, exact.id);
        assert_eq!(hits[1].id, close.id);

        let capped = store
            .nearest_by_embedding(&[1.0, 0.0, 0.0], 0.5, 1)
            .await
            .unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].id, exact.id);
    }

    #[tokio::test]
    async fn test_nearest_drops_stale_index_rows() {
        let store = test_store().await;
        // Embedding row without a backing memory: dropped silently.
        store
            .upsert_embedding(&Uuid::now_v7(), &[1.0, 0.0, 0.0])
            .await
            .unwrap();

        let hits = store
            .nearest_by_embedding(&[1.0, 0.0, 0.0], 1.0, 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_delete_embedding_is_silent_on_missing() {
        let store = test_store().await;
        store.delete_embedding(&Uuid::now_v7()).await.unwrap();
    }

    #[tokio::test]
    async fn test_vector_index_disabled_on_width_mismatch() {
        let pool = test_pool().await;
        // Seed a two-float row, then configure a three-float index.
        sqlx::query("INSERT INTO memory_embeddings (id, embedding) VALUES (?, ?)")
            .bind(Uuid::now_v7().to_string())
            .bind(encode_embedding(&[1.0, 0.0]))
            .execute(&pool.writer)
            .await
            .unwrap();

        let store = SqliteMemoryStore::new(pool).with_vector_index(3).await;
        assert!(!store.has_vector_index());
    }

    #[tokio::test]
    async fn test_vector_index_disabled_on_zero_dimension() {
        let store = SqliteMemoryStore::new(test_pool().await)
            .with_vector_index(0)
            .await;
        assert!(!store.has_vector_index());
    }

    // --- Substring scan ---

    #[tokio::test]
    async fn test_search_content_recency_order_and_cap() {
        let store = test_store().await;
        let mut first = make_memory("shared token alpha");
        first.created_at = Utc::now() - chrono::Duration::seconds(60);
        let mut second = make_memory("shared token beta");
        second.created_at = Utc::now() - chrono::Duration::seconds(30);
        let third = make_memory("shared token gamma");
        let unrelated = make_memory("nothing in common");
        for m in [&first, &second, &third, &unrelated] {
            store.create_memory(m).await.unwrap();
        }

        let hits = store.search_content("shared token", 10).await.unwrap();
        let contents: Vec<&str> = hits.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "shared token gamma",
                "shared token beta",
                "shared token alpha"
            ]
        );

        let capped = store.search_content("shared token", 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_search_content_is_case_sensitive() {
        let store = test_store().await;
        store
            .create_memory(&make_memory("Paris is the capital of France"))
            .await
            .unwrap();

        assert_eq!(store.search_content("Paris", 10).await.unwrap().len(), 1);
        assert!(store.search_content("paris", 10).await.unwrap().is_empty());
    }

    // --- Service wired against the real store ---

    struct StubEmbedder {
        fail: bool,
    }

    impl Embedder for StubEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
            if self.fail {
                return Err(EmbedderError::Unavailable("stubbed outage".to_string()));
            }
            // Tiny deterministic "semantic" space: country keyword -> axis.
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("France") {
                        vec![1.0, 0.0, 0.0]
                    } else if t.contains("Japan") {
                        vec![0.0, 1.0, 0.0]
                    } else {
                        vec![0.0, 0.0, 1.0]
                    }
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "stub-embed"
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    #[tokio::test]
    async fn test_service_semantic_search_scenario() {
        let service = MemoryService::new(test_store().await, StubEmbedder { fail: false });

        service
            .add_memory("Paris is the capital of France", Metadata::new())
            .await
            .unwrap();
        service
            .add_memory("Tokyo is the capital of Japan", Metadata::new())
            .await
            .unwrap();

        let hits = service
            .search_memories("capital of France", 1, 0.5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "Paris is the capital of France");
    }

    #[tokio::test]
    async fn test_service_falls_back_to_substring_on_outage() {
        let pool = test_pool().await;
        let seeded = MemoryService::new(
            SqliteMemoryStore::new(pool.clone()).with_vector_index(3).await,
            StubEmbedder { fail: false },
        );
        seeded
            .add_memory("Paris is the capital of France", Metadata::new())
            .await
            .unwrap();
        seeded
            .add_memory("Tokyo is the capital of Japan", Metadata::new())
            .await
            .unwrap();

        // Same database, embedder now failing: the substring fallback serves.
        let degraded = MemoryService::new(
            SqliteMemoryStore::new(pool).with_vector_index(3).await,
            StubEmbedder { fail: true },
        );
        let hits = degraded
            .search_memories("capital of", 10, 0.5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        // Most recently created first.
        assert_eq!(hits[0].content, "Tokyo is the capital of Japan");
    }
}
