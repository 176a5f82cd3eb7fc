//! Memory types for Memograph.
//!
//! A memory is a short unit of text content with an arbitrary JSON metadata
//! document attached. Embeddings live in a separate side table and a memory
//! without one is a perfectly valid, persistent state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Arbitrary key-value metadata attached to memories and relationships.
///
/// Stored as JSON text; parsed leniently on read (an unparsable or absent
/// document reads back as an empty mapping).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    /// The memory text. Required, never empty.
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    /// Advances on content/metadata mutation; embedding-only writes and
    /// relationship changes never touch it.
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a memory. `None` fields are left untouched;
/// a given `metadata` replaces the stored document wholesale.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub metadata: Option<Metadata>,
}

impl MemoryPatch {
    /// True when no field is set (an empty patch is a no-op existence check).
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.metadata.is_none()
    }
}

/// Outcome of syncing the embedding side table after a memory write.
///
/// The primary row write and the auxiliary index write have independent
/// outcomes: the index sync is best-effort and its failure never fails the
/// overall operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSync {
    /// Embedding row written.
    Synced,
    /// Vector index disabled; nothing to write.
    Skipped,
    /// Embedding row write failed (logged, swallowed).
    Failed,
}

impl fmt::Display for IndexSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSync::Synced => write!(f, "synced"),
            IndexSync::Skipped => write!(f, "skipped"),
            IndexSync::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a successful memory write: the new identifier plus the
/// auxiliary index sync outcome.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryWrite {
    pub id: Uuid,
    pub index: IndexSync,
}
