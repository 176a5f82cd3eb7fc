//! Relationship types for Memograph.
//!
//! Relationships are directed, typed, weighted edges between two memories.
//! Graph traversal treats them as undirected for reachability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::memory::Metadata;

/// A directed, typed, weighted edge between two memories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub from_memory_id: Uuid,
    pub to_memory_id: Uuid,
    /// Free-form label (e.g. "references", "contradicts").
    pub relationship_type: String,
    /// Conventionally in [0, 1]; not enforced.
    pub strength: f64,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

/// Which endpoint a `memory_id` filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The memory is the edge source.
    From,
    /// The memory is the edge target.
    To,
    /// The memory is either endpoint.
    Both,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Both
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::From => write!(f, "from"),
            Direction::To => write!(f, "to"),
            Direction::Both => write!(f, "both"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "from" => Ok(Direction::From),
            "to" => Ok(Direction::To),
            "both" => Ok(Direction::Both),
            other => Err(format!("invalid direction: '{other}'")),
        }
    }
}

/// Filter for relationship queries.
///
/// Results are ordered by strength descending, then creation time descending.
#[derive(Debug, Clone)]
pub struct RelationshipFilter {
    /// Restrict to edges touching this memory (per `direction`).
    pub memory_id: Option<Uuid>,
    /// Exact match on the type label.
    pub relationship_type: Option<String>,
    pub direction: Direction,
    /// Inclusive lower bound on strength.
    pub min_strength: f64,
    pub limit: i64,
}

impl Default for RelationshipFilter {
    fn default() -> Self {
        Self {
            memory_id: None,
            relationship_type: None,
            direction: Direction::Both,
            min_strength: 0.0,
            limit: 100,
        }
    }
}

impl RelationshipFilter {
    /// Filter matching every edge touching `memory_id`, without the default
    /// result cap. Used by graph traversal, which must see all edges.
    pub fn touching(memory_id: Uuid) -> Self {
        Self {
            memory_id: Some(memory_id),
            limit: i64::MAX,
            ..Self::default()
        }
    }
}

/// Partial update for a relationship. Relationships keep no `updated_at`;
/// only strength and metadata mutate in place.
#[derive(Debug, Clone, Default)]
pub struct RelationshipPatch {
    pub strength: Option<f64>,
    pub metadata: Option<Metadata>,
}

impl RelationshipPatch {
    pub fn is_empty(&self) -> bool {
        self.strength.is_none() && self.metadata.is_none()
    }
}
