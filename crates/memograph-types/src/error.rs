use thiserror::Error;

/// Errors from repository operations (used by trait definitions in memograph-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the embedding provider adapter.
#[derive(Debug, Error)]
pub enum EmbedderError {
    /// The provider never became reachable (startup poll exhausted) or the
    /// request could not be sent.
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("embedding request failed: {0}")]
    Http(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
}

/// Errors surfaced by the memory service.
///
/// Not-found is never an error here: reads return `Option`, updates and
/// deletes return `bool`.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Embedding generation failed on a write path. Propagated, not swallowed:
    /// new or re-written memories must not silently lack embeddings.
    #[error("embedding generation failed: {0}")]
    Embedding(#[from] EmbedderError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("validation error: {0}")]
    Validation(String),
}
