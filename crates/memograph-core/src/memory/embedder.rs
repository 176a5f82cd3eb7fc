//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding text into fixed-length vectors.
//! Implementations (e.g. the Ollama-style HTTP adapter) live in
//! memograph-infra.

use memograph_types::error::EmbedderError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors, one per input text.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbedderError>> + Send;

    /// The model name used for embeddings (e.g. "nomic-embed-text").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
