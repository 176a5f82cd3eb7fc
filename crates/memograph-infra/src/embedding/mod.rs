//! Embedding provider infrastructure.
//!
//! HTTP adapter for an Ollama-style embedding service, implementing the
//! `Embedder` trait from memograph-core.

pub mod http;
