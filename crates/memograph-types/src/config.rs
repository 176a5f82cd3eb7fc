//! Global configuration types for Memograph.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! database location and the embedding provider connection.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `{data_dir}/config.toml`. All fields have sensible defaults,
/// so an absent or empty file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Database settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit database file path. Defaults to `{data_dir}/memograph.db`.
    #[serde(default)]
    pub path: Option<String>,
}

/// Embedding provider settings.
///
/// The provider is an Ollama-style HTTP service: `POST /api/embeddings`
/// with a model name and a prompt, returning one fixed-length vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the provider.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name the provider should use.
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimensionality. Deployment-wide constant: changing it on an
    /// existing database disables the vector index until re-embedding.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// When false, the vector index is never initialized and search always
    /// uses the substring fallback.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_dimension() -> usize {
    768
}

fn default_enabled() -> bool {
    true
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            dimension: default_dimension(),
            enabled: default_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert!(config.database.path.is_none());
        assert_eq!(config.embedding.base_url, "http://127.0.0.1:11434");
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.embedding.dimension, 768);
        assert!(config.embedding.enabled);
    }

    #[test]
    fn test_global_config_deserialize_empty() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.embedding.dimension, 768);
        assert!(config.embedding.enabled);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[database]
path = "/var/lib/memograph/store.db"

[embedding]
base_url = "http://embedder.internal:11434"
model = "mxbai-embed-large"
dimension = 1024
enabled = false
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.database.path.as_deref(),
            Some("/var/lib/memograph/store.db")
        );
        assert_eq!(config.embedding.model, "mxbai-embed-large");
        assert_eq!(config.embedding.dimension, 1024);
        assert!(!config.embedding.enabled);
    }

    #[test]
    fn test_partial_embedding_section_keeps_defaults() {
        let config: GlobalConfig = toml::from_str("[embedding]\nmodel = \"all-minilm\"\n").unwrap();
        assert_eq!(config.embedding.model, "all-minilm");
        assert_eq!(config.embedding.dimension, 768);
    }
}
