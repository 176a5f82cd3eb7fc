//! Data directory and configuration resolution.
//!
//! The data directory holds the SQLite database and an optional
//! `config.toml`. Resolution order: `MEMOGRAPH_DATA_DIR` env var, then
//! `~/.memograph`.

use std::path::{Path, PathBuf};

use tracing::warn;

use memograph_types::config::GlobalConfig;

/// Resolve the data directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEMOGRAPH_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".memograph"))
        .unwrap_or_else(|| PathBuf::from(".memograph"))
}

/// Load `{data_dir}/config.toml`, falling back to defaults when the file is
/// absent or unparsable (logged).
pub fn load_config(data_dir: &Path) -> GlobalConfig {
    let path = data_dir.join("config.toml");
    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "invalid config.toml, using defaults");
            GlobalConfig::default()
        }),
        Err(_) => GlobalConfig::default(),
    }
}

/// Compute the database URL for a data directory, honoring an explicit
/// `[database].path` override.
pub fn database_url(data_dir: &Path, config: &GlobalConfig) -> String {
    let db_path = config
        .database
        .path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("memograph.db"));
    format!("sqlite://{}?mode=rwc", db_path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.embedding.dimension, 768);
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[embedding]\ndimension = 384\n",
        )
        .unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.embedding.dimension, 384);
    }

    #[test]
    fn test_load_config_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "not = [valid").unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.embedding.dimension, 768);
    }

    #[test]
    fn test_database_url_default_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GlobalConfig::default();

        let url = database_url(dir.path(), &config);
        assert!(url.starts_with("sqlite://"));
        assert!(url.contains("memograph.db"));

        config.database.path = Some("/tmp/elsewhere.db".to_string());
        let url = database_url(dir.path(), &config);
        assert!(url.contains("/tmp/elsewhere.db"));
    }
}
