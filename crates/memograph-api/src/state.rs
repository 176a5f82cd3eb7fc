//! Application state wiring all services together.
//!
//! `AppState` holds the concrete memory service used by both CLI and REST
//! API. The service is generic over storage/embedder traits; AppState pins
//! it to the infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use memograph_core::memory::service::MemoryService;
use memograph_infra::data_dir::{database_url, load_config, resolve_data_dir};
use memograph_infra::embedding::http::HttpEmbedder;
use memograph_infra::sqlite::memory::SqliteMemoryStore;
use memograph_infra::sqlite::pool::DatabasePool;
use memograph_types::config::GlobalConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteMemoryService = MemoryService<SqliteMemoryStore, HttpEmbedder>;

/// Shared application state holding the service handles.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub memory_service: Arc<ConcreteMemoryService>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, set up the
    /// vector index capability, wire the service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir);

        let db_pool = DatabasePool::new(&database_url(&data_dir, &config)).await?;

        let mut store = SqliteMemoryStore::new(db_pool.clone());
        if config.embedding.enabled {
            store = store.with_vector_index(config.embedding.dimension).await;
        }
        let embedder = HttpEmbedder::new(&config.embedding);

        Ok(Self {
            memory_service: Arc::new(MemoryService::new(store, embedder)),
            config,
            data_dir,
            db_pool,
        })
    }

    /// Provider preconditions, checked once before serving: availability
    /// poll (1s interval, 30 attempts), then a warm-up embed so a lazily
    /// pulled model is materialized.
    ///
    /// Failure is not fatal: search degrades to the substring fallback and
    /// write paths surface provider errors per call.
    pub async fn check_embedding_provider(&self) -> bool {
        if !self.config.embedding.enabled {
            info!("embedding disabled by config; search uses substring fallback");
            return false;
        }

        // Probe with a dedicated adapter instance; it targets the same
        // provider the service's own adapter does.
        let probe = HttpEmbedder::new(&self.config.embedding);
        if let Err(e) = probe.wait_until_ready().await {
            warn!(error = %e, "embedding provider unavailable; search degrades to substring fallback");
            return false;
        }
        if let Err(e) = probe.warm_model().await {
            warn!(error = %e, "embedding model warm-up failed");
            return false;
        }
        info!(model = %self.config.embedding.model, "embedding provider ready");
        true
    }
}
