//! REST API server runner.

use anyhow::Result;
use tracing::info;

use crate::http::router::build_router;
use crate::state::AppState;

/// Run the REST API server until interrupted.
///
/// Embedding provider preconditions (availability poll, model warm-up) are
/// checked once before accepting requests; a failed check degrades semantic
/// search rather than aborting startup.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    info!(data_dir = %state.data_dir.display(), "using data directory");
    state.check_embedding_provider().await;

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(%bind, "memograph API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
