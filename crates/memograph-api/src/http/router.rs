//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.

use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Memory CRUD + search + traversal
        .route("/memories", post(handlers::memory::add_memory))
        .route("/memories/search", post(handlers::memory::search_memories))
        .route("/memories/{id}", get(handlers::memory::get_memory))
        .route("/memories/{id}", put(handlers::memory::update_memory))
        .route("/memories/{id}", delete(handlers::memory::delete_memory))
        .route(
            "/memories/{id}/connected",
            get(handlers::memory::get_connected_memories),
        )
        // Relationship CRUD
        .route(
            "/relationships",
            post(handlers::relationship::add_relationship),
        )
        .route(
            "/relationships",
            get(handlers::relationship::get_relationships),
        )
        .route(
            "/relationships/{id}",
            put(handlers::relationship::update_relationship),
        )
        .route(
            "/relationships/{id}",
            delete(handlers::relationship::delete_relationship),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let db_ok = sqlx::query("SELECT 1")
        .fetch_one(&state.db_pool.reader)
        .await
        .is_ok();
    axum::Json(serde_json::json!({ "status": if db_ok { "ok" } else { "degraded" } }))
}
