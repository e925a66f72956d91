//! API Routes
//!
//! Configures the Axum router with the cache admin endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, clear_type_handler, health_handler, stats_for_type_handler, stats_handler,
    AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /stats` - Aggregate statistics across all cache types
/// - `GET /stats/:cache_type` - Statistics for one cache type
/// - `DELETE /cache` - Clear all cache types
/// - `DELETE /cache/:cache_type` - Clear one cache type
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/stats/:cache_type", get(stats_for_type_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/:cache_type", delete(clear_type_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
