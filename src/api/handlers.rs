//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints. Stats and clear
//! are operator-facing, so store failures surface as HTTP errors here
//! instead of being swallowed like on the library hot path.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::Cache;
use crate::error::Result;
use crate::models::{ClearResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide cache facade
    pub cache: Arc<Cache>,
}

impl AppState {
    /// Creates a new AppState around the shared facade.
    pub fn new(cache: Arc<Cache>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /stats
///
/// Returns aggregate statistics across all cache types.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats(None).await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /stats/:cache_type
///
/// Returns statistics scoped to one cache type.
pub async fn stats_for_type_handler(
    State(state): State<AppState>,
    Path(cache_type): Path<String>,
) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats(Some(&cache_type)).await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for DELETE /cache
///
/// Removes every entry across all cache types.
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let cleared = state.cache.clear(None).await?;
    Ok(Json(ClearResponse::new(None, cleared)))
}

/// Handler for DELETE /cache/:cache_type
///
/// Removes every entry in one cache-type partition; other types are
/// untouched.
pub async fn clear_type_handler(
    State(state): State<AppState>,
    Path(cache_type): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cleared = state.cache.clear(Some(&cache_type)).await?;
    Ok(Json(ClearResponse::new(Some(&cache_type), cleared)))
}

/// Handler for GET /health
///
/// Returns health status and the active store backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.store().name()))
}
