//! Error types for the cache subsystem
//!
//! Provides unified error handling using thiserror.
//!
//! Every error defined here is internal to the cache: on the get/set/delete
//! hot path the facade swallows them (fail-open), so a cache outage degrades
//! to uncached latency rather than a caller-visible failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache subsystem.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A call argument could not be normalized into the canonical key form
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Store connectivity, timeout, or storage-engine failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A payload or persisted document failed to (de)serialize
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == IntoResponse Implementation ==
/// HTTP mapping for the admin API. Library callers never see these errors on
/// the hot path; only the operator-facing stats/clear endpoints surface them.
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::KeyDerivation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::StoreUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CacheError::Serialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache subsystem.
pub type Result<T> = std::result::Result<T, CacheError>;
