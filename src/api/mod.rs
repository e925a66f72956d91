//! API Module
//!
//! HTTP handlers and routing for the cache admin REST API.
//!
//! # Endpoints
//! - `GET /stats` - Aggregate cache statistics
//! - `GET /stats/:cache_type` - Statistics for one cache type
//! - `DELETE /cache` - Clear all cache types
//! - `DELETE /cache/:cache_type` - Clear one cache type
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
