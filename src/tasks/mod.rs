//! Background Tasks Module
//!
//! Contains background tasks that run periodically during operation.
//!
//! # Tasks
//! - Expiry sweep: reclaims entries past `expires_at` at configured intervals

mod cleanup;

pub use cleanup::spawn_purge_task;
