//! Expiry Sweep Task
//!
//! Background task that periodically reclaims cache entries whose
//! `expires_at` has passed. This bounds storage growth independently of
//! the lazy expiry filter on reads; backends whose engine expires keys
//! natively simply report zero removals.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::Store;

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Store failures are logged and the loop continues: the
/// sweep is fail-open like the rest of the subsystem.
///
/// # Arguments
/// * `store` - Shared store adapter to sweep
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_purge_task(store: Arc<dyn Store>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            backend = store.name(),
            "starting expiry sweep task with interval of {} seconds", sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match store.purge_expired().await {
                Ok(removed) if removed > 0 => {
                    info!("expiry sweep: removed {} expired entries", removed);
                }
                Ok(_) => {
                    debug!("expiry sweep: no expired entries found");
                }
                Err(e) => {
                    warn!(error = %e, "expiry sweep failed, will retry next interval");
                }
            }
        }
    })
}
