//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries so
//! entries nobody reads again do not linger until capacity eviction.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that purges expired entries every `cleanup_interval_secs`.
///
/// An interval of zero is treated as one second. The task never finishes on
/// its own; abort the returned handle on shutdown.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::from_config(&config);
/// let sweep = spawn_cleanup_task(cache.clone(), 1);
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let cleanup_interval_secs = cleanup_interval_secs.max(1);
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
