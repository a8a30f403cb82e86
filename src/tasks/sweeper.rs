//! Expiration Sweeper Task
//!
//! Background task that periodically evicts expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheHandle;

/// Spawns the background sweep task.
///
/// On each tick the sweep removes every expired entry and reports how many
/// were evicted. The interval is independent of any entry's TTL; a
/// short-TTL entry may outlive its nominal expiry until the next tick,
/// bounded by the interval. When no interval is configured the caller
/// simply never spawns this task and the store relies on lazy expiration
/// alone.
///
/// # Arguments
/// * `cache` - shared cache facade
/// * `sweep_interval_secs` - seconds between sweep passes
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during graceful
/// shutdown.
pub fn spawn_sweep_task(cache: CacheHandle, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiration sweeper with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let removed = cache.delete_expired().await;

            if removed > 0 {
                info!("Sweep removed {} expired entries", removed);
            } else {
                debug!("Sweep found no expired entries");
            }
        }
    })
}
