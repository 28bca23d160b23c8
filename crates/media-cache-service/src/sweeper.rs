//! Background expiry sweeps

use crate::server::SharedState;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Sweep immediately, then once per `every` for the lifetime of the task
pub fn spawn_sweeper(state: SharedState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        // interval() panics on a zero period
        let mut ticker = interval(every.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // First tick completes immediately
            ticker.tick().await;
            let removed = state.cache.sweep_expired(state.max_age).await;
            if removed > 0 {
                info!(removed, "Removed expired cache entries");
            }
        }
    })
}
