//! Tick driver: polls a [`Dispatcher`] once per interval on a tokio task.
//!
//! Stands in for a host frame loop. All callbacks run on the driver task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::config::PollSection;
use crate::dispatch::{Dispatcher, ShutdownReport};

/// Run poll ticks until `shutdown` flips to `true` (or its sender is
/// dropped), then shut the dispatcher down.
pub async fn run_ticks(
    dispatcher: Arc<Dispatcher>,
    poll: &PollSection,
    mut shutdown: watch::Receiver<bool>,
) -> ShutdownReport {
    let mut ticker = time::interval(poll.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let limit = poll.limit();

    tracing::info!(
        tick_interval_ms = poll.tick_interval_ms,
        max_messages_per_tick = poll.max_messages_per_tick,
        "tick driver started"
    );

    while !*shutdown.borrow() {
        tokio::select! {
            _ = ticker.tick() => {
                let res = match limit {
                    Some(n) => dispatcher.run_limited_callbacks(n),
                    None => dispatcher.run_callbacks(),
                };
                if let Err(e) = res {
                    tracing::warn!(error = %e, "poll tick failed");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    dispatcher.shutdown()
}
