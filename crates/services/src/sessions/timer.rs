//! Repeating exam countdown task.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use super::controller::{Shared, Tick};

/// How often the remaining time is recomputed.
pub const TIMER_TICK: Duration = Duration::from_millis(100);

/// Spawn the countdown for `generation`.
///
/// The task holds a weak reference so a dropped controller ends it; remaining
/// time is always derived from the clock, never accumulated from ticks.
pub(super) fn spawn(shared: Weak<Shared>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(TIMER_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            match shared.timer_tick(generation) {
                Tick::Continue => {}
                Tick::Stop => break,
                Tick::Expired { unanswered } => {
                    shared.expire(unanswered).await;
                    break;
                }
            }
        }
        debug!(generation, "exam timer stopped");
    })
}
