//! Scheduled removal of idle sessions.
//!
//! The engine never starts timers on its own; the host spawns this task (or
//! calls `DialogueEngine::sweep_expired` from its own scheduler).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::engine::DialogueEngine;

/// Spawn a background task that sweeps expired sessions every `interval`.
///
/// The first sweep runs one full interval after spawning.
pub fn spawn_sweep_task(engine: Arc<DialogueEngine>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = engine.sweep_expired().await;
            tracing::debug!(removed, "Session sweep finished");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntakeConfig;
    use crate::intake::engine::tests::ManualClock;
    use crate::intake::model::Sender;

    #[tokio::test(start_paused = true)]
    async fn sweep_task_runs_on_interval() {
        let clock = ManualClock::new();
        let engine = Arc::new(DialogueEngine::with_clock(
            &IntakeConfig::default(),
            clock.clone(),
        ));
        engine
            .process_message("c", "oi", &Sender::default())
            .await;
        clock.advance(chrono::Duration::hours(3));

        let handle = spawn_sweep_task(Arc::clone(&engine), Duration::from_secs(3600));

        // Nothing happens before the first interval elapses.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.active_sessions().await, 1);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(engine.active_sessions().await, 0);

        handle.abort();
    }
}
