//! Fixed-interval background sweeps.
//!
//! The cache and the rate limiter both keep process-wide maps that are only
//! cleaned lazily on access. A sweeper bounds their memory under low traffic
//! after a burst by purging expired entries on a timer that is independent of
//! request traffic.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running sweeper task.
///
/// The task is aborted when the handle is dropped or [`stop`](Self::stop) is
/// called.
#[derive(Debug)]
pub struct SweeperHandle {
    name: String,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Name of the swept component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once the background task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the sweeper.
    pub fn stop(self) {
        drop(self)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task that calls `sweep` every `interval`.
///
/// `sweep` returns the number of entries it removed; the first sweep happens
/// one full interval after spawning. Must be called from within a tokio
/// runtime.
pub fn spawn_sweeper<F>(name: impl Into<String>, interval: Duration, sweep: F) -> SweeperHandle
where
    F: Fn() -> usize + Send + 'static,
{
    let name = name.into();
    #[cfg(feature = "tracing")]
    let task_name = name.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately once
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = sweep();

            #[cfg(feature = "tracing")]
            if removed > 0 {
                tracing::debug!(component = %task_name, removed, "swept expired entries");
            }
            #[cfg(not(feature = "tracing"))]
            let _ = removed;
        }
    });

    SweeperHandle { name, task }
}
