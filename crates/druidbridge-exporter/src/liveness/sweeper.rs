//! Periodic background task with an owner-held cancellation handle.
//!
//! Nothing starts on construction of the tracker: the owner spawns the task
//! and keeps the handle to stop it.

use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct SweepHandle {
    name: &'static str,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SweepHandle {
    /// Run `task` every `period`, first run one period from now.
    pub fn spawn<F>(name: &'static str, period: Duration, mut task: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            let mut tick = tokio::time::interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tick.tick() => task(),
                }
            }
            tracing::debug!(task = name, "periodic task stopped");
        });
        tracing::info!(task = name, period_secs = period.as_secs(), "periodic task started");
        Self { name, cancel, join }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Token that stops the task when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::warn!(task = self.name, error = %e, "periodic task ended abnormally");
        }
    }
}
