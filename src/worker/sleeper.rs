//! Scheduled-sleeper worker

use std::sync::Arc;
use std::time::Duration;

use crate::gate::StartGate;
use crate::signal::StopSignal;

/// Worker that sleeps a fixed short interval in a loop, keeping the
/// runtime's timer and wake machinery busy.
pub(crate) struct Sleeper {
    id: usize,
    interval: Duration,
    signal: Arc<StopSignal>,
    gate: Arc<StartGate>,
}

impl Sleeper {
    pub(crate) fn new(
        id: usize,
        interval: Duration,
        signal: Arc<StopSignal>,
        gate: Arc<StartGate>,
    ) -> Self {
        Self {
            id,
            interval,
            signal,
            gate,
        }
    }

    pub(crate) async fn run(self) {
        self.gate.report_ready();
        self.gate.released().await;

        tracing::debug!(worker_id = self.id, interval = ?self.interval, "sleeper started");

        // Poll-then-sleep: an in-flight sleep finishes before the next check,
        // so shutdown may lag by at most one interval.
        while !self.signal.is_stopping() {
            tokio::time::sleep(self.interval).await;
        }

        tracing::debug!(worker_id = self.id, "sleeper stopped");
    }
}
