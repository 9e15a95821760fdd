//! Allocate-and-discard worker

use std::sync::Arc;

use crate::gate::StartGate;
use crate::signal::StopSignal;

/// Worker that allocates a fixed-size block each iteration and immediately
/// discards it, keeping the allocator and memory reclamation busy.
pub(crate) struct Allocator {
    id: usize,
    size: usize,
    signal: Arc<StopSignal>,
    gate: Arc<StartGate>,
}

impl Allocator {
    pub(crate) fn new(
        id: usize,
        size: usize,
        signal: Arc<StopSignal>,
        gate: Arc<StartGate>,
    ) -> Self {
        Self {
            id,
            size,
            signal,
            gate,
        }
    }

    pub(crate) async fn run(self) {
        self.gate.report_ready();
        self.gate.released().await;

        tracing::debug!(worker_id = self.id, size = self.size, "allocator started");

        while !self.signal.is_stopping() {
            // black_box keeps the dead allocation from being optimized out.
            std::hint::black_box(vec![0u8; self.size]);

            // Tasks are never preempted; without this yield the loop would
            // pin its runtime thread and starve every other task, including
            // the ones carrying the stop signal.
            tokio::task::yield_now().await;
        }

        tracing::debug!(worker_id = self.id, "allocator stopped");
    }
}
