//! Stressor execution logic

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::StressorConfig;
use crate::gate::StartGate;
use crate::signal::StopSignal;
use crate::worker::{Allocator, Backwarder, Forwarder, Sleeper};

/// Handle to a running population of load workers.
///
/// Construction blocks until every worker is in its load loop; from that
/// point the machine is busy until [`Stressor::stop`] is called. Dropping
/// the handle without stopping leaves the load running for the life of the
/// runtime.
#[derive(Debug)]
pub struct Stressor {
    config: StressorConfig,
    signal: Arc<StopSignal>,
}

impl Stressor {
    /// Normalizes the configuration, spawns the full worker population and
    /// waits until all of it is executing.
    ///
    /// Completion of this call is the contract: the load is present when it
    /// returns. It never fails for any configuration; a runtime too starved
    /// to spawn another task is fatal at the runtime level, not an error
    /// this crate recovers from.
    pub async fn start(config: StressorConfig) -> Self {
        Self::start_with_signal(config, Arc::new(StopSignal::new())).await
    }

    pub(crate) async fn start_with_signal(
        config: StressorConfig,
        signal: Arc<StopSignal>,
    ) -> Self {
        let config = config.normalize();
        let gate = Arc::new(StartGate::new());

        tracing::info!(
            allocators = config.allocators,
            allocation_size = config.allocation_size,
            locker_pairs = config.locker_pairs,
            scheduled = config.scheduled,
            sleep_duration = ?config.sleep_duration,
            "starting stressor"
        );

        tokio::spawn(run_workers(
            config.clone(),
            Arc::clone(&signal),
            Arc::clone(&gate),
        ));

        // A worker task being spawned is not the same as it running its load
        // loop, so wait for the gate. A stop raised while workers are still
        // starting must still let the caller continue.
        tokio::select! {
            _ = gate.released() => {}
            _ = signal.stopping() => {}
        }

        Self { config, signal }
    }

    /// Requests shutdown of every worker.
    ///
    /// Non-blocking and idempotent. The load may persist briefly: an
    /// in-flight iteration completes before the worker observes the signal,
    /// and reclaimable allocations drain on the allocator's schedule.
    pub fn stop(&self) {
        self.signal.raise();
    }

    /// Completes once every worker has exited after [`Stressor::stop`].
    ///
    /// The drain is asynchronous relative to `stop`; this is the way to
    /// observe that the machine is quiet again.
    pub async fn stopped(&self) {
        self.signal.stopped().await;
    }

    /// The normalized configuration this stressor runs with.
    pub fn config(&self) -> &StressorConfig {
        &self.config
    }
}

/// Coordinator: spawns the whole worker population against one gate and one
/// signal, opens the gate once everyone reported in, and acknowledges the
/// drain once the last worker is gone.
pub(crate) async fn run_workers(
    config: StressorConfig,
    signal: Arc<StopSignal>,
    gate: Arc<StartGate>,
) {
    let mut workers = JoinSet::new();
    let mut worker_id = 0;

    for _ in 0..config.allocators {
        gate.expect(1);
        workers.spawn(
            Allocator::new(
                worker_id,
                config.allocation_size,
                Arc::clone(&signal),
                Arc::clone(&gate),
            )
            .run(),
        );
        worker_id += 1;
    }

    for _ in 0..config.locker_pairs {
        gate.expect(2);

        // Each pair owns its private channels; nothing is shared between
        // pairs.
        let (forward_tx, forward_rx) = mpsc::channel(1);
        let (backward_tx, backward_rx) = mpsc::channel(1);

        workers.spawn(
            Forwarder::new(
                worker_id,
                Arc::clone(&signal),
                Arc::clone(&gate),
                forward_tx,
                backward_rx,
            )
            .run(),
        );
        workers.spawn(
            Backwarder::new(
                worker_id + 1,
                Arc::clone(&signal),
                Arc::clone(&gate),
                forward_rx,
                backward_tx,
            )
            .run(),
        );
        worker_id += 2;
    }

    for _ in 0..config.scheduled {
        gate.expect(1);
        workers.spawn(
            Sleeper::new(
                worker_id,
                config.sleep_duration,
                Arc::clone(&signal),
                Arc::clone(&gate),
            )
            .run(),
        );
        worker_id += 1;
    }

    gate.release().await;
    tracing::debug!(workers = worker_id, "all workers in their load loops");

    while let Some(joined) = workers.join_next().await {
        if let Err(error) = joined {
            tracing::error!(error = %error, "worker task failed");
        }
    }

    signal.mark_stopped();
    tracing::info!("stressor stopped");
}
