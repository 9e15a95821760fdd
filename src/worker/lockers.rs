//! Forwarder/backwarder worker pair
//!
//! Two workers share two capacity-1 channels, `forward` and `backward`, and
//! bounce a single token between them indefinitely. The token's value is
//! irrelevant; the load is the constant block/wake/hand-off traffic through
//! the scheduler. Every send and every receive races the stop signal, so a
//! cancellation landing mid-exchange never leaves one half waiting on a
//! partner that will not answer.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::gate::StartGate;
use crate::signal::StopSignal;

/// Sends the initial token on `forward`, then relays whatever comes back on
/// `backward`.
pub(crate) struct Forwarder {
    id: usize,
    signal: Arc<StopSignal>,
    gate: Arc<StartGate>,
    forward: mpsc::Sender<u64>,
    backward: mpsc::Receiver<u64>,
}

impl Forwarder {
    pub(crate) fn new(
        id: usize,
        signal: Arc<StopSignal>,
        gate: Arc<StartGate>,
        forward: mpsc::Sender<u64>,
        backward: mpsc::Receiver<u64>,
    ) -> Self {
        Self {
            id,
            signal,
            gate,
            forward,
            backward,
        }
    }

    pub(crate) async fn run(mut self) {
        self.gate.report_ready();
        self.gate.released().await;

        tracing::debug!(worker_id = self.id, "forwarder started");

        // The very first send also races cancellation: a stop raised during
        // startup must not strand this worker on a full channel.
        tokio::select! {
            _ = self.signal.stopping() => {
                tracing::debug!(worker_id = self.id, "forwarder stopped");
                return;
            }
            sent = self.forward.send(0) => {
                if sent.is_err() {
                    tracing::debug!(worker_id = self.id, "forwarder stopped");
                    return;
                }
            }
        }

        loop {
            let token = tokio::select! {
                _ = self.signal.stopping() => break,
                received = self.backward.recv() => match received {
                    Some(token) => token,
                    None => break,
                },
            };

            tokio::select! {
                _ = self.signal.stopping() => break,
                sent = self.forward.send(token) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(worker_id = self.id, "forwarder stopped");
    }
}

/// Receives each token from `forward` and returns it on `backward`.
pub(crate) struct Backwarder {
    id: usize,
    signal: Arc<StopSignal>,
    gate: Arc<StartGate>,
    forward: mpsc::Receiver<u64>,
    backward: mpsc::Sender<u64>,
}

impl Backwarder {
    pub(crate) fn new(
        id: usize,
        signal: Arc<StopSignal>,
        gate: Arc<StartGate>,
        forward: mpsc::Receiver<u64>,
        backward: mpsc::Sender<u64>,
    ) -> Self {
        Self {
            id,
            signal,
            gate,
            forward,
            backward,
        }
    }

    pub(crate) async fn run(mut self) {
        self.gate.report_ready();
        self.gate.released().await;

        tracing::debug!(worker_id = self.id, "backwarder started");

        loop {
            let token = tokio::select! {
                _ = self.signal.stopping() => break,
                received = self.forward.recv() => match received {
                    Some(token) => token,
                    None => break,
                },
            };

            tokio::select! {
                _ = self.signal.stopping() => break,
                sent = self.backward.send(token) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(worker_id = self.id, "backwarder stopped");
    }
}
