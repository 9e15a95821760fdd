//! Broadcast cancellation signal shared by every load worker.
//!
//! A [`StopSignal`] is a one-way state machine, `Running -> Stopping ->
//! Stopped`, observable by an arbitrary number of workers without any
//! coordination between them. CPU-bound workers poll [`StopSignal::is_stopping`]
//! once per iteration; workers blocked on a channel exchange race
//! [`StopSignal::stopping`] against the exchange inside `tokio::select!`.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::watch;

const RUNNING: u8 = 0;
const STOPPING: u8 = 1;
const STOPPED: u8 = 2;

/// One-shot cancellation broadcast with a deferred "fully stopped"
/// acknowledgment.
///
/// One instance exists per stressor, shared as `Arc<StopSignal>`. Workers
/// hold a read-only capability: nothing they can call moves the state
/// backwards. The `Stopping -> Stopped` transition belongs to the owning
/// coordinator and is reached only after it has confirmed that no worker
/// remains.
#[derive(Debug)]
pub struct StopSignal {
    state: AtomicU8,
    stopping_tx: watch::Sender<bool>,
    stopped_tx: watch::Sender<bool>,
}

impl StopSignal {
    /// Creates a signal in the `Running` state.
    pub fn new() -> Self {
        let (stopping_tx, _) = watch::channel(false);
        let (stopped_tx, _) = watch::channel(false);

        Self {
            state: AtomicU8::new(RUNNING),
            stopping_tx,
            stopped_tx,
        }
    }

    /// Transitions `Running -> Stopping` and wakes every waiter blocked in
    /// [`StopSignal::stopping`].
    ///
    /// Safe to call any number of times from any number of tasks; only the
    /// first call has an effect.
    pub fn raise(&self) {
        if self
            .state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.stopping_tx.send_replace(true);
            tracing::debug!("stop requested");
        }
    }

    /// Returns `true` once [`StopSignal::raise`] has been called.
    ///
    /// A single atomic load, cheap enough for a tight allocation loop.
    pub fn is_stopping(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    /// Completes exactly when [`StopSignal::raise`] occurs.
    ///
    /// Resolves immediately if the signal was already raised, so subscribing
    /// after the edge is not a missed wakeup. Intended for `tokio::select!`
    /// against a blocking channel operation.
    pub async fn stopping(&self) {
        let mut raised = self.stopping_tx.subscribe();
        // The sender lives inside `self`, so the channel cannot close here.
        let _ = raised.wait_for(|raised| *raised).await;
    }

    /// Completes the `Stopping -> Stopped` transition.
    ///
    /// Called once by the owning coordinator after the whole worker
    /// population has drained.
    ///
    /// # Panics
    ///
    /// Panics if called before [`StopSignal::raise`] or called twice. Both
    /// are programming errors in the coordinator and must not silently
    /// corrupt the state machine.
    pub fn mark_stopped(&self) {
        let transitioned = self
            .state
            .compare_exchange(STOPPING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        assert!(
            transitioned,
            "mark_stopped requires a raised, not yet stopped signal"
        );

        self.stopped_tx.send_replace(true);
    }

    /// Returns `true` once [`StopSignal::mark_stopped`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.state.load(Ordering::Acquire) == STOPPED
    }

    /// Completes once the signal reaches `Stopped`, i.e. once every worker
    /// has exited and the coordinator has acknowledged the drain.
    pub async fn stopped(&self) {
        let mut stopped = self.stopped_tx.subscribe();
        let _ = stopped.wait_for(|stopped| *stopped).await;
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
