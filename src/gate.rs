//! One-shot startup barrier between a coordinator and its workers.
//!
//! A spawned task being *scheduled* is not the same as it *having entered
//! its load loop*. The [`StartGate`] closes that gap with a two-phase
//! handshake: every worker reports in right before its loop, the
//! coordinator waits for the full head count, and only then does the gate
//! open for everyone at once. A gate serves exactly one startup; it is
//! never reset or reused.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// One-shot startup barrier.
///
/// The coordinator calls [`StartGate::expect`] for each worker it is about
/// to spawn, then awaits [`StartGate::release`]. Each worker calls
/// [`StartGate::report_ready`] exactly once and then awaits
/// [`StartGate::released`]. Once the last expected report lands, the gate
/// opens and every waiter proceeds; the order in which they unblock is
/// unspecified.
#[derive(Debug)]
pub struct StartGate {
    expected: AtomicUsize,
    ready_tx: watch::Sender<usize>,
    gate_tx: watch::Sender<bool>,
}

impl StartGate {
    /// Creates a closed gate expecting no workers.
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(0);
        let (gate_tx, _) = watch::channel(false);

        Self {
            expected: AtomicUsize::new(0),
            ready_tx,
            gate_tx,
        }
    }

    /// Registers `count` additional expected ready reports.
    ///
    /// Must be called during the spawn phase, before the corresponding
    /// workers can report.
    ///
    /// # Panics
    ///
    /// Panics if the gate has already opened; a gate is one-shot and cannot
    /// take on more workers afterwards.
    pub fn expect(&self, count: usize) {
        assert!(
            !self.is_open(),
            "expect called after the gate opened"
        );
        self.expected.fetch_add(count, Ordering::AcqRel);
    }

    /// Reports one worker as about to enter its load loop.
    ///
    /// Each worker calls this exactly once, immediately before awaiting
    /// [`StartGate::released`].
    ///
    /// # Panics
    ///
    /// Panics if more reports arrive than were registered with
    /// [`StartGate::expect`]; that means a worker reported twice or was
    /// never registered, and the shared counters must not silently drift.
    pub fn report_ready(&self) {
        let mut reported = 0;
        self.ready_tx.send_modify(|ready| {
            *ready += 1;
            reported = *ready;
        });

        let expected = self.expected.load(Ordering::Acquire);
        assert!(
            reported <= expected,
            "{reported} ready reports for {expected} expected workers"
        );
    }

    /// Waits until every expected worker has reported, then opens the gate.
    ///
    /// Called once by the coordinator, after the spawn phase.
    ///
    /// # Panics
    ///
    /// Panics on a second call; the gate opens exactly once.
    pub async fn release(&self) {
        let expected = self.expected.load(Ordering::Acquire);
        let mut ready = self.ready_tx.subscribe();
        // `wait_for` inspects the current count first, so reports that
        // landed before this call are not missed.
        let _ = ready.wait_for(|ready| *ready >= expected).await;

        let was_open = self.gate_tx.send_replace(true);
        assert!(!was_open, "release called twice on a one-shot gate");
    }

    /// Completes once the gate is open.
    ///
    /// Any number of workers may wait; all unblock once the last expected
    /// report lands and the coordinator opens the gate. Resolves immediately
    /// on an already open gate.
    pub async fn released(&self) {
        let mut open = self.gate_tx.subscribe();
        let _ = open.wait_for(|open| *open).await;
    }

    /// Number of ready reports registered via [`StartGate::expect`].
    pub fn expected(&self) -> usize {
        self.expected.load(Ordering::Acquire)
    }

    /// Number of ready reports received so far.
    pub fn ready(&self) -> usize {
        *self.ready_tx.borrow()
    }

    /// Whether the gate has opened.
    pub fn is_open(&self) -> bool {
        *self.gate_tx.borrow()
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_new_gate_is_closed() {
        let gate = StartGate::new();
        assert_eq!(gate.expected(), 0);
        assert_eq!(gate.ready(), 0);
        assert!(!gate.is_open());
    }

    #[test]
    fn test_expect_accumulates() {
        let gate = StartGate::new();
        gate.expect(1);
        gate.expect(2);
        gate.expect(1);
        assert_eq!(gate.expected(), 4);
    }

    #[tokio::test]
    async fn test_release_waits_for_last_report() {
        let gate = Arc::new(StartGate::new());
        gate.expect(3);

        let coordinator = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.release().await })
        };

        gate.report_ready();
        gate.report_ready();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!gate.is_open(), "gate opened before the last report");

        gate.report_ready();
        timeout(Duration::from_secs(1), coordinator)
            .await
            .expect("release did not complete after the last report")
            .expect("coordinator panicked");
        assert!(gate.is_open());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_all_waiters_unblock_on_release() {
        let gate = Arc::new(StartGate::new());
        gate.expect(4);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move {
                    gate.report_ready();
                    gate.released().await;
                })
            })
            .collect();

        timeout(Duration::from_secs(1), gate.release())
            .await
            .expect("release did not complete");

        for worker in workers {
            timeout(Duration::from_secs(1), worker)
                .await
                .expect("worker not released")
                .expect("worker panicked");
        }
        assert_eq!(gate.ready(), 4);
    }

    #[tokio::test]
    async fn test_released_resolves_on_open_gate() {
        let gate = StartGate::new();
        gate.release().await;

        timeout(Duration::from_secs(1), gate.released())
            .await
            .expect("released not ready on an open gate");
    }

    #[test]
    #[should_panic(expected = "expected workers")]
    fn test_report_beyond_expected_panics() {
        let gate = StartGate::new();
        gate.expect(1);
        gate.report_ready();
        gate.report_ready();
    }

    #[tokio::test]
    #[should_panic(expected = "release called twice")]
    async fn test_release_twice_panics() {
        let gate = StartGate::new();
        gate.expect(1);
        gate.report_ready();
        gate.release().await;
        gate.release().await;
    }

    #[tokio::test]
    #[should_panic(expected = "after the gate opened")]
    async fn test_expect_after_open_panics() {
        let gate = StartGate::new();
        gate.release().await;
        gate.expect(1);
    }
}
