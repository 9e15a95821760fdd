//! Tests for the worker families

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use super::*;
use crate::gate::StartGate;
use crate::signal::StopSignal;

const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

fn coordination() -> (Arc<StopSignal>, Arc<StartGate>) {
    (Arc::new(StopSignal::new()), Arc::new(StartGate::new()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_allocator_exits_on_stop() {
    let (signal, gate) = coordination();

    gate.expect(1);
    let handle = tokio::spawn(Allocator::new(0, 8, Arc::clone(&signal), Arc::clone(&gate)).run());

    gate.release().await;
    signal.raise();

    timeout(EXIT_TIMEOUT, handle)
        .await
        .expect("allocator did not exit after stop")
        .expect("allocator panicked");
}

#[tokio::test]
async fn test_sleeper_exits_on_stop() {
    let (signal, gate) = coordination();

    gate.expect(1);
    let worker = Sleeper::new(0, Duration::from_millis(1), Arc::clone(&signal), Arc::clone(&gate));
    let handle = tokio::spawn(worker.run());

    gate.release().await;
    signal.raise();

    timeout(EXIT_TIMEOUT, handle)
        .await
        .expect("sleeper did not exit after stop")
        .expect("sleeper panicked");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_locker_pair_exchanges_until_stop() {
    let (signal, gate) = coordination();

    let (forward_tx, forward_rx) = mpsc::channel(1);
    let (backward_tx, backward_rx) = mpsc::channel(1);

    gate.expect(2);
    let forwarder = Forwarder::new(
        0,
        Arc::clone(&signal),
        Arc::clone(&gate),
        forward_tx,
        backward_rx,
    );
    let backwarder = Backwarder::new(
        1,
        Arc::clone(&signal),
        Arc::clone(&gate),
        forward_rx,
        backward_tx,
    );

    let forwarder = tokio::spawn(forwarder.run());
    let backwarder = tokio::spawn(backwarder.run());

    gate.release().await;

    // Let the token bounce for a while before cancelling mid-flight.
    sleep(Duration::from_millis(50)).await;
    signal.raise();

    timeout(EXIT_TIMEOUT, forwarder)
        .await
        .expect("forwarder did not exit after stop")
        .expect("forwarder panicked");
    timeout(EXIT_TIMEOUT, backwarder)
        .await
        .expect("backwarder did not exit after stop")
        .expect("backwarder panicked");
}

#[tokio::test]
async fn test_forwarder_unblocks_when_send_pends() {
    let (signal, gate) = coordination();

    let (forward_tx, _forward_rx) = mpsc::channel(1);
    let (_backward_tx, backward_rx) = mpsc::channel(1);

    // Fill the channel so the initial send cannot complete.
    forward_tx.try_send(99).unwrap();

    gate.expect(1);
    let worker = Forwarder::new(0, Arc::clone(&signal), Arc::clone(&gate), forward_tx, backward_rx);
    let handle = tokio::spawn(worker.run());

    gate.release().await;
    sleep(Duration::from_millis(20)).await;
    signal.raise();

    timeout(EXIT_TIMEOUT, handle)
        .await
        .expect("forwarder did not exit while blocked in send")
        .expect("forwarder panicked");
}

#[tokio::test]
async fn test_backwarder_unblocks_when_recv_pends() {
    let (signal, gate) = coordination();

    let (_forward_tx, forward_rx) = mpsc::channel::<u64>(1);
    let (backward_tx, _backward_rx) = mpsc::channel(1);

    gate.expect(1);
    let worker = Backwarder::new(0, Arc::clone(&signal), Arc::clone(&gate), forward_rx, backward_tx);
    let handle = tokio::spawn(worker.run());

    gate.release().await;
    sleep(Duration::from_millis(20)).await;
    signal.raise();

    timeout(EXIT_TIMEOUT, handle)
        .await
        .expect("backwarder did not exit while blocked in recv")
        .expect("backwarder panicked");
}

#[tokio::test]
async fn test_backwarder_exits_when_partner_gone() {
    let (signal, gate) = coordination();

    let (forward_tx, forward_rx) = mpsc::channel::<u64>(1);
    let (backward_tx, _backward_rx) = mpsc::channel(1);

    gate.expect(1);
    let worker = Backwarder::new(0, Arc::clone(&signal), Arc::clone(&gate), forward_rx, backward_tx);
    let handle = tokio::spawn(worker.run());

    gate.release().await;

    // A closed channel ends the loop without any cancellation.
    drop(forward_tx);

    timeout(EXIT_TIMEOUT, handle)
        .await
        .expect("backwarder did not exit after partner went away")
        .expect("backwarder panicked");
    assert!(!signal.is_stopping());
}

#[tokio::test]
async fn test_forwarder_exits_when_partner_gone() {
    let (signal, gate) = coordination();

    let (forward_tx, forward_rx) = mpsc::channel(1);
    let (_backward_tx, backward_rx) = mpsc::channel(1);

    drop(forward_rx);

    gate.expect(1);
    let worker = Forwarder::new(0, Arc::clone(&signal), Arc::clone(&gate), forward_tx, backward_rx);
    let handle = tokio::spawn(worker.run());

    gate.release().await;

    timeout(EXIT_TIMEOUT, handle)
        .await
        .expect("forwarder did not exit after partner went away")
        .expect("forwarder panicked");
}
