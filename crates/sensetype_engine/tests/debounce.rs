use std::sync::mpsc;
use std::time::Duration;

use sensetype_engine::Debouncer;
use tokio::runtime::Handle;

const WAIT: Duration = Duration::from_millis(100);
// Long enough for a pending delivery to have fired, with margin for CI.
const SETTLE: Duration = Duration::from_millis(400);

fn collector() -> (mpsc::Sender<u32>, mpsc::Receiver<u32>) {
    mpsc::channel()
}

#[tokio::test]
async fn burst_delivers_only_the_last_arguments() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });

    for value in 1..=5 {
        debouncer.call(value);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(SETTLE).await;

    let delivered: Vec<u32> = rx.try_iter().collect();
    assert_eq!(delivered, vec![5]);
}

#[tokio::test]
async fn cancel_suppresses_the_pending_delivery() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });

    debouncer.call(1);
    tokio::time::sleep(Duration::from_millis(20)).await;
    debouncer.cancel();
    tokio::time::sleep(SETTLE).await;

    assert!(rx.try_iter().next().is_none());
}

#[tokio::test]
async fn cancel_with_nothing_pending_is_a_no_op() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });

    debouncer.cancel();
    debouncer.cancel();
    debouncer.call(9);
    tokio::time::sleep(SETTLE).await;

    let delivered: Vec<u32> = rx.try_iter().collect();
    assert_eq!(delivered, vec![9]);
}

#[tokio::test]
async fn call_after_cancel_rearms_a_fresh_schedule() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });

    debouncer.call(1);
    debouncer.cancel();
    debouncer.call(2);
    tokio::time::sleep(SETTLE).await;

    let delivered: Vec<u32> = rx.try_iter().collect();
    assert_eq!(delivered, vec![2]);
}

#[tokio::test]
async fn separate_quiet_periods_deliver_separately() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });

    debouncer.call(1);
    tokio::time::sleep(SETTLE).await;
    debouncer.call(2);
    tokio::time::sleep(SETTLE).await;

    let delivered: Vec<u32> = rx.try_iter().collect();
    assert_eq!(delivered, vec![1, 2]);
}

#[tokio::test]
async fn zero_wait_still_defers_to_the_scheduler() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), Duration::ZERO, move |value: u32| {
        let _ = tx.send(value);
    });

    debouncer.call(7);
    // Nothing can have run yet: the action fires on the timer task, never
    // synchronously inside `call`.
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let delivered: Vec<u32> = rx.try_iter().collect();
    assert_eq!(delivered, vec![7]);
}

#[tokio::test]
async fn dropping_the_handle_discards_pending_work() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });

    debouncer.call(1);
    drop(debouncer);
    tokio::time::sleep(SETTLE).await;

    assert!(rx.try_iter().next().is_none());
}

#[tokio::test]
async fn clones_share_the_same_pending_slot() {
    let (tx, rx) = collector();
    let debouncer = Debouncer::new(&Handle::current(), WAIT, move |value: u32| {
        let _ = tx.send(value);
    });
    let other = debouncer.clone();

    debouncer.call(1);
    other.call(2);
    tokio::time::sleep(SETTLE).await;

    let delivered: Vec<u32> = rx.try_iter().collect();
    assert_eq!(delivered, vec![2]);
}
