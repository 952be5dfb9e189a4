//! Integration tests for the timer tasks.
//!
//! Uses `start_paused` so `tokio::time::advance` controls the clock
//! deterministically (same approach as the schedulers these grew out of).
//! After each advance we yield a few times to let the spawned timer
//! tasks observe the new clock and push their events.

use std::time::Duration;

use tokio::sync::mpsc;

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_repeating_fires_once_per_period() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _handle = parlor_timer::repeating(Duration::from_millis(150), tx, 7u32);
    // Let the spawned task register its interval before moving time.
    settle().await;

    // Nothing before the first period elapses.
    tokio::time::advance(Duration::from_millis(100)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "fired before the first period");

    tokio::time::advance(Duration::from_millis(50)).await;
    settle().await;
    assert_eq!(rx.try_recv(), Ok(7));

    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert_eq!(rx.try_recv(), Ok(7));
    assert!(rx.try_recv().is_err(), "only one event per period");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_future_fires() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = parlor_timer::repeating(Duration::from_millis(150), tx, ());
    settle().await;

    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert_eq!(rx.try_recv(), Ok(()));

    handle.cancel();
    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "cancelled timer must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_drop_aborts_the_task() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = parlor_timer::repeating(Duration::from_millis(150), tx, ());
    drop(handle);

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "dropped handle must abort the timer");
}

#[tokio::test(start_paused = true)]
async fn test_oneshot_fires_exactly_once() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _handle = parlor_timer::oneshot(Duration::from_secs(60), tx, "expired");
    settle().await;

    tokio::time::advance(Duration::from_secs(59)).await;
    settle().await;
    assert!(rx.try_recv().is_err());

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(rx.try_recv(), Ok("expired"));

    tokio::time::advance(Duration::from_secs(600)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "one-shot fired twice");
}

#[tokio::test(start_paused = true)]
async fn test_oneshot_cancel_before_deadline() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = parlor_timer::oneshot(Duration::from_secs(60), tx, ());
    settle().await;

    tokio::time::advance(Duration::from_secs(30)).await;
    handle.cancel();
    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_repeating_stops_when_receiver_dropped() {
    let (tx, rx) = mpsc::unbounded_channel::<u8>();
    let _handle = parlor_timer::repeating(Duration::from_millis(150), tx, 1);
    settle().await;
    drop(rx);

    // Just exercising the exit path — the task should notice the closed
    // channel on its next fire and stop without panicking.
    tokio::time::advance(Duration::from_millis(300)).await;
    settle().await;
}
