//! Integration tests for `spawn_poller`: lifecycle, suspension, and the
//! guarantee that no fetch starts after `suspend()` returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use queueline_poll::{PollConfig, PollingController, spawn_poller};

// =========================================================================
// Helpers
// =========================================================================

const INTERVAL: Duration = Duration::from_secs(3);

fn config() -> PollConfig {
    PollConfig::with_interval(INTERVAL)
}

/// A fetch closure that counts its calls and returns the call number.
fn counting_fetch(
    calls: Arc<AtomicUsize>,
) -> impl FnMut() -> std::future::Ready<Result<usize, String>> + Send + 'static {
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        std::future::ready(Ok(n))
    }
}

// =========================================================================
// Cadence
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_poller_delivers_first_result_immediately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let start = tokio::time::Instant::now();

    let (_handle, mut rx) =
        spawn_poller(PollingController::new(), config(), counting_fetch(calls.clone()));

    assert_eq!(rx.recv().await, Some(Ok(1)));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_poller_fetches_on_interval() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (_handle, mut rx) =
        spawn_poller(PollingController::new(), config(), counting_fetch(calls.clone()));

    assert_eq!(rx.recv().await, Some(Ok(1)));
    let start = tokio::time::Instant::now();
    assert_eq!(rx.recv().await, Some(Ok(2)));
    assert_eq!(rx.recv().await, Some(Ok(3)));

    assert_eq!(start.elapsed(), INTERVAL * 2);
}

#[tokio::test(start_paused = true)]
async fn test_poller_keeps_going_after_failed_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetch = {
        let calls = calls.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n == 1 {
                Err("Please check your internet connection.".to_string())
            } else {
                Ok(n)
            })
        }
    };

    let (_handle, mut rx) = spawn_poller(PollingController::new(), config(), fetch);

    assert!(matches!(rx.recv().await, Some(Err(_))));
    assert_eq!(rx.recv().await, Some(Ok(2)));
}

// =========================================================================
// Suspension
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_no_fetch_after_suspend() {
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = PollingController::new();
    let (_handle, mut rx) = spawn_poller(controller.clone(), config(), counting_fetch(calls.clone()));
    assert_eq!(rx.recv().await, Some(Ok(1)));

    controller.suspend();
    tokio::time::sleep(INTERVAL * 10).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_resume_restarts_fetching() {
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = PollingController::new();
    let (_handle, mut rx) = spawn_poller(controller.clone(), config(), counting_fetch(calls.clone()));
    assert_eq!(rx.recv().await, Some(Ok(1)));

    controller.suspend();
    tokio::time::sleep(INTERVAL * 10).await;
    controller.resume();

    assert_eq!(rx.recv().await, Some(Ok(2)));
}

#[tokio::test(start_paused = true)]
async fn test_poller_spawned_while_suspended_never_fetches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = PollingController::new();
    controller.suspend();

    let (_handle, mut rx) = spawn_poller(controller, config(), counting_fetch(calls.clone()));

    let result = tokio::time::timeout(INTERVAL * 10, rx.recv()).await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_result_of_fetch_in_flight_during_suspend_is_discarded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = PollingController::new();

    // The second fetch is "in flight" when a rename suspends polling.
    let fetch = {
        let calls = calls.clone();
        let controller = controller.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            let controller = controller.clone();
            async move {
                if n == 2 {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    controller.suspend();
                }
                Ok::<_, String>(n)
            }
        }
    };

    let (_handle, mut rx) = spawn_poller(controller, config(), fetch);
    assert_eq!(rx.recv().await, Some(Ok(1)));

    let result = tokio::time::timeout(INTERVAL * 10, rx.recv()).await;

    assert!(result.is_err(), "stale result must not be delivered");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stop_ends_polling() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (handle, mut rx) =
        spawn_poller(PollingController::new(), config(), counting_fetch(calls.clone()));
    assert_eq!(rx.recv().await, Some(Ok(1)));

    handle.stop().await;
    tokio::time::sleep(INTERVAL * 10).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_ends_polling() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (handle, mut rx) =
        spawn_poller(PollingController::new(), config(), counting_fetch(calls.clone()));
    assert_eq!(rx.recv().await, Some(Ok(1)));

    drop(handle);

    assert_eq!(rx.recv().await, None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_receiver_finishes_task() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (handle, rx) =
        spawn_poller(PollingController::new(), config(), counting_fetch(calls.clone()));

    drop(rx);
    tokio::time::sleep(INTERVAL).await;

    assert!(handle.is_finished());
}
