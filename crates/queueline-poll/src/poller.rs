//! The polling task a screen owns.
//!
//! [`spawn_poller`] runs a fetch closure on a [`PollScheduler`] and sends
//! each result down a channel. The task:
//!
//! - checks `should_poll` right before every fetch, so no request goes out
//!   after [`PollingController::suspend`] returns,
//! - drops a result whose fetch finished after a suspension,
//! - idles while suspended and picks up again on `resume()`,
//! - ends when its [`PollHandle`] is stopped or dropped, or when the
//!   result receiver is dropped.

use std::fmt::Display;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{PollConfig, PollScheduler, PollingController};

/// How many undelivered results may queue up before the poller waits
/// for the screen to catch up.
const RESULT_BUFFER: usize = 4;

/// Owns a running poller. Dropping it aborts the task.
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Aborts the poller and waits until it's gone. After this returns,
    /// the fetch closure will not be called again.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancelled is the expected outcome here.
            let _ = task.await;
        }
    }

    /// Whether the task has ended on its own (receiver dropped).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawns a poller that calls `fetch` on `config`'s cadence while
/// `controller` allows it.
///
/// Returns the handle that owns the task and the receiver for results.
/// Failed fetches are delivered too; the poller keeps going after them.
pub fn spawn_poller<F, Fut, T, E>(
    controller: PollingController,
    config: PollConfig,
    mut fetch: F,
) -> (PollHandle, mpsc::Receiver<Result<T, E>>)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RESULT_BUFFER);

    let task = tokio::spawn(async move {
        let mut scheduler = PollScheduler::new(config);
        let mut options = controller.subscribe();
        if !options.borrow_and_update().should_poll {
            scheduler.pause();
        }

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("poll receiver dropped, stopping poller");
                    break;
                }
                changed = options.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if options.borrow_and_update().should_poll {
                        scheduler.resume();
                    } else {
                        scheduler.pause();
                    }
                    continue;
                }
                _ = scheduler.wait_for_poll() => {}
            }

            if !controller.should_poll() {
                scheduler.pause();
                continue;
            }

            let result = fetch().await;

            if !controller.should_poll() {
                debug!("polling suspended during fetch, discarding result");
                scheduler.pause();
                continue;
            }

            match &result {
                Ok(_) => scheduler.record_success(),
                Err(e) => {
                    scheduler.record_failure();
                    warn!(
                        error = %e,
                        consecutive_failures = scheduler.metrics().consecutive_failures,
                        "poll failed"
                    );
                }
            }

            if tx.send(result).await.is_err() {
                debug!("poll receiver dropped, stopping poller");
                break;
            }
        }

        debug!(polls = scheduler.poll_count(), "poller finished");
    });

    (PollHandle { task: Some(task) }, rx)
}
