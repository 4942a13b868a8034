//! Periodic poll timer.
//!
//! Unlike a game tick, a poll has no fixed `dt` to keep deterministic: it
//! only needs to fire "about every N seconds" without ever bursting. So
//! the scheduler always skips ahead after an overrun, and the first poll
//! fires immediately so a screen has data on mount.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`PollScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between polls. Clamped to
    /// [`MIN_INTERVAL`](Self::MIN_INTERVAL)`..=`[`MAX_INTERVAL`](Self::MAX_INTERVAL).
    pub interval: Duration,
    /// Random delay (0..max) added to the *first* poll, so screens opened
    /// at the same instant don't hit the server in lockstep.
    pub initial_jitter: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            initial_jitter: Duration::ZERO,
        }
    }
}

impl PollConfig {
    /// The apps' refresh cadence.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);
    pub const MIN_INTERVAL: Duration = Duration::from_millis(250);
    pub const MAX_INTERVAL: Duration = Duration::from_secs(600);

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`PollScheduler::new`].
    pub fn validated(mut self) -> Self {
        let clamped = self.interval.clamp(Self::MIN_INTERVAL, Self::MAX_INTERVAL);
        if clamped != self.interval {
            warn!(
                requested_ms = self.interval.as_millis() as u64,
                clamped_ms = clamped.as_millis() as u64,
                "poll interval out of range, clamping"
            );
            self.interval = clamped;
        }
        if self.initial_jitter > self.interval {
            self.initial_jitter = self.interval;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Poll info and metrics
// ---------------------------------------------------------------------------

/// Returned by [`PollScheduler::wait_for_poll`] each time a poll is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollInfo {
    /// Starts at 1.
    pub poll: u64,
    /// `true` if the scheduler woke up noticeably late.
    pub overrun: bool,
    /// Whole intervals skipped because of the overrun.
    pub polls_skipped: u64,
}

/// Counters kept by the scheduler.
///
/// `total_polls` counts fired polls; the success/failure counters only
/// move when the caller reports an outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollMetrics {
    pub total_polls: u64,
    pub total_failures: u64,
    /// Reset to 0 by every success.
    pub consecutive_failures: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Periodic poll timer. One per polling screen.
#[derive(Debug)]
pub struct PollScheduler {
    config: PollConfig,
    next_poll: Instant,
    poll_count: u64,
    paused: bool,
    metrics: PollMetrics,
}

impl PollScheduler {
    /// Creates a scheduler whose first poll is due now (plus jitter).
    pub fn new(config: PollConfig) -> Self {
        let config = config.validated();

        let jitter = if config.initial_jitter.is_zero() {
            Duration::ZERO
        } else {
            let max_us = config.initial_jitter.as_micros() as u64;
            Duration::from_micros(rand::rng().random_range(0..max_us))
        };

        debug!(
            interval_ms = config.interval.as_millis() as u64,
            jitter_us = jitter.as_micros() as u64,
            "poll scheduler created"
        );

        Self {
            next_poll: Instant::now() + jitter,
            config,
            poll_count: 0,
            paused: false,
            metrics: PollMetrics::default(),
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self::new(PollConfig::with_interval(interval))
    }

    /// Waits until the next poll is due.
    ///
    /// While paused this future pends forever, which lets it sit in a
    /// `tokio::select!` next to the branches that unpause it. Dropping it
    /// before it resolves leaves the scheduler untouched.
    pub async fn wait_for_poll(&mut self) -> PollInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let due = self.next_poll;
        time::sleep_until(due).await;

        let now = Instant::now();
        let interval = self.config.interval;
        self.poll_count += 1;

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > interval / 10;
        let polls_skipped = if overrun {
            (late_by.as_nanos() / interval.as_nanos()) as u64
        } else {
            0
        };
        if polls_skipped > 0 {
            warn!(
                poll = self.poll_count,
                skipped = polls_skipped,
                late_ms = late_by.as_millis() as u64,
                "poll overrun, skipping ahead"
            );
        }

        // Always from now, never from the missed deadline.
        self.next_poll = now + interval;

        self.metrics.total_polls += 1;
        self.metrics.total_skipped += polls_skipped;
        if overrun {
            self.metrics.total_overruns += 1;
        }

        trace!(poll = self.poll_count, overrun, "poll due");

        PollInfo {
            poll: self.poll_count,
            overrun,
            polls_skipped,
        }
    }

    /// Records that the last fetch succeeded.
    pub fn record_success(&mut self) {
        self.metrics.consecutive_failures = 0;
    }

    /// Records that the last fetch failed.
    pub fn record_failure(&mut self) {
        self.metrics.total_failures += 1;
        self.metrics.consecutive_failures += 1;
    }

    /// Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(poll = self.poll_count, "poll scheduler paused");
        }
    }

    /// Resumes after a pause. The next poll is due immediately, since the
    /// data on screen is at least as old as the pause.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_poll = Instant::now();
            debug!(poll = self.poll_count, "poll scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn metrics(&self) -> &PollMetrics {
        &self.metrics
    }
}
