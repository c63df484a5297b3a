//! Request pacing for the crawl loop
//!
//! A crawl fetches one page at a time. The pacer makes sure consecutive
//! fetches of one crawler start at least the configured delay after the
//! previous page finished processing. Each crawler owns its own pacer, so
//! independent crawlers never share a delay budget.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a fixed minimum gap between consecutive page fetches
#[derive(Debug)]
pub struct RequestPacer {
    /// Minimum gap between the end of one page and the next fetch
    delay: Duration,

    /// When the previous page finished, if any
    last_finished: Option<Instant>,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_finished: None,
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// Waits until the next fetch may start
    ///
    /// Returns immediately before the first fetch, so no delay precedes the
    /// first request and none follows the last.
    pub async fn wait_turn(&self) {
        let wait = self.remaining_wait(Instant::now());
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Records that a page finished processing
    pub fn mark_finished(&mut self) {
        self.last_finished = Some(Instant::now());
    }

    /// Time left before the next fetch may start
    pub fn remaining_wait(&self, now: Instant) -> Duration {
        match self.last_finished {
            Some(finished) => (finished + self.delay).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
