// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded exponential backoff for connecting to running workers.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Retry schedule: `initial`, then multiplied by `multiplier` up to `max_delay`,
/// for at most `max_attempts` attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2,
            max_attempts: 5,
        }
    }
}

impl Backoff {
    /// Delay after a failed attempt, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(self.multiplier).min(self.max_delay)
    }

    /// Delays between consecutive attempts (`max_attempts - 1` of them).
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial.min(self.max_delay);
        for _ in 1..self.max_attempts {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }

    /// Run `attempt` until it succeeds, returns a non-retryable error, the
    /// attempts run out, or the next sleep would pass `deadline`.
    ///
    /// The last error is returned on give-up.
    pub async fn retry<T, E, F, Fut>(
        &self,
        deadline: Instant,
        mut attempt: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut delays = self.delays().into_iter();
        let mut n = 1;
        loop {
            let err = match attempt(n).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            if !retryable(&err) {
                return Err(err);
            }
            let Some(delay) = delays.next() else {
                return Err(err);
            };
            if Instant::now() + delay >= deadline {
                return Err(err);
            }
            tracing::debug!(attempt = n, delay_ms = delay.as_millis() as u64, "retrying");
            tokio::time::sleep(delay).await;
            n += 1;
        }
    }
}
