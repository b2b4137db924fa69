//! Bounded poll-until-ready loop
//!
//! Drives operations the device completes asynchronously: the operation is
//! retried while it reports [`Error::TransientBusy`], until it yields a value,
//! fails with any other error, runs past its deadline or is cancelled.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default backoff between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Terminal state of a poll cycle that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The operation produced a value
    Succeeded {
        value: T,
        /// Polls performed, including the successful one
        attempts: u32,
    },
    /// The deadline passed while the device was still busy
    TimedOut {
        /// Polls performed
        attempts: u32,
    },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Succeeded { attempts, .. } | PollOutcome::TimedOut { attempts } => {
                *attempts
            }
        }
    }

    /// The value, or `None` on timeout
    pub fn into_option(self) -> Option<T> {
        match self {
            PollOutcome::Succeeded { value, .. } => Some(value),
            PollOutcome::TimedOut { .. } => None,
        }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `op` with the deadline counted from now
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, op: F) -> Result<PollOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_until(Instant::now() + self.timeout, cancel, op)
            .await
    }

    /// Poll `op` until `deadline`.
    ///
    /// The first poll happens immediately. Polling continues while the
    /// deadline has not passed.
    pub async fn run_until<T, F, Fut>(
        &self,
        deadline: Instant,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<PollOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0u32;

        while Instant::now() <= deadline {
            if cancel.is_cancelled() {
                return Err(Error::cancelled("poll"));
            }

            attempts += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::cancelled("poll")),
                result = op() => result,
            };
            match result {
                Ok(value) => {
                    debug!("Poll succeeded after {} attempt(s)", attempts);
                    return Ok(PollOutcome::Succeeded { value, attempts });
                }
                Err(Error::TransientBusy) => {
                    debug!("Poll attempt {}: device busy", attempts);
                }
                Err(e) => {
                    debug!("Poll attempt {} failed: {}", attempts, e);
                    return Err(e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::cancelled("poll")),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        warn!(
            "Poll timed out after {} attempt(s) ({:?} budget)",
            attempts, self.timeout
        );
        Ok(PollOutcome::TimedOut { attempts })
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), DEFAULT_POLL_INTERVAL)
    }
}
