//! Delivery policy.
//!
//! A delivery round fans one message out to every other member under a
//! single deadline. While the deadline holds, each handoff may wait for the
//! receiver to make room. Once the deadline fires the round downgrades: the
//! receiver that was being waited on and every receiver after it get one
//! immediate attempt, and the message is dropped for those that are full.
//!
//! A stalled receiver therefore costs a round at most one timeout, no matter
//! how many members the group has. The next message starts a fresh deadline.

use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// How long a delivery round may block on slow receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Wait as long as it takes; nothing is ever dropped.
    Unbounded,
    /// Block for at most this long per round, then downgrade.
    Within(Duration),
}

impl From<Duration> for Budget {
    /// A zero timeout means "no bound", not "never wait".
    fn from(timeout: Duration) -> Self {
        if timeout.is_zero() {
            Self::Unbounded
        } else {
            Self::Within(timeout)
        }
    }
}

/// Outcome of one delivery round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Receivers that accepted the message.
    pub delivered: usize,
    /// Receivers that were full after the budget ran out.
    pub dropped: usize,
    /// Receivers whose outbound handle had already been dropped.
    pub closed: usize,
    /// Whether the deadline fired during the round.
    pub downgraded: bool,
}

impl RoundReport {
    /// Number of receivers the round visited.
    #[must_use]
    pub fn targets(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }
}

/// Fan `message` out to `targets` under `budget`.
pub(crate) async fn deliver<'a, T, I>(message: T, targets: I, budget: Budget) -> RoundReport
where
    T: Clone + 'a,
    I: IntoIterator<Item = &'a mpsc::Sender<T>>,
{
    let mut report = RoundReport::default();

    let deadline = match budget {
        Budget::Unbounded => {
            for tx in targets {
                match tx.reserve().await {
                    Ok(permit) => {
                        permit.send(message.clone());
                        report.delivered += 1;
                    }
                    Err(_) => report.closed += 1,
                }
            }
            return report;
        }
        Budget::Within(timeout) => Instant::now() + timeout,
    };

    for tx in targets {
        if !report.downgraded {
            match timeout_at(deadline, tx.reserve()).await {
                Ok(Ok(permit)) => {
                    permit.send(message.clone());
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(_)) => {
                    report.closed += 1;
                    continue;
                }
                Err(_) => {
                    debug!("Round budget spent, downgrading to non-blocking delivery");
                    report.downgraded = true;
                }
            }
        }

        match tx.try_reserve() {
            Ok(permit) => {
                permit.send(message.clone());
                report.delivered += 1;
            }
            Err(TrySendError::Full(())) => report.dropped += 1,
            Err(TrySendError::Closed(())) => report.closed += 1,
        }
    }

    report
}
