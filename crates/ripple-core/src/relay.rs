//! Per-member relay task.
//!
//! Each joined member gets one relay. It takes messages from the member's
//! inbound handle, runs a delivery round for each under a read lock on the
//! membership table, and acknowledges the round to the publisher. When the
//! inbound handle closes the relay deregisters the member, which drops the
//! only sender feeding its outbound handle.

use crate::group::Shared;
use crate::member::{MemberId, Submission};
use crate::metrics;
use crate::policy::{self, Budget};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

pub(crate) struct Relay<T> {
    id: MemberId,
    budget: Budget,
    shared: Arc<Shared<T>>,
    submissions: mpsc::Receiver<Submission<T>>,
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        id: MemberId,
        budget: Budget,
        shared: Arc<Shared<T>>,
        submissions: mpsc::Receiver<Submission<T>>,
    ) -> Self {
        Self {
            id,
            budget,
            shared,
            submissions,
        }
    }

    pub(crate) async fn run(mut self) {
        while let Some(Submission { message, done }) = self.submissions.recv().await {
            let started = Instant::now();
            let members = self.shared.members.read().await;
            let id = self.id;
            let targets: Vec<_> = members
                .iter()
                .filter(|(member, _)| **member != id)
                .map(|(_, tx)| tx)
                .collect();
            let report = policy::deliver(message, targets, self.budget).await;
            drop(members);
            let elapsed = started.elapsed();

            trace!(
                member = %self.id,
                targets = report.targets(),
                delivered = report.delivered,
                dropped = report.dropped,
                closed = report.closed,
                downgraded = report.downgraded,
                ?elapsed,
                "Delivery round finished"
            );
            self.shared.record_round(&report);
            metrics::record_round(&report, elapsed);

            // The publisher may have given up waiting
            let _ = done.send(());
        }

        // Inbound closed: no further rounds from this member
        let (outbound, remaining) = {
            let mut members = self.shared.members.write().await;
            (members.remove(&self.id), members.len())
        };
        // Dropping the registry's sender ends the outbound stream
        drop(outbound);

        metrics::record_leave();
        debug!(member = %self.id, members = remaining, "Member left");
    }
}
