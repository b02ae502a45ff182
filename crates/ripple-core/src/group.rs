//! Broadcast groups.
//!
//! A [`Group`] owns the membership table: a map from member ID to the sending
//! half of that member's outbound handle. Relays read it concurrently during
//! delivery rounds; joins and leaves take it exclusively. The lock is
//! `tokio::sync::RwLock`, whose FIFO queueing keeps a steady stream of rounds
//! from starving joins and leaves.

use crate::config::GroupConfig;
use crate::member::{Inbound, MemberId, Outbound};
use crate::metrics;
use crate::policy::{Budget, RoundReport};
use crate::relay::Relay;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

/// State shared between a group and its relays.
pub(crate) struct Shared<T> {
    /// Outbound senders of every joined member.
    pub(crate) members: RwLock<HashMap<MemberId, mpsc::Sender<T>>>,
    /// Next member ID to hand out.
    next_id: AtomicU64,
    config: GroupConfig,
    joined: AtomicU64,
    rounds: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    closed: AtomicU64,
    downgrades: AtomicU64,
}

impl<T> Shared<T> {
    fn new(config: GroupConfig) -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            config,
            joined: AtomicU64::new(0),
            rounds: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            closed: AtomicU64::new(0),
            downgrades: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_round(&self, report: &RoundReport) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.dropped.fetch_add(report.dropped as u64, Ordering::Relaxed);
        self.closed.fetch_add(report.closed as u64, Ordering::Relaxed);
        if report.downgraded {
            self.downgrades.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// A fan-out group.
///
/// Every message a member publishes is delivered to all other members that
/// are joined at the time of the delivery round. Cloning a `Group` yields
/// another handle to the same group.
pub struct Group<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Group<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new group with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GroupConfig::default())
    }

    /// Create a new group with custom configuration.
    ///
    /// An outbound capacity of zero is raised to one.
    #[must_use]
    pub fn with_config(mut config: GroupConfig) -> Self {
        config.outbound_capacity = config.outbound_capacity.max(1);
        info!("Creating group with config: {:?}", config);
        Self {
            shared: Arc::new(Shared::new(config)),
        }
    }

    /// Get the group configuration.
    #[must_use]
    pub fn config(&self) -> &GroupConfig {
        &self.shared.config
    }

    /// Join the group.
    ///
    /// `timeout` bounds how long each of this member's delivery rounds may
    /// block on slow receivers before dropping the message for them. A zero
    /// timeout never drops and may block indefinitely.
    ///
    /// The member is registered before this returns, so it receives every
    /// message whose delivery round starts afterwards.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub async fn join(&self, timeout: Duration) -> (Inbound<T>, Outbound<T>) {
        let id = MemberId::new(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let budget = Budget::from(timeout);
        let (outbound_tx, outbound_rx) = mpsc::channel(self.shared.config.outbound_capacity);
        let (inbound_tx, inbound_rx) = mpsc::channel(1);

        let members = {
            let mut members = self.shared.members.write().await;
            members.insert(id, outbound_tx);
            members.len()
        };
        self.shared.joined.fetch_add(1, Ordering::Relaxed);
        metrics::record_join();
        debug!(member = %id, ?budget, members, "Member joined");

        let relay = Relay::new(id, budget, Arc::clone(&self.shared), inbound_rx);
        tokio::spawn(relay.run());

        (Inbound::new(id, inbound_tx), Outbound::new(id, outbound_rx))
    }

    /// Get the number of joined members.
    pub async fn member_count(&self) -> usize {
        self.shared.members.read().await.len()
    }

    /// Check whether every member has left.
    pub async fn is_empty(&self) -> bool {
        self.shared.members.read().await.is_empty()
    }

    /// Get group statistics.
    pub async fn stats(&self) -> GroupStats {
        let shared = &self.shared;
        GroupStats {
            members: self.member_count().await,
            joined: shared.joined.load(Ordering::Relaxed),
            rounds: shared.rounds.load(Ordering::Relaxed),
            delivered: shared.delivered.load(Ordering::Relaxed),
            dropped: shared.dropped.load(Ordering::Relaxed),
            closed: shared.closed.load(Ordering::Relaxed),
            downgrades: shared.downgrades.load(Ordering::Relaxed),
        }
    }
}

impl<T> Default for Group<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Group<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Group statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Members currently joined.
    pub members: usize,
    /// Members that ever joined.
    pub joined: u64,
    /// Delivery rounds run.
    pub rounds: u64,
    /// Messages handed to receivers.
    pub delivered: u64,
    /// Deliveries dropped after a round's budget ran out.
    pub dropped: u64,
    /// Deliveries skipped because the receiver dropped its outbound handle.
    pub closed: u64,
    /// Rounds that downgraded to non-blocking delivery.
    pub downgrades: u64,
}
