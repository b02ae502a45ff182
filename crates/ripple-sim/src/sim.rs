//! Fan-out simulation.
//!
//! Joins a group of members in three roles: publishers (publish and drain),
//! listeners (drain only) and stalled members (never drain). Every draining
//! member tallies what it receives so the run can be checked afterwards.

use crate::config::Config;
use anyhow::{Context, Result};
use ripple_core::{Group, GroupStats, Inbound, MemberId, Outbound};
use std::collections::HashSet;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A published message: the publisher and its sequence number.
type Tick = (MemberId, usize);

/// What one draining member observed.
#[derive(Debug, Default)]
struct Tally {
    received: usize,
    self_deliveries: usize,
    duplicates: usize,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone)]
pub struct SimReport {
    /// Time spent publishing.
    pub elapsed: Duration,
    /// Messages published across all publishers.
    pub published: usize,
    /// Messages received by draining members.
    pub received: usize,
    /// Messages draining members would receive with no drops.
    pub expected: usize,
    /// Messages a member received from itself.
    pub self_deliveries: usize,
    /// Messages a member received more than once.
    pub duplicates: usize,
    /// Group statistics after every member left.
    pub stats: GroupStats,
}

impl SimReport {
    /// Log the report.
    pub fn log(&self) {
        info!(
            elapsed = ?self.elapsed,
            published = self.published,
            received = self.received,
            expected = self.expected,
            dropped = self.stats.dropped,
            closed = self.stats.closed,
            downgrades = self.stats.downgrades,
            "Simulation finished"
        );
        if self.self_deliveries > 0 || self.duplicates > 0 {
            warn!(
                self_deliveries = self.self_deliveries,
                duplicates = self.duplicates,
                "Delivery invariants violated"
            );
        }
    }
}

/// Drain an outbound handle until its member leaves.
async fn drain(mut outbound: Outbound<Tick>) -> Tally {
    let own = outbound.id();
    let mut seen = HashSet::new();
    let mut tally = Tally::default();

    while let Some((from, seq)) = outbound.recv().await {
        tally.received += 1;
        if from == own {
            tally.self_deliveries += 1;
        }
        if !seen.insert((from, seq)) {
            tally.duplicates += 1;
        }
    }

    debug!(member = %own, received = tally.received, "Drained");
    tally
}

/// Publish `messages` ticks, handing the inbound handle back afterwards.
fn publish(inbound: Inbound<Tick>, messages: usize) -> JoinHandle<Result<Inbound<Tick>>> {
    tokio::spawn(async move {
        let id = inbound.id();
        for seq in 0..messages {
            inbound
                .send((id, seq))
                .await
                .with_context(|| format!("{} could not publish", id))?;
        }
        Ok(inbound)
    })
}

/// Run a simulation.
///
/// # Errors
///
/// Returns an error if a publisher's relay stops unexpectedly.
pub async fn run(config: &Config) -> Result<SimReport> {
    let group = Group::with_config(config.group.clone());
    let timeout = config.timeout();
    let draining = config.members - config.stalled_members;

    let mut inbounds = Vec::with_capacity(config.members);
    let mut drains = Vec::with_capacity(draining);
    let mut stalled = Vec::with_capacity(config.stalled_members);
    for index in 0..config.members {
        let (inbound, outbound) = group.join(timeout).await;
        if index < draining {
            drains.push(tokio::spawn(drain(outbound)));
        } else {
            stalled.push(outbound);
        }
        inbounds.push(inbound);
    }

    info!(
        members = config.members,
        publishers = config.publishers,
        stalled = config.stalled_members,
        ?timeout,
        "Starting simulation"
    );

    let listeners = inbounds.split_off(config.publishers);
    let start = Instant::now();
    let publishers: Vec<_> = inbounds
        .into_iter()
        .map(|inbound| publish(inbound, config.messages))
        .collect();

    let mut finished = Vec::with_capacity(publishers.len());
    for publisher in publishers {
        finished.push(publisher.await.context("Publisher task failed")??);
    }
    let elapsed = start.elapsed();

    for inbound in finished.into_iter().chain(listeners) {
        inbound.close();
    }

    let mut report = SimReport {
        elapsed,
        published: config.publishers * config.messages,
        received: 0,
        expected: config.publishers * config.messages * draining.saturating_sub(1),
        self_deliveries: 0,
        duplicates: 0,
        stats: GroupStats::default(),
    };
    for handle in drains {
        let tally = handle.await.context("Drain task failed")?;
        report.received += tally.received;
        report.self_deliveries += tally.self_deliveries;
        report.duplicates += tally.duplicates;
    }
    for mut outbound in stalled {
        while outbound.recv().await.is_some() {}
    }

    report.stats = group.stats().await;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;
    use ripple_core::GroupConfig;

    fn config(
        members: usize,
        stalled_members: usize,
        publishers: usize,
        timeout_ms: u64,
    ) -> Config {
        Config {
            members,
            stalled_members,
            publishers,
            messages: 5,
            timeout_ms,
            group: GroupConfig::default(),
            metrics: MetricsConfig { enabled: false },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_member_drops_only_its_messages() {
        let report = run(&config(4, 1, 1, 10)).await.unwrap();

        assert_eq!(report.published, 5);
        assert_eq!(report.expected, 10);
        assert_eq!(report.received, 10);
        assert_eq!(report.self_deliveries, 0);
        assert_eq!(report.duplicates, 0);
        // One message fills the stalled slot, the rest are dropped
        assert_eq!(report.stats.dropped, 4);
        assert_eq!(report.stats.downgrades, 4);
        assert_eq!(report.stats.members, 0);
        assert!(report.elapsed < Duration::from_millis(10) * 5);
    }

    #[tokio::test]
    async fn test_many_publishers_unbounded() {
        let report = run(&config(6, 0, 3, 0)).await.unwrap();

        assert_eq!(report.published, 15);
        assert_eq!(report.expected, 75);
        assert_eq!(report.received, report.expected);
        assert_eq!(report.self_deliveries, 0);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.stats.members, 0);
    }
}
