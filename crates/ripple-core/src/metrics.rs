//! Metrics instrumentation for Ripple.
//!
//! Uses the `metrics` facade. Nothing is recorded unless the embedding
//! application installs a recorder.

use crate::policy::RoundReport;
use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Metric names.
pub mod names {
    pub const MEMBERS_ACTIVE: &str = "ripple_members_active";
    pub const JOINS_TOTAL: &str = "ripple_joins_total";
    pub const LEAVES_TOTAL: &str = "ripple_leaves_total";
    pub const ROUNDS_TOTAL: &str = "ripple_rounds_total";
    pub const DELIVERIES_TOTAL: &str = "ripple_deliveries_total";
    pub const DROPS_TOTAL: &str = "ripple_drops_total";
    pub const DOWNGRADES_TOTAL: &str = "ripple_downgrades_total";
    pub const ROUND_SECONDS: &str = "ripple_round_seconds";
}

/// Describe all Ripple metrics to the installed recorder.
pub fn describe() {
    metrics::describe_gauge!(names::MEMBERS_ACTIVE, "Current number of joined members");
    metrics::describe_counter!(names::JOINS_TOTAL, "Total number of joins");
    metrics::describe_counter!(names::LEAVES_TOTAL, "Total number of members that left");
    metrics::describe_counter!(names::ROUNDS_TOTAL, "Total number of delivery rounds");
    metrics::describe_counter!(
        names::DELIVERIES_TOTAL,
        "Total number of messages handed to receivers"
    );
    metrics::describe_counter!(
        names::DROPS_TOTAL,
        "Total number of deliveries dropped after the timeout budget ran out"
    );
    metrics::describe_counter!(
        names::DOWNGRADES_TOTAL,
        "Total number of rounds that fell back to non-blocking delivery"
    );
    metrics::describe_histogram!(names::ROUND_SECONDS, "Delivery round duration in seconds");
}

/// Record a member joining.
pub(crate) fn record_join() {
    counter!(names::JOINS_TOTAL).increment(1);
    gauge!(names::MEMBERS_ACTIVE).increment(1.0);
}

/// Record a member leaving.
pub(crate) fn record_leave() {
    counter!(names::LEAVES_TOTAL).increment(1);
    gauge!(names::MEMBERS_ACTIVE).decrement(1.0);
}

/// Record a finished delivery round.
pub(crate) fn record_round(report: &RoundReport, elapsed: Duration) {
    counter!(names::ROUNDS_TOTAL).increment(1);
    counter!(names::DELIVERIES_TOTAL).increment(report.delivered as u64);
    if report.dropped > 0 {
        counter!(names::DROPS_TOTAL).increment(report.dropped as u64);
    }
    if report.downgraded {
        counter!(names::DOWNGRADES_TOTAL).increment(1);
    }
    histogram!(names::ROUND_SECONDS).record(elapsed.as_secs_f64());
}
