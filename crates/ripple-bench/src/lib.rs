//! Shared setup for Ripple benchmarks.

use bytes::Bytes;
use ripple_core::{Group, Inbound};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// A joined member whose outbound handle is drained by a background task.
pub struct Drainer {
    /// Keeps the member joined until dropped.
    pub inbound: Inbound<Bytes>,
    /// Resolves to the number of messages received once the member leaves.
    pub task: JoinHandle<usize>,
}

/// Build the multi-threaded runtime benchmarks run on.
///
/// # Panics
///
/// Panics if the runtime cannot be created.
#[must_use]
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
}

/// Create a payload of `size` bytes.
#[must_use]
pub fn payload(size: usize) -> Bytes {
    Bytes::from(vec![0u8; size])
}

/// Join `count` members that drain everything they receive.
pub async fn join_drainers(group: &Group<Bytes>, count: usize, timeout: Duration) -> Vec<Drainer> {
    let mut drainers = Vec::with_capacity(count);
    for _ in 0..count {
        let (inbound, mut outbound) = group.join(timeout).await;
        let task = tokio::spawn(async move {
            let mut received = 0;
            while outbound.recv().await.is_some() {
                received += 1;
            }
            received
        });
        drainers.push(Drainer { inbound, task });
    }
    drainers
}

/// Make every drainer leave and wait for its outbound handle to end.
pub async fn leave_all(drainers: Vec<Drainer>) -> usize {
    let mut received = 0;
    for Drainer { inbound, task } in drainers {
        inbound.close();
        received += task.await.unwrap_or_default();
    }
    received
}
