//! # ripple-core
//!
//! In-process fan-out groups with timeout-bounded delivery.
//!
//! Any member of a [`Group`] can publish a value and every other member
//! receives it. A receiver that stops draining cannot stall the rest: each
//! delivery round blocks on slow receivers for at most the publisher's
//! timeout, after which the message is dropped for whoever is still full.
//!
//! - **Group** - Membership table shared by all relays
//! - **Member** - Inbound (publish) and outbound (receive) handles
//! - **Relay** - One task per member driving its delivery rounds
//! - **Policy** - Deadline-bounded fan-out of a single message
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Inbound   │────▶│    Relay    │────▶│  Outbound   │ (every other member)
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │ read lock
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Members   │◀──── join / leave (write lock)
//!                     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ripple_core::Group;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let group = Group::new();
//! let (alice, _alice_out) = group.join(Duration::from_secs(1)).await;
//! let (bob, mut bob_out) = group.join(Duration::from_secs(1)).await;
//!
//! alice.send("hello").await.unwrap();
//! assert_eq!(bob_out.recv().await, Some("hello"));
//!
//! bob.close();
//! assert_eq!(bob_out.recv().await, None);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod group;
pub mod member;
pub mod metrics;
pub mod policy;
mod relay;

pub use config::GroupConfig;
pub use error::{ConfigError, SendError};
pub use group::{Group, GroupStats};
pub use member::{Inbound, MemberId, Outbound};
pub use policy::{Budget, RoundReport};
