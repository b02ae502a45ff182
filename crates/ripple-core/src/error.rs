//! Error types for Ripple.
//!
//! Delivery itself never fails: a receiver that misses a message is counted,
//! not reported. The only errors surface at the edges of the API.

use std::fmt;
use thiserror::Error;

/// Returned by [`Inbound::send`](crate::Inbound::send) when the member's relay
/// task is no longer running.
///
/// The unsent message is handed back to the caller.
#[derive(Error)]
#[error("Relay task has terminated")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Take back the message that could not be submitted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError").finish_non_exhaustive()
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Outbound handles must be able to hold at least one message.
    #[error("Outbound capacity must be at least 1")]
    ZeroOutboundCapacity,
}
