//! Member handles.
//!
//! Joining a group yields an [`Inbound`] handle to publish through and an
//! [`Outbound`] handle to receive everything the other members publish.

use crate::error::SendError;
use futures_util::Stream;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};

/// Identifies a member within its group.
///
/// IDs are allocated from a per-group counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u64);

impl MemberId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member-{}", self.0)
    }
}

/// A message submitted to a relay, paired with the signal fired once its
/// delivery round is over.
pub(crate) struct Submission<T> {
    pub(crate) message: T,
    pub(crate) done: oneshot::Sender<()>,
}

/// The publishing side of a member.
///
/// Dropping the handle (or calling [`close`](Self::close)) is how a member
/// leaves its group.
pub struct Inbound<T> {
    id: MemberId,
    tx: mpsc::Sender<Submission<T>>,
}

impl<T> Inbound<T> {
    pub(crate) fn new(id: MemberId, tx: mpsc::Sender<Submission<T>>) -> Self {
        Self { id, tx }
    }

    /// Get the member ID.
    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// Publish a message to every other member.
    ///
    /// Resolves once the delivery round for `message` is over. With a
    /// non-zero timeout that takes at most about one timeout; with a zero
    /// timeout it waits for every receiver to make room.
    ///
    /// # Errors
    ///
    /// Returns the message if the relay task is no longer running when the
    /// message is submitted. Once the relay has taken the message it owns
    /// it: if the relay is torn down before acknowledging the round (runtime
    /// shutdown or a panic), the round counts as best-effort delivery and
    /// `Ok(())` is returned, the same as for receivers dropped on timeout.
    pub async fn send(&self, message: T) -> Result<(), SendError<T>> {
        let (done, finished) = oneshot::channel();
        self.tx
            .send(Submission { message, done })
            .await
            .map_err(|e| SendError(e.0.message))?;
        // A relay torn down mid-round just means the rest of the round is lost
        let _ = finished.await;
        Ok(())
    }

    /// Blocking variant of [`send`](Self::send) for synchronous code.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send): only a relay that is gone at submission
    /// time yields an error.
    pub fn blocking_send(&self, message: T) -> Result<(), SendError<T>> {
        let (done, finished) = oneshot::channel();
        self.tx
            .blocking_send(Submission { message, done })
            .map_err(|e| SendError(e.0.message))?;
        let _ = finished.blocking_recv();
        Ok(())
    }

    /// Leave the group.
    ///
    /// The relay finishes the round in flight, deregisters the member and
    /// closes its outbound handle.
    pub fn close(self) {
        drop(self);
    }
}

impl<T> fmt::Debug for Inbound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbound").field("id", &self.id).finish()
    }
}

/// The receiving side of a member.
///
/// Yields messages published by the other members and ends once the member
/// has left the group.
pub struct Outbound<T> {
    id: MemberId,
    rx: mpsc::Receiver<T>,
}

impl<T> Outbound<T> {
    pub(crate) fn new(id: MemberId, rx: mpsc::Receiver<T>) -> Self {
        Self { id, rx }
    }

    /// Get the member ID.
    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// Receive the next message.
    ///
    /// Returns `None` once the member has left and everything delivered
    /// before that has been received.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receive a message if one is ready.
    ///
    /// # Errors
    ///
    /// Returns `Empty` if nothing is buffered, or `Disconnected` once the
    /// member has left.
    pub fn try_recv(&mut self) -> Result<T, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }
}

impl<T> Stream for Outbound<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> fmt::Debug for Outbound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbound").field("id", &self.id).finish()
    }
}
