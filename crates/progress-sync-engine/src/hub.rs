//! Live snapshot subscriptions for the progress sync engine.
//!
//! Subscribers receive a full [`ProgressState`] snapshot after every settled
//! mutation, in settle order.
//!
//! # Design Principles
//!
//! - Subscribers are notified after the mutation has settled locally
//! - Snapshots are values; a slow subscriber never blocks the engine's state
//! - Teardown closes all subscriptions

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::RwLock;

use proact_core::ProgressState;

/// A subscription to progress snapshots for one session.
pub struct ProgressSubscription {
    receiver: Receiver<ProgressState>,
}

impl ProgressSubscription {
    fn new(receiver: Receiver<ProgressState>) -> Self {
        Self { receiver }
    }

    /// Blocks the current thread until the next snapshot is available.
    ///
    /// Returns None once the hub has been closed.
    pub fn recv(&self) -> Option<ProgressState> {
        self.receiver.recv().ok()
    }

    /// Attempts to receive a snapshot without blocking.
    pub fn try_recv(&self) -> Option<ProgressState> {
        self.receiver.try_recv().ok()
    }

    /// Creates a blocking iterator over snapshots until the hub closes.
    pub fn iter(&self) -> impl Iterator<Item = ProgressState> + '_ {
        std::iter::from_fn(|| self.recv())
    }
}

/// A hub that broadcasts progress snapshots to subscribers.
#[derive(Debug, Default)]
pub struct ProgressHub {
    /// Active subscriber senders; dead ones are pruned on notify.
    senders: RwLock<Vec<Sender<ProgressState>>>,
}

impl ProgressHub {
    /// Creates a new empty hub with no subscribers.
    pub fn new() -> Self {
        Self {
            senders: RwLock::new(Vec::new()),
        }
    }

    /// Creates a new subscription.
    ///
    /// The subscription receives every snapshot published after this call;
    /// snapshots published before it are not replayed.
    pub fn subscribe(&self) -> ProgressSubscription {
        let (sender, receiver) = mpsc::channel();
        self.senders.write().expect("lock poisoned").push(sender);
        ProgressSubscription::new(receiver)
    }

    /// Broadcasts a snapshot to all subscribers.
    ///
    /// Dead subscribers (receiver dropped) are removed during the send.
    pub fn notify(&self, snapshot: ProgressState) {
        let mut senders = self.senders.write().expect("lock poisoned");
        senders.retain(|sender| sender.send(snapshot.clone()).is_ok());
    }

    /// Drops all subscriber channels.
    ///
    /// Pending receives return None after this call. Called at session
    /// teardown.
    pub fn close(&self) {
        self.senders.write().expect("lock poisoned").clear();
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.senders.read().expect("lock poisoned").len()
    }
}
