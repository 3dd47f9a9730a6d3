//! Reconcile event contracts for the progress sync engine.
//!
//! Events are emitted after a mutation settles locally or a remote
//! confirmation resolves. They are the engine's observable record of how
//! local and remote state converged (or failed to).
//!
//! # Design Principles
//!
//! - The engine emits events; the sink decides what they mean
//! - A reconciliation failure is always emitted, never only logged
//! - Tests assert emission, not behavior

use proact_core::MissionId;

/// An event emitted by the engine after a settled mutation or a resolved
/// remote confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// The initial fetch completed and the engine became ready.
    Initialized { eco_points: i64, missions: usize },
    /// An optimistic local reward was applied.
    RewardApplied { points: i64, eco_points: i64 },
    /// The remote store rejected (or failed to confirm) a completion.
    CompletionRejected { mission: MissionId },
    /// The weekly point total was replaced with the authoritative value.
    PointsRefreshed { eco_points: i64 },
}

/// A sink that receives reconcile events from the engine.
///
/// Implementations decide how to handle events (e.g. schedule a retry,
/// surface a banner in the UI layer, log them).
pub trait ReconcileSink: Send + Sync {
    /// Emit a reconcile event.
    fn emit(&self, event: ReconcileEvent);
}

/// A no-op sink that discards all events.
#[derive(Debug, Default)]
pub struct NullSink;

impl ReconcileSink for NullSink {
    fn emit(&self, _event: ReconcileEvent) {
        // Intentionally empty - discard all events
    }
}

/// A sink that records all events for testing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::sync::Mutex<Vec<ReconcileEvent>>,
}

impl RecordingSink {
    /// Creates a new recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<ReconcileEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.lock().expect("lock poisoned").clear();
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().expect("lock poisoned").len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReconcileSink for RecordingSink {
    fn emit(&self, event: ReconcileEvent) {
        self.events.lock().expect("lock poisoned").push(event);
    }
}
