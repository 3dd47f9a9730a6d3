//! Progress sync error types.

use std::time::Duration;

use proact_core::MissionId;
use thiserror::Error;

use crate::store::MissionStoreError;

/// Errors that can occur in the progress sync engine.
#[derive(Debug, Error)]
pub enum ProgressSyncError {
    /// The initial missions/points fetch failed as a whole.
    ///
    /// Either of the two joined fetches failing fails initialization; the
    /// engine stays uninitialized and the call can be retried.
    #[error("initial progress fetch failed: {0}")]
    Init(#[source] MissionStoreError),

    /// A mission completion could not be confirmed remotely.
    ///
    /// The optimistic local state is NOT rolled back; the caller owns the
    /// compensation path (retry, or reconcile via a points refresh).
    #[error("mission completion not confirmed for {mission}: {source}")]
    Reconciliation {
        mission: MissionId,
        #[source]
        source: MissionStoreError,
    },

    /// The weekly points refresh failed; local state is unchanged.
    #[error("weekly points refresh failed: {0}")]
    Refresh(#[source] MissionStoreError),

    /// A remote call exceeded the configured request timeout.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    /// The engine has not been initialized yet.
    #[error("engine is not initialized")]
    NotReady,

    /// `initialize` was called on an already-initialized engine.
    #[error("engine is already initialized")]
    AlreadyInitialized,

    /// The owning session ended before the operation settled.
    #[error("session ended before the operation settled")]
    SessionEnded,
}

/// Result type alias for progress sync operations.
pub type ProgressResult<T> = Result<T, ProgressSyncError>;
