//! Navigation resolution error types.

use thiserror::Error;

use crate::store::ProfileStoreError;

/// Errors that can occur while resolving a navigation state.
#[derive(Debug, Error)]
pub enum AuthResolutionError {
    /// The profile fetch for the current signal failed.
    ///
    /// The resolver does not guess a navigation state on failure; the
    /// caller decides (e.g. show error + retry).
    #[error("profile fetch failed: {0}")]
    ProfileFetch(#[from] ProfileStoreError),
}

/// Result type alias for navigation resolution.
pub type NavResult<T> = Result<T, AuthResolutionError>;
