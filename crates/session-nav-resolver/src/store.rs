//! Profile store contract.

use async_trait::async_trait;
use proact_core::{UserId, UserProfile};
use thiserror::Error;

/// Errors a profile store implementation can report.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// The backend returned a non-success status.
    #[error("backend error: {status} - {message}")]
    Backend {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Summarized response detail, never the raw body.
        message: String,
    },

    /// Network or transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded into a profile record.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Fetches the current user's profile record.
///
/// Implementors (typically the REST gateway) resolve the record from the
/// managed backend. Tests supply recording mocks.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile for a user.
    ///
    /// Returns `Ok(None)` when authentication succeeded but the profile
    /// record has not been created yet.
    async fn get_current_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, ProfileStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = ProfileStoreError::Backend {
            status: 401,
            message: "len=12,digest=00ff".to_string(),
        };
        assert_eq!(format!("{}", err), "backend error: 401 - len=12,digest=00ff");
    }

    #[test]
    fn transport_error_display() {
        let err = ProfileStoreError::Transport("connection refused".to_string());
        assert_eq!(format!("{}", err), "transport error: connection refused");
    }
}
