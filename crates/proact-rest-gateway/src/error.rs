//! Error types for backend gateway operations.

use progress_sync_engine::MissionStoreError;
use session_nav_resolver::ProfileStoreError;
use thiserror::Error;

/// Comprehensive error type for all gateway operations.
///
/// Supports automatic conversion from reqwest and serde_json errors via
/// #[from], and converts into the store-level error types at the trait
/// boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network or transport-level HTTP error from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success HTTP status.
    ///
    /// Contains the status code and a summarized body for debugging.
    /// Common causes: authentication failure, row-level policy violation,
    /// schema mismatch.
    #[error("backend error: {status} - {message}")]
    Backend {
        /// The HTTP status code returned by the backend.
        status: u16,
        /// Summarized response detail, never the raw body.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or credential error.
    ///
    /// Used for missing access tokens and invalid API URLs.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<GatewayError> for ProfileStoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Backend { status, message } => {
                ProfileStoreError::Backend { status, message }
            }
            GatewayError::Http(err) => ProfileStoreError::Transport(err.to_string()),
            GatewayError::Json(err) => ProfileStoreError::Decode(err.to_string()),
            GatewayError::Config(msg) => ProfileStoreError::Transport(msg),
        }
    }
}

impl From<GatewayError> for MissionStoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Backend { status, message } => {
                MissionStoreError::Backend { status, message }
            }
            GatewayError::Http(err) => MissionStoreError::Transport(err.to_string()),
            GatewayError::Json(err) => MissionStoreError::Decode(err.to_string()),
            GatewayError::Config(msg) => MissionStoreError::Transport(msg),
        }
    }
}
