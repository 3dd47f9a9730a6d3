//! Remote mission store contract.

use async_trait::async_trait;
use proact_core::{MissionEntity, MissionId, UserId};
use thiserror::Error;

/// Errors a mission store implementation can report.
#[derive(Debug, Error)]
pub enum MissionStoreError {
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

    /// The response could not be decoded into mission records.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Remote gateway for mission and weekly point data.
///
/// The store owns all persistence; the engine only caches. Implementors are
/// typically the REST gateway; tests supply recording mocks.
#[async_trait]
pub trait MissionStore: Send + Sync {
    /// Fetches the user's active missions.
    ///
    /// `depth` bounds how many layers of mission-linked sub-entities are
    /// resolved, to avoid unbounded fan-out. An empty result is valid.
    async fn get_active_missions(
        &self,
        user: &UserId,
        depth: u32,
    ) -> Result<Vec<MissionEntity>, MissionStoreError>;

    /// Marks a mission complete in the remote store.
    async fn complete_mission(&self, id: &MissionId) -> Result<(), MissionStoreError>;

    /// Fetches the authoritative weekly eco-point total.
    async fn get_weekly_points(&self, user: &UserId) -> Result<i64, MissionStoreError>;
}
