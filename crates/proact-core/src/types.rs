//! Core types for the Proact sync core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user (UUID string).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a user ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a mission (UUID string).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(pub String);

impl MissionId {
    /// Creates a new random mission ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a mission ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the mission ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MissionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A user's profile record in the managed backend.
///
/// Absence of a profile (the backend returns no row) means authentication
/// succeeded but the record has not been created yet; the navigation layer
/// treats that the same as an un-onboarded profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    /// Whether the one-time onboarding flow has been completed.
    pub onboarded: bool,
}

/// Completion status of a mission.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    NotStarted,
    InProgress,
    Done,
    Expired,
}

impl MissionStatus {
    /// Returns true if the mission still counts toward active work.
    pub fn is_active(&self) -> bool {
        matches!(self, MissionStatus::NotStarted | MissionStatus::InProgress)
    }
}

/// A mission owned by the remote store.
///
/// The sync engine holds read-only cached copies; the remote store is always
/// the source of truth. `steps` holds the sub-missions resolved up to the
/// traversal depth the fetch was issued with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionEntity {
    pub id: MissionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Eco points awarded for completing this mission itself.
    pub reward_points: i64,
    /// Estimated CO2 saving in kilograms.
    #[serde(default)]
    pub co2_in_kg: i64,
    pub status: MissionStatus,
    /// Sub-missions, bounded by the fetch traversal depth.
    #[serde(default)]
    pub steps: Vec<MissionEntity>,
}

impl MissionEntity {
    /// Creates a mission with no steps.
    pub fn new(id: MissionId, title: impl Into<String>, reward_points: i64) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            reward_points,
            co2_in_kg: 0,
            status: MissionStatus::NotStarted,
            steps: Vec::new(),
        }
    }

    /// Total reward of this mission plus all resolved steps, recursively.
    pub fn total_reward_points(&self) -> i64 {
        self.steps
            .iter()
            .fold(self.reward_points, |sum, step| {
                sum.saturating_add(step.total_reward_points())
            })
    }

    /// Total CO2 saving of this mission plus all resolved steps.
    pub fn total_co2_in_kg(&self) -> i64 {
        self.steps
            .iter()
            .fold(self.co2_in_kg, |sum, step| {
                sum.saturating_add(step.total_co2_in_kg())
            })
    }
}
