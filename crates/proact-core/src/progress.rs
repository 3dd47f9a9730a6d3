//! Progress state and point/level arithmetic.
//!
//! # Design Principles
//!
//! - `eco_points` never goes negative
//! - `level` is always `eco_points / 100 + 1` after a mutation settles
//! - All arithmetic is integer-only

use serde::{Deserialize, Serialize};

use crate::types::{MissionEntity, MissionId};

/// Points required per level. `level = eco_points / POINTS_PER_LEVEL + 1`.
pub const POINTS_PER_LEVEL: i64 = 100;

/// Computes the level for a non-negative point total.
///
/// Integer division truncates, so 0..=99 points is level 1, 100..=199 is
/// level 2, and so on. The floor of the scale is level 1.
pub fn level_for_points(eco_points: i64) -> i64 {
    eco_points / POINTS_PER_LEVEL + 1
}

/// A user's progress within one session.
///
/// Owned exclusively by the sync engine; everything handed out is a clone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Accumulated eco points, clamped at zero.
    pub eco_points: i64,
    /// Derived from `eco_points`; never below 1.
    pub level: i64,
    /// Cached copy of the remote store's active missions.
    pub active_missions: Vec<MissionEntity>,
}

impl ProgressState {
    /// An empty state, as created at session start before the initial fetch.
    pub fn empty() -> Self {
        Self {
            eco_points: 0,
            level: 1,
            active_missions: Vec::new(),
        }
    }

    /// Builds a state from fetched missions and an authoritative point total.
    pub fn from_fetched(active_missions: Vec<MissionEntity>, eco_points: i64) -> Self {
        let eco_points = eco_points.max(0);
        Self {
            eco_points,
            level: level_for_points(eco_points),
            active_missions,
        }
    }

    /// Applies a local reward, which may be negative.
    ///
    /// Clamps at zero and recomputes the level. Synchronous and infallible;
    /// this is the optimistic-update primitive.
    pub fn apply_reward(&mut self, points: i64) {
        self.eco_points = self.eco_points.saturating_add(points).max(0);
        self.level = level_for_points(self.eco_points);
    }

    /// Replaces the point total with a server-authoritative value.
    ///
    /// Replacement, not a merge: any drift from optimistic updates is
    /// discarded in favor of the fetched value.
    pub fn replace_points(&mut self, eco_points: i64) {
        self.eco_points = eco_points.max(0);
        self.level = level_for_points(self.eco_points);
    }

    /// Removes a mission from the active list.
    ///
    /// Returns true if the mission was present. Only top-level missions are
    /// matched; steps complete through their parent.
    pub fn remove_active_mission(&mut self, id: &MissionId) -> bool {
        let before = self.active_missions.len();
        self.active_missions.retain(|mission| &mission.id != id);
        self.active_missions.len() != before
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::empty()
    }
}
