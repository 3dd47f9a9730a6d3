//! # Proact core
//!
//! Domain types for the Proact session and progression sync core.
//!
//! ## Non-negotiable Principles
//!
//! - **The remote store is the only source of truth** - local state is a
//!   cached, optimistically-mutated view
//! - **Snapshots are values** - consumers receive clones, never shared
//!   mutable references
//! - **Derived fields are recomputed on every mutation** - `level` is never
//!   stored ahead of `eco_points`
//!
//! ## Crate Structure
//!
//! - [`types`] - Identifiers, profiles, and mission entities
//! - [`progress`] - The progress state value and its arithmetic

pub mod progress;
pub mod types;

pub use progress::{level_for_points, ProgressState, POINTS_PER_LEVEL};
pub use types::{MissionEntity, MissionId, MissionStatus, UserId, UserProfile};
