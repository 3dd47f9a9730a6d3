//! # Progress sync engine
//!
//! An in-memory mission/points/level engine that applies optimistic local
//! updates and reconciles with a remote source of truth.
//!
//! ## Non-negotiable Principles
//!
//! - **The remote store is the only source of truth** - local state is a
//!   derived, optimistically-mutated cache
//! - **Local rewards settle synchronously** - the UI-facing snapshot updates
//!   without waiting on any network call
//! - **Reconciliation failures are surfaced, never swallowed** - a failed
//!   remote confirmation is reported through the error path and the
//!   [`ReconcileSink`], but applied optimistic state is not rolled back
//! - **Nothing mutates after teardown** - in-flight results arriving after
//!   session end are discarded
//!
//! ## Architecture
//!
//! ```text
//! WRITE:
//!   local state -> snapshot broadcast -> remote confirmation
//!
//! READ:
//!   snapshot + live subscription
//!
//! DRIFT:
//!   refresh_weekly_points -> replace local with authoritative
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use progress_sync_engine::{ProgressSyncEngine, RecordingSink};
//!
//! let engine = ProgressSyncEngine::new(store, Arc::new(RecordingSink::new()));
//! let initial = engine.initialize(&user).await?;
//!
//! // Optimistic local update, visible immediately.
//! let snapshot = engine.apply_local_reward(25)?;
//!
//! // Remote confirmation; a failure surfaces but does not roll back.
//! engine.complete_mission(&mission_id).await?;
//! ```
//!
//! ## Crate Structure
//!
//! - [`engine`] - The sync engine and its lifecycle
//! - [`store`] - The remote mission store contract
//! - [`reconcile`] - Reconcile event contracts
//! - [`hub`] - Live snapshot subscriptions

pub mod engine;
pub mod hub;
pub mod reconcile;
pub mod store;

mod error;

#[cfg(test)]
mod tests;

pub use engine::{EngineLifecycle, ProgressSyncEngine, SyncConfig};
pub use error::{ProgressResult, ProgressSyncError};
pub use hub::{ProgressHub, ProgressSubscription};
pub use reconcile::{NullSink, ReconcileEvent, ReconcileSink, RecordingSink};
pub use store::{MissionStore, MissionStoreError};
