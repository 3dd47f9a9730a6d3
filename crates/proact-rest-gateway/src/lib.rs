//! REST gateway for the Proact managed backend.
//!
//! This crate provides:
//! - [`ProactRestClient`], a REST client for the backend's `profiles`,
//!   `missions`, and `weekly_points` tables
//! - Implementations of the [`ProfileStore`] and [`MissionStore`] contracts
//!   over that client
//! - Bounded mission step traversal: one query per depth layer, stopping at
//!   the depth the caller requested
//!
//! [`ProfileStore`]: session_nav_resolver::ProfileStore
//! [`MissionStore`]: progress_sync_engine::MissionStore

mod client;
mod error;

pub use client::{ProactRestClient, RestGatewayConfig};
pub use error::{GatewayError, GatewayResult};
