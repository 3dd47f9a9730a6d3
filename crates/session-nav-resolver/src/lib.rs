//! Navigation-state derivation for the Proact session core.
//!
//! This crate provides:
//! - The [`AuthSignal`] and [`NavigationState`] types
//! - The [`ProfileStore`] trait for fetching the current user's profile
//! - [`SessionNavResolver`], which derives one navigation state per
//!   authentication signal with last-write-wins discarding of superseded
//!   in-flight profile fetches

mod error;
mod resolver;
mod store;

pub use error::{AuthResolutionError, NavResult};
pub use resolver::{
    AuthSignal, NavErrorCallback, NavStateCallback, NavigationState, SessionNavResolver,
};
pub use store::{ProfileStore, ProfileStoreError};
