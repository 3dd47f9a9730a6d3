//! Navigation state resolution from authentication signals.
//!
//! One explicit derivation runs per signal. Rapidly repeated signals (e.g.
//! transient reconnects) are handled by a monotonically increasing sequence
//! token: only the resolution of the most recent signal may publish, so a
//! slow profile fetch for a superseded signal can never clobber newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{Stream, StreamExt};
use proact_core::{UserId, UserProfile};
use tracing::{debug, warn};

use crate::error::{AuthResolutionError, NavResult};
use crate::store::ProfileStore;

/// A raw authentication event from the external identity provider.
///
/// The provider retains the latest value; the resolver only ever needs the
/// most recent signal to derive state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthSignal {
    /// An identity is signed in.
    Authenticated {
        user_id: UserId,
        /// Whether the identity's email address has been verified.
        email_verified: bool,
    },
    /// No identity is signed in.
    Unauthenticated,
}

/// The user-facing navigation state derived from auth and profile data.
///
/// Derived, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub enum NavigationState {
    /// Resolution in progress (or an unverified identity is lingering).
    Loading,
    /// No usable identity; show the login flow.
    ShowLogin,
    /// Authenticated but not onboarded; carries the profile when one exists.
    ShowOnboarding(Option<UserProfile>),
    /// Authenticated and onboarded; show the main experience.
    ShowHome,
}

impl NavigationState {
    /// Returns true once resolution has produced a navigable screen.
    pub fn is_settled(&self) -> bool {
        !matches!(self, NavigationState::Loading)
    }

    /// Returns true if the main experience should be shown.
    pub fn is_home(&self) -> bool {
        matches!(self, NavigationState::ShowHome)
    }
}

/// Callback type for navigation state change notifications.
pub type NavStateCallback = Box<dyn Fn(NavigationState) + Send + Sync>;

/// Callback type for resolution failures observed by the stream loop.
pub type NavErrorCallback = Box<dyn Fn(AuthResolutionError) + Send + Sync>;

/// Derives navigation state from authentication signals.
///
/// # Thread Safety
///
/// The resolver is shared behind an `Arc`; published state is protected by a
/// mutex and callbacks fire outside the lock.
pub struct SessionNavResolver {
    /// Profile record source.
    profiles: Arc<dyn ProfileStore>,
    /// Most recently published navigation state.
    state: Mutex<NavigationState>,
    /// Monotonic token; a resolution may only publish while its token is
    /// still the newest one claimed.
    signal_seq: AtomicU64,
    /// Optional callback for state change notifications.
    state_callback: Mutex<Option<NavStateCallback>>,
    /// Optional callback for failures surfaced from the stream loop.
    error_callback: Mutex<Option<NavErrorCallback>>,
}

impl SessionNavResolver {
    /// Creates a resolver over a profile store.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            profiles,
            state: Mutex::new(NavigationState::Loading),
            signal_seq: AtomicU64::new(0),
            state_callback: Mutex::new(None),
            error_callback: Mutex::new(None),
        }
    }

    /// Set a callback to be notified of navigation state changes.
    pub fn set_state_callback(&self, callback: NavStateCallback) {
        let mut cb = self.state_callback.lock().expect("lock poisoned");
        *cb = Some(callback);
    }

    /// Set a callback to be notified of resolution failures from [`run`].
    ///
    /// [`run`]: SessionNavResolver::run
    pub fn set_error_callback(&self, callback: NavErrorCallback) {
        let mut cb = self.error_callback.lock().expect("lock poisoned");
        *cb = Some(callback);
    }

    /// Returns the currently published navigation state.
    pub fn state(&self) -> NavigationState {
        self.state.lock().expect("lock poisoned").clone()
    }

    /// Resolves one authentication signal into a navigation state.
    ///
    /// - `Unauthenticated` publishes `ShowLogin` without any profile fetch.
    /// - `Authenticated` with an unverified email stays in `Loading`; the
    ///   identity provider is responsible for signing such accounts out, and
    ///   the resolver never derives a navigable screen from them.
    /// - `Authenticated` with a verified email fetches the profile and maps
    ///   absent-or-not-onboarded to `ShowOnboarding`, otherwise `ShowHome`.
    ///
    /// A fetch failure for the *current* signal propagates. If the signal was
    /// superseded while the fetch was in flight, the outcome is discarded and
    /// the state published by the newer signal is returned instead.
    pub async fn resolve(&self, signal: AuthSignal) -> NavResult<NavigationState> {
        let seq = self.claim_seq();
        self.resolve_with_seq(seq, signal).await
    }

    /// Claims the next signal-sequence token.
    ///
    /// Recency is defined by claim order, so the stream loop claims before
    /// spawning and task scheduling cannot reorder signals.
    fn claim_seq(&self) -> u64 {
        self.signal_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn resolve_with_seq(&self, seq: u64, signal: AuthSignal) -> NavResult<NavigationState> {
        match signal {
            AuthSignal::Unauthenticated => Ok(self.publish(seq, NavigationState::ShowLogin)),
            AuthSignal::Authenticated {
                user_id,
                email_verified: false,
            } => {
                warn!(
                    user_id = %user_id,
                    "auth signal for unverified email; holding navigation in loading"
                );
                Ok(self.publish(seq, NavigationState::Loading))
            }
            AuthSignal::Authenticated {
                user_id,
                email_verified: true,
            } => {
                self.publish(seq, NavigationState::Loading);

                match self.profiles.get_current_profile(&user_id).await {
                    Ok(profile) => {
                        let next = match &profile {
                            Some(p) if p.onboarded => NavigationState::ShowHome,
                            _ => NavigationState::ShowOnboarding(profile),
                        };
                        Ok(self.publish(seq, next))
                    }
                    Err(err) if self.is_current(seq) => {
                        Err(AuthResolutionError::ProfileFetch(err))
                    }
                    Err(err) => {
                        debug!(
                            error = %err,
                            "profile fetch for superseded auth signal failed; discarding"
                        );
                        Ok(self.state())
                    }
                }
            }
        }
    }

    /// Consumes an authentication signal stream until it ends.
    ///
    /// Each signal is resolved on its own task so a pending profile fetch
    /// never delays observation of a newer signal. Failures are handed to
    /// the error callback, or logged when none is set.
    pub async fn run(self: Arc<Self>, signals: impl Stream<Item = AuthSignal> + Send) {
        futures_util::pin_mut!(signals);
        while let Some(signal) = signals.next().await {
            let seq = self.claim_seq();
            let resolver = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(err) = resolver.resolve_with_seq(seq, signal).await {
                    resolver.report_error(err);
                }
            });
        }
        debug!("auth signal stream ended");
    }

    /// Returns true while `seq` is the newest claimed token.
    fn is_current(&self, seq: u64) -> bool {
        self.signal_seq.load(Ordering::SeqCst) == seq
    }

    /// Publishes a state if `seq` is still current, last-write-wins.
    ///
    /// Returns the state that is actually published afterwards, which for a
    /// superseded token is whatever the newer signal produced.
    fn publish(&self, seq: u64, next: NavigationState) -> NavigationState {
        let mut state = self.state.lock().expect("lock poisoned");
        if self.signal_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "navigation state from superseded signal discarded");
            return state.clone();
        }

        let changed = *state != next;
        *state = next.clone();
        drop(state);

        if changed {
            debug!(state = ?next, "navigation state changed");
            self.notify_state_change(&next);
        }
        next
    }

    /// Notify the callback of a state change.
    fn notify_state_change(&self, state: &NavigationState) {
        let cb = self.state_callback.lock().expect("lock poisoned");
        if let Some(callback) = cb.as_ref() {
            callback(state.clone());
        }
    }

    /// Hand a resolution failure to the error callback, or log it.
    fn report_error(&self, err: AuthResolutionError) {
        let cb = self.error_callback.lock().expect("lock poisoned");
        match cb.as_ref() {
            Some(callback) => callback(err),
            None => warn!(error = %err, "auth signal resolution failed"),
        }
    }
}

impl std::fmt::Debug for SessionNavResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionNavResolver").finish_non_exhaustive()
    }
}
