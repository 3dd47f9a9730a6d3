//! The progress sync engine.
//!
//! One engine instance exists per signed-in session. It owns the session's
//! [`ProgressState`], applies optimistic local mutations synchronously, and
//! reconciles with the remote store via joined initialization fetches,
//! completion confirmations, and replace-not-merge point refreshes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use proact_core::{MissionId, ProgressState, UserId};
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::{ProgressResult, ProgressSyncError};
use crate::hub::{ProgressHub, ProgressSubscription};
use crate::reconcile::{ReconcileEvent, ReconcileSink};
use crate::store::MissionStore;

/// Configuration for fetch depth and remote call bounds.
///
/// # Fields
///
/// - `mission_depth`: how many layers of mission-linked sub-entities the
///   active-mission fetch resolves (default: 2)
/// - `request_timeout`: upper bound on every remote call (default: 10s)
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Relationship-traversal depth for the active-mission fetch.
    pub mission_depth: u32,
    /// Upper bound on remote calls; exceeding it surfaces
    /// [`ProgressSyncError::Timeout`].
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mission_depth: 2,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Lifecycle of an engine instance within its session.
///
/// `Ready` self-loops on every reward, completion, and refresh. There is no
/// terminal variant; teardown is externally triggered at session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLifecycle {
    /// Created, initial fetch not started.
    Uninitialized,
    /// Initial fetch in flight.
    Initializing,
    /// Serving reads and writes.
    Ready,
}

impl EngineLifecycle {
    /// Returns true once the engine serves reads and writes.
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineLifecycle::Ready)
    }

    /// Returns true while the initial fetch is in flight.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineLifecycle::Initializing)
    }
}

/// Mutable engine state, guarded by one mutex.
struct EngineState {
    lifecycle: EngineLifecycle,
    /// Bound at initialize; refreshes re-fetch for this user.
    user: Option<UserId>,
    progress: ProgressState,
    /// Set at teardown; in-flight results observing it are discarded.
    torn_down: bool,
}

/// The per-session mission progress engine.
///
/// # Thread Safety
///
/// The engine is shared behind an `Arc`. All state lives behind a single
/// mutex that is never held across an await, so the synchronous
/// [`apply_local_reward`] can never be delayed by network I/O.
///
/// [`apply_local_reward`]: ProgressSyncEngine::apply_local_reward
pub struct ProgressSyncEngine {
    /// Remote gateway for missions and weekly points.
    store: Arc<dyn MissionStore>,
    /// Observer for settled mutations and reconciliation failures.
    sink: Arc<dyn ReconcileSink>,
    config: SyncConfig,
    state: Mutex<EngineState>,
    /// Live snapshot broadcast.
    hub: ProgressHub,
}

impl ProgressSyncEngine {
    /// Creates an engine with the default configuration.
    pub fn new(store: Arc<dyn MissionStore>, sink: Arc<dyn ReconcileSink>) -> Self {
        Self::with_config(store, sink, SyncConfig::default())
    }

    /// Creates an engine with explicit configuration.
    pub fn with_config(
        store: Arc<dyn MissionStore>,
        sink: Arc<dyn ReconcileSink>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            sink,
            config,
            state: Mutex::new(EngineState {
                lifecycle: EngineLifecycle::Uninitialized,
                user: None,
                progress: ProgressState::empty(),
                torn_down: false,
            }),
            hub: ProgressHub::new(),
        }
    }

    /// Returns the current lifecycle.
    pub fn lifecycle(&self) -> EngineLifecycle {
        self.state.lock().expect("lock poisoned").lifecycle
    }

    /// Returns a snapshot of the current progress, once initialized.
    ///
    /// Returns None before initialization and after teardown; the state is
    /// discarded with the session.
    pub fn snapshot(&self) -> Option<ProgressState> {
        let state = self.state.lock().expect("lock poisoned");
        (state.lifecycle.is_ready() && !state.torn_down).then(|| state.progress.clone())
    }

    /// Subscribes to snapshot broadcasts.
    pub fn subscribe(&self) -> ProgressSubscription {
        self.hub.subscribe()
    }

    /// Fetches missions and weekly points concurrently and becomes ready.
    ///
    /// The two fetches are joined: both must complete, and either failing
    /// fails initialization as a whole, returning the engine to
    /// `Uninitialized` so the call can be retried. An empty mission list is
    /// a valid result, not an error.
    pub async fn initialize(&self, user: &UserId) -> ProgressResult<ProgressState> {
        {
            let mut state = self.state.lock().expect("lock poisoned");
            if state.torn_down {
                return Err(ProgressSyncError::SessionEnded);
            }
            match state.lifecycle {
                EngineLifecycle::Uninitialized => {
                    state.lifecycle = EngineLifecycle::Initializing;
                    state.user = Some(user.clone());
                }
                EngineLifecycle::Initializing | EngineLifecycle::Ready => {
                    return Err(ProgressSyncError::AlreadyInitialized);
                }
            }
        }
        debug!(user = %user, depth = self.config.mission_depth, "initial progress fetch started");

        let (missions, eco_points) = match self.fetch_initial(user).await {
            Ok(fetched) => fetched,
            Err(err) => {
                let mut state = self.state.lock().expect("lock poisoned");
                if !state.torn_down {
                    state.lifecycle = EngineLifecycle::Uninitialized;
                    state.user = None;
                }
                return Err(err);
            }
        };

        let progress = {
            let mut state = self.state.lock().expect("lock poisoned");
            if state.torn_down {
                debug!("initial fetch result discarded after session end");
                return Err(ProgressSyncError::SessionEnded);
            }
            state.progress = ProgressState::from_fetched(missions, eco_points);
            state.lifecycle = EngineLifecycle::Ready;
            state.progress.clone()
        };

        info!(
            eco_points = progress.eco_points,
            level = progress.level,
            missions = progress.active_missions.len(),
            "progress engine ready"
        );
        self.hub.notify(progress.clone());
        self.sink.emit(ReconcileEvent::Initialized {
            eco_points: progress.eco_points,
            missions: progress.active_missions.len(),
        });
        Ok(progress)
    }

    /// Runs the two initialization fetches concurrently and joins them.
    async fn fetch_initial(
        &self,
        user: &UserId,
    ) -> ProgressResult<(Vec<proact_core::MissionEntity>, i64)> {
        let timeout = self.config.request_timeout;
        let (missions, points) = tokio::join!(
            time::timeout(
                timeout,
                self.store.get_active_missions(user, self.config.mission_depth)
            ),
            time::timeout(timeout, self.store.get_weekly_points(user)),
        );

        let missions = missions
            .map_err(|_| ProgressSyncError::Timeout(timeout))?
            .map_err(ProgressSyncError::Init)?;
        let points = points
            .map_err(|_| ProgressSyncError::Timeout(timeout))?
            .map_err(ProgressSyncError::Init)?;
        Ok((missions, points))
    }

    /// Applies a local reward optimistically.
    ///
    /// Synchronous and non-suspending: the returned snapshot (and the hub
    /// broadcast) settle before any remote call can, independent of network
    /// latency. `points` may be negative; the total clamps at zero and the
    /// level is recomputed.
    pub fn apply_local_reward(&self, points: i64) -> ProgressResult<ProgressState> {
        let snapshot = {
            let mut state = self.state.lock().expect("lock poisoned");
            if state.torn_down {
                return Err(ProgressSyncError::SessionEnded);
            }
            if !state.lifecycle.is_ready() {
                return Err(ProgressSyncError::NotReady);
            }
            state.progress.apply_reward(points);
            state.progress.clone()
        };

        debug!(
            points,
            eco_points = snapshot.eco_points,
            level = snapshot.level,
            "local reward applied"
        );
        self.hub.notify(snapshot.clone());
        self.sink.emit(ReconcileEvent::RewardApplied {
            points,
            eco_points: snapshot.eco_points,
        });
        Ok(snapshot)
    }

    /// Marks a mission complete: optimistically locally, then remotely.
    ///
    /// The mission leaves the local active list (and subscribers are
    /// notified) before the remote call is made. A failed or timed-out
    /// confirmation surfaces as [`ProgressSyncError::Reconciliation`] /
    /// [`ProgressSyncError::Timeout`] and emits
    /// [`ReconcileEvent::CompletionRejected`]; the optimistic local state,
    /// including any reward already applied via [`apply_local_reward`], is
    /// not rolled back.
    ///
    /// [`apply_local_reward`]: ProgressSyncEngine::apply_local_reward
    pub async fn complete_mission(&self, id: &MissionId) -> ProgressResult<()> {
        let snapshot = {
            let mut state = self.state.lock().expect("lock poisoned");
            if state.torn_down {
                return Err(ProgressSyncError::SessionEnded);
            }
            if !state.lifecycle.is_ready() {
                return Err(ProgressSyncError::NotReady);
            }
            state
                .progress
                .remove_active_mission(id)
                .then(|| state.progress.clone())
        };
        if let Some(snapshot) = snapshot {
            self.hub.notify(snapshot);
        }

        let timeout = self.config.request_timeout;
        let outcome = match time::timeout(timeout, self.store.complete_mission(id)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(ProgressSyncError::Reconciliation {
                mission: id.clone(),
                source,
            }),
            Err(_) => Err(ProgressSyncError::Timeout(timeout)),
        };

        match &outcome {
            Ok(()) => {
                debug!(mission = %id, "mission completion confirmed");
            }
            Err(err) if self.is_torn_down() => {
                debug!(mission = %id, error = %err, "completion failure discarded after session end");
            }
            Err(err) => {
                warn!(
                    mission = %id,
                    error = %err,
                    "mission completion not confirmed; optimistic state kept"
                );
                self.sink.emit(ReconcileEvent::CompletionRejected {
                    mission: id.clone(),
                });
            }
        }
        outcome
    }

    /// Re-fetches the authoritative weekly total and replaces local points.
    ///
    /// Replacement, not a merge: drift from optimistic updates is discarded.
    /// Concurrent refreshes and completions are allowed to race; the
    /// last-completing fetch wins. A result arriving after teardown is
    /// discarded without mutating state.
    pub async fn refresh_weekly_points(&self) -> ProgressResult<()> {
        let user = {
            let state = self.state.lock().expect("lock poisoned");
            if state.torn_down {
                return Err(ProgressSyncError::SessionEnded);
            }
            if !state.lifecycle.is_ready() {
                return Err(ProgressSyncError::NotReady);
            }
            let Some(user) = state.user.clone() else {
                return Err(ProgressSyncError::NotReady);
            };
            user
        };

        let timeout = self.config.request_timeout;
        let eco_points = time::timeout(timeout, self.store.get_weekly_points(&user))
            .await
            .map_err(|_| ProgressSyncError::Timeout(timeout))?
            .map_err(ProgressSyncError::Refresh)?;

        let snapshot = {
            let mut state = self.state.lock().expect("lock poisoned");
            if state.torn_down {
                debug!("weekly points refresh discarded after session end");
                return Err(ProgressSyncError::SessionEnded);
            }
            state.progress.replace_points(eco_points);
            state.progress.clone()
        };

        debug!(
            eco_points = snapshot.eco_points,
            level = snapshot.level,
            "weekly points replaced with authoritative total"
        );
        self.hub.notify(snapshot.clone());
        self.sink.emit(ReconcileEvent::PointsRefreshed {
            eco_points: snapshot.eco_points,
        });
        Ok(())
    }

    /// Marks the session ended and closes all subscriptions.
    ///
    /// Any in-flight async result observes the flag and is discarded; no
    /// state mutates after this call.
    pub fn teardown(&self) {
        {
            let mut state = self.state.lock().expect("lock poisoned");
            state.torn_down = true;
        }
        self.hub.close();
        debug!("progress engine torn down");
    }

    fn is_torn_down(&self) -> bool {
        self.state.lock().expect("lock poisoned").torn_down
    }
}

impl std::fmt::Debug for ProgressSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSyncEngine")
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}
