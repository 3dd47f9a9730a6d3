//! Integration tests for the progress sync engine.
//!
//! Test organization:
//!
//! - `initialize.rs` - Joined initial fetch, lifecycle, retry
//! - `rewards.rs`    - Optimistic reward arithmetic and visibility
//! - `completion.rs` - Optimistic completion and remote confirmation
//! - `refresh.rs`    - Replace-not-merge reconciliation

mod rewards;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proact_core::{MissionEntity, MissionId, UserId};
use tokio::sync::Notify;

use crate::engine::{ProgressSyncEngine, SyncConfig};
use crate::reconcile::{ReconcileEvent, RecordingSink};
use crate::store::{MissionStore, MissionStoreError};

/// A configurable in-memory mission store.
///
/// Gates (taken by the first fetch that sees them) let tests hold a remote
/// call open while the engine observes newer events.
pub(crate) struct MockMissionStore {
    missions: Mutex<Vec<MissionEntity>>,
    weekly_points: Mutex<i64>,
    fail_missions: AtomicBool,
    fail_points: AtomicBool,
    fail_complete: AtomicBool,
    /// When set, the next completion call never returns.
    hang_complete: AtomicBool,
    points_gate: Mutex<Option<Arc<Notify>>>,
    complete_gate: Mutex<Option<Arc<Notify>>>,
    depth_calls: Mutex<Vec<u32>>,
    complete_calls: Mutex<Vec<MissionId>>,
}

impl MockMissionStore {
    pub(crate) fn new() -> Self {
        Self {
            missions: Mutex::new(Vec::new()),
            weekly_points: Mutex::new(0),
            fail_missions: AtomicBool::new(false),
            fail_points: AtomicBool::new(false),
            fail_complete: AtomicBool::new(false),
            hang_complete: AtomicBool::new(false),
            points_gate: Mutex::new(None),
            complete_gate: Mutex::new(None),
            depth_calls: Mutex::new(Vec::new()),
            complete_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_data(missions: Vec<MissionEntity>, weekly_points: i64) -> Self {
        let store = Self::new();
        *store.missions.lock().unwrap() = missions;
        *store.weekly_points.lock().unwrap() = weekly_points;
        store
    }

    pub(crate) fn set_weekly_points(&self, points: i64) {
        *self.weekly_points.lock().unwrap() = points;
    }

    pub(crate) fn fail_missions(&self, fail: bool) {
        self.fail_missions.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_points(&self, fail: bool) {
        self.fail_points.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_complete(&self, fail: bool) {
        self.fail_complete.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn hang_complete(&self, hang: bool) {
        self.hang_complete.store(hang, Ordering::SeqCst);
    }

    /// Makes the next weekly-points fetch wait on the returned gate.
    pub(crate) fn gate_points(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.points_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes the next completion call wait on the returned gate.
    pub(crate) fn gate_complete(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.complete_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn depth_calls(&self) -> Vec<u32> {
        self.depth_calls.lock().unwrap().clone()
    }

    pub(crate) fn complete_calls(&self) -> Vec<MissionId> {
        self.complete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MissionStore for MockMissionStore {
    async fn get_active_missions(
        &self,
        _user: &UserId,
        depth: u32,
    ) -> Result<Vec<MissionEntity>, MissionStoreError> {
        self.depth_calls.lock().unwrap().push(depth);
        if self.fail_missions.load(Ordering::SeqCst) {
            return Err(MissionStoreError::Transport(
                "missions unavailable".to_string(),
            ));
        }
        Ok(self.missions.lock().unwrap().clone())
    }

    async fn complete_mission(&self, id: &MissionId) -> Result<(), MissionStoreError> {
        self.complete_calls.lock().unwrap().push(id.clone());
        if self.hang_complete.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let gate = self.complete_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_complete.load(Ordering::SeqCst) {
            return Err(MissionStoreError::Backend {
                status: 500,
                message: "completion rejected".to_string(),
            });
        }
        Ok(())
    }

    async fn get_weekly_points(&self, _user: &UserId) -> Result<i64, MissionStoreError> {
        // The value is captured before waiting so a gated fetch delivers
        // what the server held when the call was issued.
        let points = *self.weekly_points.lock().unwrap();
        let gate = self.points_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_points.load(Ordering::SeqCst) {
            return Err(MissionStoreError::Transport("points unavailable".to_string()));
        }
        Ok(points)
    }
}

pub(crate) fn mission(id: &str, title: &str, reward_points: i64) -> MissionEntity {
    MissionEntity::new(MissionId::from_string(id), title, reward_points)
}

pub(crate) fn user() -> UserId {
    UserId::from_string("user-1")
}

/// An engine initialized over the given store data.
pub(crate) async fn ready_engine(
    missions: Vec<MissionEntity>,
    weekly_points: i64,
) -> (Arc<MockMissionStore>, Arc<RecordingSink>, Arc<ProgressSyncEngine>) {
    let store = Arc::new(MockMissionStore::with_data(missions, weekly_points));
    let sink = Arc::new(RecordingSink::new());
    let engine = Arc::new(ProgressSyncEngine::new(store.clone(), sink.clone()));
    engine.initialize(&user()).await.unwrap();
    (store, sink, engine)
}

/// Collapses events to their kind for order assertions.
pub(crate) fn event_kinds(events: &[ReconcileEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            ReconcileEvent::Initialized { .. } => "initialized",
            ReconcileEvent::RewardApplied { .. } => "reward",
            ReconcileEvent::CompletionRejected { .. } => "rejected",
            ReconcileEvent::PointsRefreshed { .. } => "refreshed",
        })
        .collect()
}

/// Basic workflow test demonstrating core functionality.
#[tokio::test]
async fn basic_workflow() {
    let (store, sink, engine) = ready_engine(
        vec![mission("m-1", "Bike to work", 25), mission("m-2", "Meatless Monday", 15)],
        80,
    )
    .await;

    // Optimistic reward settles synchronously.
    let snapshot = engine.apply_local_reward(25).unwrap();
    assert_eq!(snapshot.eco_points, 105);
    assert_eq!(snapshot.level, 2);

    // Completion removes the mission locally and confirms remotely.
    engine
        .complete_mission(&MissionId::from_string("m-1"))
        .await
        .unwrap();
    assert_eq!(engine.snapshot().unwrap().active_missions.len(), 1);
    assert_eq!(store.complete_calls().len(), 1);

    // Authoritative refresh replaces the optimistic total.
    store.set_weekly_points(130);
    engine.refresh_weekly_points().await.unwrap();
    assert_eq!(engine.snapshot().unwrap().eco_points, 130);

    assert_eq!(
        event_kinds(&sink.events()),
        ["initialized", "reward", "refreshed"]
    );
}
