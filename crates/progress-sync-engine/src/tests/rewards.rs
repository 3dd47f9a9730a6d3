//! Optimistic local rewards: arithmetic, visibility, lifecycle guards.

use super::*;
use crate::error::ProgressSyncError;

#[tokio::test]
async fn reward_crossing_level_boundary() {
    let (_, _, engine) = ready_engine(Vec::new(), 80).await;

    let snapshot = engine.apply_local_reward(25).unwrap();

    assert_eq!(snapshot.eco_points, 105);
    assert_eq!(snapshot.level, 2);
}

#[tokio::test]
async fn negative_reward_clamps_at_zero() {
    let (_, _, engine) = ready_engine(Vec::new(), 30).await;

    let snapshot = engine.apply_local_reward(-50).unwrap();

    assert_eq!(snapshot.eco_points, 0);
    assert_eq!(snapshot.level, 1);
}

#[tokio::test]
async fn level_never_drops_below_one() {
    let (_, _, engine) = ready_engine(Vec::new(), 10).await;

    for reward in [-5, -100, -1, 0, -42] {
        let snapshot = engine.apply_local_reward(reward).unwrap();
        assert!(snapshot.level >= 1);
        assert!(snapshot.eco_points >= 0);
    }
}

#[tokio::test]
async fn reward_is_visible_to_subscribers_synchronously() {
    let (_, _, engine) = ready_engine(Vec::new(), 80).await;
    let sub = engine.subscribe();

    engine.apply_local_reward(25).unwrap();

    // No awaiting between the call and the observation: the snapshot
    // settles before any remote work could.
    let observed = sub.try_recv().unwrap();
    assert_eq!(observed.eco_points, 105);
    assert_eq!(observed.level, 2);
}

#[tokio::test]
async fn reward_emits_event() {
    let (_, sink, engine) = ready_engine(Vec::new(), 80).await;

    engine.apply_local_reward(25).unwrap();

    assert!(sink.events().contains(&ReconcileEvent::RewardApplied {
        points: 25,
        eco_points: 105
    }));
}

#[tokio::test]
async fn reward_before_initialize_is_rejected() {
    let engine = ProgressSyncEngine::new(
        Arc::new(MockMissionStore::new()),
        Arc::new(RecordingSink::new()),
    );

    let result = engine.apply_local_reward(25);

    assert!(matches!(result, Err(ProgressSyncError::NotReady)));
}

#[tokio::test]
async fn reward_after_teardown_is_rejected() {
    let (_, _, engine) = ready_engine(Vec::new(), 80).await;
    engine.teardown();

    let result = engine.apply_local_reward(25);

    assert!(matches!(result, Err(ProgressSyncError::SessionEnded)));
}

#[tokio::test]
async fn consecutive_rewards_accumulate() {
    let (_, _, engine) = ready_engine(Vec::new(), 0).await;

    engine.apply_local_reward(40).unwrap();
    engine.apply_local_reward(40).unwrap();
    let snapshot = engine.apply_local_reward(40).unwrap();

    assert_eq!(snapshot.eco_points, 120);
    assert_eq!(snapshot.level, 2);
}
