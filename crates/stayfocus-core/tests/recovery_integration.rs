//! Session recovery across process restarts, against an on-disk database.

use chrono::{Duration, Utc};
use stayfocus_core::{
    Database, Phase, PomodoroConfig, PomodoroTimer, ResumePolicy, ServiceOptions, SessionStore,
    TimerService, TimerState,
};

fn options() -> ServiceOptions {
    ServiceOptions {
        user_id: "alice".into(),
        config: PomodoroConfig::new(25, 5, 15, 4).unwrap(),
        resume_policy: ResumePolicy::AlwaysFocus,
    }
}

#[tokio::test]
async fn paused_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stayfocus.db");

    let mut service = TimerService::new(Database::open_at(&path).unwrap(), options());
    service.start();
    service.pause();
    let before = service.view();
    service.shutdown().await.unwrap();

    let service = TimerService::new(Database::open_at(&path).unwrap(), options());
    let after = service.view();
    assert_eq!(after.session_id, before.session_id);
    assert_eq!(after.state, TimerState::Paused(Phase::Focus));
    assert!(after.time_left.abs_diff(before.time_left) <= 1);
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn running_session_resumes_with_elapsed_time_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stayfocus.db");

    // A focus phase that began 10 minutes ago in a previous process.
    let mut timer = PomodoroTimer::new(PomodoroConfig::default());
    let began = Utc::now() - Duration::minutes(10);
    timer.start_at(began);
    let record = timer.to_record("alice", began).unwrap();
    Database::open_at(&path).unwrap().upsert(&record).unwrap();

    let service = TimerService::new(Database::open_at(&path).unwrap(), options());
    let view = service.view();
    assert_eq!(view.state, TimerState::Focus);
    assert!(view.time_left.abs_diff(900) <= 1);
    assert!(service.is_ticking());
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn expired_phase_completes_on_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stayfocus.db");

    let mut timer = PomodoroTimer::new(PomodoroConfig::default());
    let began = Utc::now() - Duration::hours(2);
    timer.start_at(began);
    let record = timer.to_record("alice", began).unwrap();
    Database::open_at(&path).unwrap().upsert(&record).unwrap();

    let service = TimerService::new(Database::open_at(&path).unwrap(), options());
    let view = service.view();
    assert_eq!(view.state, TimerState::Break);
    assert_eq!(view.cycles_completed, 1);
    assert_eq!(view.time_left, 300);
    let db = service.shutdown().await.unwrap();

    let stored = db.fetch_active("alice").unwrap().unwrap();
    assert_eq!(stored.state, TimerState::Break);
    assert_eq!(stored.cycles_completed, 1);
}

#[tokio::test]
async fn reset_closes_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stayfocus.db");

    let mut service = TimerService::new(Database::open_at(&path).unwrap(), options());
    service.start();
    service.reset();
    let db = service.shutdown().await.unwrap();

    assert!(db.fetch_active("alice").unwrap().is_none());
    let history = db.list_sessions("alice", 10).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].completed_at.is_some());
    assert!(!history[0].is_active);
}

#[tokio::test]
async fn other_users_sessions_are_not_recovered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stayfocus.db");

    let mut service = TimerService::new(Database::open_at(&path).unwrap(), options());
    service.start();
    service.shutdown().await.unwrap();

    let bob = ServiceOptions {
        user_id: "bob".into(),
        ..options()
    };
    let service = TimerService::new(Database::open_at(&path).unwrap(), bob);
    assert_eq!(service.view().state, TimerState::Idle);
    service.shutdown().await.unwrap();
}
