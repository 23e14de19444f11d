mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dashborg::api::{ApiError, BackendApi};
use dashborg::core::models::JobStatus;
use dashborg::core::{JobBoard, JobMonitor};

use common::{ScriptedBackend, job};

#[tokio::test]
async fn failed_poll_keeps_previous_snapshot() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.script_jobs(Ok(vec![job("j1", "running")]));
    backend.script_jobs(Err(ApiError::Transport("connection refused".to_string())));
    backend.script_jobs(Ok(vec![job("j1", "completed")]));

    let api: Arc<dyn BackendApi> = backend.clone();
    let monitor = JobMonitor::new(api, Duration::from_millis(10));
    let board = monitor.board();

    assert!(monitor.poll_once().await);
    assert_eq!(board.jobs().await[0].status, JobStatus::Running);

    // Outage: the stale-but-valid snapshot stays up.
    assert!(!monitor.poll_once().await);
    assert_eq!(board.jobs().await.len(), 1);
    assert_eq!(board.jobs().await[0].status, JobStatus::Running);

    // Next cycle self-heals.
    assert!(monitor.poll_once().await);
    assert_eq!(board.jobs().await[0].status, JobStatus::Completed);
}

#[tokio::test]
async fn stale_poll_result_is_discarded() {
    let board = JobBoard::new();

    assert!(board.apply(2, vec![job("j1", "completed")]).await);
    // An older poll finishing late must not overwrite the newer snapshot.
    assert!(!board.apply(1, vec![job("j1", "running")]).await);

    assert_eq!(board.jobs().await[0].status, JobStatus::Completed);
    // Equal sequence is also stale.
    assert!(!board.apply(2, vec![]).await);
}

#[tokio::test]
async fn forward_transitions_flow_through_the_board() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.script_jobs(Ok(vec![job("j1", "queued")]));
    backend.script_jobs(Ok(vec![job("j1", "running")]));
    backend.script_jobs(Ok(vec![job("j1", "completed")]));

    let api: Arc<dyn BackendApi> = backend.clone();
    let monitor = JobMonitor::new(api, Duration::from_millis(10));
    let board = monitor.board();

    let mut seen = Vec::new();
    for _ in 0..3 {
        monitor.poll_once().await;
        seen.push(board.jobs().await[0].status);
    }
    assert_eq!(
        seen,
        vec![JobStatus::Queued, JobStatus::Running, JobStatus::Completed]
    );
    assert!(board.last_success().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn cancelled_monitor_stops_polling() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();
    let monitor = JobMonitor::new(api, Duration::from_millis(50));

    let handle = monitor.spawn();
    tokio::time::sleep(Duration::from_millis(220)).await;
    let polled = backend.list_jobs_calls.load(Ordering::SeqCst);
    assert!(polled >= 2, "expected several polls, saw {polled}");

    handle.shutdown().await;
    let frozen = backend.list_jobs_calls.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(backend.list_jobs_calls.load(Ordering::SeqCst), frozen);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_the_loop() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();
    let monitor = JobMonitor::new(api, Duration::from_millis(50));

    drop(monitor.spawn());
    // Give the cancelled task time to observe the token.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let frozen = backend.list_jobs_calls.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(backend.list_jobs_calls.load(Ordering::SeqCst), frozen);
}
