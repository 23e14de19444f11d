mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use dashborg::api::BackendApi;
use dashborg::core::sync::sync_and_reload;

use common::ScriptedBackend;

#[tokio::test]
async fn sync_runs_both_phases_then_reloads_aggregates() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();

    let data = sync_and_reload(&api, Some("config.yaml")).await.unwrap();

    assert_eq!(backend.sync_repositories_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.sync_archives_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.dashboard_stats_calls.load(Ordering::SeqCst), 1);

    assert_eq!(data.summary.total_repositories, 1);
    assert_eq!(data.summary.total_archives, 2);
    assert!((data.deduplication_percentage() - 75.0).abs() < 1e-9);
}

#[tokio::test]
async fn repository_phase_failure_skips_the_archive_phase() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.fail_repo_sync("repository unreachable");
    let api: Arc<dyn BackendApi> = backend.clone();

    let err = sync_and_reload(&api, None).await.unwrap_err();
    assert_eq!(err.to_string(), "repository unreachable");

    // Archives referencing repositories must never sync against a stale
    // repository set, so the second phase is not attempted.
    assert_eq!(backend.sync_archives_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.dashboard_stats_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sync_is_repeatable() {
    let backend = Arc::new(ScriptedBackend::new());
    let api: Arc<dyn BackendApi> = backend.clone();

    sync_and_reload(&api, None).await.unwrap();
    sync_and_reload(&api, None).await.unwrap();

    assert_eq!(backend.sync_repositories_calls.load(Ordering::SeqCst), 2);
    assert_eq!(backend.sync_archives_calls.load(Ordering::SeqCst), 2);
}
