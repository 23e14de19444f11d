//! Scripted in-memory backend for exercising the orchestration core.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use dashborg::api::types::{
    BackupRequest, BackupStarted, CheckRequest, DashboardStats, ExtractRequest, ExtractStarted,
    MountRequest, Mounted, PruneRequest, RepoCreateRequest, RepoCreated, Validation,
};
use dashborg::api::{ApiError, BackendApi};
use dashborg::core::models::{Archive, Job, Repository};

/// Backend whose `list_jobs` answers come from a script and whose other
/// calls are counted. Unscripted job calls fall back to an empty list.
#[derive(Default)]
pub struct ScriptedBackend {
    jobs_script: Mutex<VecDeque<Result<Vec<Job>, ApiError>>>,
    pub list_jobs_calls: AtomicUsize,
    pub sync_repositories_calls: AtomicUsize,
    pub sync_archives_calls: AtomicUsize,
    pub dashboard_stats_calls: AtomicUsize,
    /// When set, dispatch and sync calls fail with this engine message.
    pub engine_failure: Mutex<Option<String>>,
    /// When true, dispatch and sync calls fail at the transport level.
    pub transport_down: Mutex<bool>,
    /// When set, the repository sync phase alone fails.
    pub repo_sync_failure: Mutex<Option<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_jobs(&self, response: Result<Vec<Job>, ApiError>) {
        self.jobs_script.lock().unwrap().push_back(response);
    }

    pub fn fail_with_engine_error(&self, message: &str) {
        *self.engine_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn take_transport_down(&self) {
        *self.transport_down.lock().unwrap() = true;
    }

    pub fn fail_repo_sync(&self, message: &str) {
        *self.repo_sync_failure.lock().unwrap() = Some(message.to_string());
    }

    fn dispatch_gate(&self) -> Result<(), ApiError> {
        if *self.transport_down.lock().unwrap() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        if let Some(message) = self.engine_failure.lock().unwrap().clone() {
            return Err(ApiError::Engine(message));
        }
        Ok(())
    }
}

/// A minimal job record for scripting poll responses.
pub fn job(id: &str, status: &str) -> Job {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "type": "backup",
        "config": "config.yaml",
        "status": status,
        "created_at": "2026-01-05T10:00:00Z",
    }))
    .unwrap()
}

#[async_trait]
impl BackendApi for ScriptedBackend {
    async fn list_configs(&self) -> Result<Vec<String>, ApiError> {
        Ok(vec!["config.yaml".to_string()])
    }

    async fn get_config(&self, name: &str) -> Result<String, ApiError> {
        if name == "config.yaml" {
            Ok("repositories:\n  - path: /repo\n".to_string())
        } else {
            Err(ApiError::NotFound(name.to_string()))
        }
    }

    async fn put_config(&self, _name: &str, _text: &str) -> Result<(), ApiError> {
        self.dispatch_gate()
    }

    async fn validate_config(&self, text: &str) -> Result<Validation, ApiError> {
        // Malformed documents still answer successfully; invalidity lives
        // in the verdict, never in the transport result.
        let valid = !text.contains("invalid") && !text.contains('[');
        Ok(Validation {
            valid,
            error: (!valid).then(|| "mapping values are not allowed here".to_string()),
            output: None,
        })
    }

    async fn dispatch_backup(&self, req: &BackupRequest) -> Result<BackupStarted, ApiError> {
        self.dispatch_gate()?;
        assert!(req.progress && req.stats);
        Ok(BackupStarted {
            job_id: "job-backup-1".to_string(),
            message: None,
        })
    }

    async fn dispatch_prune(&self, _req: &PruneRequest) -> Result<(), ApiError> {
        self.dispatch_gate()
    }

    async fn dispatch_check(&self, _req: &CheckRequest) -> Result<(), ApiError> {
        self.dispatch_gate()
    }

    async fn dispatch_repo_create(
        &self,
        _req: &RepoCreateRequest,
    ) -> Result<RepoCreated, ApiError> {
        self.dispatch_gate()?;
        Ok(RepoCreated {
            output: "Repository created at /repo".to_string(),
        })
    }

    async fn dispatch_extract(&self, _req: &ExtractRequest) -> Result<ExtractStarted, ApiError> {
        self.dispatch_gate()?;
        Ok(ExtractStarted {
            job_id: "job-extract-1".to_string(),
            destination: Some("/tmp/extract".to_string()),
        })
    }

    async fn dispatch_mount(&self, _req: &MountRequest) -> Result<Mounted, ApiError> {
        self.dispatch_gate()?;
        Ok(Mounted {
            mount_point: "/mnt/archive".to_string(),
        })
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.list_jobs_calls.fetch_add(1, Ordering::SeqCst);
        match self.jobs_script.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(Vec::new()),
        }
    }

    async fn sync_repositories(&self, _config: Option<&str>) -> Result<(), ApiError> {
        if let Some(message) = self.repo_sync_failure.lock().unwrap().clone() {
            return Err(ApiError::Engine(message));
        }
        self.dispatch_gate()?;
        self.sync_repositories_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sync_archives(&self, _config: Option<&str>) -> Result<(), ApiError> {
        self.dispatch_gate()?;
        self.sync_archives_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.dashboard_stats_calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(serde_json::json!({
            "summary": {
                "total_archives": 2,
                "total_repositories": 1,
                "total_unique_size": 250u64,
                "total_original_size": 1000u64,
                "deduplication_percentage": 75.0
            },
            "recent_archives": []
        }))
        .unwrap())
    }

    async fn list_archives(&self, _limit: u32) -> Result<Vec<Archive>, ApiError> {
        Ok(Vec::new())
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>, ApiError> {
        Ok(Vec::new())
    }
}
