//! Boundary to the backup engine's HTTP API.
//!
//! `BackendApi` describes the request/response contract only; transport
//! framing belongs to `HttpApi`. The trait seam exists so the orchestration
//! core can be exercised against a scripted in-memory backend in tests.
//!
//! Error taxonomy: a `Transport` error means the request never completed and
//! is reported as a local failure; an `Engine` error is a well-formed
//! response carrying an `error` field, surfaced verbatim. A validation
//! verdict is data (`Validation`), never an error.

mod http;
pub mod types;

pub use http::HttpApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::models::{Archive, Job, Repository};
use types::{
    BackupRequest, BackupStarted, CheckRequest, DashboardStats, ExtractRequest, ExtractStarted,
    MountRequest, Mounted, PruneRequest, RepoCreateRequest, RepoCreated, Validation,
};

/// Error returned by boundary calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never reached or returned from the backend.
    #[error("backend unreachable: {0}")]
    Transport(String),
    /// The backup engine reported a failure; the message is verbatim.
    #[error("{0}")]
    Engine(String),
    /// The named resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The response body did not match the documented contract.
    #[error("unexpected response from backend: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// The backup engine's client-observable contract.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // Config store
    async fn list_configs(&self) -> Result<Vec<String>, ApiError>;
    async fn get_config(&self, name: &str) -> Result<String, ApiError>;
    async fn put_config(&self, name: &str, text: &str) -> Result<(), ApiError>;
    async fn validate_config(&self, text: &str) -> Result<Validation, ApiError>;

    // Operation dispatch
    async fn dispatch_backup(&self, req: &BackupRequest) -> Result<BackupStarted, ApiError>;
    async fn dispatch_prune(&self, req: &PruneRequest) -> Result<(), ApiError>;
    async fn dispatch_check(&self, req: &CheckRequest) -> Result<(), ApiError>;
    async fn dispatch_repo_create(&self, req: &RepoCreateRequest)
    -> Result<RepoCreated, ApiError>;
    async fn dispatch_extract(&self, req: &ExtractRequest) -> Result<ExtractStarted, ApiError>;
    async fn dispatch_mount(&self, req: &MountRequest) -> Result<Mounted, ApiError>;

    // Job monitoring
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;

    // Stats sync and aggregates
    async fn sync_repositories(&self, config: Option<&str>) -> Result<(), ApiError>;
    async fn sync_archives(&self, config: Option<&str>) -> Result<(), ApiError>;
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;
    async fn list_archives(&self, limit: u32) -> Result<Vec<Archive>, ApiError>;
    async fn list_repositories(&self) -> Result<Vec<Repository>, ApiError>;
}
