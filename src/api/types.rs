//! Wire types for the backend HTTP API.
//!
//! Request options left unset serialize as absent so the engine inherits
//! them from the named configuration document; nothing is defaulted
//! client-side.

use serde::{Deserialize, Serialize};

use crate::core::models::{Archive, DashboardSummary};

/// Consistency check depth, fastest to slowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    Repository,
    Archives,
    Extract,
    Data,
}

impl CheckType {
    pub fn label(&self) -> &'static str {
        match self {
            CheckType::Repository => "repository",
            CheckType::Archives => "archives",
            CheckType::Extract => "extract",
            CheckType::Data => "data",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupRequest {
    pub config: String,
    pub progress: bool,
    pub stats: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PruneRequest {
    pub config: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRequest {
    pub config: String,
    pub check_type: CheckType,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepoCreateRequest {
    pub config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_mode: Option<String>,
    pub append_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_quota: Option<String>,
    pub make_parent_dirs: bool,
}

impl RepoCreateRequest {
    /// Everything unset: the engine takes all options from the config document.
    pub fn inherit_all(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            encryption_mode: None,
            append_only: false,
            storage_quota: None,
            make_parent_dirs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest {
    pub config: String,
    pub archive: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MountRequest {
    pub config: String,
    pub archive: String,
}

/// Response to a background backup dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupStarted {
    pub job_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to an inline repo-create dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoCreated {
    #[serde(default)]
    pub output: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractStarted {
    pub job_id: String,
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mounted {
    pub mount_point: String,
}

/// Verdict of a configuration validation run.
///
/// The `valid` field is the only evidence of validity; the endpoint returns
/// a well-formed error response on HTTP success.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Validation {
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub summary: DashboardSummary,
    /// Newest first, as reported by the engine.
    #[serde(default)]
    pub recent_archives: Vec<Archive>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArchivesEnvelope {
    #[serde(default)]
    pub archives: Vec<Archive>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RepositoriesEnvelope {
    #[serde(default)]
    pub repositories: Vec<crate::core::models::Repository>,
}

/// Error payload shape shared by all endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}
