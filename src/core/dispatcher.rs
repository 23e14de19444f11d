//! Operation dispatcher: one-shot requests that start maintenance
//! operations against a named configuration document.
//!
//! Each operation issues exactly one dispatch call. The dispatcher does not
//! assume which mode an operation kind uses; it reports whatever handle the
//! engine returned, and a `job_id` in the outcome is the caller's signal to
//! switch into monitoring mode. Dispatches are independent: nothing here
//! serializes or queues them.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::api::types::{
    BackupRequest, CheckRequest, CheckType, ExtractRequest, MountRequest, PruneRequest,
    RepoCreateRequest,
};
use crate::api::{ApiError, BackendApi};

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Background operation; the engine assigned a job identifier.
    Dispatched {
        job_id: String,
        destination: Option<String>,
    },
    /// The engine accepted the operation without handing back a job id.
    /// The job list may still grow a record for it.
    Accepted,
    /// Inline operation that completed synchronously.
    Completed { output: String },
    /// Archive mounted as a filesystem.
    Mounted { mount_point: String },
}

impl DispatchOutcome {
    /// The asynchronous handle, when the operation runs in the background.
    /// Its presence is the signal to enter the job monitor view.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Dispatched { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Live prune is destructive and needs an explicit confirmation from the
    /// calling surface. Client-side policy, not a server rule.
    #[error("live prune requires explicit confirmation")]
    Unconfirmed,
    /// The dispatch never reached the engine; not attributable to it.
    #[error("dispatch failed locally: {0}")]
    Local(ApiError),
    /// The engine rejected the operation; message is verbatim.
    #[error("{0}")]
    Engine(String),
}

impl From<ApiError> for DispatchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Engine(message) => DispatchError::Engine(message),
            other => DispatchError::Local(other),
        }
    }
}

/// Issues dispatch calls against the backend. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn BackendApi>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    /// Start a backup run. Always requests progress and stats reporting.
    pub async fn backup(&self, config: &str) -> Result<DispatchOutcome, DispatchError> {
        let request = BackupRequest {
            config: config.to_string(),
            progress: true,
            stats: true,
        };
        let started = self.api.dispatch_backup(&request).await?;
        info!(job_id = %started.job_id, config, "backup dispatched");
        Ok(DispatchOutcome::Dispatched {
            job_id: started.job_id,
            destination: None,
        })
    }

    /// Prune archives per the retention policy of the named config.
    /// A live (non-dry-run) prune must arrive pre-confirmed.
    pub async fn prune(
        &self,
        config: &str,
        dry_run: bool,
        confirmed: bool,
    ) -> Result<DispatchOutcome, DispatchError> {
        if !dry_run && !confirmed {
            return Err(DispatchError::Unconfirmed);
        }
        let request = PruneRequest {
            config: config.to_string(),
            dry_run,
        };
        self.api.dispatch_prune(&request).await?;
        info!(config, dry_run, "prune dispatched");
        Ok(DispatchOutcome::Accepted)
    }

    pub async fn check(
        &self,
        config: &str,
        check_type: CheckType,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = CheckRequest {
            config: config.to_string(),
            check_type,
        };
        self.api.dispatch_check(&request).await?;
        info!(config, check_type = check_type.label(), "check dispatched");
        Ok(DispatchOutcome::Accepted)
    }

    /// Initialize repositories. Completes inline; options left unset are
    /// inherited from the config document by the engine.
    pub async fn repo_create(
        &self,
        request: RepoCreateRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let created = self.api.dispatch_repo_create(&request).await?;
        info!(config = %request.config, "repository created");
        Ok(DispatchOutcome::Completed {
            output: created.output,
        })
    }

    pub async fn extract(
        &self,
        config: &str,
        archive: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = ExtractRequest {
            config: config.to_string(),
            archive: archive.to_string(),
        };
        let started = self.api.dispatch_extract(&request).await?;
        info!(job_id = %started.job_id, archive, "extract dispatched");
        Ok(DispatchOutcome::Dispatched {
            job_id: started.job_id,
            destination: started.destination,
        })
    }

    pub async fn mount(
        &self,
        config: &str,
        archive: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = MountRequest {
            config: config.to_string(),
            archive: archive.to_string(),
        };
        let mounted = self.api.dispatch_mount(&request).await?;
        info!(archive, mount_point = %mounted.mount_point, "archive mounted");
        Ok(DispatchOutcome::Mounted {
            mount_point: mounted.mount_point,
        })
    }
}
