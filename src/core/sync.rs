//! Stats synchronization: pull engine truth into the dashboard store.
//!
//! Strictly two-phase: repositories first, then archives, because archives
//! reference repositories by label and a stale repository set would orphan
//! newly pulled archives. If the repository phase fails the archive phase is
//! not attempted. Repeated invocation with no underlying change is a no-op
//! server-side, so the operation is idempotent.

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiError, BackendApi};
use crate::core::dashboard::{self, DashboardData};

/// Run both sync phases in order, then reload all dashboard aggregates.
pub async fn sync_and_reload(
    api: &Arc<dyn BackendApi>,
    config: Option<&str>,
) -> Result<DashboardData, ApiError> {
    api.sync_repositories(config).await?;
    api.sync_archives(config).await?;
    info!(config = config.unwrap_or("(all)"), "stats sync complete");

    // Aggregates are recomputed from the full data set; always a full reload.
    dashboard::load(api).await
}
