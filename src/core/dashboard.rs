//! Dashboard aggregation: combines synced repositories, archives and the
//! engine-computed summary into display-ready metrics.
//!
//! Every ratio guards its denominator; a chart is handed a defined zero,
//! never a NaN.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::{ApiError, BackendApi};
use crate::core::models::{Archive, DashboardSummary, Repository};

/// How many archives the dashboard pulls for tables and trends.
const ARCHIVE_FETCH_LIMIT: u32 = 100;

/// One point of the storage-over-time trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub start: Option<DateTime<Utc>>,
    pub original_size: u64,
    pub deduplicated_size: u64,
}

/// Read-only aggregate state behind the stats view.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub summary: DashboardSummary,
    /// Newest first, as delivered by the engine.
    pub recent_archives: Vec<Archive>,
    pub repositories: Vec<Repository>,
    pub archives: Vec<Archive>,
}

/// Full reload of all dashboard aggregates. Always a complete refetch: the
/// engine recomputes derived percentages from the whole data set, so
/// incremental patching would go stale.
pub async fn load(api: &Arc<dyn BackendApi>) -> Result<DashboardData, ApiError> {
    let stats = api.dashboard_stats().await?;
    let archives = api.list_archives(ARCHIVE_FETCH_LIMIT).await?;
    let repositories = api.list_repositories().await?;

    Ok(DashboardData {
        summary: stats.summary,
        recent_archives: stats.recent_archives,
        repositories,
        archives,
    })
}

impl DashboardData {
    pub fn deduplication_percentage(&self) -> f64 {
        self.summary.deduplication_percentage()
    }

    /// Chronological storage trend derived from the recent archives.
    /// Archives with no size data contribute zero-sized points.
    pub fn storage_trend(&self) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = self
            .recent_archives
            .iter()
            .rev()
            .map(|archive| TrendPoint {
                start: archive.start,
                original_size: archive.original_size.unwrap_or(0),
                deduplicated_size: archive.deduplicated_size.unwrap_or(0),
            })
            .collect();
        points.sort_by_key(|p| p.start);
        points
    }

    /// Archives filtered by name substring and repository label. An archive
    /// referencing a repository the client has never synced still renders;
    /// the soft reference is a relation, not ownership.
    pub fn filtered_archives(&self, search: &str, repository: Option<&str>) -> Vec<&Archive> {
        let needle = search.to_lowercase();
        self.archives
            .iter()
            .filter(|archive| needle.is_empty() || archive.name.to_lowercase().contains(&needle))
            .filter(|archive| match repository {
                Some(label) => archive.repository.as_deref() == Some(label),
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(id: i64, name: &str, repo: Option<&str>, day: u32, size: u64) -> Archive {
        Archive {
            id,
            name: name.to_string(),
            repository: repo.map(str::to_string),
            start: Some(
                format!("2026-01-{day:02}T00:00:00Z")
                    .parse::<DateTime<Utc>>()
                    .unwrap(),
            ),
            original_size: Some(size),
            deduplicated_size: Some(size / 4),
            nfiles: Some(10),
        }
    }

    #[test]
    fn trend_is_chronological() {
        let data = DashboardData {
            // Engine delivers newest first
            recent_archives: vec![
                archive(3, "c", Some("main"), 12, 300),
                archive(2, "b", Some("main"), 11, 200),
                archive(1, "a", Some("main"), 10, 100),
            ],
            ..Default::default()
        };

        let trend = data.storage_trend();
        let sizes: Vec<u64> = trend.iter().map(|p| p.original_size).collect();
        assert_eq!(sizes, vec![100, 200, 300]);
    }

    #[test]
    fn filter_matches_name_and_repository() {
        let data = DashboardData {
            archives: vec![
                archive(1, "host-2026-01-10", Some("hetzner"), 10, 100),
                archive(2, "host-2026-01-11", Some("local"), 11, 100),
                archive(3, "laptop-2026-01-12", Some("hetzner"), 12, 100),
            ],
            ..Default::default()
        };

        assert_eq!(data.filtered_archives("", None).len(), 3);
        assert_eq!(data.filtered_archives("host", None).len(), 2);
        assert_eq!(data.filtered_archives("", Some("hetzner")).len(), 2);
        assert_eq!(data.filtered_archives("laptop", Some("hetzner")).len(), 1);
        assert_eq!(data.filtered_archives("laptop", Some("local")).len(), 0);
    }

    #[test]
    fn orphan_archives_render_without_a_known_repository() {
        // Archive synced before its repository: label resolves to nothing.
        let data = DashboardData {
            archives: vec![archive(1, "early", Some("not-yet-synced"), 10, 100)],
            repositories: vec![],
            ..Default::default()
        };

        let all = data.filtered_archives("", None);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].repository.as_deref(), Some("not-yet-synced"));
        // Filtering by a known repository simply excludes the orphan.
        assert!(data.filtered_archives("", Some("main")).is_empty());
    }

    #[test]
    fn percentage_falls_back_on_empty_data() {
        let data = DashboardData::default();
        assert_eq!(data.deduplication_percentage(), 0.0);
        assert!(data.storage_trend().is_empty());
    }
}
