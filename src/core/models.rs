//! Domain records for jobs, repositories, archives and dashboard summaries.
//!
//! These are immutable value snapshots: the backup engine owns every record
//! and the client replaces them wholesale on each fetch, never mutating them
//! in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a dispatched long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    // Older engines report backup jobs as "backup-create".
    #[serde(alias = "backup-create")]
    Backup,
    Prune,
    Check,
    Extract,
    Mount,
    RepoCreate,
}

impl JobType {
    pub fn label(&self) -> &'static str {
        match self {
            JobType::Backup => "backup",
            JobType::Prune => "prune",
            JobType::Check => "check",
            JobType::Extract => "extract",
            JobType::Mount => "mount",
            JobType::RepoCreate => "repo-create",
        }
    }
}

/// Job lifecycle state. Transitions only move forward:
/// queued -> running -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    // Older engines report the initial state as "pending".
    #[serde(alias = "pending")]
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `next` is a legal successor state. Staying in place is legal;
    /// terminal states never advance.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Queued, Running | Completed | Failed) => true,
            (Running, Completed | Failed) => true,
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Live progress sample, present only while a job is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    #[serde(default)]
    pub files_processed: u64,
    #[serde(default)]
    pub current_file: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

/// Size metrics of a finished backup archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeStats {
    #[serde(default)]
    pub original_size: u64,
    #[serde(default)]
    pub compressed_size: u64,
    #[serde(default)]
    pub deduplicated_size: u64,
    #[serde(default)]
    pub nfiles: u64,
}

impl SizeStats {
    /// Percentage of original bytes not stored thanks to deduplication.
    /// Defined only for a non-empty original size; falls back to 0.0.
    pub fn space_saved_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.deduplicated_size as f64 / self.original_size as f64) * 100.0
    }
}

/// Repository identity as reported inside backup stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl RepositoryInfo {
    /// Human name for display: label if set, else the location.
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.location.as_deref())
            .unwrap_or("(unknown)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncryptionInfo {
    #[serde(default)]
    pub mode: Option<String>,
}

/// Archive section of the engine's `create --json` report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveReport {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub stats: Option<SizeStats>,
}

/// Structured statistics attached to a completed backup job, mirroring the
/// engine's JSON report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupStats {
    #[serde(default)]
    pub repository: Option<RepositoryInfo>,
    #[serde(default)]
    pub encryption: Option<EncryptionInfo>,
    #[serde(default)]
    pub archive: Option<ArchiveReport>,
}

impl BackupStats {
    pub fn size_stats(&self) -> Option<&SizeStats> {
        self.archive.as_ref()?.stats.as_ref()
    }
}

/// Client-visible record of one dispatched backup-engine operation.
///
/// Created and exclusively mutated by the engine; this client only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub config: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress_info: Option<ProgressInfo>,
    #[serde(default)]
    pub stats: Option<BackupStats>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Job {
    /// Raw transcript of the underlying operation: error on failure,
    /// output otherwise.
    pub fn transcript(&self) -> Option<&str> {
        if self.status == JobStatus::Failed {
            self.error.as_deref().or(self.output.as_deref())
        } else {
            self.output.as_deref()
        }
    }

    pub fn space_saved_percent(&self) -> Option<f64> {
        self.stats
            .as_ref()
            .and_then(BackupStats::size_stats)
            .map(SizeStats::space_saved_percent)
    }
}

/// A synced repository row. Updated only by re-sync, never by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub label: String,
    pub location: String,
    #[serde(default)]
    pub encryption_mode: Option<String>,
    #[serde(default)]
    pub archive_count: u64,
}

/// A synced archive row. `repository` is a soft reference by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub original_size: Option<u64>,
    #[serde(default)]
    pub deduplicated_size: Option<u64>,
    #[serde(default)]
    pub nfiles: Option<u64>,
}

/// Aggregate numbers computed by the engine, consumed read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_archives: u64,
    #[serde(default)]
    pub total_repositories: u64,
    #[serde(default)]
    pub total_unique_size: u64,
    #[serde(default)]
    pub total_original_size: u64,
    #[serde(default)]
    pub deduplication_percentage: f64,
}

impl DashboardSummary {
    /// Deduplication percentage with the non-finite values a remote
    /// aggregator could produce clamped to a defined fallback.
    pub fn deduplication_percentage(&self) -> f64 {
        if self.deduplication_percentage.is_finite() {
            self.deduplication_percentage
        } else {
            0.0
        }
    }

    pub fn space_saved_bytes(&self) -> u64 {
        self.total_original_size
            .saturating_sub(self.total_unique_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_forward_only() {
        use JobStatus::*;
        assert!(Queued.can_advance_to(Running));
        assert!(Queued.can_advance_to(Failed));
        assert!(Running.can_advance_to(Completed));
        assert!(Running.can_advance_to(Running));

        assert!(!Running.can_advance_to(Queued));
        assert!(!Completed.can_advance_to(Running));
        assert!(!Completed.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Queued));
    }

    #[test]
    fn space_saved_guards_zero_original_size() {
        let empty = SizeStats::default();
        assert_eq!(empty.space_saved_percent(), 0.0);

        let stats = SizeStats {
            original_size: 1000,
            compressed_size: 600,
            deduplicated_size: 250,
            nfiles: 4,
        };
        let pct = stats.space_saved_percent();
        assert!(pct.is_finite());
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn parses_engine_job_with_stats() {
        let raw = serde_json::json!({
            "id": "abc123",
            "type": "backup-create",
            "config": "config.yaml",
            "status": "completed",
            "created_at": "2026-01-05T10:00:00Z",
            "completed_at": "2026-01-05T10:04:12Z",
            "output": "borgmatic: creating archive",
            "stats": {
                "repository": { "label": "hetzner", "location": "ssh://u@host/./repo" },
                "encryption": { "mode": "repokey-blake2" },
                "archive": {
                    "name": "host-2026-01-05",
                    "start": "2026-01-05T10:00:01Z",
                    "duration": 250.5,
                    "stats": {
                        "original_size": 1073741824u64,
                        "compressed_size": 536870912u64,
                        "deduplicated_size": 268435456u64,
                        "nfiles": 1234
                    }
                }
            }
        });

        let job: Job = serde_json::from_value(raw).unwrap();
        assert_eq!(job.job_type, JobType::Backup);
        assert_eq!(job.status, JobStatus::Completed);
        let saved = job.space_saved_percent().unwrap();
        assert!((saved - 75.0).abs() < 1e-9);
        assert_eq!(
            job.stats.unwrap().repository.unwrap().display_name(),
            "hetzner"
        );
    }

    #[test]
    fn transcript_prefers_error_on_failure() {
        let mut job: Job = serde_json::from_value(serde_json::json!({
            "id": "j1",
            "type": "check",
            "config": "config.yaml",
            "status": "failed",
            "created_at": "2026-01-05T10:00:00Z",
            "output": "partial output",
            "error": "repository locked"
        }))
        .unwrap();

        assert_eq!(job.transcript(), Some("repository locked"));
        job.status = JobStatus::Completed;
        assert_eq!(job.transcript(), Some("partial output"));
    }

    #[test]
    fn summary_clamps_non_finite_percentage() {
        let summary = DashboardSummary {
            deduplication_percentage: f64::NAN,
            ..Default::default()
        };
        assert_eq!(summary.deduplication_percentage(), 0.0);
    }
}
