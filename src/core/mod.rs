pub mod configstore;
pub mod dashboard;
pub mod dispatcher;
pub mod models;
pub mod monitor;
pub mod sync;

pub use configstore::ConfigStore;
pub use dashboard::DashboardData;
pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher};
pub use models::{
    Archive, BackupStats, DashboardSummary, Job, JobStatus, JobType, ProgressInfo, Repository,
};
pub use monitor::{JobBoard, JobMonitor, MonitorHandle};
