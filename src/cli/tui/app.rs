//! TUI application state and logic.
//!
//! Each view owns its cursor state; the job monitor poll loop is started
//! when the Jobs view becomes active and cancelled the moment it is left.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::api::BackendApi;
use crate::api::types::{CheckType, RepoCreateRequest, Validation};
use crate::config::AppConfig;
use crate::core::models::Job;
use crate::core::monitor::{JobMonitor, MonitorHandle};
use crate::core::{
    ConfigStore, DashboardData, DispatchError, DispatchOutcome, Dispatcher, dashboard, sync,
};

/// Delay between a background dispatch and the switch to the Jobs view, so
/// the first poll can observe the newly created job.
const JOBS_SWITCH_GRACE: Duration = Duration::from_secs(2);

/// Current view being displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Dispatch surface: list of maintenance operations.
    Operations { selected: usize },
    /// Monitored job list; `detail` expands the selected job's stats and
    /// transcript.
    Jobs { selected: usize, detail: bool },
    /// Dashboard statistics; `selected` is the cursor in the archive table.
    Stats { selected: usize },
    /// Config documents: list, preview, validation verdict.
    Configs { selected: usize },
}

impl Default for View {
    fn default() -> Self {
        View::Operations { selected: 0 }
    }
}

/// A dispatchable entry in the Operations view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Backup,
    PruneDryRun,
    PruneLive,
    Check(CheckType),
    RepoCreate,
    SyncStats,
}

pub const OPERATIONS: &[(Operation, &str)] = &[
    (Operation::Backup, "Create backup now"),
    (Operation::PruneDryRun, "Prune archives (dry-run preview)"),
    (Operation::PruneLive, "Prune archives (LIVE, deletes data)"),
    (Operation::Check(CheckType::Repository), "Check: repository"),
    (Operation::Check(CheckType::Archives), "Check: archives"),
    (Operation::Check(CheckType::Extract), "Check: extract sample"),
    (Operation::Check(CheckType::Data), "Check: data (thorough)"),
    (Operation::RepoCreate, "Create repositories (config defaults)"),
    (Operation::SyncStats, "Sync repositories and archives"),
];

/// Action awaiting a yes/no answer in the confirmation overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirm {
    LivePrune,
    Extract { archive: String },
}

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Refresh,
    ToggleDetail,
    SwitchView(u8),
    Sync,
    Validate,
    SearchStart,
    SearchChar(char),
    SearchBackspace,
    CycleRepoFilter,
    Extract,
    Mount,
    ConfirmYes,
    ConfirmNo,
}

/// Cached data fetched from the backend.
#[derive(Default)]
pub struct AppData {
    pub config_files: Vec<String>,
    pub selected_config: usize,
    pub jobs: Vec<Job>,
    pub dashboard: Option<DashboardData>,
    /// (name, text) of the previewed config document.
    pub config_preview: Option<(String, String)>,
    pub verdict: Option<Validation>,
    pub archive_search: String,
    pub repo_filter: Option<usize>,
}

impl AppData {
    pub fn selected_config_name(&self) -> Option<&str> {
        self.config_files
            .get(self.selected_config)
            .map(String::as_str)
    }

    /// Label of the active repository filter, if any.
    pub fn repo_filter_label(&self) -> Option<&str> {
        let dashboard = self.dashboard.as_ref()?;
        let index = self.repo_filter?;
        dashboard
            .repositories
            .get(index)
            .map(|r| r.label.as_str())
    }
}

/// Main TUI application state.
pub struct TuiApp {
    api: Arc<dyn BackendApi>,
    dispatcher: Dispatcher,
    configs: ConfigStore,
    monitor: JobMonitor,
    monitor_handle: Option<MonitorHandle>,
    pub view: View,
    pub data: AppData,
    pub running: bool,
    /// One-line status/result message shown in the footer.
    pub status: Option<String>,
    /// Pending confirmation overlay for a destructive or host-writing action.
    pub confirm: Option<Confirm>,
    /// Deadline for the grace-delayed switch to the Jobs view.
    pub jobs_switch_at: Option<Instant>,
    /// Whether keystrokes feed the archive search box.
    pub search_mode: bool,
}

impl TuiApp {
    pub fn new(api: Arc<dyn BackendApi>, config: &AppConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(api.clone()),
            configs: ConfigStore::new(api.clone()),
            monitor: JobMonitor::new(api.clone(), config.poll_interval()),
            api,
            monitor_handle: None,
            view: View::default(),
            data: AppData::default(),
            running: true,
            status: None,
            confirm: None,
            jobs_switch_at: None,
            search_mode: false,
        }
    }

    pub fn in_jobs_view(&self) -> bool {
        matches!(self.view, View::Jobs { .. })
    }

    /// Fetch initial data from the backend.
    pub async fn init(&mut self, preselect: Option<&str>) -> Result<()> {
        match self.configs.list().await {
            Ok(files) => {
                self.data.selected_config = preselect
                    .and_then(|name| files.iter().position(|f| f == name))
                    .unwrap_or(0);
                self.data.config_files = files;
            }
            Err(e) => self.status = Some(format!("Failed to load config files: {e}")),
        }
        Ok(())
    }

    /// Stop the poll loop before tearing down the terminal.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.monitor_handle.take() {
            handle.shutdown().await;
        }
    }

    /// Pull the latest snapshot out of the monitor's board. Called on every
    /// render tick while the Jobs view is active.
    pub async fn refresh_jobs_from_board(&mut self) {
        self.data.jobs = self.monitor.board().jobs().await;
    }

    /// Switch views, starting/stopping the monitor as the Jobs view comes
    /// and goes. Dropping the handle cancels the poll loop.
    pub async fn enter_view(&mut self, view: View) {
        let entering_jobs = matches!(view, View::Jobs { .. });
        if entering_jobs && self.monitor_handle.is_none() {
            self.monitor_handle = Some(self.monitor.spawn());
        }
        if !entering_jobs {
            self.monitor_handle = None;
        }

        if matches!(view, View::Stats { .. }) && self.data.dashboard.is_none() {
            self.load_dashboard().await;
        }

        self.search_mode = false;
        self.view = view;
    }

    /// Grace-delay elapsed: move to the Jobs view.
    pub async fn maybe_switch_to_jobs(&mut self) {
        if let Some(at) = self.jobs_switch_at
            && Instant::now() >= at
        {
            self.jobs_switch_at = None;
            self.enter_view(View::Jobs {
                selected: 0,
                detail: false,
            })
            .await;
        }
    }

    pub async fn handle_action(&mut self, action: Action) {
        // The confirm overlay swallows everything except its own answer.
        if let Some(confirm) = self.confirm.take() {
            match action {
                Action::ConfirmYes => match confirm {
                    Confirm::LivePrune => self.dispatch_prune(false, true).await,
                    Confirm::Extract { archive } => self.dispatch_extract(archive).await,
                },
                Action::ConfirmNo | Action::Back | Action::Quit => {
                    self.status = Some(match confirm {
                        Confirm::LivePrune => "Live prune cancelled".to_string(),
                        Confirm::Extract { archive } => {
                            format!("Extraction of {archive} cancelled")
                        }
                    });
                }
                _ => self.confirm = Some(confirm),
            }
            return;
        }

        if self.search_mode {
            match action {
                Action::SearchChar(c) => self.data.archive_search.push(c),
                Action::SearchBackspace => {
                    self.data.archive_search.pop();
                }
                Action::Back | Action::Select => self.search_mode = false,
                _ => {}
            }
            return;
        }

        match action {
            Action::Quit => self.running = false,
            Action::SwitchView(n) => {
                let view = match n {
                    1 => View::Operations { selected: 0 },
                    2 => View::Jobs {
                        selected: 0,
                        detail: false,
                    },
                    3 => View::Stats { selected: 0 },
                    _ => View::Configs { selected: 0 },
                };
                self.enter_view(view).await;
            }
            Action::Up => self.navigate(-1),
            Action::Down => self.navigate(1),
            Action::Left => self.cycle_config(-1),
            Action::Right => self.cycle_config(1),
            Action::Select => self.select_item().await,
            Action::Back => {
                if let View::Jobs { selected, .. } = self.view {
                    self.view = View::Jobs {
                        selected,
                        detail: false,
                    };
                } else {
                    self.enter_view(View::Operations { selected: 0 }).await;
                }
            }
            Action::Refresh => self.refresh_current_view().await,
            Action::ToggleDetail => {
                if let View::Jobs { selected, detail } = self.view {
                    self.view = View::Jobs {
                        selected,
                        detail: !detail,
                    };
                }
            }
            Action::Sync => {
                if matches!(self.view, View::Stats { .. }) {
                    self.sync_stats().await;
                }
            }
            Action::Validate => {
                if matches!(self.view, View::Configs { .. }) {
                    self.validate_preview().await;
                }
            }
            Action::SearchStart => {
                if matches!(self.view, View::Stats { .. }) {
                    self.search_mode = true;
                }
            }
            Action::CycleRepoFilter => self.cycle_repo_filter(),
            Action::Extract => self.request_extract(),
            Action::Mount => self.mount_selected().await,
            Action::SearchChar(_) | Action::SearchBackspace => {}
            Action::ConfirmYes | Action::ConfirmNo => {}
        }
    }

    fn navigate(&mut self, delta: i64) {
        let step = |selected: usize, len: usize| -> usize {
            if len == 0 {
                return 0;
            }
            let next = selected as i64 + delta;
            next.clamp(0, len as i64 - 1) as usize
        };

        match &self.view {
            View::Operations { selected } => {
                self.view = View::Operations {
                    selected: step(*selected, OPERATIONS.len()),
                };
            }
            View::Jobs { selected, detail } => {
                self.view = View::Jobs {
                    selected: step(*selected, self.data.jobs.len()),
                    detail: *detail,
                };
            }
            View::Configs { selected } => {
                self.view = View::Configs {
                    selected: step(*selected, self.data.config_files.len()),
                };
            }
            View::Stats { selected } => {
                self.view = View::Stats {
                    selected: step(*selected, self.filtered_archive_count()),
                };
            }
        }
    }

    fn cycle_config(&mut self, delta: i64) {
        let len = self.data.config_files.len();
        if len == 0 {
            return;
        }
        let next = (self.data.selected_config as i64 + delta).rem_euclid(len as i64);
        self.data.selected_config = next as usize;
    }

    fn cycle_repo_filter(&mut self) {
        let Some(dashboard) = &self.data.dashboard else {
            return;
        };
        let count = dashboard.repositories.len();
        self.data.repo_filter = match self.data.repo_filter {
            None if count > 0 => Some(0),
            Some(i) if i + 1 < count => Some(i + 1),
            _ => None,
        };
        // The filtered table changed under the cursor.
        if let View::Stats { .. } = self.view {
            self.view = View::Stats { selected: 0 };
        }
    }

    /// Name of the archive under the cursor in the stats table, after the
    /// search and repository filters are applied.
    fn selected_archive(&self) -> Option<String> {
        let View::Stats { selected } = &self.view else {
            return None;
        };
        let dashboard = self.data.dashboard.as_ref()?;
        let filter = self.data.repo_filter_label().map(str::to_string);
        dashboard
            .filtered_archives(&self.data.archive_search, filter.as_deref())
            .get(*selected)
            .map(|archive| archive.name.clone())
    }

    fn filtered_archive_count(&self) -> usize {
        let Some(dashboard) = &self.data.dashboard else {
            return 0;
        };
        let filter = self.data.repo_filter_label().map(str::to_string);
        dashboard
            .filtered_archives(&self.data.archive_search, filter.as_deref())
            .len()
    }

    async fn select_item(&mut self) {
        match &self.view {
            View::Operations { selected } => {
                let Some((operation, _)) = OPERATIONS.get(*selected).copied() else {
                    return;
                };
                self.run_operation(operation).await;
            }
            View::Jobs { selected, .. } => {
                let selected = *selected;
                self.view = View::Jobs {
                    selected,
                    detail: true,
                };
            }
            View::Configs { selected } => {
                let Some(name) = self.data.config_files.get(*selected).cloned() else {
                    return;
                };
                self.data.verdict = None;
                match self.configs.get(&name).await {
                    Ok(text) => self.data.config_preview = Some((name, text)),
                    Err(e) => self.status = Some(format!("Failed to load {name}: {e}")),
                }
            }
            View::Stats { .. } => {}
        }
    }

    async fn refresh_current_view(&mut self) {
        match &self.view {
            View::Jobs { .. } => {
                self.monitor.poll_once().await;
                self.refresh_jobs_from_board().await;
            }
            View::Stats { .. } => self.load_dashboard().await,
            View::Configs { .. } => {
                if let Ok(files) = self.configs.list().await {
                    self.data.config_files = files;
                }
            }
            View::Operations { .. } => {}
        }
    }

    async fn run_operation(&mut self, operation: Operation) {
        let Some(config) = self.data.selected_config_name().map(str::to_string) else {
            self.status = Some("No configuration document available".to_string());
            return;
        };

        match operation {
            Operation::Backup => {
                match self.dispatcher.backup(&config).await {
                    Ok(outcome) => {
                        if let Some(job_id) = outcome.job_id() {
                            self.status = Some(format!("Backup job started: {job_id}"));
                        }
                        self.schedule_jobs_switch();
                    }
                    Err(e) => self.report_dispatch_error(e),
                }
            }
            Operation::PruneDryRun => self.dispatch_prune(true, false).await,
            Operation::PruneLive => {
                // Destructive: overlay asks before anything is dispatched.
                self.confirm = Some(Confirm::LivePrune);
            }
            Operation::Check(check_type) => {
                match self.dispatcher.check(&config, check_type).await {
                    Ok(_) => {
                        self.status =
                            Some(format!("Check ({}) dispatched", check_type.label()));
                        self.schedule_jobs_switch();
                    }
                    Err(e) => self.report_dispatch_error(e),
                }
            }
            Operation::RepoCreate => {
                let request = RepoCreateRequest::inherit_all(&config);
                match self.dispatcher.repo_create(request).await {
                    Ok(_) => self.status = Some("Repository created".to_string()),
                    Err(e) => self.report_dispatch_error(e),
                }
            }
            Operation::SyncStats => self.sync_stats().await,
        }
    }

    async fn dispatch_prune(&mut self, dry_run: bool, confirmed: bool) {
        let Some(config) = self.data.selected_config_name().map(str::to_string) else {
            self.status = Some("No configuration document available".to_string());
            return;
        };
        match self.dispatcher.prune(&config, dry_run, confirmed).await {
            Ok(_) => {
                self.status = Some(if dry_run {
                    "Prune (dry-run) dispatched".to_string()
                } else {
                    "Live prune dispatched".to_string()
                });
                self.schedule_jobs_switch();
            }
            Err(e) => self.report_dispatch_error(e),
        }
    }

    /// Extraction writes into the engine host's filesystem; ask first.
    fn request_extract(&mut self) {
        let Some(archive) = self.selected_archive() else {
            return;
        };
        self.confirm = Some(Confirm::Extract { archive });
    }

    async fn dispatch_extract(&mut self, archive: String) {
        let Some(config) = self.data.selected_config_name().map(str::to_string) else {
            self.status = Some("No configuration document available".to_string());
            return;
        };
        match self.dispatcher.extract(&config, &archive).await {
            Ok(DispatchOutcome::Dispatched {
                job_id,
                destination,
            }) => {
                self.status = Some(match destination {
                    Some(destination) => {
                        format!("Extraction job {job_id} started into {destination}")
                    }
                    None => format!("Extraction job {job_id} started"),
                });
                self.schedule_jobs_switch();
            }
            Ok(_) => {}
            Err(e) => self.report_dispatch_error(e),
        }
    }

    async fn mount_selected(&mut self) {
        let Some(archive) = self.selected_archive() else {
            return;
        };
        let Some(config) = self.data.selected_config_name().map(str::to_string) else {
            self.status = Some("No configuration document available".to_string());
            return;
        };
        match self.dispatcher.mount(&config, &archive).await {
            Ok(DispatchOutcome::Mounted { mount_point }) => {
                self.status = Some(format!("Archive mounted read-only at {mount_point}"));
            }
            Ok(_) => {}
            Err(e) => self.report_dispatch_error(e),
        }
    }

    async fn load_dashboard(&mut self) {
        match dashboard::load(&self.api).await {
            Ok(data) => {
                self.data.repo_filter = None;
                self.data.dashboard = Some(data);
            }
            Err(e) => self.status = Some(format!("Failed to load statistics: {e}")),
        }
    }

    async fn sync_stats(&mut self) {
        let config = self.data.selected_config_name().map(str::to_string);
        match sync::sync_and_reload(&self.api, config.as_deref()).await {
            Ok(data) => {
                self.data.repo_filter = None;
                self.data.dashboard = Some(data);
                self.status = Some("Sync complete".to_string());
            }
            Err(e) => self.status = Some(format!("Sync failed: {e}")),
        }
    }

    async fn validate_preview(&mut self) {
        let Some((name, text)) = self.data.config_preview.clone() else {
            self.status = Some("Select a config document first".to_string());
            return;
        };
        match self.configs.validate(&text).await {
            Ok(verdict) => {
                self.status = Some(if verdict.valid {
                    format!("{name} is valid")
                } else {
                    format!("{name} is invalid")
                });
                self.data.verdict = Some(verdict);
            }
            Err(e) => self.status = Some(format!("Validation request failed: {e}")),
        }
    }

    /// Dispatch failures surface immediately, here in the footer; transport
    /// problems are labeled as local, engine messages pass through verbatim.
    fn report_dispatch_error(&mut self, error: DispatchError) {
        self.status = Some(match &error {
            DispatchError::Engine(message) => format!("Engine error: {message}"),
            other => other.to_string(),
        });
    }

    fn schedule_jobs_switch(&mut self) {
        if !self.in_jobs_view() {
            self.jobs_switch_at = Some(Instant::now() + JOBS_SWITCH_GRACE);
        }
    }
}
