//! One-shot command handlers for the non-interactive CLI surface.
//!
//! Each handler issues a single dispatch or query, prints the result (engine
//! errors verbatim) and returns an error for a non-zero exit.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::api::BackendApi;
use crate::api::types::{CheckType, RepoCreateRequest};
use crate::cli::format::{format_bytes, format_timestamp};
use crate::core::models::JobStatus;
use crate::core::{ConfigStore, DispatchError, DispatchOutcome, Dispatcher, sync};

pub async fn backup(api: Arc<dyn BackendApi>, config: &str) -> Result<()> {
    let outcome = Dispatcher::new(api).backup(config).await?;
    if let Some(job_id) = outcome.job_id() {
        println!("Backup job started: {job_id}");
        println!("Monitor it with `dashborg jobs` or the TUI jobs view.");
    }
    Ok(())
}

pub async fn prune(api: Arc<dyn BackendApi>, config: &str, live: bool, yes: bool) -> Result<()> {
    let confirmed = if live && !yes {
        confirm_live_prune(config)?
    } else {
        yes
    };

    match Dispatcher::new(api).prune(config, !live, confirmed).await {
        Ok(_) => {
            if live {
                println!("Prune dispatched (live). Archives outside the retention policy will be deleted.");
            } else {
                println!("Prune dispatched (dry-run). Check the job list for what would be deleted.");
            }
            Ok(())
        }
        Err(DispatchError::Unconfirmed) => bail!("live prune aborted: not confirmed"),
        Err(e) => Err(e.into()),
    }
}

pub async fn check(api: Arc<dyn BackendApi>, config: &str, check_type: CheckType) -> Result<()> {
    Dispatcher::new(api).check(config, check_type).await?;
    println!("Check ({}) dispatched.", check_type.label());
    Ok(())
}

pub async fn repo_create(api: Arc<dyn BackendApi>, request: RepoCreateRequest) -> Result<()> {
    let outcome = Dispatcher::new(api).repo_create(request).await?;
    if let DispatchOutcome::Completed { output } = outcome {
        println!("Repository created.");
        if !output.is_empty() {
            println!("{output}");
        }
    }
    Ok(())
}

pub async fn extract(api: Arc<dyn BackendApi>, config: &str, archive: &str) -> Result<()> {
    let outcome = Dispatcher::new(api).extract(config, archive).await?;
    if let DispatchOutcome::Dispatched {
        job_id,
        destination,
    } = outcome
    {
        println!("Extraction job started: {job_id}");
        if let Some(destination) = destination {
            println!("Destination: {destination}");
        }
    }
    Ok(())
}

pub async fn mount(api: Arc<dyn BackendApi>, config: &str, archive: &str) -> Result<()> {
    let outcome = Dispatcher::new(api).mount(config, archive).await?;
    if let DispatchOutcome::Mounted { mount_point } = outcome {
        println!("Archive mounted read-only at {mount_point}");
    }
    Ok(())
}

pub async fn sync(api: Arc<dyn BackendApi>, config: Option<&str>) -> Result<()> {
    let data = sync::sync_and_reload(&api, config).await?;
    println!(
        "Synced {} repositories, {} archives.",
        data.summary.total_repositories, data.summary.total_archives
    );
    println!(
        "Storage used: {} ({} before deduplication, {:.1}% saved)",
        format_bytes(data.summary.total_unique_size),
        format_bytes(data.summary.total_original_size),
        data.deduplication_percentage(),
    );
    Ok(())
}

/// Print a single job snapshot, newest first as delivered by the engine.
pub async fn jobs(api: Arc<dyn BackendApi>) -> Result<()> {
    let jobs = api.list_jobs().await?;
    if jobs.is_empty() {
        println!("No jobs.");
        return Ok(());
    }

    for job in &jobs {
        println!(
            "{}  {:<11} {:<9} {}  {}",
            format_timestamp(job.created_at),
            job.job_type.label(),
            job.status.label(),
            job.config,
            job.id,
        );
        if job.status == JobStatus::Running
            && let Some(progress) = &job.progress_info
        {
            if progress.files_processed > 0 {
                println!("    {} files processed", progress.files_processed);
            }
            if let Some(file) = &progress.current_file {
                println!("    {file}");
            }
        }
        if let Some(saved) = job.space_saved_percent() {
            println!("    space saved: {saved:.1}%");
        }
    }
    Ok(())
}

pub async fn config_list(api: Arc<dyn BackendApi>) -> Result<()> {
    for name in ConfigStore::new(api).list().await? {
        println!("{name}");
    }
    Ok(())
}

pub async fn config_show(api: Arc<dyn BackendApi>, name: &str) -> Result<()> {
    let text = ConfigStore::new(api).get(name).await?;
    print!("{text}");
    Ok(())
}

pub async fn config_push(api: Arc<dyn BackendApi>, name: &str, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let store = ConfigStore::new(api);

    // Validate first, but push even an invalid document if the engine stored
    // it before: the verdict is advice, the save is the user's call.
    let verdict = store.validate(&text).await?;
    if !verdict.valid {
        eprintln!(
            "warning: document is not valid: {}",
            verdict.error.as_deref().unwrap_or("unknown error")
        );
    }

    store.put(name, &text).await?;
    println!("Saved {name}.");
    Ok(())
}

pub async fn config_validate(api: Arc<dyn BackendApi>, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let verdict = ConfigStore::new(api).validate(&text).await?;

    if verdict.valid {
        println!("Valid.");
        Ok(())
    } else {
        bail!(
            "invalid: {}",
            verdict.error.unwrap_or_else(|| "unknown error".to_string())
        )
    }
}

/// Interactive confirmation for a destructive live prune.
fn confirm_live_prune(config: &str) -> Result<bool> {
    use std::io::{Write, stdin, stdout};

    println!("Live prune will permanently delete archives per the retention policy of {config}.");
    print!("Continue? [y/N] ");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
