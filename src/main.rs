use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dashborg::api::types::{CheckType, RepoCreateRequest};
use dashborg::api::{BackendApi, HttpApi};
use dashborg::cli::{commands, tui};
use dashborg::{config, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "dashborg")]
#[command(about = "Operator dashboard for a borgmatic backup engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    globals: GlobalArgs,
}

#[derive(Args, Serialize)]
struct GlobalArgs {
    /// Base URL of the backup engine's HTTP API
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Configuration document used when a command does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    default_config: Option<String>,

    /// Job list poll cadence, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    poll_interval_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    json_logs: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default when no command is given)
    Tui,
    /// Start a backup run
    Backup {
        /// Configuration document to back up with
        config: Option<String>,
    },
    /// Prune archives per the retention policy (dry-run unless --live)
    Prune {
        config: Option<String>,
        /// Actually delete archives instead of previewing
        #[arg(long)]
        live: bool,
        /// Skip the interactive confirmation for a live prune
        #[arg(long)]
        yes: bool,
    },
    /// Run a consistency check
    Check {
        config: Option<String>,
        #[arg(long, value_enum, default_value = "repository")]
        check_type: CheckType,
    },
    /// Initialize repositories named by a configuration document
    RepoCreate {
        config: Option<String>,
        #[arg(long)]
        encryption_mode: Option<String>,
        #[arg(long)]
        append_only: bool,
        #[arg(long)]
        storage_quota: Option<String>,
        #[arg(long)]
        make_parent_dirs: bool,
    },
    /// Extract an archive on the engine host
    Extract {
        archive: String,
        #[arg(long)]
        config: Option<String>,
    },
    /// Mount an archive read-only on the engine host
    Mount {
        archive: String,
        #[arg(long)]
        config: Option<String>,
    },
    /// Sync repositories and archives, then print the refreshed summary
    Sync {
        config: Option<String>,
    },
    /// Print the current job list
    Jobs,
    /// Manage configuration documents
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List known document names
    List,
    /// Print a document's raw text
    Show { name: String },
    /// Validate then upload a local file as the named document
    Push { name: String, file: PathBuf },
    /// Validate a local file without saving anything
    Validate { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::AppConfig::new(Some(&cli.globals))?;

    logging::init(logging::LogConfig {
        json: config.json_logs,
        verbose: config.verbose,
    });

    let api: Arc<dyn BackendApi> = Arc::new(HttpApi::new(&config.server_url));

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            tui::run(api, &config, config.default_config.as_deref())
                .await
                .context("TUI failed")?;
        }
        Commands::Backup { config: name } => {
            let name = resolve_config(name, &config)?;
            commands::backup(api, &name).await?;
        }
        Commands::Prune {
            config: name,
            live,
            yes,
        } => {
            let name = resolve_config(name, &config)?;
            commands::prune(api, &name, live, yes).await?;
        }
        Commands::Check {
            config: name,
            check_type,
        } => {
            let name = resolve_config(name, &config)?;
            commands::check(api, &name, check_type).await?;
        }
        Commands::RepoCreate {
            config: name,
            encryption_mode,
            append_only,
            storage_quota,
            make_parent_dirs,
        } => {
            let name = resolve_config(name, &config)?;
            let request = RepoCreateRequest {
                config: name,
                encryption_mode,
                append_only,
                storage_quota,
                make_parent_dirs,
            };
            commands::repo_create(api, request).await?;
        }
        Commands::Extract {
            archive,
            config: name,
        } => {
            let name = resolve_config(name, &config)?;
            commands::extract(api, &name, &archive).await?;
        }
        Commands::Mount {
            archive,
            config: name,
        } => {
            let name = resolve_config(name, &config)?;
            commands::mount(api, &name, &archive).await?;
        }
        Commands::Sync { config: name } => {
            let name = name.or_else(|| config.default_config.clone());
            commands::sync(api, name.as_deref()).await?;
        }
        Commands::Jobs => commands::jobs(api).await?,
        Commands::Config { command } => match command {
            ConfigCommands::List => commands::config_list(api).await?,
            ConfigCommands::Show { name } => commands::config_show(api, &name).await?,
            ConfigCommands::Push { name, file } => commands::config_push(api, &name, &file).await?,
            ConfigCommands::Validate { file } => commands::config_validate(api, &file).await?,
        },
    }

    Ok(())
}

/// A command's config argument, falling back to the configured default.
fn resolve_config(arg: Option<String>, config: &config::AppConfig) -> Result<String> {
    if let Some(name) = arg.or_else(|| config.default_config.clone()) {
        Ok(name)
    } else {
        bail!("no configuration document named; pass one or set default_config")
    }
}
