//! Application configuration.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `DASHBORG_*` environment variables, then serialized CLI overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "/etc/dashborg/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backup engine's HTTP API.
    pub server_url: String,
    /// Configuration document preselected in the UI and used when a command
    /// does not name one.
    pub default_config: Option<String>,
    /// Job list poll cadence, in seconds.
    pub poll_interval_secs: u64,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            default_config: None,
            poll_interval_secs: 2,
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, merging the default file location, environment
    /// and (optionally) serialized CLI arguments. CLI arguments win.
    pub fn new<T: Serialize>(cli: Option<&T>) -> Result<Self> {
        let path = std::env::var("DASHBORG_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path, cli)
    }

    /// Load configuration from an explicit file path. The file is optional;
    /// a missing file just leaves the defaults in place.
    pub fn load_from<T: Serialize>(path: &Path, cli: Option<&T>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("DASHBORG_"));

        if let Some(cli) = cli {
            figment = figment.merge(Serialized::defaults(cli));
        }

        figment
            .extract()
            .context("Failed to load dashborg configuration")
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Serialize)]
    struct CliOverride {
        #[serde(skip_serializing_if = "Option::is_none")]
        server_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        poll_interval_secs: Option<u64>,
    }

    #[test]
    fn defaults_when_file_missing() {
        let config =
            AppConfig::load_from(Path::new("/nonexistent/dashborg.toml"), None::<&()>).unwrap();
        assert_eq!(config.server_url, "http://localhost:8000");
        assert_eq!(config.poll_interval_secs, 2);
    }

    #[test]
    fn file_overrides_defaults_and_cli_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server_url = \"http://backup-host:9000\"\npoll_interval_secs = 5"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path(), None::<&()>).unwrap();
        assert_eq!(config.server_url, "http://backup-host:9000");
        assert_eq!(config.poll_interval_secs, 5);

        let cli = CliOverride {
            server_url: Some("http://cli-host:8000".to_string()),
            poll_interval_secs: None,
        };
        let config = AppConfig::load_from(file.path(), Some(&cli)).unwrap();
        assert_eq!(config.server_url, "http://cli-host:8000");
        // Unset CLI fields do not clobber the file value
        assert_eq!(config.poll_interval_secs, 5);
    }

    #[test]
    fn poll_interval_is_never_zero() {
        let config = AppConfig {
            poll_interval_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.poll_interval(), std::time::Duration::from_secs(1));
    }
}
