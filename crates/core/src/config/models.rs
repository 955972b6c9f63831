//! The dashboard's runtime settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the optional config file inside the compose config directory.
pub const CONFIG_FILE_NAME: &str = "dashboard.toml";

/// Runtime settings for the server and the operator CLI.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```toml
/// compose_bin = "/usr/local/bin/tfgrid-compose"
/// base_port = 4000
/// shell_args = ["ssh", "{target}"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Compose CLI executable used for every job and shell.
    pub compose_bin: String,

    pub host: String,

    /// First port tried when binding.
    pub base_port: u16,

    /// How many successive ports to try after `base_port` is taken.
    pub port_retries: u16,

    /// Working directory of spawned processes.
    pub home_dir: PathBuf,

    /// Compose CLI state directory (`deployments.yaml`, `registry/`, ...).
    pub config_dir: PathBuf,

    /// Defaults to `<config_dir>/commands-schema.json`.
    pub commands_schema: Option<PathBuf>,

    /// Defaults to `<config_dir>/dashboard-port`.
    pub port_file: Option<PathBuf>,

    /// Arguments for interactive shells; `{target}` is the deployment id.
    pub shell_args: Vec<String>,

    /// Static web client, served with an `index.html` fallback.
    pub public_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config_dir = home_dir.join(".config").join("tfgrid-compose");
        Self {
            compose_bin: "tfgrid-compose".to_string(),
            host: "127.0.0.1".to_string(),
            base_port: 3000,
            port_retries: 20,
            home_dir,
            config_dir,
            commands_schema: None,
            port_file: None,
            shell_args: vec!["ssh".to_string(), "{target}".to_string()],
            public_dir: None,
        }
    }
}

impl DashboardConfig {
    pub fn commands_schema_path(&self) -> PathBuf {
        self.commands_schema
            .clone()
            .unwrap_or_else(|| self.config_dir.join("commands-schema.json"))
    }

    pub fn port_file_path(&self) -> PathBuf {
        self.port_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join("dashboard-port"))
    }

    /// Client-side job snapshot used by the operator CLI.
    pub fn jobs_snapshot_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(compose_bin) = overrides.compose_bin {
            self.compose_bin = compose_bin;
        }
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.base_port = port;
        }
        if let Some(public_dir) = overrides.public_dir {
            self.public_dir = Some(public_dir);
        }
    }
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub compose_bin: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_dir: Option<PathBuf>,
}
