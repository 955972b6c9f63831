//! Configuration file and environment loading.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::DashboardConfig;
use std::path::{Path, PathBuf};

pub const ENV_COMPOSE_BIN: &str = "TFGRID_COMPOSE_BIN";
pub const ENV_PORT: &str = "TFGRID_DASHBOARD_PORT";
pub const ENV_COMMANDS_SCHEMA: &str = "TFGRID_COMMANDS_SCHEMA";
pub const ENV_HOST: &str = "TFGRID_DASHBOARD_HOST";

/// Loads the dashboard configuration.
///
/// With an explicit path the file must exist. Without one,
/// `<config_dir>/dashboard.toml` is used when present and defaults
/// otherwise. Environment variables are applied on top.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read or is not valid TOML
/// - An environment variable has an invalid value
pub fn load_config(explicit: Option<&Path>) -> ConfigResult<DashboardConfig> {
    let path: Option<PathBuf> = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = DashboardConfig::default().default_config_file();
            candidate.exists().then_some(candidate)
        }
    };

    let mut config = match path {
        Some(path) => load_config_file(&path)?,
        None => DashboardConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Loads one TOML file over the defaults.
pub fn load_config_file(path: &Path) -> ConfigResult<DashboardConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies the `TFGRID_*` environment variables. Empty values are ignored.
pub fn apply_env<F>(config: &mut DashboardConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(bin) = get(ENV_COMPOSE_BIN) {
        config.compose_bin = bin;
    }
    if let Some(host) = get(ENV_HOST) {
        config.host = host;
    }
    if let Some(schema) = get(ENV_COMMANDS_SCHEMA) {
        config.commands_schema = Some(PathBuf::from(schema));
    }
    if let Some(port) = get(ENV_PORT) {
        config.base_port = port
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                key: ENV_PORT.to_string(),
                value: port.clone(),
                reason: e.to_string(),
            })?;
    }

    Ok(())
}
