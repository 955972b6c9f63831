//! Dashboard configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line overrides.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_env, load_config, load_config_file};
pub use models::{ConfigOverrides, DashboardConfig};
