//! Shared server state.

use tfd_core::commands::CommandCatalog;
use tfd_core::compose::ComposeCli;
use tfd_core::config::DashboardConfig;
use tfd_core::jobs::JobRegistry;
use tfd_core::runner::ProcessRunner;
use tfd_core::shell::{ShellLauncher, ShellRegistry};
use tfd_core::store::DeploymentStore;

/// Everything a handler can reach. Cheap to clone; all parts share their
/// underlying registries.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobRegistry,
    pub shells: ShellRegistry,
    pub catalog: CommandCatalog,
    pub store: DeploymentStore,
    pub compose: ComposeCli,
}

impl AppState {
    pub fn from_config(config: &DashboardConfig) -> Self {
        let runner = ProcessRunner::new(&config.home_dir);
        let launcher = ShellLauncher::new(&config.compose_bin, config.shell_args.clone());
        Self {
            jobs: JobRegistry::new(runner.clone()),
            shells: ShellRegistry::new(runner, launcher),
            catalog: CommandCatalog::new(config.commands_schema_path()),
            store: DeploymentStore::new(&config.config_dir),
            compose: ComposeCli::new(&config.compose_bin, &config.home_dir),
        }
    }

    /// The compose executable every job is started with.
    pub fn compose_bin(&self) -> &str {
        self.compose.program()
    }
}
