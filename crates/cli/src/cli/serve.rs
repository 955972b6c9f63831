//! `serve` subcommand.

use clap::Args;
use color_eyre::eyre::WrapErr;
use std::path::PathBuf;
use tfd_core::config::{ConfigOverrides, DashboardConfig};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// First port to try; later ports are tried when it is taken
    #[arg(long)]
    pub port: Option<u16>,

    /// tfgrid-compose executable
    #[arg(long)]
    pub compose_bin: Option<String>,

    /// Directory of static UI assets
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
}

impl From<ServeArgs> for ConfigOverrides {
    fn from(args: ServeArgs) -> Self {
        Self {
            compose_bin: args.compose_bin,
            host: args.host,
            port: args.port,
            public_dir: args.public_dir,
        }
    }
}

pub async fn run(mut config: DashboardConfig, args: ServeArgs) -> color_eyre::Result<()> {
    config.apply(args.into());
    tfd_server::serve(&config)
        .await
        .wrap_err("Dashboard server failed")
}
