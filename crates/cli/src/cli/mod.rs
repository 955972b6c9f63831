//! Command-line interface.
//!
//! - `serve`: run the dashboard server
//! - `deploy`, `run`, `exec`, `project`: start a job and follow its output
//! - `jobs`: list, close or clear tracked jobs, or list every server job
//! - `deployments`: list recorded deployments
//! - `shell`: interactive shell on a deployment

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfd_client::HttpApi;
use tfd_core::config::{load_config, DashboardConfig};
use tfd_protocol::deployment_models::ProjectAction;

use jobs::Operator;

pub mod args;
pub mod jobs;
pub mod output;
pub mod serve;
pub mod shell;

/// TFGrid deployment dashboard
#[derive(Parser, Debug)]
#[command(name = "tfgrid-dashboard")]
#[command(about = "Run the TFGrid dashboard server or drive it from the terminal")]
#[command(version)]
pub struct Cli {
    /// Dashboard server URL. Defaults to the port recorded by a running server.
    #[arg(long, global = true, env = "TFGRID_DASHBOARD_URL")]
    pub server: Option<String>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(serve::ServeArgs),

    /// Deploy an app (`tfgrid-compose up <app>`)
    Deploy {
        app: String,
        /// Print the job id and return without following output
        #[arg(long)]
        detach: bool,
    },

    /// Run a command from the commands schema
    Run {
        /// Command id
        command: String,
        /// Positional argument as NAME=VALUE (repeatable)
        #[arg(long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
        /// Flag as NAME (boolean) or NAME=VALUE (repeatable)
        #[arg(long = "flag", value_name = "NAME[=VALUE]")]
        flags: Vec<String>,
        /// Title shown in the job list
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        detach: bool,
    },

    /// Run a raw tfgrid-compose command line
    Exec {
        #[arg(long)]
        detach: bool,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Create, run or publish a project on a deployment
    Project {
        action: ProjectAction,
        deployment: String,
        project: String,
        #[arg(long)]
        detach: bool,
    },

    /// List tracked jobs after reconciling them with the server
    Jobs {
        /// Stop tracking a job (display index or id)
        #[arg(long, value_name = "JOB")]
        close: Option<String>,
        /// Stop tracking every job
        #[arg(long, conflicts_with = "close")]
        clear: bool,
        /// List every job the server knows instead of the tracked set
        #[arg(long, conflicts_with_all = ["close", "clear"])]
        all: bool,
    },

    /// List recorded deployments
    Deployments,

    /// Open an interactive shell on a deployment
    Shell { target: String },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> color_eyre::Result<()> {
    let config = load_config(cli.config.as_deref()).wrap_err("Failed to load configuration")?;
    let server = cli.server.as_deref();

    match cli.command {
        Commands::Serve(args) => serve::run(config, args).await,
        Commands::Deploy { app, detach } => {
            let operator = Operator::connect(&config, server);
            let job_id = operator.supervisor.deploy(&app).await?;
            operator.finish(job_id, detach, None).await
        }
        Commands::Run {
            command,
            args,
            flags,
            title,
            detach,
        } => {
            let request = args::command_request(command, &args, &flags)?;
            let operator = Operator::connect(&config, server);
            let job_id = operator
                .supervisor
                .run_command(&request, title.as_deref())
                .await?;
            operator.finish(job_id, detach, None).await
        }
        Commands::Exec { line, detach } => {
            let operator = Operator::connect(&config, server);
            let job_id = operator.supervisor.run_direct(&line.join(" ")).await?;
            operator.finish(job_id, detach, None).await
        }
        Commands::Project {
            action,
            deployment,
            project,
            detach,
        } => {
            let operator = Operator::connect(&config, server);
            let job_id = operator
                .supervisor
                .project_action(&deployment, action, &project)
                .await?;
            operator.finish(job_id, detach, Some(&deployment)).await
        }
        Commands::Jobs { close, clear, all } => {
            let operator = Operator::connect(&config, server);
            if all {
                return jobs::list_server_jobs(operator.supervisor.api().as_ref()).await;
            }
            jobs::manage(&operator.supervisor, close.as_deref(), clear).await
        }
        Commands::Deployments => {
            let api = HttpApi::new(server_url(server, &config));
            jobs::list_deployments(&api).await
        }
        Commands::Shell { target } => {
            let api = Arc::new(HttpApi::new(server_url(server, &config)));
            shell::run(api, &target).await
        }
    }
}

/// Explicit URL, else the port a running server recorded, else the
/// configured host and base port.
pub fn server_url(explicit: Option<&str>, config: &DashboardConfig) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }
    let host = local_host(&config.host);
    let port = read_port_file(&config.port_file_path()).unwrap_or(config.base_port);
    format!("http://{host}:{port}")
}

fn read_port_file(path: &Path) -> Option<u16> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn local_host(host: &str) -> &str {
    match host {
        "" | "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    }
}
