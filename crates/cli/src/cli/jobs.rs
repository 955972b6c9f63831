//! Job subcommands: following a started job and managing the tracked set.

use color_eyre::eyre::{bail, eyre, Result};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tfd_client::{
    DashboardApi, FileStore, HttpApi, JobSupervisor, JobTracker, PollState, ServerViews,
    SharedTracker, TrackedJob,
};
use tfd_core::config::DashboardConfig;
use tfd_protocol::job_models::JobStatus;
use tracing::{debug, info};
use uuid::Uuid;

use super::{output, server_url};

const REFRESH: Duration = Duration::from_millis(250);

/// Supervisor over the persisted job snapshot, with deployments reloaded
/// whenever a followed job finishes.
pub struct Operator {
    pub supervisor: JobSupervisor,
    pub views: Arc<ServerViews>,
}

impl Operator {
    pub fn connect(config: &DashboardConfig, server: Option<&str>) -> Self {
        let url = server_url(server, config);
        let snapshot_dir = config.jobs_snapshot_dir();
        debug!(%url, snapshot_dir = %snapshot_dir.display(), "connecting to dashboard");

        let api = Arc::new(HttpApi::new(url));
        let views = Arc::new(ServerViews::new(api.clone()));
        let tracker = JobTracker::restore(Arc::new(FileStore::new(snapshot_dir)));
        let supervisor = JobSupervisor::new(api, tracker, views.clone());
        Self { supervisor, views }
    }

    /// Print the job header, then either return (`detach`) or follow the
    /// job to the end. A finished job prints the refreshed row of
    /// `deployment`, or of the deployment its output named.
    pub async fn finish(
        &self,
        job_id: Uuid,
        detach: bool,
        deployment: Option<&str>,
    ) -> Result<()> {
        let tracker = self.supervisor.tracker();
        if let Some(display) = tracker.lock().await.view(job_id) {
            eprintln!("{}", output::header(&display));
        }
        if detach {
            println!("{job_id}");
            return Ok(());
        }

        let state = follow(&self.supervisor, &tracker, job_id).await?;
        info!(%job_id, ?state, "stopped following job");

        match state {
            Some(PollState::Terminal(JobStatus::Failed)) => Err(eyre!("Job {job_id} failed")),
            Some(PollState::Terminal(status)) => {
                eprintln!("{} {}", "Job finished:".bold(), output::status(status));
                let scraped = tracker
                    .lock()
                    .await
                    .get(job_id)
                    .and_then(|job| job.deployment_id.clone());
                if let Some(row) = deployment
                    .or(scraped.as_deref())
                    .and_then(|id| self.views.deployment(id))
                {
                    println!("{}", output::deployment_row(&row));
                }
                Ok(())
            }
            Some(PollState::Errored(message)) => Err(eyre!(message)),
            Some(PollState::Polling | PollState::Closed) | None => Ok(()),
        }
    }
}

async fn follow(
    supervisor: &JobSupervisor,
    tracker: &SharedTracker,
    job_id: Uuid,
) -> Result<Option<PollState>> {
    let wait = supervisor.wait(job_id);
    tokio::pin!(wait);
    let mut ticker = tokio::time::interval(REFRESH);
    let mut printed = String::new();

    let state = loop {
        tokio::select! {
            state = &mut wait => break state,
            _ = ticker.tick() => print_new_output(tracker, job_id, &mut printed).await?,
        }
    };
    print_new_output(tracker, job_id, &mut printed).await?;
    Ok(state)
}

async fn print_new_output(
    tracker: &SharedTracker,
    job_id: Uuid,
    printed: &mut String,
) -> Result<()> {
    let current = match tracker.lock().await.get(job_id) {
        Some(job) => job.logs.concat(),
        None => return Ok(()),
    };
    let unseen = output::unseen(printed, &current);
    if unseen.is_empty() {
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    if unseen.len() == current.len() && !printed.is_empty() && !printed.ends_with('\n') {
        writeln!(stdout)?;
    }
    stdout.write_all(unseen.as_bytes())?;
    stdout.flush()?;
    *printed = current;
    Ok(())
}

/// Reconcile restored jobs with the server, apply `--close`/`--clear`,
/// then list what remains.
pub async fn manage(supervisor: &JobSupervisor, close: Option<&str>, clear: bool) -> Result<()> {
    let report = supervisor.rehydrate().await;
    for job_id in &report.dropped {
        eprintln!("{} {job_id}", "Dropped job unknown to the server:".dimmed());
    }

    let tracker = supervisor.tracker();
    let mut tracker = tracker.lock().await;

    if clear {
        tracker.clear();
        info!("cleared tracked jobs");
    } else if let Some(selector) = close {
        let job_id = resolve_job(&tracker.list_ordered(), selector)?;
        tracker.close_job(job_id);
        info!(%job_id, "stopped tracking job");
    }

    if tracker.is_empty() {
        println!("No tracked jobs");
        return Ok(());
    }
    let focused = tracker.focused();
    for job in tracker.list_ordered() {
        println!("{}", output::job_row(job, focused == Some(job.id)));
    }
    Ok(())
}

/// A display index or a full job id.
fn resolve_job(jobs: &[&TrackedJob], selector: &str) -> Result<Uuid> {
    let found = match selector.parse::<u64>() {
        Ok(index) => jobs.iter().find(|job| job.index == index),
        Err(_) => {
            let id: Uuid = selector
                .parse()
                .map_err(|_| eyre!("`{selector}` is neither a job index nor a job id"))?;
            jobs.iter().find(|job| job.id == id)
        }
    };
    match found {
        Some(job) => Ok(job.id),
        None => bail!("No tracked job `{selector}`"),
    }
}

/// Every job the server knows, oldest first.
pub async fn list_server_jobs(api: &dyn DashboardApi) -> Result<()> {
    let jobs = api.list_jobs().await?;
    if jobs.is_empty() {
        println!("No jobs on the server");
        return Ok(());
    }
    for job in &jobs {
        println!("{}", output::server_job_row(job));
    }
    Ok(())
}

pub async fn list_deployments(api: &HttpApi) -> Result<()> {
    let deployments = api.list_deployments().await?;
    if deployments.is_empty() {
        println!("No deployments");
        return Ok(());
    }
    for deployment in &deployments {
        println!("{}", output::deployment_row(deployment));
    }
    Ok(())
}
