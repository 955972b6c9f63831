//! Terminal rendering of jobs.

use colored::Colorize;
use tfd_client::{JobDisplay, TrackedJob};
use tfd_protocol::deployment_models::Deployment;
use tfd_protocol::job_models::{JobStatus, JobView};

pub fn status(status: JobStatus) -> String {
    paint(status, status.as_str())
}

fn paint(status: JobStatus, text: &str) -> String {
    match status {
        JobStatus::Running => text.yellow().to_string(),
        JobStatus::Completed => text.green().to_string(),
        JobStatus::Failed => text.red().to_string(),
    }
}

pub fn header(display: &JobDisplay) -> String {
    format!(
        "{} {}\n{}",
        format!("#{}", display.index).bold(),
        display.title.bold(),
        display.subtitle.dimmed()
    )
}

/// One line of the `jobs` listing.
pub fn job_row(job: &TrackedJob, focused: bool) -> String {
    let marker = if focused { "*" } else { " " };
    let deployment = job
        .deployment_id
        .as_deref()
        .map(|id| format!("  {}", id.dimmed()))
        .unwrap_or_default();
    format!(
        "{marker} {:>3}  {}  {}  {}{deployment}",
        job.index,
        paint(job.status, &format!("{:<9}", job.status.as_str())),
        job.title,
        job.id.to_string().dimmed(),
    )
}

/// One line of the server-side job listing.
pub fn server_job_row(job: &JobView) -> String {
    format!(
        "{}  {}  {}  {}",
        job.created_at.format("%Y-%m-%d %H:%M:%S"),
        paint(job.status, &format!("{:<9}", job.status.as_str())),
        job.command,
        job.id.to_string().dimmed(),
    )
}

pub fn deployment_row(deployment: &Deployment) -> String {
    format!(
        "{}  {:<20}  {}",
        deployment.id.bold(),
        deployment.app_name.as_deref().unwrap_or("-"),
        deployment.vm_ip.as_deref().unwrap_or("-").dimmed(),
    )
}

/// The part of `current` not yet printed. When the log was replaced
/// rather than extended, all of it.
pub fn unseen<'a>(printed: &str, current: &'a str) -> &'a str {
    current.strip_prefix(printed).unwrap_or(current)
}
