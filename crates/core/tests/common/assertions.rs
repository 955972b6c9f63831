//! Polling assertions.

use std::time::Duration;
use tfd_core::jobs::JobRegistry;
use tfd_core::shell::Viewer;
use tfd_protocol::job_models::JobView;
use tfd_protocol::shell_models::ShellMessage;
use uuid::Uuid;

/// Poll a job until it reaches a terminal status.
pub async fn wait_terminal(registry: &JobRegistry, id: Uuid) -> JobView {
    for _ in 0..400 {
        let view = registry.get_job(id).await.expect("job should exist");
        if view.status.is_terminal() {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {id} did not reach a terminal status");
}

/// Receive the next viewer message, failing after a few seconds.
pub async fn next_message(viewer: &mut Viewer) -> Option<ShellMessage> {
    tokio::time::timeout(Duration::from_secs(5), viewer.recv())
        .await
        .expect("timed out waiting for a shell message")
}

/// Receive lines until one equals `expected`. Returns everything seen.
#[allow(dead_code)]
pub async fn wait_for_line(viewer: &mut Viewer, expected: &str) -> Vec<ShellMessage> {
    let mut seen = Vec::new();
    loop {
        match next_message(viewer).await {
            Some(ShellMessage::Line(line)) => {
                let done = line == expected;
                seen.push(ShellMessage::Line(line));
                if done {
                    return seen;
                }
            }
            other => panic!("expected line {expected:?}, got {other:?} after {seen:?}"),
        }
    }
}

/// Assert `earlier` is a prefix of `later`.
#[allow(dead_code)]
pub fn assert_prefix(earlier: &[String], later: &[String]) {
    assert!(
        earlier.len() <= later.len() && later[..earlier.len()] == *earlier,
        "log {earlier:?} is not a prefix of {later:?}"
    );
}
