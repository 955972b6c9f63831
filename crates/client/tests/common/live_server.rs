//! A real dashboard server bound to an ephemeral local port.

use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;
use tfd_core::config::DashboardConfig;
use tfd_server::{router, AppState};
use tokio::net::TcpListener;

/// Fake compose CLI: prints a deployment marker for `up`, fails `down`,
/// echoes input lines for `shell`, and echoes its arguments otherwise.
const FAKE_COMPOSE: &str = r#"#!/bin/sh
case "$1" in
  up)
    echo "Deploying $2"
    echo "Registered deployment: 0123456789abcdef"
    ;;
  down)
    echo "cannot remove $2" >&2
    exit 3
    ;;
  shell)
    echo "connected to $2"
    while read line; do echo "got $line"; done
    ;;
  *)
    echo "$@"
    ;;
esac
"#;

pub struct LiveServer {
    pub base_url: String,
    pub dir: TempDir,
    task: tokio::task::JoinHandle<()>,
}

impl LiveServer {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let compose = dir.path().join("fake-compose");
        std::fs::write(&compose, FAKE_COMPOSE).expect("Failed to write fake compose");
        let mut perms = std::fs::metadata(&compose)
            .expect("Failed to stat fake compose")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&compose, perms).expect("Failed to chmod fake compose");

        let config = DashboardConfig {
            compose_bin: compose.display().to_string(),
            home_dir: dir.path().to_path_buf(),
            config_dir: dir.path().to_path_buf(),
            shell_args: vec!["shell".to_string(), "{target}".to_string()],
            ..DashboardConfig::default()
        };
        let app = router(AppState::from_config(&config), None);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            dir,
            task,
        }
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
