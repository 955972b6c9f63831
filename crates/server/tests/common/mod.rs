//! Shared fixtures for route tests: a fake compose CLI, a temp compose
//! config directory and request helpers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tfd_core::config::DashboardConfig;
use tfd_server::{router, AppState};
use tower::ServiceExt;

/// Stand-in for the compose CLI: echoes its arguments, fails `select bad`,
/// prints a deployment marker for `up`, and runs an echo loop for `shell`.
const FAKE_COMPOSE: &str = r#"#!/bin/sh
case "$1" in
  select)
    if [ "$2" = "bad" ]; then echo "deployment bad not found" >&2; exit 1; fi
    echo "selected $2"
    ;;
  address)
    echo "Web: http://10.1.3.2"
    ;;
  up)
    echo "Deploying $2"
    echo "Registered deployment: 0123456789abcdef"
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

const SCHEMA: &str = r#"{
  "version": 1,
  "commands": [
    {
      "command": "logs",
      "args": [{"name": "app", "required": true}],
      "flags": [
        {"name": "follow", "type": "boolean"},
        {"name": "tail", "type": "string"}
      ]
    },
    {"id": "ps", "command": "list"}
  ]
}"#;

pub struct TestServer {
    pub app: Router,
    pub dir: TempDir,
}

impl TestServer {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        let compose = root.join("fake-compose");
        std::fs::write(&compose, FAKE_COMPOSE).expect("Failed to write fake compose");
        let mut perms = std::fs::metadata(&compose)
            .expect("Failed to stat fake compose")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&compose, perms).expect("Failed to chmod fake compose");

        std::fs::write(root.join("commands-schema.json"), SCHEMA).expect("Failed to write schema");
        write_state_files(root);

        let config = DashboardConfig {
            compose_bin: compose.display().to_string(),
            home_dir: root.to_path_buf(),
            config_dir: root.to_path_buf(),
            shell_args: vec!["shell".to_string(), "{target}".to_string()],
            ..DashboardConfig::default()
        };

        let app = router(AppState::from_config(&config), None);
        Self { app, dir }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Poll a job until it is no longer running.
    pub async fn wait_job(&self, job_id: &str) -> Value {
        for _ in 0..400 {
            let (status, job) = self.get(&format!("/api/jobs/{job_id}")).await;
            assert_eq!(status, StatusCode::OK);
            if job["status"] != "running" {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("job {job_id} did not finish");
    }
}

fn write_state_files(root: &Path) {
    std::fs::create_dir_all(root.join("registry")).expect("Failed to create registry dir");
    std::fs::write(
        root.join("registry/apps.yaml"),
        "apps:\n  official:\n    - name: wordpress\n  community:\n    - name: gitea\n",
    )
    .expect("Failed to write apps.yaml");
    std::fs::write(
        root.join("deployments.yaml"),
        "deployments:\n  0123456789abcdef:\n    app_name: wordpress\n    vm_ip: 10.1.3.2\n",
    )
    .expect("Failed to write deployments.yaml");
    std::fs::write(
        root.join("preferences.yaml"),
        "whitelist:\n  farms: [1]\n",
    )
    .expect("Failed to write preferences.yaml");
}

/// Concatenated log text of a job snapshot.
pub fn log_text(job: &Value) -> String {
    job["logs"]
        .as_array()
        .map(|chunks| chunks.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
