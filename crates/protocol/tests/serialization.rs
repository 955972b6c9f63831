use chrono::Utc;
use tfd_protocol::*;
use uuid::Uuid;

#[test]
fn test_job_status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&JobStatus::Running).unwrap(), "\"running\"");
    assert_eq!(serde_json::to_string(&JobStatus::Completed).unwrap(), "\"completed\"");
    assert_eq!(serde_json::to_string(&JobStatus::Failed).unwrap(), "\"failed\"");

    let status: JobStatus = serde_json::from_str("\"failed\"").unwrap();
    assert_eq!(status, JobStatus::Failed);
}

#[test]
fn test_job_status_terminality() {
    assert!(!JobStatus::Running.is_terminal());
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}

#[test]
fn test_job_view_wire_shape() {
    let view = JobView {
        id: Uuid::nil(),
        status: JobStatus::Running,
        command: "tfgrid-compose up tfgrid-ai-agent".to_string(),
        created_at: Utc::now(),
        completed_at: None,
        exit_code: None,
        deployment_id: None,
        logs: vec!["Deploying...\n".to_string(), "Step 1\n".to_string()],
    };

    let json: serde_json::Value = serde_json::to_value(&view).unwrap();
    assert_eq!(json["status"], "running");
    assert_eq!(json["exit_code"], serde_json::Value::Null);
    assert_eq!(json["completed_at"], serde_json::Value::Null);
    assert_eq!(json["logs"].as_array().map(Vec::len), Some(2));
    assert_eq!(view.log_text(), "Deploying...\nStep 1\n");
}

#[test]
fn test_start_job_response_from_view() {
    let view = JobView {
        id: Uuid::new_v4(),
        status: JobStatus::Running,
        command: "echo hello".to_string(),
        created_at: Utc::now(),
        completed_at: None,
        exit_code: None,
        deployment_id: None,
        logs: Vec::new(),
    };

    let response = StartJobResponse::from(&view);
    assert_eq!(response.job_id, view.id);
    assert_eq!(response.status, JobStatus::Running);
    assert_eq!(response.command, "echo hello");
}

#[test]
fn test_shell_message_tagging() {
    let line = serde_json::to_value(ShellMessage::Line("total 0".to_string())).unwrap();
    assert_eq!(line["type"], "line");
    assert_eq!(line["payload"], "total 0");

    let close = serde_json::to_value(ShellMessage::Close).unwrap();
    assert_eq!(close["type"], "close");
}

#[test]
fn test_commands_schema_normalizes_legacy_ids() {
    let json = r#"{
        "version": 1,
        "commands": [
            {"id": "status:app", "command": "status", "args": [{"name": "app", "required": true}]},
            {"command": "up", "label": "Deploy", "args": [{"name": "app"}],
             "flags": [{"name": "verbose", "type": "boolean"}, {"name": "node"}]}
        ]
    }"#;

    let mut schema: CommandsSchema = serde_json::from_str(json).unwrap();
    schema.normalize();

    let status = schema.find("status:app").expect("status:app present");
    assert_eq!(status.command, "status");
    assert!(status.args[0].required);

    let up = schema.find("up").expect("legacy command keyed by its command name");
    assert_eq!(up.display_name(), "Deploy");
    assert!(up.flags[0].is_boolean());
    assert!(!up.flags[1].is_boolean());
    assert_eq!(up.flags[1].kind, "string");
}

#[test]
fn test_command_request_accepts_both_id_keys() {
    let by_id: CommandRequest =
        serde_json::from_str(r#"{"commandId": "up", "args": {"app": "wordpress"}}"#).unwrap();
    let by_command: CommandRequest =
        serde_json::from_str(r#"{"command": "up", "args": {"app": "wordpress"}}"#).unwrap();

    assert_eq!(by_id.command_id, "up");
    assert_eq!(by_id, by_command);
    assert!(by_id.flags.is_empty());
}

#[test]
fn test_deployment_accepts_numeric_scalars() {
    let yaml = r#"
id: 0123456789abcdef
app_name: tfgrid-ai-agent
vm_ip: 10.1.3.2
contract_id: 412345
status: active
"#;

    let deployment: Deployment = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(deployment.app_name.as_deref(), Some("tfgrid-ai-agent"));
    assert_eq!(deployment.contract_id.as_deref(), Some("412345"));
    assert_eq!(deployment.mycelium_ip, None);
    assert_eq!(deployment.created_at, None);
}

#[test]
fn test_project_action_round_trips_through_str() {
    for action in [ProjectAction::Create, ProjectAction::Run, ProjectAction::Publish] {
        let parsed: ProjectAction = action.as_str().parse().unwrap();
        assert_eq!(parsed, action);
    }
    assert!("destroy".parse::<ProjectAction>().is_err());
    assert_eq!(ProjectAction::Publish.label(), "Publish");
}

#[test]
fn test_deploy_request_missing_app_name() {
    let request: DeployRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(request.app_name, None);

    let request: DeployRequest = serde_json::from_str(r#"{"appName": "wordpress"}"#).unwrap();
    assert_eq!(request.app_name.as_deref(), Some("wordpress"));
}

#[test]
fn test_jobs_snapshot_tolerates_sparse_entries() {
    let id = Uuid::new_v4();
    let json = format!(r#"{{"activeJobId": "{id}", "jobs": [{{"id": "{id}"}}]}}"#);

    let snapshot: JobsSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.active_job_id, Some(id));
    assert_eq!(snapshot.jobs[0].index, 0);
    assert_eq!(snapshot.jobs[0].title, "Job");
    assert_eq!(snapshot.jobs[0].status, JobStatus::Running);
}

#[test]
fn test_jobs_snapshot_rejects_missing_job_list() {
    let parsed = serde_json::from_str::<JobsSnapshot>(r#"{"activeJobId": null}"#);
    assert!(parsed.is_err());
}

#[test]
fn test_preferences_default_to_empty_objects() {
    let prefs: PreferencesResponse = serde_json::from_str("{}").unwrap();
    assert!(prefs.whitelist.as_object().is_some_and(|m| m.is_empty()));
    assert_eq!(prefs, PreferencesResponse::default());
}
