//! Shell controller against the scripted server.

mod common;

use common::FakeApi;
use std::sync::Arc;
use tfd_client::ShellController;
use tfd_protocol::shell_models::ShellMessage;

fn line(text: &str) -> ShellMessage {
    ShellMessage::Line(text.to_string())
}

#[tokio::test]
async fn test_open_replaces_previous_session() {
    let api = Arc::new(FakeApi::new());
    let mut controller = ShellController::new(api.clone());

    let first = controller.open("0123456789abcdef").await.unwrap();
    let second = controller.open("fedcba9876543210").await.unwrap();

    assert_ne!(first, second);
    assert_eq!(api.closed_shells(), vec![first]);
    let active = controller.active().unwrap();
    assert_eq!(active.session_id, second);
    assert_eq!(active.target, "fedcba9876543210");
}

#[tokio::test]
async fn test_send_line_trims_and_skips_blank() {
    let api = Arc::new(FakeApi::new());
    let mut controller = ShellController::new(api.clone());

    assert!(!controller.send_line("ls").await.unwrap());

    let session = controller.open("abc").await.unwrap();
    assert!(!controller.send_line("   ").await.unwrap());
    assert!(controller.send_line("  ls -la \n").await.unwrap());

    assert_eq!(api.shell_inputs(), vec![(session, "ls -la\n".to_string())]);
}

#[tokio::test]
async fn test_close_message_ends_session() {
    let api = Arc::new(FakeApi::new());
    api.set_shell_output(vec![line("connected"), line("$ "), ShellMessage::Close]);
    let mut controller = ShellController::new(api.clone());
    controller.open("abc").await.unwrap();

    let mut received = Vec::new();
    while let Some(message) = controller.next_message().await {
        received.push(message.unwrap());
    }

    assert_eq!(
        received,
        vec![line("connected"), line("$ "), ShellMessage::Close]
    );
    assert!(controller.active().is_none());
    assert!(!controller.send_line("ls").await.unwrap());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let api = Arc::new(FakeApi::new());
    let mut controller = ShellController::new(api.clone());
    let session = controller.open("abc").await.unwrap();

    controller.close().await;
    controller.close().await;

    assert_eq!(api.closed_shells(), vec![session]);
    assert!(controller.next_message().await.is_none());
}
