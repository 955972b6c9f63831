//! End-to-end tests for shell sessions against real subprocesses.

mod common;

use common::*;
use std::time::Duration;
use tfd_core::RegistryError;
use tfd_protocol::shell_models::ShellMessage;

fn line(text: &str) -> ShellMessage {
    ShellMessage::Line(text.to_string())
}

#[tokio::test]
async fn test_open_attach_input_close() {
    let registry = echo_shell_registry();
    let session_id = registry.open_session("abc123").await;

    let mut viewer = registry.attach(session_id).await.unwrap();
    wait_for_line(&mut viewer, "connected to abc123").await;

    registry.send_input(session_id, "ls\n").await.unwrap();
    wait_for_line(&mut viewer, "ls").await;

    registry.close(session_id).await;
    assert_eq!(next_message(&mut viewer).await, Some(ShellMessage::Close));
    assert_eq!(next_message(&mut viewer).await, None);
    assert_eq!(registry.session_count().await, 0);
}

#[tokio::test]
async fn test_late_viewer_gets_replay_then_live() {
    let registry = echo_shell_registry();
    let session_id = registry.open_session("abc123").await;

    let mut early = registry.attach(session_id).await.unwrap();
    wait_for_line(&mut early, "connected to abc123").await;
    registry.send_input(session_id, "first\n").await.unwrap();
    wait_for_line(&mut early, "first").await;

    let mut late = registry.attach(session_id).await.unwrap();
    assert_eq!(
        next_message(&mut late).await,
        Some(line("connected to abc123"))
    );
    assert_eq!(next_message(&mut late).await, Some(line("first")));

    registry.send_input(session_id, "second\n").await.unwrap();
    assert_eq!(next_message(&mut late).await, Some(line("second")));
    assert_eq!(next_message(&mut early).await, Some(line("second")));

    registry.close(session_id).await;
}

#[tokio::test]
async fn test_attach_during_output_sees_every_line_once() {
    let registry = scripted_shell_registry(
        "i=0; while [ $i -lt 200 ]; do echo n$i; i=$((i+1)); done; sleep 0.5",
    );
    let session_id = registry.open_session("abc123").await;

    tokio::time::sleep(Duration::from_millis(5)).await;
    let mut viewer = registry.attach(session_id).await.unwrap();

    let mut received = Vec::new();
    while let Some(message) = next_message(&mut viewer).await {
        match message {
            ShellMessage::Line(text) => received.push(text),
            ShellMessage::Close => break,
        }
    }

    let expected: Vec<String> = (0..200).map(|i| format!("n{i}")).collect();
    let joined: String = received.concat();
    assert_eq!(joined, expected.concat());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let registry = echo_shell_registry();
    let session_id = registry.open_session("abc123").await;
    let mut viewer = registry.attach(session_id).await.unwrap();
    wait_for_line(&mut viewer, "connected to abc123").await;

    registry.close(session_id).await;
    registry.close(session_id).await;

    assert_eq!(next_message(&mut viewer).await, Some(ShellMessage::Close));
    assert_eq!(next_message(&mut viewer).await, None);
    assert!(matches!(
        registry.send_input(session_id, "ls\n").await,
        Err(RegistryError::SessionNotFound(_))
    ));
}

/// Wait until the session's subprocess has gone away.
async fn wait_closed(registry: &tfd_core::shell::ShellRegistry, session_id: uuid::Uuid) {
    for _ in 0..200 {
        match registry.session(session_id).await {
            Some(session) if !session.is_closed() => {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            _ => return,
        }
    }
    panic!("session {session_id} did not close");
}

#[tokio::test]
async fn test_unviewed_exit_is_kept_for_first_viewer() {
    let registry = scripted_shell_registry("echo bye from $0");
    let session_id = registry.open_session("abc123").await;
    wait_closed(&registry, session_id).await;
    assert_eq!(registry.session_count().await, 1);

    let mut viewer = registry.attach(session_id).await.unwrap();
    assert_eq!(next_message(&mut viewer).await, Some(line("bye from abc123")));
    assert_eq!(next_message(&mut viewer).await, Some(ShellMessage::Close));

    assert_eq!(registry.session_count().await, 0);
    assert!(matches!(
        registry.attach(session_id).await,
        Err(RegistryError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_fast_failing_shell_keeps_its_error_text() {
    let registry =
        scripted_shell_registry("echo \"ssh: Could not resolve hostname $0\" >&2; exit 255");
    let session_id = registry.open_session("abc123").await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut viewer = registry.attach(session_id).await.unwrap();
    assert_eq!(
        next_message(&mut viewer).await,
        Some(line("ssh: Could not resolve hostname abc123"))
    );
    assert_eq!(next_message(&mut viewer).await, Some(ShellMessage::Close));
}

#[tokio::test]
async fn test_viewed_session_is_removed_on_exit() {
    let registry = scripted_shell_registry("read line; echo bye");
    let session_id = registry.open_session("abc123").await;
    let mut viewer = registry.attach(session_id).await.unwrap();

    registry.send_input(session_id, "x\n").await.unwrap();
    assert_eq!(next_message(&mut viewer).await, Some(line("bye")));
    assert_eq!(next_message(&mut viewer).await, Some(ShellMessage::Close));

    for _ in 0..200 {
        if registry.session_count().await == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.session_count().await, 0);
}

#[tokio::test]
async fn test_viewer_sees_close_when_subprocess_exits() {
    let registry = scripted_shell_registry("read line; echo got $line");
    let session_id = registry.open_session("abc123").await;
    let mut viewer = registry.attach(session_id).await.unwrap();

    registry.send_input(session_id, "ping\n").await.unwrap();
    assert_eq!(next_message(&mut viewer).await, Some(line("got ping")));
    assert_eq!(next_message(&mut viewer).await, Some(ShellMessage::Close));
}

#[tokio::test]
async fn test_detached_viewer_stops_receiving() {
    let registry = echo_shell_registry();
    let session_id = registry.open_session("abc123").await;

    let mut kept = registry.attach(session_id).await.unwrap();
    let dropped = registry.attach(session_id).await.unwrap();
    wait_for_line(&mut kept, "connected to abc123").await;

    registry.detach(dropped);
    let session = registry.session(session_id).await.unwrap();
    assert_eq!(session.viewer_count(), 1);

    registry.send_input(session_id, "still here\n").await.unwrap();
    wait_for_line(&mut kept, "still here").await;

    registry.close(session_id).await;
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let registry = echo_shell_registry();
    let a = registry.open_session("aaaa").await;
    let b = registry.open_session("bbbb").await;

    let mut viewer_a = registry.attach(a).await.unwrap();
    let mut viewer_b = registry.attach(b).await.unwrap();
    wait_for_line(&mut viewer_a, "connected to aaaa").await;
    wait_for_line(&mut viewer_b, "connected to bbbb").await;

    registry.close(a).await;
    assert_eq!(next_message(&mut viewer_a).await, Some(ShellMessage::Close));

    registry.send_input(b, "alive\n").await.unwrap();
    wait_for_line(&mut viewer_b, "alive").await;
    registry.close(b).await;
}
