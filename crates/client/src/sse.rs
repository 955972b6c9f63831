//! Incremental Server-Sent Events decoding for shell streams.
//!
//! Only the fields the shell stream uses are interpreted: `event` and
//! `data`. Comment lines (keep-alives) and unknown fields are ignored.

use tfd_protocol::shell_models::{ShellMessage, SHELL_CLOSE_EVENT};

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns every message completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ShellMessage> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if matches!(line.last(), Some(b'\r')) {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(message) = self.process_line(&line) {
                messages.push(message);
            }
        }
        messages
    }

    fn process_line(&mut self, line: &str) -> Option<ShellMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<ShellMessage> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);

        if event.as_deref() == Some(SHELL_CLOSE_EVENT) {
            return Some(ShellMessage::Close);
        }
        if data.is_empty() {
            return None;
        }
        Some(ShellMessage::Line(data.join("\n")))
    }
}
