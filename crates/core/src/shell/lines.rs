//! Chunk-to-line splitting for viewer events.
//!
//! Splitting is per chunk: a line that arrives across two reads is
//! delivered as two fragments. Terminal display tolerates this.

/// Split one raw output chunk into viewer lines.
///
/// A single trailing newline does not produce an empty final line, and a
/// carriage return before a newline is dropped. A chunk without a trailing
/// newline yields its tail as a partial line.
pub fn split_lines(chunk: &str) -> Vec<String> {
    if chunk.is_empty() {
        return Vec::new();
    }
    let body = chunk.strip_suffix('\n').unwrap_or(chunk);
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
