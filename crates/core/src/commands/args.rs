//! Translation of structured start requests into literal argument vectors.
//!
//! Nothing here goes through a shell: every token ends up as one element of
//! the vector handed to the process runner.

use serde_json::Value;
use tfd_protocol::command_models::{CommandDef, CommandRequest};

/// The command's own subcommand tokens, e.g. `"logs follow"` → `["logs", "follow"]`.
pub fn command_tokens(def: &CommandDef) -> Vec<String> {
    def.command.split_whitespace().map(str::to_string).collect()
}

/// Build the full argument vector for a schema command.
///
/// Order: subcommand tokens, then positional arguments in declared order,
/// then flags in declared order. Missing, `null` or empty positional values
/// are skipped and left for the CLI to validate. Boolean flags become a
/// bare `--name` only when the value is `true`; other flags become
/// `--name=value` only when the value is non-empty. Values for names the
/// schema does not declare are ignored.
pub fn build_cli_args(def: &CommandDef, request: &CommandRequest) -> Vec<String> {
    let mut cli_args = command_tokens(def);

    for arg in &def.args {
        if let Some(value) = request.args.get(&arg.name).and_then(value_text) {
            cli_args.push(value);
        }
    }

    for flag in &def.flags {
        let value = request.flags.get(&flag.name);
        if flag.is_boolean() {
            if matches!(value, Some(Value::Bool(true))) {
                cli_args.push(format!("--{}", flag.name));
            }
        } else if let Some(value) = value.and_then(value_text) {
            cli_args.push(format!("--{}={}", flag.name, value));
        }
    }

    cli_args
}

/// Split an operator-typed line on whitespace. No quoting or escaping.
pub fn tokenize_direct_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
