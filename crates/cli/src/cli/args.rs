//! `--arg` / `--flag` parsing into a command request.

use color_eyre::eyre::{bail, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tfd_protocol::command_models::CommandRequest;

pub fn command_request(
    command_id: String,
    args: &[String],
    flags: &[String],
) -> Result<CommandRequest> {
    let mut request = CommandRequest {
        command_id,
        args: BTreeMap::new(),
        flags: BTreeMap::new(),
    };

    for raw in args {
        let Some((name, value)) = raw.split_once('=') else {
            bail!("Invalid --arg `{raw}`: expected NAME=VALUE");
        };
        request
            .args
            .insert(name.to_string(), Value::String(value.to_string()));
    }

    for raw in flags {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name, Value::String(value.to_string())),
            None => (raw.as_str(), Value::Bool(true)),
        };
        if name.is_empty() {
            bail!("Invalid --flag `{raw}`: missing name");
        }
        request.flags.insert(name.to_string(), value);
    }

    Ok(request)
}
