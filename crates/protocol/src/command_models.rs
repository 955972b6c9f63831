//! Declarative CLI command schema and structured start requests.
//!
//! The schema is owned by the compose CLI and loaded from
//! `commands-schema.json`. The dashboard only uses it to turn a structured
//! request into an argument vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Top-level document of `commands-schema.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct CommandsSchema {
    #[serde(default = "default_schema_version")]
    pub version: u32,

    #[serde(default)]
    pub commands: Vec<CommandDef>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for CommandsSchema {
    fn default() -> Self {
        Self {
            version: default_schema_version(),
            commands: Vec::new(),
        }
    }
}

impl CommandsSchema {
    /// Give every command a canonical `id`.
    ///
    /// Older schema files only carry `command`; after this call `id` is
    /// always populated and is the single key used for lookups.
    pub fn normalize(&mut self) {
        for def in &mut self.commands {
            if def.id.trim().is_empty() {
                def.id = def.command.clone();
            }
        }
    }

    /// Find a command by its canonical id.
    pub fn find(&self, id: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|def| def.id == id)
    }
}

/// One command the dashboard can start.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct CommandDef {
    /// Canonical identifier. Filled from `command` by [`CommandsSchema::normalize`].
    #[serde(default)]
    pub id: String,

    /// Subcommand token(s) passed to the compose binary, e.g. `"up"`.
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Positional arguments in declared order.
    #[serde(default)]
    pub args: Vec<ArgDef>,

    #[serde(default)]
    pub flags: Vec<FlagDef>,
}

impl CommandDef {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.command)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ArgDef {
    pub name: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct FlagDef {
    pub name: String,

    /// Value type as declared by the schema (`"boolean"`, `"string"`, ...).
    #[serde(rename = "type", default = "default_flag_type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_flag_type() -> String {
    "string".to_string()
}

impl FlagDef {
    pub fn is_boolean(&self) -> bool {
        self.kind == "boolean"
    }
}

/// Request body of `POST /api/commands/run`.
///
/// `commandId` may also arrive as `command`; both map to the same field.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(alias = "command")]
    pub command_id: String,

    #[serde(default)]
    pub args: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub flags: BTreeMap<String, serde_json::Value>,
}

/// Request body of `POST /api/commands/run-direct`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct DirectRunRequest {
    #[serde(default)]
    pub line: String,
}
