//! Loading and caching of the compose CLI's `commands-schema.json`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tfd_protocol::command_models::{CommandDef, CommandsSchema};
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};

/// Lazily loaded command schema.
///
/// The file is read once, on first use. A missing or malformed file yields
/// an empty schema for the lifetime of the catalog.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    path: PathBuf,
    schema: Arc<OnceLock<CommandsSchema>>,
}

impl CommandCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema: Arc::new(OnceLock::new()),
        }
    }

    /// A catalog backed by an in-memory schema instead of a file.
    pub fn from_schema(mut schema: CommandsSchema) -> Self {
        schema.normalize();
        let cell = OnceLock::new();
        let _ = cell.set(schema);
        Self {
            path: PathBuf::new(),
            schema: Arc::new(cell),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &CommandsSchema {
        self.schema.get_or_init(|| match load_schema(&self.path) {
            Ok(schema) => {
                info!(
                    path = %self.path.display(),
                    commands = schema.commands.len(),
                    "loaded commands schema"
                );
                schema
            }
            Err(e) => {
                warn!(error = %e, "failed to load commands schema, using empty schema");
                CommandsSchema::default()
            }
        })
    }

    pub fn find(&self, id: &str) -> Option<&CommandDef> {
        self.schema().find(id)
    }
}

/// Read and normalize a schema file.
pub fn load_schema(path: &Path) -> StoreResult<CommandsSchema> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut schema: CommandsSchema =
        serde_json::from_str(&content).map_err(|source| StoreError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    schema.normalize();

    Ok(schema)
}
