//! Read-only access to the compose CLI's YAML state files.
//!
//! Layout under the compose config directory:
//! - `registry/apps.yaml`: published apps, split into official and community
//! - `deployments.yaml`: deployments keyed by id
//! - `preferences.yaml`: node placement preferences
//!
//! A missing file is an empty result. Files are re-read on every call since
//! the CLI rewrites them as deployments come and go.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tfd_protocol::deployment_models::{AppEntry, Deployment, PreferencesResponse};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    apps: RegistryApps,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryApps {
    #[serde(default)]
    official: Vec<AppEntry>,

    #[serde(default)]
    community: Vec<AppEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct DeploymentsDocument {
    #[serde(default)]
    deployments: serde_yaml::Mapping,
}

#[derive(Debug, Clone)]
pub struct DeploymentStore {
    config_dir: PathBuf,
}

impl DeploymentStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn apps_path(&self) -> PathBuf {
        self.config_dir.join("registry").join("apps.yaml")
    }

    pub fn deployments_path(&self) -> PathBuf {
        self.config_dir.join("deployments.yaml")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join("preferences.yaml")
    }

    /// Official apps followed by community apps.
    pub fn apps(&self) -> StoreResult<Vec<AppEntry>> {
        let Some(doc) = read_yaml::<RegistryDocument>(&self.apps_path())? else {
            return Ok(Vec::new());
        };
        let RegistryApps {
            mut official,
            community,
        } = doc.apps;
        official.extend(community);
        Ok(official)
    }

    /// All deployments in file order.
    pub fn deployments(&self) -> StoreResult<Vec<Deployment>> {
        let path = self.deployments_path();
        let Some(doc) = read_yaml::<DeploymentsDocument>(&path)? else {
            return Ok(Vec::new());
        };

        let mut deployments = Vec::with_capacity(doc.deployments.len());
        for (key, value) in doc.deployments {
            let Some(id) = key_text(&key) else {
                continue;
            };
            let mut deployment = if value.is_null() {
                Deployment::default()
            } else {
                serde_yaml::from_value::<Deployment>(value).map_err(|source| {
                    StoreError::YamlParse {
                        path: path.clone(),
                        source,
                    }
                })?
            };
            deployment.id = id;
            deployments.push(deployment);
        }
        Ok(deployments)
    }

    pub fn deployment(&self, id: &str) -> StoreResult<Option<Deployment>> {
        Ok(self.deployments()?.into_iter().find(|d| d.id == id))
    }

    pub fn preferences(&self) -> StoreResult<PreferencesResponse> {
        Ok(read_yaml::<PreferencesResponse>(&self.preferences_path())?.unwrap_or_default())
    }
}

fn key_text(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `Ok(None)` for a missing or blank file.
fn read_yaml<T>(path: &Path) -> StoreResult<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::YamlParse {
            path: path.to_path_buf(),
            source,
        })
}
