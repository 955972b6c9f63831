//! Read-only models for the app registry, deployment registry and
//! placement preferences kept by the compose CLI.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// An application published in the registry (`registry/apps.yaml`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AppEntry {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub maintainer: Option<String>,
}

/// A deployment recorded in `deployments.yaml`.
///
/// Scalar fields are accepted as strings or numbers since the CLI writes
/// contract ids unquoted.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct Deployment {
    #[serde(default)]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub app_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub vm_ip: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub mycelium_ip: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|scalar| match scalar {
        Scalar::Text(s) if s.is_empty() => None,
        Scalar::Text(s) => Some(s),
        Scalar::Int(n) => Some(n.to_string()),
        Scalar::Float(n) => Some(n.to_string()),
        Scalar::Bool(b) => Some(b.to_string()),
    }))
}

/// Project-level action that runs against a selected deployment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum ProjectAction {
    Create,
    Run,
    Publish,
}

impl ProjectAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectAction::Create => "create",
            ProjectAction::Run => "run",
            ProjectAction::Publish => "publish",
        }
    }

    /// Capitalised verb used in job titles.
    pub fn label(self) -> &'static str {
        match self {
            ProjectAction::Create => "Create",
            ProjectAction::Run => "Run",
            ProjectAction::Publish => "Publish",
        }
    }
}

impl fmt::Display for ProjectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ProjectAction::Create),
            "run" => Ok(ProjectAction::Run),
            "publish" => Ok(ProjectAction::Publish),
            other => Err(format!("unknown project action: {other}")),
        }
    }
}

/// Request body of `POST /api/deployments`.
///
/// `app_name` is optional on the wire so a missing value yields a 400 with a
/// readable message rather than a deserialization rejection.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    #[serde(default)]
    pub app_name: Option<String>,
}

/// Request body of `POST /api/deployments/:id/{create,run,publish}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProjectActionRequest {
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct AppsResponse {
    pub apps: Vec<AppEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct DeploymentsResponse {
    pub deployments: Vec<Deployment>,
}

#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct DeploymentResponse {
    pub deployment: Deployment,
}

/// Response body of `GET /api/deployments/:id/address`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct AddressResponse {
    pub output: String,
    pub error: Option<String>,
}

/// Response body of `GET /api/preferences`. Contents are opaque to the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct PreferencesResponse {
    #[serde(default = "empty_object")]
    pub whitelist: serde_json::Value,

    #[serde(default = "empty_object")]
    pub blacklist: serde_json::Value,

    #[serde(default = "empty_object")]
    pub preferences: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for PreferencesResponse {
    fn default() -> Self {
        Self {
            whitelist: empty_object(),
            blacklist: empty_object(),
            preferences: empty_object(),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
