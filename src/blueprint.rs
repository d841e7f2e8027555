//! Blueprint parsing and representation.
//!
//! A blueprint is a YAML file listing the Firebase projects to provision.
//! Each entry maps onto one `firebase_project` module invocation.
//!
//! ```yaml
//! version: "1"
//! projects:
//!   - project_id: acme-prod
//!     name: Acme Production
//!     billing_account: 01AB23-CD45EF-67GH89
//!     labels:
//!       team: infra
//!     web_apps:
//!       - frontend
//!     custom_domains:
//!       frontend:
//!         - acme.example
//! ```

use crate::error::{Error, Result};
use crate::modules::ModuleParams;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A provisioning blueprint: the full set of projects to stand up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    /// Blueprint format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Projects to provision, in order
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

/// One project in a blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Project id (unique, immutable)
    pub project_id: String,

    /// Display name (defaults to the project id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Desired state: present or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Billing account to attach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_account: Option<String>,

    /// Parent organization id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// Parent folder id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    /// Labels as key-value pairs
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, String>,

    /// Additional services to enable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activate_apis: Vec<String>,

    /// Mapping of role to member list
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub iam: IndexMap<String, Vec<String>>,

    /// Web apps to register
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_apps: Vec<String>,

    /// Mapping of app name to custom domains
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_domains: IndexMap<String, Vec<String>>,
}

impl Blueprint {
    /// Load a blueprint from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::BlueprintParse {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;

        let blueprint: Blueprint =
            serde_yaml::from_str(&content).map_err(|e| Error::BlueprintParse {
                path: path.to_path_buf(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        blueprint.validate()?;
        Ok(blueprint)
    }

    /// Parse a blueprint from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let blueprint: Blueprint =
            serde_yaml::from_str(content).map_err(|e| Error::BlueprintParse {
                path: "<inline>".into(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        blueprint.validate()?;
        Ok(blueprint)
    }

    /// Validate blueprint structure: project ids must be set and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.projects {
            if entry.project_id.is_empty() {
                return Err(Error::BlueprintValidation(
                    "project_id must not be empty".to_string(),
                ));
            }
            if !seen.insert(entry.project_id.as_str()) {
                return Err(Error::BlueprintValidation(format!(
                    "duplicate project_id '{}'",
                    entry.project_id
                )));
            }
        }
        Ok(())
    }
}

impl ProjectEntry {
    /// Convert this entry into `firebase_project` module parameters.
    pub fn to_params(&self) -> ModuleParams {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            // A struct always serializes to an object; anything else means
            // the entry is unrepresentable and gets an empty parameter set.
            _ => ModuleParams::new(),
        }
    }
}
