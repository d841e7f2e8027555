//! Configuration module for Firelift
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - Project configuration (./firelift.toml)
//! - Environment variables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings applied to blueprint entries that leave them unset
    pub defaults: Defaults,

    /// Simulated resource layer settings
    pub simulation: SimulationConfig,
}

/// Default values merged into blueprint entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Billing account to attach when an entry has none
    pub billing_account: Option<String>,

    /// Parent organization id when an entry has none
    pub org_id: Option<String>,
}

/// Settings for the simulated GCP layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Artificial latency per provider call, in milliseconds
    pub latency_ms: u64,
}

impl Config {
    /// Load configuration: an explicit path, else `./firelift.toml` if it
    /// exists, else defaults. Environment variables win over the file.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new("firelift.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.merge_env();
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    fn merge_env(&mut self) {
        if let Ok(billing) = std::env::var("FIRELIFT_BILLING_ACCOUNT") {
            self.defaults.billing_account = Some(billing);
        }
        if let Ok(org) = std::env::var("FIRELIFT_ORG_ID") {
            self.defaults.org_id = Some(org);
        }
    }

    /// Fill unset fields of a blueprint entry from the configured defaults.
    pub fn apply_defaults(&self, entry: &mut crate::blueprint::ProjectEntry) {
        if entry.billing_account.is_none() {
            entry.billing_account = self.defaults.billing_account.clone();
        }
        if entry.org_id.is_none() && entry.folder_id.is_none() {
            entry.org_id = self.defaults.org_id.clone();
        }
    }
}
