//! Stored cloud profile for the CLI.
//!
//! The profile holds the safe-to-ship remote endpoint/key plus the signed-in
//! account; environment variables override individual fields at runtime.

use std::path::{Path, PathBuf};

use morel_core::quota::Tier;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub remote_key: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tier: Option<Tier>,
}

impl Profile {
    /// Default profile location under the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("morel")
            .join("profile.json")
    }

    /// Load a profile; a missing file yields the default (empty) profile.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the profile, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
