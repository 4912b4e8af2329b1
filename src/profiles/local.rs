//! Local overrides - personal settings at .netpin/profile.local.json

use super::error::{ProfileError, ProfileResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the per-developer override, next to settings.toml
pub const LOCAL_OVERRIDES_FILE: &str = "profile.local.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LocalOverrides {
    /// Preferred profile when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl LocalOverrides {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load overrides; a missing file means no overrides
    pub fn load(path: &Path) -> ProfileResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ProfileError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
