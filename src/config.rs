//! Configuration module for netpin.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.netpin/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the binary)
//!
//! Profiles themselves live in a separate profiles file; see
//! [`crate::profiles::store`].
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `NETPIN_` and use double
//! underscores to separate nested levels:
//! - `NETPIN_PROFILE=staging` sets `profile`
//! - `NETPIN_PROBE__TIMEOUT_MS=500` sets `probe.timeout_ms`
//! - `NETPIN_LOG_LEVEL=debug` sets `log_level`

use crate::profiles::error::{ProfileError, ProfileResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding settings, profiles and local overrides
pub const CONFIG_DIR: &str = ".netpin";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Path to the profiles file (.toml or .json)
    #[serde(default = "default_profiles_path")]
    pub profiles_path: PathBuf,

    /// Preferred profile when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Log filter used when neither --log-level nor RUST_LOG is set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Workspace root directory (where .netpin is located)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Installed-compiler query settings
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProbeConfig {
    /// Upper bound on a compiler version query in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Per-compiler version command, e.g. `solc = ["solcjs", "--version"]`
    #[serde(default)]
    pub commands: HashMap<String, Vec<String>>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_profiles_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("profiles.toml")
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            profiles_path: default_profiles_path(),
            profile: None,
            log_level: default_log_level(),
            workspace_root: None,
            probe: ProbeConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            commands: HashMap::new(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings.anchor_paths();
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nesting; single underscores stay
            .merge(Env::prefixed("NETPIN_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Resolve a relative profiles path against the workspace root
    fn anchor_paths(&mut self) {
        if let Some(root) = &self.workspace_root {
            if self.profiles_path.is_relative() {
                self.profiles_path = root.join(&self.profiles_path);
            }
        }
    }

    /// Find settings.toml by walking up from the current directory
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .netpin is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Local override file for this workspace
    pub fn local_overrides_path(&self) -> PathBuf {
        let dir = match &self.workspace_root {
            Some(root) => root.join(CONFIG_DIR),
            None => PathBuf::from(CONFIG_DIR),
        };
        dir.join(crate::profiles::local::LOCAL_OVERRIDES_FILE)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Write a commented settings.toml under `dir`
    pub fn init_config_file(dir: &Path, force: bool) -> ProfileResult<PathBuf> {
        let config_path = dir.join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err(ProfileError::AlreadyExists { path: config_path });
        }

        let write_err = |source| ProfileError::Write {
            path: config_path.clone(),
            source,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let template = format!(
            r#"# netpin configuration file

# Version of the configuration schema
version = 1

# Profiles file (.toml or .json), relative to the workspace root
profiles_path = "{CONFIG_DIR}/profiles.toml"

# Preferred profile when none is given on the command line.
# Personal choices belong in {CONFIG_DIR}/profile.local.json instead.
# profile = "development"

# Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "warn"

[probe]
# How long to wait for a compiler to report its version, in milliseconds
timeout_ms = {}

# Command used to ask a compiler for its version.
# Defaults to "<compiler> --version".
[probe.commands]
# solc = ["solcjs", "--version"]
"#,
            default_timeout_ms()
        );

        std::fs::write(&config_path, template).map_err(write_err)?;
        Ok(config_path)
    }
}
