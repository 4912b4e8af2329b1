//! Profile store: named, unvalidated profile definitions loaded from configuration
//!
//! A profiles file declares networks and, separately, the compilers they build
//! with:
//!
//! ```toml
//! default = "development"
//!
//! [compilers.solc]
//! version = "0.8.0"
//!
//! [networks.development]
//! host = "127.0.0.1"
//! port = 7545
//! network_id = "*"
//! ```
//!
//! Loading merges the shared compiler blocks into each network so every entry
//! in the store is a complete network + compiler pair. Nothing is validated
//! here; see [`super::validator`].

use super::error::{LookupError, ProfileError, ProfileResult, ValidationError};
use super::model::{ProfileName, WILDCARD_TOKEN};
use super::validator::{ValidProfile, validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Network id exactly as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawSelector {
    Id(i64),
    /// Ids above `i64::MAX`
    Unsigned(u64),
    Token(String),
}

impl RawSelector {
    pub fn wildcard() -> Self {
        RawSelector::Token(WILDCARD_TOKEN.to_string())
    }
}

/// Compiler block after merging, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawCompiler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One profile as loaded; fields may be missing or out of range
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawProfile {
    #[serde(default)]
    pub host: String,

    /// Kept wide so `0` and `70000` reach the validator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<RawSelector>,

    #[serde(default)]
    pub compiler: RawCompiler,
}

impl RawProfile {
    /// Fully specified profile
    pub fn new(
        host: impl Into<String>,
        port: i64,
        network_id: RawSelector,
        compiler: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
            network_id: Some(network_id),
            compiler: RawCompiler {
                name: Some(compiler.into()),
                version: Some(version.into()),
            },
        }
    }
}

/// Read-only mapping of profile name to raw profile
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<ProfileName, RawProfile>,
    default: ProfileName,
}

impl ProfileStore {
    /// Empty store whose default profile is `development`
    pub fn new() -> Self {
        Self::default()
    }

    /// Designate another fallback profile
    pub fn with_default(mut self, name: ProfileName) -> Self {
        self.default = name;
        self
    }

    /// Add or replace a profile
    pub fn insert(&mut self, name: ProfileName, profile: RawProfile) -> Option<RawProfile> {
        self.profiles.insert(name, profile)
    }

    /// Fetch a profile by exact name; never substitutes another one
    pub fn lookup(&self, name: &str) -> Result<&RawProfile, LookupError> {
        self.profiles.get(name).ok_or_else(|| LookupError::NotFound {
            name: name.to_string(),
            available: self.names().map(|n| n.to_string()).collect(),
        })
    }

    /// Profile used when the caller names none
    pub fn default_profile_name(&self) -> &ProfileName {
        &self.default
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &ProfileName> {
        self.profiles.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProfileName, &RawProfile)> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Validate every profile, in name order
    pub fn validate_all(&self) -> Vec<(&ProfileName, Result<ValidProfile, ValidationError>)> {
        self.profiles
            .iter()
            .map(|(name, raw)| (name, validate(raw)))
            .collect()
    }

    /// Load a `.toml` or `.json` profiles file
    pub fn load(path: &Path) -> ProfileResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let store = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content).map_err(|source| ProfileError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            Some("json") => Self::from_json_str(&content).map_err(|source| ProfileError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => {
                return Err(ProfileError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        debug!(
            path = %path.display(),
            profiles = store.len(),
            default = %store.default,
            "loaded profile store"
        );
        Ok(store)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: ProfilesFile = toml::from_str(content)?;
        Ok(file.into_store())
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let file: ProfilesFile = serde_json::from_str(content)?;
        Ok(file.into_store())
    }
}

impl FromIterator<(ProfileName, RawProfile)> for ProfileStore {
    fn from_iter<I: IntoIterator<Item = (ProfileName, RawProfile)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
            default: ProfileName::default(),
        }
    }
}

/// On-disk layout of a profiles file
#[derive(Debug, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    default: Option<ProfileName>,

    #[serde(default)]
    compilers: BTreeMap<String, SharedCompiler>,

    #[serde(default)]
    networks: BTreeMap<ProfileName, NetworkBlock>,
}

#[derive(Debug, Deserialize)]
struct SharedCompiler {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NetworkBlock {
    #[serde(default)]
    host: String,

    #[serde(default)]
    port: Option<i64>,

    #[serde(default, alias = "networkSelector", alias = "network_selector")]
    network_id: Option<RawSelector>,

    #[serde(default)]
    compiler: Option<CompilerRef>,
}

/// `compiler = "solc"` or `compiler = { name = "solc", version = "0.8.1" }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompilerRef {
    Name(String),
    Block {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        version: Option<String>,
    },
}

impl ProfilesFile {
    fn into_store(self) -> ProfileStore {
        let ProfilesFile {
            default,
            compilers,
            networks,
        } = self;

        let profiles = networks
            .into_iter()
            .map(|(name, block)| {
                let compiler = merge_compiler(&name, block.compiler, &compilers);
                let raw = RawProfile {
                    host: block.host,
                    port: block.port,
                    network_id: block.network_id,
                    compiler,
                };
                (name, raw)
            })
            .collect();

        ProfileStore {
            profiles,
            default: default.unwrap_or_default(),
        }
    }
}

/// Merge a network's own compiler setting with the shared compiler blocks.
///
/// The network's explicit values win. A name without a version inherits the
/// shared block of that name. Without a name, the sole shared compiler is
/// used; with several shared compilers the name stays unset.
fn merge_compiler(
    profile: &ProfileName,
    own: Option<CompilerRef>,
    shared: &BTreeMap<String, SharedCompiler>,
) -> RawCompiler {
    let (name, version) = match own {
        Some(CompilerRef::Name(name)) => (Some(name), None),
        Some(CompilerRef::Block { name, version }) => (name, version),
        None => (None, None),
    };

    let name = name.or_else(|| {
        if shared.len() == 1 {
            shared.keys().next().cloned()
        } else {
            None
        }
    });

    let version = version.or_else(|| {
        let inherited = name
            .as_deref()
            .and_then(|n| shared.get(n))
            .and_then(|c| c.version.clone());
        if inherited.is_some() {
            debug!(profile = %profile, compiler = ?name, "inherited shared compiler version");
        }
        inherited
    });

    RawCompiler { name, version }
}
