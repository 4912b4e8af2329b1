//! Typed profile data: names, endpoints, selectors and compiler specs

use super::version::Version;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Name given to a profile when neither the caller nor the configuration picks one
pub const DEFAULT_PROFILE_NAME: &str = "development";

/// Token meaning "accept any network"
pub const WILDCARD_TOKEN: &str = "*";

/// Non-empty profile identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ProfileName(String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("profile name cannot be empty")]
pub struct EmptyProfileName;

impl ProfileName {
    pub fn new(name: impl Into<String>) -> Result<Self, EmptyProfileName> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EmptyProfileName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProfileName {
    fn default() -> Self {
        Self(DEFAULT_PROFILE_NAME.to_string())
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProfileName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ProfileName> for String {
    fn from(name: ProfileName) -> Self {
        name.0
    }
}

impl TryFrom<String> for ProfileName {
    type Error = EmptyProfileName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProfileName {
    type Error = EmptyProfileName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Which chain a profile is allowed to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum NetworkSelector {
    /// Any network id; downstream identity checks are skipped
    Any,
    /// Exactly this network id
    Exact(u64),
}

impl NetworkSelector {
    /// Whether a network reporting `id` is acceptable
    pub fn accepts(&self, id: u64) -> bool {
        match self {
            NetworkSelector::Any => true,
            NetworkSelector::Exact(expected) => *expected == id,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, NetworkSelector::Any)
    }
}

impl fmt::Display for NetworkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkSelector::Any => f.write_str(WILDCARD_TOKEN),
            NetworkSelector::Exact(id) => write!(f, "{id}"),
        }
    }
}

/// A validated network endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub host: String,
    pub port: u16,
    pub selector: NetworkSelector,
}

impl NetworkProfile {
    /// `host:port`, bracketing bare IPv6 literals
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// A validated compiler pin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompilerSpec {
    pub name: String,
    pub version: Version,
}

impl fmt::Display for CompilerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
