//! Compiler version triples

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid regex"));

/// A `major.minor.patch` compiler version
///
/// Declared versions are parsed strictly with [`Version::parse`]; versions
/// reported by an installed compiler are pulled out of free-form output with
/// [`Version::extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Why a version string was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,

    #[error("expected three dot-separated components, found {found}")]
    WrongArity { found: usize },

    #[error("component '{component}' is not an unsigned integer")]
    NotNumeric { component: String },
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `<uint>.<uint>.<uint>` exactly.
    ///
    /// Partial versions (`0.8`) and pre-release or build suffixes
    /// (`0.8.0-rc1`, `0.8.0+commit.abc`) are rejected.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        if input.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::WrongArity { found: parts.len() });
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = parse_component(part)?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }

    /// Find a version triple in compiler output.
    ///
    /// A line containing `Version:` wins over any other line, so banners that
    /// mention unrelated numbers before the version line do not confuse it.
    /// Build metadata after the triple is ignored.
    pub fn extract(output: &str) -> Option<Self> {
        let preferred = output
            .lines()
            .find(|line| line.contains("Version:"))
            .and_then(first_triple);

        preferred.or_else(|| first_triple(output))
    }

    /// Same major and minor line
    pub fn same_line(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

fn parse_component(part: &str) -> Result<u64, VersionParseError> {
    let not_numeric = || VersionParseError::NotNumeric {
        component: part.to_string(),
    };

    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric());
    }
    part.parse().map_err(|_| not_numeric())
}

fn first_triple(text: &str) -> Option<Version> {
    let caps = TRIPLE.captures(text)?;
    let component = |i: usize| caps.get(i)?.as_str().parse::<u64>().ok();
    Some(Version::new(component(1)?, component(2)?, component(3)?))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
