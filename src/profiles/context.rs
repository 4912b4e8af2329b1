//! Resolved build context handed to the build/deploy pipeline

use super::model::{CompilerSpec, NetworkProfile, ProfileName};
use super::version::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Immutable outcome of resolving one profile
///
/// Built once per resolution and never mutated; resolve again to pick up a
/// changed configuration or a compiler upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContext {
    profile: ProfileName,
    network: NetworkProfile,
    compiler: CompilerSpec,
    installed: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    resolved_at: DateTime<Utc>,
}

impl ResolvedContext {
    pub(crate) fn new(
        profile: ProfileName,
        network: NetworkProfile,
        compiler: CompilerSpec,
        installed: Version,
        warning: Option<String>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            profile,
            network,
            compiler,
            installed,
            warning,
            resolved_at,
        }
    }

    pub fn profile(&self) -> &ProfileName {
        &self.profile
    }

    pub fn network(&self) -> &NetworkProfile {
        &self.network
    }

    pub fn host(&self) -> &str {
        &self.network.host
    }

    pub fn port(&self) -> u16 {
        self.network.port
    }

    /// Declared compiler, as validated
    pub fn compiler(&self) -> &CompilerSpec {
        &self.compiler
    }

    /// Version the installed compiler reported
    pub fn installed_version(&self) -> &Version {
        &self.installed
    }

    /// Patch-level drift note, if the installed compiler is a newer patch
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Equal in everything but the resolution timestamp
    pub fn same_resolution(&self, other: &ResolvedContext) -> bool {
        self.profile == other.profile
            && self.network == other.network
            && self.compiler == other.compiler
            && self.installed == other.installed
            && self.warning == other.warning
    }
}
