//! Profile resolution logic - turns a profile name into a validated build context

use super::context::ResolvedContext;
use super::error::{ProbeError, ResolutionCause, ResolutionError, Stage};
use super::gate::{self, GateResult};
use super::model::ProfileName;
use super::probe::CompilerProbe;
use super::store::ProfileStore;
use super::validator::validate;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bound on the installed-compiler query unless the caller picks one
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pick the requested profile name from tiered sources
/// Priority: CLI > Local > Settings > None (store default applies)
pub fn select_profile_name(
    cli: Option<String>,
    local: Option<String>,
    settings: Option<String>,
) -> Option<String> {
    cli.or(local).or(settings)
}

/// Resolves profiles from a store against the installed toolchain
///
/// Holds only shared references, so one store can serve many resolvers on
/// many threads at once.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a ProfileStore,
    probe: &'a dyn CompilerProbe,
    timeout: Duration,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a ProfileStore, probe: &'a dyn CompilerProbe) -> Self {
        Self {
            store,
            probe,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Bound the installed-compiler query
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `requested`, or the store's default profile when `None`
    ///
    /// # Errors
    /// - stage `lookup` if the profile does not exist
    /// - stage `validate` if a field is malformed
    /// - stage `version` if the compiler is missing, too slow to answer, or
    ///   incompatible with the pinned version
    pub fn resolve(
        &self,
        requested: Option<&ProfileName>,
    ) -> Result<ResolvedContext, ResolutionError> {
        let name = requested.unwrap_or_else(|| self.store.default_profile_name());
        debug!(profile = %name, defaulted = requested.is_none(), "resolving profile");

        let raw = self
            .store
            .lookup(name.as_str())
            .map_err(|e| ResolutionError::new(Stage::Lookup, e))?;

        let valid = validate(raw).map_err(|e| ResolutionError::new(Stage::Validate, e))?;
        let declared = &valid.compiler;

        let installed = self
            .probe
            .installed_version(&declared.name, self.timeout)
            .map_err(|e| ResolutionError::new(Stage::Version, probe_failure(e)))?;

        let warning = match gate::check(&declared.version, &installed) {
            GateResult::Proceed => None,
            GateResult::ProceedWithWarning { detail } => {
                warn!(profile = %name, compiler = %declared.name, "{detail}");
                Some(detail)
            }
            GateResult::Reject { detail } => {
                return Err(ResolutionError::new(
                    Stage::Version,
                    ResolutionCause::Rejected { detail },
                ));
            }
        };

        let resolved_at = Utc::now();
        info!(
            profile = %name,
            endpoint = %valid.network.endpoint(),
            compiler = %declared,
            installed = %installed,
            "profile resolved"
        );

        Ok(ResolvedContext::new(
            name.clone(),
            valid.network,
            valid.compiler,
            installed,
            warning,
            resolved_at,
        ))
    }
}

/// An unavailable compiler counts as a gate rejection
fn probe_failure(err: ProbeError) -> ResolutionCause {
    match err {
        ProbeError::Unavailable { compiler, reason } => ResolutionCause::Rejected {
            detail: format!("compiler not found: {compiler} ({reason})"),
        },
        ProbeError::TimedOut { compiler, after } => ResolutionCause::TimedOut { compiler, after },
    }
}
