//! Network & compiler profile system
//!
//! Leaves first: [`store`] holds raw profiles, [`validator`] checks them,
//! [`gate`] compares compiler versions, and [`resolver`] ties the three
//! together with a [`probe`] of the installed compiler to produce a
//! [`context::ResolvedContext`].

pub mod context;
pub mod error;
pub mod gate;
pub mod local;
pub mod model;
pub mod probe;
pub mod resolver;
pub mod store;
pub mod validator;
pub mod version;

pub use context::ResolvedContext;
pub use error::{
    LookupError, ProbeError, ProfileError, ProfileResult, ResolutionCause, ResolutionError, Stage,
    ValidationError,
};
pub use gate::GateResult;
pub use model::{CompilerSpec, NetworkProfile, NetworkSelector, ProfileName};
pub use probe::{CommandProbe, CompilerProbe, PinnedProbe};
pub use resolver::{Resolver, select_profile_name};
pub use store::{ProfileStore, RawCompiler, RawProfile, RawSelector};
pub use validator::{ValidProfile, validate};
pub use version::Version;

use std::path::{Path, PathBuf};

/// Starter profiles file: a local development chain on the Ganache UI port
pub const STARTER_PROFILES: &str = r#"# netpin profiles
#
# Each [networks.<name>] block is one profile. Compilers declared under
# [compilers.<name>] are shared; a network may override with
#   compiler = "solc"                               (inherit the shared version)
#   compiler = { name = "solc", version = "0.8.4" } (pin its own)

# Profile used when none is requested
default = "development"

[compilers.solc]
# Must match the version your contracts are written for
version = "0.8.0"

[networks.development]
host = "127.0.0.1"
# Default Ganache UI port
port = 7545
# "*" accepts any network id
network_id = "*"
"#;

/// Write [`STARTER_PROFILES`] to `path`
pub fn write_starter_profiles(path: &Path, force: bool) -> ProfileResult<PathBuf> {
    if !force && path.exists() {
        return Err(ProfileError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    let write_err = |source| ProfileError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, STARTER_PROFILES).map_err(write_err)?;

    Ok(path.to_path_buf())
}
