//! Network & compiler profile resolution for build/deploy pipelines.
//!
//! Load a [`ProfileStore`], then hand it to a [`Resolver`] together with a
//! [`CompilerProbe`] to get a validated, immutable [`ResolvedContext`].

pub mod config;
pub mod io;
pub mod profiles;

// Explicit exports for better API clarity
pub use config::Settings;
pub use io::ExitCode;
pub use profiles::{
    CommandProbe, CompilerProbe, CompilerSpec, GateResult, NetworkProfile, NetworkSelector,
    PinnedProbe, ProfileError, ProfileName, ProfileStore, RawProfile, RawSelector,
    ResolutionError, ResolvedContext, Resolver, Stage, ValidationError, Version,
};
