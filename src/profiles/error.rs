//! Error types for profile loading and resolution

use crate::io::exit_code::ExitCode;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading or writing profile configuration
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(
        "Failed to read '{path}': {source}\nSuggestion: Run 'netpin init' or pass --profiles <path>"
    )]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Failed to write '{path}': {source}\nSuggestion: Check file permissions and disk space"
    )]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Invalid TOML in profiles file '{path}': {source}\nSuggestion: Ensure the file follows the [networks.<name>] layout"
    )]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "Invalid JSON in profiles file '{path}': {source}\nSuggestion: Ensure the JSON file is well-formed"
    )]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(
        "Unsupported profiles file format '{path}'\nSuggestion: Use a .toml or .json file"
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("'{path}' already exists\nSuggestion: Use --force to overwrite")]
    AlreadyExists { path: PathBuf },
}

/// Result type for profile loading
pub type ProfileResult<T> = Result<T, ProfileError>;

impl ProfileError {
    /// Map loading errors to CLI exit codes
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ProfileError::Read { .. } | ProfileError::Write { .. } => ExitCode::IoError,
            ProfileError::Toml { .. } | ProfileError::Json { .. } => ExitCode::ParseError,
            ProfileError::UnsupportedFormat { .. } => ExitCode::ConfigError,
            ProfileError::AlreadyExists { .. } => ExitCode::GeneralError,
        }
    }
}

/// The requested profile does not exist in the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Profile '{name}' not found (available: {})", format_available(.available))]
    NotFound {
        name: String,
        available: Vec<String>,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// A profile field failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Offending field, e.g. `port` or `compiler.version`
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures of the installed-compiler query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("compiler '{compiler}' is unavailable: {reason}")]
    Unavailable { compiler: String, reason: String },

    #[error("compiler '{compiler}' did not report a version within {}ms", .after.as_millis())]
    TimedOut { compiler: String, after: Duration },
}

/// Step of the resolution pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Lookup,
    Validate,
    Version,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lookup => "lookup",
            Stage::Validate => "validate",
            Stage::Version => "version",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying reason a resolution stopped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionCause {
    #[error(transparent)]
    NotFound(#[from] LookupError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Incompatible or missing compiler
    #[error("{detail}")]
    Rejected { detail: String },

    #[error("compiler '{compiler}' version query timed out after {}ms", .after.as_millis())]
    TimedOut { compiler: String, after: Duration },
}

/// A resolution attempt failed; `stage` says where
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("profile resolution failed at {stage} stage: {cause}")]
pub struct ResolutionError {
    pub stage: Stage,
    #[source]
    pub cause: ResolutionCause,
}

impl ResolutionError {
    pub fn new(stage: Stage, cause: impl Into<ResolutionCause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    /// Short machine-friendly reason; `"timeout"` for an expired version query
    pub fn reason(&self) -> String {
        match &self.cause {
            ResolutionCause::NotFound(_) => "profile not found".to_string(),
            ResolutionCause::Invalid(err) => err.reason.clone(),
            ResolutionCause::Rejected { detail } => detail.clone(),
            ResolutionCause::TimedOut { .. } => "timeout".to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, ResolutionCause::TimedOut { .. })
    }

    /// Field that failed validation, if that is why resolution stopped
    pub fn invalid_field(&self) -> Option<&'static str> {
        match &self.cause {
            ResolutionCause::Invalid(err) => Some(err.field),
            _ => None,
        }
    }

    /// Stable identifier for JSON responses
    pub fn status_code(&self) -> &'static str {
        match &self.cause {
            ResolutionCause::NotFound(_) => "PROFILE_NOT_FOUND",
            ResolutionCause::Invalid(_) => "INVALID_PROFILE",
            ResolutionCause::Rejected { .. } => "COMPILER_REJECTED",
            ResolutionCause::TimedOut { .. } => "COMPILER_TIMEOUT",
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.stage {
            Stage::Lookup => ExitCode::NotFound,
            Stage::Validate => ExitCode::ConfigError,
            Stage::Version => ExitCode::BlockingError,
        }
    }
}
