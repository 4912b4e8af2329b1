//! Compiler version gate
//!
//! Pinning a compiler exists to make bytecode reproducible. Exact matches
//! proceed, patch-level drift upwards within the same minor line proceeds
//! with a warning, and anything else is rejected.

use super::version::Version;

/// Outcome of comparing the declared and installed compiler versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResult {
    Proceed,
    ProceedWithWarning { detail: String },
    Reject { detail: String },
}

impl GateResult {
    /// Whether resolution may continue
    pub fn is_proceed(&self) -> bool {
        !matches!(self, GateResult::Reject { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            GateResult::ProceedWithWarning { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Compare a declared version against the installed one
pub fn check(declared: &Version, installed: &Version) -> GateResult {
    if declared == installed {
        return GateResult::Proceed;
    }

    if declared.same_line(installed) {
        if installed.patch > declared.patch {
            return GateResult::ProceedWithWarning {
                detail: format!(
                    "installed compiler {installed} is a newer patch release \
                     than the pinned {declared}"
                ),
            };
        }
        return GateResult::Reject {
            detail: format!(
                "installed compiler {installed} is older than the pinned {declared}"
            ),
        };
    }

    GateResult::Reject {
        detail: format!(
            "installed compiler {installed} is incompatible with the pinned {declared} \
             ({}.{} line required)",
            declared.major, declared.minor
        ),
    }
}
