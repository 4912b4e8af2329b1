//! Format definitions for CLI output.
//!
//! Provides structured format types for consistent JSON responses that a
//! build/deploy pipeline can consume.

use crate::io::exit_code::ExitCode;
use crate::profiles::ResolutionError;
use serde::Serialize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for pipeline integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response format.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "PROFILE_NOT_FOUND")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Actual data payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Exit code for shell scripts
    pub exit_code: u8,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Resolution stage that failed, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Field that failed validation, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Short reason, `"timeout"` for expired compiler queries
    pub reason: String,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
        }
    }

    /// Replace the default success message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create an error response for a failed resolution.
    pub fn from_resolution_error(error: &ResolutionError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code().to_string(),
            message: error.to_string(),
            data: None,
            error: Some(ErrorDetails {
                stage: Some(error.stage.to_string()),
                field: error.invalid_field().map(String::from),
                reason: error.reason(),
            }),
            exit_code: error.exit_code() as u8,
        }
    }
}
