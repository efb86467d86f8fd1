//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for library consumers
//! with file-level error context, and local error types (`ExtractError`,
//! `StructureError`) for units of work that are skipped rather than
//! propagated.

use thiserror::Error;

/// Main error type for the harvester library.
///
/// Every variant is fatal for the source file being processed, never for a
/// batch.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// The code host answered with a non-2xx status.
    #[error("Remote API returned status {status}: {body}")]
    RemoteApi { status: u16, body: String },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The transport encoding could not be decoded.
    #[error("Failed to decode file content: {0}")]
    Decode(String),

    /// The code host returned a file in an encoding other than base64.
    #[error("Unsupported content encoding: '{0}'. Expected base64")]
    UnsupportedEncoding(String),

    /// The decoded text failed the cheap content heuristics.
    #[error("Content validation failed: {reason}")]
    Validation { reason: String },

    /// Country code not present in the country table.
    #[error("Unknown country code: '{0}'")]
    UnknownCountry(String),

    /// Source filename not present in the country table.
    #[error("Unknown source file: '{0}'")]
    UnknownSourceFile(String),

    /// Country code is not two upper-case letters.
    #[error("Invalid country code format: '{0}'. Expected ISO 3166-1 alpha-2 (e.g., US)")]
    InvalidCountryCode(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed.
    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HarvesterError {
    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by caller cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

/// Failure to extract a single registration call.
///
/// The extractor logs these and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("line {line}: no quoted holiday name in {shape} call")]
    MissingName { shape: &'static str, line: usize },

    #[error("line {line}: {shape} call is never closed")]
    Unclosed { shape: &'static str, line: usize },
}

/// Failure to recover a single class or method header.
///
/// The structural parser records these as warnings and resumes scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("line {line}: expected a name after '{keyword}'")]
    MissingName { keyword: &'static str, line: usize },

    #[error("line {line}: unterminated {kind} header '{name}'")]
    UnterminatedHeader {
        kind: &'static str,
        name: String,
        line: usize,
    },

    #[error("no class declarations recovered")]
    NoClasses,
}
