//! Error types for the ingestflow pipeline.
//!
//! Every failure a step can raise is an [`IngestError`]. The step executor
//! records the error in the action log and then hands the same value back
//! to the caller, so the `Display` text of each variant is also what ends
//! up in the log viewer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::Action;

/// The main error type for ingestflow operations.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An external fetch failed. The message is kept verbatim.
    #[error("{0}")]
    Fetch(String),

    /// A step exceeded its time budget.
    #[error("Step '{step}' timed out after {seconds}s")]
    Timeout {
        /// The step name.
        step: String,
        /// The configured timeout in seconds.
        seconds: f64,
    },

    /// The run was cancelled through its cancellation token.
    #[error("Pipeline cancelled: {0}")]
    Cancelled(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record store could not be read or written.
    #[error("Record store error: {0}")]
    Store(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Creates a fetch error.
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a store error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Short machine-readable name of the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled(_) => "cancelled",
            Self::Config(_) => "config",
            Self::Store(_) => "store",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

impl From<regex::Error> for IngestError {
    fn from(err: regex::Error) -> Self {
        Self::Config(format!("invalid reference pattern: {err}"))
    }
}

/// Diagnostic record written to the action log when a step fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The error-phase action this record is filed under.
    pub action: Action,
    /// The error message.
    pub message: String,
    /// Rendered error chain, outermost first.
    pub stack: String,
}

impl ErrorRecord {
    /// Creates a record from raw parts.
    #[must_use]
    pub fn new(action: Action, message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
            stack: stack.into(),
        }
    }

    /// Builds a record from an error, walking its `source()` chain.
    #[must_use]
    pub fn from_error(action: Action, err: &(dyn std::error::Error + 'static)) -> Self {
        let message = err.to_string();
        let mut stack = format!("{}: {message}", action.label());
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            action,
            message,
            stack,
        }
    }
}

/// Convenience result alias.
pub type Result<T, E = IngestError> = std::result::Result<T, E>;
