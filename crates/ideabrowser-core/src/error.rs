//! Centralized error types for IdeaBrowser.

use std::time::Duration;

use thiserror::Error;

/// Main error type for IdeaBrowser operations.
#[derive(Error, Debug)]
pub enum IdeaError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analysis output is not valid JSON: {source}")]
    Parse {
        /// Everything the collaborator wrote to stdout.
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Analysis did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for IdeaBrowser operations.
pub type IdeaResult<T> = Result<T, IdeaError>;

impl IdeaError {
    /// Create a validation error listing the missing fields.
    pub fn validation(missing: Vec<&'static str>) -> Self {
        Self::Validation { missing }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
