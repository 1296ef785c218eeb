//! Error types for tubesweep

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tubesweep
#[derive(Debug, Error)]
pub enum SweepError {
    /// Missing or malformed operator input
    #[error("{0}")]
    Validation(String),

    /// Credential flow failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Structured API-level failure (quota, permission denial, ...)
    #[error("API error {status} ({reason}): {message}")]
    Transport {
        status: u16,
        reason: String,
        message: String,
    },

    /// Request never produced an API response
    #[error("Network error: {0}")]
    Network(String),

    /// Classifier invocation failure
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Classifier model could not be loaded
    #[error("Model error: {0}")]
    Model(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Anything else
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweepError>,
    },
}

impl SweepError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        SweepError::Validation(message.into())
    }

    /// Classify the error into one of the reported kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweepError::Validation(_) => ErrorKind::Validation,
            SweepError::Authentication(_) => ErrorKind::Authentication,
            SweepError::Transport { .. } | SweepError::Network(_) => ErrorKind::Transport,
            SweepError::Prediction(_) => ErrorKind::Prediction,
            SweepError::WithContext { source, .. } => source.kind(),
            SweepError::Model(_)
            | SweepError::Io(_)
            | SweepError::Serde(_)
            | SweepError::Toml(_)
            | SweepError::Config(_)
            | SweepError::FileNotFound(_)
            | SweepError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Error classification surfaced to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Transport,
    Prediction,
    Unexpected,
}

impl ErrorKind {
    /// Level the error is recorded at in the activity log
    pub fn log_level(&self) -> tracing::Level {
        match self {
            ErrorKind::Validation => tracing::Level::INFO,
            _ => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "Validation",
            ErrorKind::Authentication => "Authentication",
            ErrorKind::Transport => "Transport",
            ErrorKind::Prediction => "Prediction",
            ErrorKind::Unexpected => "Unexpected",
        };
        f.write_str(label)
    }
}

/// Result type alias for tubesweep
pub type Result<T> = std::result::Result<T, SweepError>;
