//! Error handling for the Sift engine
//!
//! Matching itself never fails: malformed patterns, failed coercions and unresolved
//! references all degrade to "no match" or a null value. The errors below cover the
//! places where the caller handed the engine something it cannot accept (reserved
//! field names, invalid weights, bad configuration) and the artifact seam, whose
//! failures are propagated untouched.

use thiserror::Error;

/// Error type for Sift engine operations
#[derive(Error, Debug)]
pub enum SiftError {
    /// A field name collides with the reserved bookkeeping prefix
    #[error("Field '{field}' uses the reserved prefix '{prefix}'")]
    ReservedField { field: String, prefix: &'static str },

    /// A fact could not be converted into the element value domain
    #[error("Invalid value for field '{field}': {message}")]
    InvalidFact { field: String, message: String },

    /// Rule weights must be finite and strictly positive
    #[error("Rule weight must be finite and > 0, got {weight}")]
    InvalidWeight { weight: f64 },

    /// An artifact collaborator failed while processing an action
    #[error("Artifact '{function}' failed: {source}")]
    Artifact {
        function: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Weighted tie resolution could not be performed
    #[error("Selection error: {message}")]
    Selection { message: String },

    /// Configuration could not be parsed or holds an invalid setting
    #[error("Configuration error for '{setting}': {message}")]
    Configuration { setting: String, message: String },
}

impl SiftError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SiftError::ReservedField { .. } | SiftError::InvalidFact { .. } => "element",
            SiftError::InvalidWeight { .. } => "rule",
            SiftError::Artifact { .. } => "artifact",
            SiftError::Selection { .. } => "selection",
            SiftError::Configuration { .. } => "configuration",
        }
    }

    /// Create a configuration error
    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration { setting: setting.to_string(), message: message.into() }
    }

    /// Wrap a failure raised by an artifact collaborator
    pub fn artifact(function: &str, source: anyhow::Error) -> Self {
        Self::Artifact { function: function.to_string(), source: source.into() }
    }
}

/// Result type alias for engine operations
pub type SiftResult<T> = Result<T, SiftError>;
