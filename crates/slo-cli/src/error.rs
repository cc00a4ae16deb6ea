//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be loaded or are invalid.
    #[error("settings error: {0}")]
    Settings(#[from] slo_core::Error),

    /// Building, decoding or verifying a message failed.
    #[error(transparent)]
    Saml(#[from] slo_saml::SamlError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
