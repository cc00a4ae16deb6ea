//! Error handling for settings.
//!
//! Settings errors are setup-time errors: they should surface when the
//! service provider is configured, not on the first logout.

use thiserror::Error;

/// Result type alias using the settings error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Settings error.
#[derive(Debug, Error)]
pub enum Error {
    /// Required setting missing or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Signature or digest method URI not in the algorithm registry.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Settings file could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Settings or key file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<slo_crypto::AlgorithmError> for Error {
    fn from(err: slo_crypto::AlgorithmError) -> Self {
        match err {
            slo_crypto::AlgorithmError::Unknown(uri) => Self::UnsupportedAlgorithm(uri),
            other => Self::UnsupportedAlgorithm(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
