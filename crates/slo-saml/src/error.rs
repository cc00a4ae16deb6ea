//! SAML error types.
//!
//! Every failure is reported before any output is produced: a call either
//! returns a complete (and, if configured, signed) message or one of these.

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// Required settings are missing, e.g. signing requested without a key.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Signature or digest method URI not in the algorithm registry.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The target endpoint URL cannot be parsed.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    /// Compression or encoding of the outgoing message failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// Deflate decompression error.
    #[error("deflate error: {0}")]
    Deflate(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// Signature validation failed.
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// Cryptographic operation error.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Invalid request parameters or message content.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SamlError {
    /// Returns true for errors caused by settings rather than by call input.
    ///
    /// These should have been caught by [`slo_core::Settings::validate`].
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnsupportedAlgorithm(_) | Self::MalformedUrl(_)
        )
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

impl From<slo_crypto::AlgorithmError> for SamlError {
    fn from(err: slo_crypto::AlgorithmError) -> Self {
        match err {
            slo_crypto::AlgorithmError::Unknown(uri) => Self::UnsupportedAlgorithm(uri),
            other => Self::UnsupportedAlgorithm(other.to_string()),
        }
    }
}

impl From<slo_crypto::SignatureError> for SamlError {
    fn from(err: slo_crypto::SignatureError) -> Self {
        use slo_crypto::SignatureError;

        match err {
            SignatureError::InvalidKey(_) | SignatureError::InvalidCertificate(_) => {
                Self::Configuration(err.to_string())
            }
            SignatureError::Signing(msg) => Self::SignatureCreation(msg),
            SignatureError::Verification => Self::SignatureInvalid(err.to_string()),
        }
    }
}

impl From<slo_core::Error> for SamlError {
    fn from(err: slo_core::Error) -> Self {
        match err {
            slo_core::Error::UnsupportedAlgorithm(uri) => Self::UnsupportedAlgorithm(uri),
            slo_core::Error::Config(msg) | slo_core::Error::Parse(msg) => Self::Configuration(msg),
            slo_core::Error::Io(e) => Self::Configuration(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_flagged() {
        assert!(SamlError::Configuration("no key".to_string()).is_configuration_error());
        assert!(SamlError::UnsupportedAlgorithm("urn:x".to_string()).is_configuration_error());
        assert!(!SamlError::Encoding("oom".to_string()).is_configuration_error());
        assert!(!SamlError::SignatureInvalid("bad".to_string()).is_configuration_error());
    }

    #[test]
    fn unknown_algorithm_keeps_uri() {
        let err: SamlError = slo_crypto::AlgorithmError::Unknown("urn:x".to_string()).into();
        assert_eq!(err.to_string(), "unsupported algorithm: urn:x");
    }

    #[test]
    fn settings_errors_map_to_configuration() {
        let err: SamlError = slo_core::Error::Config("private key required".to_string()).into();
        assert!(matches!(err, SamlError::Configuration(_)));

        let err: SamlError = slo_core::Error::UnsupportedAlgorithm("urn:x".to_string()).into();
        assert!(matches!(err, SamlError::UnsupportedAlgorithm(ref uri) if uri == "urn:x"));
    }

    #[test]
    fn invalid_key_is_a_configuration_error() {
        let err: SamlError = slo_crypto::SignatureError::InvalidKey("bad pem".to_string()).into();
        assert!(err.is_configuration_error());
    }
}
