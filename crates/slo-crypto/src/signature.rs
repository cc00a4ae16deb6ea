//! Digital signature operations.
//!
//! All signing in this crate is RSA PKCS#1 v1.5, the only scheme the
//! registered XML-DSig signature methods name.

use rsa::Pkcs1v15Sign;
use thiserror::Error;

use crate::algorithm::{HashAlgorithm, SignatureAlgorithm};

/// Error type for signature operations.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Verification failed.
    #[error("signature verification failed")]
    Verification,

    /// Invalid key format.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// Invalid certificate.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),
}

/// Trait for signature providers.
///
/// Implemented by [`crate::RsaSigningKey`] for in-memory keys. Remote key
/// stores (an HSM, a KMS) implement it too; callers should treat `sign` as a
/// potentially blocking call in that case.
pub trait SignatureProvider: Send + Sync {
    /// Signs `data` with the given algorithm. The provider hashes the data.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> Result<Vec<u8>, SignatureError>;
}

/// Returns the PKCS#1 v1.5 padding scheme (with DigestInfo prefix) for a hash.
pub(crate) fn pkcs1v15_padding(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_error_verification_is_generic() {
        let error = SignatureError::Verification;
        assert_eq!(error.to_string(), "signature verification failed");
    }
}
