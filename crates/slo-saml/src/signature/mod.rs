//! XML Signature support for SAML.
//!
//! Two mutually exclusive ways to sign a LogoutRequest:
//!
//! - **Embedded** ([`XmlSigner::sign`]): an enveloped `ds:Signature` inside
//!   the document, over its exclusive canonical form.
//! - **Detached** ([`XmlSigner::sign_redirect_binding`]): a signature over the
//!   exact `SAMLRequest=..&RelayState=..&SigAlg=..` query octets, sent as the
//!   `Signature` parameter.
//!
//! Algorithms are resolved through [`slo_crypto::algorithm`]; RSA-SHA1 and
//! SHA1 remain the defaults for legacy Identity Providers.

pub mod c14n;
mod signer;
mod validator;

pub use c14n::ExclusiveCanonicalizer;
pub use signer::*;
pub use validator::*;

use slo_crypto::{DigestAlgorithm, SignatureAlgorithm};

/// Configuration for signature creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureConfig {
    /// The signature method.
    pub algorithm: SignatureAlgorithm,
    /// The digest method for the embedded signature's reference.
    pub digest: DigestAlgorithm,
    /// Whether to include the X.509 certificate in `ds:KeyInfo`.
    pub include_certificate: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            algorithm: SignatureAlgorithm::default(),
            digest: DigestAlgorithm::default(),
            include_certificate: true,
        }
    }
}

impl SignatureConfig {
    /// Creates a configuration with the given methods.
    #[must_use]
    pub const fn new(algorithm: SignatureAlgorithm, digest: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            digest,
            include_certificate: true,
        }
    }
}

/// An embedded `ds:Signature` as found in a document.
#[derive(Debug, Clone)]
pub struct XmlSignature {
    /// The signature method.
    pub algorithm: SignatureAlgorithm,
    /// The digest method of the reference.
    pub digest: DigestAlgorithm,
    /// The reference URI (`#` followed by the signed element's ID).
    pub reference_uri: String,
    /// The digest value (base64 encoded).
    pub digest_value: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// `ec:InclusiveNamespaces` prefix list of the reference, if any.
    pub inclusive_prefixes: Option<String>,
    /// X.509 certificate (base64 encoded DER), if included.
    pub x509_certificate: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_config_default_is_legacy() {
        let config = SignatureConfig::default();
        assert_eq!(config.algorithm, SignatureAlgorithm::RSA_SHA1);
        assert_eq!(config.digest, DigestAlgorithm::SHA1);
        assert!(config.include_certificate);
    }
}
