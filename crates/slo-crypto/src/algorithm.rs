//! XML-DSig algorithm registry.
//!
//! Maps signature-method and digest-method URIs to the hash primitive they
//! imply. The table is a fixed, read-only slice: lookups need no locking and
//! adding an algorithm means adding one [`AlgorithmEntry`].
//!
//! ## Legacy defaults
//!
//! RSA-SHA1 and SHA1 remain the defaults for interoperability with older
//! Identity Providers. They are flagged via [`HashAlgorithm::is_deprecated`]
//! so callers can warn at setup time.

use thiserror::Error;

/// Error type for algorithm lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlgorithmError {
    /// The URI is not in the registry.
    #[error("unsupported algorithm: {0}")]
    Unknown(String),

    /// The URI is known but names the wrong kind of algorithm
    /// (a digest where a signature method was expected, or vice versa).
    #[error("algorithm '{uri}' is not a {expected} method")]
    WrongRole {
        /// The URI that was supplied.
        uri: String,
        /// The role the caller asked for.
        expected: AlgorithmRole,
    },
}

/// XML-DSig signature method URIs.
pub mod signature_algorithms {
    /// Legacy RSA-SHA1 signature algorithm (default, not recommended).
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";

    /// RSA-SHA256 signature algorithm.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

    /// RSA-SHA384 signature algorithm.
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";

    /// RSA-SHA512 signature algorithm.
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
}

/// XML-DSig / XML-Enc digest method URIs.
pub mod digest_algorithms {
    /// Legacy SHA-1 digest algorithm (default, not recommended).
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

    /// SHA-256 digest algorithm.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

    /// SHA-384 digest algorithm.
    pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";

    /// SHA-512 digest algorithm.
    pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";

    /// SHA-256 under the xmldsig-more namespace, as older toolkits name it.
    pub const SHA256_MORE: &str = "http://www.w3.org/2001/04/xmldsig-more#sha256";

    /// SHA-512 under the xmldsig-more namespace, as older toolkits name it.
    pub const SHA512_MORE: &str = "http://www.w3.org/2001/04/xmldsig-more#sha512";
}

/// Hash primitive behind a signature or digest method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-1 (legacy).
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Returns the algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Returns true for hashes that are only kept for legacy interoperability.
    #[must_use]
    pub const fn is_deprecated(self) -> bool {
        matches!(self, Self::Sha1)
    }
}

/// What an algorithm URI is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmRole {
    /// `ds:DigestMethod`.
    Digest,
    /// `ds:SignatureMethod` / `SigAlg`.
    Signature,
}

impl std::fmt::Display for AlgorithmRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digest => f.write_str("digest"),
            Self::Signature => f.write_str("signature"),
        }
    }
}

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmEntry {
    /// The canonical algorithm URI.
    pub uri: &'static str,
    /// The hash primitive.
    pub hash: HashAlgorithm,
    /// Whether this URI names a digest or a signature method.
    pub role: AlgorithmRole,
}

const REGISTRY: &[AlgorithmEntry] = &[
    AlgorithmEntry {
        uri: signature_algorithms::RSA_SHA1,
        hash: HashAlgorithm::Sha1,
        role: AlgorithmRole::Signature,
    },
    AlgorithmEntry {
        uri: signature_algorithms::RSA_SHA256,
        hash: HashAlgorithm::Sha256,
        role: AlgorithmRole::Signature,
    },
    AlgorithmEntry {
        uri: signature_algorithms::RSA_SHA384,
        hash: HashAlgorithm::Sha384,
        role: AlgorithmRole::Signature,
    },
    AlgorithmEntry {
        uri: signature_algorithms::RSA_SHA512,
        hash: HashAlgorithm::Sha512,
        role: AlgorithmRole::Signature,
    },
    AlgorithmEntry {
        uri: digest_algorithms::SHA1,
        hash: HashAlgorithm::Sha1,
        role: AlgorithmRole::Digest,
    },
    AlgorithmEntry {
        uri: digest_algorithms::SHA256,
        hash: HashAlgorithm::Sha256,
        role: AlgorithmRole::Digest,
    },
    AlgorithmEntry {
        uri: digest_algorithms::SHA384,
        hash: HashAlgorithm::Sha384,
        role: AlgorithmRole::Digest,
    },
    AlgorithmEntry {
        uri: digest_algorithms::SHA512,
        hash: HashAlgorithm::Sha512,
        role: AlgorithmRole::Digest,
    },
    AlgorithmEntry {
        uri: digest_algorithms::SHA256_MORE,
        hash: HashAlgorithm::Sha256,
        role: AlgorithmRole::Digest,
    },
    AlgorithmEntry {
        uri: digest_algorithms::SHA512_MORE,
        hash: HashAlgorithm::Sha512,
        role: AlgorithmRole::Digest,
    },
];

/// A resolved `ds:SignatureMethod`: RSA PKCS#1 v1.5 with the given hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureAlgorithm {
    uri: &'static str,
    hash: HashAlgorithm,
}

impl SignatureAlgorithm {
    /// The legacy default, RSA-SHA1.
    pub const RSA_SHA1: Self = Self {
        uri: signature_algorithms::RSA_SHA1,
        hash: HashAlgorithm::Sha1,
    };

    /// RSA-SHA256.
    pub const RSA_SHA256: Self = Self {
        uri: signature_algorithms::RSA_SHA256,
        hash: HashAlgorithm::Sha256,
    };

    /// Resolves a signature method URI.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unknown`] for URIs outside the registry and
    /// [`AlgorithmError::WrongRole`] for digest URIs.
    pub fn from_uri(uri: &str) -> Result<Self, AlgorithmError> {
        let entry = resolve_role(uri, AlgorithmRole::Signature)?;
        Ok(Self {
            uri: entry.uri,
            hash: entry.hash,
        })
    }

    /// Returns the canonical URI, suitable for `SigAlg`.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        self.uri
    }

    /// Returns the hash used by this signature method.
    #[must_use]
    pub const fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Returns true if this algorithm uses a deprecated hash.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.hash.is_deprecated()
    }
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self::RSA_SHA1
    }
}

/// A resolved `ds:DigestMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigestAlgorithm {
    uri: &'static str,
    hash: HashAlgorithm,
}

impl DigestAlgorithm {
    /// The legacy default, SHA1.
    pub const SHA1: Self = Self {
        uri: digest_algorithms::SHA1,
        hash: HashAlgorithm::Sha1,
    };

    /// Resolves a digest method URI.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unknown`] for URIs outside the registry and
    /// [`AlgorithmError::WrongRole`] for signature URIs.
    pub fn from_uri(uri: &str) -> Result<Self, AlgorithmError> {
        let entry = resolve_role(uri, AlgorithmRole::Digest)?;
        Ok(Self {
            uri: entry.uri,
            hash: entry.hash,
        })
    }

    /// Returns the canonical URI.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        self.uri
    }

    /// Returns the hash primitive.
    #[must_use]
    pub const fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Returns true if this algorithm uses a deprecated hash.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.hash.is_deprecated()
    }
}

impl Default for DigestAlgorithm {
    fn default() -> Self {
        Self::SHA1
    }
}

/// Looks up an algorithm URI in the registry.
///
/// An explicit but unrecognized URI is always an error; there is no silent
/// fallback to a default.
///
/// # Errors
///
/// Returns [`AlgorithmError::Unknown`] if the URI is not registered.
pub fn resolve(uri: &str) -> Result<AlgorithmEntry, AlgorithmError> {
    REGISTRY
        .iter()
        .find(|entry| entry.uri == uri)
        .copied()
        .ok_or_else(|| AlgorithmError::Unknown(uri.to_string()))
}

fn resolve_role(uri: &str, expected: AlgorithmRole) -> Result<AlgorithmEntry, AlgorithmError> {
    let entry = resolve(uri)?;
    if entry.role != expected {
        return Err(AlgorithmError::WrongRole {
            uri: uri.to_string(),
            expected,
        });
    }
    Ok(entry)
}

/// Returns every registered algorithm.
#[must_use]
pub fn registered() -> &'static [AlgorithmEntry] {
    REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_sha1_resolves_to_sha1() {
        let alg = SignatureAlgorithm::from_uri(signature_algorithms::RSA_SHA1).unwrap();
        assert_eq!(alg.hash(), HashAlgorithm::Sha1);
        assert!(alg.is_deprecated());
        assert_eq!(alg, SignatureAlgorithm::default());
    }

    #[test]
    fn rsa_sha256_resolves_to_sha256() {
        let alg = SignatureAlgorithm::from_uri(signature_algorithms::RSA_SHA256).unwrap();
        assert_eq!(alg.hash(), HashAlgorithm::Sha256);
        assert_eq!(alg.uri(), signature_algorithms::RSA_SHA256);
        assert!(!alg.is_deprecated());
    }

    #[test]
    fn digest_sha512_resolves() {
        let alg = DigestAlgorithm::from_uri(digest_algorithms::SHA512).unwrap();
        assert_eq!(alg.hash(), HashAlgorithm::Sha512);
        assert_eq!(alg.hash().output_len(), 64);
    }

    #[test]
    fn xmldsig_more_digest_alias_keeps_its_uri() {
        let alg = DigestAlgorithm::from_uri(digest_algorithms::SHA512_MORE).unwrap();
        assert_eq!(alg.hash(), HashAlgorithm::Sha512);
        assert_eq!(alg.uri(), digest_algorithms::SHA512_MORE);
    }

    #[test]
    fn unknown_uri_is_rejected() {
        let result = SignatureAlgorithm::from_uri("http://www.w3.org/2000/09/xmldsig#dsa-sha1");
        assert!(matches!(result, Err(AlgorithmError::Unknown(_))));
    }

    #[test]
    fn digest_uri_is_not_a_signature_method() {
        let result = SignatureAlgorithm::from_uri(digest_algorithms::SHA256);
        assert!(matches!(
            result,
            Err(AlgorithmError::WrongRole {
                expected: AlgorithmRole::Signature,
                ..
            })
        ));

        let result = DigestAlgorithm::from_uri(signature_algorithms::RSA_SHA256);
        assert!(matches!(result, Err(AlgorithmError::WrongRole { .. })));
    }

    #[test]
    fn registry_uris_are_unique() {
        let mut uris: Vec<_> = registered().iter().map(|e| e.uri).collect();
        uris.sort_unstable();
        uris.dedup();
        assert_eq!(uris.len(), registered().len());
    }

    #[test]
    fn wrong_role_message_names_the_role() {
        let err = DigestAlgorithm::from_uri(signature_algorithms::RSA_SHA1).unwrap_err();
        assert!(err.to_string().contains("not a digest method"));
    }
}
