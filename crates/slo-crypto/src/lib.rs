//! # slo-crypto
//!
//! Cryptographic building blocks for SAML single logout.
//!
//! - [`algorithm`] - XML-DSig algorithm registry (URI to hash primitive)
//! - [`hash`] - digests backed by aws-lc-rs
//! - [`keys`] - RSA private keys and X.509 certificates
//! - [`signature`] - the [`SignatureProvider`] seam and signature errors
//! - [`random`] - SAML message identifier generation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod keys;
pub mod random;
pub mod signature;

pub use algorithm::{
    AlgorithmEntry, AlgorithmError, AlgorithmRole, DigestAlgorithm, HashAlgorithm,
    SignatureAlgorithm,
};
pub use hash::hash;
pub use keys::{Certificate, RsaSigningKey, RsaVerifyingKey};
pub use random::{generate_id, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use signature::{SignatureError, SignatureProvider};
