//! RSA key and X.509 certificate loading.
//!
//! Private keys are accepted as PEM (`RSA PRIVATE KEY` / PKCS#1 or
//! `PRIVATE KEY` / PKCS#8) or raw DER. Certificates are accepted as PEM,
//! as bare base64 DER (the form often pasted from IdP metadata) or raw DER.

use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use x509_parser::prelude::*;

use crate::algorithm::SignatureAlgorithm;
use crate::hash::hash;
use crate::signature::{pkcs1v15_padding, SignatureError, SignatureProvider};

/// RSA private key used for SAML message signing.
pub struct RsaSigningKey {
    key: RsaPrivateKey,
}

impl RsaSigningKey {
    /// Loads a key from PEM text.
    ///
    /// # Errors
    ///
    /// Returns an error if no RSA key block is found or the key is malformed.
    pub fn from_pem(pem: &str) -> Result<Self, SignatureError> {
        if let Some(der) = pem_to_der(pem, "RSA PRIVATE KEY") {
            let key = RsaPrivateKey::from_pkcs1_der(&der)
                .map_err(|e| SignatureError::InvalidKey(format!("Invalid PKCS#1 RSA key: {e}")))?;
            return Ok(Self { key });
        }

        let der = pem_to_der(pem, "PRIVATE KEY")
            .ok_or_else(|| SignatureError::InvalidKey("No RSA private key PEM block".to_string()))?;
        Self::from_pkcs8_der(&der)
    }

    /// Loads a key from DER, trying PKCS#1 first and PKCS#8 second.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are neither encoding.
    pub fn from_der(der: &[u8]) -> Result<Self, SignatureError> {
        match RsaPrivateKey::from_pkcs1_der(der) {
            Ok(key) => Ok(Self { key }),
            Err(_) => Self::from_pkcs8_der(der),
        }
    }

    fn from_pkcs8_der(der: &[u8]) -> Result<Self, SignatureError> {
        let key = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| SignatureError::InvalidKey(format!("Invalid PKCS#8 RSA key: {e}")))?;
        Ok(Self { key })
    }

    /// Returns the matching public key.
    #[must_use]
    pub fn verifying_key(&self) -> RsaVerifyingKey {
        RsaVerifyingKey {
            key: self.key.to_public_key(),
        }
    }
}

impl SignatureProvider for RsaSigningKey {
    fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let digest = hash(algorithm.hash(), data);
        self.key
            .sign(pkcs1v15_padding(algorithm.hash()), &digest)
            .map_err(|e| SignatureError::Signing(format!("RSA signing failed: {e}")))
    }
}

impl std::fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSigningKey").finish_non_exhaustive()
    }
}

/// RSA public key used to check signatures.
#[derive(Debug, Clone)]
pub struct RsaVerifyingKey {
    key: RsaPublicKey,
}

impl RsaVerifyingKey {
    /// Loads a public key from DER `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not an RSA public key.
    pub fn from_spki_der(spki: &[u8]) -> Result<Self, SignatureError> {
        let key = RsaPublicKey::from_public_key_der(spki)
            .map_err(|e| SignatureError::InvalidKey(format!("Invalid RSA public key: {e}")))?;
        Ok(Self { key })
    }

    /// Verifies `signature` over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Verification`] when the signature does not match.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        let digest = hash(algorithm.hash(), data);
        self.key
            .verify(pkcs1v15_padding(algorithm.hash()), &digest, signature)
            .map_err(|_| SignatureError::Verification)
    }
}

/// An X.509 certificate held as DER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Loads a certificate from PEM or bare base64 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not decode to a valid certificate.
    pub fn from_pem(text: &str) -> Result<Self, SignatureError> {
        let der = match pem_to_der(text, "CERTIFICATE") {
            Some(der) => der,
            None => {
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| {
                        SignatureError::InvalidCertificate(format!(
                            "Invalid certificate encoding: {e}"
                        ))
                    })?
            }
        };
        Self::from_der(der)
    }

    /// Wraps DER bytes after checking that they parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not an X.509 certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self, SignatureError> {
        X509Certificate::from_der(&der).map_err(|e| {
            SignatureError::InvalidCertificate(format!("Failed to parse certificate: {e}"))
        })?;
        Ok(Self { der })
    }

    /// Returns the DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the DER encoding as standard base64, the `ds:X509Certificate` form.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.der)
    }

    /// Extracts the RSA public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate does not carry an RSA key.
    pub fn public_key(&self) -> Result<RsaVerifyingKey, SignatureError> {
        let (_, cert) = X509Certificate::from_der(&self.der).map_err(|e| {
            SignatureError::InvalidCertificate(format!("Failed to parse certificate: {e}"))
        })?;
        RsaVerifyingKey::from_spki_der(cert.public_key().raw)
    }
}

/// Extracts DER data from a PEM string.
fn pem_to_der(pem: &str, label: &str) -> Option<Vec<u8>> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);

    let start = pem.find(&begin)? + begin.len();
    let end_pos = pem[start..].find(&end)? + start;

    let b64_data: String = pem[start..end_pos]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD.decode(&b64_data).ok()
}
