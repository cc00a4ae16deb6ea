//! Service provider settings for single logout.
//!
//! Settings are read once, validated, and then passed by reference into every
//! logout call. Nothing in the request path mutates them; per-call values
//! (relay state, session index overrides) travel separately.
//!
//! ## Example
//!
//! ```toml
//! idp_slo_target_url = "https://idp.example.com/saml/slo"
//! issuer = "https://sp.example.com/metadata"
//! name_identifier_value = "user@example.com"
//! private_key_file = "sp.key"
//! certificate_file = "sp.crt"
//!
//! [security]
//! logout_requests_signed = true
//! signature_method = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slo_crypto::algorithm::{digest_algorithms, signature_algorithms};
use slo_crypto::{Certificate, DigestAlgorithm, RsaSigningKey, SignatureAlgorithm};

use crate::error::{Error, Result};

/// Service provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identity Provider single logout endpoint.
    pub idp_slo_target_url: Option<String>,
    /// Service provider entity ID, emitted as `saml:Issuer`.
    pub issuer: Option<String>,
    /// Subject name identifier.
    pub name_identifier_value: Option<String>,
    /// Name identifier format URI.
    pub name_identifier_format: Option<String>,
    /// Emitted as the NameID `NameQualifier` attribute.
    pub sp_name_qualifier: Option<String>,
    /// Session index of the session being terminated.
    pub session_index: Option<String>,
    /// Signing certificate, PEM or bare base64 DER.
    pub certificate: Option<String>,
    /// RSA private key, PEM (PKCS#1 or PKCS#8).
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    /// Path to the certificate, relative to the settings file.
    pub certificate_file: Option<PathBuf>,
    /// Path to the private key, relative to the settings file.
    pub private_key_file: Option<PathBuf>,
    /// Deflate the request before base64 encoding.
    pub compress_request: bool,
    /// Signing options.
    pub security: SecuritySettings,
}

/// Signing options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Sign logout requests.
    pub logout_requests_signed: bool,
    /// Embed an XML signature in the document instead of signing the query string.
    pub embed_sign: bool,
    /// Signature method URI.
    pub signature_method: String,
    /// Digest method URI, used for embedded signatures only.
    pub digest_method: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idp_slo_target_url: None,
            issuer: None,
            name_identifier_value: None,
            name_identifier_format: None,
            sp_name_qualifier: None,
            session_index: None,
            certificate: None,
            private_key: None,
            certificate_file: None,
            private_key_file: None,
            compress_request: true,
            security: SecuritySettings::default(),
        }
    }
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            logout_requests_signed: false,
            embed_sign: false,
            signature_method: signature_algorithms::RSA_SHA1.to_string(),
            digest_method: digest_algorithms::SHA1.to_string(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("idp_slo_target_url", &self.idp_slo_target_url)
            .field("issuer", &self.issuer)
            .field("name_identifier_value", &self.name_identifier_value)
            .field("name_identifier_format", &self.name_identifier_format)
            .field("sp_name_qualifier", &self.sp_name_qualifier)
            .field("session_index", &self.session_index)
            .field("certificate", &self.certificate.as_ref().map(|_| "<certificate>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("compress_request", &self.compress_request)
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Parses settings from TOML. Key file paths are left unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not valid settings TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads settings from a TOML file and reads any key files it names.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or a referenced key file cannot be read,
    /// or if key material is given both inline and as a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        if let Some(file) = &settings.certificate_file {
            if settings.certificate.is_some() {
                return Err(Error::Config(
                    "certificate and certificate_file are mutually exclusive".to_string(),
                ));
            }
            settings.certificate = Some(std::fs::read_to_string(base.join(file))?);
        }

        if let Some(file) = &settings.private_key_file {
            if settings.private_key.is_some() {
                return Err(Error::Config(
                    "private_key and private_key_file are mutually exclusive".to_string(),
                ));
            }
            settings.private_key = Some(std::fs::read_to_string(base.join(file))?);
        }

        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Returns true if logout requests must carry a signature.
    #[must_use]
    pub const fn signing_enabled(&self) -> bool {
        self.security.logout_requests_signed
    }

    /// Returns true if the signature goes inside the XML document.
    #[must_use]
    pub const fn embedded_signing(&self) -> bool {
        self.security.logout_requests_signed && self.security.embed_sign
    }

    /// Resolves the configured signature method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] for unknown URIs.
    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        Ok(SignatureAlgorithm::from_uri(&self.security.signature_method)?)
    }

    /// Resolves the configured digest method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] for unknown URIs.
    pub fn digest_algorithm(&self) -> Result<DigestAlgorithm> {
        Ok(DigestAlgorithm::from_uri(&self.security.digest_method)?)
    }

    /// Parses the configured private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no key is configured or it cannot be parsed.
    pub fn signing_key(&self) -> Result<RsaSigningKey> {
        let pem = self
            .private_key
            .as_deref()
            .ok_or_else(|| Error::Config("private key required for signing".to_string()))?;
        RsaSigningKey::from_pem(pem).map_err(|e| Error::Config(e.to_string()))
    }

    /// Parses the configured certificate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no certificate is configured or it cannot
    /// be parsed.
    pub fn signing_certificate(&self) -> Result<Certificate> {
        let text = self
            .certificate
            .as_deref()
            .ok_or_else(|| Error::Config("certificate required for embedded signing".to_string()))?;
        Certificate::from_pem(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Checks that these settings can produce logout requests.
    ///
    /// Call this when the service provider is configured so that problems
    /// surface at startup instead of on the first logout.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        let target = self
            .idp_slo_target_url
            .as_deref()
            .ok_or_else(|| Error::Config("idp_slo_target_url is not set".to_string()))?;
        url::Url::parse(target)
            .map_err(|e| Error::Config(format!("idp_slo_target_url '{target}': {e}")))?;

        if !self.signing_enabled() {
            return Ok(());
        }

        let signature = self.signature_algorithm()?;
        self.signing_key()?;
        if signature.is_deprecated() {
            tracing::warn!(
                signature_method = signature.uri(),
                "signature method uses SHA-1, which is deprecated"
            );
        }

        if self.embedded_signing() {
            let digest = self.digest_algorithm()?;
            self.signing_certificate()?;
            if digest.is_deprecated() {
                tracing::warn!(
                    digest_method = digest.uri(),
                    "digest method uses SHA-1, which is deprecated"
                );
            }
        }

        Ok(())
    }
}
