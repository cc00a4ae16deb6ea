//! XML Signature validation.
//!
//! Provides functionality for validating signatures on SAML documents and
//! on HTTP-Redirect query strings.

use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slo_crypto::{hash, Certificate, DigestAlgorithm, SignatureAlgorithm};

use crate::bindings::{HttpRedirectBinding, RedirectParams};
use crate::error::{SamlError, SamlResult};
use crate::types::{canonicalization_algorithms, XMLDSIG_NS};

use super::{ExclusiveCanonicalizer, XmlSignature};

/// XML signature validator.
///
/// Validates signatures using configured trusted certificates.
#[derive(Debug, Clone)]
pub struct XmlSignatureValidator {
    trusted_certificates: Vec<Certificate>,
    /// Whether to allow SHA-1 signatures (deprecated but sometimes needed).
    allow_sha1: bool,
}

impl XmlSignatureValidator {
    /// Creates a new validator with the given trusted certificates.
    #[must_use]
    pub fn new(trusted_certificates: Vec<Certificate>) -> Self {
        Self {
            trusted_certificates,
            allow_sha1: false,
        }
    }

    /// Creates a validator from PEM-encoded certificates.
    pub fn from_pem(certificates_pem: &[&str]) -> SamlResult<Self> {
        let certs = certificates_pem
            .iter()
            .map(|pem| Certificate::from_pem(pem))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(certs))
    }

    /// Allows SHA-1 based signatures.
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Validates the enveloped signature of an XML document.
    ///
    /// The signature must be a direct child of the root element and
    /// reference the root by its `ID`.
    pub fn validate(&self, xml: &str) -> SamlResult<XmlSignature> {
        let (root_id, signature) = extract_signature(xml)?;

        if signature.reference_uri != format!("#{root_id}") {
            return Err(SamlError::SignatureInvalid(format!(
                "reference '{}' does not point to the document root",
                signature.reference_uri
            )));
        }

        self.check_algorithms(signature.algorithm, Some(signature.digest))?;
        self.verify_digest(xml, &signature)?;

        let canonical_signed_info = ExclusiveCanonicalizer::new()
            .with_apex(XMLDSIG_NS, "SignedInfo")
            .canonicalize(xml)?;
        let signature_bytes = decode_b64(&signature.signature_value)?;

        self.verify_with_trusted(
            signature.algorithm,
            canonical_signed_info.as_bytes(),
            &signature_bytes,
        )?;

        tracing::debug!(
            reference = %signature.reference_uri,
            signature_method = signature.algorithm.uri(),
            "embedded signature verified"
        );

        Ok(signature)
    }

    /// Validates a detached signature for HTTP-Redirect binding.
    ///
    /// `signed_query` is the exact `SAMLRequest=..[&RelayState=..]&SigAlg=..`
    /// sequence as it appeared on the wire.
    pub fn validate_redirect_binding(
        &self,
        signed_query: &str,
        signature_b64: &str,
        sig_alg: &str,
    ) -> SamlResult<()> {
        let algorithm = SignatureAlgorithm::from_uri(sig_alg)?;
        self.check_algorithms(algorithm, None)?;

        let signature = decode_b64(signature_b64)?;
        self.verify_with_trusted(algorithm, signed_query.as_bytes(), &signature)
    }

    fn check_algorithms(
        &self,
        algorithm: SignatureAlgorithm,
        digest: Option<DigestAlgorithm>,
    ) -> SamlResult<()> {
        let sha1 = algorithm.is_deprecated() || digest.is_some_and(|d| d.is_deprecated());
        if sha1 && !self.allow_sha1 {
            return Err(SamlError::SignatureInvalid(
                "SHA-1 signatures are not allowed".to_string(),
            ));
        }
        Ok(())
    }

    fn verify_digest(&self, xml: &str, signature: &XmlSignature) -> SamlResult<()> {
        let mut c14n = ExclusiveCanonicalizer::new().enveloped_signature(true);
        if let Some(prefixes) = &signature.inclusive_prefixes {
            c14n = c14n.with_inclusive_prefixes(prefixes);
        }
        let canonical = c14n.canonicalize(xml)?;

        let calculated = hash(signature.digest.hash(), canonical.as_bytes());
        let expected = decode_b64(&signature.digest_value)?;

        if calculated != expected {
            return Err(SamlError::SignatureInvalid("Digest value mismatch".to_string()));
        }
        Ok(())
    }

    fn verify_with_trusted(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> SamlResult<()> {
        if self.trusted_certificates.is_empty() {
            return Err(SamlError::SignatureInvalid(
                "No trusted certificate configured".to_string(),
            ));
        }

        for cert in &self.trusted_certificates {
            let key = cert.public_key()?;
            if key.verify(algorithm, data, signature).is_ok() {
                return Ok(());
            }
        }

        Err(SamlError::SignatureInvalid(
            "Signature verification failed with all trusted certificates".to_string(),
        ))
    }
}

/// Verifies the detached signature of decoded redirect parameters.
///
/// The signed sequence is rebuilt from the parameter values in binding
/// order, so the values must be the ones produced by the sender.
pub fn verify_redirect_signature(
    params: &RedirectParams,
    certificate: &Certificate,
) -> SamlResult<()> {
    let saml_request = params
        .saml_request()
        .ok_or_else(|| SamlError::InvalidRequest("missing SAMLRequest".to_string()))?;
    let sig_alg = params
        .sig_alg()
        .ok_or_else(|| SamlError::SignatureInvalid("missing SigAlg".to_string()))?;
    let signature = params
        .signature()
        .ok_or_else(|| SamlError::SignatureInvalid("missing Signature".to_string()))?;

    let signed = HttpRedirectBinding::signed_octets(saml_request, params.relay_state(), sig_alg);

    XmlSignatureValidator::new(vec![certificate.clone()])
        .allow_sha1(true)
        .validate_redirect_binding(&signed, signature, sig_alg)
}

/// Verifies the detached signature carried in a redirect URL.
///
/// Uses the raw query components of the URL, not re-encoded values.
pub fn verify_redirect_url(url: &str, certificate: &Certificate) -> SamlResult<()> {
    let decoded = HttpRedirectBinding::decode_url(url)?;
    let sig_alg = decoded
        .sig_alg
        .ok_or_else(|| SamlError::SignatureInvalid("missing SigAlg".to_string()))?;
    let signature = decoded
        .signature
        .ok_or_else(|| SamlError::SignatureInvalid("missing Signature".to_string()))?;
    let signed = HttpRedirectBinding::extract_signed_query(url)?;

    XmlSignatureValidator::new(vec![certificate.clone()])
        .allow_sha1(true)
        .validate_redirect_binding(&signed, &signature, &sig_alg)
}

/// Verifies the embedded signature of a document against one certificate.
pub fn verify_embedded_signature(xml: &str, certificate: &Certificate) -> SamlResult<XmlSignature> {
    XmlSignatureValidator::new(vec![certificate.clone()])
        .allow_sha1(true)
        .validate(xml)
}

#[derive(Default)]
struct SignatureParts {
    canonicalization: Option<String>,
    algorithm: Option<String>,
    digest: Option<String>,
    reference_uri: Option<String>,
    inclusive_prefixes: Option<String>,
    digest_value: String,
    signature_value: String,
    certificate: Option<String>,
}

/// Extracts the root ID and the enveloped signature of a document.
fn extract_signature(xml: &str) -> SamlResult<(String, XmlSignature)> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut root_id = None;
    let mut signature_depth = None;
    let mut parts = SignatureParts::default();
    let mut found = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                visit_start(&e, &path, &mut root_id, &mut signature_depth, &mut parts)?;
                path.push(local_name(&e)?);
            }
            Event::Empty(e) => {
                visit_start(&e, &path, &mut root_id, &mut signature_depth, &mut parts)?;
            }
            Event::End(_) => {
                path.pop();
                if signature_depth.is_some_and(|depth| path.len() == depth) {
                    signature_depth = None;
                    found = true;
                }
            }
            Event::Text(t) if signature_depth.is_some() => {
                let text = t
                    .unescape()
                    .map_err(|err| SamlError::XmlParse(err.to_string()))?;
                match path.last().map(String::as_str) {
                    Some("DigestValue") => parts.digest_value.push_str(&text),
                    Some("SignatureValue") => parts.signature_value.push_str(&text),
                    Some("X509Certificate") => parts
                        .certificate
                        .get_or_insert_with(String::new)
                        .push_str(&text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root_id = root_id
        .ok_or_else(|| SamlError::SignatureInvalid("root element has no ID".to_string()))?;
    if !found {
        return Err(SamlError::SignatureInvalid(
            "No Signature element found".to_string(),
        ));
    }

    if parts.canonicalization.as_deref() != Some(canonicalization_algorithms::EXCLUSIVE_C14N) {
        return Err(SamlError::SignatureInvalid(format!(
            "unsupported canonicalization method: {}",
            parts.canonicalization.as_deref().unwrap_or("none")
        )));
    }

    let algorithm = SignatureAlgorithm::from_uri(
        parts
            .algorithm
            .as_deref()
            .ok_or_else(|| missing("SignatureMethod"))?,
    )?;
    let digest =
        DigestAlgorithm::from_uri(parts.digest.as_deref().ok_or_else(|| missing("DigestMethod"))?)?;

    let signature = XmlSignature {
        algorithm,
        digest,
        reference_uri: parts.reference_uri.ok_or_else(|| missing("Reference URI"))?,
        digest_value: strip_whitespace(&parts.digest_value),
        signature_value: strip_whitespace(&parts.signature_value),
        inclusive_prefixes: parts.inclusive_prefixes,
        x509_certificate: parts.certificate.as_deref().map(strip_whitespace),
    };

    Ok((root_id, signature))
}

fn visit_start(
    e: &BytesStart<'_>,
    path: &[String],
    root_id: &mut Option<String>,
    signature_depth: &mut Option<usize>,
    parts: &mut SignatureParts,
) -> SamlResult<()> {
    let name = local_name(e)?;

    if path.is_empty() {
        *root_id = attribute(e, "ID")?;
        return Ok(());
    }

    if signature_depth.is_none() {
        if path.len() == 1 && name == "Signature" {
            *signature_depth = Some(1);
        }
        return Ok(());
    }

    match name.as_str() {
        "CanonicalizationMethod" if path.last().map(String::as_str) == Some("SignedInfo") => {
            parts.canonicalization = attribute(e, "Algorithm")?;
        }
        "SignatureMethod" => parts.algorithm = attribute(e, "Algorithm")?,
        "DigestMethod" => parts.digest = attribute(e, "Algorithm")?,
        "Reference" => parts.reference_uri = attribute(e, "URI")?,
        "InclusiveNamespaces" => parts.inclusive_prefixes = attribute(e, "PrefixList")?,
        _ => {}
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> SamlResult<String> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|err| SamlError::XmlParse(err.to_string()))
}

fn attribute(e: &BytesStart<'_>, name: &str) -> SamlResult<Option<String>> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| SamlError::XmlParse(err.to_string()))?;
    attr.map(|a| a.unescape_value().map(|v| v.into_owned()))
        .transpose()
        .map_err(|err| SamlError::XmlParse(err.to_string()))
}

fn missing(what: &str) -> SamlError {
    SamlError::SignatureInvalid(format!("No {what} found"))
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn decode_b64(value: &str) -> SamlResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(strip_whitespace(value))
        .map_err(|e| SamlError::SignatureInvalid(format!("Invalid base64 value: {e}")))
}
