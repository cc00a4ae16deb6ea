//! XML Signature creation.
//!
//! Provides functionality for signing SAML documents using XML-DSig, and
//! for the detached query-string signature of the HTTP-Redirect binding.

use base64::Engine;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use slo_crypto::{hash, Certificate, SignatureProvider};

use crate::bindings::HttpRedirectBinding;
use crate::error::{SamlError, SamlResult};
use crate::types::{
    canonicalization_algorithms, transform_algorithms, INCLUSIVE_NAMESPACE_PREFIXES, XMLDSIG_NS,
};

use super::{ExclusiveCanonicalizer, SignatureConfig};

/// XML document signer.
///
/// Signs SAML documents with the given key. Signing is synchronous; a
/// [`SignatureProvider`] backed by a remote key store may block.
pub struct XmlSigner<'k> {
    key: &'k dyn SignatureProvider,
    certificate: Option<&'k Certificate>,
    config: SignatureConfig,
}

impl<'k> XmlSigner<'k> {
    /// Creates a new signer.
    ///
    /// The certificate is only needed for embedded signatures.
    pub fn new(key: &'k dyn SignatureProvider, certificate: Option<&'k Certificate>) -> Self {
        Self {
            key,
            certificate,
            config: SignatureConfig::default(),
        }
    }

    /// Sets the signature configuration.
    #[must_use]
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Signs an XML document with an enveloped signature.
    ///
    /// # Arguments
    ///
    /// * `xml` - The XML document to sign
    /// * `reference_id` - The `ID` of the root element (without the '#' prefix)
    ///
    /// # Returns
    ///
    /// The signed XML document with `<ds:Signature>` inserted after the
    /// `Issuer` element, or as the first child when there is no issuer.
    pub fn sign(&self, xml: &str, reference_id: &str) -> SamlResult<String> {
        let certificate = match (self.config.include_certificate, self.certificate) {
            (true, None) => {
                return Err(SamlError::Configuration(
                    "certificate required for embedded signing".to_string(),
                ))
            }
            (true, Some(cert)) => Some(cert),
            (false, _) => None,
        };

        let insert_position = find_insert_position(xml, reference_id)?;

        let canonical_document = ExclusiveCanonicalizer::new()
            .with_inclusive_prefixes(INCLUSIVE_NAMESPACE_PREFIXES)
            .enveloped_signature(true)
            .canonicalize(xml)?;
        let digest = hash(self.config.digest.hash(), canonical_document.as_bytes());
        let digest_b64 = base64::engine::general_purpose::STANDARD.encode(digest);

        let signed_info = build_signed_info(reference_id, &digest_b64, &self.config);

        // SignedInfo is canonicalized in the context of its ds:Signature parent.
        let canonical_signed_info = ExclusiveCanonicalizer::new()
            .with_apex(XMLDSIG_NS, "SignedInfo")
            .canonicalize(&format!(
                "<ds:Signature xmlns:ds='{XMLDSIG_NS}'>{signed_info}</ds:Signature>"
            ))?;

        let signature_value = self.sign_data(canonical_signed_info.as_bytes())?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature_value);

        let signature_element = build_signature_element(&signed_info, &signature_b64, certificate);

        tracing::debug!(
            reference = reference_id,
            signature_method = self.config.algorithm.uri(),
            digest_method = self.config.digest.uri(),
            "embedded signature created"
        );

        Ok(insert_signature(xml, insert_position, &signature_element))
    }

    /// Creates a detached signature for HTTP-Redirect binding.
    ///
    /// `saml_request` is the base64 `SAMLRequest` value before URL encoding.
    /// Returns the base64 `Signature` parameter value.
    pub fn sign_redirect_binding(
        &self,
        saml_request: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<String> {
        let to_sign = HttpRedirectBinding::signed_octets(
            saml_request,
            relay_state,
            self.config.algorithm.uri(),
        );

        let signature = self.sign_data(to_sign.as_bytes())?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature);

        tracing::debug!(
            signature_method = self.config.algorithm.uri(),
            relay_state = relay_state.is_some(),
            "query string signature created"
        );

        Ok(signature_b64)
    }

    fn sign_data(&self, data: &[u8]) -> SamlResult<Vec<u8>> {
        Ok(self.key.sign(self.config.algorithm, data)?)
    }
}

/// Finds where the signature goes: after a leading `Issuer` child of the
/// root element, otherwise right after the root start tag.
fn find_insert_position(xml: &str, reference_id: &str) -> SamlResult<usize> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut insert_at = None;
    let mut in_issuer = false;

    loop {
        let event = reader.read_event()?;
        let position = usize::try_from(reader.buffer_position())
            .map_err(|_| SamlError::SignatureCreation("document too large".to_string()))?;

        match event {
            Event::Start(e) if depth == 0 => {
                let id = e
                    .try_get_attribute("ID")
                    .map_err(|e| SamlError::XmlParse(e.to_string()))?
                    .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                    .transpose()
                    .map_err(|e| SamlError::XmlParse(e.to_string()))?;
                if id.as_deref() != Some(reference_id) {
                    return Err(SamlError::SignatureCreation(format!(
                        "root element ID does not match reference '{reference_id}'"
                    )));
                }
                insert_at = Some(position);
                depth = 1;
            }
            Event::Empty(_) if depth == 0 => {
                return Err(SamlError::SignatureCreation(
                    "root element has no content".to_string(),
                ));
            }
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    if e.local_name().as_ref() == b"Issuer" {
                        in_issuer = true;
                    } else {
                        break;
                    }
                }
            }
            Event::Empty(e) if depth == 1 => {
                if e.local_name().as_ref() == b"Issuer" {
                    insert_at = Some(position);
                }
                break;
            }
            Event::End(_) => {
                if in_issuer && depth == 2 {
                    insert_at = Some(position);
                    break;
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    insert_at.ok_or_else(|| SamlError::SignatureCreation("no root element found".to_string()))
}

/// Builds the SignedInfo element.
fn build_signed_info(reference_id: &str, digest_b64: &str, config: &SignatureConfig) -> String {
    let c14n = canonicalization_algorithms::EXCLUSIVE_C14N;
    format!(
        "<ds:SignedInfo>\
         <ds:CanonicalizationMethod Algorithm='{c14n}'/>\
         <ds:SignatureMethod Algorithm='{signature_method}'/>\
         <ds:Reference URI='#{reference}'>\
         <ds:Transforms>\
         <ds:Transform Algorithm='{enveloped}'/>\
         <ds:Transform Algorithm='{c14n}'>\
         <ec:InclusiveNamespaces xmlns:ec='{c14n}' PrefixList='{prefixes}'/>\
         </ds:Transform>\
         </ds:Transforms>\
         <ds:DigestMethod Algorithm='{digest_method}'/>\
         <ds:DigestValue>{digest_b64}</ds:DigestValue>\
         </ds:Reference>\
         </ds:SignedInfo>",
        signature_method = config.algorithm.uri(),
        reference = escape(reference_id),
        enveloped = transform_algorithms::ENVELOPED_SIGNATURE,
        prefixes = INCLUSIVE_NAMESPACE_PREFIXES,
        digest_method = config.digest.uri(),
    )
}

/// Builds the complete Signature element.
fn build_signature_element(
    signed_info: &str,
    signature_value: &str,
    certificate: Option<&Certificate>,
) -> String {
    let mut signature = format!(
        "<ds:Signature xmlns:ds='{XMLDSIG_NS}'>{signed_info}\
         <ds:SignatureValue>{signature_value}</ds:SignatureValue>"
    );

    if let Some(cert) = certificate {
        signature.push_str(&format!(
            "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{}</ds:X509Certificate>\
             </ds:X509Data></ds:KeyInfo>",
            cert.to_base64()
        ));
    }

    signature.push_str("</ds:Signature>");
    signature
}

/// Inserts the signature into the XML document.
fn insert_signature(xml: &str, position: usize, signature: &str) -> String {
    format!("{}{}{}", &xml[..position], signature, &xml[position..])
}
