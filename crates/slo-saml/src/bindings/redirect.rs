//! HTTP-Redirect Binding implementation.
//!
//! Implements the SAML 2.0 HTTP-Redirect binding for sending SAML messages
//! via URL query parameters with DEFLATE compression.

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{SamlError, SamlResult};

use super::{DecodedMessage, RedirectParams, RELAY_STATE, SAML_REQUEST, SIGNATURE, SIG_ALG};

/// HTTP-Redirect binding encoder/decoder.
pub struct HttpRedirectBinding;

impl HttpRedirectBinding {
    /// Encodes a serialized message for the `SAMLRequest` parameter.
    ///
    /// With `compress` the UTF-8 bytes are raw-deflated (no zlib framing)
    /// before base64 encoding. The result is not yet URL-encoded.
    pub fn encode_message(xml: &str, compress: bool) -> SamlResult<String> {
        let bytes = if compress {
            deflate_compress(xml.as_bytes())
                .map_err(|e| SamlError::Encoding(e.to_string()))?
        } else {
            xml.as_bytes().to_vec()
        };

        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Decodes a base64 `SAMLRequest` value, inflating it if `compressed`.
    pub fn decode_message(encoded: &str, compressed: bool) -> SamlResult<String> {
        let raw = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        let bytes = if compressed {
            deflate_decompress(&raw)?
        } else {
            raw
        };

        String::from_utf8(bytes)
            .map_err(|e| SamlError::InvalidRequest(format!("Invalid UTF-8 in message: {e}")))
    }

    /// Returns the byte sequence covered by the detached signature.
    ///
    /// Each value is URL-encoded exactly as it is transmitted.
    #[must_use]
    pub fn signed_octets(saml_request: &str, relay_state: Option<&str>, sig_alg: &str) -> String {
        let mut octets = format!("{SAML_REQUEST}={}", urlencoding::encode(saml_request));
        if let Some(relay_state) = relay_state {
            octets.push_str(&format!("&{RELAY_STATE}={}", urlencoding::encode(relay_state)));
        }
        octets.push_str(&format!("&{SIG_ALG}={}", urlencoding::encode(sig_alg)));
        octets
    }

    /// Appends the parameters to the target endpoint URL.
    ///
    /// An existing query string is preserved and extended with `&`; a
    /// trailing `?` or `&` gets no extra separator. A fragment is moved
    /// after the query.
    pub fn build_url(target: &str, params: &RedirectParams) -> SamlResult<String> {
        url::Url::parse(target).map_err(|e| SamlError::MalformedUrl(format!("{target}: {e}")))?;

        let (base, fragment) = match target.find('#') {
            Some(pos) => target.split_at(pos),
            None => (target, ""),
        };

        let separator = if base.ends_with('?') || base.ends_with('&') {
            ""
        } else if base.contains('?') {
            "&"
        } else {
            "?"
        };

        Ok(format!(
            "{base}{separator}{}{fragment}",
            params.to_query_string()
        ))
    }

    /// Returns the target URL without query string and fragment.
    #[must_use]
    pub fn destination(target: &str) -> &str {
        target
            .find(|c| c == '?' || c == '#')
            .map_or(target, |pos| &target[..pos])
    }

    /// Decodes a message from a full redirect URL.
    ///
    /// A request that base64-decodes to XML directly is taken as
    /// uncompressed; anything else is inflated.
    pub fn decode_url(url: &str) -> SamlResult<DecodedMessage> {
        let parsed =
            url::Url::parse(url).map_err(|e| SamlError::MalformedUrl(format!("{url}: {e}")))?;

        let mut saml_request = None;
        let mut relay_state = None;
        let mut signature = None;
        let mut sig_alg = None;

        for (key, value) in parsed.query_pairs() {
            let slot = match key.as_ref() {
                SAML_REQUEST => &mut saml_request,
                RELAY_STATE => &mut relay_state,
                SIGNATURE => &mut signature,
                SIG_ALG => &mut sig_alg,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        let encoded = saml_request.ok_or_else(|| {
            SamlError::InvalidRequest("No SAMLRequest parameter".to_string())
        })?;

        let plain = Self::decode_message(&encoded, false).ok();
        let xml = match plain {
            Some(xml) if xml.trim_start().starts_with('<') => xml,
            _ => Self::decode_message(&encoded, true)?,
        };

        tracing::debug!(
            signed = signature.is_some(),
            relay_state = relay_state.is_some(),
            "redirect message decoded"
        );

        Ok(DecodedMessage {
            xml,
            relay_state,
            signature,
            sig_alg,
        })
    }

    /// Extracts the signed portion of a redirect URL's query string.
    ///
    /// The raw `SAMLRequest`, `RelayState` (if present) and `SigAlg`
    /// components are taken as they appear on the wire, without re-encoding,
    /// and joined in binding order.
    pub fn extract_signed_query(url: &str) -> SamlResult<String> {
        let without_fragment = url.split('#').next().unwrap_or(url);
        let query = without_fragment
            .split_once('?')
            .map(|(_, query)| query)
            .ok_or_else(|| SamlError::InvalidRequest("URL has no query string".to_string()))?;

        let component = |name: &str| {
            query
                .split('&')
                .find(|part| part.split('=').next() == Some(name))
        };

        let saml_request = component(SAML_REQUEST)
            .ok_or_else(|| SamlError::InvalidRequest("No SAMLRequest parameter".to_string()))?;
        let sig_alg = component(SIG_ALG)
            .ok_or_else(|| SamlError::SignatureInvalid("No SigAlg parameter".to_string()))?;

        let mut parts = vec![saml_request];
        if let Some(relay_state) = component(RELAY_STATE) {
            parts.push(relay_state);
        }
        parts.push(sig_alg);

        Ok(parts.join("&"))
    }
}

/// Compresses data using DEFLATE (raw, no zlib header).
pub fn deflate_compress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SamlError::Deflate(format!("Compression error: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SamlError::Deflate(format!("Compression finish error: {e}")))
}

/// Decompresses raw DEFLATE data.
pub fn deflate_decompress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SamlError::Deflate(format!("Decompression error: {e}")))?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = "<samlp:LogoutRequest ID='_abc'>test content here</samlp:LogoutRequest>";

    fn params(saml_request: &str) -> RedirectParams {
        RedirectParams::new(saml_request)
    }

    #[test]
    fn encode_is_deterministic_and_inflates_back() {
        let first = HttpRedirectBinding::encode_message(XML, true).unwrap();
        let second = HttpRedirectBinding::encode_message(XML, true).unwrap();
        assert_eq!(first, second);

        assert_eq!(HttpRedirectBinding::decode_message(&first, true).unwrap(), XML);
    }

    #[test]
    fn uncompressed_is_plain_base64() {
        let encoded = HttpRedirectBinding::encode_message(XML, false).unwrap();
        let raw = base64::engine::general_purpose::STANDARD.decode(&encoded).unwrap();
        assert_eq!(raw, XML.as_bytes());
    }

    #[test]
    fn deflate_has_no_zlib_header() {
        let compressed = deflate_compress(XML.as_bytes()).unwrap();
        // zlib streams start with 0x78
        assert_ne!(compressed[0], 0x78);
        assert_eq!(deflate_decompress(&compressed).unwrap(), XML.as_bytes());
    }

    #[test]
    fn build_url_without_query() {
        let url =
            HttpRedirectBinding::build_url("http://unauth.com/logout", &params("a+b")).unwrap();
        assert_eq!(url, "http://unauth.com/logout?SAMLRequest=a%2Bb");
    }

    #[test]
    fn build_url_with_existing_query() {
        let url =
            HttpRedirectBinding::build_url("http://example.com?field=value", &params("abc"))
                .unwrap();
        assert_eq!(url, "http://example.com?field=value&SAMLRequest=abc");
    }

    #[test]
    fn build_url_with_trailing_separator() {
        let url =
            HttpRedirectBinding::build_url("http://example.com/slo?", &params("abc")).unwrap();
        assert_eq!(url, "http://example.com/slo?SAMLRequest=abc");

        let url =
            HttpRedirectBinding::build_url("http://example.com/slo?a=1&", &params("abc"))
                .unwrap();
        assert_eq!(url, "http://example.com/slo?a=1&SAMLRequest=abc");
    }

    #[test]
    fn build_url_moves_fragment_to_the_end() {
        let url =
            HttpRedirectBinding::build_url("http://example.com/slo#top", &params("abc"))
                .unwrap();
        assert_eq!(url, "http://example.com/slo?SAMLRequest=abc#top");
    }

    #[test]
    fn build_url_rejects_malformed_target() {
        let err = HttpRedirectBinding::build_url("not a url", &params("abc")).unwrap_err();
        assert!(matches!(err, SamlError::MalformedUrl(_)));
    }

    #[test]
    fn destination_drops_query_and_fragment() {
        assert_eq!(
            HttpRedirectBinding::destination("http://example.com/slo?field=value#x"),
            "http://example.com/slo"
        );
        assert_eq!(
            HttpRedirectBinding::destination("http://example.com/slo"),
            "http://example.com/slo"
        );
    }

    #[test]
    fn signed_octets_order_and_encoding() {
        assert_eq!(
            HttpRedirectBinding::signed_octets("a+b", None, "urn:x#y"),
            "SAMLRequest=a%2Bb&SigAlg=urn%3Ax%23y"
        );
        assert_eq!(
            HttpRedirectBinding::signed_octets("a", Some(""), "s"),
            "SAMLRequest=a&RelayState=&SigAlg=s"
        );
    }

    #[test]
    fn decode_url_round_trip() {
        let encoded = HttpRedirectBinding::encode_message(XML, true).unwrap();
        let mut p = params(&encoded);
        p.push(RELAY_STATE, Some("state 123".to_string()));
        let url = HttpRedirectBinding::build_url("https://idp.example.com/slo", &p).unwrap();

        let decoded = HttpRedirectBinding::decode_url(&url).unwrap();
        assert_eq!(decoded.xml, XML);
        assert_eq!(decoded.relay_state.as_deref(), Some("state 123"));
        assert!(decoded.signature.is_none());
    }

    #[test]
    fn decode_url_accepts_uncompressed_request() {
        let encoded = HttpRedirectBinding::encode_message(XML, false).unwrap();
        let url =
            HttpRedirectBinding::build_url("https://idp.example.com/slo", &params(&encoded))
                .unwrap();

        assert_eq!(HttpRedirectBinding::decode_url(&url).unwrap().xml, XML);
    }

    #[test]
    fn extract_signed_query_uses_raw_components() {
        let url = "https://idp.example.com/slo?a=1&SAMLRequest=ab%2Bc&RelayState=x%20y\
                   &SigAlg=rsa%23sha256&Signature=sig#frag";
        let query = HttpRedirectBinding::extract_signed_query(url).unwrap();

        assert_eq!(query, "SAMLRequest=ab%2Bc&RelayState=x%20y&SigAlg=rsa%23sha256");
    }

    #[test]
    fn extract_signed_query_requires_sig_alg() {
        let err =
            HttpRedirectBinding::extract_signed_query("https://idp/slo?SAMLRequest=abc").unwrap_err();
        assert!(matches!(err, SamlError::SignatureInvalid(_)));
    }
}
