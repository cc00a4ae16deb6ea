//! Embedded and query-string signature tests.

use base64::Engine;
use slo_core::Settings;
use slo_crypto::SignatureAlgorithm;
use slo_saml::{
    digest_algorithms, signature_algorithms, verify_embedded_signature, verify_redirect_signature,
    verify_redirect_url, HttpRedirectBinding, RedirectParams, RequestParams, SamlError, SloRequest,
};

use crate::common::{decode_saml_request_payload, signed_settings, sp_certificate, OTHER_KEY};

fn cgi_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Rebuilds the signed octets independently and verifies `Signature`.
fn assert_query_signature_valid(params: &RedirectParams) -> anyhow::Result<()> {
    let saml_request = params.saml_request().ok_or_else(|| anyhow::anyhow!("no SAMLRequest"))?;
    let relay_state = params.relay_state().ok_or_else(|| anyhow::anyhow!("no RelayState"))?;
    let sig_alg = params.sig_alg().ok_or_else(|| anyhow::anyhow!("no SigAlg"))?;
    let signature = params.signature().ok_or_else(|| anyhow::anyhow!("no Signature"))?;

    let query_string = format!(
        "SAMLRequest={}&RelayState={}&SigAlg={}",
        cgi_escape(saml_request),
        cgi_escape(relay_state),
        cgi_escape(sig_alg)
    );

    let algorithm = SignatureAlgorithm::from_uri(sig_alg)?;
    let raw = base64::engine::general_purpose::STANDARD.decode(signature)?;
    sp_certificate()?
        .public_key()?
        .verify(algorithm, query_string.as_bytes(), &raw)?;
    Ok(())
}

#[test]
fn creates_embedded_signed_request() -> anyhow::Result<()> {
    let settings = Settings {
        compress_request: true,
        ..signed_settings(true)
    };

    let url = SloRequest::new().create(&settings, &RequestParams::new())?;
    let inflated = decode_saml_request_payload(&url)?;

    assert!(inflated.contains("<ds:SignatureValue>"));
    assert!(inflated
        .contains("<ds:SignatureMethod Algorithm='http://www.w3.org/2000/09/xmldsig#rsa-sha1'/>"));
    assert!(inflated.contains("<ds:DigestMethod Algorithm='http://www.w3.org/2000/09/xmldsig#sha1'/>"));

    verify_embedded_signature(&inflated, &sp_certificate()?)?;
    assert!(url::Url::parse(&url)?.query_pairs().all(|(k, _)| k != "Signature"));
    Ok(())
}

#[test]
fn creates_embedded_signed_request_with_sha256_and_sha512() -> anyhow::Result<()> {
    let mut settings = signed_settings(true);
    settings.compress_request = false;
    settings.security.signature_method = signature_algorithms::RSA_SHA256.to_string();
    settings.security.digest_method = digest_algorithms::SHA512_MORE.to_string();

    let params = SloRequest::new().create_params(&settings, &RequestParams::new())?;
    let encoded = params.saml_request().ok_or_else(|| anyhow::anyhow!("no SAMLRequest"))?;
    let request_xml =
        String::from_utf8(base64::engine::general_purpose::STANDARD.decode(encoded)?)?;

    assert!(request_xml.contains("<ds:SignatureValue>"));
    assert!(request_xml.contains(
        "<ds:SignatureMethod Algorithm='http://www.w3.org/2001/04/xmldsig-more#rsa-sha256'/>"
    ));
    assert!(request_xml
        .contains("<ds:DigestMethod Algorithm='http://www.w3.org/2001/04/xmldsig-more#sha512'/>"));

    let signature = verify_embedded_signature(&request_xml, &sp_certificate()?)?;
    assert_eq!(signature.algorithm, SignatureAlgorithm::RSA_SHA256);
    Ok(())
}

#[test]
fn tampered_embedded_request_fails_verification() -> anyhow::Result<()> {
    let url = SloRequest::new().create(&signed_settings(true), &RequestParams::new())?;
    let inflated = decode_saml_request_payload(&url)?;
    let tampered = inflated.replace("f00f00", "mallory");

    assert!(verify_embedded_signature(&tampered, &sp_certificate()?).is_err());
    Ok(())
}

#[test]
fn query_signature_with_rsa_sha1() -> anyhow::Result<()> {
    let mut settings = signed_settings(false);
    settings.security.signature_method = signature_algorithms::RSA_SHA1.to_string();

    let params = SloRequest::new().create_params(
        &settings,
        &RequestParams::new().with_param("RelayState", Some("http://example.com".to_string())),
    )?;

    assert!(params.saml_request().is_some());
    assert_eq!(params.relay_state(), Some("http://example.com"));
    assert_eq!(params.sig_alg(), Some(signature_algorithms::RSA_SHA1));
    assert_query_signature_valid(&params)
}

#[test]
fn query_signature_with_rsa_sha256() -> anyhow::Result<()> {
    let mut settings = signed_settings(false);
    settings.security.signature_method = signature_algorithms::RSA_SHA256.to_string();

    let params = SloRequest::new().create_params(
        &settings,
        &RequestParams::new().with_relay_state("http://example.com"),
    )?;

    assert_eq!(params.sig_alg(), Some(signature_algorithms::RSA_SHA256));
    assert_query_signature_valid(&params)?;
    verify_redirect_signature(&params, &sp_certificate()?)?;
    Ok(())
}

#[test]
fn query_signature_without_relay_state() -> anyhow::Result<()> {
    let params = SloRequest::new().create_params(&signed_settings(false), &RequestParams::new())?;

    assert!(params.relay_state().is_none());
    verify_redirect_signature(&params, &sp_certificate()?)?;

    let xml = HttpRedirectBinding::decode_message(
        params.saml_request().ok_or_else(|| anyhow::anyhow!("no SAMLRequest"))?,
        true,
    )?;
    assert!(!xml.contains("ds:Signature"));
    Ok(())
}

#[test]
fn signed_redirect_url_verifies_and_detects_tampering() -> anyhow::Result<()> {
    let params = RequestParams::new()
        .with_relay_state("/home")
        .with_param("extra", Some("1".to_string()));
    let url = SloRequest::new().create(&signed_settings(false), &params)?;

    assert!(url.starts_with("http://example.com?field=value&SAMLRequest="));
    assert!(url.ends_with("&extra=1"));
    verify_redirect_url(&url, &sp_certificate()?)?;

    let tampered = url.replace("RelayState=%2Fhome", "RelayState=%2Fadmin");
    let err = verify_redirect_url(&tampered, &sp_certificate()?).unwrap_err();
    assert!(matches!(err, SamlError::SignatureInvalid(_)));
    Ok(())
}

#[test]
fn signature_from_another_key_is_rejected() -> anyhow::Result<()> {
    let settings = Settings {
        private_key: Some(OTHER_KEY.to_string()),
        ..signed_settings(false)
    };
    let params = SloRequest::new().create_params(&settings, &RequestParams::new())?;

    assert!(verify_redirect_signature(&params, &sp_certificate()?).is_err());
    Ok(())
}

#[test]
fn unknown_signature_method_is_rejected() {
    let mut settings = signed_settings(false);
    settings.security.signature_method =
        "http://www.w3.org/2001/04/xmldsig-more#rsa-md5".to_string();

    assert!(matches!(
        settings.validate(),
        Err(slo_core::Error::UnsupportedAlgorithm(_))
    ));
    let err = SloRequest::new()
        .create(&settings, &RequestParams::new())
        .unwrap_err();
    assert!(matches!(err, SamlError::UnsupportedAlgorithm(_)));
}

#[test]
fn embedded_signing_without_certificate_is_a_configuration_error() {
    let settings = Settings {
        certificate: None,
        ..signed_settings(true)
    };

    assert!(settings.validate().is_err());
    let err = SloRequest::new()
        .create(&settings, &RequestParams::new())
        .unwrap_err();
    assert!(err.is_configuration_error());
}
