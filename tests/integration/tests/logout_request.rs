//! LogoutRequest construction and Redirect binding tests.

use std::collections::HashSet;

use slo_core::Settings;
use slo_saml::{HttpRedirectBinding, RequestParams, SloRequest};

use crate::common::{decode_saml_request_payload, query_param, settings};

#[test]
fn creates_deflated_saml_request_url() -> anyhow::Result<()> {
    let url = SloRequest::new().create(&settings(), &RequestParams::new())?;
    assert!(url.starts_with("http://unauth.com/logout?SAMLRequest="));

    let inflated = decode_saml_request_payload(&url)?;
    assert!(inflated.starts_with("<samlp:LogoutRequest"));
    assert!(inflated.contains("<saml:NameID>f00f00</saml:NameID>"));
    assert!(!inflated.contains("Signature"));
    Ok(())
}

#[test]
fn supports_additional_params() -> anyhow::Result<()> {
    let url = SloRequest::new()
        .create(&settings(), &RequestParams::new().with_param("hello", None))?;
    assert!(url.ends_with("&hello="));

    let url = SloRequest::new().create(
        &settings(),
        &RequestParams::new().with_param("foo", Some("bar".to_string())),
    )?;
    assert!(url.ends_with("&foo=bar"));
    Ok(())
}

#[test]
fn sets_session_index() -> anyhow::Result<()> {
    let session_index = slo_crypto::generate_id();
    let settings = Settings {
        session_index: Some(session_index.clone()),
        ..settings()
    };

    let url = SloRequest::new().create(&settings, &RequestParams::new().with_name_id("there"))?;
    let inflated = decode_saml_request_payload(&url)?;

    assert_eq!(inflated.matches("<samlp:SessionIndex>").count(), 1);
    assert!(inflated.contains(&format!("{session_index}</samlp:SessionIndex>")));
    Ok(())
}

#[test]
fn sets_name_identifier_value() -> anyhow::Result<()> {
    let settings = Settings {
        name_identifier_format: Some("transient".to_string()),
        name_identifier_value: Some("abc123".to_string()),
        ..settings()
    };

    // a plain query parameter does not touch the NameID
    let params = RequestParams::new().with_param("name_id", Some("there".to_string()));
    let url = SloRequest::new().create(&settings, &params)?;
    let inflated = decode_saml_request_payload(&url)?;

    assert!(inflated.contains("<saml:NameID Format='transient'>abc123</saml:NameID>"));
    assert_eq!(query_param(&url, "name_id")?.as_deref(), Some("there"));
    Ok(())
}

#[test]
fn target_url_without_query_string() -> anyhow::Result<()> {
    let settings = Settings {
        idp_slo_target_url: Some("http://example.com".to_string()),
        ..settings()
    };

    let url = SloRequest::new().create(&settings, &RequestParams::new())?;
    assert!(url.starts_with("http://example.com?SAMLRequest"));
    Ok(())
}

#[test]
fn target_url_with_query_string() -> anyhow::Result<()> {
    let settings = Settings {
        idp_slo_target_url: Some("http://example.com?field=value".to_string()),
        ..settings()
    };

    let url = SloRequest::new().create(&settings, &RequestParams::new())?;
    assert!(url.starts_with("http://example.com?field=value&SAMLRequest"));

    let inflated = decode_saml_request_payload(&url)?;
    assert!(inflated.contains("Destination='http://example.com'"));
    Ok(())
}

#[test]
fn request_id_is_available_for_tracking() -> anyhow::Result<()> {
    let request = SloRequest::new();
    let url = request.create(&settings(), &RequestParams::new())?;

    let inflated = decode_saml_request_payload(&url)?;
    assert!(inflated.contains(&format!("ID='{}'", request.id())));
    Ok(())
}

#[test]
fn every_request_gets_a_distinct_id() {
    let ids: HashSet<String> = (0..200).map(|_| SloRequest::new().id().to_string()).collect();
    assert_eq!(ids.len(), 200);
    assert!(ids.iter().all(|id| id.starts_with('_')));
}

#[test]
fn empty_relay_state_is_preserved() -> anyhow::Result<()> {
    let url = SloRequest::new().create(&settings(), &RequestParams::new().with_relay_state(""))?;

    assert!(url.contains("&RelayState="));
    assert_eq!(query_param(&url, "RelayState")?.as_deref(), Some(""));
    Ok(())
}

#[test]
fn uncompressed_request_is_plain_base64() -> anyhow::Result<()> {
    let settings = Settings {
        compress_request: false,
        ..settings()
    };
    let request = SloRequest::new();
    let params = request.create_params(&settings, &RequestParams::new())?;

    let encoded = params
        .saml_request()
        .ok_or_else(|| anyhow::anyhow!("missing SAMLRequest"))?;
    let xml = HttpRedirectBinding::decode_message(encoded, false)?;
    assert!(xml.starts_with("<samlp:LogoutRequest"));
    assert!(xml.contains(&format!("ID='{}'", request.id())));
    Ok(())
}

#[test]
fn decode_url_inverts_create() -> anyhow::Result<()> {
    let request = SloRequest::new();
    let url = request.create(&settings(), &RequestParams::new().with_relay_state("/after/logout"))?;

    let decoded = HttpRedirectBinding::decode_url(&url)?;
    assert!(decoded.xml.contains(request.id()));
    assert_eq!(decoded.relay_state.as_deref(), Some("/after/logout"));
    assert!(decoded.signature.is_none());
    Ok(())
}

#[test]
fn settings_from_toml() -> anyhow::Result<()> {
    let settings = Settings::from_toml_str(
        r#"
        idp_slo_target_url = "https://idp.example.com/slo"
        issuer = "https://sp.example.com/metadata"
        name_identifier_value = "alice@example.com"
        name_identifier_format = "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress"
        "#,
    )?;
    settings.validate()?;

    let url = SloRequest::new().create(&settings, &RequestParams::new())?;
    let inflated = decode_saml_request_payload(&url)?;
    assert!(inflated.contains("<saml:Issuer>https://sp.example.com/metadata</saml:Issuer>"));
    assert!(inflated.contains(">alice@example.com</saml:NameID>"));
    Ok(())
}
