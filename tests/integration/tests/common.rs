//! Common test utilities and fixtures.

use slo_core::{SecuritySettings, Settings};
use slo_crypto::Certificate;
use slo_saml::HttpRedirectBinding;

/// Service provider private key (PKCS#1).
pub const SP_KEY: &str = include_str!("../../../testdata/sp.key");

/// Certificate matching [`SP_KEY`].
pub const SP_CERT: &str = include_str!("../../../testdata/sp.crt");

/// An unrelated key (PKCS#8).
pub const OTHER_KEY: &str = include_str!("../../../testdata/other_pkcs8.key");

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("slo_saml=debug,slo_core=debug")
        .with_test_writer()
        .try_init();
}

/// Unsigned settings pointing at `http://unauth.com/logout`.
pub fn settings() -> Settings {
    init_tracing();
    Settings {
        idp_slo_target_url: Some("http://unauth.com/logout".to_string()),
        name_identifier_value: Some("f00f00".to_string()),
        ..Settings::default()
    }
}

/// Settings with signing enabled and key material configured.
pub fn signed_settings(embed_sign: bool) -> Settings {
    Settings {
        idp_slo_target_url: Some("http://example.com?field=value".to_string()),
        certificate: Some(SP_CERT.to_string()),
        private_key: Some(SP_KEY.to_string()),
        security: SecuritySettings {
            logout_requests_signed: true,
            embed_sign,
            ..SecuritySettings::default()
        },
        ..settings()
    }
}

/// The service provider certificate.
pub fn sp_certificate() -> anyhow::Result<Certificate> {
    Ok(Certificate::from_pem(SP_CERT)?)
}

/// Returns the decoded value of a query parameter.
pub fn query_param(redirect: &str, name: &str) -> anyhow::Result<Option<String>> {
    let url = url::Url::parse(redirect)?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned()))
}

/// Base64-decodes and inflates the `SAMLRequest` of a redirect URL.
pub fn decode_saml_request_payload(redirect: &str) -> anyhow::Result<String> {
    let encoded = query_param(redirect, "SAMLRequest")?
        .ok_or_else(|| anyhow::anyhow!("no SAMLRequest in {redirect}"))?;
    Ok(HttpRedirectBinding::decode_message(&encoded, true)?)
}
