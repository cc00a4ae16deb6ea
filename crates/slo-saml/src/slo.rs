//! Service provider initiated Single Logout.
//!
//! [`SloRequest`] turns [`Settings`] plus per-call [`RequestParams`] into an
//! HTTP-Redirect LogoutRequest, either as a complete redirect URL
//! ([`SloRequest::create`]) or as the individual query parameters
//! ([`SloRequest::create_params`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use slo_saml::{RequestParams, SloRequest};
//!
//! let request = SloRequest::new();
//! let url = request.create(&settings, &RequestParams::new().with_relay_state("/home"))?;
//! tracing::info!(request_id = request.id(), "redirecting to IdP");
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use slo_core::Settings;
use slo_crypto::{DigestAlgorithm, IdGenerator, UuidIdGenerator};

use crate::bindings::{
    HttpRedirectBinding, RedirectParams, RELAY_STATE, SAML_REQUEST, SIGNATURE, SIG_ALG,
};
use crate::error::{SamlError, SamlResult};
use crate::signature::{SignatureConfig, XmlSigner};
use crate::types::{LogoutRequest, NameId};

/// Per-call inputs for a logout request.
///
/// Values here override the corresponding [`Settings`] fields for one call
/// only.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    /// Opaque value round-tripped through the IdP.
    pub relay_state: Option<String>,
    /// Session index to terminate, overriding the configured one.
    pub session_index: Option<String>,
    /// Name identifier value, overriding the configured one.
    pub name_id: Option<String>,
    /// Logout reason URI.
    pub reason: Option<String>,
    /// Extra query parameters, appended after the SAML parameters.
    pub extra: Vec<(String, Option<String>)>,
}

impl RequestParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relay state.
    #[must_use]
    pub fn with_relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    /// Sets the session index.
    #[must_use]
    pub fn with_session_index(mut self, session_index: impl Into<String>) -> Self {
        self.session_index = Some(session_index.into());
        self
    }

    /// Sets the name identifier value.
    #[must_use]
    pub fn with_name_id(mut self, name_id: impl Into<String>) -> Self {
        self.name_id = Some(name_id.into());
        self
    }

    /// Sets the logout reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Adds an extra query parameter. `None` is serialized as `key=`.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.extra.push((key.into(), value));
        self
    }

    /// Splits the relay state out of the extra parameters.
    ///
    /// A `RelayState` extra parameter counts as the relay state unless one is
    /// set explicitly. The other binding parameters cannot be supplied.
    fn normalize(&self) -> SamlResult<(Option<String>, Vec<(String, Option<String>)>)> {
        let mut relay_state = self.relay_state.clone();
        let mut extra = Vec::with_capacity(self.extra.len());

        for (key, value) in &self.extra {
            match key.as_str() {
                RELAY_STATE => {
                    if relay_state.is_none() {
                        relay_state = Some(value.clone().unwrap_or_default());
                    }
                }
                SAML_REQUEST | SIG_ALG | SIGNATURE => {
                    return Err(SamlError::InvalidRequest(format!(
                        "'{key}' cannot be passed as an extra parameter"
                    )));
                }
                _ => extra.push((key.clone(), value.clone())),
            }
        }

        Ok((relay_state, extra))
    }
}

/// A single SP-initiated logout request.
///
/// The request ID is generated once, when the value is created, and is
/// available through [`SloRequest::id`] so the caller can correlate the
/// IdP's LogoutResponse.
pub struct SloRequest {
    id: String,
    id_generator: Arc<dyn IdGenerator>,
    issue_instant: Option<DateTime<Utc>>,
}

impl SloRequest {
    /// Creates a request with a random ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidIdGenerator))
    }

    /// Creates a request whose identifiers come from `generator`.
    #[must_use]
    pub fn with_id_generator(generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            id: generator.new_id(),
            id_generator: generator,
            issue_instant: None,
        }
    }

    /// Fixes the issue instant instead of using the time of the call.
    #[must_use]
    pub fn issued_at(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = Some(instant);
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Builds the redirect URL for this request.
    ///
    /// # Errors
    ///
    /// Fails without producing output if the settings are incomplete, name
    /// an unsupported algorithm, or the target URL cannot be parsed.
    pub fn create(&self, settings: &Settings, params: &RequestParams) -> SamlResult<String> {
        let query = self.create_params(settings, params)?;
        HttpRedirectBinding::build_url(target_url(settings)?, &query)
    }

    /// Builds the redirect query parameters for this request.
    ///
    /// The result holds `SAMLRequest`, then `RelayState` if given, then
    /// `SigAlg` and `Signature` for detached signing, then the extra
    /// parameters.
    ///
    /// # Errors
    ///
    /// See [`SloRequest::create`].
    pub fn create_params(
        &self,
        settings: &Settings,
        params: &RequestParams,
    ) -> SamlResult<RedirectParams> {
        let target = target_url(settings)?;
        url::Url::parse(target).map_err(|e| SamlError::MalformedUrl(format!("{target}: {e}")))?;
        let (relay_state, extra) = params.normalize()?;

        let xml = self.create_xml_document(settings, params)?;
        let encoded = HttpRedirectBinding::encode_message(&xml, settings.compress_request)?;

        let mut query = RedirectParams::new(encoded.clone());
        if let Some(relay_state) = &relay_state {
            query.push(RELAY_STATE, Some(relay_state.clone()));
        }

        if settings.signing_enabled() && !settings.embedded_signing() {
            let algorithm = settings.signature_algorithm()?;
            let key = settings.signing_key()?;
            let config = SignatureConfig {
                algorithm,
                digest: DigestAlgorithm::default(),
                include_certificate: false,
            };
            let signature = XmlSigner::new(&key, None)
                .with_config(config)
                .sign_redirect_binding(&encoded, relay_state.as_deref())?;

            query.push(SIG_ALG, Some(algorithm.uri().to_string()));
            query.push(SIGNATURE, Some(signature));
        }

        for (key, value) in extra {
            query.push(key, value);
        }

        tracing::debug!(
            request_id = %self.id,
            compressed = settings.compress_request,
            parameters = query.len(),
            "logout request parameters created"
        );

        Ok(query)
    }

    /// Builds the serialized LogoutRequest, with an embedded signature when
    /// the settings ask for one.
    ///
    /// # Errors
    ///
    /// See [`SloRequest::create`].
    pub fn create_xml_document(
        &self,
        settings: &Settings,
        params: &RequestParams,
    ) -> SamlResult<String> {
        let target = target_url(settings)?;
        let request =
            self.build_request(settings, params, HttpRedirectBinding::destination(target));
        request.validate()?;
        let xml = request.to_xml();

        let signing = match (settings.signing_enabled(), settings.embedded_signing()) {
            (false, _) => "none",
            (true, false) => "detached",
            (true, true) => "embedded",
        };
        tracing::debug!(
            request_id = %self.id,
            destination = request.destination.as_deref().unwrap_or_default(),
            signing,
            "logout request built"
        );

        if !settings.embedded_signing() {
            return Ok(xml);
        }

        let config =
            SignatureConfig::new(settings.signature_algorithm()?, settings.digest_algorithm()?);
        let key = settings.signing_key()?;
        let certificate = settings.signing_certificate()?;

        XmlSigner::new(&key, Some(&certificate))
            .with_config(config)
            .sign(&xml, &self.id)
    }

    fn build_request(
        &self,
        settings: &Settings,
        params: &RequestParams,
        destination: &str,
    ) -> LogoutRequest {
        let name_id_value = params
            .name_id
            .as_ref()
            .or(settings.name_identifier_value.as_ref());

        let mut name_id = match name_id_value {
            Some(value) => {
                let name_id = NameId::new(value.clone());
                match &settings.name_identifier_format {
                    Some(format) => name_id.with_format_uri(format.clone()),
                    None => name_id,
                }
            }
            None => NameId::transient(self.id_generator.new_id()),
        };
        if let Some(qualifier) = &settings.sp_name_qualifier {
            name_id = name_id.with_name_qualifier(qualifier.clone());
        }

        let mut request =
            LogoutRequest::new(self.id.clone(), name_id).with_destination(destination);
        if let Some(instant) = self.issue_instant {
            request = request.issued_at(instant);
        }
        if let Some(issuer) = &settings.issuer {
            request = request.with_issuer(issuer.clone());
        }
        if let Some(index) = params.session_index.as_ref().or(settings.session_index.as_ref()) {
            request = request.with_session_index(index.clone());
        }
        if let Some(reason) = &params.reason {
            request = request.with_reason(reason.clone());
        }
        request
    }
}

impl Default for SloRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SloRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SloRequest")
            .field("id", &self.id)
            .field("issue_instant", &self.issue_instant)
            .finish_non_exhaustive()
    }
}

fn target_url(settings: &Settings) -> SamlResult<&str> {
    settings
        .idp_slo_target_url
        .as_deref()
        .ok_or_else(|| SamlError::Configuration("idp_slo_target_url is not set".to_string()))
}
