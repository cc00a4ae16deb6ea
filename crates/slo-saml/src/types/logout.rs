//! SAML Logout types.
//!
//! The LogoutRequest message and its serialized form.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;

use super::name_id::push_attr;
use super::{logout_reasons, NameId, SAMLP_NS, SAML_NS, SAML_VERSION};
use crate::error::{SamlError, SamlResult};

/// SAML Logout Request.
///
/// A request to terminate an existing session at the Identity Provider.
#[derive(Debug, Clone)]
pub struct LogoutRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    pub version: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the requester.
    pub issuer: Option<String>,

    /// The URL where this request is sent.
    pub destination: Option<String>,

    /// The name identifier of the principal to log out.
    pub name_id: NameId,

    /// Session indexes to terminate.
    pub session_indexes: Vec<String>,

    /// Reason for the logout.
    pub reason: Option<String>,
}

impl LogoutRequest {
    /// User logout reason.
    pub const REASON_USER: &'static str = logout_reasons::USER;

    /// Admin logout reason.
    pub const REASON_ADMIN: &'static str = logout_reasons::ADMIN;

    /// Creates a new logout request issued now.
    #[must_use]
    pub fn new(id: impl Into<String>, name_id: NameId) -> Self {
        Self {
            id: id.into(),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: None,
            destination: None,
            name_id,
            session_indexes: Vec::new(),
            reason: None,
        }
    }

    /// Sets the issuer entity ID.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Adds a session index to terminate.
    #[must_use]
    pub fn with_session_index(mut self, index: impl Into<String>) -> Self {
        self.session_indexes.push(index.into());
        self
    }

    /// Sets the logout reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Overrides the issue instant.
    #[must_use]
    pub fn issued_at(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = instant;
        self
    }

    /// Validates the basic structure of this request.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidRequest`] describing the first problem.
    pub fn validate(&self) -> SamlResult<()> {
        if self.id.is_empty() {
            return Err(SamlError::InvalidRequest("ID is required".to_string()));
        }
        if self.id.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(SamlError::InvalidRequest(format!(
                "ID '{}' must not start with a digit",
                self.id
            )));
        }
        if self.version != SAML_VERSION {
            return Err(SamlError::InvalidRequest(format!(
                "Unsupported SAML version: {}",
                self.version
            )));
        }
        Ok(())
    }

    /// Returns the issue instant in SAML `xs:dateTime` form.
    #[must_use]
    pub fn issue_instant_string(&self) -> String {
        self.issue_instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Serializes the request.
    ///
    /// Attributes are single-quoted and no whitespace is emitted between
    /// elements. There is no XML declaration.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("<samlp:LogoutRequest");
        push_attr(&mut out, "xmlns:samlp", SAMLP_NS);
        push_attr(&mut out, "xmlns:saml", SAML_NS);
        push_attr(&mut out, "ID", &self.id);
        push_attr(&mut out, "Version", &self.version);
        push_attr(&mut out, "IssueInstant", &self.issue_instant_string());
        if let Some(destination) = &self.destination {
            push_attr(&mut out, "Destination", destination);
        }
        if let Some(reason) = &self.reason {
            push_attr(&mut out, "Reason", reason);
        }
        out.push('>');

        if let Some(issuer) = &self.issuer {
            out.push_str("<saml:Issuer>");
            out.push_str(&escape(issuer.as_str()));
            out.push_str("</saml:Issuer>");
        }

        self.name_id.write_xml(&mut out);

        for index in &self.session_indexes {
            out.push_str("<samlp:SessionIndex>");
            out.push_str(&escape(index.as_str()));
            out.push_str("</samlp:SessionIndex>");
        }

        out.push_str("</samlp:LogoutRequest>");
        out
    }
}
