//! SAML 2.0 Single Logout for service providers.
//!
//! This crate builds SP-initiated LogoutRequest messages for the
//! HTTP-Redirect binding:
//!
//! - **LogoutRequest construction** - Issuer, NameID and SessionIndex from
//!   settings with per-call overrides
//! - **Redirect binding** - Raw DEFLATE, base64 and URL encoding into the
//!   IdP endpoint's query string
//! - **XML signature** - Enveloped XML-DSig signatures over the exclusive
//!   canonical form
//! - **Query string signature** - Detached signatures over the exact
//!   `SAMLRequest`/`RelayState`/`SigAlg` octets
//!
//! # Architecture
//!
//! - [`types`] - The LogoutRequest message and protocol constants
//! - [`signature`] - Canonicalization, signing and verification
//! - [`bindings`] - HTTP-Redirect encoding and decoding
//! - [`slo`] - The [`SloRequest`] entry point
//! - [`error`] - Error types for SAML operations
//!
//! # Example
//!
//! ```rust,ignore
//! use slo_core::Settings;
//! use slo_saml::{RequestParams, SloRequest};
//!
//! let settings = Settings::load("sp.toml")?;
//! settings.validate()?;
//!
//! let request = SloRequest::new();
//! let url = request.create(&settings, &RequestParams::new())?;
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod error;
pub mod signature;
pub mod slo;
pub mod types;

pub use bindings::{DecodedMessage, HttpRedirectBinding, RedirectParams};
pub use error::{SamlError, SamlResult};
pub use signature::{
    verify_embedded_signature, verify_redirect_signature, verify_redirect_url, XmlSigner,
    XmlSignatureValidator,
};
pub use slo::{RequestParams, SloRequest};
pub use types::*;
