//! SAML HTTP-Redirect binding.
//!
//! Messages are deflated, base64-encoded and URL-encoded into the query
//! string of a browser redirect. The optional detached signature covers the
//! exact `SAMLRequest`, `RelayState` and `SigAlg` query components.
//!
//! # Usage
//!
//! ```rust,ignore
//! use slo_saml::bindings::{HttpRedirectBinding, RedirectParams};
//!
//! let encoded = HttpRedirectBinding::encode_message(&request_xml, true)?;
//! let params = RedirectParams::new(encoded);
//! let url = HttpRedirectBinding::build_url("https://idp.example.com/slo", &params)?;
//! ```

mod redirect;

pub use redirect::*;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Query parameter carrying the encoded request.
pub const SAML_REQUEST: &str = "SAMLRequest";
/// Query parameter carrying the relay state.
pub const RELAY_STATE: &str = "RelayState";
/// Query parameter carrying the signature method URI.
pub const SIG_ALG: &str = "SigAlg";
/// Query parameter carrying the base64 detached signature.
pub const SIGNATURE: &str = "Signature";

/// Decoded SAML binding message.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    /// The decoded XML message.
    pub xml: String,
    /// The RelayState if present.
    pub relay_state: Option<String>,
    /// The detached signature, if present.
    pub signature: Option<String>,
    /// The signature algorithm, if present.
    pub sig_alg: Option<String>,
}

/// Ordered redirect query parameters.
///
/// The order is the order on the wire: `SAMLRequest`, `RelayState`,
/// `SigAlg`, `Signature`, then any extra parameters. A parameter without a
/// value is serialized as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    entries: Vec<(String, Option<String>)>,
}

impl RedirectParams {
    /// Creates a parameter set holding only `SAMLRequest`.
    #[must_use]
    pub fn new(saml_request: impl Into<String>) -> Self {
        Self {
            entries: vec![(SAML_REQUEST.to_string(), Some(saml_request.into()))],
        }
    }

    /// Returns the base64 `SAMLRequest` value.
    #[must_use]
    pub fn saml_request(&self) -> Option<&str> {
        self.get(SAML_REQUEST)
    }

    /// Returns the `RelayState` value.
    #[must_use]
    pub fn relay_state(&self) -> Option<&str> {
        self.get(RELAY_STATE)
    }

    /// Returns the `SigAlg` value.
    #[must_use]
    pub fn sig_alg(&self) -> Option<&str> {
        self.get(SIG_ALG)
    }

    /// Returns the base64 `Signature` value.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.get(SIGNATURE)
    }

    /// Returns the value of the first parameter named `key`.
    ///
    /// A parameter present without a value yields `Some("")`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Returns true if a parameter named `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates over the parameters in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the parameters as `k=v&k=v`, each part URL-encoded.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value.as_deref().unwrap_or(""))
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub(crate) fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.push((key.into(), value));
    }
}

impl Serialize for RedirectParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
