//! SAML 2.0 constants and URIs.
//!
//! Namespace URIs, name ID formats, logout reasons and the XML-DSig
//! transform identifiers used by LogoutRequest signing.

pub use slo_crypto::algorithm::{digest_algorithms, signature_algorithms};

/// SAML 2.0 namespace URI.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace URI.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Reserved namespace of the `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// SAML protocol version emitted on every message.
pub const SAML_VERSION: &str = "2.0";

// ============================================================================
// Name ID Formats
// ============================================================================

/// Name ID format URIs.
pub mod name_id_formats {
    /// Transient identifier format.
    pub const TRANSIENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:transient";
}

// ============================================================================
// Logout reasons
// ============================================================================

/// `Reason` attribute values for LogoutRequest.
pub mod logout_reasons {
    /// The principal asked to log out.
    pub const USER: &str = "urn:oasis:names:tc:SAML:2.0:logout:user";

    /// An administrator terminated the session.
    pub const ADMIN: &str = "urn:oasis:names:tc:SAML:2.0:logout:admin";
}

// ============================================================================
// XML-DSig transforms
// ============================================================================

/// Canonicalization algorithm URIs.
pub mod canonicalization_algorithms {
    /// Exclusive C14N without comments.
    pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
}

/// Transform algorithm URIs.
pub mod transform_algorithms {
    /// Enveloped signature transform.
    pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
}

/// Prefixes treated as visibly used when canonicalizing the signed document.
///
/// Identity Providers built on the same toolkits expect this list in the
/// reference's `ec:InclusiveNamespaces`.
pub const INCLUSIVE_NAMESPACE_PREFIXES: &str = "#default samlp saml ds xs xsi md";
