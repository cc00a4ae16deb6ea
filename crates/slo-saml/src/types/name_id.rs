//! SAML Name ID types.
//!
//! Name identifiers name the principal whose session is being terminated.

use quick_xml::escape::escape;

use super::name_id_formats;

/// SAML Name ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameId {
    /// The actual identifier value.
    pub value: String,

    /// The format URI of the name identifier. Emitted verbatim.
    pub format: Option<String>,

    /// The security or administrative domain that qualifies the name.
    pub name_qualifier: Option<String>,
}

impl NameId {
    /// Creates a new name ID with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
            name_qualifier: None,
        }
    }

    /// Creates a new transient name ID.
    #[must_use]
    pub fn transient(value: impl Into<String>) -> Self {
        Self::new(value).with_format_uri(name_id_formats::TRANSIENT)
    }

    /// Sets the format from a URI string.
    #[must_use]
    pub fn with_format_uri(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the name qualifier.
    #[must_use]
    pub fn with_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.name_qualifier = Some(qualifier.into());
        self
    }

    /// Appends `<saml:NameID>` to `out`.
    pub(crate) fn write_xml(&self, out: &mut String) {
        out.push_str("<saml:NameID");
        if let Some(qualifier) = &self.name_qualifier {
            push_attr(out, "NameQualifier", qualifier);
        }
        if let Some(format) = &self.format {
            push_attr(out, "Format", format);
        }
        out.push('>');
        out.push_str(&escape(self.value.as_str()));
        out.push_str("</saml:NameID>");
    }
}

/// Appends ` name='value'` with the value escaped.
pub(crate) fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("='");
    out.push_str(&escape(value));
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_kept_verbatim() {
        let name_id = NameId::new("abc123").with_format_uri("transient");
        assert_eq!(name_id.format.as_deref(), Some("transient"));
        assert_eq!(
            NameId::transient("x").format.as_deref(),
            Some(name_id_formats::TRANSIENT)
        );
    }

    #[test]
    fn writes_attributes_in_schema_order() {
        let mut out = String::new();
        NameId::transient("abc")
            .with_name_qualifier("sp.example.com")
            .write_xml(&mut out);

        assert_eq!(
            out,
            "<saml:NameID NameQualifier='sp.example.com' \
             Format='urn:oasis:names:tc:SAML:2.0:nameid-format:transient'>abc</saml:NameID>"
        );
    }

    #[test]
    fn escapes_value_and_attributes() {
        let mut out = String::new();
        NameId::new("a<b&c").with_name_qualifier("it's").write_xml(&mut out);

        assert_eq!(
            out,
            "<saml:NameID NameQualifier='it&apos;s'>a&lt;b&amp;c</saml:NameID>"
        );
    }
}
