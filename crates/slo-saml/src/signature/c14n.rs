//! Exclusive XML Canonicalization 1.0, without comments.
//!
//! Produces the octets that are digested and signed. The input is a
//! serialized document; the output is its canonical form:
//!
//! - no XML declaration, comments or processing instructions
//! - empty elements written as start/end pairs
//! - attribute values double-quoted, attributes sorted by namespace URI
//!   then local name
//! - a namespace declaration is emitted only on elements that visibly use
//!   it (or list it in the inclusive prefix list) and only when the nearest
//!   output ancestor has not already emitted the same binding
//!
//! Two selections are supported: an apex element (canonicalize one subtree,
//! keeping the namespace context it inherits) and the enveloped-signature
//! transform (drop the `ds:Signature` child of the apex).

use std::collections::BTreeSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{SamlError, SamlResult};
use crate::types::{XMLDSIG_NS, XML_NS};

/// Exclusive C14N with optional subtree selection.
#[derive(Debug, Clone, Default)]
pub struct ExclusiveCanonicalizer {
    apex: Option<(String, String)>,
    inclusive_prefixes: Vec<String>,
    enveloped_signature: bool,
}

impl ExclusiveCanonicalizer {
    /// Canonicalizes the whole document element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes only the first element with this namespace and local name.
    #[must_use]
    pub fn with_apex(mut self, namespace: &str, local_name: &str) -> Self {
        self.apex = Some((namespace.to_string(), local_name.to_string()));
        self
    }

    /// Sets the `InclusiveNamespaces` prefix list (space separated,
    /// `#default` for the default namespace).
    #[must_use]
    pub fn with_inclusive_prefixes(mut self, prefix_list: &str) -> Self {
        self.inclusive_prefixes = prefix_list
            .split_whitespace()
            .map(|p| if p == "#default" { String::new() } else { p.to_string() })
            .collect();
        self
    }

    /// Applies the enveloped-signature transform.
    #[must_use]
    pub const fn enveloped_signature(mut self, enabled: bool) -> Self {
        self.enveloped_signature = enabled;
        self
    }

    /// Canonicalizes `xml`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::XmlParse`] if the document is malformed, uses an
    /// undeclared prefix, or does not contain the apex element.
    pub fn canonicalize(&self, xml: &str) -> SamlResult<String> {
        let mut reader = Reader::from_str(xml);
        let mut state = State::default();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => {
                    let element = parse_start(&e)?;
                    state.open(self, element)?;
                }
                Event::Empty(e) => {
                    let element = parse_start(&e)?;
                    let name = element.qname.clone();
                    state.open(self, element)?;
                    state.close(&name);
                }
                Event::End(e) => {
                    let name = utf8(e.name().as_ref())?.to_string();
                    state.close(&name);
                }
                Event::Text(t) => {
                    if state.emitting() {
                        let text = t.unescape().map_err(xml_error)?;
                        escape_text(&text, &mut state.out);
                    }
                }
                Event::CData(c) => {
                    if state.emitting() {
                        escape_text(utf8(&c)?, &mut state.out);
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            if state.done {
                break;
            }
        }

        if !state.done {
            let what = match &self.apex {
                Some((ns, local)) => format!("element {{{ns}}}{local} not found"),
                None => "document has no root element".to_string(),
            };
            return Err(SamlError::XmlParse(what));
        }

        Ok(state.out)
    }

    fn is_apex(&self, namespace: &str, local_name: &str) -> bool {
        match &self.apex {
            Some((ns, local)) => ns == namespace && local == local_name,
            None => true,
        }
    }
}

/// A start tag with namespace declarations split from attributes.
struct Element {
    qname: String,
    prefix: String,
    local: String,
    declarations: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
}

#[derive(Default)]
struct State {
    /// Declarations in the input, one frame per open element.
    scope: Vec<Vec<(String, String)>>,
    /// Declarations already written, one frame per open output element.
    rendered: Vec<Vec<(String, String)>>,
    depth: usize,
    apex_depth: Option<usize>,
    skip_depth: Option<usize>,
    done: bool,
    out: String,
}

impl State {
    fn emitting(&self) -> bool {
        self.apex_depth.is_some() && self.skip_depth.is_none() && !self.done
    }

    fn open(&mut self, c14n: &ExclusiveCanonicalizer, element: Element) -> SamlResult<()> {
        self.depth += 1;
        self.scope.push(element.declarations.clone());

        if self.done || self.skip_depth.is_some() {
            return Ok(());
        }

        let namespace = self.resolve(&element.prefix)?;
        match self.apex_depth {
            None => {
                if !c14n.is_apex(&namespace, &element.local) {
                    return Ok(());
                }
                self.apex_depth = Some(self.depth);
            }
            Some(apex) => {
                if c14n.enveloped_signature
                    && self.depth == apex + 1
                    && namespace == XMLDSIG_NS
                    && element.local == "Signature"
                {
                    self.skip_depth = Some(self.depth);
                    return Ok(());
                }
            }
        }

        self.render_start(c14n, &element)
    }

    fn close(&mut self, qname: &str) {
        if self.skip_depth == Some(self.depth) {
            self.skip_depth = None;
        } else if self.emitting() {
            self.out.push_str("</");
            self.out.push_str(qname);
            self.out.push('>');
            self.rendered.pop();
            if self.apex_depth == Some(self.depth) {
                self.done = true;
            }
        }

        self.scope.pop();
        self.depth = self.depth.saturating_sub(1);
    }

    fn render_start(&mut self, c14n: &ExclusiveCanonicalizer, element: &Element) -> SamlResult<()> {
        let mut candidates: BTreeSet<&str> = BTreeSet::new();
        candidates.insert(element.prefix.as_str());
        for (qname, _) in &element.attributes {
            if let Some((prefix, _)) = qname.split_once(':') {
                candidates.insert(prefix);
            }
        }
        for prefix in &c14n.inclusive_prefixes {
            if self.lookup_scope(prefix).is_some() {
                candidates.insert(prefix.as_str());
            }
        }

        let mut declarations = Vec::new();
        for prefix in candidates {
            if prefix == "xml" {
                continue;
            }
            let uri = self.resolve(prefix)?;
            let rendered = self.lookup_rendered(prefix).unwrap_or("");
            if uri != rendered {
                declarations.push((prefix.to_string(), uri));
            }
        }

        let mut attributes = Vec::with_capacity(element.attributes.len());
        for (qname, value) in &element.attributes {
            let (namespace, local) = match qname.split_once(':') {
                Some((prefix, local)) => (self.resolve(prefix)?, local),
                None => (String::new(), qname.as_str()),
            };
            attributes.push((namespace, local, qname.as_str(), value.as_str()));
        }
        attributes.sort_by(|a, b| (a.0.as_str(), a.1).cmp(&(b.0.as_str(), b.1)));

        self.out.push('<');
        self.out.push_str(&element.qname);
        for (prefix, uri) in &declarations {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(prefix);
                self.out.push_str("=\"");
            }
            escape_attr(uri, &mut self.out);
            self.out.push('"');
        }
        for (_, _, qname, value) in attributes {
            self.out.push(' ');
            self.out.push_str(qname);
            self.out.push_str("=\"");
            escape_attr(value, &mut self.out);
            self.out.push('"');
        }
        self.out.push('>');

        self.rendered.push(declarations);
        Ok(())
    }

    /// Namespace URI bound to `prefix` in the input.
    fn resolve(&self, prefix: &str) -> SamlResult<String> {
        if prefix == "xml" {
            return Ok(XML_NS.to_string());
        }
        match self.lookup_scope(prefix) {
            Some(uri) => Ok(uri.to_string()),
            None if prefix.is_empty() => Ok(String::new()),
            None => Err(SamlError::XmlParse(format!(
                "namespace prefix '{prefix}' is not declared"
            ))),
        }
    }

    fn lookup_scope(&self, prefix: &str) -> Option<&str> {
        lookup(&self.scope, prefix)
    }

    fn lookup_rendered(&self, prefix: &str) -> Option<&str> {
        lookup(&self.rendered, prefix)
    }
}

fn lookup<'a>(frames: &'a [Vec<(String, String)>], prefix: &str) -> Option<&'a str> {
    frames
        .iter()
        .rev()
        .flat_map(|frame| frame.iter().rev())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.as_str())
}

fn parse_start(start: &BytesStart<'_>) -> SamlResult<Element> {
    let qname = utf8(start.name().as_ref())?.to_string();
    let (prefix, local) = match qname.split_once(':') {
        Some((prefix, local)) => (prefix.to_string(), local.to_string()),
        None => (String::new(), qname.clone()),
    };

    let mut declarations = Vec::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = utf8(attr.key.as_ref())?.to_string();

        // Attribute-value normalization: literal whitespace becomes a space,
        // character references survive.
        let raw = utf8(&attr.value)?.replace(|c: char| matches!(c, '\t' | '\n' | '\r'), " ");
        let value = quick_xml::escape::unescape(&raw)
            .map_err(xml_error)?
            .into_owned();

        if key == "xmlns" {
            declarations.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((prefix.to_string(), value));
        } else {
            attributes.push((key, value));
        }
    }

    Ok(Element {
        qname,
        prefix,
        local,
        declarations,
        attributes,
    })
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

fn utf8(bytes: &[u8]) -> SamlResult<&str> {
    std::str::from_utf8(bytes).map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> SamlError {
    SamlError::XmlParse(err.to_string())
}
