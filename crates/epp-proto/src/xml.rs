//! Minimal XML tree used in both directions.
//!
//! [`Element`] builds outbound documents. Values are escaped when the tree
//! is serialized, so an element can never be closed early by its content.
//!
//! [`XmlNode`] is the inbound side: a namespace-resolved tree read with
//! `quick_xml::NsReader`. Elements are addressed by local name; the
//! resolved namespace URI is kept for payload dispatch.

use quick_xml::{
    NsReader,
    escape::escape,
    events::{BytesStart, Event},
    name::{Namespace, ResolveResult},
};

use crate::error::ParseError;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Outbound element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
    CData(String),
}

impl Element {
    /// Create an empty element. `name` may carry a prefix (`domain:name`).
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new(), children: Vec::new() }
    }

    /// Element with a single text child.
    pub fn text_element(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name).text(value)
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child element.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a child element when present.
    #[must_use]
    pub fn child_opt(self, child: Option<Self>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    /// Add every element from `children`.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    /// Add a text child.
    #[must_use]
    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.children.push(Node::Text(value.into()));
        self
    }

    /// Add a CDATA child. Content is emitted verbatim, never entity-escaped.
    #[must_use]
    pub fn cdata(mut self, value: impl Into<String>) -> Self {
        self.children.push(Node::CData(value.into()));
        self
    }

    /// Add `<name>value</name>` unless `value` is empty.
    #[must_use]
    pub fn text_child_nonempty(self, name: &str, value: &str) -> Self {
        if value.is_empty() { self } else { self.child(Self::text_element(name, value)) }
    }

    /// Add `<name>value</name>` when `value` is present and non-empty.
    #[must_use]
    pub fn text_child_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.text_child_nonempty(name, value),
            None => self,
        }
    }

    /// True when the element has neither attributes nor children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Serialize as a standalone document with XML declaration.
    pub fn to_document(&self) -> String {
        let mut out = String::from(DECLARATION);
        self.write_to(&mut out);
        out
    }

    /// Serialize this element (no declaration) into `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(out),
                Node::Text(text) => out.push_str(&escape(text.as_str())),
                Node::CData(data) => write_cdata(out, data),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Emit `data` as CDATA, splitting sections around any `]]>` so the
/// content survives unchanged.
fn write_cdata(out: &mut String, data: &str) {
    out.push_str("<![CDATA[");
    out.push_str(&data.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

/// Inbound element, namespace-resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Resolved namespace URI, if the element is bound to one.
    pub namespace: Option<String>,
    /// Local name (prefix stripped).
    pub name: String,
    /// Attributes by local name, namespace declarations excluded.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Concatenated, unescaped text and CDATA content.
    pub text: String,
}

impl XmlNode {
    /// Parse a complete document and return its root element.
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        let input = std::str::from_utf8(input).map_err(ParseError::xml)?;
        let mut reader = NsReader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Self> = Vec::new();
        let mut root = None;

        loop {
            let (ns, event) = reader.read_resolved_event().map_err(ParseError::xml)?;
            match event {
                Event::Start(start) => {
                    let node = Self::open(ns, &start)?;
                    stack.push(node);
                },
                Event::Empty(start) => {
                    let node = Self::open(ns, &start)?;
                    attach(&mut stack, &mut root, node)?;
                },
                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| ParseError::Xml {
                        reason: "closing tag without opening tag".to_string(),
                    })?;
                    attach(&mut stack, &mut root, node)?;
                },
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape().map_err(ParseError::xml)?);
                    }
                },
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let data = data.into_inner();
                        top.text.push_str(std::str::from_utf8(&data).map_err(ParseError::xml)?);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if !stack.is_empty() {
            return Err(ParseError::Xml { reason: "unexpected end of document".to_string() });
        }
        root.ok_or_else(|| ParseError::Xml { reason: "document has no root element".to_string() })
    }

    fn open(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None,
        };
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(ParseError::xml)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(ParseError::xml)?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self { namespace, name, attributes, children: Vec::new(), text: String::new() })
    }

    /// True when the element has the given namespace and local name.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child element regardless of name.
    pub fn first_child(&self) -> Option<&Self> {
        self.children.first()
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of the first child with the given name, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Self::text).filter(|t| !t.is_empty())
    }

    /// Child that must be present.
    pub fn required_child(&self, name: &'static str) -> Result<&Self, ParseError> {
        self.child(name)
            .ok_or_else(|| ParseError::MissingElement { parent: self.name.clone(), element: name })
    }

    /// Non-empty text of a child that must be present.
    pub fn required_text(&self, name: &'static str) -> Result<&str, ParseError> {
        self.child_text(name)
            .ok_or_else(|| ParseError::MissingElement { parent: self.name.clone(), element: name })
    }

    /// Attribute that must be present.
    pub fn required_attribute(&self, name: &'static str) -> Result<&str, ParseError> {
        self.attribute(name).ok_or_else(|| ParseError::MissingAttribute {
            element: self.name.clone(),
            attribute: name,
        })
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::Xml { reason: "multiple root elements".to_string() });
    }
    *root = Some(node);
    Ok(())
}
