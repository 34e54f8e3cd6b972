//! XML document handling
//!
//! This module provides the XML node abstraction the WSDL reader is written
//! against. An [`Element`] exposes its qualified name, attributes, children and
//! the namespace bindings in scope, and can resolve prefixed QName values.
//! Trees are built from text with quick-xml, or adapted from an already parsed
//! roxmltree document.

use std::sync::Arc;

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName, XMLNS_NAMESPACE};

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes in document order, `xmlns` declarations excluded
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace scope of this element, chained to its ancestors
    pub namespaces: Arc<NamespaceContext>,
    /// 1-based source line of the start tag, when known
    pub line: Option<usize>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: Arc::new(NamespaceContext::new()),
            line: None,
        }
    }

    /// Get the qualified name of the element
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by qualified name
    pub fn attribute(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Get an unqualified attribute value by local name
    pub fn attribute_local(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.namespace.is_none() && qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.attributes.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.insert(qname, value.into());
    }

    /// Child elements in document order
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Find child elements by qualified name
    pub fn find_children<'a>(&'a self, qname: &'a QName) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |e| &e.qname == qname)
    }

    /// Namespace scope of this element
    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    /// Resolve a prefixed QName value against the bindings in scope here
    pub fn resolve_qname(&self, prefixed: &str) -> Result<QName> {
        self.namespaces.resolve(prefixed)
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes with default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_document_size(xml.len())?;

        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut lines = LineCounter::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let line = lines.line_of(xml, reader.buffer_position(), &e);
                    let scope = current_scope(&element_stack);
                    let element = Self::parse_element(&e, scope, line, limits)?;
                    element_stack.push(element);
                    limits.check_xml_depth(element_stack.len())?;
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let line = lines.line_of(xml, reader.buffer_position(), &e);
                    let scope = current_scope(&element_stack);
                    let element = Self::parse_element(&e, scope, line, limits)?;
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        append_text(current, &text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|e| Error::Xml(format!("Invalid CDATA: {}", e)))?;
                        append_text(current, text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Comments, processing instructions, declarations
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }

        Ok(doc)
    }

    /// Parse element from BytesStart event, resolving names against `parent_scope`
    fn parse_element(
        start: &BytesStart,
        parent_scope: Option<Arc<NamespaceContext>>,
        line: usize,
        limits: &Limits,
    ) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut scope = match parent_scope {
            Some(parent) => NamespaceContext::with_parent(parent),
            None => NamespaceContext::new(),
        };
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                scope.set_default_namespace(attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                scope.add_prefix(prefix, attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }
        limits.check_attributes(raw_attributes.len())?;

        let qname = resolve_element_name(&scope, &name)?;
        let mut element = Element::new(qname);
        element.line = Some(line);

        for (attr_name, attr_value) in raw_attributes {
            let attr_qname = match attr_name.split_once(':') {
                Some((prefix, local)) => {
                    let ns = scope.get_namespace(prefix).ok_or_else(|| {
                        Error::Namespace(format!(
                            "Unbound prefix '{}' on attribute '{}'",
                            prefix, attr_name
                        ))
                    })?;
                    QName::namespaced(ns, local)
                }
                // Unprefixed attributes are in no namespace
                None => QName::local(attr_name),
            };
            element.attributes.insert(attr_qname, attr_value);
        }

        element.namespaces = Arc::new(scope);
        Ok(element)
    }

    /// Adapt an already parsed roxmltree document
    pub fn from_roxmltree(doc: &roxmltree::Document<'_>) -> Result<Self> {
        Self::from_roxmltree_with_limits(doc, &Limits::default())
    }

    /// Adapt an already parsed roxmltree document under custom limits
    pub fn from_roxmltree_with_limits(doc: &roxmltree::Document<'_>, limits: &Limits) -> Result<Self> {
        let root = convert_roxmltree_node(doc, doc.root_element(), None, 1, limits)?;
        Ok(Self { root: Some(root) })
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Get the root element mutably
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }

    /// Take the root element out of the document
    pub fn into_root(self) -> Option<Element> {
        self.root
    }
}

fn current_scope(stack: &[Element]) -> Option<Arc<NamespaceContext>> {
    stack.last().map(|parent| Arc::clone(&parent.namespaces))
}

fn append_text(element: &mut Element, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    match element.text {
        Some(ref mut existing) => existing.push_str(text),
        None => element.set_text(text.to_string()),
    }
}

fn resolve_element_name(scope: &NamespaceContext, name: &str) -> Result<QName> {
    match name.split_once(':') {
        Some((prefix, local)) => {
            let ns = scope.get_namespace(prefix).ok_or_else(|| {
                Error::Namespace(format!("Unbound prefix '{}' on element '{}'", prefix, name))
            })?;
            Ok(QName::namespaced(ns, local))
        }
        None => Ok(QName::new(scope.get_default_namespace(), name)),
    }
}

/// Tracks line numbers incrementally while the reader advances
#[derive(Default)]
struct LineCounter {
    position: usize,
    newlines: usize,
}

impl LineCounter {
    /// Line of the tag that ends at `end`
    fn line_of(&mut self, xml: &[u8], end: usize, tag: &BytesStart) -> usize {
        let end = end.min(xml.len());
        if end > self.position {
            self.newlines += count_newlines(&xml[self.position..end]);
            self.position = end;
        }
        let inside_tag = count_newlines(tag);
        self.newlines.saturating_sub(inside_tag) + 1
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

fn convert_roxmltree_node(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    parent_scope: Option<Arc<NamespaceContext>>,
    depth: usize,
    limits: &Limits,
) -> Result<Element> {
    limits.check_xml_depth(depth)?;

    // roxmltree reports every binding in scope; keep only the new ones
    let mut scope = match parent_scope {
        Some(ref parent) => NamespaceContext::with_parent(Arc::clone(parent)),
        None => NamespaceContext::new(),
    };
    for ns in node.namespaces() {
        let inherited = match (parent_scope.as_deref(), ns.name()) {
            (Some(parent), Some(prefix)) => parent.get_namespace(prefix) == Some(ns.uri()),
            (Some(parent), None) => parent.get_default_namespace() == Some(ns.uri()),
            (None, _) => false,
        };
        if inherited {
            continue;
        }
        match ns.name() {
            Some(prefix) => scope.add_prefix(prefix, ns.uri()),
            None => scope.set_default_namespace(ns.uri()),
        }
    }

    let tag = node.tag_name();
    let mut element = Element::new(QName::new(tag.namespace(), tag.name()));
    element.line = Some(doc.text_pos_at(node.range().start).row as usize);

    for attr in node.attributes() {
        if attr.namespace() == Some(XMLNS_NAMESPACE) {
            continue;
        }
        element
            .attributes
            .insert(QName::new(attr.namespace(), attr.name()), attr.value().to_string());
    }
    limits.check_attributes(element.attributes.len())?;

    let scope = Arc::new(scope);
    element.namespaces = Arc::clone(&scope);

    for child in node.children() {
        if child.is_element() {
            let converted =
                convert_roxmltree_node(doc, child, Some(Arc::clone(&scope)), depth + 1, limits)?;
            element.add_child(converted);
        } else if child.is_text() {
            if let Some(text) = child.text() {
                append_text(&mut element, text.trim());
            }
        }
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::WSDL_NAMESPACE;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.root.is_none());
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.attribute_local("attr1"), Some("value1"));
        assert_eq!(root.attribute_local("attr2"), Some("value2"));
    }

    #[test]
    fn test_element_and_attribute_namespaces() {
        let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl"
                         xmlns:wsdlx="http://www.w3.org/ns/wsdl-extensions">
            <interface name="I"><operation name="op" wsdlx:safe="true"/></interface>
        </description>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.qname, QName::wsdl("description"));
        let op = &root.children[0].children[0];
        assert_eq!(op.namespace(), Some(WSDL_NAMESPACE));
        assert_eq!(op.attribute_local("name"), Some("op"));
        assert_eq!(
            op.attribute(&QName::namespaced(crate::namespaces::WSDLX_NAMESPACE, "safe")),
            Some("true")
        );
    }

    #[test]
    fn test_resolve_qname_walks_ancestors() {
        let xml = r#"<a xmlns:ns1="urn:example"><b><c ref="ns1:Foo" bad="ns2:Foo"/></b></a>"#;
        let doc = Document::from_string(xml).unwrap();

        let c = &doc.root.unwrap().children[0].children[0];
        let value = c.attribute_local("ref").unwrap();
        assert_eq!(
            c.resolve_qname(value).unwrap(),
            QName::namespaced("urn:example", "Foo")
        );
        assert!(c.resolve_qname(c.attribute_local("bad").unwrap()).is_err());
    }

    #[test]
    fn test_unbound_element_prefix_is_error() {
        let result = Document::from_string("<x:root/>");
        assert!(matches!(result, Err(Error::Namespace(_))));
    }

    #[test]
    fn test_line_numbers() {
        let xml = "<root>\n  <first/>\n\n  <second\n     a=\"1\"/>\n</root>";
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.line, Some(1));
        assert_eq!(root.children[0].line, Some(2));
        assert_eq!(root.children[1].line, Some(4));
    }

    #[test]
    fn test_depth_limit() {
        let mut limits = Limits::default();
        limits.max_xml_depth = 2;
        let result = Document::parse_with_limits(b"<a><b><c/></b></a>", &limits);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_from_roxmltree() {
        let xml = r#"<a xmlns="urn:default" xmlns:p="urn:p">
  <b p:x="1">hello</b>
</a>"#;
        let parsed = roxmltree::Document::parse(xml).unwrap();
        let doc = Document::from_roxmltree(&parsed).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.qname, QName::namespaced("urn:default", "a"));
        assert_eq!(root.namespaces.get_namespace("p"), Some("urn:p"));

        let b = &root.children[0];
        assert_eq!(b.line, Some(2));
        assert_eq!(b.text.as_deref(), Some("hello"));
        assert_eq!(b.attribute(&QName::namespaced("urn:p", "x")), Some("1"));
        assert!(b.namespaces.iter().next().is_none());
        assert_eq!(b.resolve_qname("p:y").unwrap(), QName::namespaced("urn:p", "y"));
    }

    #[test]
    fn test_from_roxmltree_depth_limit() {
        let parsed = roxmltree::Document::parse("<a><b><c/></b></a>").unwrap();
        let mut limits = Limits::default();
        limits.max_xml_depth = 2;

        let result = Document::from_roxmltree_with_limits(&parsed, &limits);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
        assert!(Document::from_roxmltree(&parsed).is_ok());
    }
}
