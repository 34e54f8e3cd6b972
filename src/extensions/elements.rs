//! Extension elements and the per-element extension container

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::attributes::{parse_boolean, ExtensionAttribute};
use crate::documents::Element;
use crate::namespaces::{QName, WSDL_NAMESPACE};

/// A deserialized extension element
pub trait ExtensionElement: fmt::Debug + Send + Sync {
    /// Qualified name of the element
    fn qname(&self) -> &QName;

    /// Value of `wsdl:required`, if present
    fn required(&self) -> Option<bool>;

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;
}

/// Extension element with no registered deserializer; keeps the XML subtree
#[derive(Debug, Clone)]
pub struct UnknownExtensionElement {
    /// The element as it appeared in the document
    pub element: Element,
    required: Option<bool>,
}

impl UnknownExtensionElement {
    /// Wrap an element
    pub fn new(element: Element) -> Self {
        let required = required_flag(&element);
        Self { element, required }
    }
}

impl ExtensionElement for UnknownExtensionElement {
    fn qname(&self) -> &QName {
        &self.element.qname
    }

    fn required(&self) -> Option<bool> {
        self.required
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Read `wsdl:required` from an extension element
pub fn required_flag(element: &Element) -> Option<bool> {
    element
        .attribute(&QName::namespaced(WSDL_NAMESPACE, "required"))
        .and_then(|value| parse_boolean(value).ok())
}

/// Extension attributes and elements attached to one WSDL element
#[derive(Debug, Clone, Default)]
pub struct Extensible {
    /// Extension attributes keyed by qualified name
    pub attributes: IndexMap<QName, ExtensionAttribute>,
    /// Extension elements in document order
    pub elements: Vec<Arc<dyn ExtensionElement>>,
}

impl Extensible {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing is attached
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.elements.is_empty()
    }

    /// Get an extension attribute
    pub fn attribute(&self, qname: &QName) -> Option<&ExtensionAttribute> {
        self.attributes.get(qname)
    }

    /// Get an extension attribute by namespace and local name
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&ExtensionAttribute> {
        self.attributes.get(&QName::namespaced(namespace, local_name))
    }

    /// Extension elements with the given name
    pub fn elements_named<'a>(
        &'a self,
        qname: &'a QName,
    ) -> impl Iterator<Item = &'a Arc<dyn ExtensionElement>> {
        self.elements.iter().filter(move |e| e.qname() == qname)
    }

    /// Extension elements of a concrete type
    pub fn elements_of<T: 'static>(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().filter_map(|e| e.as_any().downcast_ref::<T>())
    }

    /// Distinct namespaces contributing extension attributes, in first-seen order
    pub fn attribute_namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = Vec::new();
        for qname in self.attributes.keys() {
            if let Some(ns) = qname.namespace.as_deref() {
                if !namespaces.contains(&ns) {
                    namespaces.push(ns);
                }
            }
        }
        namespaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    #[test]
    fn test_unknown_element_required_flag() {
        let xml = r#"<x:policy xmlns:x="urn:x" xmlns:wsdl="http://www.w3.org/ns/wsdl" wsdl:required="true"/>"#;
        let element = Document::from_string(xml).unwrap().into_root().unwrap();
        let unknown = UnknownExtensionElement::new(element);

        assert_eq!(unknown.required(), Some(true));
        assert_eq!(unknown.qname(), &QName::namespaced("urn:x", "policy"));
    }

    #[test]
    fn test_attribute_namespaces() {
        let mut ext = Extensible::new();
        ext.attributes.insert(
            QName::namespaced("urn:a", "one"),
            ExtensionAttribute::String("1".into()),
        );
        ext.attributes.insert(
            QName::namespaced("urn:b", "two"),
            ExtensionAttribute::String("2".into()),
        );
        ext.attributes.insert(
            QName::namespaced("urn:a", "three"),
            ExtensionAttribute::String("3".into()),
        );

        assert_eq!(ext.attribute_namespaces(), vec!["urn:a", "urn:b"]);
        assert_eq!(
            ext.attribute_ns("urn:b", "two").and_then(|a| a.as_str()),
            Some("2")
        );
    }

    #[test]
    fn test_elements_of_type() {
        let element = Document::from_string(r#"<x:a xmlns:x="urn:x"/>"#)
            .unwrap()
            .into_root()
            .unwrap();
        let mut ext = Extensible::new();
        ext.elements.push(Arc::new(UnknownExtensionElement::new(element)));

        assert_eq!(ext.elements_of::<UnknownExtensionElement>().count(), 1);
        let name = QName::namespaced("urn:x", "a");
        assert_eq!(ext.elements_named(&name).count(), 1);
    }
}
