//! `<description>`, `<import>` and `<include>`

use std::sync::Arc;

use url::Url;

use super::binding::Binding;
use super::common::Documentation;
use super::interface::Interface;
use super::service::Service;
use super::types::Types;
use super::DescriptionId;
use crate::extensions::Extensible;
use crate::namespaces::{NamespaceContext, QName};

/// `<description>`: one WSDL document
#[derive(Debug, Clone)]
pub struct Description {
    /// Slot in the arena
    pub id: DescriptionId,
    /// URI the document was read from
    pub document_base_uri: Url,
    /// `targetNamespace`
    pub target_namespace: Option<String>,
    /// Namespace bindings declared on the root element
    pub namespaces: Arc<NamespaceContext>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// `<import>` children
    pub imports: Vec<Import>,
    /// `<include>` children
    pub includes: Vec<Include>,
    /// `<types>`, at most one
    pub types: Option<Types>,
    /// `<interface>` children
    pub interfaces: Vec<Interface>,
    /// `<binding>` children
    pub bindings: Vec<Binding>,
    /// `<service>` children
    pub services: Vec<Service>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line of the root element
    pub line: Option<usize>,
}

impl Description {
    /// Empty description for a document
    pub fn new(id: DescriptionId, document_base_uri: Url) -> Self {
        Self {
            id,
            document_base_uri,
            target_namespace: None,
            namespaces: Arc::new(NamespaceContext::new()),
            documentation: Vec::new(),
            imports: Vec::new(),
            includes: Vec::new(),
            types: None,
            interfaces: Vec::new(),
            bindings: Vec::new(),
            services: Vec::new(),
            extensions: Extensible::new(),
            line: None,
        }
    }

    /// Interface declared in this document
    pub fn interface(&self, qname: &QName) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|i| i.qname().as_ref() == Some(qname))
    }

    /// Binding declared in this document
    pub fn binding(&self, qname: &QName) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.qname().as_ref() == Some(qname))
    }

    /// Service declared in this document
    pub fn service(&self, qname: &QName) -> Option<&Service> {
        self.services.iter().find(|s| s.qname().as_ref() == Some(qname))
    }

    /// `<types>`, created on first use
    pub fn types_mut(&mut self) -> &mut Types {
        self.types.get_or_insert_with(Types::new)
    }
}

/// `<import>`
#[derive(Debug, Clone)]
pub struct Import {
    /// `namespace`
    pub namespace: Option<String>,
    /// `location`
    pub location: Option<String>,
    /// The imported document, when it could be read
    pub description: Option<DescriptionId>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

/// `<include>`
#[derive(Debug, Clone)]
pub struct Include {
    /// `location`
    pub location: Option<String>,
    /// The included document, when it could be read
    pub description: Option<DescriptionId>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}
