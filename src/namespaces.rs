//! XML namespace handling
//!
//! This module provides qualified names (QNames), scoped namespace prefix
//! mappings, and the namespace URIs WSDL 2.0 documents rely on.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// WSDL 2.0 namespace
pub const WSDL_NAMESPACE: &str = "http://www.w3.org/ns/wsdl";

/// WSDL 1.1 namespace, only used to diagnose mis-rooted documents
pub const WSDL11_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";

/// WSDL 2.0 core extensions namespace (`wsdlx`)
pub const WSDLX_NAMESPACE: &str = "http://www.w3.org/ns/wsdl-extensions";

/// WSDL 2.0 RPC style extension namespace (`wrpc`)
pub const WRPC_NAMESPACE: &str = "http://www.w3.org/ns/wsdl/rpc";

/// WSDL 2.0 SOAP binding namespace (`wsoap`)
pub const WSOAP_NAMESPACE: &str = "http://www.w3.org/ns/wsdl/soap";

/// WSDL 2.0 HTTP binding namespace (`whttp`)
pub const WHTTP_NAMESPACE: &str = "http://www.w3.org/ns/wsdl/http";

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName in the WSDL 2.0 namespace
    pub fn wsdl(local_name: impl Into<String>) -> Self {
        Self::namespaced(WSDL_NAMESPACE, local_name)
    }

    /// Namespace as a string slice, empty for no namespace
    pub fn namespace_str(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Check if the name is in the given namespace
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
///
/// A context holds the declarations made on one element and links to the
/// context of the enclosing element, so lookups walk up to the root.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI declared at this level
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace declared at this level (`Some("")` undeclares it)
    default_namespace: Option<NamespaceUri>,
    /// Enclosing scope
    parent: Option<Arc<NamespaceContext>>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context nested inside `parent`
    pub fn with_parent(parent: Arc<NamespaceContext>) -> Self {
        Self {
            prefixes: HashMap::new(),
            default_namespace: None,
            parent: Some(parent),
        }
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Check if nothing is declared at this level
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// Iterate over the prefixes declared at this level
    pub fn iter(&self) -> impl Iterator<Item = (&Prefix, &NamespaceUri)> {
        self.prefixes.iter()
    }

    /// Get the namespace bound to a prefix, walking up enclosing scopes
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        match self.prefixes.get(prefix) {
            Some(ns) => Some(ns.as_str()),
            None => self
                .parent
                .as_deref()
                .and_then(|parent| parent.get_namespace(prefix)),
        }
    }

    /// Get the default namespace in scope
    pub fn get_default_namespace(&self) -> Option<&str> {
        match self.default_namespace.as_deref() {
            Some("") => None,
            Some(ns) => Some(ns),
            None => self
                .parent
                .as_deref()
                .and_then(|parent| parent.get_default_namespace()),
        }
    }

    /// Default namespace declared at this level only
    pub fn declared_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Every binding visible from this scope, innermost declaration wins
    pub fn in_scope(&self) -> HashMap<Prefix, NamespaceUri> {
        let mut all = match self.parent.as_deref() {
            Some(parent) => parent.in_scope(),
            None => HashMap::new(),
        };
        for (prefix, ns) in &self.prefixes {
            all.insert(prefix.clone(), ns.clone());
        }
        all
    }

    /// Resolve a prefixed name to a QName
    ///
    /// An unprefixed name takes the default namespace in scope.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        let prefixed_name = prefixed_name.trim();
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.get_default_namespace(), prefixed_name))
        }
    }
}
