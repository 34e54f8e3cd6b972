//! `<service>` and `<endpoint>`

use super::common::Documentation;
use super::DescriptionId;
use crate::extensions::Extensible;
use crate::names::NcName;
use crate::namespaces::QName;

/// `<service>`
#[derive(Debug, Clone)]
pub struct Service {
    /// Owning description
    pub description: DescriptionId,
    /// `name`
    pub name: Option<NcName>,
    /// Target namespace of the owning description
    pub target_namespace: Option<String>,
    /// `interface`
    pub interface: Option<QName>,
    /// `<endpoint>` children
    pub endpoints: Vec<Endpoint>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

impl Service {
    /// Qualified name, when the name is valid
    pub fn qname(&self) -> Option<QName> {
        self.name
            .as_ref()
            .map(|n| QName::new(self.target_namespace.as_deref(), n.as_str()))
    }
}

/// `<endpoint>`
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// `name`
    pub name: Option<NcName>,
    /// `binding`
    pub binding: Option<QName>,
    /// `address`
    pub address: Option<String>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}
