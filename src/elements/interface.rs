//! `<interface>` and its children

use super::common::{Direction, Documentation, ElementReference, MessageLabel};
use super::DescriptionId;
use crate::extensions::Extensible;
use crate::names::NcName;
use crate::namespaces::QName;
use crate::parsing::mep::IN_OUT;

/// `<interface>`
#[derive(Debug, Clone)]
pub struct Interface {
    /// Owning description
    pub description: DescriptionId,
    /// `name`
    pub name: Option<NcName>,
    /// Target namespace of the owning description
    pub target_namespace: Option<String>,
    /// `extends`
    pub extends: Vec<QName>,
    /// `styleDefault`
    pub style_default: Vec<String>,
    /// `<fault>` children
    pub faults: Vec<InterfaceFault>,
    /// `<operation>` children
    pub operations: Vec<InterfaceOperation>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

impl Interface {
    /// Qualified name, when the name is valid
    pub fn qname(&self) -> Option<QName> {
        self.name
            .as_ref()
            .map(|n| QName::new(self.target_namespace.as_deref(), n.as_str()))
    }

    /// Operation declared directly on this interface
    pub fn operation(&self, qname: &QName) -> Option<&InterfaceOperation> {
        self.operations
            .iter()
            .find(|op| op.qname(self.target_namespace.as_deref()).as_ref() == Some(qname))
    }

    /// Fault declared directly on this interface
    pub fn fault(&self, qname: &QName) -> Option<&InterfaceFault> {
        self.faults
            .iter()
            .find(|f| f.qname(self.target_namespace.as_deref()).as_ref() == Some(qname))
    }
}

/// `<interface>/<fault>`
#[derive(Debug, Clone)]
pub struct InterfaceFault {
    /// `name`
    pub name: Option<NcName>,
    /// `element`
    pub element: Option<ElementReference>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

impl InterfaceFault {
    /// Qualified name in the interface's namespace
    pub fn qname(&self, namespace: Option<&str>) -> Option<QName> {
        self.name.as_ref().map(|n| QName::new(namespace, n.as_str()))
    }
}

/// `<interface>/<operation>`
#[derive(Debug, Clone)]
pub struct InterfaceOperation {
    /// `name`
    pub name: Option<NcName>,
    /// `pattern` as written
    pub pattern: Option<String>,
    /// `style` as written
    pub style: Option<Vec<String>>,
    /// `<input>` and `<output>` children
    pub messages: Vec<InterfaceMessageReference>,
    /// `<infault>` and `<outfault>` children
    pub fault_references: Vec<InterfaceFaultReference>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

impl InterfaceOperation {
    /// Qualified name in the interface's namespace
    pub fn qname(&self, namespace: Option<&str>) -> Option<QName> {
        self.name.as_ref().map(|n| QName::new(namespace, n.as_str()))
    }

    /// Message exchange pattern, in-out when none is written
    pub fn effective_pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(IN_OUT)
    }
}

/// `<input>`/`<output>` of an interface operation
#[derive(Debug, Clone)]
pub struct InterfaceMessageReference {
    /// `<input>` is in, `<output>` is out
    pub direction: Direction,
    /// `messageLabel` as written
    pub message_label: Option<MessageLabel>,
    /// Written or inferred label
    pub effective_label: Option<MessageLabel>,
    /// `element`
    pub element: Option<ElementReference>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

/// `<infault>`/`<outfault>` of an interface operation
#[derive(Debug, Clone)]
pub struct InterfaceFaultReference {
    /// `<infault>` is in, `<outfault>` is out
    pub direction: Direction,
    /// `ref`
    pub reference: Option<QName>,
    /// `messageLabel` as written
    pub message_label: Option<MessageLabel>,
    /// Written or inferred label
    pub effective_label: Option<MessageLabel>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}
