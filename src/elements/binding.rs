//! `<binding>` and its children

use super::common::{Direction, Documentation, MessageLabel};
use super::DescriptionId;
use crate::extensions::Extensible;
use crate::names::NcName;
use crate::namespaces::QName;

/// `<binding>`
#[derive(Debug, Clone)]
pub struct Binding {
    /// Owning description
    pub description: DescriptionId,
    /// `name`
    pub name: Option<NcName>,
    /// Target namespace of the owning description
    pub target_namespace: Option<String>,
    /// `interface`
    pub interface: Option<QName>,
    /// `type`
    pub binding_type: Option<String>,
    /// `<fault>` children
    pub faults: Vec<BindingFault>,
    /// `<operation>` children
    pub operations: Vec<BindingOperation>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

impl Binding {
    /// Qualified name, when the name is valid
    pub fn qname(&self) -> Option<QName> {
        self.name
            .as_ref()
            .map(|n| QName::new(self.target_namespace.as_deref(), n.as_str()))
    }
}

/// `<binding>/<fault>`
#[derive(Debug, Clone)]
pub struct BindingFault {
    /// `ref` to an interface fault
    pub reference: Option<QName>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

/// `<binding>/<operation>`
#[derive(Debug, Clone)]
pub struct BindingOperation {
    /// `ref` to an interface operation
    pub reference: Option<QName>,
    /// `<input>` and `<output>` children
    pub messages: Vec<BindingMessageReference>,
    /// `<infault>` and `<outfault>` children
    pub fault_references: Vec<BindingFaultReference>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

/// `<input>`/`<output>` of a binding operation
#[derive(Debug, Clone)]
pub struct BindingMessageReference {
    /// Direction
    pub direction: Direction,
    /// `messageLabel` as written
    pub message_label: Option<MessageLabel>,
    /// Written label, or the one inferred from the bound interface operation
    pub effective_label: Option<MessageLabel>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

/// `<infault>`/`<outfault>` of a binding operation
#[derive(Debug, Clone)]
pub struct BindingFaultReference {
    /// Direction
    pub direction: Direction,
    /// `ref` to an interface fault
    pub reference: Option<QName>,
    /// `messageLabel` as written
    pub message_label: Option<MessageLabel>,
    /// Written label, or the one inferred from the bound interface operation
    pub effective_label: Option<MessageLabel>,
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Extension attributes and elements
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}
