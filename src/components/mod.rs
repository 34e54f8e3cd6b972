//! Component Model
//!
//! The flattened view of a description: every interface, binding and service
//! in scope of the root document, deduplicated, plus the element declarations
//! and type definitions harvested from the schemas in scope. Components live
//! in typed arenas inside [`ComponentModel`]; child components record the id
//! of their parent.
//!
//! The model is produced by [`Wsdl::to_component`](crate::Wsdl::to_component).

mod builder;
pub mod fragments;

use std::collections::HashSet;
use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use url::Url;

use crate::documents::Element;
use crate::elements::{DescriptionId, Direction, ElementReference, MessageLabel};
use crate::extensions::ComponentExtensionMap;
use crate::names::NcName;
use crate::namespaces::QName;
use crate::schema::TypeContent;

pub(crate) use builder::build;
pub use fragments::FragmentIdentifier;

macro_rules! component_ids {
    ($($(#[$doc:meta])* $name:ident => $component:ident, $field:ident;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
            pub struct $name(usize);

            impl $name {
                /// Position in the model's arena
                pub fn index(&self) -> usize {
                    self.0
                }
            }

            impl Index<$name> for ComponentModel {
                type Output = $component;

                fn index(&self, id: $name) -> &$component {
                    &self.$field[id.0]
                }
            }
        )*
    };
}

component_ids! {
    /// Id of an [`Interface`]
    InterfaceId => Interface, interfaces;
    /// Id of an [`InterfaceFault`]
    InterfaceFaultId => InterfaceFault, interface_faults;
    /// Id of an [`InterfaceOperation`]
    InterfaceOperationId => InterfaceOperation, interface_operations;
    /// Id of an [`InterfaceMessageReference`]
    InterfaceMessageReferenceId => InterfaceMessageReference, interface_message_references;
    /// Id of an [`InterfaceFaultReference`]
    InterfaceFaultReferenceId => InterfaceFaultReference, interface_fault_references;
    /// Id of a [`Binding`]
    BindingId => Binding, bindings;
    /// Id of a [`BindingFault`]
    BindingFaultId => BindingFault, binding_faults;
    /// Id of a [`BindingOperation`]
    BindingOperationId => BindingOperation, binding_operations;
    /// Id of a [`BindingMessageReference`]
    BindingMessageReferenceId => BindingMessageReference, binding_message_references;
    /// Id of a [`BindingFaultReference`]
    BindingFaultReferenceId => BindingFaultReference, binding_fault_references;
    /// Id of a [`Service`]
    ServiceId => Service, services;
    /// Id of an [`Endpoint`]
    EndpointId => Endpoint, endpoints;
}

/// Interface component
#[derive(Debug, Clone)]
pub struct Interface {
    /// This component
    pub id: InterfaceId,
    /// `{name}`
    pub name: QName,
    /// Names of the directly extended interfaces, as written
    pub extends: Vec<QName>,
    /// `styleDefault`
    pub style_default: Vec<String>,
    /// `{interface faults}` declared on this interface
    pub interface_faults: Vec<InterfaceFaultId>,
    /// `{interface operations}` declared on this interface
    pub interface_operations: Vec<InterfaceOperationId>,
    /// Document declaring the interface
    pub description: DescriptionId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Interface Fault component
#[derive(Debug, Clone)]
pub struct InterfaceFault {
    /// This component
    pub id: InterfaceFaultId,
    /// `{name}`, in the interface's namespace
    pub name: QName,
    /// `element`
    pub element: Option<ElementReference>,
    /// `{parent}`
    pub parent: InterfaceId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

impl InterfaceFault {
    /// `{message content model}`, `#other` when no element is given
    pub fn message_content_model(&self) -> &'static str {
        self.element.as_ref().map_or("#other", |e| e.content_model())
    }
}

/// Interface Operation component
#[derive(Debug, Clone)]
pub struct InterfaceOperation {
    /// This component
    pub id: InterfaceOperationId,
    /// `{name}`, in the interface's namespace
    pub name: QName,
    /// `{message exchange pattern}`
    pub pattern: String,
    /// `{style}`: the operation's own, or the interface's `styleDefault`
    pub style: Vec<String>,
    /// `{interface message references}`
    pub interface_message_references: Vec<InterfaceMessageReferenceId>,
    /// `{interface fault references}`
    pub interface_fault_references: Vec<InterfaceFaultReferenceId>,
    /// `{parent}`
    pub parent: InterfaceId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Interface Message Reference component
#[derive(Debug, Clone)]
pub struct InterfaceMessageReference {
    /// This component
    pub id: InterfaceMessageReferenceId,
    /// `{direction}`
    pub direction: Direction,
    /// `{message label}`, explicit or inferred
    pub message_label: Option<MessageLabel>,
    /// `element`
    pub element: Option<ElementReference>,
    /// `{parent}`
    pub parent: InterfaceOperationId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

impl InterfaceMessageReference {
    /// `{message content model}`, `#other` when no element is given
    pub fn message_content_model(&self) -> &'static str {
        self.element.as_ref().map_or("#other", |e| e.content_model())
    }
}

/// Interface Fault Reference component
#[derive(Debug, Clone)]
pub struct InterfaceFaultReference {
    /// This component
    pub id: InterfaceFaultReferenceId,
    /// `ref`: name of the interface fault
    pub interface_fault: Option<QName>,
    /// `{direction}`
    pub direction: Direction,
    /// `{message label}`, explicit or inferred
    pub message_label: Option<MessageLabel>,
    /// `{parent}`
    pub parent: InterfaceOperationId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Binding component
#[derive(Debug, Clone)]
pub struct Binding {
    /// This component
    pub id: BindingId,
    /// `{name}`
    pub name: QName,
    /// `interface`
    pub interface: Option<QName>,
    /// `{type}`
    pub binding_type: Option<String>,
    /// `{binding faults}`
    pub binding_faults: Vec<BindingFaultId>,
    /// `{binding operations}`
    pub binding_operations: Vec<BindingOperationId>,
    /// Document declaring the binding
    pub description: DescriptionId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Binding Fault component
#[derive(Debug, Clone)]
pub struct BindingFault {
    /// This component
    pub id: BindingFaultId,
    /// `ref`: name of the interface fault
    pub interface_fault: Option<QName>,
    /// `{parent}`
    pub parent: BindingId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Binding Operation component
#[derive(Debug, Clone)]
pub struct BindingOperation {
    /// This component
    pub id: BindingOperationId,
    /// `ref`: name of the interface operation
    pub interface_operation: Option<QName>,
    /// `{binding message references}`
    pub binding_message_references: Vec<BindingMessageReferenceId>,
    /// `{binding fault references}`
    pub binding_fault_references: Vec<BindingFaultReferenceId>,
    /// `{parent}`
    pub parent: BindingId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Binding Message Reference component
#[derive(Debug, Clone)]
pub struct BindingMessageReference {
    /// This component
    pub id: BindingMessageReferenceId,
    /// Direction of the element
    pub direction: Direction,
    /// Message label, explicit or inferred from the bound operation
    pub message_label: Option<MessageLabel>,
    /// `{parent}`
    pub parent: BindingOperationId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Binding Fault Reference component
#[derive(Debug, Clone)]
pub struct BindingFaultReference {
    /// This component
    pub id: BindingFaultReferenceId,
    /// `ref`: name of the interface fault
    pub interface_fault: Option<QName>,
    /// Direction of the element
    pub direction: Direction,
    /// Message label, explicit or inferred from the bound operation
    pub message_label: Option<MessageLabel>,
    /// `{parent}`
    pub parent: BindingOperationId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Service component
#[derive(Debug, Clone)]
pub struct Service {
    /// This component
    pub id: ServiceId,
    /// `{name}`
    pub name: QName,
    /// `interface`
    pub interface: Option<QName>,
    /// `{endpoints}`
    pub endpoints: Vec<EndpointId>,
    /// Document declaring the service
    pub description: DescriptionId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Endpoint component
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// This component
    pub id: EndpointId,
    /// `{name}`
    pub name: NcName,
    /// `binding`
    pub binding: Option<QName>,
    /// `{address}`
    pub address: Option<String>,
    /// `{parent}`
    pub parent: ServiceId,
    /// Extension contexts
    pub extensions: ComponentExtensionMap,
}

/// Element Declaration component, from a schema in scope
#[derive(Debug, Clone)]
pub struct ElementDeclaration {
    /// `{name}`
    pub name: QName,
    /// `{system}`: the type system namespace
    pub system: String,
    /// The `xs:element` declaration
    pub content: Arc<Element>,
    /// URL of the declaring schema, `None` when inlined
    pub schema_location: Option<Url>,
}

/// Type Definition component, from a schema in scope
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// `{name}`
    pub name: QName,
    /// `{system}`: the type system namespace
    pub system: String,
    /// Built-in marker or the defining element
    pub content: TypeContent,
}

/// Reference to any component of a [`ComponentModel`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentRef {
    /// The Description component
    Description,
    /// An element declaration, by name
    ElementDeclaration(QName),
    /// A type definition, by name
    TypeDefinition(QName),
    /// An interface
    Interface(InterfaceId),
    /// An interface fault
    InterfaceFault(InterfaceFaultId),
    /// An interface operation
    InterfaceOperation(InterfaceOperationId),
    /// An interface message reference
    InterfaceMessageReference(InterfaceMessageReferenceId),
    /// An interface fault reference
    InterfaceFaultReference(InterfaceFaultReferenceId),
    /// A binding
    Binding(BindingId),
    /// A binding fault
    BindingFault(BindingFaultId),
    /// A binding operation
    BindingOperation(BindingOperationId),
    /// A binding message reference
    BindingMessageReference(BindingMessageReferenceId),
    /// A binding fault reference
    BindingFaultReference(BindingFaultReferenceId),
    /// A service
    Service(ServiceId),
    /// An endpoint
    Endpoint(EndpointId),
}

/// The flattened component view of a description
#[derive(Debug, Clone, Default)]
pub struct ComponentModel {
    interfaces: Vec<Interface>,
    interface_faults: Vec<InterfaceFault>,
    interface_operations: Vec<InterfaceOperation>,
    interface_message_references: Vec<InterfaceMessageReference>,
    interface_fault_references: Vec<InterfaceFaultReference>,
    bindings: Vec<Binding>,
    binding_faults: Vec<BindingFault>,
    binding_operations: Vec<BindingOperation>,
    binding_message_references: Vec<BindingMessageReference>,
    binding_fault_references: Vec<BindingFaultReference>,
    services: Vec<Service>,
    endpoints: Vec<Endpoint>,
    element_declarations: IndexMap<QName, ElementDeclaration>,
    type_definitions: IndexMap<QName, TypeDefinition>,
}

impl ComponentModel {
    /// `{interfaces}`
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// `{bindings}`
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// `{services}`
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// `{element declarations}`
    pub fn element_declarations(&self) -> impl Iterator<Item = &ElementDeclaration> {
        self.element_declarations.values()
    }

    /// `{type definitions}`
    pub fn type_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.type_definitions.values()
    }

    /// Interface by name
    pub fn interface(&self, name: &QName) -> Option<&Interface> {
        self.interfaces.iter().find(|i| &i.name == name)
    }

    /// Binding by name
    pub fn binding(&self, name: &QName) -> Option<&Binding> {
        self.bindings.iter().find(|b| &b.name == name)
    }

    /// Service by name
    pub fn service(&self, name: &QName) -> Option<&Service> {
        self.services.iter().find(|s| &s.name == name)
    }

    /// Element declaration by name
    pub fn element_declaration(&self, name: &QName) -> Option<&ElementDeclaration> {
        self.element_declarations.get(name)
    }

    /// Type definition by name
    pub fn type_definition(&self, name: &QName) -> Option<&TypeDefinition> {
        self.type_definitions.get(name)
    }

    /// Declaration an `element` attribute refers to
    pub fn element_declaration_for(&self, reference: &ElementReference) -> Option<&ElementDeclaration> {
        reference.qname().and_then(|q| self.element_declaration(q))
    }

    /// `{extended interfaces}`: every interface extended directly or not
    ///
    /// The interface itself is not included, even when it extends itself
    /// through a cycle.
    pub fn extended_interfaces(&self, interface: &Interface) -> Vec<&Interface> {
        let mut visited: HashSet<&QName> = HashSet::new();
        visited.insert(&interface.name);
        let mut out = Vec::new();
        let mut stack = vec![interface];
        while let Some(current) = stack.pop() {
            for name in &current.extends {
                if !visited.insert(name) {
                    continue;
                }
                if let Some(found) = self.interface(name) {
                    out.push(found);
                    stack.push(found);
                }
            }
        }
        out
    }

    /// Operations of an interface, inherited ones included
    ///
    /// Declared operations come first; an inherited operation is skipped when
    /// one with the same name was already seen.
    pub fn all_operations(&self, interface: &Interface) -> Vec<&InterfaceOperation> {
        let mut seen: HashSet<&QName> = HashSet::new();
        std::iter::once(interface)
            .chain(self.extended_interfaces(interface))
            .flat_map(move |i| i.interface_operations.iter().map(move |id| &self[*id]))
            .filter(|op| seen.insert(&op.name))
            .collect()
    }

    /// Faults of an interface, inherited ones included
    pub fn all_faults(&self, interface: &Interface) -> Vec<&InterfaceFault> {
        let mut seen: HashSet<&QName> = HashSet::new();
        std::iter::once(interface)
            .chain(self.extended_interfaces(interface))
            .flat_map(move |i| i.interface_faults.iter().map(move |id| &self[*id]))
            .filter(|f| seen.insert(&f.name))
            .collect()
    }

    /// Interface a binding binds
    pub fn binding_interface(&self, binding: &Binding) -> Option<&Interface> {
        binding.interface.as_ref().and_then(|q| self.interface(q))
    }

    /// Interface a service offers
    pub fn service_interface(&self, service: &Service) -> Option<&Interface> {
        service.interface.as_ref().and_then(|q| self.interface(q))
    }

    /// Binding an endpoint uses
    pub fn endpoint_binding(&self, endpoint: &Endpoint) -> Option<&Binding> {
        endpoint.binding.as_ref().and_then(|q| self.binding(q))
    }

    /// Interface operation a binding operation refers to
    pub fn interface_operation_for(&self, operation: &BindingOperation) -> Option<&InterfaceOperation> {
        let name = operation.interface_operation.as_ref()?;
        let interface = self.binding_interface(&self[operation.parent])?;
        self.all_operations(interface)
            .into_iter()
            .find(|op| &op.name == name)
    }

    /// Interface fault a binding fault refers to
    pub fn interface_fault_for(&self, fault: &BindingFault) -> Option<&InterfaceFault> {
        let name = fault.interface_fault.as_ref()?;
        let interface = self.binding_interface(&self[fault.parent])?;
        self.all_faults(interface).into_iter().find(|f| &f.name == name)
    }

    /// Interface message reference a binding message reference binds
    ///
    /// Matched on the effective message label.
    pub fn interface_message_reference_for(
        &self,
        reference: &BindingMessageReference,
    ) -> Option<&InterfaceMessageReference> {
        let label = reference.message_label.as_ref()?;
        let operation = self.interface_operation_for(&self[reference.parent])?;
        operation
            .interface_message_references
            .iter()
            .map(|id| &self[*id])
            .find(|m| m.message_label.as_ref() == Some(label))
    }

    /// Interface fault reference a binding fault reference binds
    ///
    /// Matched on the fault name, the effective message label and the direction.
    pub fn interface_fault_reference_for(
        &self,
        reference: &BindingFaultReference,
    ) -> Option<&InterfaceFaultReference> {
        let label = reference.message_label.as_ref()?;
        let operation = self.interface_operation_for(&self[reference.parent])?;
        operation
            .interface_fault_references
            .iter()
            .map(|id| &self[*id])
            .find(|f| {
                f.interface_fault == reference.interface_fault
                    && f.message_label.as_ref() == Some(label)
                    && f.direction == reference.direction
            })
    }

    /// Every component, parents before children
    pub fn component_refs(&self) -> Vec<ComponentRef> {
        let mut refs = vec![ComponentRef::Description];
        refs.extend(
            self.element_declarations
                .keys()
                .cloned()
                .map(ComponentRef::ElementDeclaration),
        );
        refs.extend(
            self.type_definitions
                .keys()
                .cloned()
                .map(ComponentRef::TypeDefinition),
        );
        for interface in &self.interfaces {
            refs.push(ComponentRef::Interface(interface.id));
            refs.extend(interface.interface_faults.iter().copied().map(ComponentRef::InterfaceFault));
            for op in &interface.interface_operations {
                refs.push(ComponentRef::InterfaceOperation(*op));
                let op = &self[*op];
                refs.extend(
                    op.interface_message_references
                        .iter()
                        .copied()
                        .map(ComponentRef::InterfaceMessageReference),
                );
                refs.extend(
                    op.interface_fault_references
                        .iter()
                        .copied()
                        .map(ComponentRef::InterfaceFaultReference),
                );
            }
        }
        for binding in &self.bindings {
            refs.push(ComponentRef::Binding(binding.id));
            refs.extend(binding.binding_faults.iter().copied().map(ComponentRef::BindingFault));
            for op in &binding.binding_operations {
                refs.push(ComponentRef::BindingOperation(*op));
                let op = &self[*op];
                refs.extend(
                    op.binding_message_references
                        .iter()
                        .copied()
                        .map(ComponentRef::BindingMessageReference),
                );
                refs.extend(
                    op.binding_fault_references
                        .iter()
                        .copied()
                        .map(ComponentRef::BindingFaultReference),
                );
            }
        }
        for service in &self.services {
            refs.push(ComponentRef::Service(service.id));
            refs.extend(service.endpoints.iter().copied().map(ComponentRef::Endpoint));
        }
        refs
    }

    /// Fragment identifier of a component
    pub fn fragment_identifier(&self, component: &ComponentRef) -> FragmentIdentifier {
        fragments::fragment_identifier(self, component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Descriptions;

    fn interface(model: &mut ComponentModel, name: &str, extends: &[&str]) -> InterfaceId {
        let id = InterfaceId(model.interfaces.len());
        model.interfaces.push(Interface {
            id,
            name: QName::namespaced("urn:t", name),
            extends: extends.iter().map(|e| QName::namespaced("urn:t", *e)).collect(),
            style_default: Vec::new(),
            interface_faults: Vec::new(),
            interface_operations: Vec::new(),
            description: Descriptions::new().reserve(Url::parse("http://x/").unwrap()),
            extensions: ComponentExtensionMap::new(),
        });
        id
    }

    fn operation(model: &mut ComponentModel, parent: InterfaceId, name: &str) -> InterfaceOperationId {
        let id = InterfaceOperationId(model.interface_operations.len());
        model.interface_operations.push(InterfaceOperation {
            id,
            name: QName::namespaced("urn:t", name),
            pattern: crate::parsing::mep::IN_OUT.to_string(),
            style: Vec::new(),
            interface_message_references: Vec::new(),
            interface_fault_references: Vec::new(),
            parent,
            extensions: ComponentExtensionMap::new(),
        });
        model.interfaces[parent.0].interface_operations.push(id);
        id
    }

    #[test]
    fn test_extended_interfaces_cycle() {
        let mut model = ComponentModel::default();
        let a = interface(&mut model, "A", &["B"]);
        let b = interface(&mut model, "B", &["A", "C"]);
        let c = interface(&mut model, "C", &["C"]);

        let names: Vec<&str> = model
            .extended_interfaces(&model[a])
            .iter()
            .map(|i| i.name.local_name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C"]);
        assert!(model.extended_interfaces(&model[c]).is_empty());
        assert_eq!(model.extended_interfaces(&model[b]).len(), 2);
    }

    #[test]
    fn test_all_operations_includes_inherited() {
        let mut model = ComponentModel::default();
        let base = interface(&mut model, "Base", &[]);
        let derived = interface(&mut model, "Derived", &["Base"]);
        operation(&mut model, base, "ping");
        operation(&mut model, derived, "order");

        let names: Vec<&str> = model
            .all_operations(&model[derived])
            .iter()
            .map(|op| op.name.local_name.as_str())
            .collect();
        assert_eq!(names, vec!["order", "ping"]);
        assert_eq!(model.all_operations(&model[base]).len(), 1);
    }
}
