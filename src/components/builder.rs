//! Component Model Builder
//!
//! Walks the root description and every nested description in scope, keeping
//! one copy of each structurally equivalent interface, binding and service,
//! harvests element declarations and type definitions from the schemas in
//! scope, and attaches extension contexts through the registry.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::{
    Binding, BindingFault, BindingFaultId, BindingFaultReference, BindingFaultReferenceId,
    BindingId, BindingMessageReference, BindingMessageReferenceId, BindingOperation,
    BindingOperationId, ComponentModel, ElementDeclaration, Endpoint, EndpointId, Interface,
    InterfaceFault, InterfaceFaultId, InterfaceFaultReference, InterfaceFaultReferenceId,
    InterfaceId, InterfaceMessageReference, InterfaceMessageReferenceId, InterfaceOperation,
    InterfaceOperationId, Service, ServiceId, TypeDefinition,
};
use crate::elements::{self, DescriptionId, Descriptions};
use crate::extensions::rpc::RPC_STYLE;
use crate::extensions::{
    AttributeExtensions, ComponentExtensionMap, Extensible, ExtensionRegistry, ExtensionSource,
    OwnerKind,
};
use crate::namespaces::{QName, WRPC_NAMESPACE, WSDLX_NAMESPACE, XSD_NAMESPACE};
use crate::schema::Schema;

/// Build the component model of `root`
pub(crate) fn build(
    descriptions: &Descriptions,
    root: DescriptionId,
    registry: &ExtensionRegistry,
) -> ComponentModel {
    let scope = descriptions.in_scope(root);
    tracing::debug!(
        "building component model of {} over {} description(s)",
        root,
        scope.len()
    );

    let mut builder = Builder {
        descriptions,
        registry,
        model: ComponentModel::default(),
    };

    let mut seen_interfaces: HashSet<(QName, BTreeSet<QName>)> = HashSet::new();
    let mut seen_bindings: HashSet<QName> = HashSet::new();
    let mut seen_services: HashSet<QName> = HashSet::new();

    for id in &scope {
        let Some(description) = descriptions.get(*id) else {
            continue;
        };
        for interface in &description.interfaces {
            let Some(name) = interface.qname() else {
                tracing::debug!("skipping unnamed interface in {}", description.document_base_uri);
                continue;
            };
            let key = (name.clone(), interface.extends.iter().cloned().collect());
            if seen_interfaces.insert(key) {
                builder.add_interface(name, interface);
            }
        }
        for binding in &description.bindings {
            let Some(name) = binding.qname() else {
                tracing::debug!("skipping unnamed binding in {}", description.document_base_uri);
                continue;
            };
            if seen_bindings.insert(name.clone()) {
                builder.add_binding(name, binding);
            }
        }
        for service in &description.services {
            let Some(name) = service.qname() else {
                tracing::debug!("skipping unnamed service in {}", description.document_base_uri);
                continue;
            };
            if seen_services.insert(name.clone()) {
                builder.add_service(name, service);
            }
        }
    }

    builder.harvest_schemas(&scope);

    let model = builder.model;
    tracing::debug!(
        "component model has {} interface(s), {} binding(s), {} service(s), {} element declaration(s), {} type definition(s)",
        model.interfaces.len(),
        model.bindings.len(),
        model.services.len(),
        model.element_declarations.len(),
        model.type_definitions.len()
    );
    model
}

struct Builder<'a> {
    descriptions: &'a Descriptions,
    registry: &'a ExtensionRegistry,
    model: ComponentModel,
}

impl Builder<'_> {
    fn add_interface(&mut self, name: QName, interface: &elements::Interface) {
        let id = InterfaceId(self.model.interfaces.len());
        let namespace = interface.target_namespace.as_deref();

        let mut faults = Vec::new();
        for fault in &interface.faults {
            let Some(fault_name) = fault.qname(namespace) else {
                continue;
            };
            let fault_id = InterfaceFaultId(self.model.interface_faults.len());
            self.model.interface_faults.push(InterfaceFault {
                id: fault_id,
                name: fault_name,
                element: fault.element.clone(),
                parent: id,
                extensions: self.contexts(OwnerKind::InterfaceFault, &fault.extensions, None, &[]),
            });
            faults.push(fault_id);
        }

        let mut operations = Vec::new();
        for operation in &interface.operations {
            let Some(operation_name) = operation.qname(namespace) else {
                continue;
            };
            let operation_id = InterfaceOperationId(self.model.interface_operations.len());
            let style = operation
                .style
                .clone()
                .unwrap_or_else(|| interface.style_default.clone());

            let mut messages = Vec::new();
            for message in &operation.messages {
                let message_id =
                    InterfaceMessageReferenceId(self.model.interface_message_references.len());
                self.model
                    .interface_message_references
                    .push(InterfaceMessageReference {
                        id: message_id,
                        direction: message.direction,
                        message_label: message.effective_label.clone(),
                        element: message.element.clone(),
                        parent: operation_id,
                        extensions: self.contexts(
                            OwnerKind::InterfaceMessageReference,
                            &message.extensions,
                            None,
                            &[],
                        ),
                    });
                messages.push(message_id);
            }

            let mut fault_references = Vec::new();
            for fault in &operation.fault_references {
                let reference_id =
                    InterfaceFaultReferenceId(self.model.interface_fault_references.len());
                self.model
                    .interface_fault_references
                    .push(InterfaceFaultReference {
                        id: reference_id,
                        interface_fault: fault.reference.clone(),
                        direction: fault.direction,
                        message_label: fault.effective_label.clone(),
                        parent: operation_id,
                        extensions: self.contexts(
                            OwnerKind::InterfaceFaultReference,
                            &fault.extensions,
                            None,
                            &[],
                        ),
                    });
                fault_references.push(reference_id);
            }

            let extensions = self.operation_contexts(&operation.extensions, &style);
            self.model.interface_operations.push(InterfaceOperation {
                id: operation_id,
                name: operation_name,
                pattern: operation.effective_pattern().to_string(),
                style,
                interface_message_references: messages,
                interface_fault_references: fault_references,
                parent: id,
                extensions,
            });
            operations.push(operation_id);
        }

        let extensions = self.contexts(OwnerKind::Interface, &interface.extensions, None, &[]);
        self.model.interfaces.push(Interface {
            id,
            name,
            extends: interface.extends.clone(),
            style_default: interface.style_default.clone(),
            interface_faults: faults,
            interface_operations: operations,
            description: interface.description,
            extensions,
        });
    }

    fn add_binding(&mut self, name: QName, binding: &elements::Binding) {
        let id = BindingId(self.model.bindings.len());
        let binding_type = binding.binding_type.as_deref();

        let mut faults = Vec::new();
        for fault in &binding.faults {
            let fault_id = BindingFaultId(self.model.binding_faults.len());
            let extensions =
                self.contexts(OwnerKind::BindingFault, &fault.extensions, binding_type, &[]);
            self.model.binding_faults.push(BindingFault {
                id: fault_id,
                interface_fault: fault.reference.clone(),
                parent: id,
                extensions,
            });
            faults.push(fault_id);
        }

        let mut operations = Vec::new();
        for operation in &binding.operations {
            let operation_id = BindingOperationId(self.model.binding_operations.len());

            let mut messages = Vec::new();
            for message in &operation.messages {
                let message_id =
                    BindingMessageReferenceId(self.model.binding_message_references.len());
                let extensions = self.contexts(
                    OwnerKind::BindingMessageReference,
                    &message.extensions,
                    binding_type,
                    &[],
                );
                self.model.binding_message_references.push(BindingMessageReference {
                    id: message_id,
                    direction: message.direction,
                    message_label: message.effective_label.clone(),
                    parent: operation_id,
                    extensions,
                });
                messages.push(message_id);
            }

            let mut fault_references = Vec::new();
            for fault in &operation.fault_references {
                let reference_id =
                    BindingFaultReferenceId(self.model.binding_fault_references.len());
                let extensions = self.contexts(
                    OwnerKind::BindingFaultReference,
                    &fault.extensions,
                    binding_type,
                    &[],
                );
                self.model.binding_fault_references.push(BindingFaultReference {
                    id: reference_id,
                    interface_fault: fault.reference.clone(),
                    direction: fault.direction,
                    message_label: fault.effective_label.clone(),
                    parent: operation_id,
                    extensions,
                });
                fault_references.push(reference_id);
            }

            let extensions = self.contexts(
                OwnerKind::BindingOperation,
                &operation.extensions,
                binding_type,
                &[],
            );
            self.model.binding_operations.push(BindingOperation {
                id: operation_id,
                interface_operation: operation.reference.clone(),
                binding_message_references: messages,
                binding_fault_references: fault_references,
                parent: id,
                extensions,
            });
            operations.push(operation_id);
        }

        let extensions = self.contexts(OwnerKind::Binding, &binding.extensions, binding_type, &[]);
        self.model.bindings.push(Binding {
            id,
            name,
            interface: binding.interface.clone(),
            binding_type: binding.binding_type.clone(),
            binding_faults: faults,
            binding_operations: operations,
            description: binding.description,
            extensions,
        });
    }

    fn add_service(&mut self, name: QName, service: &elements::Service) {
        let id = ServiceId(self.model.services.len());

        let mut endpoints = Vec::new();
        for endpoint in &service.endpoints {
            let Some(endpoint_name) = endpoint.name.clone() else {
                continue;
            };
            let binding_type = endpoint
                .binding
                .as_ref()
                .and_then(|q| self.descriptions.find_binding(service.description, q))
                .and_then(|b| b.binding_type.clone());
            let endpoint_id = EndpointId(self.model.endpoints.len());
            let extensions = self.contexts(
                OwnerKind::Endpoint,
                &endpoint.extensions,
                binding_type.as_deref(),
                &[],
            );
            self.model.endpoints.push(Endpoint {
                id: endpoint_id,
                name: endpoint_name,
                binding: endpoint.binding.clone(),
                address: endpoint.address.clone(),
                parent: id,
                extensions,
            });
            endpoints.push(endpoint_id);
        }

        let extensions = self.contexts(OwnerKind::Service, &service.extensions, None, &[]);
        self.model.services.push(Service {
            id,
            name,
            interface: service.interface.clone(),
            endpoints,
            description: service.description,
            extensions,
        });
    }

    /// Contexts of an interface operation
    ///
    /// The core context is always attached and the RPC context joins when the
    /// operation's style includes the RPC style.
    fn operation_contexts(&self, extensions: &Extensible, style: &[String]) -> ComponentExtensionMap {
        let mut map = self.contexts(OwnerKind::InterfaceOperation, extensions, None, style);
        let source = ExtensionSource {
            owner: OwnerKind::InterfaceOperation,
            extensions,
            styles: style,
        };

        let mut required = vec![WSDLX_NAMESPACE];
        if style.iter().any(|s| s == RPC_STYLE) {
            required.push(WRPC_NAMESPACE);
        }
        for namespace in required {
            match self
                .registry
                .component_extension_factory(OwnerKind::InterfaceOperation, namespace)
            {
                Some(factory) => map.insert(factory.create(&source)),
                None => map.insert(Arc::new(AttributeExtensions::collect(namespace, extensions))),
            }
        }
        map
    }

    /// Contexts for the binding type namespace, then every other namespace
    /// contributing attributes or elements
    ///
    /// A namespace without a registered factory gets an [`AttributeExtensions`]
    /// context; the binding type namespace is skipped when unregistered.
    fn contexts(
        &self,
        owner: OwnerKind,
        extensions: &Extensible,
        binding_type: Option<&str>,
        styles: &[String],
    ) -> ComponentExtensionMap {
        let mut map = ComponentExtensionMap::new();
        let source = ExtensionSource {
            owner,
            extensions,
            styles,
        };

        if let Some(binding_type) = binding_type {
            match self.registry.component_extension_factory(owner, binding_type) {
                Some(factory) => map.insert(factory.create(&source)),
                None => tracing::trace!("no {:?} context registered for binding type {}", owner, binding_type),
            }
        }

        let mut namespaces = extensions.attribute_namespaces();
        for element in &extensions.elements {
            if let Some(ns) = element.qname().namespace.as_deref() {
                if !namespaces.contains(&ns) {
                    namespaces.push(ns);
                }
            }
        }
        for namespace in namespaces {
            if map.get(namespace).is_some() {
                continue;
            }
            match self.registry.component_extension_factory(owner, namespace) {
                Some(factory) => map.insert(factory.create(&source)),
                None => map.insert(Arc::new(AttributeExtensions::collect(namespace, extensions))),
            }
        }
        map
    }

    /// Element declarations and type definitions of every schema in scope
    ///
    /// The built-in schema contributes its types first. Each schema is visited
    /// once however many imports and includes reach it.
    fn harvest_schemas(&mut self, scope: &[DescriptionId]) {
        let builtin = Schema::builtin();
        let mut visited: HashSet<*const Schema> = HashSet::new();
        visited.insert(Arc::as_ptr(&builtin));
        for (name, content) in &builtin.types {
            self.model
                .type_definitions
                .entry(name.clone())
                .or_insert_with(|| TypeDefinition {
                    name: name.clone(),
                    system: XSD_NAMESPACE.to_string(),
                    content: content.clone(),
                });
        }

        for id in scope {
            let Some(types) = self.descriptions.get(*id).and_then(|d| d.types.as_ref()) else {
                continue;
            };
            for declared in types.resolved_schemas() {
                for schema in declared.reachable() {
                    if !visited.insert(Arc::as_ptr(&schema)) {
                        continue;
                    }
                    if schema.is_builtin() {
                        continue;
                    }
                    self.harvest(&schema);
                }
            }
        }
    }

    fn harvest(&mut self, schema: &Schema) {
        let namespace = schema.target_namespace.as_deref();
        for (name, element) in &schema.elements {
            if name.namespace.as_deref() != namespace {
                continue;
            }
            if self.model.element_declarations.contains_key(name) {
                continue;
            }
            self.model.element_declarations.insert(
                name.clone(),
                ElementDeclaration {
                    name: name.clone(),
                    system: XSD_NAMESPACE.to_string(),
                    content: Arc::clone(element),
                    schema_location: schema.location.clone(),
                },
            );
        }
        for (name, content) in &schema.types {
            if name.namespace.as_deref() != namespace {
                continue;
            }
            if self.model.type_definitions.contains_key(name) {
                continue;
            }
            self.model.type_definitions.insert(
                name.clone(),
                TypeDefinition {
                    name: name.clone(),
                    system: XSD_NAMESPACE.to_string(),
                    content: content.clone(),
                },
            );
        }
    }
}
