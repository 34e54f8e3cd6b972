//! `<binding>` and its children, and binding-side label inference

use super::interface::direction_of;
use super::mep::{self, LabelInference};
use super::session::{ChildOrder, DocumentParser};
use crate::documents::Element;
use crate::elements::{
    Binding, BindingFault, BindingFaultReference, BindingMessageReference, BindingOperation,
    DescriptionId, Descriptions, Direction, MessageLabel,
};
use crate::error::{Diagnostic, ErrorCode, Locator, Result};
use crate::extensions::OwnerKind;
use crate::namespaces::WSDL_NAMESPACE;
use crate::reporter::{emit, ErrorReporter};

impl DocumentParser<'_, '_> {
    pub(crate) fn parse_binding(&mut self, element: &Element) -> Result<Binding> {
        let mut binding = Binding {
            description: self.id,
            name: self.name_attribute(element)?,
            target_namespace: self.target_namespace.clone(),
            interface: self.qname_attribute(element, "interface", false)?,
            binding_type: self.uri_attribute(element, "type", true)?,
            faults: Vec::new(),
            operations: Vec::new(),
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::Binding, element)?,
            line: element.line,
        };

        let mut order = ChildOrder::default();
        for child in element.children() {
            if !child.qname.is_in(WSDL_NAMESPACE) {
                self.extension_element(OwnerKind::Binding, child, &mut binding.extensions)?;
                continue;
            }
            let rank = if child.local_name() == "documentation" { 0 } else { 1 };
            if !order.accept(rank) {
                self.out_of_order(child, "binding")?;
            }
            match child.local_name() {
                "documentation" => binding.documentation.push(self.documentation(child)),
                "fault" => {
                    let fault = self.parse_binding_fault(child)?;
                    binding.faults.push(fault);
                }
                "operation" => {
                    let operation = self.parse_binding_operation(child)?;
                    binding.operations.push(operation);
                }
                _ => self.unexpected(child, "binding")?,
            }
        }

        if binding.interface.is_none() && !(binding.faults.is_empty() && binding.operations.is_empty()) {
            self.error(
                ErrorCode::MissingAttribute,
                element,
                "a binding with operations or faults requires the 'interface' attribute",
            )?;
        }

        Ok(binding)
    }

    fn parse_binding_fault(&mut self, element: &Element) -> Result<BindingFault> {
        let mut fault = BindingFault {
            reference: self.qname_attribute(element, "ref", true)?,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::BindingFault, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::BindingFault,
            &mut fault.documentation,
            &mut fault.extensions,
        )?;
        Ok(fault)
    }

    fn parse_binding_operation(&mut self, element: &Element) -> Result<BindingOperation> {
        let mut operation = BindingOperation {
            reference: self.qname_attribute(element, "ref", true)?,
            messages: Vec::new(),
            fault_references: Vec::new(),
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::BindingOperation, element)?,
            line: element.line,
        };

        let mut order = ChildOrder::default();
        for child in element.children() {
            if !child.qname.is_in(WSDL_NAMESPACE) {
                self.extension_element(
                    OwnerKind::BindingOperation,
                    child,
                    &mut operation.extensions,
                )?;
                continue;
            }
            let rank = if child.local_name() == "documentation" { 0 } else { 1 };
            if !order.accept(rank) {
                self.out_of_order(child, "operation")?;
            }
            match child.local_name() {
                "documentation" => operation.documentation.push(self.documentation(child)),
                "input" | "output" => {
                    let message_label = self.label_attribute(child)?;
                    let mut message = BindingMessageReference {
                        direction: direction_of(child),
                        effective_label: message_label.clone(),
                        message_label,
                        documentation: Vec::new(),
                        extensions: self.extensions(OwnerKind::BindingMessageReference, child)?,
                        line: child.line,
                    };
                    self.nested_children(
                        child,
                        OwnerKind::BindingMessageReference,
                        &mut message.documentation,
                        &mut message.extensions,
                    )?;
                    operation.messages.push(message);
                }
                "infault" | "outfault" => {
                    let message_label = self.label_attribute(child)?;
                    let mut fault = BindingFaultReference {
                        direction: direction_of(child),
                        reference: self.qname_attribute(child, "ref", true)?,
                        effective_label: message_label.clone(),
                        message_label,
                        documentation: Vec::new(),
                        extensions: self.extensions(OwnerKind::BindingFaultReference, child)?,
                        line: child.line,
                    };
                    self.nested_children(
                        child,
                        OwnerKind::BindingFaultReference,
                        &mut fault.documentation,
                        &mut fault.extensions,
                    )?;
                    operation.fault_references.push(fault);
                }
                _ => self.unexpected(child, "operation")?,
            }
        }

        Ok(operation)
    }
}

/// Where an inferred label goes
#[derive(Debug, Clone, Copy)]
enum LabelSlot {
    Message(usize),
    Fault(usize),
}

#[derive(Debug)]
struct LabelUpdate {
    description: DescriptionId,
    binding: usize,
    operation: usize,
    slot: LabelSlot,
    label: Option<MessageLabel>,
}

/// Infer the labels of binding message and fault references that have none
///
/// Runs once every document is loaded, since the bound interface may live in
/// another document. The pattern is taken from the interface operation the
/// binding operation refers to, looked up through `extends`. References whose
/// operation cannot be found keep no label.
pub(crate) fn infer_binding_labels(
    descriptions: &mut Descriptions,
    reporter: &mut dyn ErrorReporter,
) -> Result<()> {
    let mut updates = Vec::new();

    for description in descriptions.iter() {
        for (b, binding) in description.bindings.iter().enumerate() {
            let Some(interface) = binding
                .interface
                .as_ref()
                .and_then(|q| descriptions.find_interface(description.id, q))
            else {
                continue;
            };
            for (o, operation) in binding.operations.iter().enumerate() {
                let Some((_, interface_operation)) = operation
                    .reference
                    .as_ref()
                    .and_then(|q| descriptions.find_interface_operation(interface, q))
                else {
                    continue;
                };
                let pattern = interface_operation.effective_pattern();
                let locator = |line: Option<usize>, element: &str| {
                    Locator::document(description.document_base_uri.as_str())
                        .with_line(line)
                        .with_element(element)
                };

                for (m, message) in operation.messages.iter().enumerate() {
                    if message.effective_label.is_some() {
                        continue;
                    }
                    let inference = mep::message_label(pattern, message.direction);
                    let element = match message.direction {
                        Direction::In => "input",
                        Direction::Out => "output",
                    };
                    let label = label_or_report(
                        reporter,
                        inference,
                        pattern,
                        locator(message.line, element),
                    )?;
                    updates.push(LabelUpdate {
                        description: description.id,
                        binding: b,
                        operation: o,
                        slot: LabelSlot::Message(m),
                        label,
                    });
                }
                for (f, fault) in operation.fault_references.iter().enumerate() {
                    if fault.effective_label.is_some() {
                        continue;
                    }
                    let inference = mep::fault_label(pattern, fault.direction);
                    let element = match fault.direction {
                        Direction::In => "infault",
                        Direction::Out => "outfault",
                    };
                    let label = label_or_report(
                        reporter,
                        inference,
                        pattern,
                        locator(fault.line, element),
                    )?;
                    updates.push(LabelUpdate {
                        description: description.id,
                        binding: b,
                        operation: o,
                        slot: LabelSlot::Fault(f),
                        label,
                    });
                }
            }
        }
    }

    tracing::trace!("applying {} binding label updates", updates.len());
    for update in updates {
        let Some(operation) = descriptions
            .get_mut(update.description)
            .and_then(|d| d.bindings.get_mut(update.binding))
            .and_then(|b| b.operations.get_mut(update.operation))
        else {
            continue;
        };
        match update.slot {
            LabelSlot::Message(i) => {
                if let Some(message) = operation.messages.get_mut(i) {
                    message.effective_label = update.label;
                }
            }
            LabelSlot::Fault(i) => {
                if let Some(fault) = operation.fault_references.get_mut(i) {
                    fault.effective_label = update.label;
                }
            }
        }
    }
    Ok(())
}

fn label_or_report(
    reporter: &mut dyn ErrorReporter,
    inference: LabelInference,
    pattern: &str,
    locator: Locator,
) -> Result<Option<MessageLabel>> {
    match inference {
        LabelInference::Label(label) => Ok(Some(label)),
        LabelInference::NotAllowed => {
            emit(
                reporter,
                Diagnostic::error(
                    ErrorCode::MessageLabelInference,
                    format!("pattern {} has no message in this direction", pattern),
                )
                .with_locator(locator),
            )?;
            Ok(None)
        }
        LabelInference::UnknownPattern => {
            emit(
                reporter,
                Diagnostic::warning(
                    ErrorCode::MessageLabelInference,
                    format!("cannot infer a message label under unknown pattern {}", pattern),
                )
                .with_locator(locator),
            )?;
            Ok(None)
        }
    }
}

