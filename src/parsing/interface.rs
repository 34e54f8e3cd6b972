//! `<interface>` and its children

use super::mep::{self, LabelInference};
use super::session::{ChildOrder, DocumentParser};
use crate::documents::Element;
use crate::elements::{
    Direction, Interface, InterfaceFault, InterfaceFaultReference, InterfaceMessageReference,
    InterfaceOperation, MessageLabel,
};
use crate::error::{ErrorCode, Result};
use crate::extensions::OwnerKind;
use crate::namespaces::WSDL_NAMESPACE;

impl DocumentParser<'_, '_> {
    pub(crate) fn parse_interface(&mut self, element: &Element) -> Result<Interface> {
        let mut interface = Interface {
            description: self.id,
            name: self.name_attribute(element)?,
            target_namespace: self.target_namespace.clone(),
            extends: self.qname_list_attribute(element, "extends")?,
            style_default: self
                .uri_list_attribute(element, "styleDefault")?
                .unwrap_or_default(),
            faults: Vec::new(),
            operations: Vec::new(),
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::Interface, element)?,
            line: element.line,
        };

        let mut order = ChildOrder::default();
        for child in element.children() {
            if !child.qname.is_in(WSDL_NAMESPACE) {
                self.extension_element(OwnerKind::Interface, child, &mut interface.extensions)?;
                continue;
            }
            let rank = if child.local_name() == "documentation" { 0 } else { 1 };
            if !order.accept(rank) {
                self.out_of_order(child, "interface")?;
            }
            match child.local_name() {
                "documentation" => interface.documentation.push(self.documentation(child)),
                "fault" => {
                    let fault = self.parse_interface_fault(child)?;
                    interface.faults.push(fault);
                }
                "operation" => {
                    let operation = self.parse_interface_operation(child)?;
                    interface.operations.push(operation);
                }
                _ => self.unexpected(child, "interface")?,
            }
        }

        Ok(interface)
    }

    fn parse_interface_fault(&mut self, element: &Element) -> Result<InterfaceFault> {
        let mut fault = InterfaceFault {
            name: self.name_attribute(element)?,
            element: self.element_reference_attribute(element)?,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::InterfaceFault, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::InterfaceFault,
            &mut fault.documentation,
            &mut fault.extensions,
        )?;
        Ok(fault)
    }

    fn parse_interface_operation(&mut self, element: &Element) -> Result<InterfaceOperation> {
        let mut operation = InterfaceOperation {
            name: self.name_attribute(element)?,
            pattern: self.uri_attribute(element, "pattern", false)?,
            style: self.uri_list_attribute(element, "style")?,
            messages: Vec::new(),
            fault_references: Vec::new(),
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::InterfaceOperation, element)?,
            line: element.line,
        };

        let mut order = ChildOrder::default();
        for child in element.children() {
            if !child.qname.is_in(WSDL_NAMESPACE) {
                self.extension_element(
                    OwnerKind::InterfaceOperation,
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
                    let direction = direction_of(child);
                    let message = self.parse_interface_message(child, direction)?;
                    operation.messages.push(message);
                }
                "infault" | "outfault" => {
                    let direction = direction_of(child);
                    let fault = self.parse_interface_fault_reference(child, direction)?;
                    operation.fault_references.push(fault);
                }
                _ => self.unexpected(child, "operation")?,
            }
        }

        let pattern = operation.effective_pattern().to_string();
        for (message, child) in operation
            .messages
            .iter_mut()
            .zip(message_children(element))
        {
            if message.effective_label.is_none() {
                message.effective_label = self.infer_label(
                    child,
                    &pattern,
                    message.direction,
                    mep::message_label(&pattern, message.direction),
                )?;
            }
        }
        for (fault, child) in operation
            .fault_references
            .iter_mut()
            .zip(fault_children(element))
        {
            if fault.effective_label.is_none() {
                fault.effective_label = self.infer_label(
                    child,
                    &pattern,
                    fault.direction,
                    mep::fault_label(&pattern, fault.direction),
                )?;
            }
        }

        Ok(operation)
    }

    fn parse_interface_message(
        &mut self,
        element: &Element,
        direction: Direction,
    ) -> Result<InterfaceMessageReference> {
        let message_label = self.label_attribute(element)?;
        let mut message = InterfaceMessageReference {
            direction,
            effective_label: message_label.clone(),
            message_label,
            element: self.element_reference_attribute(element)?,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::InterfaceMessageReference, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::InterfaceMessageReference,
            &mut message.documentation,
            &mut message.extensions,
        )?;
        Ok(message)
    }

    fn parse_interface_fault_reference(
        &mut self,
        element: &Element,
        direction: Direction,
    ) -> Result<InterfaceFaultReference> {
        let message_label = self.label_attribute(element)?;
        let mut fault = InterfaceFaultReference {
            direction,
            reference: self.qname_attribute(element, "ref", true)?,
            effective_label: message_label.clone(),
            message_label,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::InterfaceFaultReference, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::InterfaceFaultReference,
            &mut fault.documentation,
            &mut fault.extensions,
        )?;
        Ok(fault)
    }

    /// Report an inference that yields no label
    pub(crate) fn infer_label(
        &mut self,
        element: &Element,
        pattern: &str,
        direction: Direction,
        inference: LabelInference,
    ) -> Result<Option<MessageLabel>> {
        match inference {
            LabelInference::Label(label) => Ok(Some(label)),
            LabelInference::NotAllowed => {
                self.error(
                    ErrorCode::MessageLabelInference,
                    element,
                    format!(
                        "pattern {} allows no <{}> without an explicit messageLabel",
                        pattern,
                        element.local_name()
                    ),
                )?;
                Ok(None)
            }
            LabelInference::UnknownPattern => {
                self.warning(
                    ErrorCode::MessageLabelInference,
                    element,
                    format!(
                        "cannot infer the {} message label under unknown pattern {}",
                        direction, pattern
                    ),
                )?;
                Ok(None)
            }
        }
    }
}

pub(crate) fn direction_of(element: &Element) -> Direction {
    match element.local_name() {
        "output" | "outfault" => Direction::Out,
        _ => Direction::In,
    }
}

/// `<input>`/`<output>` children in document order
pub(crate) fn message_children(element: &Element) -> impl Iterator<Item = &Element> {
    element.children().filter(|c| {
        c.qname.is_in(WSDL_NAMESPACE) && matches!(c.local_name(), "input" | "output")
    })
}

/// `<infault>`/`<outfault>` children in document order
pub(crate) fn fault_children(element: &Element) -> impl Iterator<Item = &Element> {
    element.children().filter(|c| {
        c.qname.is_in(WSDL_NAMESPACE) && matches!(c.local_name(), "infault" | "outfault")
    })
}
