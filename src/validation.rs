//! Structural validation pass
//!
//! Runs over the element model once every document is read. Findings are
//! reported as errors; none of them stop the read.

use std::collections::HashSet;

use crate::elements::{DescriptionId, Descriptions, Direction, MessageLabel};
use crate::error::{Diagnostic, ErrorCode, Locator, Result};
use crate::namespaces::QName;
use crate::reporter::{emit, ErrorReporter};

fn message_element(direction: Direction) -> &'static str {
    match direction {
        Direction::In => "input",
        Direction::Out => "output",
    }
}

fn fault_element(direction: Direction) -> &'static str {
    match direction {
        Direction::In => "infault",
        Direction::Out => "outfault",
    }
}

struct Validator<'a> {
    descriptions: &'a Descriptions,
    reporter: &'a mut dyn ErrorReporter,
    count: usize,
}

impl Validator<'_> {
    fn report(
        &mut self,
        id: DescriptionId,
        line: Option<usize>,
        element: &str,
        message: String,
    ) -> Result<()> {
        let descriptions = self.descriptions;
        let uri = descriptions[id].document_base_uri.as_str();
        self.count += 1;
        emit(
            &mut *self.reporter,
            Diagnostic::error(ErrorCode::Validation, message).with_locator(
                Locator::document(uri)
                    .with_line(line)
                    .with_element(element),
            ),
        )
    }

    fn duplicates(
        &mut self,
        id: DescriptionId,
        element: &str,
        names: impl IntoIterator<Item = (Option<QName>, Option<usize>)>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, line) in names {
            let Some(name) = name else {
                continue;
            };
            if !seen.insert(name.clone()) {
                self.report(id, line, element, format!("duplicate {} name {}", element, name))?;
            }
        }
        Ok(())
    }

    fn description(&mut self, id: DescriptionId) -> Result<()> {
        let descriptions = self.descriptions;
        let description = &descriptions[id];

        self.duplicates(
            id,
            "interface",
            description.interfaces.iter().map(|i| (i.qname(), i.line)),
        )?;
        self.duplicates(
            id,
            "binding",
            description.bindings.iter().map(|b| (b.qname(), b.line)),
        )?;
        self.duplicates(
            id,
            "service",
            description.services.iter().map(|s| (s.qname(), s.line)),
        )?;

        for interface in &description.interfaces {
            let namespace = interface.target_namespace.as_deref();
            self.duplicates(
                id,
                "fault",
                interface.faults.iter().map(|f| (f.qname(namespace), f.line)),
            )?;
            self.duplicates(
                id,
                "operation",
                interface
                    .operations
                    .iter()
                    .map(|o| (o.qname(namespace), o.line)),
            )?;

            for extended in &interface.extends {
                if descriptions.find_interface(id, extended).is_none() {
                    self.report(
                        id,
                        interface.line,
                        "interface",
                        format!("extended interface {} is not in scope", extended),
                    )?;
                }
            }

            for operation in &interface.operations {
                let mut labels: HashSet<&MessageLabel> = HashSet::new();
                for message in &operation.messages {
                    match &message.effective_label {
                        Some(label) => {
                            if !labels.insert(label) {
                                self.report(
                                    id,
                                    message.line,
                                    message_element(message.direction),
                                    format!("more than one message reference with label {}", label),
                                )?;
                            }
                        }
                        None => self.report(
                            id,
                            message.line,
                            message_element(message.direction),
                            "message reference has no message label".to_string(),
                        )?,
                    }
                }
                for fault in &operation.fault_references {
                    if fault.effective_label.is_none() {
                        self.report(
                            id,
                            fault.line,
                            fault_element(fault.direction),
                            "fault reference has no message label".to_string(),
                        )?;
                    }
                    if let Some(reference) = &fault.reference {
                        if descriptions.find_interface_fault(interface, reference).is_none() {
                            self.report(
                                id,
                                fault.line,
                                fault_element(fault.direction),
                                format!("interface fault {} is not declared", reference),
                            )?;
                        }
                    }
                }
            }
        }

        for binding in &description.bindings {
            let interface = match &binding.interface {
                Some(name) => {
                    let found = descriptions.find_interface(id, name);
                    if found.is_none() {
                        self.report(
                            id,
                            binding.line,
                            "binding",
                            format!("bound interface {} is not in scope", name),
                        )?;
                    }
                    found
                }
                None => None,
            };
            let Some(interface) = interface else {
                continue;
            };

            for fault in &binding.faults {
                if let Some(reference) = &fault.reference {
                    if descriptions.find_interface_fault(interface, reference).is_none() {
                        self.report(
                            id,
                            fault.line,
                            "fault",
                            format!("binding fault refers to unknown interface fault {}", reference),
                        )?;
                    }
                }
            }
            for operation in &binding.operations {
                if let Some(reference) = &operation.reference {
                    if descriptions
                        .find_interface_operation(interface, reference)
                        .is_none()
                    {
                        self.report(
                            id,
                            operation.line,
                            "operation",
                            format!(
                                "binding operation refers to unknown interface operation {}",
                                reference
                            ),
                        )?;
                        continue;
                    }
                }
                for message in &operation.messages {
                    if message.effective_label.is_none() {
                        self.report(
                            id,
                            message.line,
                            message_element(message.direction),
                            "binding message reference has no message label".to_string(),
                        )?;
                    }
                }
                for fault in &operation.fault_references {
                    if fault.effective_label.is_none() {
                        self.report(
                            id,
                            fault.line,
                            fault_element(fault.direction),
                            "binding fault reference has no message label".to_string(),
                        )?;
                    }
                }
            }
        }

        for service in &description.services {
            if let Some(name) = &service.interface {
                if descriptions.find_interface(id, name).is_none() {
                    self.report(
                        id,
                        service.line,
                        "service",
                        format!("service interface {} is not in scope", name),
                    )?;
                }
            }
            let mut endpoint_names = HashSet::new();
            for endpoint in &service.endpoints {
                if let Some(name) = &endpoint.name {
                    if !endpoint_names.insert(name.as_str()) {
                        self.report(
                            id,
                            endpoint.line,
                            "endpoint",
                            format!("duplicate endpoint name {}", name.as_str()),
                        )?;
                    }
                }
                if let Some(binding) = &endpoint.binding {
                    if descriptions.find_binding(id, binding).is_none() {
                        self.report(
                            id,
                            endpoint.line,
                            "endpoint",
                            format!("endpoint binding {} is not in scope", binding),
                        )?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Validate every description read, reporting findings as errors
///
/// Returns the number of findings.
pub fn validate(
    descriptions: &Descriptions,
    root: DescriptionId,
    reporter: &mut dyn ErrorReporter,
) -> Result<usize> {
    let mut validator = Validator {
        descriptions,
        reporter,
        count: 0,
    };
    let mut ids = descriptions.in_scope(root);
    for description in descriptions.iter() {
        if !ids.contains(&description.id) {
            ids.push(description.id);
        }
    }
    for id in ids {
        validator.description(id)?;
    }
    tracing::debug!("validation found {} problem(s)", validator.count);
    Ok(validator.count)
}
