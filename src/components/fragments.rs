//! Fragment identifiers
//!
//! Canonical pointers to components, in the `wsdl.*()` XPointer scheme of
//! WSDL 2.0 Part 1 Appendix C. Qualified names in the arguments are written
//! with generated prefixes `ns1`, `ns2`, ... declared by leading
//! `xmlns(...)` scheme parts.

use std::fmt;

use super::{ComponentModel, ComponentRef};
use crate::elements::MessageLabel;
use crate::namespaces::QName;

/// A fragment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentIdentifier {
    namespaces: Vec<(String, String)>,
    scheme: &'static str,
    arguments: Vec<String>,
    separator: &'static str,
}

impl FragmentIdentifier {
    fn new(scheme: &'static str) -> Self {
        Self {
            namespaces: Vec::new(),
            scheme,
            arguments: Vec::new(),
            separator: "/",
        }
    }

    /// `wsdl.extension(namespace,identifier)` for a component defined by an extension
    pub fn extension(namespace: &str, identifier: &str) -> Self {
        let mut fragment = Self::new("extension");
        fragment.separator = ",";
        fragment.arguments.push(namespace.to_string());
        fragment.arguments.push(identifier.to_string());
        fragment
    }

    /// Name of the `wsdl.*` scheme function, e.g. `interfaceOperation`
    pub fn scheme(&self) -> &str {
        self.scheme
    }

    /// Arguments in order, qualified names already prefixed
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    fn push(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    fn push_qname(mut self, qname: Option<&QName>) -> Self {
        let argument = match qname {
            Some(qname) => self.prefixed(qname),
            None => String::new(),
        };
        self.arguments.push(argument);
        self
    }

    fn push_label(self, label: Option<&MessageLabel>) -> Self {
        let label = label.map(|l| l.as_str().to_string()).unwrap_or_default();
        self.push(label)
    }

    fn prefixed(&mut self, qname: &QName) -> String {
        let Some(namespace) = qname.namespace.as_deref() else {
            return qname.local_name.clone();
        };
        let prefix = match self.namespaces.iter().find(|(_, ns)| ns == namespace) {
            Some((prefix, _)) => prefix.clone(),
            None => {
                let prefix = format!("ns{}", self.namespaces.len() + 1);
                self.namespaces.push((prefix.clone(), namespace.to_string()));
                prefix
            }
        };
        format!("{}:{}", prefix, qname.local_name)
    }
}

impl fmt::Display for FragmentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prefix, namespace) in &self.namespaces {
            write!(f, "xmlns({}={})", prefix, namespace)?;
        }
        write!(
            f,
            "wsdl.{}({})",
            self.scheme,
            self.arguments.join(self.separator)
        )
    }
}

pub(super) fn fragment_identifier(model: &ComponentModel, component: &ComponentRef) -> FragmentIdentifier {
    use FragmentIdentifier as F;

    match component {
        ComponentRef::Description => F::new("description"),
        ComponentRef::ElementDeclaration(name) => F::new("elementDeclaration").push_qname(Some(name)),
        ComponentRef::TypeDefinition(name) => F::new("typeDefinition").push_qname(Some(name)),
        ComponentRef::Interface(id) => F::new("interface").push(model[*id].name.local_name.clone()),
        ComponentRef::InterfaceFault(id) => {
            let fault = &model[*id];
            F::new("interfaceFault")
                .push(model[fault.parent].name.local_name.clone())
                .push(fault.name.local_name.clone())
        }
        ComponentRef::InterfaceOperation(id) => {
            let operation = &model[*id];
            F::new("interfaceOperation")
                .push(model[operation.parent].name.local_name.clone())
                .push(operation.name.local_name.clone())
        }
        ComponentRef::InterfaceMessageReference(id) => {
            let message = &model[*id];
            let operation = &model[message.parent];
            F::new("interfaceMessageReference")
                .push(model[operation.parent].name.local_name.clone())
                .push(operation.name.local_name.clone())
                .push_label(message.message_label.as_ref())
        }
        ComponentRef::InterfaceFaultReference(id) => {
            let fault = &model[*id];
            let operation = &model[fault.parent];
            F::new("interfaceFaultReference")
                .push(model[operation.parent].name.local_name.clone())
                .push(operation.name.local_name.clone())
                .push_label(fault.message_label.as_ref())
                .push_qname(fault.interface_fault.as_ref())
        }
        ComponentRef::Binding(id) => F::new("binding").push(model[*id].name.local_name.clone()),
        ComponentRef::BindingFault(id) => {
            let fault = &model[*id];
            F::new("bindingFault")
                .push(model[fault.parent].name.local_name.clone())
                .push_qname(fault.interface_fault.as_ref())
        }
        ComponentRef::BindingOperation(id) => {
            let operation = &model[*id];
            F::new("bindingOperation")
                .push(model[operation.parent].name.local_name.clone())
                .push_qname(operation.interface_operation.as_ref())
        }
        ComponentRef::BindingMessageReference(id) => {
            let message = &model[*id];
            let operation = &model[message.parent];
            F::new("bindingMessageReference")
                .push(model[operation.parent].name.local_name.clone())
                .push_qname(operation.interface_operation.as_ref())
                .push_label(message.message_label.as_ref())
        }
        ComponentRef::BindingFaultReference(id) => {
            let fault = &model[*id];
            let operation = &model[fault.parent];
            F::new("bindingFaultReference")
                .push(model[operation.parent].name.local_name.clone())
                .push_qname(operation.interface_operation.as_ref())
                .push_label(fault.message_label.as_ref())
                .push_qname(fault.interface_fault.as_ref())
        }
        ComponentRef::Service(id) => F::new("service").push(model[*id].name.local_name.clone()),
        ComponentRef::Endpoint(id) => {
            let endpoint = &model[*id];
            F::new("endpoint")
                .push(model[endpoint.parent].name.local_name.clone())
                .push(endpoint.name.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_follow_first_use() {
        let fragment = FragmentIdentifier::new("bindingFaultReference")
            .push("B")
            .push_qname(Some(&QName::namespaced("urn:a", "op")))
            .push_label(Some(&MessageLabel::OUT))
            .push_qname(Some(&QName::namespaced("urn:b", "Fault")));

        assert_eq!(
            fragment.to_string(),
            "xmlns(ns1=urn:a)xmlns(ns2=urn:b)wsdl.bindingFaultReference(B/ns1:op/Out/ns2:Fault)"
        );
    }

    #[test]
    fn test_same_namespace_reuses_prefix() {
        let fragment = FragmentIdentifier::new("bindingFaultReference")
            .push("B")
            .push_qname(Some(&QName::namespaced("urn:a", "op")))
            .push_label(Some(&MessageLabel::IN))
            .push_qname(Some(&QName::namespaced("urn:a", "Fault")));

        assert_eq!(
            fragment.to_string(),
            "xmlns(ns1=urn:a)wsdl.bindingFaultReference(B/ns1:op/In/ns1:Fault)"
        );
    }

    #[test]
    fn test_unqualified_name_has_no_prefix() {
        let fragment = FragmentIdentifier::new("elementDeclaration").push_qname(Some(&QName::local("Item")));
        assert_eq!(fragment.to_string(), "wsdl.elementDeclaration(Item)");
    }

    proptest::proptest! {
        #[test]
        fn prop_one_prefix_per_namespace(namespaces in proptest::collection::vec("urn:[a-c]{1,2}", 1..6)) {
            let mut fragment = FragmentIdentifier::new("bindingOperation").push("B");
            for namespace in &namespaces {
                fragment = fragment.push_qname(Some(&QName::namespaced(namespace.as_str(), "op")));
            }
            let distinct: std::collections::HashSet<&String> = namespaces.iter().collect();
            let text = fragment.to_string();
            proptest::prop_assert_eq!(text.matches("xmlns(").count(), distinct.len());
            proptest::prop_assert!(text.contains("wsdl.bindingOperation(B/ns1:op"));
        }
    }

    #[test]
    fn test_description_and_extension() {
        assert_eq!(FragmentIdentifier::new("description").to_string(), "wsdl.description()");
        assert_eq!(
            FragmentIdentifier::extension("http://www.w3.org/ns/wsdl/soap", "module").to_string(),
            "wsdl.extension(http://www.w3.org/ns/wsdl/soap,module)"
        );
    }
}
