//! `<service>` and `<endpoint>`

use super::session::{ChildOrder, DocumentParser};
use crate::documents::Element;
use crate::elements::{Endpoint, Service};
use crate::error::Result;
use crate::extensions::OwnerKind;
use crate::namespaces::WSDL_NAMESPACE;

impl DocumentParser<'_, '_> {
    pub(crate) fn parse_service(&mut self, element: &Element) -> Result<Service> {
        let mut service = Service {
            description: self.id,
            name: self.name_attribute(element)?,
            target_namespace: self.target_namespace.clone(),
            interface: self.qname_attribute(element, "interface", true)?,
            endpoints: Vec::new(),
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::Service, element)?,
            line: element.line,
        };

        let mut order = ChildOrder::default();
        for child in element.children() {
            if !child.qname.is_in(WSDL_NAMESPACE) {
                self.extension_element(OwnerKind::Service, child, &mut service.extensions)?;
                continue;
            }
            let rank = if child.local_name() == "documentation" { 0 } else { 1 };
            if !order.accept(rank) {
                self.out_of_order(child, "service")?;
            }
            match child.local_name() {
                "documentation" => service.documentation.push(self.documentation(child)),
                "endpoint" => {
                    let endpoint = self.parse_endpoint(child)?;
                    service.endpoints.push(endpoint);
                }
                _ => self.unexpected(child, "service")?,
            }
        }

        Ok(service)
    }

    fn parse_endpoint(&mut self, element: &Element) -> Result<Endpoint> {
        let mut endpoint = Endpoint {
            name: self.name_attribute(element)?,
            binding: self.qname_attribute(element, "binding", true)?,
            address: self.uri_attribute(element, "address", false)?,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::Endpoint, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::Endpoint,
            &mut endpoint.documentation,
            &mut endpoint.extensions,
        )?;
        Ok(endpoint)
    }
}
