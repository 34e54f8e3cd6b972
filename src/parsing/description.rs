//! `<description>`, `<import>` and `<include>`

use url::Url;

use super::session::{ChildOrder, DocumentParser, ParseSession};
use crate::documents::Element;
use crate::elements::{Description, DescriptionId, Documentation, Import, Include};
use crate::error::{Diagnostic, ErrorCode, Locator, Result};
use crate::extensions::{Extensible, OwnerKind};
use crate::locations::cache_key;
use crate::namespaces::{QName, WSDL11_NAMESPACE, WSDL_NAMESPACE};

/// Parse a `<description>` root read from `base`
///
/// The document is registered in the module cache before any of its imports
/// or includes are followed, so documents referring to each other resolve to
/// the slot already reserved.
pub(crate) fn parse_description(
    session: &mut ParseSession<'_>,
    element: &Element,
    base: Url,
) -> Result<DescriptionId> {
    if element.qname != QName::wsdl("description") {
        let locator = Locator::document(base.as_str())
            .with_line(element.line)
            .with_element(element.local_name());
        let diagnostic = if element.qname == QName::namespaced(WSDL11_NAMESPACE, "definitions") {
            Diagnostic::fatal(
                ErrorCode::Wsdl11Document,
                "document is a WSDL 1.1 <definitions>, not a WSDL 2.0 <description>",
            )
        } else {
            Diagnostic::fatal(
                ErrorCode::WrongRootElement,
                format!("expected a WSDL 2.0 <description> root, found {}", element.qname),
            )
        };
        return Err(session.fatal(diagnostic.with_locator(locator)));
    }

    let key = cache_key(&base);
    if let Some(id) = session.cached_module(&key) {
        tracing::debug!("module cache hit for {}", key);
        return Ok(id);
    }

    let id = session.descriptions.reserve(base.clone());
    session.register_module(key, id);
    tracing::debug!("parsing description {} from {}", id, base);

    let mut parser = DocumentParser::new(session, id, base);
    let description = parser.parse_root(element)?;
    if let Some(slot) = parser.session.descriptions.get_mut(id) {
        *slot = description;
    }
    Ok(id)
}

impl DocumentParser<'_, '_> {
    fn parse_root(&mut self, element: &Element) -> Result<Description> {
        let mut description = Description::new(self.id, self.base.clone());
        description.line = element.line;
        description.namespaces = element.namespaces.clone();

        description.target_namespace = self.uri_attribute(element, "targetNamespace", true)?;
        self.target_namespace = description.target_namespace.clone();
        description.extensions = self.extensions(OwnerKind::Description, element)?;

        let mut order = ChildOrder::default();
        for child in element.children() {
            if !child.qname.is_in(WSDL_NAMESPACE) {
                self.extension_element(OwnerKind::Description, child, &mut description.extensions)?;
                continue;
            }

            let rank = match child.local_name() {
                "documentation" => 0,
                "import" | "include" => 1,
                "types" => 2,
                "interface" | "binding" | "service" => 3,
                _ => {
                    self.unexpected(child, "description")?;
                    continue;
                }
            };
            if !order.accept(rank) {
                self.out_of_order(child, "description")?;
            }

            match child.local_name() {
                "documentation" => description.documentation.push(self.documentation(child)),
                "import" => {
                    let import = self.parse_import(child)?;
                    description.imports.push(import);
                }
                "include" => {
                    let include = self.parse_include(child)?;
                    description.includes.push(include);
                }
                "types" => {
                    if description.types.is_some() {
                        self.error(
                            ErrorCode::DuplicateTypes,
                            child,
                            "a description may contain at most one <types>",
                        )?;
                        continue;
                    }
                    description.types = Some(self.parse_types(child)?);
                }
                "interface" => {
                    let interface = self.parse_interface(child)?;
                    description.interfaces.push(interface);
                }
                "binding" => {
                    let binding = self.parse_binding(child)?;
                    description.bindings.push(binding);
                }
                "service" => {
                    let service = self.parse_service(child)?;
                    description.services.push(service);
                }
                _ => {}
            }
        }

        Ok(description)
    }

    fn parse_import(&mut self, element: &Element) -> Result<Import> {
        let namespace = self.uri_attribute(element, "namespace", true)?;
        let location = self.uri_attribute(element, "location", false)?;
        let mut import = Import {
            namespace,
            location,
            description: None,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::Description, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::Description,
            &mut import.documentation,
            &mut import.extensions,
        )?;

        if let Some(location) = import.location.clone() {
            import.description = self.resolve_module(element, &location, "import")?;
        }
        Ok(import)
    }

    fn parse_include(&mut self, element: &Element) -> Result<Include> {
        let location = self.uri_attribute(element, "location", true)?;
        let mut include = Include {
            location,
            description: None,
            documentation: Vec::new(),
            extensions: self.extensions(OwnerKind::Description, element)?,
            line: element.line,
        };
        self.nested_children(
            element,
            OwnerKind::Description,
            &mut include.documentation,
            &mut include.extensions,
        )?;

        if let Some(location) = include.location.clone() {
            include.description = self.resolve_module(element, &location, "include")?;
        }
        Ok(include)
    }

    /// Children of an element that only allows documentation and extensions
    pub(crate) fn nested_children(
        &mut self,
        element: &Element,
        owner: OwnerKind,
        documentation: &mut Vec<Documentation>,
        extensions: &mut Extensible,
    ) -> Result<()> {
        for child in element.children() {
            if child.qname == QName::wsdl("documentation") {
                documentation.push(self.documentation(child));
            } else if child.qname.is_in(WSDL_NAMESPACE) {
                self.unexpected(child, element.local_name())?;
            } else {
                self.extension_element(owner, child, extensions)?;
            }
        }
        Ok(())
    }
}
