//! Parse session and per-document parser state
//!
//! A [`ParseSession`] lives for one top-level read. It owns the description
//! arena and the module and schema caches, and is passed explicitly down the
//! recursion into imported and included documents. A [`DocumentParser`]
//! borrows the session while one document is being walked and carries that
//! document's base URI and target namespace.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use url::Url;

use crate::documents::Element;
use crate::elements::{DescriptionId, Descriptions, Documentation, ElementReference, MessageLabel};
use crate::error::{Diagnostic, Error, ErrorCode, Locator, Result};
use crate::extensions::{ExtensionRegistry, Extensible, OwnerKind};
use crate::limits::Limits;
use crate::loaders::DocumentLoader;
use crate::locations::{is_valid_uri, UriResolver};
use crate::names::{is_valid_qname, NcName};
use crate::namespaces::{QName, WSDL_NAMESPACE, XMLNS_NAMESPACE, XSI_NAMESPACE};
use crate::reporter::{emit, ErrorReporter};
use crate::schema::Schema;

/// Key of a cached schema: its URL and the namespace it was included into
pub(crate) type SchemaKey = (String, Option<String>);

/// State shared by every document read during one top-level parse
pub(crate) struct ParseSession<'a> {
    pub(crate) descriptions: Descriptions,
    modules: HashMap<String, DescriptionId>,
    pub(crate) schemas: HashMap<SchemaKey, Arc<Schema>>,
    pub(crate) schemas_in_progress: HashSet<SchemaKey>,
    pub(crate) reporter: &'a mut dyn ErrorReporter,
    pub(crate) loader: &'a dyn DocumentLoader,
    pub(crate) resolver: &'a dyn UriResolver,
    pub(crate) registry: &'a ExtensionRegistry,
    pub(crate) limits: &'a Limits,
    pub(crate) depth: usize,
}

impl<'a> ParseSession<'a> {
    pub(crate) fn new(
        reporter: &'a mut dyn ErrorReporter,
        loader: &'a dyn DocumentLoader,
        resolver: &'a dyn UriResolver,
        registry: &'a ExtensionRegistry,
        limits: &'a Limits,
    ) -> Self {
        Self {
            descriptions: Descriptions::new(),
            modules: HashMap::new(),
            schemas: HashMap::new(),
            schemas_in_progress: HashSet::new(),
            reporter,
            loader,
            resolver,
            registry,
            limits,
            depth: 0,
        }
    }

    /// Report a diagnostic; fatal ones come back as an error
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) -> Result<()> {
        emit(&mut *self.reporter, diagnostic)
    }

    /// Report a fatal diagnostic and return the error that aborts the document
    pub(crate) fn fatal(&mut self, diagnostic: Diagnostic) -> Error {
        match self.report(diagnostic.clone()) {
            Err(e) => e,
            Ok(()) => Error::Fatal(diagnostic),
        }
    }

    pub(crate) fn cached_module(&self, key: &str) -> Option<DescriptionId> {
        self.modules.get(key).copied()
    }

    pub(crate) fn register_module(&mut self, key: String, id: DescriptionId) {
        self.modules.insert(key, id);
    }

    pub(crate) fn forget_module(&mut self, key: &str) {
        self.modules.remove(key);
    }

    /// Consume the session, keeping the arena
    pub(crate) fn into_descriptions(self) -> Descriptions {
        self.descriptions
    }
}

/// Tracks the loose child ordering of an element
#[derive(Debug, Default)]
pub(crate) struct ChildOrder {
    highest: u8,
}

impl ChildOrder {
    /// Record a child of the given rank; false when it comes too late
    pub(crate) fn accept(&mut self, rank: u8) -> bool {
        if rank < self.highest {
            return false;
        }
        self.highest = rank;
        true
    }
}

/// Walks one document
pub(crate) struct DocumentParser<'s, 'a> {
    pub(crate) session: &'s mut ParseSession<'a>,
    pub(crate) id: DescriptionId,
    pub(crate) base: Url,
    pub(crate) target_namespace: Option<String>,
}

impl<'s, 'a> DocumentParser<'s, 'a> {
    pub(crate) fn new(session: &'s mut ParseSession<'a>, id: DescriptionId, base: Url) -> Self {
        Self {
            session,
            id,
            base,
            target_namespace: None,
        }
    }

    pub(crate) fn locator(&self, element: &Element) -> Locator {
        Locator::document(self.base.as_str())
            .with_line(element.line)
            .with_element(element.local_name())
    }

    pub(crate) fn warning(
        &mut self,
        code: ErrorCode,
        element: &Element,
        message: impl Into<String>,
    ) -> Result<()> {
        let diagnostic = Diagnostic::warning(code, message).with_locator(self.locator(element));
        self.session.report(diagnostic)
    }

    pub(crate) fn error(
        &mut self,
        code: ErrorCode,
        element: &Element,
        message: impl Into<String>,
    ) -> Result<()> {
        let diagnostic = Diagnostic::error(code, message).with_locator(self.locator(element));
        self.session.report(diagnostic)
    }

    /// Report a WSDL-namespace element that is not allowed where it appears
    pub(crate) fn unexpected(&mut self, child: &Element, parent: &str) -> Result<()> {
        self.error(
            ErrorCode::UnexpectedElement,
            child,
            format!("<{}> is not allowed in <{}>", child.local_name(), parent),
        )
    }

    pub(crate) fn out_of_order(&mut self, child: &Element, parent: &str) -> Result<()> {
        self.warning(
            ErrorCode::ElementOutOfOrder,
            child,
            format!("<{}> is out of order in <{}>", child.local_name(), parent),
        )
    }

    pub(crate) fn documentation(&self, child: &Element) -> Documentation {
        Documentation {
            content: child.clone(),
        }
    }

    fn missing(&mut self, element: &Element, name: &str) -> Result<()> {
        self.error(
            ErrorCode::MissingAttribute,
            element,
            format!("<{}> requires the '{}' attribute", element.local_name(), name),
        )
    }

    /// `name`, validated as an NCName
    pub(crate) fn name_attribute(&mut self, element: &Element) -> Result<Option<NcName>> {
        let Some(value) = element.attribute_local("name") else {
            self.missing(element, "name")?;
            return Ok(None);
        };
        match NcName::new(value.trim()) {
            Ok(name) => Ok(Some(name)),
            Err(e) => {
                self.error(ErrorCode::InvalidNcName, element, e.to_string())?;
                Ok(None)
            }
        }
    }

    fn resolve_qname(&mut self, element: &Element, name: &str, value: &str) -> Result<Option<QName>> {
        let value = value.trim();
        if !is_valid_qname(value) {
            self.error(
                ErrorCode::InvalidAttributeValue,
                element,
                format!("'{}' of '{}' is not a QName", value, name),
            )?;
            return Ok(None);
        }
        match element.resolve_qname(value) {
            Ok(qname) => Ok(Some(qname)),
            Err(e) => {
                self.error(
                    ErrorCode::UnboundPrefix,
                    element,
                    format!("cannot resolve '{}' of '{}': {}", value, name, e),
                )?;
                Ok(None)
            }
        }
    }

    /// A QName-valued attribute resolved in the element's scope
    pub(crate) fn qname_attribute(
        &mut self,
        element: &Element,
        name: &str,
        required: bool,
    ) -> Result<Option<QName>> {
        match element.attribute_local(name) {
            Some(value) => self.resolve_qname(element, name, value),
            None => {
                if required {
                    self.missing(element, name)?;
                }
                Ok(None)
            }
        }
    }

    /// A whitespace separated list of QNames; unresolvable entries are dropped
    pub(crate) fn qname_list_attribute(&mut self, element: &Element, name: &str) -> Result<Vec<QName>> {
        let Some(value) = element.attribute_local(name) else {
            return Ok(Vec::new());
        };
        let mut qnames = Vec::new();
        for token in value.split_whitespace() {
            if let Some(qname) = self.resolve_qname(element, name, token)? {
                qnames.push(qname);
            }
        }
        Ok(qnames)
    }

    /// A URI-valued attribute; malformed values are reported and left unset
    pub(crate) fn uri_attribute(
        &mut self,
        element: &Element,
        name: &str,
        required: bool,
    ) -> Result<Option<String>> {
        let Some(value) = element.attribute_local(name) else {
            if required {
                self.missing(element, name)?;
            }
            return Ok(None);
        };
        let value = value.trim();
        if is_valid_uri(value) {
            Ok(Some(value.to_string()))
        } else {
            self.error(
                ErrorCode::InvalidUri,
                element,
                format!("'{}' of '{}' is not a URI", value, name),
            )?;
            Ok(None)
        }
    }

    /// A list of URIs; `None` when the attribute is absent
    pub(crate) fn uri_list_attribute(
        &mut self,
        element: &Element,
        name: &str,
    ) -> Result<Option<Vec<String>>> {
        let Some(value) = element.attribute_local(name) else {
            return Ok(None);
        };
        let mut uris = Vec::new();
        for token in value.split_whitespace() {
            if is_valid_uri(token) {
                uris.push(token.to_string());
            } else {
                self.error(
                    ErrorCode::InvalidUri,
                    element,
                    format!("'{}' of '{}' is not a URI", token, name),
                )?;
            }
        }
        Ok(Some(uris))
    }

    /// `messageLabel`
    pub(crate) fn label_attribute(&mut self, element: &Element) -> Result<Option<MessageLabel>> {
        let Some(value) = element.attribute_local("messageLabel") else {
            return Ok(None);
        };
        match NcName::new(value.trim()) {
            Ok(name) => Ok(Some(MessageLabel::new(name.as_str()))),
            Err(e) => {
                self.error(ErrorCode::InvalidNcName, element, e.to_string())?;
                Ok(None)
            }
        }
    }

    /// `element`: `#any`, `#none`, `#other` or a QName
    pub(crate) fn element_reference_attribute(
        &mut self,
        element: &Element,
    ) -> Result<Option<ElementReference>> {
        let Some(value) = element.attribute_local("element") else {
            return Ok(None);
        };
        if let Some(token) = ElementReference::from_token(value) {
            return Ok(Some(token));
        }
        Ok(self
            .resolve_qname(element, "element", value)?
            .map(ElementReference::Element))
    }

    /// Extension attributes of `element`
    ///
    /// Every namespace-qualified attribute outside the WSDL, `xmlns` and
    /// `xsi` namespaces is an extension attribute.
    pub(crate) fn extensions(&mut self, owner: OwnerKind, element: &Element) -> Result<Extensible> {
        let mut extensions = Extensible::new();
        for (qname, value) in element.attributes() {
            let Some(namespace) = qname.namespace.as_deref() else {
                continue;
            };
            if matches!(namespace, WSDL_NAMESPACE | XMLNS_NAMESPACE | XSI_NAMESPACE) {
                continue;
            }
            match self
                .session
                .registry
                .create_attribute(owner, qname, value, element)
            {
                Ok(attribute) => {
                    extensions.attributes.insert(qname.clone(), attribute);
                }
                Err(e) => self.error(
                    ErrorCode::ExtensionProblem,
                    element,
                    format!("invalid extension attribute {}: {}", qname, e),
                )?,
            }
        }
        Ok(extensions)
    }

    /// Hand a foreign child element to the registry
    pub(crate) fn extension_element(
        &mut self,
        owner: OwnerKind,
        child: &Element,
        extensions: &mut Extensible,
    ) -> Result<()> {
        match self.session.registry.deserialize(owner, child) {
            Ok(element) => {
                extensions.elements.push(element);
                Ok(())
            }
            Err(e) => self.error(
                ErrorCode::ExtensionProblem,
                child,
                format!("invalid extension element {}: {}", child.qname, e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_order() {
        let mut order = ChildOrder::default();
        assert!(order.accept(0));
        assert!(order.accept(2));
        assert!(order.accept(2));
        assert!(!order.accept(1));
        assert!(order.accept(3));
    }
}
