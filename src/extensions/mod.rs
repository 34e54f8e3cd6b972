//! Extension Registry
//!
//! WSDL 2.0 is extended by attributes and elements from foreign namespaces.
//! The registry dispatches on `(OwnerKind, QName)` to turn those into typed
//! values while a document is read, and on `(OwnerKind, namespace)` to attach
//! per-component extension contexts when the component model is built.
//!
//! [`ExtensionRegistry::default`] knows the extensions defined by WSDL 2.0
//! Part 2: the core `wsdlx` properties, the RPC style, and the SOAP and HTTP
//! bindings. Further extensions are added through [`ExtensionRegistryBuilder`].

pub mod attributes;
pub mod core;
pub mod elements;
pub mod http;
pub mod rpc;
pub mod soap;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;

pub use attributes::{ArgumentDirection, AttributeKind, ExtensionAttribute};
pub use elements::{ExtensionElement, Extensible, UnknownExtensionElement};

/// The kind of WSDL element (or component) that owns an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OwnerKind {
    /// `<description>`
    Description,
    /// `<types>`
    Types,
    /// `<interface>`
    Interface,
    /// `<interface>/<fault>`
    InterfaceFault,
    /// `<interface>/<operation>`
    InterfaceOperation,
    /// `<input>`/`<output>` of an interface operation
    InterfaceMessageReference,
    /// `<infault>`/`<outfault>` of an interface operation
    InterfaceFaultReference,
    /// `<binding>`
    Binding,
    /// `<binding>/<fault>`
    BindingFault,
    /// `<binding>/<operation>`
    BindingOperation,
    /// `<input>`/`<output>` of a binding operation
    BindingMessageReference,
    /// `<infault>`/`<outfault>` of a binding operation
    BindingFaultReference,
    /// `<service>`
    Service,
    /// `<endpoint>`
    Endpoint,
}

/// Turns an extension element into a typed value
pub trait ExtensionDeserializer: fmt::Debug + Send + Sync {
    /// Deserialize `element`, owned by an element of kind `owner`
    fn deserialize(&self, owner: OwnerKind, element: &Element) -> Result<Arc<dyn ExtensionElement>>;
}

/// Signature of a plain deserializer function
pub type DeserializeFn = fn(OwnerKind, &Element) -> Result<Arc<dyn ExtensionElement>>;

impl ExtensionDeserializer for DeserializeFn {
    fn deserialize(&self, owner: OwnerKind, element: &Element) -> Result<Arc<dyn ExtensionElement>> {
        self(owner, element)
    }
}

/// Extension properties attached to one component
pub trait ComponentExtensions: fmt::Debug + Send + Sync {
    /// Namespace the properties belong to
    fn namespace(&self) -> &str;

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;
}

/// What a component-extension factory gets to look at
#[derive(Debug, Clone, Copy)]
pub struct ExtensionSource<'a> {
    /// Kind of the component
    pub owner: OwnerKind,
    /// Extension attributes and elements of the component's element
    pub extensions: &'a Extensible,
    /// Resolved `{style}` of an interface operation, empty elsewhere
    pub styles: &'a [String],
}

/// Builds the extension context of one namespace for a component
pub trait ComponentExtensionFactory: fmt::Debug + Send + Sync {
    /// Create the context
    fn create(&self, source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions>;
}

/// Signature of a plain factory function
pub type ComponentExtensionFn = fn(&ExtensionSource<'_>) -> Arc<dyn ComponentExtensions>;

impl ComponentExtensionFactory for ComponentExtensionFn {
    fn create(&self, source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        self(source)
    }
}

/// Fallback context for a namespace with no registered factory
///
/// It exposes the raw attributes and elements of that namespace.
#[derive(Debug, Clone)]
pub struct AttributeExtensions {
    namespace: String,
    /// Attributes in the namespace, keyed by local name
    pub attributes: IndexMap<String, ExtensionAttribute>,
    /// Elements in the namespace
    pub elements: Vec<Arc<dyn ExtensionElement>>,
}

impl AttributeExtensions {
    /// Collect everything in `namespace` from `extensions`
    pub fn collect(namespace: &str, extensions: &Extensible) -> Self {
        let attributes = extensions
            .attributes
            .iter()
            .filter(|(qname, _)| qname.is_in(namespace))
            .map(|(qname, value)| (qname.local_name.clone(), value.clone()))
            .collect();
        let elements = extensions
            .elements
            .iter()
            .filter(|e| e.qname().is_in(namespace))
            .cloned()
            .collect();
        Self {
            namespace: namespace.to_string(),
            attributes,
            elements,
        }
    }

    /// Get an attribute by local name
    pub fn attribute(&self, local_name: &str) -> Option<&ExtensionAttribute> {
        self.attributes.get(local_name)
    }
}

impl ComponentExtensions for AttributeExtensions {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Extension contexts of one component, keyed by namespace
#[derive(Debug, Clone, Default)]
pub struct ComponentExtensionMap {
    contexts: IndexMap<String, Arc<dyn ComponentExtensions>>,
}

impl ComponentExtensionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a context; an existing context for the namespace is kept
    pub fn insert(&mut self, context: Arc<dyn ComponentExtensions>) {
        let namespace = context.namespace().to_string();
        self.contexts.entry(namespace).or_insert(context);
    }

    /// Context for a namespace
    pub fn get(&self, namespace: &str) -> Option<&Arc<dyn ComponentExtensions>> {
        self.contexts.get(namespace)
    }

    /// Context for a namespace, downcast to its concrete type
    pub fn get_as<T: 'static>(&self, namespace: &str) -> Option<&T> {
        self.contexts
            .get(namespace)
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Namespaces with a context, in attachment order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(|k| k.as_str())
    }

    /// Number of contexts
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Check if no context is attached
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// Registry of extension deserializers, attribute types and component factories
#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    deserializers: HashMap<(OwnerKind, QName), Arc<dyn ExtensionDeserializer>>,
    attribute_kinds: HashMap<(OwnerKind, QName), AttributeKind>,
    component_factories: HashMap<(OwnerKind, String), Arc<dyn ComponentExtensionFactory>>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExtensionRegistry {
    /// Registry with no registrations
    pub fn empty() -> Self {
        Self {
            deserializers: HashMap::new(),
            attribute_kinds: HashMap::new(),
            component_factories: HashMap::new(),
        }
    }

    /// Start an empty registry
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder {
            registry: Self::empty(),
            conflicts: Vec::new(),
        }
    }

    /// Registry with the WSDL 2.0 Part 2 extensions
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        core::register(&mut builder);
        rpc::register(&mut builder);
        soap::register(&mut builder);
        http::register(&mut builder);
        builder.registry
    }

    /// Deserializer registered for an element, if any
    pub fn deserializer(
        &self,
        owner: OwnerKind,
        qname: &QName,
    ) -> Option<&Arc<dyn ExtensionDeserializer>> {
        self.deserializers.get(&(owner, qname.clone()))
    }

    /// Deserialize an extension element, keeping it verbatim when unregistered
    pub fn deserialize(&self, owner: OwnerKind, element: &Element) -> Result<Arc<dyn ExtensionElement>> {
        match self.deserializer(owner, &element.qname) {
            Some(deserializer) => deserializer.deserialize(owner, element),
            None => {
                tracing::trace!("no deserializer for {} on {:?}", element.qname, owner);
                Ok(Arc::new(UnknownExtensionElement::new(element.clone())))
            }
        }
    }

    /// Registered lexical type of an extension attribute
    pub fn attribute_kind(&self, owner: OwnerKind, qname: &QName) -> Option<AttributeKind> {
        self.attribute_kinds.get(&(owner, qname.clone())).copied()
    }

    /// Parse an extension attribute; unregistered attributes are strings
    pub fn create_attribute(
        &self,
        owner: OwnerKind,
        qname: &QName,
        value: &str,
        element: &Element,
    ) -> Result<ExtensionAttribute> {
        self.attribute_kind(owner, qname)
            .unwrap_or(AttributeKind::String)
            .parse(value, element)
    }

    /// Namespaces with a component-extension factory for `owner`
    pub fn component_extension_namespaces(&self, owner: OwnerKind) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self
            .component_factories
            .keys()
            .filter(|(kind, _)| *kind == owner)
            .map(|(_, ns)| ns.as_str())
            .collect();
        namespaces.sort_unstable();
        namespaces
    }

    /// Component-extension factory for `owner` and `namespace`
    pub fn component_extension_factory(
        &self,
        owner: OwnerKind,
        namespace: &str,
    ) -> Option<&Arc<dyn ComponentExtensionFactory>> {
        self.component_factories.get(&(owner, namespace.to_string()))
    }
}

/// Builder that records conflicting registrations and rejects them in [`build`](Self::build)
#[derive(Debug)]
pub struct ExtensionRegistryBuilder {
    registry: ExtensionRegistry,
    conflicts: Vec<String>,
}

impl ExtensionRegistryBuilder {
    /// Add the standard WSDL 2.0 Part 2 registrations
    pub fn with_standard_extensions(mut self) -> Self {
        core::register(&mut self);
        rpc::register(&mut self);
        soap::register(&mut self);
        http::register(&mut self);
        self
    }

    /// Register an element deserializer
    pub fn register_deserializer(
        &mut self,
        owner: OwnerKind,
        qname: QName,
        deserializer: Arc<dyn ExtensionDeserializer>,
    ) -> &mut Self {
        let key = (owner, qname);
        if self.registry.deserializers.contains_key(&key) {
            self.conflicts
                .push(format!("deserializer for {} on {:?}", key.1, key.0));
        } else {
            self.registry.deserializers.insert(key, deserializer);
        }
        self
    }

    /// Register a plain deserializer function
    pub fn register_deserializer_fn(
        &mut self,
        owner: OwnerKind,
        qname: QName,
        deserializer: DeserializeFn,
    ) -> &mut Self {
        self.register_deserializer(owner, qname, Arc::new(deserializer))
    }

    /// Register the lexical type of an extension attribute
    pub fn register_attribute(
        &mut self,
        owner: OwnerKind,
        qname: QName,
        kind: AttributeKind,
    ) -> &mut Self {
        let key = (owner, qname);
        match self.registry.attribute_kinds.get(&key) {
            Some(existing) if *existing != kind => {
                self.conflicts
                    .push(format!("attribute type for {} on {:?}", key.1, key.0));
            }
            _ => {
                self.registry.attribute_kinds.insert(key, kind);
            }
        }
        self
    }

    /// Register a component-extension factory
    pub fn register_component_extension(
        &mut self,
        owner: OwnerKind,
        namespace: &str,
        factory: Arc<dyn ComponentExtensionFactory>,
    ) -> &mut Self {
        let key = (owner, namespace.to_string());
        if self.registry.component_factories.contains_key(&key) {
            self.conflicts
                .push(format!("component extension for {} on {:?}", key.1, key.0));
        } else {
            self.registry.component_factories.insert(key, factory);
        }
        self
    }

    /// Register a plain factory function
    pub fn register_component_extension_fn(
        &mut self,
        owner: OwnerKind,
        namespace: &str,
        factory: ComponentExtensionFn,
    ) -> &mut Self {
        self.register_component_extension(owner, namespace, Arc::new(factory))
    }

    /// Finish, failing on conflicting registrations
    pub fn build(self) -> Result<ExtensionRegistry> {
        if self.conflicts.is_empty() {
            Ok(self.registry)
        } else {
            Err(Error::Configuration(format!(
                "conflicting extension registrations: {}",
                self.conflicts.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::namespaces::{WHTTP_NAMESPACE, WSDLX_NAMESPACE, WSOAP_NAMESPACE};

    fn element(xml: &str) -> Element {
        Document::from_string(xml).unwrap().into_root().unwrap()
    }

    #[test]
    fn test_standard_registry_knows_part2() {
        let registry = ExtensionRegistry::standard();

        assert_eq!(
            registry.attribute_kind(
                OwnerKind::InterfaceOperation,
                &QName::namespaced(WSDLX_NAMESPACE, "safe")
            ),
            Some(AttributeKind::Boolean)
        );
        assert!(registry
            .component_extension_namespaces(OwnerKind::Binding)
            .contains(&WSOAP_NAMESPACE));
        assert!(registry
            .component_extension_factory(OwnerKind::Endpoint, WHTTP_NAMESPACE)
            .is_some());
    }

    #[test]
    fn test_unregistered_element_is_kept() {
        let registry = ExtensionRegistry::standard();
        let e = element(r#"<p:policy xmlns:p="urn:policy"><p:all/></p:policy>"#);

        let ext = registry.deserialize(OwnerKind::Binding, &e).unwrap();
        let unknown = ext
            .as_any()
            .downcast_ref::<UnknownExtensionElement>()
            .unwrap();
        assert_eq!(unknown.element.children.len(), 1);
    }

    #[test]
    fn test_unregistered_attribute_is_string() {
        let registry = ExtensionRegistry::default();
        let e = element("<e/>");
        let value = registry
            .create_attribute(OwnerKind::Interface, &QName::namespaced("urn:x", "y"), "z", &e)
            .unwrap();
        assert_eq!(value, ExtensionAttribute::String("z".to_string()));
    }

    #[test]
    fn test_conflicting_registration_is_configuration_error() {
        let mut builder = ExtensionRegistry::builder();
        let name = QName::namespaced("urn:x", "flag");
        builder.register_attribute(OwnerKind::Interface, name.clone(), AttributeKind::Boolean);
        builder.register_attribute(OwnerKind::Interface, name, AttributeKind::Uri);

        assert!(matches!(builder.build(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_standard_extensions_twice_conflict() {
        let builder = ExtensionRegistry::builder()
            .with_standard_extensions()
            .with_standard_extensions();
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_extension_map_downcast() {
        let mut ext = Extensible::new();
        ext.attributes.insert(
            QName::namespaced("urn:x", "level"),
            ExtensionAttribute::String("high".into()),
        );
        let mut map = ComponentExtensionMap::new();
        map.insert(Arc::new(AttributeExtensions::collect("urn:x", &ext)));

        let ctx = map.get_as::<AttributeExtensions>("urn:x").unwrap();
        assert_eq!(ctx.attribute("level").and_then(|v| v.as_str()), Some("high"));
        assert_eq!(map.namespaces().collect::<Vec<_>>(), vec!["urn:x"]);
    }
}
