//! Core WSDL extensions (`wsdlx`)

use std::any::Any;
use std::sync::Arc;

use super::{
    AttributeKind, ComponentExtensions, ExtensionRegistryBuilder, ExtensionSource, OwnerKind,
};
use crate::namespaces::{QName, WSDLX_NAMESPACE};

/// Core extension properties of an interface operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreOperationExtensions {
    /// `{safety}`, from `wsdlx:safe`
    pub safety: bool,
}

impl CoreOperationExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        let safety = source
            .extensions
            .attribute_ns(WSDLX_NAMESPACE, "safe")
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        Arc::new(Self { safety })
    }
}

impl ComponentExtensions for CoreOperationExtensions {
    fn namespace(&self) -> &str {
        WSDLX_NAMESPACE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn register(builder: &mut ExtensionRegistryBuilder) {
    builder.register_attribute(
        OwnerKind::InterfaceOperation,
        QName::namespaced(WSDLX_NAMESPACE, "safe"),
        AttributeKind::Boolean,
    );
    builder.register_component_extension_fn(
        OwnerKind::InterfaceOperation,
        WSDLX_NAMESPACE,
        CoreOperationExtensions::from_source,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{ExtensionAttribute, ExtensionRegistry, Extensible};

    fn create(extensions: &Extensible) -> Arc<dyn ComponentExtensions> {
        let registry = ExtensionRegistry::standard();
        let source = ExtensionSource {
            owner: OwnerKind::InterfaceOperation,
            extensions,
            styles: &[],
        };
        registry
            .component_extension_factory(OwnerKind::InterfaceOperation, WSDLX_NAMESPACE)
            .unwrap()
            .create(&source)
    }

    #[test]
    fn test_safety_defaults_to_false() {
        let ctx = create(&Extensible::new());
        let core = ctx.as_any().downcast_ref::<CoreOperationExtensions>().unwrap();
        assert!(!core.safety);
    }

    #[test]
    fn test_safety_from_attribute() {
        let mut ext = Extensible::new();
        ext.attributes.insert(
            QName::namespaced(WSDLX_NAMESPACE, "safe"),
            ExtensionAttribute::Boolean(true),
        );
        let ctx = create(&ext);
        let core = ctx.as_any().downcast_ref::<CoreOperationExtensions>().unwrap();
        assert!(core.safety);
    }
}
