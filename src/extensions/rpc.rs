//! RPC style extension (`wrpc`)

use std::any::Any;
use std::sync::Arc;

use super::{
    ArgumentDirection, AttributeKind, ComponentExtensions, ExtensionAttribute,
    ExtensionRegistryBuilder, ExtensionSource, OwnerKind,
};
use crate::namespaces::{QName, WRPC_NAMESPACE};

/// Style URI of the RPC style
pub const RPC_STYLE: &str = "http://www.w3.org/ns/wsdl/style/rpc";

/// RPC properties of an interface operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RpcOperationExtensions {
    /// `{rpc signature}`, absent when `wrpc:signature` is not given
    pub signature: Option<Vec<(QName, ArgumentDirection)>>,
}

impl RpcOperationExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        let signature = match source.extensions.attribute_ns(WRPC_NAMESPACE, "signature") {
            Some(ExtensionAttribute::Signature(pairs)) => Some(pairs.clone()),
            _ => None,
        };
        Arc::new(Self { signature })
    }

    /// Arguments with the given direction, in signature order
    pub fn arguments(&self, direction: ArgumentDirection) -> Vec<&QName> {
        self.signature
            .iter()
            .flatten()
            .filter(|(_, d)| *d == direction)
            .map(|(q, _)| q)
            .collect()
    }
}

impl ComponentExtensions for RpcOperationExtensions {
    fn namespace(&self) -> &str {
        WRPC_NAMESPACE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn register(builder: &mut ExtensionRegistryBuilder) {
    builder.register_attribute(
        OwnerKind::InterfaceOperation,
        QName::namespaced(WRPC_NAMESPACE, "signature"),
        AttributeKind::Signature,
    );
    builder.register_component_extension_fn(
        OwnerKind::InterfaceOperation,
        WRPC_NAMESPACE,
        RpcOperationExtensions::from_source,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{ExtensionRegistry, Extensible};

    #[test]
    fn test_signature_context() {
        let mut ext = Extensible::new();
        ext.attributes.insert(
            QName::namespaced(WRPC_NAMESPACE, "signature"),
            ExtensionAttribute::Signature(vec![
                (QName::namespaced("urn:t", "a"), ArgumentDirection::In),
                (QName::namespaced("urn:t", "r"), ArgumentDirection::Return),
            ]),
        );
        let styles = vec![RPC_STYLE.to_string()];
        let source = ExtensionSource {
            owner: OwnerKind::InterfaceOperation,
            extensions: &ext,
            styles: &styles,
        };
        let ctx = ExtensionRegistry::standard()
            .component_extension_factory(OwnerKind::InterfaceOperation, WRPC_NAMESPACE)
            .unwrap()
            .create(&source);
        let rpc = ctx.as_any().downcast_ref::<RpcOperationExtensions>().unwrap();

        assert_eq!(rpc.arguments(ArgumentDirection::In).len(), 1);
        assert_eq!(
            rpc.arguments(ArgumentDirection::Return),
            vec![&QName::namespaced("urn:t", "r")]
        );
    }
}
