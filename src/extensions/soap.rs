//! SOAP binding extension (`wsoap`)
//!
//! Covers the binding, fault, operation and message properties of the WSDL 2.0
//! SOAP binding together with the `wsoap:module` and `wsoap:header` elements.

use std::any::Any;
use std::sync::Arc;

use super::elements::required_flag;
use super::{
    AttributeKind, ComponentExtensions, ExtensionAttribute, ExtensionElement,
    ExtensionRegistryBuilder, ExtensionSource, OwnerKind,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::extensions::attributes::parse_boolean;
use crate::namespaces::{QName, WSOAP_NAMESPACE};

/// SOAP version assumed when `wsoap:version` is absent
pub const DEFAULT_SOAP_VERSION: &str = "1.2";

/// `wsoap:module`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapModule {
    qname: QName,
    /// `ref` URI of the module
    pub reference: String,
    /// `required`
    pub required: Option<bool>,
}

impl ExtensionElement for SoapModule {
    fn qname(&self) -> &QName {
        &self.qname
    }

    fn required(&self) -> Option<bool> {
        self.required
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `wsoap:header`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapHeaderBlock {
    qname: QName,
    /// Global element declaration of the header
    pub element: QName,
    /// `mustUnderstand`, default `false`
    pub must_understand: bool,
    /// `required`
    pub required: Option<bool>,
}

impl ExtensionElement for SoapHeaderBlock {
    fn qname(&self) -> &QName {
        &self.qname
    }

    fn required(&self) -> Option<bool> {
        self.required
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn deserialize_module(_owner: OwnerKind, element: &Element) -> Result<Arc<dyn ExtensionElement>> {
    let reference = element
        .attribute_local("ref")
        .ok_or_else(|| Error::Other("wsoap:module requires a 'ref' attribute".to_string()))?;
    Ok(Arc::new(SoapModule {
        qname: element.qname.clone(),
        reference: reference.trim().to_string(),
        required: local_required(element)?,
    }))
}

fn deserialize_header(_owner: OwnerKind, element: &Element) -> Result<Arc<dyn ExtensionElement>> {
    let name = element
        .attribute_local("element")
        .ok_or_else(|| Error::Other("wsoap:header requires an 'element' attribute".to_string()))?;
    let must_understand = element
        .attribute_local("mustUnderstand")
        .map(parse_boolean)
        .transpose()?
        .unwrap_or(false);
    Ok(Arc::new(SoapHeaderBlock {
        qname: element.qname.clone(),
        element: element.resolve_qname(name)?,
        must_understand,
        required: local_required(element)?,
    }))
}

/// `required` on SOAP elements is unqualified; `wsdl:required` is also accepted
fn local_required(element: &Element) -> Result<Option<bool>> {
    match element.attribute_local("required") {
        Some(value) => parse_boolean(value).map(Some),
        None => Ok(required_flag(element)),
    }
}

fn modules(source: &ExtensionSource<'_>) -> Vec<SoapModule> {
    source.extensions.elements_of::<SoapModule>().cloned().collect()
}

fn headers(source: &ExtensionSource<'_>) -> Vec<SoapHeaderBlock> {
    source
        .extensions
        .elements_of::<SoapHeaderBlock>()
        .cloned()
        .collect()
}

fn string_attribute(source: &ExtensionSource<'_>, local_name: &str) -> Option<String> {
    source
        .extensions
        .attribute_ns(WSOAP_NAMESPACE, local_name)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

/// Value of `wsoap:code` and `wsoap:subcodes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapFaultCode {
    /// `#any`
    Any,
    /// A single code
    Code(QName),
    /// A list of subcodes
    Codes(Vec<QName>),
}

impl SoapFaultCode {
    fn from_attribute(value: &ExtensionAttribute) -> Option<Self> {
        match value {
            ExtensionAttribute::Token(t) if t == "#any" => Some(Self::Any),
            ExtensionAttribute::QName(q) => Some(Self::Code(q.clone())),
            ExtensionAttribute::QNameList(list) => Some(Self::Codes(list.clone())),
            _ => None,
        }
    }
}

/// SOAP properties of a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBindingExtensions {
    /// `{soap version}`
    pub version: String,
    /// `{soap underlying protocol}`
    pub underlying_protocol: Option<String>,
    /// `{soap mep default}`
    pub mep_default: Option<String>,
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
}

impl SoapBindingExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        Arc::new(Self {
            version: string_attribute(source, "version")
                .unwrap_or_else(|| DEFAULT_SOAP_VERSION.to_string()),
            underlying_protocol: string_attribute(source, "protocol"),
            mep_default: string_attribute(source, "mepDefault"),
            modules: modules(source),
        })
    }
}

/// SOAP properties of a binding fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBindingFaultExtensions {
    /// `{soap fault code}`, `#any` when absent
    pub code: SoapFaultCode,
    /// `{soap fault subcodes}`, `#any` when absent
    pub subcodes: SoapFaultCode,
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
    /// `{soap headers}`
    pub headers: Vec<SoapHeaderBlock>,
}

impl SoapBindingFaultExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        let code_of = |name: &str| {
            source
                .extensions
                .attribute_ns(WSOAP_NAMESPACE, name)
                .and_then(SoapFaultCode::from_attribute)
                .unwrap_or(SoapFaultCode::Any)
        };
        Arc::new(Self {
            code: code_of("code"),
            subcodes: code_of("subcodes"),
            modules: modules(source),
            headers: headers(source),
        })
    }
}

/// SOAP properties of a binding operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBindingOperationExtensions {
    /// `{soap mep}`
    pub mep: Option<String>,
    /// `{soap action}`
    pub action: Option<String>,
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
}

impl SoapBindingOperationExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        Arc::new(Self {
            mep: string_attribute(source, "mep"),
            action: string_attribute(source, "action"),
            modules: modules(source),
        })
    }
}

/// SOAP properties of a binding message or fault reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapReferenceExtensions {
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
    /// `{soap headers}`, always empty on fault references
    pub headers: Vec<SoapHeaderBlock>,
}

impl SoapReferenceExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        let headers = match source.owner {
            OwnerKind::BindingMessageReference => headers(source),
            _ => Vec::new(),
        };
        Arc::new(Self {
            modules: modules(source),
            headers,
        })
    }
}

macro_rules! impl_soap_context {
    ($($ty:ty),*) => {
        $(
            impl ComponentExtensions for $ty {
                fn namespace(&self) -> &str {
                    WSOAP_NAMESPACE
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

impl_soap_context!(
    SoapBindingExtensions,
    SoapBindingFaultExtensions,
    SoapBindingOperationExtensions,
    SoapReferenceExtensions
);

pub(crate) fn register(builder: &mut ExtensionRegistryBuilder) {
    let attr = |local: &str| QName::namespaced(WSOAP_NAMESPACE, local);

    builder
        .register_attribute(OwnerKind::Binding, attr("version"), AttributeKind::String)
        .register_attribute(OwnerKind::Binding, attr("protocol"), AttributeKind::Uri)
        .register_attribute(OwnerKind::Binding, attr("mepDefault"), AttributeKind::Uri)
        .register_attribute(
            OwnerKind::BindingFault,
            attr("code"),
            AttributeKind::QNameOrToken(&["#any"]),
        )
        .register_attribute(
            OwnerKind::BindingFault,
            attr("subcodes"),
            AttributeKind::QNameListOrToken(&["#any"]),
        )
        .register_attribute(OwnerKind::BindingOperation, attr("mep"), AttributeKind::Uri)
        .register_attribute(OwnerKind::BindingOperation, attr("action"), AttributeKind::Uri);

    for owner in [
        OwnerKind::Binding,
        OwnerKind::BindingFault,
        OwnerKind::BindingOperation,
        OwnerKind::BindingMessageReference,
        OwnerKind::BindingFaultReference,
    ] {
        builder.register_deserializer_fn(owner, attr("module"), deserialize_module);
    }
    for owner in [OwnerKind::BindingFault, OwnerKind::BindingMessageReference] {
        builder.register_deserializer_fn(owner, attr("header"), deserialize_header);
    }

    builder
        .register_component_extension_fn(
            OwnerKind::Binding,
            WSOAP_NAMESPACE,
            SoapBindingExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingFault,
            WSOAP_NAMESPACE,
            SoapBindingFaultExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingOperation,
            WSOAP_NAMESPACE,
            SoapBindingOperationExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingMessageReference,
            WSOAP_NAMESPACE,
            SoapReferenceExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingFaultReference,
            WSOAP_NAMESPACE,
            SoapReferenceExtensions::from_source,
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::extensions::{ExtensionRegistry, Extensible};

    fn element(xml: &str) -> Element {
        Document::from_string(xml).unwrap().into_root().unwrap()
    }

    #[test]
    fn test_deserialize_module() {
        let registry = ExtensionRegistry::standard();
        let e = element(
            r#"<wsoap:module xmlns:wsoap="http://www.w3.org/ns/wsdl/soap" ref="urn:rm" required="true"/>"#,
        );
        let ext = registry.deserialize(OwnerKind::Binding, &e).unwrap();
        let module = ext.as_any().downcast_ref::<SoapModule>().unwrap();
        assert_eq!(module.reference, "urn:rm");
        assert_eq!(module.required, Some(true));
    }

    #[test]
    fn test_header_requires_element() {
        let registry = ExtensionRegistry::standard();
        let e = element(r#"<wsoap:header xmlns:wsoap="http://www.w3.org/ns/wsdl/soap"/>"#);
        assert!(registry
            .deserialize(OwnerKind::BindingMessageReference, &e)
            .is_err());
    }

    #[test]
    fn test_binding_version_default() {
        let ext = Extensible::new();
        let source = ExtensionSource {
            owner: OwnerKind::Binding,
            extensions: &ext,
            styles: &[],
        };
        let ctx = SoapBindingExtensions::from_source(&source);
        let soap = ctx.as_any().downcast_ref::<SoapBindingExtensions>().unwrap();
        assert_eq!(soap.version, DEFAULT_SOAP_VERSION);
        assert!(soap.modules.is_empty());
    }

    #[test]
    fn test_fault_code_defaults_to_any() {
        let mut ext = Extensible::new();
        ext.attributes.insert(
            QName::namespaced(WSOAP_NAMESPACE, "code"),
            ExtensionAttribute::QName(QName::namespaced("urn:env", "Sender")),
        );
        let source = ExtensionSource {
            owner: OwnerKind::BindingFault,
            extensions: &ext,
            styles: &[],
        };
        let ctx = SoapBindingFaultExtensions::from_source(&source);
        let fault = ctx
            .as_any()
            .downcast_ref::<SoapBindingFaultExtensions>()
            .unwrap();
        assert_eq!(
            fault.code,
            SoapFaultCode::Code(QName::namespaced("urn:env", "Sender"))
        );
        assert_eq!(fault.subcodes, SoapFaultCode::Any);
    }
}
