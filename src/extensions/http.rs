//! HTTP binding extension (`whttp`)

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
use crate::namespaces::{QName, WHTTP_NAMESPACE};

/// Query parameter separator assumed when none is declared
pub const DEFAULT_QUERY_PARAMETER_SEPARATOR: &str = "&";

/// `whttp:header`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    qname: QName,
    /// Header field name
    pub name: String,
    /// Simple type of the header value
    pub type_definition: QName,
    /// `required`
    pub required: Option<bool>,
}

impl ExtensionElement for HttpHeader {
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

fn deserialize_header(_owner: OwnerKind, element: &Element) -> Result<Arc<dyn ExtensionElement>> {
    let name = element
        .attribute_local("name")
        .ok_or_else(|| Error::Other("whttp:header requires a 'name' attribute".to_string()))?;
    let type_name = element
        .attribute_local("type")
        .ok_or_else(|| Error::Other("whttp:header requires a 'type' attribute".to_string()))?;
    let required = match element.attribute_local("required") {
        Some(value) => Some(parse_boolean(value)?),
        None => required_flag(element),
    };
    Ok(Arc::new(HttpHeader {
        qname: element.qname.clone(),
        name: name.trim().to_string(),
        type_definition: element.resolve_qname(type_name)?,
        required,
    }))
}

fn string_attribute(source: &ExtensionSource<'_>, local_name: &str) -> Option<String> {
    source
        .extensions
        .attribute_ns(WHTTP_NAMESPACE, local_name)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn bool_attribute(source: &ExtensionSource<'_>, local_name: &str) -> Option<bool> {
    source
        .extensions
        .attribute_ns(WHTTP_NAMESPACE, local_name)
        .and_then(|value| value.as_bool())
}

fn headers(source: &ExtensionSource<'_>) -> Vec<HttpHeader> {
    source.extensions.elements_of::<HttpHeader>().cloned().collect()
}

/// Default serialization format for an HTTP method
pub fn default_serialization(method: &str) -> &'static str {
    match method.to_ascii_uppercase().as_str() {
        "GET" | "DELETE" => "application/x-www-form-urlencoded",
        _ => "application/xml",
    }
}

/// HTTP properties of a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBindingExtensions {
    /// `{http method default}`
    pub method_default: Option<String>,
    /// `{http query parameter separator default}`
    pub query_parameter_separator_default: String,
    /// `{http cookies}`
    pub cookies: bool,
    /// `{http content encoding default}`
    pub content_encoding_default: Option<String>,
}

impl HttpBindingExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        Arc::new(Self {
            method_default: string_attribute(source, "methodDefault"),
            query_parameter_separator_default: string_attribute(
                source,
                "queryParameterSeparatorDefault",
            )
            .unwrap_or_else(|| DEFAULT_QUERY_PARAMETER_SEPARATOR.to_string()),
            cookies: bool_attribute(source, "cookies").unwrap_or(false),
            content_encoding_default: string_attribute(source, "contentEncodingDefault"),
        })
    }
}

/// HTTP properties of a binding operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBindingOperationExtensions {
    /// `{http location}`
    pub location: Option<String>,
    /// `{http method}`
    pub method: Option<String>,
    /// `{http input serialization}`
    pub input_serialization: Option<String>,
    /// `{http output serialization}`
    pub output_serialization: Option<String>,
    /// `{http fault serialization}`
    pub fault_serialization: Option<String>,
    /// `{http location ignore uncited}`
    pub ignore_uncited: bool,
    /// `{http query parameter separator}`
    pub query_parameter_separator: Option<String>,
    /// `{http content encoding default}`
    pub content_encoding_default: Option<String>,
}

impl HttpBindingOperationExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        Arc::new(Self {
            location: string_attribute(source, "location"),
            method: string_attribute(source, "method"),
            input_serialization: string_attribute(source, "inputSerialization"),
            output_serialization: string_attribute(source, "outputSerialization"),
            fault_serialization: string_attribute(source, "faultSerialization"),
            ignore_uncited: bool_attribute(source, "ignoreUncited").unwrap_or(false),
            query_parameter_separator: string_attribute(source, "queryParameterSeparator"),
            content_encoding_default: string_attribute(source, "contentEncodingDefault"),
        })
    }

    /// Method of the operation: its own, the binding default, then GET for safe
    /// operations and POST otherwise
    pub fn effective_method(&self, binding: Option<&HttpBindingExtensions>, safe: bool) -> String {
        self.method
            .clone()
            .or_else(|| binding.and_then(|b| b.method_default.clone()))
            .unwrap_or_else(|| if safe { "GET" } else { "POST" }.to_string())
    }

    /// Serialization of the input message for `method`
    pub fn effective_input_serialization(&self, method: &str) -> String {
        self.input_serialization
            .clone()
            .unwrap_or_else(|| default_serialization(method).to_string())
    }
}

/// Value of `whttp:code`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorStatusCode {
    /// `#any`
    Any,
    /// A status code
    Code(i64),
}

/// HTTP properties of a binding fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBindingFaultExtensions {
    /// `{http error status code}`, `#any` when absent
    pub code: HttpErrorStatusCode,
    /// `{http content encoding}`
    pub content_encoding: Option<String>,
    /// `{http headers}`
    pub headers: Vec<HttpHeader>,
}

impl HttpBindingFaultExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        let code = match source.extensions.attribute_ns(WHTTP_NAMESPACE, "code") {
            Some(ExtensionAttribute::Int(code)) => HttpErrorStatusCode::Code(*code),
            _ => HttpErrorStatusCode::Any,
        };
        Arc::new(Self {
            code,
            content_encoding: string_attribute(source, "contentEncoding"),
            headers: headers(source),
        })
    }
}

/// HTTP properties of a binding message or fault reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReferenceExtensions {
    /// `{http content encoding}`
    pub content_encoding: Option<String>,
    /// `{http headers}`
    pub headers: Vec<HttpHeader>,
}

impl HttpReferenceExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        Arc::new(Self {
            content_encoding: string_attribute(source, "contentEncoding"),
            headers: headers(source),
        })
    }
}

/// HTTP properties of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpointExtensions {
    /// `{http authentication scheme}`
    pub authentication_scheme: Option<String>,
    /// `{http authentication realm}`
    pub authentication_realm: Option<String>,
}

impl HttpEndpointExtensions {
    fn from_source(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
        Arc::new(Self {
            authentication_scheme: string_attribute(source, "authenticationScheme"),
            authentication_realm: string_attribute(source, "authenticationRealm"),
        })
    }
}

macro_rules! impl_http_context {
    ($($ty:ty),*) => {
        $(
            impl ComponentExtensions for $ty {
                fn namespace(&self) -> &str {
                    WHTTP_NAMESPACE
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

impl_http_context!(
    HttpBindingExtensions,
    HttpBindingOperationExtensions,
    HttpBindingFaultExtensions,
    HttpReferenceExtensions,
    HttpEndpointExtensions
);

pub(crate) fn register(builder: &mut ExtensionRegistryBuilder) {
    let attr = |local: &str| QName::namespaced(WHTTP_NAMESPACE, local);
    let string = AttributeKind::String;

    builder
        .register_attribute(OwnerKind::Binding, attr("methodDefault"), string)
        .register_attribute(OwnerKind::Binding, attr("queryParameterSeparatorDefault"), string)
        .register_attribute(OwnerKind::Binding, attr("cookies"), AttributeKind::Boolean)
        .register_attribute(OwnerKind::Binding, attr("contentEncodingDefault"), string)
        .register_attribute(OwnerKind::BindingOperation, attr("location"), string)
        .register_attribute(OwnerKind::BindingOperation, attr("method"), string)
        .register_attribute(OwnerKind::BindingOperation, attr("inputSerialization"), string)
        .register_attribute(OwnerKind::BindingOperation, attr("outputSerialization"), string)
        .register_attribute(OwnerKind::BindingOperation, attr("faultSerialization"), string)
        .register_attribute(
            OwnerKind::BindingOperation,
            attr("ignoreUncited"),
            AttributeKind::Boolean,
        )
        .register_attribute(OwnerKind::BindingOperation, attr("queryParameterSeparator"), string)
        .register_attribute(OwnerKind::BindingOperation, attr("contentEncodingDefault"), string)
        .register_attribute(
            OwnerKind::BindingFault,
            attr("code"),
            AttributeKind::IntOrToken(&["#any"]),
        )
        .register_attribute(OwnerKind::BindingFault, attr("contentEncoding"), string)
        .register_attribute(OwnerKind::BindingMessageReference, attr("contentEncoding"), string)
        .register_attribute(OwnerKind::BindingFaultReference, attr("contentEncoding"), string)
        .register_attribute(OwnerKind::Endpoint, attr("authenticationScheme"), string)
        .register_attribute(OwnerKind::Endpoint, attr("authenticationRealm"), string);

    for owner in [OwnerKind::BindingFault, OwnerKind::BindingMessageReference] {
        builder.register_deserializer_fn(owner, attr("header"), deserialize_header);
    }

    builder
        .register_component_extension_fn(
            OwnerKind::Binding,
            WHTTP_NAMESPACE,
            HttpBindingExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingOperation,
            WHTTP_NAMESPACE,
            HttpBindingOperationExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingFault,
            WHTTP_NAMESPACE,
            HttpBindingFaultExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingMessageReference,
            WHTTP_NAMESPACE,
            HttpReferenceExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::BindingFaultReference,
            WHTTP_NAMESPACE,
            HttpReferenceExtensions::from_source,
        )
        .register_component_extension_fn(
            OwnerKind::Endpoint,
            WHTTP_NAMESPACE,
            HttpEndpointExtensions::from_source,
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::extensions::{ExtensionRegistry, Extensible};

    #[test]
    fn test_effective_method() {
        let op = HttpBindingOperationExtensions {
            location: None,
            method: None,
            input_serialization: None,
            output_serialization: None,
            fault_serialization: None,
            ignore_uncited: false,
            query_parameter_separator: None,
            content_encoding_default: None,
        };
        assert_eq!(op.effective_method(None, true), "GET");
        assert_eq!(op.effective_method(None, false), "POST");
        assert_eq!(
            op.effective_input_serialization("GET"),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_fault_code_int() {
        let mut ext = Extensible::new();
        ext.attributes.insert(
            QName::namespaced(WHTTP_NAMESPACE, "code"),
            ExtensionAttribute::Int(404),
        );
        let source = ExtensionSource {
            owner: OwnerKind::BindingFault,
            extensions: &ext,
            styles: &[],
        };
        let ctx = HttpBindingFaultExtensions::from_source(&source);
        let fault = ctx
            .as_any()
            .downcast_ref::<HttpBindingFaultExtensions>()
            .unwrap();
        assert_eq!(fault.code, HttpErrorStatusCode::Code(404));
    }

    #[test]
    fn test_separator_default() {
        let ext = Extensible::new();
        let source = ExtensionSource {
            owner: OwnerKind::Binding,
            extensions: &ext,
            styles: &[],
        };
        let ctx = HttpBindingExtensions::from_source(&source);
        let binding = ctx.as_any().downcast_ref::<HttpBindingExtensions>().unwrap();
        assert_eq!(binding.query_parameter_separator_default, "&");
        assert!(!binding.cookies);
    }

    #[test]
    fn test_deserialize_header() {
        let e = Document::from_string(
            r#"<whttp:header xmlns:whttp="http://www.w3.org/ns/wsdl/http" xmlns:xs="http://www.w3.org/2001/XMLSchema" name="X-Trace" type="xs:string"/>"#,
        )
        .unwrap()
        .into_root()
        .unwrap();
        let ext = ExtensionRegistry::standard()
            .deserialize(OwnerKind::BindingMessageReference, &e)
            .unwrap();
        let header = ext.as_any().downcast_ref::<HttpHeader>().unwrap();
        assert_eq!(header.name, "X-Trace");
        assert_eq!(header.type_definition.local_name, "string");
    }
}
