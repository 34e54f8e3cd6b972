//! Component model integration tests

use std::sync::Arc;

use pretty_assertions::assert_eq;
use url::Url;
use wsdl20::components::Interface;
use wsdl20::documents::Document;
use wsdl20::elements::{ElementReference, MessageLabel};
use wsdl20::extensions::core::CoreOperationExtensions;
use wsdl20::extensions::http::{HttpBindingExtensions, HttpBindingOperationExtensions};
use wsdl20::extensions::soap::{
    SoapBindingExtensions, SoapBindingFaultExtensions, SoapBindingOperationExtensions,
    SoapFaultCode,
};
use wsdl20::extensions::{
    AttributeExtensions, ComponentExtensions, ExtensionSource, OwnerKind,
};
use wsdl20::namespaces::{WHTTP_NAMESPACE, WSDLX_NAMESPACE, WSOAP_NAMESPACE};
use wsdl20::schema::Schema;
use wsdl20::{ComponentRef, ExtensionRegistry, QName, Wsdl, WsdlReader};

const CALCULATOR: &str = "http://example.com/calculator";
const MESSAGES: &str = "http://example.com/calculator/messages";

fn calculator() -> Wsdl {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/calculator.wsdl");
    WsdlReader::new().read_file(path).expect("fixture reads")
}

fn calculator_interface(wsdl: &Wsdl) -> &Interface {
    wsdl.to_component()
        .interface(&QName::namespaced(CALCULATOR, "Calculator"))
        .expect("Calculator interface")
}

#[test]
fn test_fixture_reads_cleanly() {
    let wsdl = calculator();
    assert!(wsdl.diagnostics().is_empty(), "{:?}", wsdl.diagnostics());

    let model = wsdl.to_component();
    assert_eq!(model.interfaces().len(), 1);
    assert_eq!(model.bindings().len(), 1);
    assert_eq!(model.services().len(), 1);
    assert_eq!(
        wsdl.description().documentation[0].text(),
        Some("Adds two numbers.")
    );
}

#[test]
fn test_references_resolve_across_components() {
    let wsdl = calculator();
    let model = wsdl.to_component();

    let service = &model.services()[0];
    let endpoint = &model[service.endpoints[0]];
    assert_eq!(endpoint.name.as_str(), "soap");
    assert_eq!(
        endpoint.address.as_deref(),
        Some("http://example.com/calculator/soap")
    );

    let binding = model.endpoint_binding(endpoint).expect("endpoint binding");
    assert_eq!(binding.name, QName::namespaced(CALCULATOR, "CalculatorSoap"));

    let interface = model.binding_interface(binding).expect("bound interface");
    assert_eq!(interface.name, QName::namespaced(CALCULATOR, "Calculator"));
    assert_eq!(
        model.service_interface(service).map(|i| &i.name),
        Some(&interface.name)
    );

    let binding_operation = &model[binding.binding_operations[0]];
    let operation = model
        .interface_operation_for(binding_operation)
        .expect("bound operation");
    assert_eq!(operation.name.local_name, "add");

    let binding_fault = &model[binding.binding_faults[0]];
    let fault = model.interface_fault_for(binding_fault).expect("bound fault");
    assert_eq!(fault.name, QName::namespaced(CALCULATOR, "OverflowFault"));

    let binding_fault_reference = &model[binding_operation.binding_fault_references[0]];
    let fault_reference = model
        .interface_fault_reference_for(binding_fault_reference)
        .expect("bound fault reference");
    assert_eq!(fault_reference.message_label, Some(MessageLabel::OUT));
}

#[test]
fn test_schema_components_are_harvested() {
    let wsdl = calculator();
    let model = wsdl.to_component();

    let mut elements: Vec<String> = model
        .element_declarations()
        .map(|e| e.name.local_name.clone())
        .collect();
    elements.sort();
    assert_eq!(elements, vec!["Add", "AddResponse", "Overflow"]);

    assert!(model
        .type_definition(&QName::namespaced(MESSAGES, "Result"))
        .is_some());
    let int = model
        .type_definition(&QName::namespaced("http://www.w3.org/2001/XMLSchema", "int"))
        .expect("built-in type");
    assert!(int.content.is_builtin());

    let interface = calculator_interface(&wsdl);
    let operation = model.all_operations(interface)[0];
    let input = &model[operation.interface_message_references[0]];
    assert_eq!(input.message_content_model(), "#element");
    let reference = input.element.as_ref().expect("element reference");
    assert_eq!(
        model.element_declaration_for(reference).map(|e| &e.name),
        Some(&QName::namespaced(MESSAGES, "Add"))
    );
    assert_eq!(
        model.element_declaration_for(&ElementReference::Any).map(|e| &e.name),
        None
    );
}

#[test]
fn test_fragment_identifiers() {
    let wsdl = calculator();
    let model = wsdl.to_component();
    let binding = &model.bindings()[0];
    let binding_operation = binding.binding_operations[0];
    let message = model[binding_operation].binding_message_references[1];
    let interface = calculator_interface(&wsdl);

    let fragment = |component: ComponentRef| model.fragment_identifier(&component).to_string();

    assert_eq!(fragment(ComponentRef::Description), "wsdl.description()");
    assert_eq!(
        fragment(ComponentRef::Interface(interface.id)),
        "wsdl.interface(Calculator)"
    );
    assert_eq!(
        fragment(ComponentRef::InterfaceOperation(interface.interface_operations[0])),
        "wsdl.interfaceOperation(Calculator/add)"
    );
    assert_eq!(
        fragment(ComponentRef::BindingOperation(binding_operation)),
        "xmlns(ns1=http://example.com/calculator)wsdl.bindingOperation(CalculatorSoap/ns1:add)"
    );
    assert_eq!(
        fragment(ComponentRef::BindingMessageReference(message)),
        "xmlns(ns1=http://example.com/calculator)wsdl.bindingMessageReference(CalculatorSoap/ns1:add/Out)"
    );
    assert_eq!(
        fragment(ComponentRef::Endpoint(model.services()[0].endpoints[0])),
        "wsdl.endpoint(CalculatorService/soap)"
    );
    assert_eq!(
        fragment(ComponentRef::ElementDeclaration(QName::namespaced(MESSAGES, "Add"))),
        "xmlns(ns1=http://example.com/calculator/messages)wsdl.elementDeclaration(ns1:Add)"
    );
}

#[test]
fn test_component_refs_list_parents_first() {
    let wsdl = calculator();
    let model = wsdl.to_component();
    let refs = model.component_refs();

    assert_eq!(refs[0], ComponentRef::Description);
    let position = |component: &ComponentRef| refs.iter().position(|r| r == component);
    let binding = &model.bindings()[0];
    let operation = binding.binding_operations[0];
    assert!(position(&ComponentRef::Binding(binding.id)) < position(&ComponentRef::BindingOperation(operation)));
    for id in &model[operation].binding_message_references {
        assert!(position(&ComponentRef::BindingMessageReference(*id)).is_some());
    }
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn test_soap_binding_extensions() {
    let wsdl = calculator();
    let model = wsdl.to_component();
    let binding = &model.bindings()[0];

    let soap = binding
        .extensions
        .get_as::<SoapBindingExtensions>(WSOAP_NAMESPACE)
        .expect("soap binding context");
    assert_eq!(soap.version, "1.2");
    assert_eq!(
        soap.underlying_protocol.as_deref(),
        Some("http://www.w3.org/2003/05/soap/bindings/HTTP/")
    );

    let fault = model[binding.binding_faults[0]]
        .extensions
        .get_as::<SoapBindingFaultExtensions>(WSOAP_NAMESPACE)
        .expect("soap fault context");
    assert_eq!(
        fault.code,
        SoapFaultCode::Code(QName::namespaced(WSOAP_NAMESPACE, "Sender"))
    );
    assert_eq!(fault.subcodes, SoapFaultCode::Any);

    let operation = model[binding.binding_operations[0]]
        .extensions
        .get_as::<SoapBindingOperationExtensions>(WSOAP_NAMESPACE)
        .expect("soap operation context");
    assert_eq!(
        operation.mep.as_deref(),
        Some("http://www.w3.org/2003/05/soap/mep/soap-response/")
    );
}

#[test]
fn test_safety_extension() {
    let wsdl = calculator();
    let model = wsdl.to_component();
    let operation = model.all_operations(calculator_interface(&wsdl))[0];

    let core = operation
        .extensions
        .get_as::<CoreOperationExtensions>(WSDLX_NAMESPACE)
        .expect("core context present on every operation");
    assert!(core.safety);
}

#[test]
fn test_http_binding_extensions() {
    let xml = r##"<description xmlns="http://www.w3.org/ns/wsdl"
                     xmlns:tns="urn:http"
                     xmlns:whttp="http://www.w3.org/ns/wsdl/http"
                     targetNamespace="urn:http">
        <interface name="I">
          <operation name="get" pattern="http://www.w3.org/ns/wsdl/in-out">
            <input element="#none"/><output element="#any"/>
          </operation>
        </interface>
        <binding name="B" interface="tns:I" type="http://www.w3.org/ns/wsdl/http"
                 whttp:methodDefault="PUT">
          <operation ref="tns:get" whttp:location="items/{id}"/>
        </binding>
      </description>""##;
    let wsdl = WsdlReader::new()
        .read_str(xml, &Url::parse("http://example.com/http.wsdl").unwrap())
        .unwrap();
    assert!(!wsdl.has_errors(), "{:?}", wsdl.diagnostics());

    let model = wsdl.to_component();
    let binding = &model.bindings()[0];
    let http = binding
        .extensions
        .get_as::<HttpBindingExtensions>(WHTTP_NAMESPACE)
        .expect("http binding context");
    assert_eq!(http.method_default.as_deref(), Some("PUT"));
    assert_eq!(http.query_parameter_separator_default, "&");

    let operation = model[binding.binding_operations[0]]
        .extensions
        .get_as::<HttpBindingOperationExtensions>(WHTTP_NAMESPACE)
        .expect("http operation context");
    assert_eq!(operation.location.as_deref(), Some("items/{id}"));
    assert_eq!(operation.effective_method(Some(http), false), "PUT");
}

#[test]
fn test_unregistered_namespace_falls_back_to_attributes() {
    let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl"
                     xmlns:ex="urn:ext"
                     targetNamespace="urn:ext-test">
        <interface name="I" ex:flag="on"/>
      </description>"#;
    let wsdl = WsdlReader::new()
        .read_str(xml, &Url::parse("http://example.com/ext.wsdl").unwrap())
        .unwrap();

    let model = wsdl.to_component();
    let context = model.interfaces()[0]
        .extensions
        .get_as::<AttributeExtensions>("urn:ext")
        .expect("fallback context");
    assert_eq!(context.attribute("flag").and_then(|a| a.as_str()), Some("on"));
}

#[derive(Debug)]
struct Tagged {
    tag: String,
}

impl ComponentExtensions for Tagged {
    fn namespace(&self) -> &str {
        "urn:tagged"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn tagged(source: &ExtensionSource<'_>) -> Arc<dyn ComponentExtensions> {
    let tag = source
        .extensions
        .attribute_ns("urn:tagged", "tag")
        .and_then(|a| a.as_str())
        .unwrap_or("untagged")
        .to_string();
    Arc::new(Tagged { tag })
}

#[test]
fn test_custom_component_extension() {
    let mut builder = ExtensionRegistry::builder().with_standard_extensions();
    builder.register_component_extension_fn(OwnerKind::Service, "urn:tagged", tagged);
    let registry = builder.build().unwrap();

    let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl"
                     xmlns:t="urn:tagged"
                     targetNamespace="urn:custom">
        <service name="S" t:tag="blue"/>
      </description>"#;
    let wsdl = WsdlReader::new()
        .with_registry(registry)
        .with_validation(false)
        .read_str(xml, &Url::parse("http://example.com/custom.wsdl").unwrap())
        .unwrap();

    let model = wsdl.to_component();
    let tagged = model.services()[0]
        .extensions
        .get_as::<Tagged>("urn:tagged")
        .expect("custom context");
    assert_eq!(tagged.tag, "blue");
}

#[test]
fn test_conflicting_registration_is_rejected() {
    let mut builder = ExtensionRegistry::builder().with_standard_extensions();
    builder.register_component_extension_fn(OwnerKind::Binding, WSOAP_NAMESPACE, tagged);
    assert!(builder.build().is_err());
}

// ============================================================================
// Schema changes
// ============================================================================

#[test]
fn test_add_schema_invalidates_component_model() {
    let mut wsdl = calculator();
    let extra = QName::namespaced("urn:extra", "Note");
    assert!(wsdl.to_component().element_declaration(&extra).is_none());

    let document = Document::from_string(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:extra">
             <xs:element name="Note" type="xs:string"/>
           </xs:schema>"#,
    )
    .unwrap();
    let schema = Schema::parse(document.root().unwrap(), None, None);
    wsdl.add_schema(Arc::new(schema));

    assert!(wsdl.to_component().element_declaration(&extra).is_some());
    assert!(wsdl.schema_for_namespace("urn:extra").is_some());
    assert!(wsdl.schema_for_namespace(MESSAGES).is_some());
}

#[test]
fn test_rebuild_produces_equal_model() {
    let mut wsdl = calculator();
    let before: Vec<ComponentRef> = wsdl.to_component().component_refs();
    let after = wsdl.rebuild().component_refs();
    assert_eq!(before, after);
}
