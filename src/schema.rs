//! XML Schema collaborator
//!
//! A [`Schema`] is the view of one `<xs:schema>` the component model needs:
//! its target namespace, the top-level element declarations and type
//! definitions (each kept as an opaque content handle), and the `xs:include`
//! and `xs:import` references to further schemas. Validation of schema
//! content is not attempted here.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use url::Url;

use crate::documents::Element;
use crate::namespaces::{QName, XSD_NAMESPACE};

/// Local names of the XSD 1.0 built-in datatypes, `anyType` included
pub const BUILTIN_TYPES: &[&str] = &[
    "anyType",
    "anySimpleType",
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "boolean",
    "decimal",
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "nonPositiveInteger",
    "negativeInteger",
    "float",
    "double",
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
];

static BUILTIN_SCHEMA: Lazy<Arc<Schema>> = Lazy::new(|| {
    let types = BUILTIN_TYPES
        .iter()
        .map(|name| (QName::namespaced(XSD_NAMESPACE, *name), TypeContent::Builtin))
        .collect();
    Arc::new(Schema {
        target_namespace: Some(XSD_NAMESPACE.to_string()),
        location: None,
        element: None,
        elements: IndexMap::new(),
        types,
        includes: Vec::new(),
        imports: Vec::new(),
        builtin: true,
    })
});

/// Content of a type definition
#[derive(Debug, Clone)]
pub enum TypeContent {
    /// An XSD built-in datatype
    Builtin,
    /// `xs:simpleType`
    Simple(Arc<Element>),
    /// `xs:complexType`
    Complex(Arc<Element>),
}

impl TypeContent {
    /// Check if this is a built-in datatype
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Declaring element, for user-defined types
    pub fn element(&self) -> Option<&Arc<Element>> {
        match self {
            Self::Builtin => None,
            Self::Simple(e) | Self::Complex(e) => Some(e),
        }
    }
}

/// An `xs:include` or `xs:import` of a schema
#[derive(Debug, Clone)]
pub struct SchemaReference {
    /// `namespace` of an import
    pub namespace: Option<String>,
    /// `schemaLocation`
    pub location: Option<String>,
    /// The referenced schema, once resolved
    pub schema: Option<Arc<Schema>>,
}

/// One parsed `<xs:schema>`
#[derive(Debug, Clone)]
pub struct Schema {
    /// `targetNamespace`, or the includer's namespace for a chameleon include
    pub target_namespace: Option<String>,
    /// URL the schema was read from, `None` when inlined
    pub location: Option<Url>,
    /// The `xs:schema` element, absent for the built-in schema
    pub element: Option<Arc<Element>>,
    /// Top-level element declarations
    pub elements: IndexMap<QName, Arc<Element>>,
    /// Top-level type definitions
    pub types: IndexMap<QName, TypeContent>,
    /// `xs:include` references
    pub includes: Vec<SchemaReference>,
    /// `xs:import` references
    pub imports: Vec<SchemaReference>,
    builtin: bool,
}

impl Schema {
    /// The implicit schema holding the XSD built-in datatypes
    pub fn builtin() -> Arc<Schema> {
        Arc::clone(&BUILTIN_SCHEMA)
    }

    /// Parse an `xs:schema` element
    ///
    /// `chameleon_namespace` is the namespace of the including schema; it is
    /// adopted when the schema declares no target namespace of its own.
    pub fn parse(element: &Element, location: Option<Url>, chameleon_namespace: Option<&str>) -> Self {
        let target_namespace = element
            .attribute_local("targetNamespace")
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty())
            .or_else(|| chameleon_namespace.map(str::to_string));

        let mut schema = Self {
            target_namespace,
            location,
            element: Some(Arc::new(element.clone())),
            elements: IndexMap::new(),
            types: IndexMap::new(),
            includes: Vec::new(),
            imports: Vec::new(),
            builtin: false,
        };

        for child in element.children().filter(|c| c.qname.is_in(XSD_NAMESPACE)) {
            let name = child.attribute_local("name").map(|n| n.trim().to_string());
            match (child.local_name(), name) {
                ("element", Some(name)) => {
                    let qname = QName::new(schema.target_namespace.as_deref(), name);
                    schema.elements.entry(qname).or_insert_with(|| Arc::new(child.clone()));
                }
                ("complexType", Some(name)) => {
                    let qname = QName::new(schema.target_namespace.as_deref(), name);
                    schema
                        .types
                        .entry(qname)
                        .or_insert_with(|| TypeContent::Complex(Arc::new(child.clone())));
                }
                ("simpleType", Some(name)) => {
                    let qname = QName::new(schema.target_namespace.as_deref(), name);
                    schema
                        .types
                        .entry(qname)
                        .or_insert_with(|| TypeContent::Simple(Arc::new(child.clone())));
                }
                ("include", _) | ("redefine", _) => schema.includes.push(SchemaReference {
                    namespace: None,
                    location: child.attribute_local("schemaLocation").map(str::to_string),
                    schema: None,
                }),
                ("import", _) => schema.imports.push(SchemaReference {
                    namespace: child.attribute_local("namespace").map(str::to_string),
                    location: child.attribute_local("schemaLocation").map(str::to_string),
                    schema: None,
                }),
                _ => {}
            }
        }

        schema
    }

    /// Check if this is the implicit built-in schema
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Look up a top-level element declaration
    pub fn element_declaration(&self, qname: &QName) -> Option<&Arc<Element>> {
        self.elements.get(qname)
    }

    /// Look up a top-level type definition
    pub fn type_definition(&self, qname: &QName) -> Option<&TypeContent> {
        self.types.get(qname)
    }

    /// This schema and every schema reachable through resolved includes and
    /// imports, each once, in depth-first document order
    pub fn reachable(self: &Arc<Self>) -> Vec<Arc<Schema>> {
        let mut seen: Vec<*const Schema> = Vec::new();
        let mut out = Vec::new();
        collect_reachable(self, &mut seen, &mut out);
        out
    }
}

fn collect_reachable(schema: &Arc<Schema>, seen: &mut Vec<*const Schema>, out: &mut Vec<Arc<Schema>>) {
    let ptr = Arc::as_ptr(schema);
    if seen.contains(&ptr) {
        return;
    }
    seen.push(ptr);
    out.push(Arc::clone(schema));
    for reference in schema.includes.iter().chain(schema.imports.iter()) {
        if let Some(nested) = &reference.schema {
            collect_reachable(nested, seen, out);
        }
    }
}
