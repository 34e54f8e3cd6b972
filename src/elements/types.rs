//! `<types>`

use std::sync::Arc;

use super::common::Documentation;
use crate::extensions::Extensible;
use crate::schema::Schema;

/// How a schema entered `<types>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// `<xs:schema>` written inline
    Inlined,
    /// `<xs:import>` directly under `<types>`
    Imported,
    /// The implicit import of the XSD namespace that supplies built-in types
    Builtin,
}

/// A schema listed by `<types>`
#[derive(Debug, Clone)]
pub struct TypesSchema {
    /// Inline, imported or built-in
    pub source: SchemaSource,
    /// Namespace of the schema (the `namespace` of an import, or the target namespace)
    pub namespace: Option<String>,
    /// `schemaLocation` of an import
    pub location: Option<String>,
    /// The schema, once parsed or resolved
    pub schema: Option<Arc<Schema>>,
}

impl TypesSchema {
    /// Entry for an inline schema
    pub fn inlined(schema: Arc<Schema>) -> Self {
        Self {
            source: SchemaSource::Inlined,
            namespace: schema.target_namespace.clone(),
            location: None,
            schema: Some(schema),
        }
    }

    /// Entry for the built-in XSD schema
    pub fn builtin() -> Self {
        let schema = Schema::builtin();
        Self {
            source: SchemaSource::Builtin,
            namespace: schema.target_namespace.clone(),
            location: None,
            schema: Some(schema),
        }
    }
}

/// `<types>`
#[derive(Debug, Clone)]
pub struct Types {
    /// `<documentation>` children
    pub documentation: Vec<Documentation>,
    /// Schemas in document order, the implicit built-in import first
    pub schemas: Vec<TypesSchema>,
    /// Extension attributes and elements (other type systems)
    pub extensions: Extensible,
    /// Source line
    pub line: Option<usize>,
}

impl Types {
    /// Empty `<types>` holding only the implicit built-in import
    pub fn new() -> Self {
        Self {
            documentation: Vec::new(),
            schemas: vec![TypesSchema::builtin()],
            extensions: Extensible::new(),
            line: None,
        }
    }

    /// Add a schema to the end of the list
    pub fn add_schema(&mut self, entry: TypesSchema) {
        self.schemas.push(entry);
    }

    /// Resolved schemas, built-in first
    pub fn resolved_schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.iter().filter_map(|s| s.schema.as_ref())
    }
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}
