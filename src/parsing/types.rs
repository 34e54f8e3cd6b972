//! `<types>`

use std::sync::Arc;

use super::session::DocumentParser;
use crate::documents::Element;
use crate::elements::{DescriptionId, Descriptions, SchemaSource, Types, TypesSchema};
use crate::error::{Diagnostic, ErrorCode, Locator, Result};
use crate::extensions::OwnerKind;
use crate::namespaces::{QName, WSDL_NAMESPACE, XSD_NAMESPACE};
use crate::reporter::{emit, ErrorReporter};
use crate::schema::Schema;

impl DocumentParser<'_, '_> {
    pub(crate) fn parse_types(&mut self, element: &Element) -> Result<Types> {
        let mut types = Types::new();
        types.line = element.line;
        types.extensions = self.extensions(OwnerKind::Types, element)?;

        let xs_schema = QName::namespaced(XSD_NAMESPACE, "schema");
        let xs_import = QName::namespaced(XSD_NAMESPACE, "import");
        let base = self.base.clone();

        for child in element.children() {
            if child.qname == QName::wsdl("documentation") {
                types.documentation.push(self.documentation(child));
            } else if child.qname.is_in(WSDL_NAMESPACE) {
                self.unexpected(child, "types")?;
            } else if child.qname == xs_schema {
                let mut schema = Schema::parse(child, None, None);
                self.resolve_schema_references(&mut schema, &base, child)?;
                types.add_schema(TypesSchema::inlined(Arc::new(schema)));
            } else if child.qname == xs_import {
                let namespace = child.attribute_local("namespace").map(str::to_string);
                let location = child.attribute_local("schemaLocation").map(str::to_string);
                let schema = match &location {
                    Some(location) => self.load_schema(child, location, &base, None)?,
                    None => None,
                };
                if let (Some(expected), Some(schema)) = (&namespace, &schema) {
                    if schema.target_namespace.as_ref() != Some(expected) {
                        self.warning(
                            ErrorCode::SchemaProblem,
                            child,
                            format!(
                                "imported schema has target namespace {:?}, expected {}",
                                schema.target_namespace, expected
                            ),
                        )?;
                    }
                }
                types.add_schema(TypesSchema {
                    source: SchemaSource::Imported,
                    namespace,
                    location,
                    schema,
                });
            } else {
                self.extension_element(OwnerKind::Types, child, &mut types.extensions)?;
            }
        }

        Ok(types)
    }
}

/// Resolve `xs:import`s under `<types>` that carry no `schemaLocation`
///
/// The schema is looked up by namespace among every schema in scope of the
/// importing description: its own `<types>` and those of the documents it
/// includes or imports, following schema-level includes and imports.
pub(crate) fn resolve_locationless_imports(
    descriptions: &mut Descriptions,
    reporter: &mut dyn ErrorReporter,
) -> Result<()> {
    let mut updates: Vec<(DescriptionId, usize, Option<Arc<Schema>>)> = Vec::new();

    for description in descriptions.iter() {
        let Some(types) = &description.types else {
            continue;
        };
        for (index, entry) in types.schemas.iter().enumerate() {
            if entry.source != SchemaSource::Imported
                || entry.schema.is_some()
                || entry.location.is_some()
            {
                continue;
            }
            let Some(namespace) = entry.namespace.as_deref() else {
                continue;
            };
            let found = schema_for_namespace(descriptions, description.id, namespace);
            if found.is_none() {
                emit(
                    reporter,
                    Diagnostic::warning(
                        ErrorCode::SchemaProblem,
                        format!("no schema in scope for imported namespace {}", namespace),
                    )
                    .with_locator(
                        Locator::document(description.document_base_uri.as_str())
                            .with_line(types.line)
                            .with_element("types"),
                    ),
                )?;
            }
            updates.push((description.id, index, found));
        }
    }

    for (id, index, schema) in updates {
        if let Some(entry) = descriptions
            .get_mut(id)
            .and_then(|d| d.types.as_mut())
            .and_then(|t| t.schemas.get_mut(index))
        {
            entry.schema = schema;
        }
    }
    Ok(())
}

/// First schema in scope of `from` whose target namespace is `namespace`
pub(crate) fn schema_for_namespace(
    descriptions: &Descriptions,
    from: DescriptionId,
    namespace: &str,
) -> Option<Arc<Schema>> {
    descriptions
        .in_scope(from)
        .into_iter()
        .filter_map(|id| descriptions.get(id))
        .filter_map(|d| d.types.as_ref())
        .flat_map(|t| t.resolved_schemas().flat_map(|s| s.reachable()).collect::<Vec<_>>())
        .find(|s| s.target_namespace.as_deref() == Some(namespace))
}
