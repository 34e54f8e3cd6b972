//! The result of reading a description

use std::sync::Arc;

use once_cell::unsync::OnceCell;

use crate::components::{self, ComponentModel};
use crate::elements::{Description, DescriptionId, Descriptions, TypesSchema};
use crate::error::{Diagnostic, Severity};
use crate::extensions::ExtensionRegistry;
use crate::parsing::types::schema_for_namespace;
use crate::schema::Schema;

/// A read WSDL 2.0 description
///
/// Holds every document read (the root and everything it imports or includes),
/// the diagnostics reported while reading, and the component model, which is
/// built on first use and kept until the schemas change.
#[derive(Debug)]
pub struct Wsdl {
    descriptions: Descriptions,
    root: DescriptionId,
    registry: Arc<ExtensionRegistry>,
    diagnostics: Vec<Diagnostic>,
    component: OnceCell<ComponentModel>,
}

impl Wsdl {
    pub(crate) fn new(
        descriptions: Descriptions,
        root: DescriptionId,
        registry: Arc<ExtensionRegistry>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            descriptions,
            root,
            registry,
            diagnostics,
            component: OnceCell::new(),
        }
    }

    /// The root document
    pub fn description(&self) -> &Description {
        &self.descriptions[self.root]
    }

    /// Every document read, the root included
    pub fn descriptions(&self) -> &Descriptions {
        &self.descriptions
    }

    /// Id of the root document
    pub fn root_id(&self) -> DescriptionId {
        self.root
    }

    /// Diagnostics reported while reading
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Check if an error or fatal diagnostic was reported
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= Severity::Error)
    }

    /// The component model, built on first access
    pub fn to_component(&self) -> &ComponentModel {
        self.component.get_or_init(|| {
            components::build(&self.descriptions, self.root, &self.registry)
        })
    }

    /// Discard the cached component model and build it again
    pub fn rebuild(&mut self) -> &ComponentModel {
        self.component.take();
        self.to_component()
    }

    /// Add a schema to the root's `<types>`
    ///
    /// The cached component model is discarded; the next
    /// [`to_component`](Self::to_component) sees the new declarations.
    pub fn add_schema(&mut self, schema: Arc<Schema>) {
        tracing::debug!(
            "adding schema {:?} to {}",
            schema.target_namespace,
            self.description().document_base_uri
        );
        if let Some(description) = self.descriptions.get_mut(self.root) {
            description.types_mut().add_schema(TypesSchema::inlined(schema));
        }
        self.component.take();
    }

    /// First schema in scope of the root with the given target namespace
    pub fn schema_for_namespace(&self, namespace: &str) -> Option<Arc<Schema>> {
        schema_for_namespace(&self.descriptions, self.root, namespace)
    }
}
