//! Module resolver
//!
//! Follows `<import>`/`<include>` locations and the `xs:include`/`xs:import`
//! locations of schemas. Locations are resolved against the referencing
//! document, passed through the [`UriResolver`](crate::locations::UriResolver),
//! and looked up in the session caches before anything is fetched. A document
//! that cannot be fetched or parsed is reported as a warning and the reference
//! is left unresolved.

use std::sync::Arc;

use url::Url;

use super::description::parse_description;
use super::session::DocumentParser;
use crate::documents::{Document, Element};
use crate::elements::DescriptionId;
use crate::error::{ErrorCode, Result};
use crate::locations::{cache_key, resolve_location, resolve_or_keep};
use crate::namespaces::{QName, XSD_NAMESPACE};
use crate::schema::Schema;

impl DocumentParser<'_, '_> {
    /// Resolve the document behind an `<import>` or `<include>`
    pub(crate) fn resolve_module(
        &mut self,
        element: &Element,
        location: &str,
        kind: &str,
    ) -> Result<Option<DescriptionId>> {
        let url = match resolve_location(Some(&self.base), location) {
            Ok(url) => url,
            Err(e) => {
                self.error(
                    ErrorCode::InvalidUri,
                    element,
                    format!("cannot resolve {} location '{}': {}", kind, location, e),
                )?;
                return Ok(None);
            }
        };
        let url = resolve_or_keep(self.session.resolver, url);
        let key = cache_key(&url);

        if let Some(id) = self.session.cached_module(&key) {
            tracing::debug!("module cache hit for {} {}", kind, key);
            return Ok(Some(id));
        }

        if let Err(e) = self.session.limits.check_module_depth(self.session.depth + 1) {
            self.warning(
                ErrorCode::UnresolvedDocument,
                element,
                format!("{} of {} not followed: {}", kind, url, e),
            )?;
            return Ok(None);
        }

        tracing::debug!("module cache miss, loading {} {}", kind, url);
        let Some(root) = self.fetch(element, &url, kind)? else {
            return Ok(None);
        };

        self.session.depth += 1;
        let result = parse_description(self.session, &root, url.clone());
        self.session.depth -= 1;

        match result {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.session.forget_module(&key);
                self.warning(
                    ErrorCode::UnresolvedDocument,
                    element,
                    format!("{} of {} could not be read: {}", kind, url, e),
                )?;
                Ok(None)
            }
        }
    }

    /// Fetch and parse a document, reporting failures as warnings
    fn fetch(&mut self, element: &Element, url: &Url, kind: &str) -> Result<Option<Element>> {
        let content = match self.session.loader.load(url) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("failed to fetch {}: {}", url, e);
                self.warning(
                    ErrorCode::UnresolvedDocument,
                    element,
                    format!("cannot fetch {} {}: {}", kind, url, e),
                )?;
                return Ok(None);
            }
        };
        let document = match Document::parse_with_limits(content.as_bytes(), self.session.limits) {
            Ok(document) => document,
            Err(e) => {
                self.warning(
                    ErrorCode::UnresolvedDocument,
                    element,
                    format!("cannot parse {} {}: {}", kind, url, e),
                )?;
                return Ok(None);
            }
        };
        match document.into_root() {
            Some(root) => Ok(Some(root)),
            None => {
                self.warning(
                    ErrorCode::UnresolvedDocument,
                    element,
                    format!("{} {} has no root element", kind, url),
                )?;
                Ok(None)
            }
        }
    }

    /// Load the schema behind a `schemaLocation`
    ///
    /// `chameleon_namespace` is passed for `xs:include` so a schema without a
    /// target namespace adopts the includer's. Schemas are cached per URL and
    /// adopted namespace; a schema reached again while it is still being
    /// resolved is left unresolved at that point.
    pub(crate) fn load_schema(
        &mut self,
        element: &Element,
        location: &str,
        base: &Url,
        chameleon_namespace: Option<String>,
    ) -> Result<Option<Arc<Schema>>> {
        let url = match resolve_location(Some(base), location) {
            Ok(url) => url,
            Err(e) => {
                self.error(
                    ErrorCode::InvalidUri,
                    element,
                    format!("cannot resolve schema location '{}': {}", location, e),
                )?;
                return Ok(None);
            }
        };
        let url = resolve_or_keep(self.session.resolver, url);
        let key = (cache_key(&url), chameleon_namespace.clone());

        if let Some(schema) = self.session.schemas.get(&key) {
            tracing::trace!("schema cache hit for {}", url);
            return Ok(Some(Arc::clone(schema)));
        }
        if self.session.schemas_in_progress.contains(&key) {
            tracing::debug!("schema {} is already being resolved", url);
            return Ok(None);
        }

        let Some(root) = self.fetch(element, &url, "schema")? else {
            return Ok(None);
        };
        if root.qname != QName::namespaced(XSD_NAMESPACE, "schema") {
            self.warning(
                ErrorCode::SchemaProblem,
                element,
                format!("{} is not an XML Schema document", url),
            )?;
            return Ok(None);
        }

        let mut schema = Schema::parse(&root, Some(url.clone()), chameleon_namespace.as_deref());
        self.session.schemas_in_progress.insert(key.clone());
        let resolved = self.resolve_schema_references(&mut schema, &url, element);
        self.session.schemas_in_progress.remove(&key);
        resolved?;

        let schema = Arc::new(schema);
        self.session.schemas.insert(key, Arc::clone(&schema));
        Ok(Some(schema))
    }

    /// Resolve the `xs:include` and `xs:import` locations of a schema
    pub(crate) fn resolve_schema_references(
        &mut self,
        schema: &mut Schema,
        base: &Url,
        element: &Element,
    ) -> Result<()> {
        let includer_namespace = schema.target_namespace.clone();
        for include in schema.includes.iter_mut() {
            if let Some(location) = include.location.clone() {
                include.schema =
                    self.load_schema(element, &location, base, includer_namespace.clone())?;
            }
        }
        for import in schema.imports.iter_mut() {
            if let Some(location) = import.location.clone() {
                import.schema = self.load_schema(element, &location, base, None)?;
            }
        }
        Ok(())
    }
}
