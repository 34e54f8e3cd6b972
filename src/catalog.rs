//! XML Catalog support for import/include location resolution
//!
//! This module implements OASIS XML Catalog support so that `<import>` and
//! `<include>` locations (and schema locations inside `<types>`) that use URNs
//! or well-known public URLs can be redirected to local copies.
//!
//! XML Catalogs are defined by OASIS:
//! https://www.oasis-open.org/committees/entity/spec-2001-08-06.html
//!
//! # Supported Elements
//!
//! - `<catalog>` - Root element
//! - `<group>` - Grouping element (may carry `xml:base`)
//! - `<system>` - Maps system identifiers to URIs
//! - `<uri>` - Maps URI names to URIs
//! - `<rewriteSystem>` / `<rewriteURI>` - Prefix rewrites
//! - `<nextCatalog>` - Includes another catalog file
//!
//! # Example
//!
//! ```xml
//! <catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
//!   <uri name="http://example.org/ns/reservation.wsdl" uri="local/reservation.wsdl"/>
//!   <nextCatalog catalog="vendor/catalog.xml"/>
//! </catalog>
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use url::Url;

use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::locations::{path_to_url, UriResolver};
use crate::namespaces::{QName, XML_NAMESPACE};

/// The XML Catalog namespace
const CATALOG_NS: &str = "urn:oasis:names:tc:entity:xmlns:xml:catalog";

/// XML Catalog for resolving import locations
#[derive(Debug, Clone, Default)]
pub struct XmlCatalog {
    /// System ID to URI mappings (systemId -> uri)
    system_mappings: HashMap<String, String>,
    /// URI name to URI mappings (name -> uri)
    uri_mappings: HashMap<String, String>,
    /// Prefix rewrites (startString -> rewritePrefix)
    rewrites: Vec<(String, String)>,
}

impl XmlCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a file
    ///
    /// This will recursively load any catalogs referenced via `<nextCatalog>`.
    /// A catalog that cannot be read is a configuration error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let base = path_to_url(path)?;

        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read catalog '{}': {}", path.display(), e))
        })?;

        let mut catalog = Self::new();
        catalog.parse_catalog(&content, &base)?;

        Ok(catalog)
    }

    /// Parse a catalog from a string, resolving relative entries against `base`
    pub fn from_str_with_base(xml: &str, base: &Url) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.parse_catalog(xml, base)?;
        Ok(catalog)
    }

    /// Parse catalog XML content
    fn parse_catalog(&mut self, xml: &str, base: &Url) -> Result<()> {
        let doc = Document::from_string(xml)?;
        let root = doc
            .root()
            .ok_or_else(|| Error::Parse(ParseError::new("Empty catalog document")))?;

        if root.qname != QName::namespaced(CATALOG_NS, "catalog") {
            return Err(Error::Configuration(format!(
                "Expected catalog root element, got {}",
                root.qname
            )));
        }

        self.process_catalog_children(root, base)
    }

    /// Process children of a catalog or group element
    fn process_catalog_children(&mut self, parent: &Element, base: &Url) -> Result<()> {
        for child in parent.children() {
            if !child.qname.is_in(CATALOG_NS) {
                continue;
            }
            let base = match child.attribute(&QName::namespaced(XML_NAMESPACE, "base")) {
                Some(xml_base) => base.join(xml_base)?,
                None => base.clone(),
            };
            match child.local_name() {
                "system" => {
                    if let (Some(system_id), Some(uri)) = (
                        child.attribute_local("systemId"),
                        child.attribute_local("uri"),
                    ) {
                        let resolved = base.join(uri)?;
                        self.system_mappings
                            .insert(system_id.to_string(), resolved.to_string());
                    }
                }
                "uri" => {
                    if let (Some(name), Some(uri)) =
                        (child.attribute_local("name"), child.attribute_local("uri"))
                    {
                        let resolved = base.join(uri)?;
                        self.uri_mappings.insert(name.to_string(), resolved.to_string());
                    }
                }
                "rewriteSystem" | "rewriteURI" => {
                    let start = child
                        .attribute_local("systemIdStartString")
                        .or_else(|| child.attribute_local("uriStartString"));
                    if let (Some(start), Some(prefix)) =
                        (start, child.attribute_local("rewritePrefix"))
                    {
                        let resolved = base.join(prefix)?;
                        self.rewrites.push((start.to_string(), resolved.to_string()));
                    }
                }
                "nextCatalog" => {
                    if let Some(catalog) = child.attribute_local("catalog") {
                        let next = base.join(catalog)?;
                        if let Ok(path) = next.to_file_path() {
                            // Silently ignore unreadable nested catalogs
                            if let Ok(content) = fs::read_to_string(&path) {
                                if let Err(e) = self.parse_catalog(&content, &next) {
                                    tracing::debug!("skipping nested catalog {}: {}", next, e);
                                }
                            }
                        }
                    }
                }
                "group" => {
                    self.process_catalog_children(child, &base)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Look up a location in the catalog
    ///
    /// Tries to resolve the location in this order:
    /// 1. System ID mappings
    /// 2. URI name mappings
    /// 3. Longest matching rewrite prefix
    pub fn lookup(&self, location: &str) -> Option<String> {
        if let Some(uri) = self.system_mappings.get(location) {
            return Some(uri.clone());
        }

        if let Some(uri) = self.uri_mappings.get(location) {
            return Some(uri.clone());
        }

        self.rewrites
            .iter()
            .filter(|(start, _)| location.starts_with(start.as_str()))
            .max_by_key(|(start, _)| start.len())
            .map(|(start, prefix)| format!("{}{}", prefix, &location[start.len()..]))
    }

    /// Check if this catalog is empty (has no mappings)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of mappings
    pub fn len(&self) -> usize {
        self.system_mappings.len() + self.uri_mappings.len() + self.rewrites.len()
    }

    /// Merge another catalog into this one
    pub fn merge(&mut self, other: &XmlCatalog) {
        for (k, v) in &other.system_mappings {
            self.system_mappings.entry(k.clone()).or_insert_with(|| v.clone());
        }
        for (k, v) in &other.uri_mappings {
            self.uri_mappings.entry(k.clone()).or_insert_with(|| v.clone());
        }
        self.rewrites.extend(other.rewrites.iter().cloned());
    }
}

impl UriResolver for XmlCatalog {
    fn resolve(&self, uri: &Url) -> Result<Url> {
        match self.lookup(uri.as_str()) {
            Some(mapped) => Ok(Url::parse(&mapped)?),
            None => Ok(uri.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_catalog() {
        let catalog_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
    <system systemId="urn:example:reservation.wsdl" uri="wsdl/reservation.wsdl"/>
    <uri name="http://example.org/types.xsd" uri="xsd/types.xsd"/>
</catalog>"#;

        let temp_dir = TempDir::new().unwrap();
        let catalog_path = temp_dir.path().join("catalog.xml");
        std::fs::write(&catalog_path, catalog_xml).unwrap();

        let catalog = XmlCatalog::from_file(&catalog_path).unwrap();

        assert_eq!(catalog.len(), 2);

        let resolved = catalog.lookup("urn:example:reservation.wsdl").unwrap();
        assert!(resolved.ends_with("wsdl/reservation.wsdl"));

        let resolved = catalog.lookup("http://example.org/types.xsd").unwrap();
        assert!(resolved.ends_with("xsd/types.xsd"));

        assert!(catalog.lookup("urn:example:not-found").is_none());
    }

    #[test]
    fn test_nested_catalogs() {
        let temp_dir = TempDir::new().unwrap();

        let main_catalog = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
    <system systemId="urn:main:a.wsdl" uri="main.wsdl"/>
    <nextCatalog catalog="sub/catalog.xml"/>
</catalog>"#;

        let sub_dir = temp_dir.path().join("sub");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let sub_catalog = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
    <system systemId="urn:sub:b.wsdl" uri="sub.wsdl"/>
</catalog>"#;

        std::fs::write(temp_dir.path().join("catalog.xml"), main_catalog).unwrap();
        std::fs::write(sub_dir.join("catalog.xml"), sub_catalog).unwrap();

        let catalog = XmlCatalog::from_file(temp_dir.path().join("catalog.xml")).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup("urn:main:a.wsdl").is_some());
        assert!(catalog.lookup("urn:sub:b.wsdl").unwrap().ends_with("sub/sub.wsdl"));
    }

    #[test]
    fn test_group_and_rewrite() {
        let catalog_xml = r#"<catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
    <group xml:base="http://mirror.example.com/">
        <uri name="urn:grouped" uri="grouped.wsdl"/>
    </group>
    <rewriteURI uriStartString="http://www.w3.org/" rewritePrefix="file:///opt/w3c/"/>
</catalog>"#;

        let base = Url::parse("file:///etc/catalog.xml").unwrap();
        let catalog = XmlCatalog::from_str_with_base(catalog_xml, &base).unwrap();

        assert_eq!(
            catalog.lookup("urn:grouped").as_deref(),
            Some("http://mirror.example.com/grouped.wsdl")
        );

        let uri = Url::parse("http://www.w3.org/2002/ws/desc/ns/soap.xsd").unwrap();
        let resolved = UriResolver::resolve(&catalog, &uri).unwrap();
        assert_eq!(resolved.as_str(), "file:///opt/w3c/2002/ws/desc/ns/soap.xsd");
    }

    #[test]
    fn test_wrong_root_is_configuration_error() {
        let base = Url::parse("file:///etc/catalog.xml").unwrap();
        let result = XmlCatalog::from_str_with_base("<notacatalog/>", &base);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
