//! Resource location resolution
//!
//! This module turns the `location` of an `<import>`/`<include>` (or an
//! `xs:import`/`xs:include` inside `<types>`) into an absolute URL, and lets
//! callers remap URLs through a [`UriResolver`].

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

/// Resource location - can be a URL, file path, or string identifier
#[derive(Debug, Clone)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL (http, https, file, urn, ...)
    Url(Url),
    /// In-memory resource content
    String(String),
}

impl Location {
    /// Create a location from a string (auto-detect type)
    pub fn parse(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            // A single letter scheme is a Windows drive, not a URL
            if url.scheme().len() > 1 {
                return Location::Url(url);
            }
        }

        let path = PathBuf::from(s);
        if path.exists() || s.starts_with('/') || s.starts_with('.') {
            return Location::Path(path);
        }

        Location::String(s.to_string())
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Url(u) => u.to_string(),
            Location::String(s) => s.clone(),
        }
    }

    /// Convert to an absolute URL when possible
    pub fn to_url(&self) -> Result<Url> {
        match self {
            Location::Url(u) => Ok(u.clone()),
            Location::Path(p) => path_to_url(p),
            Location::String(_) => Err(Error::Resource(
                "in-memory content has no URL".to_string(),
            )),
        }
    }

    /// Check if this is a remote location (URL other than file:)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(u) if u.scheme() != "file")
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        match self {
            Location::Path(_) => true,
            Location::Url(u) => u.scheme() == "file",
            Location::String(_) => false,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Convert a filesystem path to a `file:` URL, making it absolute first
pub fn path_to_url(path: &Path) -> Result<Url> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Url::from_file_path(&absolute)
        .map_err(|_| Error::Resource(format!("cannot express '{}' as a URL", path.display())))
}

/// Resolve a location attribute against the base URI of the referencing document
///
/// Absolute locations are returned as-is; relative ones are joined to `base`.
pub fn resolve_location(base: Option<&Url>, location: &str) -> Result<Url> {
    let location = location.trim();
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => Ok(base.join(location)?),
            None => path_to_url(Path::new(location)),
        },
        Err(e) => Err(Error::Url(e)),
    }
}

/// Check that a value is a lexically valid `xs:anyURI`: absolute, or a
/// relative reference that joins onto a base
pub fn is_valid_uri(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '\\') {
        return false;
    }
    match Url::parse(value) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://relative.invalid/")
            .and_then(|base| base.join(value))
            .is_ok(),
        Err(_) => false,
    }
}

/// Key under which a resolved location is cached: the URL without its fragment
pub fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Remaps absolute URIs before they are fetched
pub trait UriResolver: fmt::Debug {
    /// Map `uri` to the URI to actually fetch
    fn resolve(&self, uri: &Url) -> Result<Url>;
}

/// Resolver that returns every URI unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityResolver;

impl UriResolver for IdentityResolver {
    fn resolve(&self, uri: &Url) -> Result<Url> {
        Ok(uri.clone())
    }
}

/// Run a resolver, falling back to the unresolved URI on failure
pub(crate) fn resolve_or_keep(resolver: &dyn UriResolver, uri: Url) -> Url {
    match resolver.resolve(&uri) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!("URI resolver failed for {}: {}, using it unresolved", uri, e);
            uri
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc = Location::parse("http://example.com/service.wsdl");
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc = Location::parse("/tmp/service.wsdl");
        assert!(matches!(loc, Location::Path(_)));
        assert!(loc.is_file());
    }

    #[test]
    fn test_location_as_str() {
        let loc = Location::String("test".to_string());
        assert_eq!(loc.as_str(), "test");
        assert!(loc.to_url().is_err());
    }

    #[test]
    fn test_is_valid_uri() {
        assert!(is_valid_uri("http://www.w3.org/ns/wsdl/in-out"));
        assert!(is_valid_uri("../types.xsd"));
        assert!(!is_valid_uri("not a uri"));
        assert!(!is_valid_uri(""));
        assert!(!is_valid_uri("http://[broken"));
    }

    #[test]
    fn test_resolve_relative_location() {
        let base = Url::parse("http://example.com/wsdl/main.wsdl").unwrap();
        let resolved = resolve_location(Some(&base), "../common/types.wsdl").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/common/types.wsdl");
    }

    #[test]
    fn test_resolve_absolute_location() {
        let base = Url::parse("http://example.com/wsdl/main.wsdl").unwrap();
        let resolved = resolve_location(Some(&base), "urn:example:types").unwrap();
        assert_eq!(resolved.as_str(), "urn:example:types");
    }

    #[test]
    fn test_cache_key_drops_fragment() {
        let url = Url::parse("http://example.com/a.wsdl#wsdl.interface(I)").unwrap();
        assert_eq!(cache_key(&url), "http://example.com/a.wsdl");
    }

    #[test]
    fn test_identity_resolver() {
        let url = Url::parse("file:///tmp/a.wsdl").unwrap();
        assert_eq!(resolve_or_keep(&IdentityResolver, url.clone()), url);
    }
}
