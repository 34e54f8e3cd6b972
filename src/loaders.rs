//! Resource loading utilities
//!
//! This module fetches the text of descriptions and schemas. The reader only
//! talks to the [`DocumentLoader`] trait, so fetching can be swapped out
//! (for an HTTP client, an archive, or an in-memory map in tests).

use std::collections::HashMap;
use std::fmt;
use std::fs;

use url::Url;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::cache_key;

/// Fetches the content behind an absolute URL
pub trait DocumentLoader: fmt::Debug {
    /// Load a resource as a string
    fn load(&self, url: &Url) -> Result<String>;
}

/// Resource loader for the local filesystem
#[derive(Debug, Clone)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
    /// Whether to allow remote resources
    allow_remote: bool,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            allow_remote: false,
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether to allow remote resources
    pub fn with_allow_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }
}

impl DocumentLoader for Loader {
    fn load(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::Resource(format!("Not a local file URL: {}", url)))?;
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
                })?;

                self.limits.check_document_size(content.len())?;

                Ok(content)
            }
            _ => {
                if !self.allow_remote {
                    return Err(Error::Resource(format!(
                        "Remote resources are not allowed: {}",
                        url
                    )));
                }

                // TODO: plug an HTTP client in behind a feature flag
                Err(Error::Resource(format!(
                    "URL loading not yet implemented: {}",
                    url
                )))
            }
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Loader serving documents registered in memory, keyed by URL
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: HashMap<String, String>,
}

impl MemoryLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under a URL
    pub fn insert(&mut self, url: &Url, content: impl Into<String>) {
        self.documents.insert(cache_key(url), content.into());
    }

    /// Register a document, builder style
    pub fn with_document(mut self, url: &str, content: impl Into<String>) -> Result<Self> {
        let url = Url::parse(url)?;
        self.insert(&url, content);
        Ok(self)
    }

    /// Number of registered documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if no documents are registered
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, url: &Url) -> Result<String> {
        self.documents
            .get(&cache_key(url))
            .cloned()
            .ok_or_else(|| Error::Resource(format!("No document registered for {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::path_to_url;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<description/>").unwrap();

        let url = path_to_url(file.path()).unwrap();
        let content = Loader::new().load(&url).unwrap();

        assert!(content.contains("<description/>"));
    }

    #[test]
    fn test_remote_not_allowed() {
        let url = Url::parse("http://example.com/a.wsdl").unwrap();
        let result = Loader::new().load(&url);
        assert!(matches!(result, Err(Error::Resource(_))));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(11 * 1024 * 1024); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let url = path_to_url(file.path()).unwrap();
        let loader = Loader::new().with_limits(Limits::strict());

        // Strict limits (10 MB max) should reject 11MB file
        assert!(matches!(loader.load(&url), Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new()
            .with_document("http://example.com/a.wsdl", "<description/>")
            .unwrap();

        let url = Url::parse("http://example.com/a.wsdl#frag").unwrap();
        assert_eq!(loader.load(&url).unwrap(), "<description/>");

        let missing = Url::parse("http://example.com/b.wsdl").unwrap();
        assert!(loader.load(&missing).is_err());
    }
}
