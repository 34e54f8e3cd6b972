//! Limits and constraints for WSDL processing
//!
//! This module defines limits that keep a reader from being driven into
//! resource exhaustion by oversized documents, deeply nested XML, or long
//! import/include chains.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum XML element nesting depth
    pub max_xml_depth: usize,

    /// Maximum document size in bytes
    pub max_document_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum nesting of imported/included descriptions and schemas
    pub max_module_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_document_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
            max_module_depth: 100,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_document_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
            max_module_depth: 20,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_document_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
            max_module_depth: 1000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if document size is within limits
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_size {
            Err(Error::LimitExceeded(format!(
                "document size {} bytes exceeds maximum {} bytes",
                size, self.max_document_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if attribute count is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if import/include nesting is within limits
    pub fn check_module_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_module_depth {
            Err(Error::LimitExceeded(format!(
                "import/include depth {} exceeds maximum {}",
                depth, self.max_module_depth
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_xml_depth, 1000);
        assert_eq!(limits.max_module_depth, 100);
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_xml_depth < Limits::default().max_xml_depth);
        assert!(limits.check_document_size(11 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_check_xml_depth() {
        let limits = Limits::default();
        assert!(limits.check_xml_depth(500).is_ok());
        assert!(limits.check_xml_depth(1001).is_err());
    }

    #[test]
    fn test_check_module_depth() {
        let limits = Limits::strict();
        assert!(limits.check_module_depth(20).is_ok());
        assert!(matches!(
            limits.check_module_depth(21),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_check_attributes() {
        let limits = Limits::strict();
        assert!(limits.check_attributes(100).is_ok());
        assert!(limits.check_attributes(101).is_err());
    }
}
