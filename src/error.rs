//! Error types for wsdl20
//!
//! This module defines the error enum returned by fallible operations and the
//! [`Diagnostic`] records handed to an [`ErrorReporter`](crate::reporter::ErrorReporter)
//! while a description is being read.

use std::fmt;
use thiserror::Error;

/// Result type alias using the wsdl20 Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wsdl20 operations
#[derive(Error, Debug)]
pub enum Error {
    /// Parsing error that is not tied to a reported diagnostic
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A fatal diagnostic aborted the current document
    #[error("fatal: {0}")]
    Fatal(Diagnostic),

    /// Namespace error (unbound prefix and similar)
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid NCName or QName)
    #[error("name error: {0}")]
    Name(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Misconfigured extension registry, URI resolver or catalog
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML well-formedness error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Parsing error with optional context
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the source document
    pub location: Option<String>,
    /// Source snippet that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Severity of a reported diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Recorded, parsing continues
    Warning,
    /// Recorded, parsing continues with the offending value unset
    Error,
    /// Aborts the current document
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Stable identifiers for every diagnostic the reader can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Root element is not `<description>`
    WrongRootElement,
    /// Root element is a WSDL 1.1 `<definitions>`
    Wsdl11Document,
    /// Element not allowed where it occurs
    UnexpectedElement,
    /// Element allowed but out of the expected order
    ElementOutOfOrder,
    /// More than one `<types>` element
    DuplicateTypes,
    /// Required attribute missing
    MissingAttribute,
    /// Attribute value is not an NCName
    InvalidNcName,
    /// Attribute value is not a URI
    InvalidUri,
    /// QName prefix has no namespace binding in scope
    UnboundPrefix,
    /// Attribute value is lexically invalid for its type
    InvalidAttributeValue,
    /// Imported or included document could not be fetched or parsed
    UnresolvedDocument,
    /// Problem reading an XML Schema inside `<types>`
    SchemaProblem,
    /// Message label could not be inferred from the pattern
    MessageLabelInference,
    /// Extension element or attribute could not be deserialized
    ExtensionProblem,
    /// Finding of the post-parse validation pass
    Validation,
}

impl ErrorCode {
    /// Short stable code printed alongside messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongRootElement => "WSDL501",
            Self::Wsdl11Document => "WSDL502",
            Self::UnexpectedElement => "WSDL503",
            Self::ElementOutOfOrder => "WSDL504",
            Self::DuplicateTypes => "WSDL505",
            Self::MissingAttribute => "WSDL506",
            Self::InvalidNcName => "WSDL507",
            Self::InvalidUri => "WSDL508",
            Self::UnboundPrefix => "WSDL509",
            Self::InvalidAttributeValue => "WSDL510",
            Self::UnresolvedDocument => "WSDL511",
            Self::SchemaProblem => "WSDL512",
            Self::MessageLabelInference => "WSDL513",
            Self::ExtensionProblem => "WSDL514",
            Self::Validation => "WSDL520",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in a source document a diagnostic was raised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    /// Base URI of the document
    pub document: Option<String>,
    /// 1-based line of the element start tag
    pub line: Option<usize>,
    /// Qualified name of the element, in `{ns}local` form
    pub element: Option<String>,
}

impl Locator {
    /// Locator for a whole document
    pub fn document(uri: impl Into<String>) -> Self {
        Self {
            document: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Set the line
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    /// Set the element
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.document.as_deref().unwrap_or("<unknown>");
        write!(f, "{}", doc)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(ref element) = self.element {
            write!(f, " ({})", element)?;
        }
        Ok(())
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Stable error code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
    /// Source location
    pub locator: Locator,
}

impl Diagnostic {
    /// Create a diagnostic with an empty locator
    pub fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            locator: Locator::default(),
        }
    }

    /// Create a warning
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create an error
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a fatal diagnostic
    pub fn fatal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, code, message)
    }

    /// Set the locator
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Check if this is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.code, self.locator, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Invalid description")
            .with_location("service.wsdl:42")
            .with_source("<interface name='1bad'/>");

        let msg = format!("{}", err);
        assert!(msg.contains("Invalid description"));
        assert!(msg.contains("Location:"));
        assert!(msg.contains("Source:"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(ErrorCode::UnboundPrefix, "prefix 'ns1' is not bound")
            .with_locator(
                Locator::document("file:///tmp/a.wsdl")
                    .with_line(Some(7))
                    .with_element("{http://www.w3.org/ns/wsdl}interface"),
            );

        let msg = diag.to_string();
        assert!(msg.starts_with("error [WSDL509] file:///tmp/a.wsdl:7"));
        assert!(msg.contains("prefix 'ns1' is not bound"));
        assert!(!diag.is_fatal());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = ParseError::new("test");
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
