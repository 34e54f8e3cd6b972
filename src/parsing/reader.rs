//! `WsdlReader`: configuration and entry points

use std::path::Path;
use std::sync::Arc;

use url::Url;

use super::binding::infer_binding_labels;
use super::description::parse_description;
use super::session::ParseSession;
use super::types::resolve_locationless_imports;
use crate::documents::{Document, Element};
use crate::error::{Diagnostic, Error, Result};
use crate::extensions::ExtensionRegistry;
use crate::limits::Limits;
use crate::loaders::{DocumentLoader, Loader};
use crate::locations::{path_to_url, resolve_or_keep, IdentityResolver, UriResolver};
use crate::reporter::{DiagnosticCollector, ErrorReporter};
use crate::validation;
use crate::wsdl::Wsdl;

/// Reads WSDL 2.0 descriptions
///
/// ```rust,ignore
/// use wsdl20::WsdlReader;
///
/// let wsdl = WsdlReader::new().with_validation(false).read_file("service.wsdl")?;
/// for interface in wsdl.to_component().interfaces() {
///     println!("{}", interface.name);
/// }
/// ```
#[derive(Debug)]
pub struct WsdlReader {
    validation: bool,
    limits: Limits,
    loader: Option<Arc<dyn DocumentLoader>>,
    resolver: Arc<dyn UriResolver>,
    registry: Arc<ExtensionRegistry>,
    reporter: Option<Box<dyn ErrorReporter>>,
}

impl Default for WsdlReader {
    fn default() -> Self {
        Self::new()
    }
}

impl WsdlReader {
    /// Reader with validation on, default limits, the filesystem loader and
    /// the standard extension registry
    pub fn new() -> Self {
        Self {
            validation: true,
            limits: Limits::default(),
            loader: None,
            resolver: Arc::new(IdentityResolver),
            registry: Arc::new(ExtensionRegistry::standard()),
            reporter: None,
        }
    }

    /// Run the structural validation pass after reading
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    /// Set resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Fetch documents through `loader`
    pub fn with_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Remap locations through `resolver` before fetching
    pub fn with_uri_resolver(mut self, resolver: impl UriResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Use a custom extension registry
    pub fn with_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Also send every diagnostic to `reporter`
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Whether validation runs after reading
    pub fn validation(&self) -> bool {
        self.validation
    }

    /// The reporter given to [`with_reporter`](Self::with_reporter)
    pub fn reporter(&self) -> Option<&dyn ErrorReporter> {
        self.reporter.as_deref()
    }

    /// Read a description from a file
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<Wsdl> {
        let url = path_to_url(path.as_ref())?;
        self.read_url(&url)
    }

    /// Read a description from a URL
    pub fn read_url(&mut self, url: &Url) -> Result<Wsdl> {
        let fetch_url = resolve_or_keep(self.resolver.as_ref(), url.clone());
        let content = match &self.loader {
            Some(loader) => loader.load(&fetch_url)?,
            None => Loader::new()
                .with_limits(self.limits.clone())
                .load(&fetch_url)?,
        };
        self.read_str(&content, url)
    }

    /// Read a description from text, relative locations resolved against `base_uri`
    pub fn read_str(&mut self, text: &str, base_uri: &Url) -> Result<Wsdl> {
        let document = Document::parse_with_limits(text.as_bytes(), &self.limits)?;
        let root = document
            .into_root()
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))?;
        self.read_element(&root, base_uri)
    }

    /// Read a description from an already parsed roxmltree document
    pub fn read_roxmltree(&mut self, document: &roxmltree::Document<'_>, base_uri: &Url) -> Result<Wsdl> {
        let root = Document::from_roxmltree_with_limits(document, &self.limits)?
            .into_root()
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))?;
        self.read_element(&root, base_uri)
    }

    /// Read a description from a `<description>` element
    pub fn read_element(&mut self, element: &Element, base_uri: &Url) -> Result<Wsdl> {
        let default_loader = Loader::new().with_limits(self.limits.clone());
        let loader: &dyn DocumentLoader = match &self.loader {
            Some(loader) => loader.as_ref(),
            None => &default_loader,
        };
        let registry = Arc::clone(&self.registry);

        let mut default_reporter = DiagnosticCollector::new();
        let forward: &mut dyn ErrorReporter = match self.reporter.as_deref_mut() {
            Some(reporter) => reporter,
            None => &mut default_reporter,
        };
        let mut reporter = ReadReporter {
            collected: Vec::new(),
            forward,
        };

        let mut session = ParseSession::new(
            &mut reporter,
            loader,
            self.resolver.as_ref(),
            &registry,
            &self.limits,
        );
        let root = parse_description(&mut session, element, base_uri.clone())?;
        let mut descriptions = session.into_descriptions();

        infer_binding_labels(&mut descriptions, &mut reporter)?;
        resolve_locationless_imports(&mut descriptions, &mut reporter)?;
        if self.validation {
            validation::validate(&descriptions, root, &mut reporter)?;
        }

        tracing::info!(
            "read {} with {} document(s), {} diagnostic(s)",
            base_uri,
            descriptions.len(),
            reporter.collected.len()
        );
        Ok(Wsdl::new(descriptions, root, registry, reporter.collected))
    }
}

/// Keeps the diagnostics of one read and forwards them
#[derive(Debug)]
struct ReadReporter<'r> {
    collected: Vec<Diagnostic>,
    forward: &'r mut dyn ErrorReporter,
}

impl ErrorReporter for ReadReporter<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.forward.report(diagnostic.clone());
        self.collected.push(diagnostic);
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        &self.collected
    }
}
