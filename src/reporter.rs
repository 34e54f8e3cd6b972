//! Error reporting
//!
//! Reading a description never stops at the first problem. Every problem is
//! turned into a [`Diagnostic`] and handed to an [`ErrorReporter`]; only fatal
//! diagnostics abort the document being read.

use std::fmt;

use crate::error::{Diagnostic, Error, Result, Severity};

/// Receives diagnostics produced while reading a description
pub trait ErrorReporter: fmt::Debug {
    /// Record a diagnostic
    fn report(&mut self, diagnostic: Diagnostic);

    /// All diagnostics recorded so far
    fn diagnostics(&self) -> &[Diagnostic];
}

/// Default reporter: keeps every diagnostic and mirrors it to `tracing`
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics at or above a severity
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= severity)
            .count()
    }

    /// Check if any error or fatal diagnostic was recorded
    pub fn has_errors(&self) -> bool {
        self.count_at_least(Severity::Error) > 0
    }
}

impl ErrorReporter for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!("{}", diagnostic),
            Severity::Error | Severity::Fatal => tracing::error!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Report a diagnostic; a fatal one comes back as `Err(Error::Fatal)`
pub(crate) fn emit(reporter: &mut dyn ErrorReporter, diagnostic: Diagnostic) -> Result<()> {
    let fatal = diagnostic.is_fatal();
    if fatal {
        reporter.report(diagnostic.clone());
        return Err(Error::Fatal(diagnostic));
    }
    reporter.report(diagnostic);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_collector_records_everything() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::warning(ErrorCode::UnresolvedDocument, "missing"));
        collector.report(Diagnostic::error(ErrorCode::InvalidNcName, "bad name"));

        assert_eq!(collector.diagnostics().len(), 2);
        assert_eq!(collector.count_at_least(Severity::Error), 1);
        assert!(collector.has_errors());
    }

    #[test]
    fn test_emit_fatal_aborts() {
        let mut collector = DiagnosticCollector::new();
        let result = emit(
            &mut collector,
            Diagnostic::fatal(ErrorCode::WrongRootElement, "not a description"),
        );

        assert!(matches!(result, Err(Error::Fatal(_))));
        assert_eq!(collector.diagnostics().len(), 1);
    }

    #[test]
    fn test_emit_warning_continues() {
        let mut collector = DiagnosticCollector::new();
        let result = emit(
            &mut collector,
            Diagnostic::warning(ErrorCode::ElementOutOfOrder, "late import"),
        );

        assert!(result.is_ok());
        assert!(!collector.has_errors());
    }
}
