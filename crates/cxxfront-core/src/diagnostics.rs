//! Diagnostic collection.
//!
//! Builders never print. Every problem goes through a [`DiagnosticSink`],
//! which the driver inspects once validation is done. A fatal diagnostic
//! latches the sink: the semantic core checks [`DiagnosticSink::is_fatal`]
//! before doing any further work.

use std::fmt;

use crate::{SemaError, Span};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Suspicious but valid code.
    Warning,
    /// Invalid code; validation of other expressions continues.
    Error,
    /// Validation cannot continue.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal error"),
        }
    }
}

/// A single reported message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span, self.severity, self.message)
    }
}

/// Accumulates diagnostics for one translation unit.
///
/// ```
/// use cxxfront_core::{DiagnosticSink, Severity, Span};
///
/// let mut sink = DiagnosticSink::new();
/// sink.report(Severity::Warning, Span::new(2, 7, 1), "division by zero");
/// assert_eq!(sink.exit_code(), 0);
/// sink.report(Severity::Fatal, Span::new(3, 1, 6), "no 'operator delete' available");
/// assert!(sink.is_fatal());
/// assert_ne!(sink.exit_code(), 0);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    fatal: bool,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, severity: Severity, span: Span, message: impl Into<String>) {
        match severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error => self.error_count += 1,
            Severity::Fatal => {
                self.error_count += 1;
                self.fatal = true;
            }
        }
        self.diagnostics.push(Diagnostic {
            severity,
            span,
            message: message.into(),
        });
    }

    /// Report a [`SemaError`] at its own severity and location.
    pub fn report_error(&mut self, error: &SemaError) {
        self.report(error.severity(), error.span(), error.to_string());
    }

    pub fn warn(&mut self, span: Span, message: impl Into<String>) {
        self.report(Severity::Warning, span, message);
    }

    /// A fatal diagnostic has been reported.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Process exit status for the driver: 0 when no errors were reported,
    /// 1 for errors, 2 after a fatal error.
    pub fn exit_code(&self) -> i32 {
        if self.fatal {
            2
        } else if self.error_count > 0 {
            1
        } else {
            0
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.diagnostics.last()
    }

    /// Forget everything except the fatal latch.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

impl fmt::Display for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut sink = DiagnosticSink::new();
        sink.warn(Span::new(1, 1, 1), "w");
        sink.report(Severity::Error, Span::new(2, 1, 1), "e");
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.errors().count(), 1);
        assert_eq!(sink.warnings().count(), 1);
        assert_eq!(sink.exit_code(), 1);
        assert!(!sink.is_fatal());
    }

    #[test]
    fn fatal_latches_through_clear() {
        let mut sink = DiagnosticSink::new();
        sink.report(Severity::Fatal, Span::synthetic(), "stop");
        sink.clear();
        assert!(sink.is_empty());
        assert!(sink.is_fatal());
        assert_eq!(sink.exit_code(), 2);
    }

    #[test]
    fn display_format() {
        let d = Diagnostic {
            severity: Severity::Error,
            span: Span::new(3, 9, 2),
            message: "cannot convert 'int*' to 'double'".to_string(),
        };
        assert_eq!(d.to_string(), "3:9: error: cannot convert 'int*' to 'double'");
    }
}
