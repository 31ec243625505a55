//! Error types for the semantic core and for symbol registration.
//!
//! ## Error Hierarchy
//!
//! ```text
//! SemaError          - expression validation (one diagnostic each)
//! ├── type errors        - operand categories, missing conversions, lvalue rules
//! ├── overload errors    - no viable candidate, ambiguous candidates
//! ├── access errors      - inaccessible members, ambiguous names
//! ├── structural errors  - abstract/incomplete classes, bad operand shapes
//! ├── TooComplex         - recursion limit (recoverable)
//! └── Fatal              - stops all further validation
//!
//! RegistrationError  - populating the symbol registry
//! ```
//!
//! Messages do not include the location; the diagnostic sink pairs them
//! with the span.

use thiserror::Error;

use crate::{Severity, Span};

/// Broad classification of a [`SemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Type,
    Overload,
    Access,
    Structural,
    Fatal,
}

// ============================================================================
// Semantic Errors
// ============================================================================

/// Errors raised while validating one expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemaError {
    // === Type errors ===
    /// Operands of the wrong category for an operator.
    #[error("invalid operands to '{op}': {detail}")]
    InvalidOperands {
        op: &'static str,
        detail: String,
        span: Span,
    },

    /// No conversion path exists.
    #[error("cannot convert '{from}' to '{to}'")]
    NoConversion { from: String, to: String, span: Span },

    /// More than one conversion path applies.
    #[error("ambiguous conversion from '{from}' to '{to}': '{first}' and '{second}' both apply")]
    AmbiguousConversion {
        from: String,
        to: String,
        first: String,
        second: String,
        span: Span,
    },

    /// An lvalue is required.
    #[error("{context} requires an lvalue")]
    NotAnLvalue { context: &'static str, span: Span },

    /// The lvalue cannot be modified (const, array, function).
    #[error("cannot modify '{target}': {reason}")]
    NotModifiable {
        target: String,
        reason: &'static str,
        span: Span,
    },

    /// Generic type rule violation.
    #[error("{message}")]
    TypeMismatch { message: String, span: Span },

    // === Overload errors ===
    /// No candidate is viable.
    #[error("no matching function for call to '{name}({args})'")]
    NoMatchingOverload {
        name: String,
        args: String,
        span: Span,
    },

    /// Two viable candidates and neither is better.
    #[error("call to '{name}' is ambiguous: '{first}' and '{second}'")]
    AmbiguousOverload {
        name: String,
        first: String,
        second: String,
        span: Span,
    },

    /// A class operand offers no operator function for the operation.
    #[error("no '{operator}' for '{ty}'")]
    MissingOperator {
        operator: String,
        ty: String,
        span: Span,
    },

    // === Access errors ===
    /// The member exists but cannot be reached from the current scope.
    #[error("'{member}' is inaccessible here")]
    Inaccessible { member: String, span: Span },

    /// Name lookup found distinct declarations that neither hides.
    #[error("'{name}' is ambiguous: '{first}' and '{second}'")]
    AmbiguousName {
        name: String,
        first: String,
        second: String,
        span: Span,
    },

    /// Conversion to a base class that occurs more than once.
    #[error("'{base}' is an ambiguous base of '{derived}'")]
    AmbiguousBase {
        base: String,
        derived: String,
        span: Span,
    },

    /// Name lookup found nothing.
    #[error("'{class}' has no member named '{name}'")]
    UnknownMember {
        class: String,
        name: String,
        span: Span,
    },

    // === Structural errors ===
    /// A class used in a way its definition forbids.
    #[error("{message}")]
    Structural { message: String, span: Span },

    // === Limits ===
    /// Nesting exceeded the configured recursion depth.
    #[error("expression too complex")]
    TooComplex { span: Span },

    /// Validation cannot continue at all.
    #[error("{message}")]
    Fatal { message: String, span: Span },
}

impl SemaError {
    pub fn span(&self) -> Span {
        match self {
            SemaError::InvalidOperands { span, .. }
            | SemaError::NoConversion { span, .. }
            | SemaError::AmbiguousConversion { span, .. }
            | SemaError::NotAnLvalue { span, .. }
            | SemaError::NotModifiable { span, .. }
            | SemaError::TypeMismatch { span, .. }
            | SemaError::NoMatchingOverload { span, .. }
            | SemaError::AmbiguousOverload { span, .. }
            | SemaError::MissingOperator { span, .. }
            | SemaError::Inaccessible { span, .. }
            | SemaError::AmbiguousName { span, .. }
            | SemaError::AmbiguousBase { span, .. }
            | SemaError::UnknownMember { span, .. }
            | SemaError::Structural { span, .. }
            | SemaError::TooComplex { span }
            | SemaError::Fatal { span, .. } => *span,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SemaError::InvalidOperands { .. }
            | SemaError::NoConversion { .. }
            | SemaError::AmbiguousConversion { .. }
            | SemaError::NotAnLvalue { .. }
            | SemaError::NotModifiable { .. }
            | SemaError::TypeMismatch { .. } => ErrorCategory::Type,
            SemaError::NoMatchingOverload { .. }
            | SemaError::AmbiguousOverload { .. }
            | SemaError::MissingOperator { .. } => ErrorCategory::Overload,
            SemaError::Inaccessible { .. }
            | SemaError::AmbiguousName { .. }
            | SemaError::AmbiguousBase { .. }
            | SemaError::UnknownMember { .. } => ErrorCategory::Access,
            SemaError::Structural { .. } | SemaError::TooComplex { .. } => {
                ErrorCategory::Structural
            }
            SemaError::Fatal { .. } => ErrorCategory::Fatal,
        }
    }

    /// Severity the diagnostic is reported at.
    pub fn severity(&self) -> Severity {
        match self {
            SemaError::Fatal { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Replace the location of an error raised deep inside a resolver with
    /// the location of the construct being built, unless it already has one.
    pub fn or_span(mut self, fallback: Span) -> Self {
        if self.span().is_synthetic() {
            match &mut self {
                SemaError::InvalidOperands { span, .. }
                | SemaError::NoConversion { span, .. }
                | SemaError::AmbiguousConversion { span, .. }
                | SemaError::NotAnLvalue { span, .. }
                | SemaError::NotModifiable { span, .. }
                | SemaError::TypeMismatch { span, .. }
                | SemaError::NoMatchingOverload { span, .. }
                | SemaError::AmbiguousOverload { span, .. }
                | SemaError::MissingOperator { span, .. }
                | SemaError::Inaccessible { span, .. }
                | SemaError::AmbiguousName { span, .. }
                | SemaError::AmbiguousBase { span, .. }
                | SemaError::UnknownMember { span, .. }
                | SemaError::Structural { span, .. }
                | SemaError::TooComplex { span }
                | SemaError::Fatal { span, .. } => *span = fallback,
            }
        }
        self
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SemaError::Fatal { .. })
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating the symbol registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A class with this name is already registered.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// An enumeration with this name is already registered.
    #[error("duplicate enum: {0}")]
    DuplicateEnum(String),

    /// A function with the same signature is already registered.
    #[error("duplicate function: {0}")]
    DuplicateFunction(String),

    /// A variable with this name is already registered in the scope.
    #[error("duplicate variable: {0}")]
    DuplicateVariable(String),

    /// A base-specifier names a class that is not registered.
    #[error("class '{class}' names unknown base '{base}'")]
    UnknownBase { class: String, base: String },

    /// The same class appears twice in one base-specifier list.
    #[error("class '{class}' lists base '{base}' more than once")]
    DuplicateBase { class: String, base: String },

    /// A class would derive from itself.
    #[error("circular inheritance involving '{0}'")]
    CircularInheritance(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_spans() {
        let err = SemaError::AmbiguousOverload {
            name: "f".to_string(),
            first: "void f(int)".to_string(),
            second: "void f(long)".to_string(),
            span: Span::new(4, 2, 1),
        };
        assert_eq!(
            err.to_string(),
            "call to 'f' is ambiguous: 'void f(int)' and 'void f(long)'"
        );
        assert_eq!(err.span(), Span::new(4, 2, 1));
        assert_eq!(err.category(), ErrorCategory::Overload);
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn fatal_severity() {
        let err = SemaError::Fatal {
            message: "no 'operator delete' available".to_string(),
            span: Span::synthetic(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.severity(), Severity::Fatal);
    }

    #[test]
    fn or_span_fills_only_missing_locations() {
        let located = SemaError::TooComplex {
            span: Span::new(1, 1, 1),
        };
        assert_eq!(located.or_span(Span::new(9, 9, 1)).span(), Span::new(1, 1, 1));
        let unlocated = SemaError::TooComplex {
            span: Span::synthetic(),
        };
        assert_eq!(unlocated.or_span(Span::new(9, 9, 1)).span(), Span::new(9, 9, 1));
    }

    #[test]
    fn registration_display() {
        let err = RegistrationError::UnknownBase {
            class: "D".to_string(),
            base: "B".to_string(),
        };
        assert_eq!(err.to_string(), "class 'D' names unknown base 'B'");
    }
}
