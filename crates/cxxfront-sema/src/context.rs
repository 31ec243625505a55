//! SemaContext - state threaded through every builder and resolver.
//!
//! The context owns the diagnostic sink and the recursion counter, borrows
//! the symbol registry, and hands out the shared Error sentinel. It is
//! deliberately not `Sync`: operands are `Rc`-shared.

use std::rc::Rc;

use cxxfront_core::{ClassId, DiagnosticSink, Operand, Qualifiers, ScopeId, SemaError, Span};
use cxxfront_registry::SymbolRegistry;
use tracing::warn;

use crate::SemaOptions;

pub struct SemaContext<'r> {
    registry: &'r SymbolRegistry,
    options: SemaOptions,
    diagnostics: DiagnosticSink,
    scope: ScopeId,
    /// cv-qualification of the enclosing member function (`this` type).
    this_cv: Qualifiers,
    depth: usize,
    error: Rc<Operand>,
}

impl<'r> SemaContext<'r> {
    pub fn new(registry: &'r SymbolRegistry) -> Self {
        Self {
            registry,
            options: SemaOptions::default(),
            diagnostics: DiagnosticSink::new(),
            scope: ScopeId::global(),
            this_cv: Qualifiers::empty(),
            depth: 0,
            error: Rc::new(Operand::Error),
        }
    }

    pub fn with_options(mut self, options: SemaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }

    /// Validate as if inside a member function of `class` with
    /// qualification `cv`.
    pub fn with_member_function(mut self, class: &ClassId, cv: Qualifiers) -> Self {
        self.scope.class = Some(class.clone());
        self.this_cv = cv;
        self
    }

    // === Accessors ===

    #[inline]
    pub fn registry(&self) -> &'r SymbolRegistry {
        self.registry
    }

    #[inline]
    pub fn options(&self) -> &SemaOptions {
        &self.options
    }

    #[inline]
    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn set_scope(&mut self, scope: ScopeId) {
        self.scope = scope;
    }

    pub fn this_cv(&self) -> Qualifiers {
        self.this_cv
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticSink {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticSink {
        self.diagnostics
    }

    /// The shared Error sentinel.
    #[inline]
    pub fn error(&self) -> Rc<Operand> {
        Rc::clone(&self.error)
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.diagnostics.is_fatal()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    // === Diagnostics ===

    pub fn report(&mut self, error: &SemaError) {
        self.diagnostics.report_error(error);
    }

    pub fn warn(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        warn!(%span, %message, "semantic warning");
        self.diagnostics.warn(span, message);
    }

    // === Recursion guard ===

    /// Run `f` one nesting level deeper.
    ///
    /// Fails with [`SemaError::TooComplex`] once `max_depth` is exceeded. The
    /// counter is restored whether `f` succeeds or not.
    pub fn nested<T>(
        &mut self,
        span: Span,
        f: impl FnOnce(&mut Self) -> Result<T, SemaError>,
    ) -> Result<T, SemaError> {
        if self.depth >= self.options.max_depth {
            return Err(SemaError::TooComplex { span });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
