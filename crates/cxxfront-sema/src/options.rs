//! Tunables for expression validation.

/// Options controlling limits and optional warnings.
///
/// ```
/// use cxxfront_sema::SemaOptions;
///
/// let options = SemaOptions::default()
///     .with_max_depth(64)
///     .with_warn_division_by_zero(false);
/// assert_eq!(options.max_depth, 64);
/// assert!(options.warn_float_narrowing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemaOptions {
    /// Deepest allowed nesting of expression building, conversions,
    /// `operator->` chains and name qualification.
    pub max_depth: usize,
    /// Warn on `/` and `%` by a literal zero.
    pub warn_division_by_zero: bool,
    /// Warn when an assignment converts a floating value to an integral type.
    pub warn_float_narrowing: bool,
    /// Let copy-initialization use `explicit` constructors.
    pub permissive_explicit_constructors: bool,
}

impl Default for SemaOptions {
    fn default() -> Self {
        Self {
            max_depth: 256,
            warn_division_by_zero: true,
            warn_float_narrowing: true,
            permissive_explicit_constructors: false,
        }
    }
}

impl SemaOptions {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_warn_division_by_zero(mut self, enabled: bool) -> Self {
        self.warn_division_by_zero = enabled;
        self
    }

    pub fn with_warn_float_narrowing(mut self, enabled: bool) -> Self {
        self.warn_float_narrowing = enabled;
        self
    }

    pub fn with_permissive_explicit_constructors(mut self, enabled: bool) -> Self {
        self.permissive_explicit_constructors = enabled;
        self
    }
}
