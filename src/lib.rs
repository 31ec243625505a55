//! cxxfront: the semantic core of a C++ front end.
//!
//! Re-exports the three workspace crates:
//!
//! - [`core`]: the type model, operand tree, entities and diagnostics
//! - [`registry`]: the symbol registry and inheritance graph
//! - [`sema`]: conversions, overload resolution, access control and the
//!   expression builders
//!
//! # Example
//!
//! ```
//! use cxxfront::prelude::*;
//!
//! let registry = SymbolRegistry::new();
//! let mut ctx = SemaContext::new(&registry);
//! let mut builder = ExprBuilder::new(&mut ctx);
//! let sum = builder.build_expression(
//!     OperatorCode::Mul,
//!     &[Operand::integer(6, Span::new(1, 1, 1)), Operand::integer(7, Span::new(1, 5, 1))],
//!     Span::new(1, 1, 5),
//! );
//! assert_eq!(cxxfront::sema::constant::evaluate(&sum), Some(42));
//! assert_eq!(ctx.diagnostics().exit_code(), 0);
//! ```

pub use cxxfront_core as core;
pub use cxxfront_registry as registry;
pub use cxxfront_sema as sema;

/// The types most callers need.
pub mod prelude {
    pub use cxxfront_core::{
        Access, ClassEntry, ClassId, Declaration, DiagnosticSink, EnumEntry, FunctionEntry,
        FunctionPrototype, Operand, OperatorCode, PrimitiveKind, QualifiedName, Qualifiers,
        ScopeId, SemaError, Severity, Span, TypeDescriptor, VariableEntry,
    };
    pub use cxxfront_registry::SymbolRegistry;
    pub use cxxfront_sema::{
        AutoCastManager, ConversionCategory, ConversionMode, ExprBuilder, NewRequest,
        OverloadResult, SemaContext, SemaOptions,
    };
}
