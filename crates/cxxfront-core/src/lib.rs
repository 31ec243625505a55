//! cxxfront core types
//!
//! Shared vocabulary of the C++ semantic core: source spans, identities,
//! the type model, declared entities, the validated expression tree, error
//! types and the diagnostic sink.
//!
//! ## Modules
//!
//! - [`types`]: `TypeDescriptor`, primitive kinds, cv-qualifiers
//! - [`entries`]: classes, functions, variables, enums and lookup results
//! - [`operand`]: the `Operand` tree produced by the expression builders
//! - [`operator`]: operator codes and their operator-function names
//! - [`error`]: `SemaError` and `RegistrationError`
//! - [`diagnostics`]: severities and the `DiagnosticSink`

pub mod access;
pub mod diagnostics;
pub mod entries;
pub mod error;
pub mod operand;
pub mod operator;
pub mod qualified_name;
pub mod scope;
pub mod span;
pub mod type_hash;
pub mod types;

pub use access::Access;
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use entries::{
    BaseSpecifier, ClassEntry, ClassKey, Declaration, EnumConstantEntry, EnumEntry,
    FunctionEntry, FunctionKind, InheritancePath, LookupEntry, Param, Role, TypedefEntry,
    VariableEntry, VariableKind,
};
pub use error::{ErrorCategory, RegistrationError, SemaError};
pub use operand::{
    CallExpr, Callee, CastKind, ConversionStep, DeleteExpr, ExprKind, Expression, Literal,
    NewExpr, Operand, OverloadSet, Primary, PrimaryKind, TypeOperand,
};
pub use operator::OperatorCode;
pub use qualified_name::QualifiedName;
pub use scope::ScopeId;
pub use span::Span;
pub use type_hash::TypeHash;
pub use types::{
    BaseType, ClassId, EnumId, FunctionPrototype, Layer, PrimitiveKind, Qualifiers,
    TypeDescriptor,
};
