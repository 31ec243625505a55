//! Semantic core of the cxxfront expression checker.
//!
//! Takes operands that are already built (declarations resolved, literals
//! typed) and applies C++ semantics to them: conversions, overload
//! resolution, member access control and the typing rules of every
//! operator.
//!
//! ## Key Types
//!
//! - [`ExprBuilder`]: the entry point; one typed node (or the Error
//!   sentinel) per operator application
//! - [`SemaContext`]: per-expression state: diagnostics, recursion depth,
//!   scope, options
//! - [`AutoCastManager`]: picks the conversion strategy for a source and
//!   destination type
//! - [`OverloadResult`]: outcome of overload resolution
//!
//! ## Layers
//!
//! ```text
//! classify -> conversion -> overload -> expr
//!          \-> access ----/-> names ---/
//! ```
//!
//! Builders never see syntax. Errors travel as `Result<_, SemaError>` up to
//! the [`ExprBuilder`] boundary, where each becomes one diagnostic.

pub mod access;
pub mod classify;
pub mod constant;
mod context;
pub mod conversion;
pub mod expr;
pub mod names;
mod options;
pub mod overload;

pub use access::{MemberRef, is_accessible};
pub use context::SemaContext;
pub use conversion::{
    AutoCastManager, ConversionCategory, ConversionMode, ConversionOutcome, ConversionTier,
};
pub use expr::{ExprBuilder, NewRequest};
pub use options::SemaOptions;
pub use overload::{OverloadResult, resolve_overload};
