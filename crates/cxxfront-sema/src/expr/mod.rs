//! Expression builders.
//!
//! The [`ExprBuilder`] turns an operator applied to already-built operands
//! into a typed node, or into the shared Error sentinel after reporting one
//! diagnostic.
//!
//! ## Algorithm
//!
//! Every builder follows the same shape:
//!
//! 1. Check the operand categories the operator needs.
//! 2. For class (or enumeration) operands, try the user-declared operator
//!    functions first.
//! 3. Convert the operands to the types the built-in operator works on.
//! 4. Build the result node with its type and lvalue-ness.
//!
//! ## Operand layouts
//!
//! [`ExprBuilder::build_expression`] takes the operands in source order:
//!
//! | Operator | Operands |
//! |---|---|
//! | binary, assignment, `,`, `[]`, `.*`, `->*` | `[lhs, rhs]` |
//! | unary, `sizeof`, `delete` | `[operand]` |
//! | `?:` | `[condition, then, else]` |
//! | call | `[callee, args...]` |
//! | `.`, `->` | `[object, member]` (a resolved member name) |
//! | `new` | `[type, initializers...]` |
//! | `new[]` | `[type, length]` |
//! | casts | `[type, operand]` |
//! | functional cast | `[type, args...]` |
//!
//! ## Error handling
//!
//! Builders return `Result` internally. The public entry points turn an
//! `Err` into exactly one diagnostic plus the Error sentinel. An Error
//! operand yields the sentinel without a new diagnostic, and after a fatal
//! diagnostic every build yields the sentinel.
//!
//! # Example
//!
//! ```
//! use cxxfront_core::{OperatorCode, Operand, Span};
//! use cxxfront_registry::SymbolRegistry;
//! use cxxfront_sema::{ExprBuilder, SemaContext};
//!
//! let registry = SymbolRegistry::new();
//! let mut ctx = SemaContext::new(&registry);
//! let mut builder = ExprBuilder::new(&mut ctx);
//! let sum = builder.build_expression(
//!     OperatorCode::Add,
//!     &[Operand::integer(1, Span::new(1, 1, 1)), Operand::integer(2, Span::new(1, 5, 1))],
//!     Span::new(1, 1, 5),
//! );
//! assert_eq!(sum.ty().map(ToString::to_string).as_deref(), Some("int"));
//! ```

mod allocation;
mod arithmetic;
mod assignment;
mod call;
mod cast;
mod logical;
mod member;
mod member_pointer;
mod relational;
mod subscript;
mod ternary;
mod unary;
mod user_operator;

pub use allocation::NewRequest;

use std::rc::Rc;

use cxxfront_core::{
    CastKind, ConversionStep, ExprKind, Layer, Operand, OperatorCode, QualifiedName, SemaError,
    Span, TypeDescriptor,
};
use tracing::{debug, instrument};

use crate::SemaContext;
use crate::classify::{is_array, is_function_type};
use crate::conversion::{
    self, AutoCastManager, ConversionCategory, ConversionMode, ConversionOutcome, ConversionPlan,
    PlannedStep,
};
use crate::names;

type Result<T> = std::result::Result<T, SemaError>;

/// Builds typed expression nodes, reporting into the context's sink.
pub struct ExprBuilder<'c, 'r> {
    ctx: &'c mut SemaContext<'r>,
}

impl<'c, 'r> ExprBuilder<'c, 'r> {
    pub fn new(ctx: &'c mut SemaContext<'r>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &SemaContext<'r> {
        self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SemaContext<'r> {
        self.ctx
    }

    /// Apply `op` to `operands`. Never fails: errors become a diagnostic
    /// and the Error sentinel.
    #[instrument(level = "debug", skip_all, fields(op = %op))]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_expression(
        &mut self,
        op: OperatorCode,
        operands: &[Rc<Operand>],
        span: Span,
    ) -> Rc<Operand> {
        self.guarded(operands, span, |ctx| dispatch(ctx, op, operands, span))
    }

    /// Resolve a possibly qualified name used as an expression.
    pub fn build_name(&mut self, name: &QualifiedName, span: Span) -> Rc<Operand> {
        self.guarded(&[], span, |ctx| names::resolve_name(ctx, name, span))
    }

    /// `object.member` or `object->member`.
    pub fn build_member_access(
        &mut self,
        op: OperatorCode,
        object: &Rc<Operand>,
        member: &QualifiedName,
        span: Span,
    ) -> Rc<Operand> {
        self.guarded(std::slice::from_ref(object), span, |ctx| {
            member::build_member_access(ctx, op, object, member, span)
        })
    }

    pub fn build_call(
        &mut self,
        callee: &Rc<Operand>,
        args: &[Rc<Operand>],
        span: Span,
    ) -> Rc<Operand> {
        let all: Vec<Rc<Operand>> = std::iter::once(Rc::clone(callee))
            .chain(args.iter().cloned())
            .collect();
        self.guarded(&all, span, |ctx| call::build_call(ctx, callee, args, span))
    }

    /// `new`, with placement arguments and initializers.
    pub fn build_new(&mut self, request: &NewRequest, span: Span) -> Rc<Operand> {
        let operands: Vec<Rc<Operand>> = request.operands().cloned().collect();
        self.guarded(&operands, span, |ctx| {
            allocation::build_new(ctx, request, span)
        })
    }

    pub fn build_delete(
        &mut self,
        operand: &Rc<Operand>,
        is_array: bool,
        span: Span,
    ) -> Rc<Operand> {
        self.guarded(std::slice::from_ref(operand), span, |ctx| {
            allocation::build_delete(ctx, operand, is_array, span)
        })
    }

    /// An explicit cast of `args` to `target`. Only the functional form
    /// takes other than one argument.
    pub fn build_cast(
        &mut self,
        kind: CastKind,
        target: &TypeDescriptor,
        args: &[Rc<Operand>],
        span: Span,
    ) -> Rc<Operand> {
        self.guarded(args, span, |ctx| cast::build_cast(ctx, kind, target, args, span))
    }

    /// Copy-initialize an object of type `target` from `operand`.
    pub fn convert(
        &mut self,
        operand: &Rc<Operand>,
        target: &TypeDescriptor,
        span: Span,
    ) -> Rc<Operand> {
        self.guarded(std::slice::from_ref(operand), span, |ctx| {
            convert_to(ctx, operand, target, span)
        })
    }

    fn guarded(
        &mut self,
        operands: &[Rc<Operand>],
        span: Span,
        build: impl FnOnce(&mut SemaContext<'r>) -> Result<Rc<Operand>>,
    ) -> Rc<Operand> {
        if self.ctx.is_fatal() || operands.iter().any(|o| o.is_error()) {
            return self.ctx.error();
        }
        match self.ctx.nested(span, build) {
            Ok(node) => node,
            Err(error) => {
                let error = error.or_span(span);
                debug!(%error, "expression rejected");
                self.ctx.report(&error);
                self.ctx.error()
            }
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

fn dispatch(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    operands: &[Rc<Operand>],
    span: Span,
) -> Result<Rc<Operand>> {
    if let Some(expected) = op.arity() {
        if operands.len() != expected {
            return Err(invalid(
                op,
                format!("expected {expected} operand(s), got {}", operands.len()),
                span,
            ));
        }
    }
    match op {
        OperatorCode::Add
        | OperatorCode::Sub
        | OperatorCode::Mul
        | OperatorCode::Div
        | OperatorCode::Mod
        | OperatorCode::Shl
        | OperatorCode::Shr
        | OperatorCode::BitAnd
        | OperatorCode::BitOr
        | OperatorCode::BitXor => {
            arithmetic::build_binary(ctx, op, &operands[0], &operands[1], span)
        }
        OperatorCode::Eq
        | OperatorCode::Ne
        | OperatorCode::Lt
        | OperatorCode::Gt
        | OperatorCode::Le
        | OperatorCode::Ge => {
            relational::build_comparison(ctx, op, &operands[0], &operands[1], span)
        }
        OperatorCode::LogicalAnd | OperatorCode::LogicalOr => {
            logical::build_logical(ctx, op, &operands[0], &operands[1], span)
        }
        OperatorCode::LogicalNot => logical::build_not(ctx, &operands[0], span),
        OperatorCode::Assign
        | OperatorCode::AddAssign
        | OperatorCode::SubAssign
        | OperatorCode::MulAssign
        | OperatorCode::DivAssign
        | OperatorCode::ModAssign
        | OperatorCode::ShlAssign
        | OperatorCode::ShrAssign
        | OperatorCode::AndAssign
        | OperatorCode::OrAssign
        | OperatorCode::XorAssign => {
            assignment::build_assignment(ctx, op, &operands[0], &operands[1], span)
        }
        OperatorCode::Comma => build_comma(ctx, &operands[0], &operands[1], span),
        OperatorCode::Subscript => {
            subscript::build_subscript(ctx, &operands[0], &operands[1], span)
        }
        OperatorCode::Call => {
            let Some((callee, args)) = operands.split_first() else {
                return Err(invalid(op, "missing callee".to_string(), span));
            };
            call::build_call(ctx, callee, args, span)
        }
        OperatorCode::Dot | OperatorCode::Arrow => {
            let name = member::member_name(&operands[1], span)?;
            member::build_member_access(ctx, op, &operands[0], &name, span)
        }
        OperatorCode::DotStar | OperatorCode::ArrowStar => {
            member_pointer::build_member_pointer_access(ctx, op, &operands[0], &operands[1], span)
        }
        OperatorCode::New | OperatorCode::NewArray => {
            let Some((ty, rest)) = operands.split_first() else {
                return Err(invalid(op, "missing allocated type".to_string(), span));
            };
            let allocated = named_type(ty, span)?;
            let request = if op == OperatorCode::NewArray {
                let [length] = rest else {
                    return Err(invalid(op, "expected one array length".to_string(), span));
                };
                NewRequest::array(allocated, Rc::clone(length))
            } else {
                NewRequest::object(allocated).with_initializer(rest.to_vec())
            };
            allocation::build_new(ctx, &request, span)
        }
        OperatorCode::Delete | OperatorCode::DeleteArray => allocation::build_delete(
            ctx,
            &operands[0],
            op == OperatorCode::DeleteArray,
            span,
        ),
        OperatorCode::StaticCast
        | OperatorCode::DynamicCast
        | OperatorCode::ReinterpretCast
        | OperatorCode::ConstCast
        | OperatorCode::CStyleCast
        | OperatorCode::FunctionalCast => {
            let Some((ty, args)) = operands.split_first() else {
                return Err(invalid(op, "missing target type".to_string(), span));
            };
            let target = named_type(ty, span)?;
            let kind = CastKind::from_operator(op)
                .ok_or_else(|| invalid(op, "not a cast".to_string(), span))?;
            cast::build_cast(ctx, kind, &target, args, span)
        }
        OperatorCode::Conditional => {
            ternary::build_conditional(ctx, &operands[0], &operands[1], &operands[2], span)
        }
        OperatorCode::UnaryPlus
        | OperatorCode::UnaryMinus
        | OperatorCode::BitNot
        | OperatorCode::Indirection
        | OperatorCode::AddressOf => unary::build_unary(ctx, op, &operands[0], span),
        OperatorCode::PreIncrement
        | OperatorCode::PreDecrement
        | OperatorCode::PostIncrement
        | OperatorCode::PostDecrement => unary::build_increment(ctx, op, &operands[0], span),
        OperatorCode::SizeOf => unary::build_sizeof(ctx, &operands[0], span),
    }
}

fn build_comma(
    ctx: &mut SemaContext<'_>,
    lhs: &Rc<Operand>,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let operands = [Rc::clone(lhs), Rc::clone(rhs)];
    if let Some(node) =
        user_operator::try_user_operator(ctx, OperatorCode::Comma, &operands, span)?
    {
        return Ok(node);
    }
    value_type(lhs, span)?;
    let ty = value_type(rhs, span)?;
    Ok(Operand::expression(
        ExprKind::Binary {
            op: OperatorCode::Comma,
            lhs: Rc::clone(lhs),
            rhs: Rc::clone(rhs),
        },
        ty,
        rhs.is_lvalue(),
        span,
    ))
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn invalid(op: OperatorCode, detail: String, span: Span) -> SemaError {
    SemaError::InvalidOperands {
        op: op.spelling(),
        detail,
        span,
    }
}

/// Type of an operand used as a value.
pub(crate) fn value_type(operand: &Operand, span: Span) -> Result<TypeDescriptor> {
    match operand {
        Operand::Primary(_) | Operand::Expression(_) => operand
            .ty()
            .cloned()
            .ok_or_else(|| mismatch("operand has no type", span)),
        Operand::Type(t) => Err(mismatch(
            &format!("type '{}' used where a value is expected", t.ty),
            span,
        )),
        Operand::Overload(set) => Err(mismatch(
            &format!("reference to overloaded function '{}' could not be resolved", set.name),
            span,
        )),
        Operand::Error => Err(mismatch("invalid operand", span)),
    }
}

/// The type named by a type operand.
pub(crate) fn named_type(operand: &Operand, span: Span) -> Result<TypeDescriptor> {
    operand
        .named_type()
        .cloned()
        .ok_or_else(|| mismatch(&format!("'{operand}' does not name a type"), span))
}

pub(crate) fn mismatch(message: &str, span: Span) -> SemaError {
    SemaError::TypeMismatch {
        message: message.to_string(),
        span,
    }
}

/// The operand after array-to-pointer and function-to-pointer decay.
pub(crate) fn decayed(operand: &Rc<Operand>, span: Span) -> Result<Rc<Operand>> {
    let ty = value_type(operand, span)?;
    let step = if is_array(&ty) {
        ConversionStep::ArrayToPointer
    } else if is_function_type(&ty) {
        ConversionStep::FunctionToPointer
    } else {
        return Ok(Rc::clone(operand));
    };
    Ok(with_steps(operand, vec![PlannedStep::new(step, ty.decay())]))
}

/// Wrap `operand` in the given conversion steps.
pub(crate) fn with_steps(operand: &Rc<Operand>, steps: Vec<PlannedStep>) -> Rc<Operand> {
    let ty = steps
        .last()
        .map(|s| s.ty.clone())
        .or_else(|| operand.ty().cloned())
        .unwrap_or_else(TypeDescriptor::void);
    let outcome = ConversionOutcome::new(
        ConversionCategory::Standard,
        ty,
        ConversionPlan::steps(steps),
    );
    conversion::apply(operand, &outcome)
}

/// Implicit conversion (copy-initialization) of `operand` to `target`.
pub(crate) fn convert_to(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    target: &TypeDescriptor,
    span: Span,
) -> Result<Rc<Operand>> {
    AutoCastManager::new().convert(ctx, operand, target, ConversionMode::Copy, span)
}

/// Contextual conversion to `bool` (explicit conversion functions allowed).
pub(crate) fn to_bool(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    value_type(operand, span)?;
    AutoCastManager::new().convert(
        ctx,
        operand,
        &TypeDescriptor::bool(),
        ConversionMode::Direct,
        span,
    )
}

/// An lvalue that may be assigned to.
pub(crate) fn require_modifiable(
    operand: &Operand,
    context: &'static str,
    span: Span,
) -> Result<TypeDescriptor> {
    let ty = value_type(operand, span)?;
    if !operand.is_lvalue() {
        return Err(SemaError::NotAnLvalue { context, span });
    }
    let reason = match ty.outer() {
        Some(Layer::Array(_)) => Some("arrays are not assignable"),
        Some(Layer::Function(_)) => Some("functions are not assignable"),
        _ if ty.top_quals().is_const() => Some("the object is const-qualified"),
        _ => None,
    };
    match reason {
        Some(reason) => Err(SemaError::NotModifiable {
            target: operand.to_string(),
            reason,
            span,
        }),
        None => Ok(ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{Declaration, Severity, VariableEntry};
    use cxxfront_registry::SymbolRegistry;

    use crate::SemaOptions;

    fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
            Span::new(1, 1, name.len() as u32),
        )
    }

    #[test]
    fn error_operands_propagate_without_new_diagnostics() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let error = ctx.error();
        let mut builder = ExprBuilder::new(&mut ctx);
        let result = builder.build_expression(
            OperatorCode::Add,
            &[error, Operand::integer(1, Span::new(1, 5, 1))],
            Span::new(1, 1, 5),
        );
        assert!(result.is_error());
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn one_diagnostic_per_rejected_expression() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let text = Operand::type_name(TypeDescriptor::int(), Span::new(2, 1, 3));
        let result = builder.build_expression(
            OperatorCode::Add,
            &[text, Operand::integer(1, Span::new(2, 7, 1))],
            Span::new(2, 1, 7),
        );
        assert!(result.is_error());
        assert_eq!(ctx.diagnostics().error_count(), 1);
    }

    #[test]
    fn nothing_is_built_after_a_fatal_diagnostic() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        ctx.diagnostics_mut()
            .report(Severity::Fatal, Span::new(1, 1, 1), "no 'operator delete' available");
        let mut builder = ExprBuilder::new(&mut ctx);
        let result = builder.build_expression(
            OperatorCode::Add,
            &[Operand::integer(1, Span::synthetic()), Operand::integer(2, Span::synthetic())],
            Span::new(3, 1, 5),
        );
        assert!(result.is_error());
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_ne!(ctx.diagnostics().exit_code(), 0);
    }

    #[test]
    fn deep_nesting_is_reported_as_too_complex() {
        let registry = SymbolRegistry::new();
        let mut ctx =
            SemaContext::new(&registry).with_options(SemaOptions::default().with_max_depth(1));
        let mut builder = ExprBuilder::new(&mut ctx);
        let x = variable("x", TypeDescriptor::int());
        let y = variable("y", TypeDescriptor::primitive(cxxfront_core::PrimitiveKind::Double));
        let result = builder.build_expression(OperatorCode::Add, &[x, y], Span::new(4, 1, 5));
        assert!(result.is_error());
        assert!(
            ctx.diagnostics()
                .last()
                .is_some_and(|d| d.message.contains("too complex"))
        );
    }

    #[test]
    fn wrong_operand_count_is_rejected() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let result = builder.build_expression(
            OperatorCode::Mul,
            &[Operand::integer(1, Span::synthetic())],
            Span::new(1, 1, 1),
        );
        assert!(result.is_error());
        assert_eq!(ctx.diagnostics().error_count(), 1);
    }

    #[test]
    fn modifiable_lvalue_rules() {
        let x = variable("x", TypeDescriptor::int());
        assert!(require_modifiable(&x, "assignment", Span::synthetic()).is_ok());
        let c = variable(
            "c",
            TypeDescriptor::int().with_base_quals(cxxfront_core::Qualifiers::CONST),
        );
        assert!(matches!(
            require_modifiable(&c, "assignment", Span::synthetic()),
            Err(SemaError::NotModifiable { .. })
        ));
        let literal = Operand::integer(1, Span::synthetic());
        assert!(matches!(
            require_modifiable(&literal, "assignment", Span::synthetic()),
            Err(SemaError::NotAnLvalue { .. })
        ));
    }
}
