//! `=` and the compound assignments.
//!
//! ## Algorithm
//!
//! - Class targets use `operator=` / `operator@=`. Without a viable one,
//!   plain `=` falls back to the implicit copy assignment when the right
//!   operand converts to `const C&`.
//! - Scalar targets must be modifiable lvalues. `=` converts the right
//!   operand to the target type. A compound form checks the underlying
//!   binary operator; pointer targets only take `+=` and `-=` with an
//!   integral operand.
//!
//! The result is the target, as an lvalue.

use std::rc::Rc;

use cxxfront_core::{ExprKind, Operand, OperatorCode, Qualifiers, SemaError, Span, TypeDescriptor};

use super::arithmetic;
use super::user_operator::{missing, try_user_operator};
use super::{Result, convert_to, invalid, require_modifiable, value_type};
use crate::SemaContext;
use crate::classify::{is_class_type, is_enum, is_floating, is_integral, is_pointer};

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_assignment(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    lhs: &Rc<Operand>,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let target = value_type(lhs, span)?;
    if is_class_type(&target) {
        return assign_class(ctx, op, lhs, &target, rhs, span);
    }
    let ty = require_modifiable(lhs, "assignment", span)?;
    let value = value_type(rhs, span)?;

    let converted = match op.compound_base() {
        None => convert_to(ctx, rhs, &ty.unqualified(), span)?,
        Some(base) => {
            if is_enum(&ty) {
                return Err(invalid(
                    op,
                    format!("the result of '{}' cannot be stored in '{ty}'", base.spelling()),
                    span,
                ));
            }
            if is_pointer(&ty) && !(matches!(base, OperatorCode::Add | OperatorCode::Sub)
                && is_integral(&value))
            {
                return Err(invalid(
                    op,
                    format!("'{ty}' only takes '+=' and '-=' with an integral operand"),
                    span,
                ));
            }
            arithmetic::builtin(ctx, base, lhs, rhs, span)?.rhs
        }
    };
    if ctx.options().warn_float_narrowing && is_integral(&ty) && is_floating(&value) {
        ctx.warn(
            span,
            format!("implicit conversion from '{value}' to '{ty}' may lose precision"),
        );
    }
    Ok(Operand::expression(
        ExprKind::Binary {
            op,
            lhs: Rc::clone(lhs),
            rhs: converted,
        },
        ty,
        true,
        span,
    ))
}

fn assign_class(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    lhs: &Rc<Operand>,
    target: &TypeDescriptor,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let operands = [Rc::clone(lhs), Rc::clone(rhs)];
    if let Some(node) = try_user_operator(ctx, op, &operands, span)? {
        return Ok(node);
    }
    if op != OperatorCode::Assign {
        return Err(missing(op, lhs, span));
    }
    let ty = require_modifiable(lhs, "assignment", span)?;
    let source = target
        .unqualified()
        .with_base_quals(Qualifiers::CONST)
        .reference_to();
    let converted = match convert_to(ctx, rhs, &source, span) {
        Ok(converted) => converted,
        Err(SemaError::NoConversion { .. }) => return Err(missing(op, lhs, span)),
        Err(other) => return Err(other),
    };
    Ok(Operand::expression(
        ExprKind::Binary {
            op,
            lhs: Rc::clone(lhs),
            rhs: converted,
        },
        ty,
        true,
        span,
    ))
}
