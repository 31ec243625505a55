//! Relational and equality operators.
//!
//! Arithmetic pairs meet at their usual arithmetic type; pointer pairs
//! (including a null pointer constant and `void*`) meet at the composite
//! pointer type. Member pointers only compare for equality. The result is
//! always a `bool` rvalue.

use std::rc::Rc;

use cxxfront_core::{ExprKind, Operand, OperatorCode, Span, TypeDescriptor};

use super::user_operator::{missing, try_user_operator};
use super::{Result, convert_to, decayed, invalid, value_type};
use crate::SemaContext;
use crate::classify::{is_arithmetic, is_class_type, is_member_pointer};
use crate::conversion::{composite_pointer_type, usual_arithmetic};

pub(super) fn build_comparison(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    lhs: &Rc<Operand>,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let operands = [Rc::clone(lhs), Rc::clone(rhs)];
    if let Some(node) = try_user_operator(ctx, op, &operands, span)? {
        return Ok(node);
    }
    let lhs = decayed(lhs, span)?;
    let rhs = decayed(rhs, span)?;
    let (lt, rt) = (value_type(&lhs, span)?, value_type(&rhs, span)?);
    if is_class_type(&lt) {
        return Err(missing(op, &lhs, span));
    }
    if is_class_type(&rt) {
        return Err(missing(op, &rhs, span));
    }

    let common = if is_arithmetic(&lt) && is_arithmetic(&rt) {
        usual_arithmetic(&lt, &rt).map(TypeDescriptor::primitive)
    } else {
        composite_pointer_type(ctx, &lhs, &rhs)
    };
    let Some(common) = common else {
        return Err(invalid(op, format!("cannot compare '{lt}' and '{rt}'"), span));
    };
    if is_member_pointer(&common) && !matches!(op, OperatorCode::Eq | OperatorCode::Ne) {
        return Err(invalid(
            op,
            format!("member pointers of type '{common}' are only equality-comparable"),
            span,
        ));
    }
    let lhs = convert_to(ctx, &lhs, &common, span)?;
    let rhs = convert_to(ctx, &rhs, &common, span)?;
    Ok(Operand::expression(
        ExprKind::Binary { op, lhs, rhs },
        TypeDescriptor::bool(),
        false,
        span,
    ))
}
