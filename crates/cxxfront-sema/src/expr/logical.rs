//! `&&`, `||` and `!`: operands are contextually converted to `bool`.

use std::rc::Rc;

use cxxfront_core::{ExprKind, Operand, OperatorCode, Span, TypeDescriptor};

use super::user_operator::try_user_operator;
use super::{Result, to_bool};
use crate::SemaContext;

pub(super) fn build_logical(
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
    let lhs = to_bool(ctx, lhs, span)?;
    let rhs = to_bool(ctx, rhs, span)?;
    Ok(Operand::expression(
        ExprKind::Binary { op, lhs, rhs },
        TypeDescriptor::bool(),
        false,
        span,
    ))
}

pub(super) fn build_not(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let op = OperatorCode::LogicalNot;
    if let Some(node) = try_user_operator(ctx, op, std::slice::from_ref(operand), span)? {
        return Ok(node);
    }
    let operand = to_bool(ctx, operand, span)?;
    Ok(Operand::expression(
        ExprKind::Unary { op, operand },
        TypeDescriptor::bool(),
        false,
        span,
    ))
}
