//! `object.*pm` and `pointer->*pm`.
//!
//! The right operand is a `T C::*`. The object's class must be `C` or a
//! class with `C` as an unambiguous, accessible base. A data member yields
//! an lvalue qualified like the object; a member function yields a bound
//! function that can only be called.

use std::rc::Rc;

use cxxfront_core::{ExprKind, Layer, Operand, OperatorCode, SemaError, Span};

use super::{Result, invalid, value_type};
use crate::SemaContext;
use crate::classify::{is_function_type, is_pointer};
use crate::conversion::base_path;

pub(super) fn build_member_pointer_access(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    lhs: &Rc<Operand>,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let member_ty = value_type(rhs, span)?;
    let Some(Layer::MemberPointer { class: member_class, .. }) = member_ty.outer().cloned() else {
        return Err(invalid(
            op,
            format!("right operand of type '{member_ty}' is not a pointer to member"),
            span,
        ));
    };
    let object_ty = value_type(lhs, span)?;
    let (class_ty, object_lvalue) = match op {
        OperatorCode::ArrowStar if is_pointer(&object_ty) => match object_ty.pointee() {
            Some(pointee) => (pointee, true),
            None => return Err(invalid(op, format!("'{object_ty}' has no pointee"), span)),
        },
        OperatorCode::DotStar => (object_ty.clone(), lhs.is_lvalue()),
        _ => {
            return Err(invalid(
                op,
                format!("left operand of type '{object_ty}' is not a pointer to a class"),
                span,
            ));
        }
    };
    let Some(object_class) = class_ty.class_id() else {
        return Err(invalid(op, format!("'{class_ty}' is not a class"), span));
    };
    if object_class != &member_class
        && base_path(ctx, object_class, &member_class)
            .map_err(|e| e.or_span(span))?
            .is_none()
    {
        return Err(invalid(
            op,
            format!("'{member_ty}' is not a member of '{object_class}'"),
            span,
        ));
    }

    let Some(member) = member_ty.pointee() else {
        return Err(invalid(op, format!("'{member_ty}' has no member type"), span));
    };
    let quals = class_ty.top_quals();
    if is_function_type(&member) {
        let cv = member
            .function_prototype()
            .map(|p| p.cv)
            .unwrap_or_default();
        if !cv.at_least(quals) {
            return Err(SemaError::TypeMismatch {
                message: format!("'{member_ty}' cannot be called on a '{class_ty}' object"),
                span,
            });
        }
        return Ok(Operand::expression(
            ExprKind::Binary {
                op,
                lhs: Rc::clone(lhs),
                rhs: Rc::clone(rhs),
            },
            member,
            false,
            span,
        ));
    }
    let is_lvalue = member.is_reference() || object_lvalue;
    let ty = if member.is_reference() {
        member
    } else {
        member.add_top_quals(quals)
    };
    Ok(Operand::expression(
        ExprKind::Binary {
            op,
            lhs: Rc::clone(lhs),
            rhs: Rc::clone(rhs),
        },
        ty,
        is_lvalue,
        span,
    ))
}
