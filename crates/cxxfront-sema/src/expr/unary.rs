//! Prefix and postfix unary operators, address-of and `sizeof`.

use std::rc::Rc;

use cxxfront_core::{
    ConversionStep, Declaration, ExprKind, Operand, OperatorCode, PrimitiveKind, SemaError, Span,
    TypeDescriptor,
};
use tracing::trace;

use super::user_operator::{is_user_type, missing, try_user_operator};
use super::{
    Result, convert_to, decayed, invalid, mismatch, require_modifiable, value_type, with_steps,
};
use crate::SemaContext;
use crate::classify::{
    is_arithmetic, is_bool, is_class_type, is_enum, is_function_type, is_integral,
    is_object_pointer, is_pointer, is_void,
};
use crate::conversion::{PlannedStep, promote};

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_unary(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    if is_user_type(operand) {
        if let Some(node) = try_user_operator(ctx, op, std::slice::from_ref(operand), span)? {
            return Ok(node);
        }
        if op != OperatorCode::AddressOf && is_class_type(&value_type(operand, span)?) {
            return Err(missing(op, operand, span));
        }
    }
    match op {
        OperatorCode::AddressOf => address_of(operand, span),
        OperatorCode::Indirection => indirection(operand, span),
        _ => arithmetic(ctx, op, operand, span),
    }
}

/// `+e`, `-e`, `~e` on the promoted operand.
fn arithmetic(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let operand = decayed(operand, span)?;
    let ty = value_type(&operand, span)?;
    if op == OperatorCode::UnaryPlus && is_pointer(&ty) {
        return Ok(Operand::expression(
            ExprKind::Unary { op, operand },
            ty.unqualified(),
            false,
            span,
        ));
    }
    let (accepted, category) = if op == OperatorCode::BitNot {
        (is_integral(&ty), "integral")
    } else {
        (is_arithmetic(&ty), "arithmetic")
    };
    let promoted = promote(&ty)
        .filter(|_| accepted)
        .ok_or_else(|| invalid(op, format!("operand of type '{ty}' is not {category}"), span))?;
    let promoted = TypeDescriptor::primitive(promoted);
    let operand = convert_to(ctx, &operand, &promoted, span)?;
    Ok(Operand::expression(
        ExprKind::Unary { op, operand },
        promoted,
        false,
        span,
    ))
}

fn indirection(operand: &Rc<Operand>, span: Span) -> Result<Rc<Operand>> {
    let op = OperatorCode::Indirection;
    let operand = decayed(operand, span)?;
    let ty = value_type(&operand, span)?;
    let pointee = match ty.pointee() {
        Some(pointee) if is_pointer(&ty) => pointee,
        _ => {
            return Err(invalid(
                op,
                format!("indirection requires a pointer, not '{ty}'"),
                span,
            ));
        }
    };
    if is_void(&pointee) {
        return Err(invalid(op, format!("'{ty}' cannot be dereferenced"), span));
    }
    Ok(Operand::expression(
        ExprKind::Unary { op, operand },
        pointee,
        true,
        span,
    ))
}

/// `&e`: a pointer to an lvalue, a function pointer, or `&C::m`.
fn address_of(operand: &Rc<Operand>, span: Span) -> Result<Rc<Operand>> {
    let op = OperatorCode::AddressOf;
    if let Some(set) = operand.as_overload() {
        let [function] = set.candidates.as_slice() else {
            // Resolved later against the target type.
            trace!(name = %set.name, candidates = set.candidates.len(), "address of overload set");
            return Ok(Rc::clone(operand));
        };
        if set.object.is_some() && function.has_implicit_object() {
            return Err(mismatch(
                &format!("cannot take the address of bound member function '{function}'"),
                span,
            ));
        }
        let designator = Operand::identifier(Declaration::Function(Rc::clone(function)), span);
        return Ok(with_steps(
            &designator,
            vec![PlannedStep::new(
                ConversionStep::FunctionToPointer,
                function.address_type(),
            )],
        ));
    }
    if let Some(Declaration::Variable(variable)) = operand.declaration() {
        if let (Some(owner), true) = (&variable.owner, variable.is_instance_member()) {
            let ty = variable.ty.member_pointer_to(owner.clone());
            return Ok(Operand::expression(
                ExprKind::Unary {
                    op,
                    operand: Rc::clone(operand),
                },
                ty,
                false,
                span,
            ));
        }
    }
    if let Some(Declaration::Function(function)) = operand.declaration() {
        return Ok(with_steps(
            operand,
            vec![PlannedStep::new(
                ConversionStep::FunctionToPointer,
                function.address_type(),
            )],
        ));
    }
    let ty = value_type(operand, span)?;
    if !operand.is_lvalue() {
        return Err(SemaError::NotAnLvalue {
            context: "taking the address",
            span,
        });
    }
    let pointer = ty
        .try_pointer_to()
        .ok_or_else(|| invalid(op, format!("cannot form a pointer to '{ty}'"), span))?;
    Ok(Operand::expression(
        ExprKind::Unary {
            op,
            operand: Rc::clone(operand),
        },
        pointer,
        false,
        span,
    ))
}

// ============================================================================
// Increment and decrement
// ============================================================================

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_increment(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    if is_user_type(operand) {
        if let Some(node) = try_user_operator(ctx, op, std::slice::from_ref(operand), span)? {
            return Ok(node);
        }
        if is_class_type(&value_type(operand, span)?) {
            return Err(missing(op, operand, span));
        }
    }
    let decrement = matches!(op, OperatorCode::PreDecrement | OperatorCode::PostDecrement);
    let context = if decrement { "decrement" } else { "increment" };
    let ty = require_modifiable(operand, context, span)?;
    let accepted = if is_pointer(&ty) {
        is_object_pointer(&ty)
    } else {
        is_arithmetic(&ty) && !is_enum(&ty) && !(decrement && is_bool(&ty))
    };
    if !accepted {
        return Err(invalid(op, format!("cannot {context} a value of type '{ty}'"), span));
    }
    let prefix = matches!(op, OperatorCode::PreIncrement | OperatorCode::PreDecrement);
    let ty = if prefix { ty } else { ty.unqualified() };
    Ok(Operand::expression(
        ExprKind::Unary {
            op,
            operand: Rc::clone(operand),
        },
        ty,
        prefix,
        span,
    ))
}

// ============================================================================
// sizeof
// ============================================================================

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_sizeof(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let measured = match operand.named_type() {
        Some(ty) => ty.strip_reference(),
        None => value_type(operand, span)?,
    };
    if is_function_type(&measured) {
        return Err(SemaError::Structural {
            message: "invalid application of 'sizeof' to a function type".to_string(),
            span,
        });
    }
    let Some(bytes) = ctx.registry().size_of(&measured) else {
        return Err(SemaError::Structural {
            message: format!("invalid application of 'sizeof' to an incomplete type '{measured}'"),
            span,
        });
    };
    Ok(Operand::expression(
        ExprKind::SizeOf {
            measured,
            bytes: Some(bytes),
        },
        TypeDescriptor::primitive(PrimitiveKind::UnsignedLong),
        false,
        span,
    ))
}
