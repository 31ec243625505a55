//! Function calls.
//!
//! ## Algorithm
//!
//! - An overload set is resolved against the arguments (and its implicit
//!   object, if any) and called directly.
//! - A value of function or pointer-to-function type is called indirectly;
//!   each argument is copy-initialized to its parameter and arguments
//!   matched by an ellipsis get the default promotions.
//! - A class object is called through its `operator()`.

use std::rc::Rc;

use cxxfront_core::{
    CallExpr, Callee, ExprKind, FunctionEntry, FunctionPrototype, Operand, OperatorCode,
    SemaError, Span, TypeDescriptor,
};
use tracing::trace;

use super::user_operator::{missing, try_user_operator};
use super::{Result, convert_to, decayed, mismatch, value_type};
use crate::SemaContext;
use crate::classify::{is_class_type, is_function_pointer, is_function_type};
use crate::names::implicit_object;
use crate::overload;

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_call(
    ctx: &mut SemaContext<'_>,
    callee: &Rc<Operand>,
    args: &[Rc<Operand>],
    span: Span,
) -> Result<Rc<Operand>> {
    if callee.as_overload().is_some() {
        return call_overloaded(ctx, callee, args, span);
    }
    let ty = value_type(callee, span)?;
    if is_class_type(&ty) {
        let operands: Vec<Rc<Operand>> = std::iter::once(Rc::clone(callee))
            .chain(args.iter().cloned())
            .collect();
        return try_user_operator(ctx, OperatorCode::Call, &operands, span)?
            .ok_or_else(|| missing(OperatorCode::Call, callee, span));
    }
    if is_function_type(&ty) || is_function_pointer(&ty) {
        return call_indirect(ctx, callee, &ty, args, span);
    }
    Err(mismatch(
        &format!("called object of type '{ty}' is not a function"),
        span,
    ))
}

fn call_overloaded(
    ctx: &mut SemaContext<'_>,
    callee: &Rc<Operand>,
    args: &[Rc<Operand>],
    span: Span,
) -> Result<Rc<Operand>> {
    let Some(set) = callee.as_overload() else {
        return Err(mismatch("callee is not a function", span));
    };
    let object = set
        .object
        .clone()
        .or_else(|| enclosing_object(ctx, &set.candidates, span));
    let result = overload::resolve(ctx, &set.candidates, args, object.as_ref());
    let selection = overload::select(ctx, &set.name, result, args, object.as_ref(), span)?;
    let function = Rc::clone(&selection.function);
    let object = if function.has_implicit_object() {
        let Some(object) = object else {
            return Err(mismatch(
                &format!("cannot call member function '{function}' without an object"),
                span,
            ));
        };
        Some(object)
    } else {
        None
    };
    let args = overload::convert_arguments(&selection, args);
    trace!(function = %function, args = args.len(), "call resolved");
    Ok(Operand::expression(
        ExprKind::Call(CallExpr {
            callee: Callee::Direct(Rc::clone(&function)),
            object,
            args,
        }),
        function.return_type.clone(),
        false,
        span,
    ))
}

/// `*this` for a qualified call `Base::f()` made from a member function of
/// `Base` or a class derived from it.
fn enclosing_object(
    ctx: &SemaContext<'_>,
    candidates: &[Rc<FunctionEntry>],
    span: Span,
) -> Option<Rc<Operand>> {
    let class = ctx.scope().class.as_ref()?;
    let hierarchy = ctx.registry().hierarchy();
    candidates
        .iter()
        .filter(|f| f.has_implicit_object())
        .filter_map(|f| f.owner.as_ref())
        .any(|owner| owner == class || hierarchy.is_derived_from(class, owner))
        .then(|| implicit_object(ctx, class, span))
}

fn call_indirect(
    ctx: &mut SemaContext<'_>,
    callee: &Rc<Operand>,
    ty: &TypeDescriptor,
    args: &[Rc<Operand>],
    span: Span,
) -> Result<Rc<Operand>> {
    let (target, function) = if is_function_type(ty) {
        (Rc::clone(callee), ty.clone())
    } else {
        let pointee = ty
            .pointee()
            .ok_or_else(|| mismatch(&format!("'{ty}' does not point to a function"), span))?;
        (decayed(callee, span)?, pointee)
    };
    let (Some(prototype), Some(return_type)) =
        (function.function_prototype().cloned(), function.return_type())
    else {
        return Err(mismatch(&format!("'{ty}' is not callable"), span));
    };
    check_arity(&prototype, ty, args.len(), span)?;

    let mut converted = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        let arg = match prototype.params.get(index) {
            Some(param) => convert_to(ctx, arg, param, span)?,
            None => overload::promote_variadic(arg),
        };
        converted.push(arg);
    }
    Ok(Operand::expression(
        ExprKind::Call(CallExpr {
            callee: Callee::Indirect(target),
            object: None,
            args: converted,
        }),
        return_type,
        false,
        span,
    ))
}

fn check_arity(
    prototype: &FunctionPrototype,
    ty: &TypeDescriptor,
    count: usize,
    span: Span,
) -> Result<()> {
    let expected = prototype.params.len();
    let problem = if count < expected {
        "too few"
    } else if count > expected && !prototype.has_ellipsis {
        "too many"
    } else {
        return Ok(());
    };
    Err(SemaError::TypeMismatch {
        message: format!(
            "{problem} arguments in call through '{ty}': expected {expected}, got {count}"
        ),
        span,
    })
}
