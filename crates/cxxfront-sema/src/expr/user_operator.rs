//! Operator functions declared for class and enumeration operands.
//!
//! Candidates are the member operator functions of the left operand's class
//! plus the namespace-scope operator functions visible from the current
//! scope or declared next to an operand's type. `=`, `[]`, `()` and `->`
//! only have member candidates.

use std::rc::Rc;

use cxxfront_core::{
    CallExpr, Callee, ExprKind, FunctionEntry, Operand, OperatorCode, QualifiedName, SemaError,
    Span, TypeDescriptor,
};
use rustc_hash::FxHashSet;
use tracing::trace;

use super::Result;
use crate::SemaContext;
use crate::names;
use crate::overload::{self, OverloadResult};

/// The operand has a class or enumeration type.
pub(crate) fn is_user_type(operand: &Operand) -> bool {
    operand
        .ty()
        .is_some_and(|ty| ty.is_bare() && (ty.class_id().is_some() || ty.enum_id().is_some()))
}

fn member_only(op: OperatorCode) -> bool {
    matches!(
        op,
        OperatorCode::Assign | OperatorCode::Subscript | OperatorCode::Call | OperatorCode::Arrow
    )
}

fn is_postfix(op: OperatorCode) -> bool {
    matches!(op, OperatorCode::PostIncrement | OperatorCode::PostDecrement)
}

/// Call the operator function for `op` applied to `operands`.
///
/// `Ok(None)` when no operand has a user type, or no operator function is
/// declared or viable; the caller then applies the built-in rules.
pub(crate) fn try_user_operator(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    operands: &[Rc<Operand>],
    span: Span,
) -> Result<Option<Rc<Operand>>> {
    if !operands.iter().any(|o| is_user_type(o)) {
        return Ok(None);
    }
    let Some(name) = op.function_name() else {
        return Ok(None);
    };
    let mut operands = operands.to_vec();
    if is_postfix(op) {
        // `operator++(int)` tells the postfix form apart.
        operands.push(Operand::integer(0, span));
    }

    let candidates = candidates(ctx, op, name, &operands, span)?;
    if candidates.is_empty() {
        return Ok(None);
    }
    let result = overload::resolve_operator(ctx, &candidates, &operands);
    if matches!(result, OverloadResult::NotFound) {
        trace!(operator = name, "no viable operator function");
        return Ok(None);
    }
    let selection = overload::select(ctx, name, result, &operands, operands.first(), span)?;
    let function = Rc::clone(&selection.function);
    let (object, args) = if function.has_implicit_object() {
        let rest = &operands[1..];
        (
            Some(Rc::clone(&operands[0])),
            overload::convert_arguments(&selection, rest),
        )
    } else {
        (None, overload::convert_arguments(&selection, &operands))
    };
    trace!(function = %function, "operator function selected");
    Ok(Some(Operand::expression(
        ExprKind::Call(CallExpr {
            callee: Callee::Direct(Rc::clone(&function)),
            object,
            args,
        }),
        function.return_type.clone(),
        false,
        span,
    )))
}

fn candidates(
    ctx: &SemaContext<'_>,
    op: OperatorCode,
    name: &str,
    operands: &[Rc<Operand>],
    span: Span,
) -> Result<Vec<Rc<FunctionEntry>>> {
    let registry = ctx.registry();
    let count = operands.len();
    let mut seen = FxHashSet::default();
    let mut found = Vec::new();

    let left_class = operands
        .first()
        .and_then(|o| o.ty())
        .filter(|ty| ty.is_bare())
        .and_then(TypeDescriptor::class_id);
    if let Some(class) = left_class {
        let members = registry.lookup_in_class(class, name);
        if !members.is_empty() {
            for entry in names::reduce(registry, members, name, span)? {
                if let Some(function) = entry.decl.as_function() {
                    if function.accepts_arg_count(count - 1) && seen.insert(function.hash) {
                        found.push(Rc::clone(function));
                    }
                }
            }
        }
    }
    if member_only(op) {
        return Ok(found);
    }

    let mut namespaces: Vec<Vec<String>> = Vec::new();
    if let Some(visible) = ctx
        .scope()
        .enclosing_namespaces()
        .find(|ns| !registry.lookup_in_namespace(ns, name).is_empty())
    {
        namespaces.push(visible.to_vec());
    }
    for operand in operands {
        if let Some(namespace) = operand.ty().and_then(declaring_namespace) {
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }
    }
    for namespace in &namespaces {
        for entry in registry.lookup_in_namespace(namespace, name) {
            if let Some(function) = entry.decl.as_function() {
                if function.owner.is_none()
                    && function.accepts_arg_count(count)
                    && seen.insert(function.hash)
                {
                    found.push(Rc::clone(function));
                }
            }
        }
    }
    Ok(found)
}

/// Namespace a class or enumeration type is declared in.
fn declaring_namespace(ty: &TypeDescriptor) -> Option<Vec<String>> {
    if !ty.is_bare() {
        return None;
    }
    let name = match (ty.class_id(), ty.enum_id()) {
        (Some(class), _) => class.name(),
        (None, Some(enumeration)) => enumeration.name(),
        (None, None) => return None,
    };
    Some(QualifiedName::from(name).qualifier)
}

/// The built-in operator does not apply and no operator function exists.
pub(crate) fn missing(op: OperatorCode, operand: &Operand, span: Span) -> SemaError {
    SemaError::MissingOperator {
        operator: op
            .function_name()
            .map_or_else(|| op.spelling().to_string(), str::to_string),
        ty: operand
            .ty()
            .map_or_else(|| operand.to_string(), ToString::to_string),
        span,
    }
}
