//! Member selection: `object.member` and `pointer->member`.
//!
//! ## Algorithm
//!
//! 1. `->` on a class object calls its `operator->` and repeats on the
//!    result, one nesting level per call, until a pointer to a class
//!    appears. `.` takes a class object directly.
//! 2. The class must be complete. A qualified member name (`obj.Base::m`)
//!    needs a qualifier that is the object's class or one of its bases.
//! 3. Member lookup runs through the class and its bases and reduces the
//!    result. Functions stay an overload set bound to the object. Data
//!    members are access-checked and take the object's qualification.

use std::rc::Rc;

use cxxfront_core::{
    ClassId, Declaration, ExprKind, FunctionEntry, Operand, OperatorCode, QualifiedName,
    SemaError, Span, TypeDescriptor,
};
use tracing::trace;

use super::user_operator::{missing, try_user_operator};
use super::{Result, invalid, mismatch, value_type};
use crate::SemaContext;
use crate::access::{MemberRef, check_member};
use crate::classify::is_pointer;
use crate::names;

/// The member name carried by the right operand of `.` / `->` when the
/// caller passes an already-resolved member.
pub(super) fn member_name(operand: &Operand, span: Span) -> Result<QualifiedName> {
    if let Some(set) = operand.as_overload() {
        let owner = set.candidates.first().and_then(|f| f.owner.as_ref());
        return Ok(match owner {
            Some(owner) if set.qualified => QualifiedName::from(owner.name()).child(&set.name),
            _ => QualifiedName::global(&set.name),
        });
    }
    match operand.declaration() {
        Some(decl) => Ok(match decl.owner() {
            Some(owner) => QualifiedName::from(owner.name()).child(decl.name()),
            None => QualifiedName::global(decl.name()),
        }),
        None => Err(mismatch(&format!("'{operand}' does not name a member"), span)),
    }
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_member_access(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    object: &Rc<Operand>,
    name: &QualifiedName,
    span: Span,
) -> Result<Rc<Operand>> {
    let (base, class_ty, lvalue) = match op {
        OperatorCode::Arrow => {
            let pointer = arrow_target(ctx, object, span)?;
            let pointee = pointer
                .ty()
                .and_then(TypeDescriptor::pointee)
                .ok_or_else(|| invalid(op, "expected a pointer".to_string(), span))?;
            (pointer, pointee, true)
        }
        OperatorCode::Dot => {
            let ty = value_type(object, span)?;
            if ty.class_id().is_none() {
                return Err(invalid(
                    op,
                    format!("member reference base type '{ty}' is not a class"),
                    span,
                ));
            }
            (Rc::clone(object), ty, object.is_lvalue())
        }
        _ => return Err(invalid(op, "not a member access".to_string(), span)),
    };
    let Some(class) = class_ty.class_id().cloned() else {
        return Err(invalid(op, format!("'{class_ty}' is not a class"), span));
    };
    let complete = ctx
        .registry()
        .class_graph(class.hash())
        .is_some_and(|view| view.is_complete());
    if !complete {
        return Err(SemaError::Structural {
            message: format!("member access into incomplete type '{class}'"),
            span,
        });
    }

    let naming = if name.is_global() {
        class.clone()
    } else {
        qualifier_class(ctx, name, &class, span)?
    };
    let entries = names::lookup_member(ctx, &naming, &name.name, span)?;
    trace!(class = %class, member = %name, found = entries.len(), "member lookup");

    let functions: Vec<Rc<FunctionEntry>> = entries
        .iter()
        .filter_map(|e| e.decl.as_function().cloned())
        .collect();
    let quals = class_ty.top_quals();
    let object_value = match op {
        OperatorCode::Arrow => Operand::expression(
            ExprKind::Unary {
                op: OperatorCode::Indirection,
                operand: Rc::clone(&base),
            },
            class_ty.clone(),
            true,
            span,
        ),
        _ => Rc::clone(&base),
    };
    if !functions.is_empty() && functions.len() == entries.len() {
        return Ok(Operand::overloads(
            name.name.clone(),
            functions,
            Some(object_value),
            !name.is_global(),
            span,
        ));
    }

    let Some(entry) = entries.into_iter().next() else {
        return Err(SemaError::UnknownMember {
            class: class.to_string(),
            name: name.to_string(),
            span,
        });
    };
    let member = if entry.decl.is_shared_member() {
        MemberRef::new(entry.decl.clone())
    } else {
        MemberRef::through_object(entry.decl.clone(), class.clone())
    };
    check_member(ctx, &member, &naming, span)?;

    match &entry.decl {
        Declaration::Variable(variable) => {
            let (ty, is_lvalue) = if variable.ty.is_reference() {
                (variable.ty.strip_reference(), true)
            } else if variable.is_instance_member() {
                (variable.ty.add_top_quals(quals), lvalue)
            } else {
                (variable.ty.clone(), true)
            };
            Ok(Operand::expression(
                ExprKind::Member {
                    op,
                    object: base,
                    member: entry.decl.clone(),
                },
                ty,
                is_lvalue,
                span,
            ))
        }
        Declaration::EnumConstant(_) => Ok(Operand::identifier(entry.decl, span)),
        other => Err(mismatch(
            &format!("'{}' is a type, not a member value", other.name()),
            span,
        )),
    }
}

/// Follow `operator->` until a pointer to a class appears.
fn arrow_target(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let ty = value_type(operand, span)?;
    if is_pointer(&ty) {
        if ty.pointee().is_some_and(|p| p.class_id().is_some()) {
            return Ok(Rc::clone(operand));
        }
        return Err(invalid(
            OperatorCode::Arrow,
            format!("'{ty}' is not a pointer to a class"),
            span,
        ));
    }
    if ty.class_id().is_none() {
        return Err(invalid(
            OperatorCode::Arrow,
            format!("member reference type '{ty}' is not a pointer"),
            span,
        ));
    }
    let called = try_user_operator(ctx, OperatorCode::Arrow, std::slice::from_ref(operand), span)?
        .ok_or_else(|| missing(OperatorCode::Arrow, operand, span))?;
    trace!(through = %ty, "chained operator->");
    ctx.nested(span, |ctx| arrow_target(ctx, &called, span))
}

/// The class named by the qualifier of `name`, checked against `class`.
fn qualifier_class(
    ctx: &SemaContext<'_>,
    name: &QualifiedName,
    class: &ClassId,
    span: Span,
) -> Result<ClassId> {
    let Some((last, outer)) = name.qualifier.split_last() else {
        return Ok(class.clone());
    };
    let prefix = QualifiedName::new(last.clone(), outer.to_vec());
    let registry = ctx.registry();
    let found = registry.lookup(&prefix, ctx.scope());
    let qualifier = found.iter().find_map(|e| match &e.decl {
        Declaration::Class(id) => Some(id.clone()),
        Declaration::Function(f) if f.is_constructor() => f.owner.clone(),
        _ => None,
    });
    let Some(qualifier) = qualifier else {
        return Err(mismatch(&format!("'{prefix}' is not a class"), span));
    };
    if &qualifier == class || registry.hierarchy().is_derived_from(class, &qualifier) {
        Ok(qualifier)
    } else {
        Err(mismatch(
            &format!("'{qualifier}' is not a base of '{class}'"),
            span,
        ))
    }
}
