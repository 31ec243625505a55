//! Binary arithmetic, bitwise and shift operators.
//!
//! ## Algorithm
//!
//! 1. Class and enumeration operands try their operator functions.
//! 2. `+` and `-` with a pointer operand follow the pointer rules: an
//!    object pointer plus or minus an integral value keeps the pointer type,
//!    and the difference of two compatible pointers is `unsigned long`.
//! 3. Otherwise both operands undergo the usual arithmetic conversions.
//!    Shifts convert each operand by promotion alone and take the promoted
//!    left type. `%` and the bitwise operators need integral operands.

use std::rc::Rc;

use cxxfront_core::{
    ExprKind, Literal, Operand, OperatorCode, PrimitiveKind, Span, TypeDescriptor,
};
use tracing::trace;

use super::user_operator::{missing, try_user_operator};
use super::{Result, convert_to, decayed, invalid, value_type};
use crate::SemaContext;
use crate::classify::{is_class_type, is_integral, is_object_pointer, is_pointer};
use crate::constant;
use crate::conversion::{promote, usual_arithmetic};

/// Operands converted for a built-in operator, and the result type.
pub(super) struct Converted {
    pub lhs: Rc<Operand>,
    pub rhs: Rc<Operand>,
    pub ty: TypeDescriptor,
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_binary(
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
    let converted = builtin(ctx, op, lhs, rhs, span)?;
    Ok(Operand::expression(
        ExprKind::Binary {
            op,
            lhs: converted.lhs,
            rhs: converted.rhs,
        },
        converted.ty,
        false,
        span,
    ))
}

/// Check and convert the operands of the built-in `op`.
pub(super) fn builtin(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    lhs: &Rc<Operand>,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Converted> {
    let lhs = decayed(lhs, span)?;
    let rhs = decayed(rhs, span)?;
    let (lt, rt) = (value_type(&lhs, span)?, value_type(&rhs, span)?);
    if is_class_type(&lt) {
        return Err(missing(op, &lhs, span));
    }
    if is_class_type(&rt) {
        return Err(missing(op, &rhs, span));
    }
    if matches!(op, OperatorCode::Add | OperatorCode::Sub) && (is_pointer(&lt) || is_pointer(&rt)) {
        return pointer_arithmetic(ctx, op, lhs, &lt, rhs, &rt, span);
    }

    let Some(common) = usual_arithmetic(&lt, &rt) else {
        return Err(invalid(op, format!("'{lt}' and '{rt}'"), span));
    };
    if op.requires_integral() && !common.is_integral() {
        return Err(invalid(
            op,
            format!("operands must be integral, not '{lt}' and '{rt}'"),
            span,
        ));
    }
    if matches!(op, OperatorCode::Div | OperatorCode::Mod)
        && ctx.options().warn_division_by_zero
        && is_literal_zero(&rhs)
    {
        ctx.warn(span, "division by zero");
    }

    if matches!(op, OperatorCode::Shl | OperatorCode::Shr) {
        let (Some(left), Some(right)) = (promote(&lt), promote(&rt)) else {
            return Err(invalid(op, format!("'{lt}' and '{rt}'"), span));
        };
        let ty = TypeDescriptor::primitive(left);
        return Ok(Converted {
            lhs: convert_to(ctx, &lhs, &ty, span)?,
            rhs: convert_to(ctx, &rhs, &TypeDescriptor::primitive(right), span)?,
            ty,
        });
    }

    let ty = TypeDescriptor::primitive(common);
    trace!(op = %op, common = %ty, "usual arithmetic conversions");
    Ok(Converted {
        lhs: convert_to(ctx, &lhs, &ty, span)?,
        rhs: convert_to(ctx, &rhs, &ty, span)?,
        ty,
    })
}

fn is_literal_zero(operand: &Rc<Operand>) -> bool {
    let operand = Operand::innermost(operand);
    match operand.literal_value() {
        Some(Literal::Float(value)) => value.0 == 0.0,
        _ => constant::is_zero(operand),
    }
}

fn pointer_arithmetic(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    lhs: Rc<Operand>,
    lt: &TypeDescriptor,
    rhs: Rc<Operand>,
    rt: &TypeDescriptor,
    span: Span,
) -> Result<Converted> {
    if is_pointer(lt) && is_pointer(rt) {
        if op == OperatorCode::Add {
            return Err(invalid(op, format!("cannot add '{lt}' and '{rt}'"), span));
        }
        let (Some(a), Some(b)) = (lt.pointee(), rt.pointee()) else {
            return Err(invalid(op, format!("'{lt}' and '{rt}'"), span));
        };
        if !is_object_pointer(lt) || !compatible_pointees(ctx, &a, &b) {
            return Err(invalid(
                op,
                format!("'{lt}' and '{rt}' point to unrelated types"),
                span,
            ));
        }
        return Ok(Converted {
            lhs,
            rhs,
            ty: TypeDescriptor::primitive(PrimitiveKind::UnsignedLong),
        });
    }

    let (pointer_ty, offset_ty, pointer_on_left) = if is_pointer(lt) {
        (lt, rt, true)
    } else {
        (rt, lt, false)
    };
    if op == OperatorCode::Sub && !pointer_on_left {
        return Err(invalid(op, format!("cannot subtract '{rt}' from '{lt}'"), span));
    }
    if !is_object_pointer(pointer_ty) {
        return Err(invalid(
            op,
            format!("arithmetic on '{pointer_ty}' requires a pointer to an object type"),
            span,
        ));
    }
    if !is_integral(offset_ty) {
        return Err(invalid(
            op,
            format!("'{offset_ty}' is not an integral offset"),
            span,
        ));
    }
    let ty = pointer_ty.unqualified();
    Ok(Converted { lhs, rhs, ty })
}

/// Identical pointees, or one a base class of the other.
fn compatible_pointees(ctx: &SemaContext<'_>, a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    if a.unqualified() == b.unqualified() {
        return true;
    }
    match (a.class_id(), b.class_id()) {
        (Some(x), Some(y)) => {
            let hierarchy = ctx.registry().hierarchy();
            hierarchy.is_derived_from(x, y) || hierarchy.is_derived_from(y, x)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{
        Access, ClassEntry, Declaration, Qualifiers, SemaError, VariableEntry,
    };
    use cxxfront_registry::SymbolRegistry;
    use ordered_float::OrderedFloat;

    use crate::ExprBuilder;

    fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
            Span::new(1, 1, name.len() as u32),
        )
    }

    fn prim(kind: PrimitiveKind) -> TypeDescriptor {
        TypeDescriptor::primitive(kind)
    }

    #[test]
    fn mixed_arithmetic_uses_the_common_type() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let i = variable("i", TypeDescriptor::int());
        let d = variable("d", prim(PrimitiveKind::Double));
        let sum = builder.build_expression(OperatorCode::Add, &[i, d], Span::new(1, 1, 5));
        assert_eq!(sum.ty(), Some(&prim(PrimitiveKind::Double)));
        assert!(!sum.is_lvalue());

        let c = variable("c", prim(PrimitiveKind::Char));
        let u = variable("u", prim(PrimitiveKind::UnsignedInt));
        let mixed = builder.build_expression(OperatorCode::Mul, &[c, u], Span::new(2, 1, 5));
        assert_eq!(mixed.ty(), Some(&prim(PrimitiveKind::UnsignedInt)));
    }

    #[test]
    fn shifts_take_the_promoted_left_type() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let s = variable("s", prim(PrimitiveKind::Short));
        let l = variable("l", prim(PrimitiveKind::UnsignedLong));
        let shifted = builder.build_expression(OperatorCode::Shl, &[s, l], Span::new(1, 1, 6));
        assert_eq!(shifted.ty(), Some(&TypeDescriptor::int()));
    }

    #[test]
    fn bitwise_operators_reject_floating_operands() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let d = variable("d", prim(PrimitiveKind::Double));
        let i = variable("i", TypeDescriptor::int());
        let result = builder.build_expression(OperatorCode::Mod, &[d, i], Span::new(1, 1, 5));
        assert!(result.is_error());
        assert_eq!(ctx.diagnostics().error_count(), 1);
    }

    #[test]
    fn literal_zero_divisor_warns() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let i = variable("i", TypeDescriptor::int());
        let zero = Operand::integer(0, Span::new(1, 5, 1));
        let quotient = builder.build_expression(OperatorCode::Div, &[i, zero], Span::new(1, 1, 5));
        assert!(!quotient.is_error());

        let d = variable("d", prim(PrimitiveKind::Double));
        let fzero = Operand::literal(Literal::Float(OrderedFloat(0.0)), Span::new(2, 5, 3));
        builder.build_expression(OperatorCode::Div, &[d, fzero], Span::new(2, 1, 7));
        assert_eq!(ctx.diagnostics().warning_count(), 2);
        assert_eq!(ctx.diagnostics().error_count(), 0);
    }

    #[test]
    fn pointer_offsets_and_differences() {
        let mut registry = SymbolRegistry::new();
        let base = registry.register_class(ClassEntry::structure("Base")).unwrap();
        let derived = registry
            .register_class(ClassEntry::structure("Derived").with_base(&base, Access::Public))
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);

        let p = variable("p", TypeDescriptor::int().pointer_to());
        let moved = builder.build_expression(
            OperatorCode::Add,
            &[Operand::integer(2, Span::new(1, 1, 1)), Rc::clone(&p)],
            Span::new(1, 1, 5),
        );
        assert_eq!(moved.ty(), Some(&TypeDescriptor::int().pointer_to()));

        let q = variable(
            "q",
            TypeDescriptor::int().with_base_quals(Qualifiers::CONST).pointer_to(),
        );
        let diff = builder.build_expression(OperatorCode::Sub, &[p, q], Span::new(2, 1, 5));
        assert_eq!(diff.ty(), Some(&prim(PrimitiveKind::UnsignedLong)));

        let b = variable("b", TypeDescriptor::class(base).pointer_to());
        let d = variable("d", TypeDescriptor::class(derived).pointer_to());
        let related = builder.build_expression(OperatorCode::Sub, &[d, b], Span::new(3, 1, 5));
        assert_eq!(related.ty(), Some(&prim(PrimitiveKind::UnsignedLong)));
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn function_pointers_and_unrelated_pointees_are_rejected() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let f = cxxfront_core::FunctionEntry::free("f", TypeDescriptor::void());
        let fp = variable("fp", f.address_type());
        let one = Operand::integer(1, Span::new(1, 6, 1));
        let mut builder = ExprBuilder::new(&mut ctx);
        assert!(
            builder
                .build_expression(OperatorCode::Add, &[fp, one], Span::new(1, 1, 6))
                .is_error()
        );
        let ip = variable("ip", TypeDescriptor::int().pointer_to());
        let dp = variable("dp", prim(PrimitiveKind::Double).pointer_to());
        assert!(
            builder
                .build_expression(OperatorCode::Sub, &[ip, dp], Span::new(2, 1, 7))
                .is_error()
        );
        assert!(
            ctx.diagnostics()
                .errors()
                .all(|d| d.message.contains("'-'") || d.message.contains("'+'"))
        );
        let err = builtin(
            &mut SemaContext::new(&registry),
            OperatorCode::Add,
            &variable("a", TypeDescriptor::int().pointer_to()),
            &variable("b", TypeDescriptor::int().pointer_to()),
            Span::synthetic(),
        )
        .err();
        assert!(matches!(err, Some(SemaError::InvalidOperands { .. })));
    }
}
