//! `a[i]`: a pointer or array with an integral index, in either order.
//! Class operands use `operator[]`.

use std::rc::Rc;

use cxxfront_core::{ExprKind, Operand, OperatorCode, Span};

use super::user_operator::{missing, try_user_operator};
use super::{Result, decayed, invalid, value_type};
use crate::SemaContext;
use crate::classify::{is_class_type, is_integral, is_object_pointer};

pub(super) fn build_subscript(
    ctx: &mut SemaContext<'_>,
    lhs: &Rc<Operand>,
    rhs: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let op = OperatorCode::Subscript;
    if is_class_type(&value_type(lhs, span)?) {
        let operands = [Rc::clone(lhs), Rc::clone(rhs)];
        return match try_user_operator(ctx, op, &operands, span)? {
            Some(node) => Ok(node),
            None => Err(missing(op, lhs, span)),
        };
    }
    let lhs = decayed(lhs, span)?;
    let rhs = decayed(rhs, span)?;
    let (lt, rt) = (value_type(&lhs, span)?, value_type(&rhs, span)?);
    let (pointer, index) = if is_object_pointer(&lt) {
        (&lt, &rt)
    } else if is_object_pointer(&rt) {
        (&rt, &lt)
    } else {
        return Err(invalid(
            op,
            format!("subscripted value of type '{lt}' is not an array or pointer"),
            span,
        ));
    };
    if !is_integral(index) {
        return Err(invalid(op, format!("index of type '{index}' is not integral"), span));
    }
    let Some(element) = pointer.pointee() else {
        return Err(invalid(op, format!("'{pointer}' has no element type"), span));
    };
    Ok(Operand::expression(
        ExprKind::Binary { op, lhs, rhs },
        element,
        true,
        span,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{
        ClassEntry, ClassId, Declaration, FunctionEntry, PrimitiveKind, Qualifiers,
        TypeDescriptor, VariableEntry,
    };
    use cxxfront_registry::SymbolRegistry;

    use crate::ExprBuilder;

    fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
            Span::new(1, 1, 1),
        )
    }

    #[test]
    fn arrays_and_pointers_index_in_either_order() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let table = variable(
            "table",
            TypeDescriptor::int().with_base_quals(Qualifiers::CONST).array_of(Some(4)),
        );
        let element = builder.build_expression(
            OperatorCode::Subscript,
            &[Rc::clone(&table), Operand::integer(2, Span::new(1, 7, 1))],
            Span::new(1, 1, 8),
        );
        assert!(element.is_lvalue());
        assert_eq!(
            element.ty(),
            Some(&TypeDescriptor::int().with_base_quals(Qualifiers::CONST))
        );
        let flipped = builder.build_expression(
            OperatorCode::Subscript,
            &[Operand::integer(2, Span::new(2, 1, 1)), table],
            Span::new(2, 1, 8),
        );
        assert!(!flipped.is_error());
    }

    #[test]
    fn non_integral_index_and_scalar_base_are_rejected() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let p = variable("p", TypeDescriptor::int().pointer_to());
        let d = variable("d", TypeDescriptor::primitive(PrimitiveKind::Double));
        assert!(
            builder
                .build_expression(OperatorCode::Subscript, &[p, Rc::clone(&d)], Span::new(1, 1, 4))
                .is_error()
        );
        let i = variable("i", TypeDescriptor::int());
        assert!(
            builder
                .build_expression(OperatorCode::Subscript, &[i, d], Span::new(2, 1, 4))
                .is_error()
        );
        assert_eq!(ctx.diagnostics().error_count(), 2);
    }

    #[test]
    fn class_operands_use_operator_subscript() {
        let mut registry = SymbolRegistry::new();
        let list = ClassId::new("List");
        let index = FunctionEntry::operator(
            Some(&list),
            OperatorCode::Subscript,
            TypeDescriptor::int().reference_to(),
        )
        .map(|f| f.with_param("i", TypeDescriptor::primitive(PrimitiveKind::UnsignedLong)));
        let mut entry = ClassEntry::class("List");
        if let Some(f) = index {
            entry = entry.with_method(f);
        }
        registry.register_class(entry).unwrap();
        registry.register_class(ClassEntry::class("Bag")).unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let l = variable("l", TypeDescriptor::class(list));
        let element = builder.build_expression(
            OperatorCode::Subscript,
            &[l, Operand::integer(0, Span::new(1, 3, 1))],
            Span::new(1, 1, 4),
        );
        assert!(element.is_lvalue());
        assert_eq!(element.ty(), Some(&TypeDescriptor::int()));

        let bag = variable("bag", TypeDescriptor::class(ClassId::new("Bag")));
        builder.build_expression(
            OperatorCode::Subscript,
            &[bag, Operand::integer(0, Span::new(2, 5, 1))],
            Span::new(2, 1, 6),
        );
        assert_eq!(
            ctx.diagnostics().last().map(|d| d.message.as_str()),
            Some("no 'operator[]' for 'Bag'")
        );
    }
}
