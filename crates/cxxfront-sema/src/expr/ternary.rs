//! The conditional operator `c ? t : e`.
//!
//! ## Algorithm
//!
//! The condition is contextually converted to `bool`. The branch types then
//! decide the result:
//!
//! 1. Both `void`: a `void` rvalue.
//! 2. Lvalues of the same type: an lvalue of that type.
//! 3. At least one class type of different classes: each branch is tried as
//!    a conversion to the other's type. Exactly one must work.
//! 4. Arithmetic: the usual arithmetic conversions.
//! 5. Pointers, member pointers and null pointer constants: the composite
//!    pointer type.

use std::rc::Rc;

use cxxfront_core::{ExprKind, Operand, SemaError, Span, TypeDescriptor};
use tracing::trace;

use super::{Result, convert_to, decayed, mismatch, to_bool, value_type};
use crate::SemaContext;
use crate::classify::{is_arithmetic, is_class_type, is_void, same_unqualified};
use crate::conversion::{
    self, AutoCastManager, ConversionMode, composite_pointer_type, usual_arithmetic,
};

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_conditional(
    ctx: &mut SemaContext<'_>,
    condition: &Rc<Operand>,
    then_branch: &Rc<Operand>,
    else_branch: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let condition = to_bool(ctx, condition, span)?;
    let then_ty = value_type(then_branch, span)?;
    let else_ty = value_type(else_branch, span)?;

    let (then_branch, else_branch, ty, is_lvalue) =
        match (is_void(&then_ty), is_void(&else_ty)) {
            (true, true) => (
                Rc::clone(then_branch),
                Rc::clone(else_branch),
                TypeDescriptor::void(),
                false,
            ),
            (true, false) | (false, true) => {
                let message = format!(
                    "'?:' branches of type '{then_ty}' and '{else_ty}' mix void and non-void"
                );
                return Err(mismatch(&message, span));
            }
            _ if then_ty == else_ty && then_branch.is_lvalue() && else_branch.is_lvalue() => (
                Rc::clone(then_branch),
                Rc::clone(else_branch),
                then_ty,
                true,
            ),
            _ => {
                let (then_branch, else_branch, ty) =
                    common_value(ctx, then_branch, &then_ty, else_branch, &else_ty, span)?;
                (then_branch, else_branch, ty, false)
            }
        };
    trace!(ty = %ty, is_lvalue, "conditional typed");
    Ok(Operand::expression(
        ExprKind::Ternary {
            condition,
            then_branch,
            else_branch,
        },
        ty,
        is_lvalue,
        span,
    ))
}

type Branches = (Rc<Operand>, Rc<Operand>, TypeDescriptor);

/// Convert both branches to a common rvalue type.
fn common_value(
    ctx: &mut SemaContext<'_>,
    then_branch: &Rc<Operand>,
    then_ty: &TypeDescriptor,
    else_branch: &Rc<Operand>,
    else_ty: &TypeDescriptor,
    span: Span,
) -> Result<Branches> {
    if is_class_type(then_ty) || is_class_type(else_ty) {
        if same_unqualified(then_ty, else_ty) {
            let ty = then_ty.unqualified();
            return Ok((Rc::clone(then_branch), Rc::clone(else_branch), ty));
        }
        return mutual_conversion(ctx, then_branch, then_ty, else_branch, else_ty, span);
    }
    if is_arithmetic(then_ty) && is_arithmetic(else_ty) {
        if let Some(kind) = usual_arithmetic(then_ty, else_ty) {
            let ty = TypeDescriptor::primitive(kind);
            return Ok((
                convert_to(ctx, then_branch, &ty, span)?,
                convert_to(ctx, else_branch, &ty, span)?,
                ty,
            ));
        }
    }
    let then_branch = decayed(then_branch, span)?;
    let else_branch = decayed(else_branch, span)?;
    if let Some(ty) = composite_pointer_type(ctx, &then_branch, &else_branch) {
        return Ok((
            convert_to(ctx, &then_branch, &ty, span)?,
            convert_to(ctx, &else_branch, &ty, span)?,
            ty,
        ));
    }
    Err(mismatch(
        &format!("'?:' branches have incompatible types '{then_ty}' and '{else_ty}'"),
        span,
    ))
}

fn mutual_conversion(
    ctx: &mut SemaContext<'_>,
    then_branch: &Rc<Operand>,
    then_ty: &TypeDescriptor,
    else_branch: &Rc<Operand>,
    else_ty: &TypeDescriptor,
    span: Span,
) -> Result<Branches> {
    let caster = AutoCastManager::new();
    let forward = caster.classify(ctx, then_branch, &else_ty.unqualified(), ConversionMode::Copy);
    let backward = caster.classify(ctx, else_branch, &then_ty.unqualified(), ConversionMode::Copy);
    match (forward.is_viable(), backward.is_viable()) {
        (true, true) => Err(SemaError::AmbiguousConversion {
            from: then_ty.to_string(),
            to: else_ty.to_string(),
            first: format!("{then_ty} to {else_ty}"),
            second: format!("{else_ty} to {then_ty}"),
            span,
        }),
        (true, false) => Ok((
            conversion::apply(then_branch, &forward),
            Rc::clone(else_branch),
            forward.ty.clone(),
        )),
        (false, true) => Ok((
            Rc::clone(then_branch),
            conversion::apply(else_branch, &backward),
            backward.ty.clone(),
        )),
        (false, false) => Err(mismatch(
            &format!("'?:' branches have incompatible types '{then_ty}' and '{else_ty}'"),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{
        Access, ClassEntry, ClassId, Declaration, FunctionEntry, FunctionPrototype, OperatorCode,
        PrimitiveKind, Qualifiers, VariableEntry,
    };
    use cxxfront_registry::SymbolRegistry;

    use crate::ExprBuilder;

    fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
            Span::new(1, 1, 1),
        )
    }

    fn span() -> Span {
        Span::new(4, 1, 9)
    }

    fn conditional(
        builder: &mut ExprBuilder<'_, '_>,
        then_branch: Rc<Operand>,
        else_branch: Rc<Operand>,
    ) -> Rc<Operand> {
        let flag = variable("flag", TypeDescriptor::int());
        builder.build_expression(
            OperatorCode::Conditional,
            &[flag, then_branch, else_branch],
            span(),
        )
    }

    #[test]
    fn scalar_branches_meet_at_a_common_type() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let mixed = conditional(
            &mut builder,
            Operand::integer(1, span()),
            variable("d", TypeDescriptor::primitive(PrimitiveKind::Double)),
        );
        assert_eq!(
            mixed.ty(),
            Some(&TypeDescriptor::primitive(PrimitiveKind::Double))
        );
        assert!(!mixed.is_lvalue());

        let same = conditional(
            &mut builder,
            variable("a", TypeDescriptor::int()),
            variable("b", TypeDescriptor::int()),
        );
        assert!(same.is_lvalue());
        assert_eq!(same.ty(), Some(&TypeDescriptor::int()));

        let p = variable("p", TypeDescriptor::int().pointer_to());
        let with_null = conditional(&mut builder, p, Operand::integer(0, span()));
        assert_eq!(with_null.ty(), Some(&TypeDescriptor::int().pointer_to()));
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn pointer_branches_use_the_composite_type() {
        let mut registry = SymbolRegistry::new();
        let base = registry.register_class(ClassEntry::structure("Base")).unwrap();
        let derived = registry
            .register_class(ClassEntry::structure("Derived").with_base(&base, Access::Public))
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let result = conditional(
            &mut builder,
            variable("d", TypeDescriptor::class(derived).pointer_to()),
            variable("b", TypeDescriptor::class(base).pointer_to()),
        );
        assert_eq!(result.ty().map(ToString::to_string).as_deref(), Some("Base*"));
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn void_and_incompatible_branches_are_rejected() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let callback = variable(
            "done",
            TypeDescriptor::void()
                .function_returning(FunctionPrototype::new(vec![]))
                .pointer_to(),
        );
        let first = builder.build_call(&callback, &[], span());
        let second = builder.build_call(&callback, &[], span());
        let both = conditional(&mut builder, Rc::clone(&first), second);
        assert_eq!(both.ty(), Some(&TypeDescriptor::void()));
        assert!(conditional(&mut builder, first, Operand::integer(1, span())).is_error());

        let pointer = variable("p", TypeDescriptor::int().pointer_to());
        let number = variable("x", TypeDescriptor::primitive(PrimitiveKind::Double));
        assert!(conditional(&mut builder, pointer, number).is_error());
        assert_eq!(ctx.diagnostics().error_count(), 2);
    }

    #[test]
    fn class_branches_convert_one_way_only() {
        let mut registry = SymbolRegistry::new();
        let meters = ClassId::new("Meters");
        let feet = ClassId::new("Feet");
        let from = |class: &ClassId, source: &ClassId| {
            FunctionEntry::constructor(class)
                .with_param(
                    "other",
                    TypeDescriptor::class(source.clone())
                        .with_base_quals(Qualifiers::CONST)
                        .reference_to(),
                )
                .with_access(Access::Public)
        };
        registry
            .register_class(
                ClassEntry::structure("Meters")
                    .with_method(
                        FunctionEntry::constructor(&meters)
                            .with_param("value", TypeDescriptor::int())
                            .with_access(Access::Public),
                    )
                    .with_method(from(&meters, &feet)),
            )
            .unwrap();
        registry
            .register_class(ClassEntry::structure("Feet").with_method(from(&feet, &meters)))
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);

        let m = variable("m", TypeDescriptor::class(meters.clone()));
        let widened = conditional(&mut builder, Rc::clone(&m), Operand::integer(3, span()));
        assert_eq!(widened.ty(), Some(&TypeDescriptor::class(meters.clone())));
        assert!(!widened.is_lvalue());

        let f = variable("f", TypeDescriptor::class(feet));
        assert!(conditional(&mut builder, m, f).is_error());
        let messages: Vec<String> = ctx.diagnostics().errors().map(|d| d.message.clone()).collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("ambiguous conversion"), "{}", messages[0]);
    }
}
