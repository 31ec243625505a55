//! Conversion between two class types.

use std::rc::Rc;

use cxxfront_core::{ConversionStep, Operand, SemaError, Span, TypeDescriptor};
use tracing::trace;

use super::scalar::{base_path, binds_temporaries};
use super::{
    Caster, ConstructorCaster, ConversionCategory, ConversionMode, ConversionOutcome,
    ConversionPlan, OperatorCaster, PlannedStep, describe_source,
};
use crate::SemaContext;

/// Same class, derived-to-base, then the user-defined paths.
///
/// With `user_defined` off only the first two apply; this is the strategy
/// used inside another user-defined conversion.
#[derive(Debug, Clone, Copy)]
pub struct ClassToClassCaster {
    pub user_defined: bool,
}

impl Caster for ClassToClassCaster {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn classify(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        mode: ConversionMode,
    ) -> ConversionOutcome {
        let Some(source_ty) = source.ty().cloned() else {
            return ConversionOutcome::none(dest.clone());
        };
        let referent = dest.strip_reference();
        let (Some(from), Some(to)) = (source_ty.class_id(), referent.class_id()) else {
            return ConversionOutcome::none(dest.clone());
        };
        let is_reference = dest.is_reference();
        let held = source_ty.top_quals();
        let wanted = referent.top_quals();
        let bindable = !is_reference || source.is_lvalue() || binds_temporaries(wanted);
        let qualifies = !is_reference || wanted.at_least(held);

        if from == to {
            if !bindable || !qualifies {
                return cannot_bind(source, dest);
            }
            let outcome = match (is_reference, source.is_lvalue()) {
                (true, true) if wanted != held => ConversionOutcome::new(
                    ConversionCategory::QualifierOnly,
                    dest.clone(),
                    ConversionPlan::steps(vec![PlannedStep::lvalue(
                        ConversionStep::Qualification,
                        dest.clone(),
                    )]),
                )
                .with_distance(wanted.count() - held.count()),
                (true, false) => ConversionOutcome::new(
                    ConversionCategory::Equal,
                    dest.clone(),
                    ConversionPlan::steps(vec![PlannedStep::lvalue(
                        ConversionStep::BindReference { temporary: true },
                        dest.clone(),
                    )]),
                ),
                _ => ConversionOutcome::exact(dest.strip_reference().unqualified()),
            };
            return outcome;
        }

        match base_path(ctx, from, to) {
            Ok(Some(path)) => {
                if !bindable || !qualifies {
                    return cannot_bind(source, dest);
                }
                let distance = path.len() as u32;
                let ty = if is_reference {
                    dest.clone()
                } else {
                    referent.unqualified()
                };
                let step = PlannedStep {
                    step: ConversionStep::DerivedToBase { path },
                    ty: ty.clone(),
                    is_lvalue: is_reference,
                };
                trace!(from = %from, to = %to, distance, "derived-to-base conversion");
                return ConversionOutcome::new(
                    ConversionCategory::Standard,
                    ty,
                    ConversionPlan::steps(vec![step]),
                )
                .with_distance(distance);
            }
            Ok(None) => {}
            Err(error) => return ConversionOutcome::failed(dest.clone(), error),
        }

        if !self.user_defined {
            return ConversionOutcome::failed(
                dest.clone(),
                SemaError::NoConversion {
                    from: source_ty.to_string(),
                    to: dest.to_string(),
                    span: Span::synthetic(),
                },
            );
        }

        // A converted temporary cannot bind a non-const lvalue reference;
        // only a conversion function returning a reference can.
        let mut via_constructor = if !is_reference || binds_temporaries(wanted) {
            ConstructorCaster.classify(ctx, source, &referent.unqualified(), mode)
        } else {
            ConversionOutcome::none(dest.clone())
        };
        let via_operator = OperatorCaster.classify(ctx, source, dest, mode);

        match (via_constructor.is_viable(), via_operator.is_viable()) {
            (true, true) => {
                let name = |o: &ConversionOutcome| {
                    o.plan
                        .user
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default()
                };
                ConversionOutcome::failed(
                    dest.clone(),
                    SemaError::AmbiguousConversion {
                        from: describe_source(source),
                        to: dest.to_string(),
                        first: name(&via_constructor),
                        second: name(&via_operator),
                        span: Span::synthetic(),
                    },
                )
            }
            (true, false) => {
                if is_reference {
                    via_constructor.plan.after.push(PlannedStep::lvalue(
                        ConversionStep::BindReference { temporary: true },
                        dest.clone(),
                    ));
                    via_constructor.ty = dest.clone();
                }
                via_constructor
            }
            (false, true) => via_operator,
            (false, false) => {
                let error = [via_constructor.error, via_operator.error]
                    .into_iter()
                    .flatten()
                    .find(|e| {
                        matches!(
                            e,
                            SemaError::AmbiguousConversion { .. } | SemaError::Inaccessible { .. }
                        )
                    })
                    .unwrap_or_else(|| SemaError::NoConversion {
                        from: describe_source(source),
                        to: dest.to_string(),
                        span: Span::synthetic(),
                    });
                ConversionOutcome::failed(dest.clone(), error)
            }
        }
    }
}

fn cannot_bind(source: &Operand, dest: &TypeDescriptor) -> ConversionOutcome {
    ConversionOutcome::failed(
        dest.clone(),
        SemaError::TypeMismatch {
            message: format!(
                "cannot bind reference of type '{dest}' to a value of type '{}'",
                describe_source(source)
            ),
            span: Span::synthetic(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{
        Access, ClassEntry, ClassId, Declaration, FunctionEntry, Qualifiers, VariableEntry,
    };
    use cxxfront_registry::SymbolRegistry;

    fn lvalue(ty: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global("x", ty))),
            Span::new(1, 1, 1),
        )
    }

    #[test]
    fn derived_object_binds_base_reference() {
        let mut registry = SymbolRegistry::new();
        let base = registry.register_class(ClassEntry::structure("Shape")).unwrap();
        let derived = registry
            .register_class(ClassEntry::structure("Circle").with_base(&base, Access::Public))
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let caster = ClassToClassCaster { user_defined: true };
        let source = lvalue(TypeDescriptor::class(derived));
        let dest = TypeDescriptor::class(base).reference_to();
        let outcome = caster.classify(&mut ctx, &source, &dest, ConversionMode::Copy);
        assert_eq!(outcome.category, ConversionCategory::Standard);
        assert_eq!(outcome.distance, 1);
    }

    #[test]
    fn const_object_does_not_bind_non_const_reference() {
        let mut registry = SymbolRegistry::new();
        let c = registry.register_class(ClassEntry::structure("C")).unwrap();
        let mut ctx = SemaContext::new(&registry);
        let caster = ClassToClassCaster { user_defined: true };
        let source = lvalue(TypeDescriptor::class(c.clone()).with_base_quals(Qualifiers::CONST));
        let outcome = caster.classify(
            &mut ctx,
            &source,
            &TypeDescriptor::class(c).reference_to(),
            ConversionMode::Copy,
        );
        assert!(!outcome.is_viable());
    }

    #[test]
    fn constructor_and_conversion_function_together_are_ambiguous() {
        let mut registry = SymbolRegistry::new();
        let a = ClassId::new("A");
        let b = ClassId::new("B");
        registry
            .register_class(
                ClassEntry::class("A").with_method(
                    FunctionEntry::conversion(&a, TypeDescriptor::class(b.clone()))
                        .with_access(Access::Public),
                ),
            )
            .unwrap();
        registry
            .register_class(
                ClassEntry::class("B").with_method(
                    FunctionEntry::constructor(&b)
                        .with_param(
                            "a",
                            TypeDescriptor::class(a.clone())
                                .with_base_quals(Qualifiers::CONST)
                                .reference_to(),
                        )
                        .with_access(Access::Public),
                ),
            )
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let caster = ClassToClassCaster { user_defined: true };
        let outcome = caster.classify(
            &mut ctx,
            &lvalue(TypeDescriptor::class(a)),
            &TypeDescriptor::class(b),
            ConversionMode::Copy,
        );
        assert!(matches!(
            outcome.error,
            Some(SemaError::AmbiguousConversion { .. })
        ));
    }
}
