//! Conversion from a class type through a conversion function
//! (`operator T()`).

use std::rc::Rc;

use cxxfront_core::{
    CallExpr, Callee, ClassId, Declaration, ExprKind, FunctionEntry, Operand, SemaError, Span,
    TypeDescriptor,
};
use cxxfront_registry::SymbolRegistry;
use tracing::trace;

use super::{
    AutoCastManager, Caster, ConversionCategory, ConversionMode, ConversionOutcome,
    ConversionPlan, ConversionTier, describe_source,
};
use crate::SemaContext;
use crate::access::{MemberRef, is_accessible};

/// Calls a conversion function of the source's class, then applies standard
/// conversions to its result.
///
/// A conversion function whose qualification is less restrictive than the
/// object's cannot be called. Among equally good results, one declared in
/// a more derived class wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorCaster;

struct Candidate {
    rank: (ConversionCategory, ConversionTier, u32, u32),
    function: Rc<FunctionEntry>,
    result: ConversionOutcome,
}

impl Caster for OperatorCaster {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn classify(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        mode: ConversionMode,
    ) -> ConversionOutcome {
        let Some(source_ty) = source.ty() else {
            return ConversionOutcome::none(dest.clone());
        };
        let Some(class) = source_ty.class_id().cloned() else {
            return ConversionOutcome::none(dest.clone());
        };
        let object_quals = source_ty.top_quals();
        let standard = AutoCastManager::standard_only();
        let span = source.span();

        let mut candidates = Vec::new();
        for function in conversion_functions(ctx.registry(), &class) {
            if function.is_explicit && mode == ConversionMode::Copy {
                continue;
            }
            if !function.cv.at_least(object_quals) {
                continue;
            }
            let call = Operand::expression(
                ExprKind::Call(CallExpr {
                    callee: Callee::Direct(Rc::clone(&function)),
                    object: Some(Rc::clone(source)),
                    args: Vec::new(),
                }),
                function.return_type.clone(),
                false,
                span,
            );
            let result = standard.classify(ctx, &call, dest, ConversionMode::Copy);
            if !result.is_viable() {
                continue;
            }
            let rank = (
                result.category,
                result.tier,
                result.distance,
                function.cv.count() - object_quals.count(),
            );
            trace!(function = %function, ?rank, "conversion function candidate");
            candidates.push(Candidate {
                rank,
                function,
                result,
            });
        }

        let Some(best) = candidates.iter().map(|c| c.rank).min() else {
            return ConversionOutcome::failed(
                dest.clone(),
                SemaError::NoConversion {
                    from: describe_source(source),
                    to: dest.to_string(),
                    span: Span::synthetic(),
                },
            );
        };
        let mut tied: Vec<Candidate> = candidates.into_iter().filter(|c| c.rank == best).collect();
        tied.sort_by_key(|c| c.function.hash);

        // A unique most-derived owner settles a tie.
        let hierarchy = ctx.registry().hierarchy();
        let winner = tied.iter().position(|c| {
            tied.iter().all(|other| {
                Rc::ptr_eq(&c.function, &other.function)
                    || match (&c.function.owner, &other.function.owner) {
                        (Some(mine), Some(theirs)) => hierarchy.is_derived_from(mine, theirs),
                        _ => false,
                    }
            })
        });
        let Some(index) = winner else {
            return ConversionOutcome::failed(
                dest.clone(),
                SemaError::AmbiguousConversion {
                    from: describe_source(source),
                    to: dest.to_string(),
                    first: tied[0].function.to_string(),
                    second: tied[1].function.to_string(),
                    span: Span::synthetic(),
                },
            );
        };
        let chosen = tied.swap_remove(index);

        let member = MemberRef::through_object(
            Declaration::Function(Rc::clone(&chosen.function)),
            class.clone(),
        );
        if !is_accessible(ctx, &member, &class, ctx.scope()) {
            return ConversionOutcome::failed(
                dest.clone(),
                SemaError::Inaccessible {
                    member: chosen.function.to_string(),
                    span: Span::synthetic(),
                },
            );
        }

        let steps: Vec<_> = chosen.result.plan.all_steps().cloned().collect();
        ConversionOutcome::new(
            ConversionCategory::UserDefined,
            dest.clone(),
            ConversionPlan {
                user: Some(chosen.function),
                after: steps,
                ..ConversionPlan::default()
            },
        )
    }
}

/// Conversion functions visible in `class`: its own and inherited ones not
/// hidden by a same-named one in a more derived class.
pub fn conversion_functions(registry: &SymbolRegistry, class: &ClassId) -> Vec<Rc<FunctionEntry>> {
    let Some(view) = registry.class_graph(class.hash()) else {
        return Vec::new();
    };
    let mut all: Vec<Rc<FunctionEntry>> = view.entry().conversion_operators().cloned().collect();
    for ancestor in view.ancestors() {
        if let Some(entry) = registry.class(ancestor.hash()) {
            all.extend(entry.conversion_operators().cloned());
        }
    }
    let hierarchy = registry.hierarchy();
    all.iter()
        .filter(|f| {
            !all.iter().any(|g| {
                g.name == f.name
                    && match (&g.owner, &f.owner) {
                        (Some(lower), Some(upper)) => hierarchy.is_derived_from(lower, upper),
                        _ => false,
                    }
            })
        })
        .cloned()
        .collect()
}
