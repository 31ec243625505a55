//! Conversion to a class type through a converting constructor.

use std::rc::Rc;

use cxxfront_core::{Declaration, FunctionEntry, Operand, SemaError, Span, TypeDescriptor};
use tracing::trace;

use super::{
    AutoCastManager, Caster, ConversionCategory, ConversionMode, ConversionOutcome,
    ConversionPlan, describe_source,
};
use crate::SemaContext;
use crate::access::{MemberRef, is_accessible};
use crate::classify::is_arithmetic;

/// Builds the destination object from the source with one constructor call.
///
/// A constructor qualifies when it can be called with one argument (the
/// rest defaulted) or with none plus an ellipsis. Its first parameter is
/// reached by standard conversions only. Arithmetic-to-arithmetic first
/// parameters all rank alike, so `C(int)` and `C(double)` are ambiguous
/// from an `int`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructorCaster;

/// (first-parameter category, qualification distance); ellipsis ranks
/// as `UserDefined`.
type Rank = (ConversionCategory, u32);

struct Candidate {
    rank: Rank,
    constructor: Rc<FunctionEntry>,
    argument: ConversionOutcome,
}

impl Caster for ConstructorCaster {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn classify(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        mode: ConversionMode,
    ) -> ConversionOutcome {
        let target = dest.strip_reference().unqualified();
        let Some(class) = target.class_id().cloned() else {
            return ConversionOutcome::none(target);
        };
        let registry = ctx.registry();
        let Some(view) = registry.class_graph(class.hash()).filter(|v| v.is_complete()) else {
            return ConversionOutcome::failed(
                target.clone(),
                SemaError::Structural {
                    message: format!("'{target}' is an incomplete type"),
                    span: Span::synthetic(),
                },
            );
        };

        let explicit_allowed =
            mode == ConversionMode::Direct || ctx.options().permissive_explicit_constructors;
        let source_ty = source.ty().cloned();
        let same_class = source_ty.as_ref().and_then(|t| t.class_id()) == Some(&class);
        let standard = AutoCastManager::standard_only();

        let mut candidates: Vec<Candidate> = Vec::new();
        for constructor in view.constructors() {
            if !constructor.is_converting_shape()
                || (constructor.is_explicit && !explicit_allowed)
                || (same_class && constructor.is_copy_constructor())
            {
                continue;
            }
            let (rank, argument) = match constructor.params.first() {
                Some(param) => {
                    let argument =
                        standard.classify(ctx, source, &param.ty, ConversionMode::Copy);
                    if !argument.is_viable() {
                        continue;
                    }
                    let arithmetic = source_ty.as_ref().is_some_and(is_arithmetic)
                        && is_arithmetic(&param.ty);
                    let category = if arithmetic {
                        ConversionCategory::Standard
                    } else {
                        argument.category
                    };
                    (qualified_rank(category, source_ty.as_ref(), &param.ty), argument)
                }
                None => (
                    (ConversionCategory::UserDefined, 0),
                    ConversionOutcome::exact(
                        source_ty.clone().unwrap_or_else(TypeDescriptor::void),
                    ),
                ),
            };
            trace!(constructor = %constructor, ?rank, "converting constructor candidate");
            candidates.push(Candidate {
                rank,
                constructor: Rc::clone(constructor),
                argument,
            });
        }

        let Some(best) = candidates.iter().map(|c| c.rank).min() else {
            return ConversionOutcome::failed(
                target.clone(),
                SemaError::NoConversion {
                    from: describe_source(source),
                    to: target.to_string(),
                    span: Span::synthetic(),
                },
            );
        };
        let mut tied: Vec<Candidate> = candidates.into_iter().filter(|c| c.rank == best).collect();
        if tied.len() > 1 {
            tied.sort_by_key(|c| c.constructor.hash);
            return ConversionOutcome::failed(
                target.clone(),
                SemaError::AmbiguousConversion {
                    from: describe_source(source),
                    to: target.to_string(),
                    first: tied[0].constructor.to_string(),
                    second: tied[1].constructor.to_string(),
                    span: Span::synthetic(),
                },
            );
        }
        let Some(chosen) = tied.pop() else {
            return ConversionOutcome::none(target);
        };

        let member = MemberRef::new(Declaration::Function(Rc::clone(&chosen.constructor)));
        if !is_accessible(ctx, &member, &class, ctx.scope()) {
            return ConversionOutcome::failed(
                target,
                SemaError::Inaccessible {
                    member: chosen.constructor.to_string(),
                    span: Span::synthetic(),
                },
            );
        }

        let ConversionPlan {
            resolved,
            mut before,
            after,
            ..
        } = chosen.argument.plan;
        before.extend(after);
        ConversionOutcome::new(
            ConversionCategory::UserDefined,
            target,
            ConversionPlan {
                resolved,
                before,
                user: Some(chosen.constructor),
                after: Vec::new(),
            },
        )
    }
}

/// Tie-break by how far the parameter's qualification is from the source's.
fn qualified_rank(
    category: ConversionCategory,
    source: Option<&TypeDescriptor>,
    param: &TypeDescriptor,
) -> Rank {
    let held = source.map(|t| t.top_quals().count()).unwrap_or(0);
    let wanted = param.strip_reference().top_quals().count();
    (category, wanted.abs_diff(held))
}
