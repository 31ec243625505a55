//! Overload resolution.
//!
//! ## Algorithm
//!
//! 1. Drop candidates that cannot take the argument count.
//! 2. Rank every argument against its parameter. Arguments matched by `...`
//!    rank below user-defined conversions; defaulted parameters are not
//!    ranked. A member candidate also ranks its implicit object: `Equal`
//!    for identical qualification, `QualifierOnly` when the function adds
//!    qualifiers, not viable when it drops them.
//! 3. The winner is better than every other viable candidate: no position
//!    worse, at least one better. Without a winner the call is ambiguous.
//!
//! Operator candidates mix members (object = left operand) and non-members
//! (every operand an argument); both produce rank vectors over the same
//! operand positions.

mod ranking;

pub use ranking::{Position, RankVector, best_of, undominated};

use std::rc::Rc;

use cxxfront_core::{
    ConversionStep, Declaration, FunctionEntry, Layer, Operand, PrimitiveKind, SemaError, Span,
    TypeDescriptor, TypeHash,
};
use tracing::{debug, instrument, trace};

use crate::SemaContext;
use crate::access::{MemberRef, is_accessible};
use crate::classify::class_of;
use crate::conversion::{
    self, AutoCastManager, ConversionCategory, ConversionMode, ConversionOutcome, ConversionTier,
    PlannedStep,
};

type Result<T> = std::result::Result<T, SemaError>;

/// How one argument reaches its parameter.
#[derive(Debug, Clone)]
pub enum ArgumentMatch {
    Converted(ConversionOutcome),
    /// Matched by the ellipsis; default argument promotions apply.
    Ellipsis,
}

/// A viable candidate and how each argument matched.
#[derive(Debug, Clone)]
pub struct Selection {
    pub function: Rc<FunctionEntry>,
    /// Rank of the implicit object, for member candidates called with one.
    pub object: Option<ConversionCategory>,
    pub arguments: Vec<ArgumentMatch>,
    pub ranks: RankVector,
}

impl Selection {
    /// Number of trailing parameters filled from default arguments.
    pub fn defaulted(&self) -> usize {
        self.function.params.len().saturating_sub(self.arguments.len())
    }
}

#[derive(Debug, Clone)]
pub enum OverloadResult {
    Selected(Selection),
    /// The two best candidates, ordered by hash.
    Ambiguous(Rc<FunctionEntry>, Rc<FunctionEntry>),
    NotFound,
}

/// Resolve a call to `candidates` with `args`, on `object` when the call
/// has an implicit object argument.
#[instrument(level = "trace", skip_all, fields(candidates = candidates.len(), args = args.len()))]
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve(
    ctx: &mut SemaContext<'_>,
    candidates: &[Rc<FunctionEntry>],
    args: &[Rc<Operand>],
    object: Option<&Rc<Operand>>,
) -> OverloadResult {
    let viable: Vec<Selection> = candidates
        .iter()
        .filter_map(|candidate| match_call(ctx, candidate, args, object))
        .collect();
    choose(viable)
}

/// [`resolve`] over registered functions named by hash.
pub fn resolve_overload(
    ctx: &mut SemaContext<'_>,
    candidates: &[TypeHash],
    args: &[Rc<Operand>],
    object: Option<&Rc<Operand>>,
) -> OverloadResult {
    let registry = ctx.registry();
    let functions: Vec<Rc<FunctionEntry>> = candidates
        .iter()
        .filter_map(|hash| registry.function(*hash).cloned())
        .collect();
    resolve(ctx, &functions, args, object)
}

/// Resolve an operator whose candidates are members (taking `operands[0]`
/// as the object) and non-members (taking every operand).
pub fn resolve_operator(
    ctx: &mut SemaContext<'_>,
    candidates: &[Rc<FunctionEntry>],
    operands: &[Rc<Operand>],
) -> OverloadResult {
    let viable: Vec<Selection> = candidates
        .iter()
        .filter_map(|candidate| {
            if candidate.has_implicit_object() {
                let (object, rest) = operands.split_first()?;
                match_call(ctx, candidate, rest, Some(object))
            } else {
                match_call(ctx, candidate, operands, None)
            }
        })
        .collect();
    choose(viable)
}

fn choose(mut viable: Vec<Selection>) -> OverloadResult {
    let ranks: Vec<RankVector> = viable.iter().map(|s| s.ranks.clone()).collect();
    if let Some(index) = best_of(&ranks) {
        let selection = viable.swap_remove(index);
        debug!(function = %selection.function, "overload selected");
        return OverloadResult::Selected(selection);
    }
    let mut tied: Vec<Rc<FunctionEntry>> = undominated(&ranks)
        .into_iter()
        .map(|i| Rc::clone(&viable[i].function))
        .collect();
    tied.sort_by_key(|f| f.hash);
    match tied.as_slice() {
        [first, second, ..] => {
            debug!(%first, %second, "ambiguous overload");
            OverloadResult::Ambiguous(Rc::clone(first), Rc::clone(second))
        }
        _ => OverloadResult::NotFound,
    }
}

fn match_call(
    ctx: &mut SemaContext<'_>,
    candidate: &Rc<FunctionEntry>,
    args: &[Rc<Operand>],
    object: Option<&Rc<Operand>>,
) -> Option<Selection> {
    if !candidate.accepts_arg_count(args.len()) {
        return None;
    }
    let mut ranks = Vec::with_capacity(args.len() + 1);
    let mut object_rank = None;
    if let Some(object) = object {
        if candidate.has_implicit_object() {
            let category = match_object(candidate, object)?;
            object_rank = Some(category);
            ranks.push(Position::Ranked(category, ConversionTier::Direct, 0));
        } else {
            ranks.push(Position::Ignored);
        }
    }

    let manager = AutoCastManager::new();
    let mut arguments = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        match candidate.params.get(index) {
            Some(param) => {
                let outcome = manager.classify(ctx, arg, &param.ty, ConversionMode::Copy);
                if !outcome.is_viable() {
                    trace!(candidate = %candidate, index, "argument does not convert");
                    return None;
                }
                ranks.push(Position::Ranked(
                    outcome.category,
                    outcome.tier,
                    outcome.distance,
                ));
                arguments.push(ArgumentMatch::Converted(outcome));
            }
            None => {
                if arg.is_error() || arg.ty().is_none() {
                    return None;
                }
                ranks.push(Position::Ellipsis);
                arguments.push(ArgumentMatch::Ellipsis);
            }
        }
    }
    Some(Selection {
        function: Rc::clone(candidate),
        object: object_rank,
        arguments,
        ranks: RankVector(ranks),
    })
}

fn match_object(candidate: &FunctionEntry, object: &Operand) -> Option<ConversionCategory> {
    let ty = object.ty()?;
    let held = if ty.class_id().is_some() {
        ty.top_quals()
    } else {
        ty.pointee()?.top_quals()
    };
    if !candidate.cv.at_least(held) {
        return None;
    }
    Some(if candidate.cv == held {
        ConversionCategory::Equal
    } else {
        ConversionCategory::QualifierOnly
    })
}

// ============================================================================
// Diagnostics and argument rewriting
// ============================================================================

/// Turn an [`OverloadResult`] into the selected candidate or a diagnostic,
/// checking access to a selected member.
pub fn select(
    ctx: &SemaContext<'_>,
    name: &str,
    result: OverloadResult,
    args: &[Rc<Operand>],
    object: Option<&Rc<Operand>>,
    span: Span,
) -> Result<Selection> {
    match result {
        OverloadResult::Selected(selection) => {
            if let Some(owner) = &selection.function.owner {
                let naming = object
                    .and_then(|o| o.ty())
                    .and_then(class_of)
                    .unwrap_or_else(|| owner.clone());
                let member = match object.and_then(|o| o.ty()).and_then(class_of) {
                    Some(class) => MemberRef::through_object(
                        Declaration::Function(Rc::clone(&selection.function)),
                        class,
                    ),
                    None => MemberRef::new(Declaration::Function(Rc::clone(&selection.function))),
                };
                if !is_accessible(ctx, &member, &naming, ctx.scope()) {
                    return Err(SemaError::Inaccessible {
                        member: selection.function.to_string(),
                        span,
                    });
                }
            }
            Ok(selection)
        }
        OverloadResult::Ambiguous(first, second) => Err(SemaError::AmbiguousOverload {
            name: name.to_string(),
            first: first.to_string(),
            second: second.to_string(),
            span,
        }),
        OverloadResult::NotFound => Err(SemaError::NoMatchingOverload {
            name: name.to_string(),
            args: describe_args(args),
            span,
        }),
    }
}

pub fn describe_args(args: &[Rc<Operand>]) -> String {
    args.iter()
        .map(|a| conversion::describe_source(a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Converted arguments for the selected candidate, followed by shared
/// default-argument nodes.
pub fn convert_arguments(
    selection: &Selection,
    args: &[Rc<Operand>],
) -> Vec<Rc<Operand>> {
    let mut converted: Vec<Rc<Operand>> = args
        .iter()
        .zip(&selection.arguments)
        .map(|(arg, matched)| match matched {
            ArgumentMatch::Converted(outcome) => conversion::apply(arg, outcome),
            ArgumentMatch::Ellipsis => promote_variadic(arg),
        })
        .collect();
    converted.extend(
        selection.function.params[args.len().min(selection.function.params.len())..]
            .iter()
            .filter_map(|param| param.default.clone()),
    );
    converted
}

/// Default argument promotions for an argument matched by `...`.
pub fn promote_variadic(arg: &Rc<Operand>) -> Rc<Operand> {
    let Some(ty) = arg.ty() else {
        return Rc::clone(arg);
    };
    let mut steps = Vec::new();
    match ty.outer() {
        Some(Layer::Array(_)) => steps.push(PlannedStep::new(
            ConversionStep::ArrayToPointer,
            ty.decay(),
        )),
        Some(Layer::Function(_)) => steps.push(PlannedStep::new(
            ConversionStep::FunctionToPointer,
            ty.decay(),
        )),
        _ => {
            let promoted = match ty.primitive_kind() {
                Some(PrimitiveKind::Float) => Some(PrimitiveKind::Double),
                Some(kind) if kind.is_integral() && kind.promoted() != kind => {
                    Some(kind.promoted())
                }
                _ => None,
            };
            if let Some(kind) = promoted {
                steps.push(PlannedStep::new(
                    ConversionStep::Arithmetic { promotion: true },
                    TypeDescriptor::primitive(kind),
                ));
            } else if ty.enum_id().is_some() {
                steps.push(PlannedStep::new(
                    ConversionStep::EnumToIntegral,
                    TypeDescriptor::int(),
                ));
            }
        }
    }
    let outcome = ConversionOutcome::new(
        ConversionCategory::Promotion,
        ty.decay(),
        conversion::ConversionPlan::steps(steps),
    );
    conversion::apply(arg, &outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{Access, ClassEntry, ClassId, Qualifiers, VariableEntry};
    use cxxfront_registry::SymbolRegistry;

    fn double() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Double)
    }

    fn free(params: &[TypeDescriptor]) -> Rc<FunctionEntry> {
        let mut f = FunctionEntry::free("f", TypeDescriptor::void());
        for (i, p) in params.iter().enumerate() {
            f = f.with_param(format!("p{i}"), p.clone());
        }
        Rc::new(f)
    }

    fn int_arg() -> Rc<Operand> {
        Operand::integer(1, Span::new(1, 1, 1))
    }

    #[test]
    fn exact_match_beats_standard() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let by_int = free(&[TypeDescriptor::int()]);
        let by_double = free(&[double()]);
        let result = resolve(&mut ctx, &[by_double, Rc::clone(&by_int)], &[int_arg()], None);
        assert!(matches!(result, OverloadResult::Selected(s) if Rc::ptr_eq(&s.function, &by_int)));
    }

    #[test]
    fn crossing_arguments_are_ambiguous() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let a = free(&[TypeDescriptor::int(), double()]);
        let b = free(&[double(), TypeDescriptor::int()]);
        let result = resolve(&mut ctx, &[a, b], &[int_arg(), int_arg()], None);
        let OverloadResult::Ambiguous(first, second) = result else {
            panic!("expected ambiguity");
        };
        assert!(first.hash < second.hash);
    }

    #[test]
    fn ellipsis_loses_to_a_conversion() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let variadic = Rc::new(FunctionEntry::free("f", TypeDescriptor::void()).with_ellipsis());
        let by_double = free(&[double()]);
        let result = resolve(&mut ctx, &[variadic, Rc::clone(&by_double)], &[int_arg()], None);
        assert!(
            matches!(result, OverloadResult::Selected(s) if Rc::ptr_eq(&s.function, &by_double))
        );
    }

    #[test]
    fn nothing_viable_reports_no_match() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let ptr_only = free(&[TypeDescriptor::int().pointer_to()]);
        let result = resolve(&mut ctx, &[ptr_only], &[int_arg()], None);
        let err = select(&ctx, "f", result, &[int_arg()], None, Span::new(2, 1, 1)).unwrap_err();
        assert!(matches!(err, SemaError::NoMatchingOverload { ref args, .. } if args == "int"));
    }

    #[test]
    fn const_object_selects_const_member() {
        let mut registry = SymbolRegistry::new();
        let id = ClassId::new("Buffer");
        let plain = FunctionEntry::method(&id, "data", TypeDescriptor::int().pointer_to())
            .with_access(Access::Public);
        let constant = FunctionEntry::method(
            &id,
            "data",
            TypeDescriptor::int()
                .with_base_quals(Qualifiers::CONST)
                .pointer_to(),
        )
        .with_cv(Qualifiers::CONST)
        .with_access(Access::Public);
        registry
            .register_class(
                ClassEntry::class("Buffer")
                    .with_method(plain)
                    .with_method(constant),
            )
            .unwrap();
        let candidates: Vec<_> = registry
            .class(id.hash())
            .unwrap()
            .functions()
            .cloned()
            .collect();
        let mut ctx = SemaContext::new(&registry);

        let object = |quals| {
            Operand::identifier(
                Declaration::Variable(Rc::new(VariableEntry::global(
                    "b",
                    TypeDescriptor::class(id.clone()).with_base_quals(quals),
                ))),
                Span::new(1, 1, 1),
            )
        };
        let on_const = object(Qualifiers::CONST);
        let OverloadResult::Selected(s) = resolve(&mut ctx, &candidates, &[], Some(&on_const))
        else {
            panic!("expected a selection");
        };
        assert_eq!(s.function.cv, Qualifiers::CONST);

        let on_plain = object(Qualifiers::empty());
        let OverloadResult::Selected(s) = resolve(&mut ctx, &candidates, &[], Some(&on_plain))
        else {
            panic!("expected a selection");
        };
        assert_eq!(s.function.cv, Qualifiers::empty());
    }

    #[test]
    fn defaults_are_shared_nodes() {
        let default = Operand::integer(7, Span::new(9, 1, 1));
        let f = Rc::new(
            FunctionEntry::free("g", TypeDescriptor::void())
                .with_param("a", TypeDescriptor::int())
                .with_default_param("b", TypeDescriptor::int(), Rc::clone(&default)),
        );
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let args = [int_arg()];
        let OverloadResult::Selected(s) = resolve(&mut ctx, &[f], &args, None) else {
            panic!("expected a selection");
        };
        assert_eq!(s.defaulted(), 1);
        let converted = convert_arguments(&s, &args);
        assert_eq!(converted.len(), 2);
        assert!(Rc::ptr_eq(&converted[1], &default));
    }

    #[test]
    fn variadic_floats_become_double() {
        let f = Operand::literal(
            cxxfront_core::Literal::Float(ordered_float::OrderedFloat(1.5)),
            Span::new(1, 1, 1),
        );
        let narrowed = conversion::apply(
            &f,
            &ConversionOutcome::new(
                ConversionCategory::Standard,
                TypeDescriptor::primitive(PrimitiveKind::Float),
                conversion::ConversionPlan::steps(vec![PlannedStep::new(
                    ConversionStep::Arithmetic { promotion: false },
                    TypeDescriptor::primitive(PrimitiveKind::Float),
                )]),
            ),
        );
        assert_eq!(promote_variadic(&narrowed).ty(), Some(&double()));
    }

    #[test]
    fn base_pointer_parameter_beats_void_pointer_and_bool() {
        let mut registry = SymbolRegistry::new();
        let base = registry.register_class(ClassEntry::structure("Base")).unwrap();
        let derived = registry
            .register_class(ClassEntry::structure("Derived").with_base(&base, Access::Public))
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let by_bool = free(&[TypeDescriptor::bool()]);
        let by_void = free(&[TypeDescriptor::void().pointer_to()]);
        let by_base = free(&[TypeDescriptor::class(base).pointer_to()]);
        let arg = Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global(
                "d",
                TypeDescriptor::class(derived).pointer_to(),
            ))),
            Span::new(1, 1, 1),
        );
        let args = [arg];

        let all = [Rc::clone(&by_bool), Rc::clone(&by_void), Rc::clone(&by_base)];
        let result = resolve(&mut ctx, &all, &args, None);
        assert!(matches!(result, OverloadResult::Selected(s) if Rc::ptr_eq(&s.function, &by_base)));

        let result = resolve(&mut ctx, &[Rc::clone(&by_bool), Rc::clone(&by_void)], &args, None);
        assert!(matches!(result, OverloadResult::Selected(s) if Rc::ptr_eq(&s.function, &by_void)));
    }
}
