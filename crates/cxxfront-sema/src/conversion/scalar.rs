//! Standard conversions between non-class types, and reference binding.
//!
//! ## Algorithm
//!
//! 1. An overload set is resolved against a function-pointer target.
//! 2. Arrays and functions decay unless the target keeps them.
//! 3. Identical types rank `Equal`.
//! 4. Boolean, arithmetic, null-pointer, pointer and member-pointer rules
//!    apply in that order; the first that matches decides.
//!
//! Reference targets bind directly to a compatible lvalue. Otherwise a
//! `const` (non-volatile) reference binds to a converted temporary, and the
//! category is that of the conversion into the temporary.

use std::rc::Rc;

use cxxfront_core::{
    ClassId, ConversionStep, InheritancePath, Layer, Operand, OverloadSet, PrimitiveKind,
    Qualifiers, SemaError, Span, TypeDescriptor,
};
use tracing::trace;

use super::{
    Caster, ConversionCategory, ConversionMode, ConversionOutcome, ConversionPlan, ConversionTier,
    PlannedStep,
};
use crate::SemaContext;
use crate::access::is_base_accessible;
use crate::classify::{
    is_arithmetic, is_array, is_bool, is_enum, is_function_type, is_member_pointer, is_pointer,
    is_void,
};

type Result<T> = std::result::Result<T, SemaError>;

/// Conversions where neither side is a class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarToScalar;

impl Caster for ScalarToScalar {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn classify(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        _mode: ConversionMode,
    ) -> ConversionOutcome {
        let outcome = if dest.is_reference() {
            bind_reference(ctx, source, dest)
        } else {
            convert_value(ctx, source, dest)
        };
        trace!(to = %dest, category = ?outcome.category, "scalar conversion");
        outcome
    }
}

// ============================================================================
// Value conversions
// ============================================================================

fn convert_value(
    ctx: &SemaContext<'_>,
    source: &Rc<Operand>,
    dest: &TypeDescriptor,
) -> ConversionOutcome {
    let target = dest.unqualified();
    if let Operand::Overload(set) = source.as_ref() {
        return overload_to_pointer(set, &target);
    }
    let Some(source_ty) = source.ty() else {
        return ConversionOutcome::none(target);
    };

    let mut steps = Vec::new();
    let value = match source_ty.outer() {
        Some(Layer::Array(_)) if !is_array(&target) => {
            let decayed = source_ty.decay();
            steps.push(PlannedStep::new(ConversionStep::ArrayToPointer, decayed.clone()));
            decayed
        }
        Some(Layer::Function(_)) if !is_function_type(&target) => {
            let decayed = source_ty.decay();
            steps.push(PlannedStep::new(
                ConversionStep::FunctionToPointer,
                decayed.clone(),
            ));
            decayed
        }
        _ => source_ty.unqualified(),
    };

    if value == target {
        return ConversionOutcome::new(
            ConversionCategory::Equal,
            target,
            ConversionPlan::steps(steps),
        );
    }

    if is_bool(&target)
        && (is_arithmetic(&value) || is_pointer(&value) || is_member_pointer(&value))
    {
        let tier = if is_pointer(&value) || is_member_pointer(&value) {
            ConversionTier::PointerToBool
        } else {
            ConversionTier::Direct
        };
        steps.push(PlannedStep::new(ConversionStep::ToBool, target.clone()));
        return ConversionOutcome::new(
            ConversionCategory::Standard,
            target,
            ConversionPlan::steps(steps),
        )
        .with_tier(tier);
    }

    if is_arithmetic(&target) && is_arithmetic(&value) {
        return match arithmetic(&value, &target) {
            Some((category, step)) => {
                steps.push(PlannedStep::new(step, target.clone()));
                ConversionOutcome::new(category, target, ConversionPlan::steps(steps))
            }
            None => no_conversion(source_ty, target),
        };
    }

    if (is_pointer(&target) || is_member_pointer(&target)) && source.is_null_pointer_constant() {
        steps.push(PlannedStep::new(ConversionStep::NullPointer, target.clone()));
        return ConversionOutcome::new(
            ConversionCategory::Standard,
            target,
            ConversionPlan::steps(steps),
        );
    }

    if is_pointer(&target) && is_pointer(&value) {
        return match pointer(ctx, &value, &target) {
            Ok(Some(PointerRank {
                category,
                step,
                tier,
                distance,
            })) => {
                if let Some(step) = step {
                    steps.push(PlannedStep::new(step, target.clone()));
                }
                ConversionOutcome::new(category, target, ConversionPlan::steps(steps))
                    .with_tier(tier)
                    .with_distance(distance)
            }
            Ok(None) => no_conversion(source_ty, target),
            Err(error) => ConversionOutcome::failed(target, error),
        };
    }

    if is_member_pointer(&target) && is_member_pointer(&value) {
        return match member_pointer(ctx, &value, &target) {
            Ok(Some(path)) => {
                let distance = path.len() as u32;
                steps.push(PlannedStep::new(
                    ConversionStep::BaseToDerived { path },
                    target.clone(),
                ));
                ConversionOutcome::new(
                    ConversionCategory::Standard,
                    target,
                    ConversionPlan::steps(steps),
                )
                .with_distance(distance)
            }
            Ok(None) => no_conversion(source_ty, target),
            Err(error) => ConversionOutcome::failed(target, error),
        };
    }

    no_conversion(source_ty, target)
}

fn no_conversion(from: &TypeDescriptor, to: TypeDescriptor) -> ConversionOutcome {
    let error = SemaError::NoConversion {
        from: from.to_string(),
        to: to.to_string(),
        span: Span::synthetic(),
    };
    ConversionOutcome::failed(to, error)
}

/// Category of an implicit conversion between two arithmetic kinds.
///
/// Widening to a higher rank within the same signedness, promotion of the
/// small integral kinds to `int`, and widening between floating kinds are
/// promotions. Same-rank pairs such as `char` and `signed char` are
/// standard conversions both ways.
pub fn arithmetic_category(from: PrimitiveKind, to: PrimitiveKind) -> ConversionCategory {
    if from == to {
        return ConversionCategory::Equal;
    }
    if to == PrimitiveKind::Bool {
        return ConversionCategory::Standard;
    }
    if from.is_integral() && to.is_integral() {
        let small_to_int = to == PrimitiveKind::Int && from.promoted() == PrimitiveKind::Int;
        let widening = from != PrimitiveKind::Bool
            && from.is_signed() == to.is_signed()
            && from.integer_rank() < to.integer_rank()
            && from.fits_in(to);
        if small_to_int || widening {
            return ConversionCategory::Promotion;
        }
        return ConversionCategory::Standard;
    }
    if from.is_floating() && to.is_floating() && from.fits_in(to) {
        return ConversionCategory::Promotion;
    }
    ConversionCategory::Standard
}

fn arithmetic(
    from: &TypeDescriptor,
    to: &TypeDescriptor,
) -> Option<(ConversionCategory, ConversionStep)> {
    match (from.primitive_kind(), to.primitive_kind()) {
        (Some(a), Some(b)) => {
            let category = arithmetic_category(a, b);
            Some((
                category,
                ConversionStep::Arithmetic {
                    promotion: category == ConversionCategory::Promotion,
                },
            ))
        }
        // Enumeration to an arithmetic type.
        (None, Some(b)) if is_enum(from) => {
            let category = if b == PrimitiveKind::Int {
                ConversionCategory::Promotion
            } else {
                ConversionCategory::Standard
            };
            Some((category, ConversionStep::EnumToIntegral))
        }
        // Integral to enumeration, or between enumerations, is explicit only.
        _ => None,
    }
}

struct PointerRank {
    category: ConversionCategory,
    step: Option<ConversionStep>,
    tier: ConversionTier,
    distance: u32,
}

fn pointer(
    ctx: &SemaContext<'_>,
    from: &TypeDescriptor,
    to: &TypeDescriptor,
) -> Result<Option<PointerRank>> {
    let (Some(from_pointee), Some(to_pointee)) = (from.pointee(), to.pointee()) else {
        return Ok(None);
    };
    let from_quals = from_pointee.top_quals();
    let to_quals = to_pointee.top_quals();
    if !to_quals.at_least(from_quals) {
        return Err(SemaError::TypeMismatch {
            message: format!("conversion from '{from}' to '{to}' discards qualifiers"),
            span: Span::synthetic(),
        });
    }
    let added = to_quals.count() - from_quals.count();

    if from_pointee.unqualified() == to_pointee.unqualified() {
        return Ok(Some(PointerRank {
            category: ConversionCategory::QualifierOnly,
            step: Some(ConversionStep::Qualification),
            tier: ConversionTier::Direct,
            distance: added,
        }));
    }
    if is_void(&to_pointee) && !is_function_type(&from_pointee) {
        return Ok(Some(PointerRank {
            category: ConversionCategory::Standard,
            step: Some(ConversionStep::PointerToVoid),
            tier: ConversionTier::ToVoidPointer,
            distance: added,
        }));
    }
    if let (Some(derived), Some(base)) = (from_pointee.class_id(), to_pointee.class_id()) {
        if let Some(path) = base_path(ctx, derived, base)? {
            let distance = path.len() as u32;
            return Ok(Some(PointerRank {
                category: ConversionCategory::Standard,
                step: Some(ConversionStep::DerivedToBase { path }),
                tier: ConversionTier::Direct,
                distance,
            }));
        }
    }
    Ok(None)
}

fn member_pointer(
    ctx: &SemaContext<'_>,
    from: &TypeDescriptor,
    to: &TypeDescriptor,
) -> Result<Option<InheritancePath>> {
    let (
        Some(Layer::MemberPointer { class: base, .. }),
        Some(Layer::MemberPointer { class: derived, .. }),
    ) = (from.outer(), to.outer())
    else {
        return Ok(None);
    };
    let (Some(from_member), Some(to_member)) = (from.pointee(), to.pointee()) else {
        return Ok(None);
    };
    if from_member.unqualified() != to_member.unqualified()
        || !to_member.top_quals().at_least(from_member.top_quals())
    {
        return Ok(None);
    }
    base_path(ctx, derived, base)
}

/// The unique, accessible path from `derived` to its base `base`.
///
/// `Ok(None)` when `base` is not a base of `derived`.
pub fn base_path(
    ctx: &SemaContext<'_>,
    derived: &ClassId,
    base: &ClassId,
) -> Result<Option<InheritancePath>> {
    let hierarchy = ctx.registry().hierarchy();
    if !hierarchy.is_derived_from(derived, base) {
        return Ok(None);
    }
    let paths = hierarchy.paths(derived, base);
    let Some(first) = paths.first() else {
        return Ok(None);
    };
    if paths.iter().any(|p| p.subobject() != first.subobject()) {
        return Err(SemaError::AmbiguousBase {
            base: base.to_string(),
            derived: derived.to_string(),
            span: Span::synthetic(),
        });
    }
    if !is_base_accessible(ctx, derived, base, ctx.scope()) {
        return Err(SemaError::Inaccessible {
            member: format!("base class '{base}' of '{derived}'"),
            span: Span::synthetic(),
        });
    }
    Ok(Some(first.clone()))
}

fn overload_to_pointer(set: &OverloadSet, target: &TypeDescriptor) -> ConversionOutcome {
    let chosen = set
        .candidates
        .iter()
        .find(|candidate| &candidate.address_type() == target);
    match chosen {
        Some(function) => ConversionOutcome::new(
            ConversionCategory::Equal,
            target.clone(),
            ConversionPlan {
                resolved: Some(Rc::clone(function)),
                before: vec![PlannedStep::new(
                    ConversionStep::FunctionToPointer,
                    target.clone(),
                )],
                ..ConversionPlan::default()
            },
        ),
        None => ConversionOutcome::failed(
            target.clone(),
            SemaError::NoConversion {
                from: format!("overloaded function '{}'", set.name),
                to: target.to_string(),
                span: set.span,
            },
        ),
    }
}

// ============================================================================
// Reference binding
// ============================================================================

fn bind_reference(
    ctx: &mut SemaContext<'_>,
    source: &Rc<Operand>,
    dest: &TypeDescriptor,
) -> ConversionOutcome {
    let referent = dest.strip_reference();
    let wanted = referent.top_quals();

    if source.is_lvalue() {
        if let Some(source_ty) = source.ty() {
            let held = source_ty.top_quals();
            if wanted.at_least(held) && source_ty.unqualified() == referent.unqualified() {
                return if wanted == held {
                    ConversionOutcome::exact(dest.clone())
                } else {
                    ConversionOutcome::new(
                        ConversionCategory::QualifierOnly,
                        dest.clone(),
                        ConversionPlan::steps(vec![PlannedStep::lvalue(
                            ConversionStep::Qualification,
                            dest.clone(),
                        )]),
                    )
                    .with_distance(wanted.count() - held.count())
                };
            }
        }
    }

    if !binds_temporaries(wanted) {
        let from = super::describe_source(source);
        return ConversionOutcome::failed(
            dest.clone(),
            SemaError::TypeMismatch {
                message: format!(
                    "cannot bind reference of type '{dest}' to a value of type '{from}'"
                ),
                span: Span::synthetic(),
            },
        );
    }

    let mut outcome = convert_value(ctx, source, &referent.unqualified());
    if !outcome.is_viable() {
        outcome.ty = dest.clone();
        return outcome;
    }
    outcome.plan.before.push(PlannedStep::lvalue(
        ConversionStep::BindReference { temporary: true },
        dest.clone(),
    ));
    outcome.ty = dest.clone();
    outcome
}

/// Only references to `const`, non-`volatile` types bind temporaries.
pub(crate) fn binds_temporaries(quals: Qualifiers) -> bool {
    quals.is_const() && !quals.is_volatile()
}

// ============================================================================
// Arithmetic and pointer operand rules
// ============================================================================

/// Integral promotion of an arithmetic or enumeration type.
pub fn promote(ty: &TypeDescriptor) -> Option<PrimitiveKind> {
    if is_enum(ty) {
        return Some(PrimitiveKind::Int);
    }
    ty.primitive_kind()
        .filter(|kind| kind.is_arithmetic())
        .map(PrimitiveKind::promoted)
}

/// The common type of a binary arithmetic operation.
pub fn usual_arithmetic(a: &TypeDescriptor, b: &TypeDescriptor) -> Option<PrimitiveKind> {
    let (x, y) = (promote(a)?, promote(b)?);
    if x.is_floating() || y.is_floating() {
        let rank = |k: PrimitiveKind| k.floating_rank().map_or(-1, i16::from);
        return Some(if rank(x) >= rank(y) { x } else { y });
    }
    if x == y {
        return Some(x);
    }
    let (rx, ry) = (x.integer_rank()?, y.integer_rank()?);
    if x.is_signed() == y.is_signed() {
        return Some(if rx >= ry { x } else { y });
    }
    let (signed, unsigned, rs, ru) = if x.is_signed() {
        (x, y, rx, ry)
    } else {
        (y, x, ry, rx)
    };
    Some(if ru >= rs {
        unsigned
    } else if unsigned.fits_in(signed) {
        signed
    } else {
        signed.to_unsigned()
    })
}

/// The type two pointer (or null) operands are brought to for comparison
/// and for the conditional operator.
pub fn composite_pointer_type(
    ctx: &SemaContext<'_>,
    a: &Operand,
    b: &Operand,
) -> Option<TypeDescriptor> {
    let (a_ty, b_ty) = (a.ty()?.decay(), b.ty()?.decay());
    let pointer_like = |t: &TypeDescriptor| is_pointer(t) || is_member_pointer(t);
    if a.is_null_pointer_constant() && pointer_like(&b_ty) {
        return Some(b_ty);
    }
    if b.is_null_pointer_constant() && pointer_like(&a_ty) {
        return Some(a_ty);
    }
    if is_member_pointer(&a_ty) || is_member_pointer(&b_ty) {
        return (a_ty == b_ty).then_some(a_ty);
    }
    if !is_pointer(&a_ty) || !is_pointer(&b_ty) {
        return None;
    }
    let (a_pointee, b_pointee) = (a_ty.pointee()?, b_ty.pointee()?);
    let quals = a_pointee.top_quals() | b_pointee.top_quals();
    if a_pointee.unqualified() == b_pointee.unqualified() {
        return Some(a_pointee.with_top_quals(quals).pointer_to());
    }
    let either_void = is_void(&a_pointee) || is_void(&b_pointee);
    let either_function = is_function_type(&a_pointee) || is_function_type(&b_pointee);
    if either_void && !either_function {
        return Some(TypeDescriptor::void().with_base_quals(quals).pointer_to());
    }
    let (Some(x), Some(y)) = (a_pointee.class_id(), b_pointee.class_id()) else {
        return None;
    };
    let hierarchy = ctx.registry().hierarchy();
    if hierarchy.is_derived_from(x, y) {
        Some(b_pointee.with_top_quals(quals).pointer_to())
    } else if hierarchy.is_derived_from(y, x) {
        Some(a_pointee.with_top_quals(quals).pointer_to())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{AutoCastManager, apply};
    use cxxfront_core::{
        Access, ClassEntry, Declaration, FunctionEntry, FunctionPrototype, VariableEntry,
    };
    use cxxfront_registry::SymbolRegistry;

    fn ty(kind: PrimitiveKind) -> TypeDescriptor {
        TypeDescriptor::primitive(kind)
    }

    fn value(t: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global("v", t))),
            Span::new(1, 1, 1),
        )
    }

    fn rank(
        registry: &SymbolRegistry,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
    ) -> ConversionCategory {
        let mut ctx = SemaContext::new(registry);
        ScalarToScalar
            .classify(&mut ctx, source, dest, ConversionMode::Copy)
            .category
    }

    #[test]
    fn arithmetic_categories() {
        use PrimitiveKind::*;
        assert_eq!(arithmetic_category(Int, Int), ConversionCategory::Equal);
        assert_eq!(arithmetic_category(Char, Int), ConversionCategory::Promotion);
        assert_eq!(arithmetic_category(Bool, Int), ConversionCategory::Promotion);
        assert_eq!(arithmetic_category(Int, Long), ConversionCategory::Promotion);
        assert_eq!(arithmetic_category(Float, Double), ConversionCategory::Promotion);
        assert_eq!(arithmetic_category(Int, UnsignedInt), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(Int, Double), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(Double, Float), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(Long, Int), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(Int, Bool), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(Char, SignedChar), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(SignedChar, Char), ConversionCategory::Standard);
        assert_eq!(arithmetic_category(UnsignedShort, WChar), ConversionCategory::Standard);
    }

    #[test]
    fn no_pair_promotes_both_ways() {
        use PrimitiveKind::*;
        let kinds = [
            Bool, Char, SignedChar, UnsignedChar, WChar, Short, UnsignedShort, Int, UnsignedInt,
            Long, UnsignedLong, Float, Double, LongDouble,
        ];
        for a in kinds {
            for b in kinds {
                let both = arithmetic_category(a, b) == ConversionCategory::Promotion
                    && arithmetic_category(b, a) == ConversionCategory::Promotion;
                assert!(!both, "{a:?} and {b:?} promote to each other");
            }
        }
    }

    #[test]
    fn equal_only_for_identical_arithmetic_types() {
        use PrimitiveKind::*;
        let kinds = [Bool, Char, Short, Int, UnsignedInt, Long, Float, Double];
        for a in kinds {
            for b in kinds {
                assert_eq!(arithmetic_category(a, b) == ConversionCategory::Equal, a == b);
            }
        }
    }

    #[test]
    fn null_constant_to_pointer_but_not_other_zeroes() {
        let registry = SymbolRegistry::new();
        let int_ptr = TypeDescriptor::int().pointer_to();
        assert_eq!(
            rank(&registry, &Operand::integer(0, Span::new(1, 1, 1)), &int_ptr),
            ConversionCategory::Standard
        );
        assert_eq!(
            rank(&registry, &Operand::integer(1, Span::new(1, 1, 1)), &int_ptr),
            ConversionCategory::NoConversion
        );
        assert_eq!(
            rank(&registry, &value(TypeDescriptor::int()), &int_ptr),
            ConversionCategory::NoConversion
        );
    }

    #[test]
    fn pointer_qualification_and_void() {
        let registry = SymbolRegistry::new();
        let int_ptr = TypeDescriptor::int().pointer_to();
        let const_ptr = TypeDescriptor::int()
            .with_base_quals(Qualifiers::CONST)
            .pointer_to();
        assert_eq!(
            rank(&registry, &value(int_ptr.clone()), &const_ptr),
            ConversionCategory::QualifierOnly
        );
        assert_eq!(
            rank(&registry, &value(const_ptr.clone()), &int_ptr),
            ConversionCategory::NoConversion
        );
        assert_eq!(
            rank(&registry, &value(int_ptr.clone()), &TypeDescriptor::void().pointer_to()),
            ConversionCategory::Standard
        );
        assert_eq!(
            rank(&registry, &value(int_ptr), &TypeDescriptor::bool()),
            ConversionCategory::Standard
        );
    }

    #[test]
    fn array_decays_to_pointer() {
        let registry = SymbolRegistry::new();
        let array = value(TypeDescriptor::int().array_of(Some(4)));
        let mut ctx = SemaContext::new(&registry);
        let outcome = ScalarToScalar.classify(
            &mut ctx,
            &array,
            &TypeDescriptor::int().pointer_to(),
            ConversionMode::Copy,
        );
        assert_eq!(outcome.category, ConversionCategory::Equal);
        assert_eq!(outcome.plan.before[0].step, ConversionStep::ArrayToPointer);
    }

    #[test]
    fn derived_to_base_pointers() {
        let mut registry = SymbolRegistry::new();
        let a = registry.register_class(ClassEntry::class("A")).unwrap();
        let b = registry
            .register_class(ClassEntry::class("B").with_base(&a, Access::Public))
            .unwrap();
        let c = registry
            .register_class(ClassEntry::class("C").with_base(&a, Access::Public))
            .unwrap();
        let d = registry
            .register_class(
                ClassEntry::class("D")
                    .with_base(&b, Access::Public)
                    .with_base(&c, Access::Public),
            )
            .unwrap();
        let to_b = TypeDescriptor::class(b.clone()).pointer_to();
        let to_a = TypeDescriptor::class(a.clone()).pointer_to();
        let from_d = value(TypeDescriptor::class(d.clone()).pointer_to());

        let mut ctx = SemaContext::new(&registry);
        let outcome = ScalarToScalar.classify(&mut ctx, &from_d, &to_b, ConversionMode::Copy);
        assert_eq!(outcome.category, ConversionCategory::Standard);
        assert_eq!(outcome.distance, 1);

        let outcome = ScalarToScalar.classify(&mut ctx, &from_d, &to_a, ConversionMode::Copy);
        assert!(!outcome.is_viable());
        assert!(matches!(outcome.error, Some(SemaError::AmbiguousBase { .. })));
    }

    #[test]
    fn references_bind_lvalues_or_const_temporaries() {
        let registry = SymbolRegistry::new();
        let int_ref = TypeDescriptor::int().reference_to();
        let const_ref = TypeDescriptor::int()
            .with_base_quals(Qualifiers::CONST)
            .reference_to();
        let lvalue = value(TypeDescriptor::int());
        let rvalue = Operand::integer(4, Span::new(1, 1, 1));

        assert_eq!(rank(&registry, &lvalue, &int_ref), ConversionCategory::Equal);
        assert_eq!(rank(&registry, &lvalue, &const_ref), ConversionCategory::QualifierOnly);
        assert_eq!(rank(&registry, &rvalue, &int_ref), ConversionCategory::NoConversion);
        assert_eq!(rank(&registry, &rvalue, &const_ref), ConversionCategory::Equal);
        assert_eq!(
            rank(&registry, &value(ty(PrimitiveKind::Long)), &int_ref),
            ConversionCategory::NoConversion
        );
        assert_eq!(
            rank(&registry, &value(ty(PrimitiveKind::Long)), &const_ref),
            ConversionCategory::Standard
        );
    }

    #[test]
    fn overload_set_resolves_against_function_pointer() {
        let registry = SymbolRegistry::new();
        let by_int = Rc::new(
            FunctionEntry::free("f", TypeDescriptor::void()).with_param("x", TypeDescriptor::int()),
        );
        let by_double = Rc::new(
            FunctionEntry::free("f", TypeDescriptor::void())
                .with_param("x", ty(PrimitiveKind::Double)),
        );
        let set = Operand::overloads(
            "f",
            vec![Rc::clone(&by_int), Rc::clone(&by_double)],
            None,
            false,
            Span::new(1, 1, 1),
        );
        let target = TypeDescriptor::void()
            .function_returning(FunctionPrototype::new(vec![ty(PrimitiveKind::Double)]))
            .pointer_to();
        let mut ctx = SemaContext::new(&registry);
        let outcome =
            AutoCastManager::new().classify(&mut ctx, &set, &target, ConversionMode::Copy);
        assert_eq!(outcome.category, ConversionCategory::Equal);
        let node = apply(&set, &outcome);
        let leaf = Operand::innermost(&node);
        assert!(matches!(
            leaf.declaration(),
            Some(Declaration::Function(f)) if Rc::ptr_eq(f, &by_double)
        ));
    }

    #[test]
    fn usual_arithmetic_conversions() {
        use PrimitiveKind::*;
        let common = |a, b| usual_arithmetic(&ty(a), &ty(b));
        assert_eq!(common(Char, Short), Some(Int));
        assert_eq!(common(Int, Double), Some(Double));
        assert_eq!(common(Float, Long), Some(Float));
        assert_eq!(common(Int, UnsignedInt), Some(UnsignedInt));
        assert_eq!(common(UnsignedInt, Long), Some(Long));
        assert_eq!(common(Long, UnsignedLong), Some(UnsignedLong));
        assert_eq!(usual_arithmetic(&TypeDescriptor::void(), &ty(Int)), None);
    }

    #[test]
    fn composite_pointer_of_related_classes() {
        let mut registry = SymbolRegistry::new();
        let base = registry.register_class(ClassEntry::class("Base")).unwrap();
        let derived = registry
            .register_class(ClassEntry::class("Derived").with_base(&base, Access::Public))
            .unwrap();
        let ctx = SemaContext::new(&registry);
        let b = value(TypeDescriptor::class(base.clone()).pointer_to());
        let d = value(TypeDescriptor::class(derived).pointer_to());
        assert_eq!(
            composite_pointer_type(&ctx, &b, &d),
            Some(TypeDescriptor::class(base).pointer_to())
        );
        let zero = Operand::integer(0, Span::new(1, 1, 1));
        assert_eq!(
            composite_pointer_type(&ctx, &zero, &d).map(|t| t.to_string()),
            Some("Derived*".to_string())
        );
    }
}
