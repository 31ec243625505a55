//! Explicit casts.
//!
//! ## Algorithm
//!
//! - `static_cast`: to `void`; any implicit conversion in direct mode
//!   (explicit constructors and conversion functions included); base to
//!   derived pointer or reference over a unique, accessible, non-virtual
//!   path; `void*` to an object pointer; integral or enumeration to an
//!   enumeration. Never removes qualifiers.
//! - `dynamic_cast`: an upcast, or a pointer/reference to a complete
//!   polymorphic class checked at run time (`void*` targets included).
//! - `reinterpret_cast`: pointer to pointer, pointer to and from integral,
//!   member pointer to member pointer of the same kind, lvalue to
//!   reference.
//! - `const_cast`: types equal up to qualifiers; an rvalue never becomes
//!   an lvalue.
//! - `(T)e` tries const, static, static followed by const, then
//!   reinterpret. `T(e)` with one argument is `(T)e`; other argument counts
//!   construct a class or value-initialize a scalar.

use std::rc::Rc;

use cxxfront_core::{
    CallExpr, Callee, CastKind, ClassId, ConversionStep, ExprKind, Layer, Operand, OperatorCode,
    Qualifiers, SemaError, Span, TypeDescriptor,
};
use tracing::trace;

use super::{Result, decayed, invalid, mismatch, value_type, with_steps};
use crate::SemaContext;
use crate::classify::{
    compare_structural, is_arithmetic, is_enum, is_function_pointer, is_integral,
    is_member_pointer, is_object_pointer, is_pointer, is_void, is_void_pointer,
};
use crate::conversion::{AutoCastManager, ConversionMode, PlannedStep, apply, base_path};
use crate::overload;

fn cast_operator(kind: CastKind) -> OperatorCode {
    match kind {
        CastKind::Static => OperatorCode::StaticCast,
        CastKind::Dynamic => OperatorCode::DynamicCast,
        CastKind::Reinterpret => OperatorCode::ReinterpretCast,
        CastKind::Const => OperatorCode::ConstCast,
        CastKind::CStyle => OperatorCode::CStyleCast,
        CastKind::Functional => OperatorCode::FunctionalCast,
    }
}

fn not_allowed(
    kind: CastKind,
    from: &TypeDescriptor,
    to: &TypeDescriptor,
    span: Span,
) -> SemaError {
    mismatch(
        &format!("{} from '{from}' to '{to}' is not allowed", cast_operator(kind)),
        span,
    )
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_cast(
    ctx: &mut SemaContext<'_>,
    kind: CastKind,
    target: &TypeDescriptor,
    args: &[Rc<Operand>],
    span: Span,
) -> Result<Rc<Operand>> {
    let converted = match (kind, args) {
        (CastKind::Functional, [operand]) => c_style(ctx, operand, target, span)?,
        (CastKind::Functional, _) => return construct(ctx, target, args, span),
        (_, [operand]) => {
            value_type(operand, span)?;
            match kind {
                CastKind::Static => static_cast(ctx, operand, target, span)?,
                CastKind::Dynamic => dynamic_cast(ctx, operand, target, span)?,
                CastKind::Reinterpret => reinterpret_cast(operand, target, span)?,
                CastKind::Const => const_cast(operand, target, span)?,
                CastKind::CStyle | CastKind::Functional => c_style(ctx, operand, target, span)?,
            }
        }
        _ => {
            return Err(invalid(
                cast_operator(kind),
                format!("expected one operand, got {}", args.len()),
                span,
            ));
        }
    };
    let is_lvalue = target.is_reference();
    Ok(Operand::expression(
        ExprKind::Cast {
            kind,
            operand: converted,
        },
        target.clone(),
        is_lvalue,
        span,
    ))
}

/// The operand as the cast sees it: decayed unless a reference is formed.
fn source(operand: &Rc<Operand>, target: &TypeDescriptor, span: Span) -> Result<Rc<Operand>> {
    if target.is_reference() {
        Ok(Rc::clone(operand))
    } else {
        decayed(operand, span)
    }
}

fn step(operand: &Rc<Operand>, step: ConversionStep, target: &TypeDescriptor) -> Rc<Operand> {
    let planned = if target.is_reference() {
        PlannedStep::lvalue(step, target.strip_reference())
    } else {
        PlannedStep::new(step, target.clone())
    };
    with_steps(operand, vec![planned])
}

/// Qualifiers at every indirection level of `from` are present in `to`.
fn keeps_qualifiers(from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
    let (mut from, mut to) = (from.strip_reference(), to.strip_reference());
    loop {
        match (from.pointee(), to.pointee()) {
            (Some(f), Some(t)) => {
                if !t.top_quals().at_least(f.top_quals()) {
                    return false;
                }
                from = f;
                to = t;
            }
            _ => return true,
        }
    }
}

/// The class a pointer or reference cast works on, with its qualifiers.
fn class_target(ty: &TypeDescriptor) -> Option<(ClassId, Qualifiers)> {
    let object = if ty.is_reference() {
        ty.strip_reference()
    } else if is_pointer(ty) {
        ty.pointee()?
    } else {
        return None;
    };
    Some((object.class_id()?.clone(), object.top_quals()))
}

/// The class an operand designates for a pointer or reference cast.
fn class_source(operand: &Operand, target: &TypeDescriptor) -> Option<(ClassId, Qualifiers)> {
    let ty = operand.ty()?;
    if target.is_reference() {
        if !operand.is_lvalue() {
            return None;
        }
        return Some((ty.class_id()?.clone(), ty.top_quals()));
    }
    if !is_pointer(ty) {
        return None;
    }
    let pointee = ty.pointee()?;
    Some((pointee.class_id()?.clone(), pointee.top_quals()))
}

// ============================================================================
// static_cast
// ============================================================================

fn static_cast(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    target: &TypeDescriptor,
    span: Span,
) -> Result<Rc<Operand>> {
    if is_void(target) {
        return Ok(step(operand, ConversionStep::ToVoid, target));
    }
    let outcome = AutoCastManager::new().classify(ctx, operand, target, ConversionMode::Direct);
    if outcome.is_viable() {
        return Ok(apply(operand, &outcome));
    }
    if let Some(error) = outcome.error {
        if !matches!(error, SemaError::NoConversion { .. }) {
            return Err(error.or_span(span));
        }
    }

    let value = source(operand, target, span)?;
    let from = value_type(&value, span)?;

    if let (Some((derived, to_quals)), Some((base, from_quals))) =
        (class_target(target), class_source(&value, target))
    {
        if let Some(path) = base_path(ctx, &derived, &base).map_err(|e| e.or_span(span))? {
            if path.has_virtual_edge() {
                return Err(mismatch(
                    &format!("cannot cast '{base}' to '{derived}' through a virtual base"),
                    span,
                ));
            }
            if !to_quals.at_least(from_quals) {
                return Err(not_allowed(CastKind::Static, &from, target, span));
            }
            trace!(%base, %derived, "downcast");
            return Ok(step(&value, ConversionStep::BaseToDerived { path }, target));
        }
    }
    if is_void_pointer(&from) && is_object_pointer(target) && keeps_qualifiers(&from, target) {
        return Ok(step(&value, ConversionStep::VoidToPointer, target));
    }
    if is_enum(target) && is_arithmetic(&from) {
        return Ok(step(&value, ConversionStep::IntegralToEnum, target));
    }
    Err(not_allowed(CastKind::Static, &from, target, span))
}

// ============================================================================
// dynamic_cast
// ============================================================================

fn dynamic_cast(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    target: &TypeDescriptor,
    span: Span,
) -> Result<Rc<Operand>> {
    let value = source(operand, target, span)?;
    let from = value_type(&value, span)?;
    let void_target = is_void_pointer(target);
    let target_class = class_target(target);
    if target_class.is_none() && !void_target {
        return Err(mismatch(
            &format!("'{target}' is not a pointer or reference to a class"),
            span,
        ));
    }
    let Some((source_class, from_quals)) = class_source(&value, target) else {
        return Err(not_allowed(CastKind::Dynamic, &from, target, span));
    };
    let to_quals = match &target_class {
        Some((_, quals)) => *quals,
        None => target.pointee().map(|p| p.top_quals()).unwrap_or_default(),
    };
    if !to_quals.at_least(from_quals) {
        return Err(not_allowed(CastKind::Dynamic, &from, target, span));
    }

    if let Some((target_id, _)) = &target_class {
        let upcast = target_id == &source_class
            || base_path(ctx, &source_class, target_id)
                .map_err(|e| e.or_span(span))?
                .is_some();
        if upcast {
            let outcome = AutoCastManager::standard_only().classify(
                ctx,
                &value,
                target,
                ConversionMode::Direct,
            );
            if outcome.is_viable() {
                return Ok(apply(&value, &outcome));
            }
            return Err(outcome.into_error(&value, span));
        }
    }

    let registry = ctx.registry();
    let view = registry.class_graph(source_class.hash());
    if !view.is_some_and(|v| v.is_complete()) {
        return Err(SemaError::Structural {
            message: format!("'{source_class}' is an incomplete type"),
            span,
        });
    }
    if !view.is_some_and(|v| v.is_polymorphic()) {
        return Err(mismatch(
            &format!("'{source_class}' is not polymorphic"),
            span,
        ));
    }
    if let Some((target_id, _)) = &target_class {
        let complete = registry
            .class_graph(target_id.hash())
            .is_some_and(|v| v.is_complete());
        if !complete {
            return Err(SemaError::Structural {
                message: format!("'{target_id}' is an incomplete type"),
                span,
            });
        }
    }
    Ok(step(&value, ConversionStep::Dynamic, target))
}

// ============================================================================
// reinterpret_cast
// ============================================================================

fn reinterpret_cast(
    operand: &Rc<Operand>,
    target: &TypeDescriptor,
    span: Span,
) -> Result<Rc<Operand>> {
    if target.is_reference() {
        let from = value_type(operand, span)?;
        if !operand.is_lvalue() {
            return Err(SemaError::NotAnLvalue {
                context: "reinterpret_cast to a reference",
                span,
            });
        }
        if !keeps_qualifiers(&from.pointer_to(), &target.strip_reference().pointer_to()) {
            return Err(not_allowed(CastKind::Reinterpret, &from, target, span));
        }
        return Ok(step(operand, ConversionStep::Reinterpret, target));
    }
    let value = decayed(operand, span)?;
    let from = value_type(&value, span)?;
    if from.unqualified() == target.unqualified() {
        return Ok(value);
    }
    let pointers = (is_object_pointer(&from) || is_function_pointer(&from))
        && (is_object_pointer(target) || is_function_pointer(target));
    let step_kind = if pointers {
        if !keeps_qualifiers(&from, target) {
            return Err(not_allowed(CastKind::Reinterpret, &from, target, span));
        }
        ConversionStep::Reinterpret
    } else if is_pointer(&from) && is_integral(target) && !is_enum(target) {
        ConversionStep::PointerToIntegral
    } else if is_integral(&from) && is_pointer(target) {
        ConversionStep::IntegralToPointer
    } else if is_member_pointer(&from)
        && is_member_pointer(target)
        && same_member_kind(&from, target)
    {
        ConversionStep::Reinterpret
    } else {
        return Err(not_allowed(CastKind::Reinterpret, &from, target, span));
    };
    Ok(step(&value, step_kind, target))
}

/// Both point to data members or both to member functions.
fn same_member_kind(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    let function = |t: &TypeDescriptor| {
        t.pointee()
            .is_some_and(|p| matches!(p.outer(), Some(Layer::Function(_))))
    };
    function(a) == function(b)
}

// ============================================================================
// const_cast
// ============================================================================

fn const_cast(operand: &Rc<Operand>, target: &TypeDescriptor, span: Span) -> Result<Rc<Operand>> {
    let from = value_type(operand, span)?;
    if target.is_reference() {
        if !operand.is_lvalue() {
            return Err(SemaError::NotAnLvalue {
                context: "const_cast to a reference",
                span,
            });
        }
        if !compare_structural(&from, &target.strip_reference()) {
            return Err(not_allowed(CastKind::Const, &from, target, span));
        }
        return Ok(step(operand, ConversionStep::ConstAdjust, target));
    }
    let value = decayed(operand, span)?;
    let from = value_type(&value, span)?;
    if !(is_pointer(target) || is_member_pointer(target)) || !compare_structural(&from, target) {
        return Err(not_allowed(CastKind::Const, &from, target, span));
    }
    Ok(step(&value, ConversionStep::ConstAdjust, target))
}

// ============================================================================
// C-style and functional casts
// ============================================================================

fn c_style(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    target: &TypeDescriptor,
    span: Span,
) -> Result<Rc<Operand>> {
    let from = value_type(operand, span)?;
    if let Ok(node) = const_cast(operand, target, span) {
        trace!("C-style cast as const_cast");
        return Ok(node);
    }
    match static_cast(ctx, operand, target, span) {
        Ok(node) => {
            trace!("C-style cast as static_cast");
            return Ok(node);
        }
        Err(error @ SemaError::AmbiguousConversion { .. })
        | Err(error @ SemaError::AmbiguousBase { .. }) => return Err(error),
        Err(_) => {}
    }
    if let Some(relaxed) = with_source_qualifiers(&from, target) {
        if let Ok(node) = static_cast(ctx, operand, &relaxed, span) {
            if let Ok(node) = const_cast(&node, target, span) {
                trace!("C-style cast as static_cast then const_cast");
                return Ok(node);
            }
        }
    }
    if let Ok(node) = reinterpret_cast(operand, target, span) {
        trace!("C-style cast as reinterpret_cast");
        return Ok(node);
    }
    Err(mismatch(
        &format!("C-style cast from '{from}' to '{target}' is not allowed"),
        span,
    ))
}

/// `target` with the pointee (or referee) qualifiers of `from` added.
fn with_source_qualifiers(
    from: &TypeDescriptor,
    target: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    if target.is_reference() {
        let quals = from.strip_reference().top_quals();
        return Some(target.strip_reference().add_top_quals(quals).reference_to());
    }
    let quals = from.decay().pointee()?.top_quals();
    let pointee = target.pointee()?;
    is_pointer(target).then(|| pointee.add_top_quals(quals).pointer_to())
}

/// `T(a, b, ...)` and `T()`.
fn construct(
    ctx: &mut SemaContext<'_>,
    target: &TypeDescriptor,
    args: &[Rc<Operand>],
    span: Span,
) -> Result<Rc<Operand>> {
    let Some(class) = target.class_id() else {
        if !args.is_empty() {
            return Err(invalid(
                OperatorCode::FunctionalCast,
                format!("too many arguments to initialize '{target}'"),
                span,
            ));
        }
        if is_void(target) {
            return Ok(Operand::expression(
                ExprKind::Cast {
                    kind: CastKind::Functional,
                    operand: Operand::type_name(target.clone(), span),
                },
                target.clone(),
                false,
                span,
            ));
        }
        let zero = step(
            &Operand::integer(0, span),
            ConversionStep::Arithmetic { promotion: false },
            target,
        );
        return Ok(Operand::expression(
            ExprKind::Cast {
                kind: CastKind::Functional,
                operand: zero,
            },
            target.unqualified(),
            false,
            span,
        ));
    };
    let registry = ctx.registry();
    let Some(view) = registry.class_graph(class.hash()).filter(|v| v.is_complete()) else {
        return Err(SemaError::Structural {
            message: format!("'{class}' is an incomplete type"),
            span,
        });
    };
    if view.is_abstract() {
        return Err(SemaError::Structural {
            message: format!("cannot construct an object of abstract class '{class}'"),
            span,
        });
    }
    let constructors: Vec<_> = view.constructors().cloned().collect();
    if constructors.is_empty() && args.is_empty() {
        return Ok(Operand::expression(
            ExprKind::Cast {
                kind: CastKind::Functional,
                operand: Operand::type_name(target.clone(), span),
            },
            target.unqualified(),
            false,
            span,
        ));
    }
    let result = overload::resolve(ctx, &constructors, args, None);
    let selection = overload::select(ctx, &class.to_string(), result, args, None, span)?;
    let converted = overload::convert_arguments(&selection, args);
    Ok(Operand::expression(
        ExprKind::Call(CallExpr {
            callee: Callee::Direct(selection.function),
            object: None,
            args: converted,
        }),
        target.unqualified(),
        false,
        span,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{
        Access, ClassEntry, Declaration, EnumEntry, FunctionEntry, PrimitiveKind, VariableEntry,
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
        Span::new(1, 1, 10)
    }

    /// Base <- Derived, Base <-virtual- Shared, polymorphic Animal <- Dog.
    fn registry() -> (SymbolRegistry, ClassId, ClassId, ClassId) {
        let mut registry = SymbolRegistry::new();
        let base = registry.register_class(ClassEntry::structure("Base")).unwrap();
        let derived = registry
            .register_class(ClassEntry::structure("Derived").with_base(&base, Access::Public))
            .unwrap();
        registry
            .register_class(
                ClassEntry::structure("Shared").with_virtual_base(&base, Access::Public),
            )
            .unwrap();
        let animal = ClassId::new("Animal");
        registry
            .register_class(
                ClassEntry::structure("Animal").with_method(
                    FunctionEntry::method(&animal, "speak", TypeDescriptor::void()).as_virtual(),
                ),
            )
            .unwrap();
        registry
            .register_class(ClassEntry::structure("Dog").with_base(&animal, Access::Public))
            .unwrap();
        registry
            .register_enum(EnumEntry::new("Color").with_value("Red", 0).with_value("Blue", 1))
            .unwrap();
        (registry, base, derived, animal)
    }

    fn ptr(name: &str) -> TypeDescriptor {
        TypeDescriptor::class(ClassId::new(name)).pointer_to()
    }

    #[test]
    fn static_cast_covers_implicit_and_inverse_conversions() {
        let (registry, _, _, _) = registry();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let d = variable("d", TypeDescriptor::primitive(PrimitiveKind::Double));
        let narrowed = builder.build_cast(CastKind::Static, &TypeDescriptor::int(), &[d], span());
        assert_eq!(narrowed.ty(), Some(&TypeDescriptor::int()));

        let b = variable("b", ptr("Base"));
        let down = builder.build_cast(CastKind::Static, &ptr("Derived"), &[Rc::clone(&b)], span());
        assert_eq!(down.ty(), Some(&ptr("Derived")));

        let v = variable("v", TypeDescriptor::void().pointer_to());
        let int_ptr = TypeDescriptor::int().pointer_to();
        let typed = builder.build_cast(CastKind::Static, &int_ptr, &[v], span());
        assert!(!typed.is_error());

        let color = TypeDescriptor::enumeration(cxxfront_core::EnumId::new("Color"));
        let one = Operand::integer(1, span());
        let e = builder.build_cast(CastKind::Static, &color, &[one], span());
        assert_eq!(e.ty(), Some(&color));

        let discarded = builder.build_cast(CastKind::Static, &TypeDescriptor::void(), &[b], span());
        assert_eq!(discarded.ty(), Some(&TypeDescriptor::void()));
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn static_cast_rejects_virtual_bases_and_casting_away_const() {
        let (registry, base, _, _) = registry();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let b = variable("b", ptr("Base"));
        assert!(builder.build_cast(CastKind::Static, &ptr("Shared"), &[b], span()).is_error());

        let cb = variable(
            "cb",
            TypeDescriptor::class(base).with_base_quals(Qualifiers::CONST).pointer_to(),
        );
        assert!(builder.build_cast(CastKind::Static, &ptr("Derived"), &[cb], span()).is_error());

        let i = variable("i", TypeDescriptor::int());
        assert!(
            builder
                .build_cast(CastKind::Static, &TypeDescriptor::int().pointer_to(), &[i], span())
                .is_error()
        );
        assert_eq!(ctx.diagnostics().error_count(), 3);
    }

    #[test]
    fn dynamic_cast_needs_a_polymorphic_source() {
        let (registry, _, _, _) = registry();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let a = variable("a", ptr("Animal"));
        let dog = builder.build_cast(CastKind::Dynamic, &ptr("Dog"), &[Rc::clone(&a)], span());
        assert_eq!(dog.ty(), Some(&ptr("Dog")));
        let void_ptr = TypeDescriptor::void().pointer_to();
        let erased = builder.build_cast(CastKind::Dynamic, &void_ptr, &[a], span());
        assert!(!erased.is_error());

        let d = variable("d", ptr("Derived"));
        let up = builder.build_cast(CastKind::Dynamic, &ptr("Base"), &[d], span());
        assert!(!up.is_error());

        let b = variable("b", ptr("Base"));
        builder.build_cast(CastKind::Dynamic, &ptr("Derived"), &[b], span());
        assert_eq!(
            ctx.diagnostics().last().map(|d| d.message.as_str()),
            Some("'Base' is not polymorphic")
        );
    }

    #[test]
    fn reinterpret_and_const_casts() {
        let (registry, _, _, _) = registry();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let p = variable("p", TypeDescriptor::int().pointer_to());
        let long = TypeDescriptor::primitive(PrimitiveKind::Long);
        let bits = builder.build_cast(CastKind::Reinterpret, &long, &[Rc::clone(&p)], span());
        assert_eq!(bits.ty(), Some(&long));
        let bytes = builder.build_cast(
            CastKind::Reinterpret,
            &TypeDescriptor::primitive(PrimitiveKind::Char).pointer_to(),
            &[Rc::clone(&p)],
            span(),
        );
        assert!(!bytes.is_error());

        let cp = variable(
            "cp",
            TypeDescriptor::int().with_base_quals(Qualifiers::CONST).pointer_to(),
        );
        let writable = builder.build_cast(
            CastKind::Const,
            &TypeDescriptor::int().pointer_to(),
            &[Rc::clone(&cp)],
            span(),
        );
        assert!(!writable.is_error());
        assert!(
            builder
                .build_cast(CastKind::Reinterpret, &long.pointer_to(), &[cp], span())
                .is_error()
        );
        assert!(
            builder
                .build_cast(
                    CastKind::Const,
                    &TypeDescriptor::int().reference_to(),
                    &[Operand::integer(1, span())],
                    span(),
                )
                .is_error()
        );
        assert!(
            builder
                .build_cast(CastKind::Const, &long.pointer_to(), &[p], span())
                .is_error()
        );
        assert_eq!(ctx.diagnostics().error_count(), 3);
    }

    #[test]
    fn c_style_casts_try_each_form() {
        let (registry, base, _, _) = registry();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let cb = variable(
            "cb",
            TypeDescriptor::class(base).with_base_quals(Qualifiers::CONST).pointer_to(),
        );
        let down = builder.build_cast(CastKind::CStyle, &ptr("Derived"), &[cb], span());
        assert_eq!(down.ty(), Some(&ptr("Derived")));

        let p = variable("p", TypeDescriptor::int().pointer_to());
        let reinterpreted = builder.build_cast(
            CastKind::CStyle,
            &TypeDescriptor::primitive(PrimitiveKind::Double).pointer_to(),
            &[p],
            span(),
        );
        assert!(!reinterpreted.is_error());

        let via_operator = builder.build_expression(
            OperatorCode::CStyleCast,
            &[
                Operand::type_name(TypeDescriptor::int(), span()),
                Operand::literal(
                    cxxfront_core::Literal::Float(ordered_float::OrderedFloat(2.5)),
                    span(),
                ),
            ],
            span(),
        );
        assert_eq!(via_operator.ty(), Some(&TypeDescriptor::int()));
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn functional_casts_construct_or_value_initialize() {
        let mut registry = SymbolRegistry::new();
        let point = ClassId::new("Point");
        registry
            .register_class(
                ClassEntry::structure("Point").with_method(
                    FunctionEntry::constructor(&point)
                        .with_param("x", TypeDescriptor::int())
                        .with_param("y", TypeDescriptor::int()),
                ),
            )
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let made = builder.build_cast(
            CastKind::Functional,
            &TypeDescriptor::class(point.clone()),
            &[Operand::integer(1, span()), Operand::integer(2, span())],
            span(),
        );
        assert!(matches!(
            made.as_expression().map(|e| &e.kind),
            Some(ExprKind::Call(_))
        ));
        let zero = builder.build_cast(CastKind::Functional, &TypeDescriptor::int(), &[], span());
        assert_eq!(zero.ty(), Some(&TypeDescriptor::int()));
        assert!(
            builder
                .build_cast(CastKind::Functional, &TypeDescriptor::class(point), &[], span())
                .is_error()
        );
        assert_eq!(ctx.diagnostics().error_count(), 1);
    }
}
