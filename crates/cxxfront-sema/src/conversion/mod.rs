//! Conversion resolution.
//!
//! This module decides whether a value can be converted to a destination
//! type, how good that conversion is, and how the operand tree is rewritten
//! to perform it.
//!
//! ## Strategies
//!
//! Each strategy attempts one family of conversion paths:
//!
//! | Source | Destination | Strategy |
//! |---|---|---|
//! | scalar | scalar | [`ScalarToScalar`] |
//! | class  | scalar | [`OperatorCaster`] |
//! | scalar | class  | [`ConstructorCaster`] |
//! | class  | class  | [`ClassToClassCaster`] |
//!
//! [`AutoCastManager`] selects the strategy. User-defined conversions are
//! never chained: the argument of a converting constructor and the result of
//! a conversion function only undergo standard conversions.
//!
//! ## Ranking
//!
//! [`ConversionCategory`] is totally ordered, lower is better. Inside one
//! category, [`ConversionTier`] separates pointer-to-`void*` and
//! pointer-to-`bool` conversions from the rest, then
//! [`ConversionOutcome::distance`] breaks ties (inheritance distance,
//! added qualifiers).

mod class;
mod constructor;
mod operator;
mod scalar;

pub use class::ClassToClassCaster;
pub use constructor::ConstructorCaster;
pub use operator::{OperatorCaster, conversion_functions};
pub use scalar::{
    ScalarToScalar, arithmetic_category, base_path, composite_pointer_type, promote,
    usual_arithmetic,
};

use std::rc::Rc;

use cxxfront_core::{
    CallExpr, Callee, ConversionStep, Declaration, ExprKind, FunctionEntry, Operand, SemaError,
    Span, TypeDescriptor,
};
use tracing::debug;

use crate::SemaContext;
use crate::classify::is_class_type;

/// Standard conversions that lose to any other conversion of the same
/// category. `Derived*` to `Base*` beats `Derived*` to `void*`, which beats
/// `Derived*` to `bool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionTier {
    #[default]
    Direct,
    ToVoidPointer,
    PointerToBool,
}

/// How good a conversion is. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionCategory {
    /// Identical types.
    Equal,
    /// Only cv-qualifiers are added.
    QualifierOnly,
    /// Integral or floating promotion.
    Promotion,
    /// Any other standard conversion.
    Standard,
    /// Through a converting constructor or a conversion function.
    UserDefined,
    NoConversion,
}

/// The kind of initialization a conversion serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    /// Copy-initialization and argument passing: implicit conversions only.
    Copy,
    /// Direct-initialization and `static_cast`: `explicit` constructors and
    /// conversion functions apply too.
    Direct,
}

/// One rewrite step and the node it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub step: ConversionStep,
    pub ty: TypeDescriptor,
    pub is_lvalue: bool,
}

impl PlannedStep {
    pub fn new(step: ConversionStep, ty: TypeDescriptor) -> Self {
        Self {
            step,
            ty,
            is_lvalue: false,
        }
    }

    pub fn lvalue(step: ConversionStep, ty: TypeDescriptor) -> Self {
        Self {
            step,
            ty,
            is_lvalue: true,
        }
    }
}

/// The physical rewrite a conversion performs.
#[derive(Debug, Clone, Default)]
pub struct ConversionPlan {
    /// An overload set resolved against a function-pointer target.
    pub resolved: Option<Rc<FunctionEntry>>,
    /// Standard steps applied to the source.
    pub before: Vec<PlannedStep>,
    /// Converting constructor or conversion function invoked.
    pub user: Option<Rc<FunctionEntry>>,
    /// Standard steps applied to the user-defined conversion's result.
    pub after: Vec<PlannedStep>,
}

impl ConversionPlan {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn steps(before: Vec<PlannedStep>) -> Self {
        Self {
            before,
            ..Self::default()
        }
    }

    pub fn is_identity(&self) -> bool {
        self.resolved.is_none()
            && self.before.is_empty()
            && self.user.is_none()
            && self.after.is_empty()
    }

    /// Every standard step, in application order.
    pub fn all_steps(&self) -> impl Iterator<Item = &PlannedStep> {
        self.before.iter().chain(self.after.iter())
    }
}

/// Result of classifying one conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub category: ConversionCategory,
    /// Type the converted node has (the destination type).
    pub ty: TypeDescriptor,
    pub plan: ConversionPlan,
    /// Why the conversion failed, when there is more to say than "no
    /// conversion".
    pub error: Option<SemaError>,
    pub tier: ConversionTier,
    /// Tie-breaker inside the category and tier; lower is better.
    pub distance: u32,
}

impl ConversionOutcome {
    pub fn new(category: ConversionCategory, ty: TypeDescriptor, plan: ConversionPlan) -> Self {
        Self {
            category,
            ty,
            plan,
            error: None,
            tier: ConversionTier::Direct,
            distance: 0,
        }
    }

    pub fn exact(ty: TypeDescriptor) -> Self {
        Self::new(ConversionCategory::Equal, ty, ConversionPlan::identity())
    }

    pub fn none(ty: TypeDescriptor) -> Self {
        Self::new(
            ConversionCategory::NoConversion,
            ty,
            ConversionPlan::identity(),
        )
    }

    pub fn failed(ty: TypeDescriptor, error: SemaError) -> Self {
        Self {
            error: Some(error),
            ..Self::none(ty)
        }
    }

    pub fn with_tier(mut self, tier: ConversionTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_distance(mut self, distance: u32) -> Self {
        self.distance = distance;
        self
    }

    #[inline]
    pub fn is_viable(&self) -> bool {
        self.category != ConversionCategory::NoConversion
    }

    /// Ordering key: category, then tier, then distance.
    pub fn rank(&self) -> (ConversionCategory, ConversionTier, u32) {
        (self.category, self.tier, self.distance)
    }

    /// The error to report when this conversion was required.
    pub fn into_error(self, from: &Operand, span: Span) -> SemaError {
        match self.error {
            Some(error) => error.or_span(span),
            None => SemaError::NoConversion {
                from: describe_source(from),
                to: self.ty.to_string(),
                span,
            },
        }
    }
}

pub(crate) fn describe_source(source: &Operand) -> String {
    match source {
        Operand::Overload(set) => format!("overloaded function '{}'", set.name),
        Operand::Type(t) => format!("type '{}'", t.ty),
        other => other
            .ty()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<error>".to_string()),
    }
}

/// A conversion strategy.
pub trait Caster {
    /// Rank the conversion of `source` to `dest`. Never reports.
    fn classify(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        mode: ConversionMode,
    ) -> ConversionOutcome;

    /// Rewrite `source` according to `outcome`.
    fn apply(
        &self,
        _dest: &TypeDescriptor,
        source: &Rc<Operand>,
        outcome: &ConversionOutcome,
    ) -> Rc<Operand> {
        apply(source, outcome)
    }
}

/// Build the converted node. An identity plan returns `source` itself.
pub fn apply(source: &Rc<Operand>, outcome: &ConversionOutcome) -> Rc<Operand> {
    let span = source.span();
    let mut node = match &outcome.plan.resolved {
        Some(function) => Operand::identifier(Declaration::Function(Rc::clone(function)), span),
        None => Rc::clone(source),
    };
    node = wrap(node, &outcome.plan.before, span);
    if let Some(function) = &outcome.plan.user {
        node = if function.is_constructor() {
            let ty = match &function.owner {
                Some(owner) => TypeDescriptor::class(owner.clone()),
                None => outcome.ty.strip_reference(),
            };
            Operand::expression(
                ExprKind::Call(CallExpr {
                    callee: Callee::Direct(Rc::clone(function)),
                    object: None,
                    args: vec![node],
                }),
                ty,
                false,
                span,
            )
        } else {
            Operand::expression(
                ExprKind::Call(CallExpr {
                    callee: Callee::Direct(Rc::clone(function)),
                    object: Some(node),
                    args: Vec::new(),
                }),
                function.return_type.clone(),
                false,
                span,
            )
        };
    }
    wrap(node, &outcome.plan.after, span)
}

fn wrap(mut node: Rc<Operand>, steps: &[PlannedStep], span: Span) -> Rc<Operand> {
    for planned in steps {
        node = Operand::expression(
            ExprKind::Conversion {
                step: planned.step.clone(),
                operand: node,
            },
            planned.ty.clone(),
            planned.is_lvalue,
            span,
        );
    }
    node
}

static SCALAR: ScalarToScalar = ScalarToScalar;
static OPERATOR: OperatorCaster = OperatorCaster;
static CONSTRUCTOR: ConstructorCaster = ConstructorCaster;
static CLASS_TO_CLASS: ClassToClassCaster = ClassToClassCaster { user_defined: true };
static CLASS_TO_CLASS_STANDARD: ClassToClassCaster = ClassToClassCaster {
    user_defined: false,
};

/// Picks the strategy for a source/destination pair.
#[derive(Debug, Clone, Copy)]
pub struct AutoCastManager {
    user_defined: bool,
}

impl Default for AutoCastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoCastManager {
    pub fn new() -> Self {
        Self { user_defined: true }
    }

    /// Standard conversions only.
    pub fn standard_only() -> Self {
        Self {
            user_defined: false,
        }
    }

    /// The strategy for this pair, or `None` when only a user-defined
    /// conversion could apply and those are disabled.
    pub fn select(&self, source: &Operand, dest: &TypeDescriptor) -> Option<&'static dyn Caster> {
        let source_is_class = source.ty().is_some_and(is_class_type);
        let dest_is_class = is_class_type(dest);
        let caster: &'static dyn Caster = match (source_is_class, dest_is_class) {
            (false, false) => &SCALAR,
            (true, true) if self.user_defined => &CLASS_TO_CLASS,
            (true, true) => &CLASS_TO_CLASS_STANDARD,
            (true, false) if self.user_defined => &OPERATOR,
            (false, true) if self.user_defined => &CONSTRUCTOR,
            _ => return None,
        };
        Some(caster)
    }

    /// Rank the conversion of `source` to `dest`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn classify(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        mode: ConversionMode,
    ) -> ConversionOutcome {
        if source.is_error() {
            return ConversionOutcome::none(dest.clone());
        }
        if let Operand::Type(t) = source.as_ref() {
            return ConversionOutcome::failed(
                dest.clone(),
                SemaError::TypeMismatch {
                    message: format!("type '{}' used where a value is expected", t.ty),
                    span: t.span,
                },
            );
        }
        let Some(caster) = self.select(source, dest) else {
            return ConversionOutcome::none(dest.clone());
        };
        let span = source.span();
        match ctx.nested(span, |ctx| Ok(caster.classify(ctx, source, dest, mode))) {
            Ok(outcome) => outcome,
            Err(error) => ConversionOutcome::failed(dest.clone(), error),
        }
    }

    /// Convert `source` to `dest` or explain why it cannot be.
    pub fn convert(
        &self,
        ctx: &mut SemaContext<'_>,
        source: &Rc<Operand>,
        dest: &TypeDescriptor,
        mode: ConversionMode,
        span: Span,
    ) -> Result<Rc<Operand>, SemaError> {
        let outcome = self.classify(ctx, source, dest, mode);
        if !outcome.is_viable() {
            return Err(outcome.into_error(source, span));
        }
        debug!(
            from = %describe_source(source),
            to = %dest,
            category = ?outcome.category,
            "conversion chosen"
        );
        Ok(apply(source, &outcome))
    }
}
