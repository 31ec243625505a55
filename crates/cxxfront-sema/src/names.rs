//! Name resolution: reducing lookup results and turning names into operands.
//!
//! ## Reduction
//!
//! A raw lookup may return the same declaration several times (once per
//! inheritance path) and declarations that hide each other. Reduction:
//!
//! 1. collapses repeats of one declaration that is a shared member (static,
//!    typedef, enumerator, nested type) or that sits in one subobject;
//! 2. drops a member of a virtual base dominated by a member of a class
//!    derived from it;
//! 3. drops type names hidden by a function or object of the same scope;
//! 4. accepts what remains if it is one declaration or one overload set
//!    from one subobject, and reports an ambiguity otherwise.

use std::rc::Rc;

use cxxfront_core::{
    ClassId, Declaration, ExprKind, FunctionEntry, LookupEntry, Operand, OperatorCode,
    QualifiedName, SemaError, Span, TypeDescriptor,
};
use cxxfront_registry::SymbolRegistry;
use tracing::{debug, trace};

use crate::SemaContext;
use crate::access::{MemberRef, check_member};

type Result<T> = std::result::Result<T, SemaError>;

/// Where a lookup entry lives: declaring class and subobject.
fn location(entry: &LookupEntry) -> (Option<&ClassId>, Option<&[ClassId]>) {
    (
        entry.decl.owner(),
        entry.path.as_ref().map(|p| p.subobject()),
    )
}

fn same_entity(a: &LookupEntry, b: &LookupEntry) -> bool {
    a.decl == b.decl && (a.decl.is_shared_member() || location(a) == location(b))
}

/// Reduce a raw lookup result to one declaration or one overload set.
pub fn reduce(
    registry: &SymbolRegistry,
    entries: Vec<LookupEntry>,
    name: &str,
    span: Span,
) -> Result<Vec<LookupEntry>> {
    let mut unique: Vec<LookupEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !unique.iter().any(|kept| same_entity(kept, &entry)) {
            unique.push(entry);
        }
    }

    let hierarchy = registry.hierarchy();
    let dominated = |weak: &LookupEntry, strong: &LookupEntry| {
        let (Some(weak_owner), Some(strong_owner)) = (weak.decl.owner(), strong.decl.owner())
        else {
            return false;
        };
        weak.path.as_ref().is_some_and(|p| p.has_virtual_edge())
            && hierarchy.is_derived_from(strong_owner, weak_owner)
    };
    let survivors: Vec<LookupEntry> = unique
        .iter()
        .filter(|weak| !unique.iter().any(|strong| dominated(weak, strong)))
        .cloned()
        .collect();

    let scope_of = |e: &LookupEntry| e.decl.owner().cloned();
    let survivors: Vec<LookupEntry> = survivors
        .iter()
        .filter(|entry| {
            !entry.decl.is_type()
                || !survivors
                    .iter()
                    .any(|other| !other.decl.is_type() && scope_of(other) == scope_of(entry))
        })
        .cloned()
        .collect();

    let Some(first) = survivors.first() else {
        return Ok(survivors);
    };
    let overload_set = survivors.iter().all(|e| {
        matches!(e.decl, Declaration::Function(_)) && location(e) == location(first)
    });
    if survivors.len() == 1 || overload_set {
        trace!(name, count = survivors.len(), "lookup reduced");
        return Ok(survivors);
    }

    let second = survivors
        .iter()
        .skip(1)
        .find(|e| !matches!(e.decl, Declaration::Function(_)) || location(e) != location(first))
        .unwrap_or(&survivors[1]);
    debug!(name, first = %first.decl, second = %second.decl, "ambiguous name");
    Err(SemaError::AmbiguousName {
        name: name.to_string(),
        first: first.decl.to_string(),
        second: second.decl.to_string(),
        span,
    })
}

/// Members named `name` visible in `class`, reduced.
pub fn lookup_member(
    ctx: &SemaContext<'_>,
    class: &ClassId,
    name: &str,
    span: Span,
) -> Result<Vec<LookupEntry>> {
    let registry = ctx.registry();
    let found = registry.lookup_in_class(class, name);
    if found.is_empty() {
        return Err(SemaError::UnknownMember {
            class: class.to_string(),
            name: name.to_string(),
            span,
        });
    }
    reduce(registry, found, name, span)
}

/// Check that every qualifier prefix of `name` names a namespace or class,
/// one nesting level per component.
fn check_qualifier(ctx: &mut SemaContext<'_>, qualifier: &[String], span: Span) -> Result<()> {
    let Some((last, outer)) = qualifier.split_last() else {
        return Ok(());
    };
    ctx.nested(span, |ctx| {
        check_qualifier(ctx, outer, span)?;
        let prefix = QualifiedName::new(last.clone(), outer.to_vec());
        let found = ctx.registry().lookup(&prefix, ctx.scope());
        let scope_like = found.iter().any(|e| match &e.decl {
            Declaration::Namespace(_) | Declaration::Class(_) => true,
            Declaration::Function(f) => f.is_constructor(),
            _ => false,
        });
        if scope_like {
            Ok(())
        } else {
            Err(SemaError::TypeMismatch {
                message: format!("'{prefix}' is not a class or namespace"),
                span,
            })
        }
    })
}

/// `*this` inside a member function of `class`.
pub fn implicit_object(ctx: &SemaContext<'_>, class: &ClassId, span: Span) -> Rc<Operand> {
    let this = Operand::this(class, ctx.this_cv(), span);
    Operand::expression(
        ExprKind::Unary {
            op: OperatorCode::Indirection,
            operand: this,
        },
        TypeDescriptor::class(class.clone()).with_base_quals(ctx.this_cv()),
        true,
        span,
    )
}

/// Resolve a possibly qualified name to an operand.
///
/// Inside a member function an unqualified non-static data member becomes
/// `this->m` and member functions get `*this` as their implicit object.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_name(
    ctx: &mut SemaContext<'_>,
    name: &QualifiedName,
    span: Span,
) -> Result<Rc<Operand>> {
    check_qualifier(ctx, &name.qualifier, span)?;
    let registry = ctx.registry();
    let found = registry.lookup(name, ctx.scope());
    if found.is_empty() {
        return Err(SemaError::TypeMismatch {
            message: format!("'{name}' was not declared in this scope"),
            span,
        });
    }
    let reduced = reduce(registry, found, &name.name, span)?;
    let qualified = !name.is_global();

    let member_scope = if qualified {
        None
    } else {
        ctx.scope().class.clone()
    };

    let functions: Vec<Rc<FunctionEntry>> = reduced
        .iter()
        .filter_map(|e| e.decl.as_function().cloned())
        .collect();
    if functions.len() == reduced.len() && !functions.is_empty() {
        let object = member_scope.as_ref().and_then(|class| {
            functions
                .iter()
                .any(|f| f.has_implicit_object())
                .then(|| implicit_object(ctx, class, span))
        });
        return Ok(Operand::overloads(
            name.name.clone(),
            functions,
            object,
            qualified,
            span,
        ));
    }

    let Some(entry) = reduced.into_iter().next() else {
        return Ok(ctx.error());
    };
    if let Declaration::Namespace(namespace) = &entry.decl {
        return Err(SemaError::TypeMismatch {
            message: format!("namespace '{namespace}' used where a value is expected"),
            span,
        });
    }
    if let Some(path) = &entry.path {
        let naming = path.origin().clone();
        let member = match &member_scope {
            Some(class) if !entry.decl.is_shared_member() => {
                MemberRef::through_object(entry.decl.clone(), class.clone())
            }
            _ => MemberRef::new(entry.decl.clone()),
        };
        check_member(ctx, &member, &naming, span)?;
    }

    match (&entry.decl, &member_scope) {
        (Declaration::Variable(variable), Some(class)) if variable.is_instance_member() => {
            let ty = if variable.ty.is_reference() {
                variable.ty.strip_reference()
            } else {
                variable.ty.add_top_quals(ctx.this_cv())
            };
            let this = Operand::this(class, ctx.this_cv(), span);
            Ok(Operand::expression(
                ExprKind::Member {
                    op: OperatorCode::Arrow,
                    object: this,
                    member: entry.decl.clone(),
                },
                ty,
                true,
                span,
            ))
        }
        _ => Ok(Operand::identifier(entry.decl, span)),
    }
}
