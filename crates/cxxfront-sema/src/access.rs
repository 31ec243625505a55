//! Access control over the base-class graph.
//!
//! A member's access is recomputed along every inheritance path from the
//! naming class to the declaring class:
//!
//! | member in base | `public` edge | `protected` edge | `private` edge |
//! |---|---|---|---|
//! | public    | public    | protected | private |
//! | protected | protected | protected | private |
//! | private   | unreachable | unreachable | unreachable |
//!
//! The most permissive result over all paths wins. The evaluator only
//! answers yes or no; callers raise the diagnostic.

use cxxfront_core::{Access, ClassId, Declaration, InheritancePath, ScopeId, SemaError, Span};
use cxxfront_registry::SymbolRegistry;
use tracing::trace;

use crate::SemaContext;

/// A class member as named at a use site.
#[derive(Debug, Clone)]
pub struct MemberRef {
    pub member: Declaration,
    /// Class of the object expression the member is accessed through.
    /// `None` for qualified names and static use.
    pub object: Option<ClassId>,
}

impl MemberRef {
    pub fn new(member: Declaration) -> Self {
        Self {
            member,
            object: None,
        }
    }

    pub fn through_object(member: Declaration, object: ClassId) -> Self {
        Self {
            member,
            object: Some(object),
        }
    }
}

/// Whether `member`, named in class `through`, may be used from `scope`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn is_accessible(
    ctx: &SemaContext<'_>,
    member: &MemberRef,
    through: &ClassId,
    scope: &ScopeId,
) -> bool {
    let Some(owner) = member.member.owner() else {
        return true;
    };
    let instance = !member.member.is_shared_member();
    let granted = named_in(
        ctx.registry(),
        owner,
        member.member.access(),
        through,
        member.object.as_ref(),
        instance,
        scope,
    );
    trace!(
        member = member.member.name(),
        through = %through,
        granted,
        "member access check"
    );
    granted
}

/// Whether `base` is an accessible base class of `derived` from `scope`:
/// a public member of `base` would be usable as a member of `derived`.
pub fn is_base_accessible(
    ctx: &SemaContext<'_>,
    derived: &ClassId,
    base: &ClassId,
    scope: &ScopeId,
) -> bool {
    directly_named_in(ctx.registry(), base, Access::Public, derived, None, false, scope)
}

/// [`is_accessible`] in the current scope, as a diagnostic.
pub fn check_member(
    ctx: &SemaContext<'_>,
    member: &MemberRef,
    through: &ClassId,
    span: Span,
) -> Result<(), SemaError> {
    if is_accessible(ctx, member, through, ctx.scope()) {
        Ok(())
    } else {
        Err(SemaError::Inaccessible {
            member: describe(&member.member),
            span,
        })
    }
}

fn describe(decl: &Declaration) -> String {
    match (decl, decl.owner()) {
        (Declaration::Function(f), _) => f.to_string(),
        (_, Some(owner)) => format!("{owner}::{}", decl.name()),
        (_, None) => decl.name().to_string(),
    }
}

fn named_in(
    registry: &SymbolRegistry,
    owner: &ClassId,
    declared: Access,
    naming: &ClassId,
    object: Option<&ClassId>,
    instance: bool,
    scope: &ScopeId,
) -> bool {
    if directly_named_in(registry, owner, declared, naming, object, instance, scope) {
        return true;
    }

    // Otherwise: some base of the naming class is accessible here and the
    // member is accessible when named in that base. Each step moves the
    // naming class strictly toward the owner, so the walk ends.
    if naming == owner {
        return false;
    }
    let Some(view) = registry.class_graph(naming.hash()) else {
        return false;
    };
    view.bases().any(|(_, base)| {
        let base_id = base.id();
        (base_id == owner || registry.hierarchy().is_derived_from(base_id, owner))
            && directly_named_in(registry, base_id, Access::Public, naming, None, false, scope)
            && named_in(registry, owner, declared, base_id, object, instance, scope)
    })
}

/// Access computed from the inheritance paths alone, without going
/// through an accessible intermediate base.
fn directly_named_in(
    registry: &SymbolRegistry,
    owner: &ClassId,
    declared: Access,
    naming: &ClassId,
    object: Option<&ClassId>,
    instance: bool,
    scope: &ScopeId,
) -> bool {
    effective_access(registry, owner, declared, naming)
        .is_some_and(|effective| grants(registry, effective, naming, object, instance, scope))
}

/// Access of a member of `owner` as a member of `naming`; `None` when no
/// path reaches it.
pub fn effective_access(
    registry: &SymbolRegistry,
    owner: &ClassId,
    declared: Access,
    naming: &ClassId,
) -> Option<Access> {
    registry
        .hierarchy()
        .paths(naming, owner)
        .iter()
        .filter_map(|path| along_path(path, declared))
        .min()
}

fn along_path(path: &InheritancePath, declared: Access) -> Option<Access> {
    let mut current = declared;
    for edge in path.edges.iter().rev() {
        current = match (current, edge.access) {
            (Access::Private, _) => return None,
            (access, Access::Public) => access,
            (access, Access::Protected) => access.most_restrictive(Access::Protected),
            (_, Access::Private) => Access::Private,
        };
    }
    trace!(%path, access = %current, "access along path");
    Some(current)
}

fn grants(
    registry: &SymbolRegistry,
    effective: Access,
    naming: &ClassId,
    object: Option<&ClassId>,
    instance: bool,
    scope: &ScopeId,
) -> bool {
    match effective {
        Access::Public => true,
        Access::Private => is_member_or_friend(registry, naming, scope),
        Access::Protected => {
            if is_member_or_friend(registry, naming, scope) {
                return true;
            }
            let Some(current) = &scope.class else {
                return false;
            };
            if !registry.hierarchy().is_derived_from(current, naming) {
                return false;
            }
            // Through another object only when it is of the accessing class.
            match object {
                Some(object) if instance => {
                    object == current || registry.hierarchy().is_derived_from(object, current)
                }
                _ => true,
            }
        }
    }
}

fn is_member_or_friend(registry: &SymbolRegistry, class: &ClassId, scope: &ScopeId) -> bool {
    if scope.class.as_ref() == Some(class) {
        return true;
    }
    let Some(view) = registry.class_graph(class.hash()) else {
        return false;
    };
    scope.class.as_ref().is_some_and(|c| view.befriends_class(c))
        || scope.function.is_some_and(|f| view.befriends_function(f))
}
