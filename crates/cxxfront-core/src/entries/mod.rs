//! Declared entities, as produced by the symbol table and consumed by the
//! semantic core.

mod class;
mod enum_entry;
mod function;
mod variable;

pub use class::{BaseSpecifier, ClassEntry, ClassKey, InheritancePath};
pub use enum_entry::{EnumConstantEntry, EnumEntry};
pub use function::{FunctionEntry, FunctionKind, Param};
pub use variable::{TypedefEntry, VariableEntry, VariableKind};

use std::fmt;
use std::rc::Rc;

use crate::{Access, ClassId, EnumId, QualifiedName, TypeDescriptor, TypeHash};

/// A resolved declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
    Variable(Rc<VariableEntry>),
    Function(Rc<FunctionEntry>),
    Class(ClassId),
    Enum(EnumId),
    EnumConstant(Rc<EnumConstantEntry>),
    Typedef(Rc<TypedefEntry>),
    Namespace(QualifiedName),
}

impl Declaration {
    /// Identity used to collapse duplicate lookup results.
    pub fn identity(&self) -> TypeHash {
        match self {
            Declaration::Variable(v) => v.hash,
            Declaration::Function(f) => f.hash,
            Declaration::Class(id) => id.hash(),
            Declaration::Enum(id) => id.hash(),
            Declaration::EnumConstant(c) => c.hash,
            Declaration::Typedef(t) => t.hash,
            Declaration::Namespace(name) => TypeHash::from_name(&name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Variable(v) => &v.name,
            Declaration::Function(f) => &f.name,
            Declaration::Class(id) => simple_name(id.name()),
            Declaration::Enum(id) => simple_name(id.name()),
            Declaration::EnumConstant(c) => &c.name,
            Declaration::Typedef(t) => &t.name,
            Declaration::Namespace(name) => name.simple_name(),
        }
    }

    /// Declaring class of a member.
    pub fn owner(&self) -> Option<&ClassId> {
        match self {
            Declaration::Variable(v) => v.owner.as_ref(),
            Declaration::Function(f) => f.owner.as_ref(),
            Declaration::EnumConstant(c) => c.owner.as_ref(),
            Declaration::Typedef(t) => t.owner.as_ref(),
            Declaration::Class(_) | Declaration::Enum(_) | Declaration::Namespace(_) => None,
        }
    }

    /// Declared access inside the owning class.
    pub fn access(&self) -> Access {
        match self {
            Declaration::Variable(v) => v.access,
            Declaration::Function(f) => f.access,
            Declaration::EnumConstant(c) => c.access,
            Declaration::Typedef(t) => t.access,
            Declaration::Class(_) | Declaration::Enum(_) | Declaration::Namespace(_) => {
                Access::Public
            }
        }
    }

    /// Names a type rather than an object or function.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Declaration::Class(_) | Declaration::Enum(_) | Declaration::Typedef(_)
        )
    }

    /// Entities that exist once per class rather than once per object:
    /// finding one through several base subobjects is not ambiguous.
    pub fn is_shared_member(&self) -> bool {
        match self {
            Declaration::Variable(v) => v.is_static,
            Declaration::Function(f) => f.is_static,
            Declaration::Typedef(_)
            | Declaration::EnumConstant(_)
            | Declaration::Class(_)
            | Declaration::Enum(_) => true,
            Declaration::Namespace(_) => false,
        }
    }

    /// Type of the named entity when used as an expression.
    pub fn ty(&self) -> Option<TypeDescriptor> {
        match self {
            Declaration::Variable(v) => Some(v.ty.clone()),
            Declaration::Function(f) => Some(f.function_type()),
            Declaration::EnumConstant(c) => Some(c.ty()),
            Declaration::Typedef(t) => Some(t.ty.clone()),
            Declaration::Class(id) => Some(TypeDescriptor::class(id.clone())),
            Declaration::Enum(id) => Some(TypeDescriptor::enumeration(id.clone())),
            Declaration::Namespace(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionEntry>> {
        match self {
            Declaration::Function(f) => Some(f),
            _ => None,
        }
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Declaration {}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Variable(v) => match &v.owner {
                Some(owner) => write!(f, "{owner}::{}", v.name),
                None => f.write_str(&v.name),
            },
            Declaration::Function(func) => write!(f, "{func}"),
            Declaration::Class(id) => write!(f, "class {id}"),
            Declaration::Enum(id) => write!(f, "enum {id}"),
            Declaration::EnumConstant(c) => write!(f, "{}::{}", c.enum_id, c.name),
            Declaration::Typedef(t) => match &t.owner {
                Some(owner) => write!(f, "{owner}::{}", t.name),
                None => f.write_str(&t.name),
            },
            Declaration::Namespace(name) => write!(f, "namespace {name}"),
        }
    }
}

/// The role a lookup result plays at the use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Object,
    Function,
    Method,
    Constructor,
    OverloadOperator,
    ClassType,
    EnumType,
    EnumConstant,
    DataMember,
    Namespace,
    NamespaceAlias,
    Parameter,
}

impl Role {
    /// The natural role of a declaration.
    pub fn of(decl: &Declaration) -> Role {
        match decl {
            Declaration::Variable(v) => match v.kind {
                VariableKind::Parameter => Role::Parameter,
                VariableKind::DataMember => Role::DataMember,
                VariableKind::Global | VariableKind::Local => Role::Object,
            },
            Declaration::Function(f) => match f.kind {
                FunctionKind::Constructor => Role::Constructor,
                FunctionKind::Operator(_) | FunctionKind::Conversion => Role::OverloadOperator,
                _ if f.owner.is_some() => Role::Method,
                _ => Role::Function,
            },
            Declaration::Class(_) => Role::ClassType,
            Declaration::Enum(_) => Role::EnumType,
            Declaration::EnumConstant(_) => Role::EnumConstant,
            Declaration::Typedef(_) => Role::ClassType,
            Declaration::Namespace(_) => Role::Namespace,
        }
    }
}

/// One result of a name lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupEntry {
    pub decl: Declaration,
    pub role: Role,
    /// For class members: how the declaring class was reached from the
    /// class the lookup started in.
    pub path: Option<InheritancePath>,
}

impl LookupEntry {
    pub fn new(decl: Declaration) -> Self {
        let role = Role::of(&decl);
        Self {
            decl,
            role,
            path: None,
        }
    }

    pub fn through(decl: Declaration, path: InheritancePath) -> Self {
        let role = Role::of(&decl);
        Self {
            decl,
            role,
            path: Some(path),
        }
    }
}
