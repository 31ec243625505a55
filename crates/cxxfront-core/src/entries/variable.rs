//! Objects: globals, locals, parameters and data members, plus typedefs.

use crate::{Access, ClassId, QualifiedName, TypeDescriptor, TypeHash};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Global,
    Local,
    Parameter,
    DataMember,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub hash: TypeHash,
    pub name: String,
    pub ty: TypeDescriptor,
    pub kind: VariableKind,
    pub access: Access,
    pub owner: Option<ClassId>,
    pub is_static: bool,
}

impl VariableEntry {
    fn new(scope: &str, name: &str, ty: TypeDescriptor, kind: VariableKind) -> Self {
        Self {
            hash: TypeHash::from_variable(scope, name),
            name: name.to_string(),
            ty,
            kind,
            access: Access::Public,
            owner: None,
            is_static: false,
        }
    }

    /// A namespace-scope object.
    pub fn global(name: impl Into<QualifiedName>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        Self::new(&name.qualifier_string(), name.simple_name(), ty, VariableKind::Global)
    }

    /// A block-scope object of the function identified by `function`.
    pub fn local(function: TypeHash, name: &str, ty: TypeDescriptor) -> Self {
        Self::new(&function.to_string(), name, ty, VariableKind::Local)
    }

    pub fn parameter(function: TypeHash, name: &str, ty: TypeDescriptor) -> Self {
        Self::new(&function.to_string(), name, ty, VariableKind::Parameter)
    }

    pub fn data_member(owner: &ClassId, name: &str, ty: TypeDescriptor) -> Self {
        let mut entry = Self::new(owner.name(), name, ty, VariableKind::DataMember);
        entry.owner = Some(owner.clone());
        entry
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Non-static data members live in each object.
    pub fn is_instance_member(&self) -> bool {
        self.owner.is_some() && !self.is_static
    }
}

/// `typedef T name;` at namespace or class scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedefEntry {
    pub hash: TypeHash,
    pub name: String,
    pub ty: TypeDescriptor,
    pub access: Access,
    pub owner: Option<ClassId>,
}

impl TypedefEntry {
    pub fn new(name: impl Into<QualifiedName>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_name(&name.to_string()),
            name: name.name,
            ty,
            access: Access::Public,
            owner: None,
        }
    }

    pub fn member(owner: &ClassId, name: &str, ty: TypeDescriptor) -> Self {
        let mut entry = Self::new(QualifiedName::from(owner.name()).child(name), ty);
        entry.owner = Some(owner.clone());
        entry
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}
