//! Class, struct and union declarations.

use rustc_hash::FxHashSet;
use std::fmt;
use std::rc::Rc;

use super::{Declaration, EnumEntry, FunctionEntry, FunctionKind, TypedefEntry, VariableEntry};
use crate::{Access, ClassId, QualifiedName, TypeDescriptor, TypeHash};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKey {
    Class,
    Struct,
    Union,
}

impl ClassKey {
    /// Default member and base access for the key.
    pub fn default_access(self) -> Access {
        match self {
            ClassKey::Class => Access::Private,
            ClassKey::Struct | ClassKey::Union => Access::Public,
        }
    }
}

/// One entry of a base-specifier list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseSpecifier {
    pub class: ClassId,
    pub access: Access,
    pub is_virtual: bool,
}

/// Registry entry for a class type.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub id: ClassId,
    pub qualified_name: QualifiedName,
    pub key: ClassKey,

    // === Inheritance ===
    /// Direct bases in declaration order.
    pub bases: Vec<BaseSpecifier>,

    // === Members ===
    pub members: Vec<Declaration>,

    // === Friendship ===
    pub friend_classes: FxHashSet<TypeHash>,
    pub friend_functions: FxHashSet<TypeHash>,

    /// `false` for a class that is only forward-declared.
    pub is_complete: bool,
}

impl ClassEntry {
    pub fn new(qualified_name: &str, key: ClassKey) -> Self {
        Self {
            id: ClassId::new(qualified_name),
            qualified_name: QualifiedName::from(qualified_name),
            key,
            bases: Vec::new(),
            members: Vec::new(),
            friend_classes: FxHashSet::default(),
            friend_functions: FxHashSet::default(),
            is_complete: true,
        }
    }

    pub fn class(qualified_name: &str) -> Self {
        Self::new(qualified_name, ClassKey::Class)
    }

    pub fn structure(qualified_name: &str) -> Self {
        Self::new(qualified_name, ClassKey::Struct)
    }

    /// `class C;` with no body.
    pub fn forward(qualified_name: &str) -> Self {
        let mut entry = Self::new(qualified_name, ClassKey::Class);
        entry.is_complete = false;
        entry
    }

    // === Builder Methods ===

    pub fn with_base(mut self, class: &ClassId, access: Access) -> Self {
        self.bases.push(BaseSpecifier {
            class: class.clone(),
            access,
            is_virtual: false,
        });
        self
    }

    pub fn with_virtual_base(mut self, class: &ClassId, access: Access) -> Self {
        self.bases.push(BaseSpecifier {
            class: class.clone(),
            access,
            is_virtual: true,
        });
        self
    }

    pub fn with_method(mut self, method: FunctionEntry) -> Self {
        self.members.push(Declaration::Function(Rc::new(method)));
        self
    }

    pub fn with_field(mut self, name: &str, ty: TypeDescriptor, access: Access) -> Self {
        let field = VariableEntry::data_member(&self.id, name, ty).with_access(access);
        self.members.push(Declaration::Variable(Rc::new(field)));
        self
    }

    pub fn with_static_field(mut self, name: &str, ty: TypeDescriptor, access: Access) -> Self {
        let field = VariableEntry::data_member(&self.id, name, ty)
            .with_access(access)
            .as_static();
        self.members.push(Declaration::Variable(Rc::new(field)));
        self
    }

    pub fn with_typedef(mut self, name: &str, ty: TypeDescriptor, access: Access) -> Self {
        let typedef = TypedefEntry::member(&self.id, name, ty).with_access(access);
        self.members.push(Declaration::Typedef(Rc::new(typedef)));
        self
    }

    /// A member enumeration; its enumerators become members too.
    pub fn with_enum(mut self, entry: &EnumEntry) -> Self {
        self.members.push(Declaration::Enum(entry.id.clone()));
        for constant in &entry.constants {
            self.members.push(Declaration::EnumConstant(Rc::clone(constant)));
        }
        self
    }

    pub fn with_member(mut self, member: Declaration) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_friend_class(mut self, class: &ClassId) -> Self {
        self.friend_classes.insert(class.hash());
        self
    }

    pub fn with_friend_function(mut self, function: TypeHash) -> Self {
        self.friend_functions.insert(function);
        self
    }

    // === Queries ===

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn ty(&self) -> TypeDescriptor {
        TypeDescriptor::class(self.id.clone())
    }

    pub fn members_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.members.iter().filter(move |m| m.name() == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.members_named(name).next().is_some()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Rc<FunctionEntry>> {
        self.members.iter().filter_map(|m| match m {
            Declaration::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &Rc<FunctionEntry>> {
        self.functions().filter(|f| f.is_constructor())
    }

    pub fn conversion_operators(&self) -> impl Iterator<Item = &Rc<FunctionEntry>> {
        self.functions().filter(|f| f.is_conversion())
    }

    pub fn destructor(&self) -> Option<&Rc<FunctionEntry>> {
        self.functions()
            .find(|f| matches!(f.kind, FunctionKind::Destructor))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Rc<VariableEntry>> {
        self.members.iter().filter_map(|m| match m {
            Declaration::Variable(v) => Some(v),
            _ => None,
        })
    }

    /// Declares a pure virtual function itself.
    pub fn declares_pure(&self) -> bool {
        self.functions().any(|f| f.is_pure)
    }

    pub fn declares_virtual(&self) -> bool {
        self.functions().any(|f| f.is_virtual)
    }

    pub fn is_friend_class(&self, class: TypeHash) -> bool {
        self.friend_classes.contains(&class)
    }

    pub fn is_friend_function(&self, function: TypeHash) -> bool {
        self.friend_functions.contains(&function)
    }
}

/// A walk through the base-class graph, from the class where a lookup started
/// to the class where something was found.
///
/// `classes[0]` is the starting class; `edges[i]` describes the base
/// specifier that leads from `classes[i]` to `classes[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InheritancePath {
    pub classes: Vec<ClassId>,
    pub edges: Vec<BaseSpecifier>,
}

impl InheritancePath {
    /// A path of length zero: the class itself.
    pub fn start(class: ClassId) -> Self {
        Self {
            classes: vec![class],
            edges: Vec::new(),
        }
    }

    pub fn extended(&self, edge: &BaseSpecifier) -> Self {
        let mut next = self.clone();
        next.classes.push(edge.class.clone());
        next.edges.push(edge.clone());
        next
    }

    pub fn origin(&self) -> &ClassId {
        &self.classes[0]
    }

    pub fn target(&self) -> &ClassId {
        &self.classes[self.classes.len() - 1]
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn has_virtual_edge(&self) -> bool {
        self.edges.iter().any(|e| e.is_virtual)
    }

    /// The classes identifying the subobject the path ends in.
    ///
    /// Everything up to the last virtual edge is shared by every path that
    /// reaches the same virtual base, so only the suffix starting at that
    /// base distinguishes subobjects.
    pub fn subobject(&self) -> &[ClassId] {
        match self.edges.iter().rposition(|e| e.is_virtual) {
            Some(index) => &self.classes[index + 1..],
            None => &self.classes,
        }
    }
}

impl fmt::Display for InheritancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{class}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_key_default_access() {
        assert_eq!(ClassKey::Class.default_access(), Access::Private);
        assert_eq!(ClassKey::Struct.default_access(), Access::Public);
    }

    #[test]
    fn member_queries() {
        let entry = ClassEntry::class("C");
        let id = entry.id.clone();
        let entry = entry
            .with_method(FunctionEntry::constructor(&id).with_param("x", TypeDescriptor::int()))
            .with_method(FunctionEntry::conversion(&id, TypeDescriptor::int()))
            .with_method(FunctionEntry::method(&id, "f", TypeDescriptor::void()).as_pure())
            .with_field("value", TypeDescriptor::int(), Access::Private);
        assert_eq!(entry.constructors().count(), 1);
        assert_eq!(entry.conversion_operators().count(), 1);
        assert!(entry.declares("value"));
        assert!(entry.declares("operator int"));
        assert!(entry.declares_pure());
        assert!(entry.destructor().is_none());
    }

    #[test]
    fn subobject_starts_after_last_virtual_edge() {
        let d = ClassId::new("D");
        let a = ClassId::new("A");
        let v = ClassId::new("V");
        let path = InheritancePath::start(d)
            .extended(&BaseSpecifier {
                class: a.clone(),
                access: Access::Public,
                is_virtual: false,
            })
            .extended(&BaseSpecifier {
                class: v.clone(),
                access: Access::Public,
                is_virtual: true,
            });
        assert_eq!(path.subobject(), &[v]);
        assert_eq!(path.target(), &ClassId::new("V"));
        assert_eq!(path.to_string(), "D -> A -> V");
        assert!(path.has_virtual_edge());
    }
}
