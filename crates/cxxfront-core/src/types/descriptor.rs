//! The type descriptor: a base type plus derived-type layers.
//!
//! Layers are stored innermost first, so the last layer is the one closest to
//! the declarator name. `const int* const&` is base `int` with base
//! qualifiers `const`, then `Pointer(const)`, then `Reference`.
//!
//! Descriptors are values. Every builder returns a new descriptor and leaves
//! the receiver untouched.

use std::fmt;
use std::rc::Rc;

use super::{PrimitiveKind, Qualifiers};
use crate::TypeHash;

/// Identity of a class, struct or union.
///
/// Equality and hashing use only the [`TypeHash`]; the name is carried for
/// diagnostics.
#[derive(Clone)]
pub struct ClassId {
    hash: TypeHash,
    name: Rc<str>,
}

impl ClassId {
    pub fn new(qualified_name: &str) -> Self {
        Self {
            hash: TypeHash::from_name(qualified_name),
            name: Rc::from(qualified_name),
        }
    }

    #[inline]
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Identity of an enumeration.
#[derive(Clone)]
pub struct EnumId {
    hash: TypeHash,
    name: Rc<str>,
}

impl EnumId {
    pub fn new(qualified_name: &str) -> Self {
        Self {
            hash: TypeHash::from_name(qualified_name),
            name: Rc::from(qualified_name),
        }
    }

    #[inline]
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

macro_rules! identity_traits {
    ($ty:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.hash == other.hash
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.hash, state);
            }
        }

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.hash.cmp(&other.hash)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.name)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name)
            }
        }
    };
}

identity_traits!(ClassId);
identity_traits!(EnumId);

/// What a type is built on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    Primitive(PrimitiveKind),
    Class(ClassId),
    Enum(EnumId),
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Primitive(kind) => write!(f, "{kind}"),
            BaseType::Class(id) => write!(f, "{id}"),
            BaseType::Enum(id) => write!(f, "{id}"),
        }
    }
}

/// Parameter list and member qualification of a function type.
///
/// The return type is not stored here: it is the descriptor formed by the
/// layers below the function layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FunctionPrototype {
    pub params: Vec<TypeDescriptor>,
    pub has_ellipsis: bool,
    /// Qualification of a member function (`void f() const`).
    pub cv: Qualifiers,
}

impl FunctionPrototype {
    pub fn new(params: Vec<TypeDescriptor>) -> Self {
        Self {
            params,
            has_ellipsis: false,
            cv: Qualifiers::empty(),
        }
    }

    pub fn with_ellipsis(mut self) -> Self {
        self.has_ellipsis = true;
        self
    }

    pub fn with_cv(mut self, cv: Qualifiers) -> Self {
        self.cv = cv;
        self
    }
}

impl fmt::Display for FunctionPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        if self.has_ellipsis {
            if self.params.is_empty() {
                f.write_str("...")?;
            } else {
                f.write_str(", ...")?;
            }
        }
        f.write_str(")")?;
        if !self.cv.is_empty() {
            write!(f, " {}", self.cv)?;
        }
        Ok(())
    }
}

/// One derived-type layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Pointer; the qualifiers apply to the pointer object itself.
    Pointer(Qualifiers),
    Reference,
    /// Array with an optional known bound.
    Array(Option<u64>),
    Function(Rc<FunctionPrototype>),
    /// Pointer to a member of `class`.
    MemberPointer { class: ClassId, quals: Qualifiers },
}

/// Where the top-level qualifiers of a type live.
enum QualSlot {
    Base,
    Layer(usize),
    /// Function types carry no object qualifiers.
    None,
}

/// An immutable C++ type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    base: BaseType,
    base_quals: Qualifiers,
    layers: Vec<Layer>,
}

impl TypeDescriptor {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            base_quals: Qualifiers::empty(),
            layers: Vec::new(),
        }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(BaseType::Primitive(kind))
    }

    pub fn void() -> Self {
        Self::primitive(PrimitiveKind::Void)
    }

    pub fn bool() -> Self {
        Self::primitive(PrimitiveKind::Bool)
    }

    pub fn int() -> Self {
        Self::primitive(PrimitiveKind::Int)
    }

    pub fn class(id: ClassId) -> Self {
        Self::new(BaseType::Class(id))
    }

    pub fn enumeration(id: EnumId) -> Self {
        Self::new(BaseType::Enum(id))
    }

    /// Same type with the base qualifiers replaced.
    pub fn with_base_quals(mut self, quals: Qualifiers) -> Self {
        self.base_quals = quals;
        self
    }

    #[inline]
    pub fn base(&self) -> &BaseType {
        &self.base
    }

    #[inline]
    pub fn base_quals(&self) -> Qualifiers {
        self.base_quals
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self.layers.last(), Some(Layer::Reference))
    }

    /// Layers with an outermost reference removed.
    pub fn non_reference_layers(&self) -> &[Layer] {
        if self.is_reference() {
            &self.layers[..self.layers.len() - 1]
        } else {
            &self.layers
        }
    }

    /// The referred-to type, or a copy of `self` when not a reference.
    pub fn strip_reference(&self) -> TypeDescriptor {
        let mut stripped = self.clone();
        if stripped.is_reference() {
            stripped.layers.pop();
        }
        stripped
    }

    /// Outermost layer, looking through a reference.
    pub fn outer(&self) -> Option<&Layer> {
        self.non_reference_layers().last()
    }

    /// No derived layers besides an optional reference.
    pub fn is_bare(&self) -> bool {
        self.non_reference_layers().is_empty()
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match &self.base {
            BaseType::Primitive(kind) if self.is_bare() => Some(*kind),
            _ => None,
        }
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        match &self.base {
            BaseType::Class(id) if self.is_bare() => Some(id),
            _ => None,
        }
    }

    pub fn enum_id(&self) -> Option<&EnumId> {
        match &self.base {
            BaseType::Enum(id) if self.is_bare() => Some(id),
            _ => None,
        }
    }

    fn qual_slot(&self) -> QualSlot {
        for (index, layer) in self.non_reference_layers().iter().enumerate().rev() {
            match layer {
                Layer::Array(_) | Layer::Reference => continue,
                Layer::Pointer(_) | Layer::MemberPointer { .. } => return QualSlot::Layer(index),
                Layer::Function(_) => return QualSlot::None,
            }
        }
        QualSlot::Base
    }

    /// Qualifiers of the object this type designates (arrays report their
    /// element qualifiers, references their referent's).
    pub fn top_quals(&self) -> Qualifiers {
        match self.qual_slot() {
            QualSlot::Base => self.base_quals,
            QualSlot::Layer(index) => match &self.layers[index] {
                Layer::Pointer(q) | Layer::MemberPointer { quals: q, .. } => *q,
                _ => Qualifiers::empty(),
            },
            QualSlot::None => Qualifiers::empty(),
        }
    }

    /// Same type with the top-level qualifiers replaced.
    pub fn with_top_quals(&self, quals: Qualifiers) -> TypeDescriptor {
        let mut result = self.clone();
        match self.qual_slot() {
            QualSlot::Base => result.base_quals = quals,
            QualSlot::Layer(index) => match &mut result.layers[index] {
                Layer::Pointer(q) | Layer::MemberPointer { quals: q, .. } => *q = quals,
                _ => {}
            },
            QualSlot::None => {}
        }
        result
    }

    pub fn add_top_quals(&self, quals: Qualifiers) -> TypeDescriptor {
        self.with_top_quals(self.top_quals() | quals)
    }

    pub fn unqualified(&self) -> TypeDescriptor {
        self.with_top_quals(Qualifiers::empty())
    }

    fn with_layer(&self, layer: Layer) -> TypeDescriptor {
        let mut result = self.clone();
        result.layers.push(layer);
        result
    }

    /// `T*`. Layering onto a reference is a caller bug.
    pub fn pointer_to(&self) -> TypeDescriptor {
        debug_assert!(!self.is_reference(), "pointer to reference: {self}");
        self.strip_reference().with_layer(Layer::Pointer(Qualifiers::empty()))
    }

    pub fn try_pointer_to(&self) -> Option<TypeDescriptor> {
        (!self.is_reference()).then(|| self.with_layer(Layer::Pointer(Qualifiers::empty())))
    }

    /// `T&`; a reference to a reference collapses to one reference.
    pub fn reference_to(&self) -> TypeDescriptor {
        if self.is_reference() {
            self.clone()
        } else {
            self.with_layer(Layer::Reference)
        }
    }

    pub fn array_of(&self, bound: Option<u64>) -> TypeDescriptor {
        debug_assert!(!self.is_reference(), "array of references: {self}");
        self.strip_reference().with_layer(Layer::Array(bound))
    }

    pub fn try_array_of(&self, bound: Option<u64>) -> Option<TypeDescriptor> {
        (!self.is_reference()).then(|| self.with_layer(Layer::Array(bound)))
    }

    /// `T C::*`.
    pub fn member_pointer_to(&self, class: ClassId) -> TypeDescriptor {
        debug_assert!(!self.is_reference(), "member pointer to reference: {self}");
        self.strip_reference().with_layer(Layer::MemberPointer {
            class,
            quals: Qualifiers::empty(),
        })
    }

    /// Function type returning `self`. The return type may be a reference.
    pub fn function_returning(&self, prototype: FunctionPrototype) -> TypeDescriptor {
        self.with_layer(Layer::Function(Rc::new(prototype)))
    }

    /// Target of a pointer or member pointer, or element of an array.
    pub fn pointee(&self) -> Option<TypeDescriptor> {
        match self.outer()? {
            Layer::Pointer(_) | Layer::Array(_) | Layer::MemberPointer { .. } => {
                let mut result = self.strip_reference();
                result.layers.pop();
                Some(result)
            }
            _ => None,
        }
    }

    pub fn function_prototype(&self) -> Option<&Rc<FunctionPrototype>> {
        match self.outer()? {
            Layer::Function(prototype) => Some(prototype),
            _ => None,
        }
    }

    /// Return type of a function type.
    pub fn return_type(&self) -> Option<TypeDescriptor> {
        self.function_prototype()?;
        let mut result = self.strip_reference();
        result.layers.pop();
        Some(result)
    }

    /// Array-to-pointer and function-to-pointer decay, dropping references and
    /// top-level qualifiers of the resulting value.
    pub fn decay(&self) -> TypeDescriptor {
        let stripped = self.strip_reference();
        match stripped.layers.last() {
            Some(Layer::Array(_)) => {
                let mut element = stripped;
                element.layers.pop();
                element.with_layer(Layer::Pointer(Qualifiers::empty()))
            }
            Some(Layer::Function(_)) => stripped.with_layer(Layer::Pointer(Qualifiers::empty())),
            _ => stripped.unqualified(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut declarator = String::new();
        let mut prefix_last = false;
        for layer in self.layers.iter().rev() {
            match layer {
                Layer::Pointer(quals) => {
                    let mut piece = String::from("*");
                    if !quals.is_empty() {
                        piece.push(' ');
                        piece.push_str(&quals.to_string());
                        if !declarator.is_empty() {
                            piece.push(' ');
                        }
                    }
                    declarator.insert_str(0, &piece);
                    prefix_last = true;
                }
                Layer::Reference => {
                    declarator.insert(0, '&');
                    prefix_last = true;
                }
                Layer::MemberPointer { class, quals } => {
                    let mut piece = format!("{class}::*");
                    if !quals.is_empty() {
                        piece.push(' ');
                        piece.push_str(&quals.to_string());
                        if !declarator.is_empty() {
                            piece.push(' ');
                        }
                    }
                    declarator.insert_str(0, &piece);
                    prefix_last = true;
                }
                Layer::Array(bound) => {
                    if prefix_last {
                        declarator = format!("({declarator})");
                    }
                    match bound {
                        Some(n) => declarator.push_str(&format!("[{n}]")),
                        None => declarator.push_str("[]"),
                    }
                    prefix_last = false;
                }
                Layer::Function(prototype) => {
                    if prefix_last {
                        declarator = format!("({declarator})");
                    }
                    declarator.push_str(&prototype.to_string());
                    prefix_last = false;
                }
            }
        }

        if !self.base_quals.is_empty() {
            write!(f, "{} ", self.base_quals)?;
        }
        write!(f, "{}", self.base)?;
        match declarator.chars().next() {
            None => Ok(()),
            Some('*' | '&' | '[' | '(') => f.write_str(&declarator),
            Some(_) => write!(f, " {declarator}"),
        }
    }
}
