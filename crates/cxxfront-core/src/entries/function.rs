//! Callable declarations: free functions, member functions, constructors,
//! destructors, operator functions and conversion functions.

use std::fmt;
use std::rc::Rc;

use crate::{
    Access, ClassId, FunctionPrototype, Operand, OperatorCode, QualifiedName, Qualifiers,
    TypeDescriptor, TypeHash,
};

/// What sort of callable an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Free,
    Method,
    Constructor,
    Destructor,
    Operator(OperatorCode),
    /// `operator T()`; the target is the return type.
    Conversion,
}

/// A declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Default argument, injected as a shared sub-node at call sites.
    pub default: Option<Rc<Operand>>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }
}

/// A candidate callable.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    /// Identity derived from owner, name, parameter types and cv.
    pub hash: TypeHash,
    /// Unqualified name (`f`, `operator+=`, `operator int`, `C`, `~C`).
    pub name: String,
    pub qualified_name: QualifiedName,
    pub kind: FunctionKind,
    pub return_type: TypeDescriptor,
    pub params: Vec<Param>,
    pub has_ellipsis: bool,
    /// Declaring class for members.
    pub owner: Option<ClassId>,
    pub access: Access,
    /// Member function qualification.
    pub cv: Qualifiers,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_pure: bool,
    pub is_explicit: bool,
}

impl FunctionEntry {
    fn new(
        name: String,
        qualified_name: QualifiedName,
        kind: FunctionKind,
        return_type: TypeDescriptor,
        owner: Option<ClassId>,
    ) -> Self {
        let mut entry = Self {
            hash: TypeHash::EMPTY,
            name,
            qualified_name,
            kind,
            return_type,
            params: Vec::new(),
            has_ellipsis: false,
            owner,
            access: Access::Public,
            cv: Qualifiers::empty(),
            is_static: false,
            is_virtual: false,
            is_pure: false,
            is_explicit: false,
        };
        entry.rehash();
        entry
    }

    /// A namespace-scope function.
    pub fn free(name: impl Into<QualifiedName>, return_type: TypeDescriptor) -> Self {
        let qualified_name = name.into();
        Self::new(
            qualified_name.name.clone(),
            qualified_name,
            FunctionKind::Free,
            return_type,
            None,
        )
    }

    /// An ordinary member function.
    pub fn method(owner: &ClassId, name: &str, return_type: TypeDescriptor) -> Self {
        Self::new(
            name.to_string(),
            QualifiedName::from(owner.name()).child(name),
            FunctionKind::Method,
            return_type,
            Some(owner.clone()),
        )
    }

    /// An operator function, as a member of `owner` or at namespace scope.
    ///
    /// Returns `None` for operators that cannot be overloaded.
    pub fn operator(
        owner: Option<&ClassId>,
        code: OperatorCode,
        return_type: TypeDescriptor,
    ) -> Option<Self> {
        let name = code.function_name()?;
        let qualified_name = match owner {
            Some(class) => QualifiedName::from(class.name()).child(name),
            None => QualifiedName::global(name),
        };
        Some(Self::new(
            name.to_string(),
            qualified_name,
            FunctionKind::Operator(code),
            return_type,
            owner.cloned(),
        ))
    }

    pub fn constructor(owner: &ClassId) -> Self {
        let simple = QualifiedName::from(owner.name()).name;
        Self::new(
            simple.clone(),
            QualifiedName::from(owner.name()).child(simple),
            FunctionKind::Constructor,
            TypeDescriptor::void(),
            Some(owner.clone()),
        )
    }

    pub fn destructor(owner: &ClassId) -> Self {
        let simple = format!("~{}", QualifiedName::from(owner.name()).name);
        Self::new(
            simple.clone(),
            QualifiedName::from(owner.name()).child(simple),
            FunctionKind::Destructor,
            TypeDescriptor::void(),
            Some(owner.clone()),
        )
    }

    /// `operator T()` declared in `owner`.
    pub fn conversion(owner: &ClassId, target: TypeDescriptor) -> Self {
        let name = format!("operator {target}");
        Self::new(
            name.clone(),
            QualifiedName::from(owner.name()).child(name),
            FunctionKind::Conversion,
            target,
            Some(owner.clone()),
        )
    }

    // === Builder Methods ===

    pub fn with_param(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.params.push(Param::new(name, ty));
        self.rehash();
        self
    }

    pub fn with_default_param(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        default: Rc<Operand>,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
            default: Some(default),
        });
        self.rehash();
        self
    }

    pub fn with_ellipsis(mut self) -> Self {
        self.has_ellipsis = true;
        self.rehash();
        self
    }

    pub fn with_cv(mut self, cv: Qualifiers) -> Self {
        self.cv = cv;
        self.rehash();
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// `virtual ... = 0`.
    pub fn as_pure(mut self) -> Self {
        self.is_virtual = true;
        self.is_pure = true;
        self
    }

    pub fn as_explicit(mut self) -> Self {
        self.is_explicit = true;
        self
    }

    fn rehash(&mut self) {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        self.hash = match (&self.owner, self.kind) {
            (Some(owner), FunctionKind::Constructor) => {
                TypeHash::from_constructor(owner.hash(), &params, self.has_ellipsis)
            }
            (Some(owner), _) => TypeHash::from_method(
                owner.hash(),
                &self.name,
                &params,
                self.has_ellipsis,
                self.cv.bits(),
            ),
            (None, _) => TypeHash::from_function(
                &self.qualified_name.to_string(),
                &params,
                self.has_ellipsis,
            ),
        };
    }

    // === Queries ===

    /// Members that take an implicit object argument.
    pub fn has_implicit_object(&self) -> bool {
        self.owner.is_some()
            && !self.is_static
            && !matches!(self.kind, FunctionKind::Constructor)
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, FunctionKind::Constructor)
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self.kind, FunctionKind::Conversion)
    }

    pub fn operator_code(&self) -> Option<OperatorCode> {
        match self.kind {
            FunctionKind::Operator(code) => Some(code),
            _ => None,
        }
    }

    /// Parameters that have no default argument.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .position(|p| p.default.is_some())
            .unwrap_or(self.params.len())
    }

    /// Structural viability on argument count alone.
    pub fn accepts_arg_count(&self, count: usize) -> bool {
        if count < self.required_params() {
            return false;
        }
        count <= self.params.len() || self.has_ellipsis
    }

    /// Callable with exactly one argument (the rest defaulted), or with
    /// none plus an ellipsis.
    pub fn is_converting_shape(&self) -> bool {
        self.accepts_arg_count(1)
    }

    /// A constructor whose first parameter is a reference to its own class
    /// and whose remaining parameters are defaulted.
    pub fn is_copy_constructor(&self) -> bool {
        let Some(owner) = &self.owner else {
            return false;
        };
        self.is_constructor()
            && self.accepts_arg_count(1)
            && self.params.first().is_some_and(|first| {
                first.ty.is_reference() && first.ty.class_id() == Some(owner)
            })
    }

    pub fn prototype(&self) -> FunctionPrototype {
        FunctionPrototype {
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            has_ellipsis: self.has_ellipsis,
            cv: self.cv,
        }
    }

    /// Type of the function designator (`int(double)`).
    pub fn function_type(&self) -> TypeDescriptor {
        self.return_type.function_returning(self.prototype())
    }

    /// Type of `&f`: a function pointer, or a member-function pointer for
    /// non-static members.
    pub fn address_type(&self) -> TypeDescriptor {
        match &self.owner {
            Some(owner) if !self.is_static => self.function_type().member_pointer_to(owner.clone()),
            _ => self.function_type().pointer_to(),
        }
    }

    /// Same name, parameter types and qualification.
    pub fn same_signature(&self, other: &FunctionEntry) -> bool {
        self.name == other.name
            && self.cv == other.cv
            && self.has_ellipsis == other.has_ellipsis
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

impl PartialEq for FunctionEntry {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for FunctionEntry {}

impl fmt::Display for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !matches!(
            self.kind,
            FunctionKind::Constructor | FunctionKind::Destructor | FunctionKind::Conversion
        ) {
            write!(f, "{} ", self.return_type)?;
        }
        write!(f, "{}{}", self.qualified_name, self.prototype())
    }
}
