//! SymbolRegistry - the declared-entity lookup service.
//!
//! This module provides [`SymbolRegistry`], an in-memory symbol table the
//! semantic core reads from. It is populated by the driver (or by tests)
//! before expressions are validated, and is never mutated by the core.
//!
//! # Storage Model
//!
//! - **Classes**: `ClassEntry` by `TypeHash`, with a name index and the
//!   petgraph-backed [`ClassHierarchy`]
//! - **Functions**: namespace-scope overloads grouped by qualified name; every
//!   function (members included) is also indexed by hash
//! - **Objects**: globals and typedefs by qualified name, block-scope
//!   variables by enclosing function
//!
//! # Example
//!
//! ```
//! use cxxfront_core::{Access, ClassEntry, QualifiedName, ScopeId};
//! use cxxfront_registry::SymbolRegistry;
//!
//! let mut registry = SymbolRegistry::new();
//! let base = registry.register_class(ClassEntry::class("Base")).unwrap();
//! let derived = registry
//!     .register_class(ClassEntry::class("Derived").with_base(&base, Access::Public))
//!     .unwrap();
//!
//! let view = registry.class_graph(derived.hash()).unwrap();
//! assert!(view.is_derived_from(&base));
//! assert_eq!(registry.lookup(&QualifiedName::from("Base"), &ScopeId::global()).len(), 1);
//! ```

use std::rc::Rc;

use cxxfront_core::{
    ClassEntry, ClassId, Declaration, EnumConstantEntry, EnumEntry, FunctionEntry,
    InheritancePath, LookupEntry, OperatorCode, PrimitiveKind, QualifiedName,
    RegistrationError, ScopeId, TypeDescriptor, TypeHash, TypedefEntry, VariableEntry,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::ClassHierarchy;

/// In-memory symbol table and class graph.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    // === Types ===
    classes: FxHashMap<TypeHash, ClassEntry>,
    class_names: FxHashMap<QualifiedName, TypeHash>,
    enums: FxHashMap<TypeHash, EnumEntry>,
    enum_names: FxHashMap<QualifiedName, TypeHash>,
    typedefs: FxHashMap<QualifiedName, Rc<TypedefEntry>>,
    hierarchy: ClassHierarchy,

    // === Functions ===
    /// Namespace-scope overloads by qualified name.
    functions: FxHashMap<QualifiedName, Vec<Rc<FunctionEntry>>>,
    /// Every registered function, members included.
    functions_by_hash: FxHashMap<TypeHash, Rc<FunctionEntry>>,

    // === Objects ===
    globals: FxHashMap<QualifiedName, Rc<VariableEntry>>,
    enum_constants: FxHashMap<QualifiedName, Rc<EnumConstantEntry>>,
    /// Block-scope variables and parameters by (function, name).
    locals: FxHashMap<(TypeHash, String), Rc<VariableEntry>>,

    namespaces: FxHashSet<QualifiedName>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the global allocation and deallocation functions
    /// already declared.
    pub fn with_default_allocators() -> Self {
        let mut registry = Self::new();
        registry.register_default_allocators();
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class. A complete definition may replace an earlier
    /// forward declaration.
    pub fn register_class(&mut self, entry: ClassEntry) -> Result<ClassId, RegistrationError> {
        let id = entry.id.clone();
        if let Some(existing) = self.classes.get(&id.hash()) {
            if existing.is_complete || !entry.is_complete {
                return Err(RegistrationError::DuplicateClass(id.to_string()));
            }
        }
        for base in &entry.bases {
            if !self.classes.contains_key(&base.class.hash()) {
                return Err(RegistrationError::UnknownBase {
                    class: id.to_string(),
                    base: base.class.to_string(),
                });
            }
        }
        self.hierarchy.add_class(&id, &entry.bases)?;

        for function in entry.functions() {
            self.functions_by_hash.insert(function.hash, Rc::clone(function));
        }
        self.note_namespace(&entry.qualified_name);
        self.class_names.insert(entry.qualified_name.clone(), id.hash());
        debug!(
            class = %id,
            bases = entry.bases.len(),
            members = entry.members.len(),
            complete = entry.is_complete,
            "registered class"
        );
        self.classes.insert(id.hash(), entry);
        Ok(id)
    }

    pub fn register_enum(&mut self, entry: EnumEntry) -> Result<(), RegistrationError> {
        let hash = entry.id.hash();
        if self.enums.contains_key(&hash) {
            return Err(RegistrationError::DuplicateEnum(entry.id.to_string()));
        }
        let name = QualifiedName::from(entry.id.name());
        if entry.owner.is_none() {
            let scope = name.qualifier.clone();
            for constant in &entry.constants {
                self.enum_constants.insert(
                    QualifiedName::new(constant.name.clone(), scope.clone()),
                    Rc::clone(constant),
                );
            }
        }
        self.note_namespace(&name);
        self.enum_names.insert(name, hash);
        self.enums.insert(hash, entry);
        Ok(())
    }

    /// Register a namespace-scope function (including operator functions and
    /// the allocation functions).
    pub fn register_function(
        &mut self,
        entry: FunctionEntry,
    ) -> Result<Rc<FunctionEntry>, RegistrationError> {
        if self.functions_by_hash.contains_key(&entry.hash) {
            return Err(RegistrationError::DuplicateFunction(entry.to_string()));
        }
        let entry = Rc::new(entry);
        debug!(function = %entry, "registered function");
        self.note_namespace(&entry.qualified_name);
        self.functions_by_hash.insert(entry.hash, Rc::clone(&entry));
        self.functions
            .entry(entry.qualified_name.clone())
            .or_default()
            .push(Rc::clone(&entry));
        Ok(entry)
    }

    pub fn register_global(
        &mut self,
        name: impl Into<QualifiedName>,
        ty: TypeDescriptor,
    ) -> Result<Rc<VariableEntry>, RegistrationError> {
        let name = name.into();
        if self.globals.contains_key(&name) {
            return Err(RegistrationError::DuplicateVariable(name.to_string()));
        }
        let entry = Rc::new(VariableEntry::global(name.clone(), ty));
        self.note_namespace(&name);
        self.globals.insert(name, Rc::clone(&entry));
        Ok(entry)
    }

    /// A block-scope variable of `function`.
    pub fn register_local(
        &mut self,
        function: TypeHash,
        name: &str,
        ty: TypeDescriptor,
    ) -> Result<Rc<VariableEntry>, RegistrationError> {
        self.insert_local(function, Rc::new(VariableEntry::local(function, name, ty)))
    }

    pub fn register_parameter(
        &mut self,
        function: TypeHash,
        name: &str,
        ty: TypeDescriptor,
    ) -> Result<Rc<VariableEntry>, RegistrationError> {
        self.insert_local(function, Rc::new(VariableEntry::parameter(function, name, ty)))
    }

    fn insert_local(
        &mut self,
        function: TypeHash,
        entry: Rc<VariableEntry>,
    ) -> Result<Rc<VariableEntry>, RegistrationError> {
        let key = (function, entry.name.clone());
        if self.locals.contains_key(&key) {
            return Err(RegistrationError::DuplicateVariable(entry.name.clone()));
        }
        self.locals.insert(key, Rc::clone(&entry));
        Ok(entry)
    }

    pub fn register_typedef(
        &mut self,
        name: impl Into<QualifiedName>,
        ty: TypeDescriptor,
    ) -> Rc<TypedefEntry> {
        let name = name.into();
        let entry = Rc::new(TypedefEntry::new(name.clone(), ty));
        self.note_namespace(&name);
        self.typedefs.insert(name, Rc::clone(&entry));
        entry
    }

    pub fn register_namespace(&mut self, name: impl Into<QualifiedName>) {
        let name = name.into();
        let mut current = Some(name);
        while let Some(ns) = current {
            current = ns.parent();
            self.namespaces.insert(ns);
        }
    }

    /// Declare the enclosing namespaces of a qualified entity name.
    fn note_namespace(&mut self, name: &QualifiedName) {
        if let Some(parent) = name.parent() {
            if !self.class_names.contains_key(&parent) {
                self.register_namespace(parent);
            }
        }
    }

    /// `void* operator new(unsigned long)`, `operator new[]` and the matching
    /// `operator delete(void*)` / `operator delete[](void*)`.
    pub fn register_default_allocators(&mut self) {
        let void_ptr = TypeDescriptor::void().pointer_to();
        let size = TypeDescriptor::primitive(PrimitiveKind::UnsignedLong);
        let allocators = [
            (OperatorCode::New, void_ptr.clone(), size.clone()),
            (OperatorCode::NewArray, void_ptr.clone(), size),
            (OperatorCode::Delete, TypeDescriptor::void(), void_ptr.clone()),
            (OperatorCode::DeleteArray, TypeDescriptor::void(), void_ptr),
        ];
        for (code, ret, param) in allocators {
            if let Some(entry) = FunctionEntry::operator(None, code, ret) {
                // Already present when called twice; keeping the first is fine.
                let _ = self.register_function(entry.with_param("p", param));
            }
        }
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn class(&self, hash: TypeHash) -> Option<&ClassEntry> {
        self.classes.get(&hash)
    }

    pub fn class_by_name(&self, name: &QualifiedName) -> Option<&ClassEntry> {
        self.class_names.get(name).and_then(|h| self.classes.get(h))
    }

    /// View of a class inside the inheritance graph.
    pub fn class_graph(&self, hash: TypeHash) -> Option<ClassView<'_>> {
        self.classes.get(&hash).map(|entry| ClassView {
            registry: self,
            entry,
        })
    }

    pub fn enumeration(&self, hash: TypeHash) -> Option<&EnumEntry> {
        self.enums.get(&hash)
    }

    pub fn function(&self, hash: TypeHash) -> Option<&Rc<FunctionEntry>> {
        self.functions_by_hash.get(&hash)
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    /// Namespace-scope functions with exactly this qualified name.
    pub fn functions_named(&self, name: &QualifiedName) -> &[Rc<FunctionEntry>] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a possibly qualified name as seen from `scope`.
    ///
    /// Unqualified names are searched in the enclosing function, then the
    /// enclosing class and its bases, then the enclosing namespaces from the
    /// innermost outward. The first scope with any match wins. Results are not
    /// reduced: hiding and ambiguity are decided by the caller.
    pub fn lookup(&self, name: &QualifiedName, scope: &ScopeId) -> Vec<LookupEntry> {
        if name.is_global() {
            if let Some(function) = scope.function {
                if let Some(local) = self.locals.get(&(function, name.name.clone())) {
                    return vec![LookupEntry::new(Declaration::Variable(Rc::clone(local)))];
                }
            }
            if let Some(class) = &scope.class {
                let found = self.lookup_in_class(class, &name.name);
                if !found.is_empty() {
                    return found;
                }
            }
            for namespace in scope.enclosing_namespaces() {
                let found = self.lookup_in_namespace(namespace, &name.name);
                if !found.is_empty() {
                    return found;
                }
            }
            return Vec::new();
        }

        for namespace in scope.enclosing_namespaces() {
            let mut path: Vec<String> = namespace.to_vec();
            path.extend(name.qualifier.iter().cloned());
            if let Some(class) = self.class_by_path(&path) {
                return self.lookup_in_class(&class.id, &name.name);
            }
            let found = self.lookup_in_namespace(&path, &name.name);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    fn class_by_path(&self, path: &[String]) -> Option<&ClassEntry> {
        let (last, rest) = path.split_last()?;
        self.class_by_name(&QualifiedName::new(last.clone(), rest.to_vec()))
    }

    /// Everything `name` denotes directly in one namespace.
    pub fn lookup_in_namespace(&self, namespace: &[String], name: &str) -> Vec<LookupEntry> {
        let key = QualifiedName::new(name, namespace.to_vec());
        let mut found = Vec::new();
        if let Some(hash) = self.class_names.get(&key) {
            if let Some(class) = self.classes.get(hash) {
                found.push(LookupEntry::new(Declaration::Class(class.id.clone())));
            }
        }
        if let Some(hash) = self.enum_names.get(&key) {
            if let Some(entry) = self.enums.get(hash) {
                found.push(LookupEntry::new(Declaration::Enum(entry.id.clone())));
            }
        }
        if let Some(typedef) = self.typedefs.get(&key) {
            found.push(LookupEntry::new(Declaration::Typedef(Rc::clone(typedef))));
        }
        if let Some(variable) = self.globals.get(&key) {
            found.push(LookupEntry::new(Declaration::Variable(Rc::clone(variable))));
        }
        if let Some(constant) = self.enum_constants.get(&key) {
            found.push(LookupEntry::new(Declaration::EnumConstant(Rc::clone(constant))));
        }
        for function in self.functions_named(&key) {
            found.push(LookupEntry::new(Declaration::Function(Rc::clone(function))));
        }
        if self.namespaces.contains(&key) {
            found.push(LookupEntry::new(Declaration::Namespace(key)));
        }
        found
    }

    /// Members named `name` visible in `class`.
    ///
    /// Each path through the base graph stops at the first class that
    /// declares the name, so a derived declaration hides the base ones on its
    /// own path.
    pub fn lookup_in_class(&self, class: &ClassId, name: &str) -> Vec<LookupEntry> {
        let mut found = Vec::new();
        self.collect_members(InheritancePath::start(class.clone()), name, &mut found);
        found
    }

    fn collect_members(&self, path: InheritancePath, name: &str, out: &mut Vec<LookupEntry>) {
        let Some(entry) = self.classes.get(&path.target().hash()) else {
            return;
        };
        let before = out.len();
        for member in entry.members_named(name) {
            out.push(LookupEntry::through(member.clone(), path.clone()));
        }
        if out.len() > before {
            return;
        }
        for base in &entry.bases {
            self.collect_members(path.extended(base), name, out);
        }
    }
}

/// Read-only view of one class in the inheritance graph.
#[derive(Clone, Copy)]
pub struct ClassView<'r> {
    registry: &'r SymbolRegistry,
    entry: &'r ClassEntry,
}

impl<'r> ClassView<'r> {
    pub fn entry(&self) -> &'r ClassEntry {
        self.entry
    }

    pub fn id(&self) -> &'r ClassId {
        &self.entry.id
    }

    pub fn ty(&self) -> TypeDescriptor {
        self.entry.ty()
    }

    pub fn is_complete(&self) -> bool {
        self.entry.is_complete
    }

    /// Declares or inherits a pure virtual function that no class on the
    /// way down overrides.
    pub fn is_abstract(&self) -> bool {
        !self.pure_functions().is_empty()
    }

    /// Declares or inherits a virtual function.
    pub fn is_polymorphic(&self) -> bool {
        self.entry.declares_virtual()
            || self
                .bases()
                .any(|(_, base)| base.is_polymorphic())
    }

    fn pure_functions(&self) -> Vec<Rc<FunctionEntry>> {
        let mut pure: Vec<Rc<FunctionEntry>> =
            self.entry.functions().filter(|f| f.is_pure).cloned().collect();
        for (_, base) in self.bases() {
            for inherited in base.pure_functions() {
                let overridden = self
                    .entry
                    .functions()
                    .any(|f| !f.is_pure && f.same_signature(&inherited));
                if !overridden && !pure.iter().any(|p| p.same_signature(&inherited)) {
                    pure.push(inherited);
                }
            }
        }
        pure
    }

    /// Direct bases with their views, in declaration order.
    pub fn bases(
        &self,
    ) -> impl Iterator<Item = (&'r cxxfront_core::BaseSpecifier, ClassView<'r>)> + 'r {
        let registry = self.registry;
        self.entry.bases.iter().filter_map(move |spec| {
            registry
                .class_graph(spec.class.hash())
                .map(|view| (spec, view))
        })
    }

    pub fn is_derived_from(&self, base: &ClassId) -> bool {
        self.registry.hierarchy.is_derived_from(&self.entry.id, base)
    }

    /// Every path from this class down to `base`.
    pub fn paths_to(&self, base: &ClassId) -> Vec<InheritancePath> {
        self.registry.hierarchy.paths(&self.entry.id, base)
    }

    pub fn ancestors(&self) -> Vec<ClassId> {
        self.registry.hierarchy.ancestors(&self.entry.id)
    }

    /// Members named `name`, as found by walking the base graph.
    pub fn find_member(&self, name: &str) -> Vec<LookupEntry> {
        self.registry.lookup_in_class(&self.entry.id, name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &'r Rc<FunctionEntry>> + 'r {
        self.entry.constructors()
    }

    pub fn destructor(&self) -> Option<&'r Rc<FunctionEntry>> {
        self.entry.destructor()
    }

    /// Whether `class` was declared a friend of this class.
    pub fn befriends_class(&self, class: &ClassId) -> bool {
        self.entry.is_friend_class(class.hash())
    }

    pub fn befriends_function(&self, function: TypeHash) -> bool {
        self.entry.is_friend_function(function)
    }

    /// Bytes an object occupies: bases plus non-static data members,
    /// at least one.
    pub fn size_bytes(&self) -> u64 {
        let bases: u64 = self.bases().map(|(_, base)| base.size_bytes()).sum();
        let fields: u64 = self
            .entry
            .fields()
            .filter(|f| f.is_instance_member())
            .map(|f| self.registry.size_of(&f.ty).unwrap_or(0))
            .sum();
        let vptr = if self.entry.declares_virtual() && bases == 0 { 8 } else { 0 };
        (bases + fields + vptr).max(1)
    }
}

impl SymbolRegistry {
    /// `sizeof(ty)`; `None` for incomplete and function types.
    pub fn size_of(&self, ty: &TypeDescriptor) -> Option<u64> {
        use cxxfront_core::{BaseType, Layer};

        let ty = ty.strip_reference();
        match ty.outer() {
            Some(Layer::Pointer(_)) | Some(Layer::MemberPointer { .. }) => Some(8),
            Some(Layer::Function(_)) => None,
            Some(Layer::Array(bound)) => {
                let element = ty.pointee()?;
                Some(bound.unwrap_or(0) * self.size_of(&element)?)
            }
            Some(Layer::Reference) | None => match ty.base() {
                BaseType::Primitive(PrimitiveKind::Void) => None,
                BaseType::Primitive(kind) => Some(kind.size_bytes()),
                BaseType::Enum(_) => Some(4),
                BaseType::Class(id) => {
                    let view = self.class_graph(id.hash())?;
                    view.is_complete().then(|| view.size_bytes())
                }
            },
        }
    }
}
