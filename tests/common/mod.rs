//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use cxxfront::prelude::*;

pub fn span() -> Span {
    Span::new(1, 1, 1)
}

/// A named global variable of type `ty`, as an lvalue operand.
pub fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
    Operand::identifier(
        Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
        span(),
    )
}

pub fn double() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveKind::Double)
}

pub fn class_type(name: &str) -> TypeDescriptor {
    TypeDescriptor::class(ClassId::new(name))
}

/// `const T&`
pub fn const_ref(ty: TypeDescriptor) -> TypeDescriptor {
    ty.with_base_quals(Qualifiers::CONST).reference_to()
}

/// Populates a registry one declaration at a time, panicking on
/// registration errors.
pub struct RegistryBuilder {
    registry: SymbolRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: SymbolRegistry::new(),
        }
    }

    pub fn with_allocators() -> Self {
        Self {
            registry: SymbolRegistry::with_default_allocators(),
        }
    }

    pub fn class(mut self, entry: ClassEntry) -> Self {
        self.registry.register_class(entry).expect("class registers");
        self
    }

    pub fn function(mut self, entry: FunctionEntry) -> Self {
        self.registry
            .register_function(entry)
            .expect("function registers");
        self
    }

    pub fn build(self) -> SymbolRegistry {
        self.registry
    }
}

/// `struct V { void f(); }; struct A : private V {}; struct B : private V {};
/// struct D : A, B {};`
pub fn private_diamond() -> SymbolRegistry {
    let v = ClassId::new("V");
    let a = ClassId::new("A");
    let b = ClassId::new("B");
    RegistryBuilder::new()
        .class(
            ClassEntry::structure("V").with_method(
                FunctionEntry::method(&v, "f", TypeDescriptor::void()).with_access(Access::Public),
            ),
        )
        .class(ClassEntry::structure("A").with_base(&v, Access::Private))
        .class(ClassEntry::structure("B").with_base(&v, Access::Private))
        .class(
            ClassEntry::structure("D")
                .with_base(&a, Access::Public)
                .with_base(&b, Access::Public),
        )
        .build()
}

/// `struct Base {}; struct Derived : Base {};`
pub fn base_and_derived() -> SymbolRegistry {
    let base = ClassId::new("Base");
    RegistryBuilder::new()
        .class(ClassEntry::structure("Base"))
        .class(ClassEntry::structure("Derived").with_base(&base, Access::Public))
        .build()
}
