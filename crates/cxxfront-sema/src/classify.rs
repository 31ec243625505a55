//! Type classification predicates.
//!
//! Pure functions over [`TypeDescriptor`]. Every predicate looks through at
//! most one outer reference, so `int&` is integral and `C&` is a class type.

use cxxfront_core::{ClassId, Layer, PrimitiveKind, TypeDescriptor};

fn kind(ty: &TypeDescriptor) -> Option<PrimitiveKind> {
    ty.primitive_kind()
}

/// Fundamental arithmetic types and enumerations.
pub fn is_arithmetic(ty: &TypeDescriptor) -> bool {
    kind(ty).is_some_and(PrimitiveKind::is_arithmetic) || is_enum(ty)
}

/// `bool`, the character types, the integer types and enumerations.
pub fn is_integral(ty: &TypeDescriptor) -> bool {
    kind(ty).is_some_and(PrimitiveKind::is_integral) || is_enum(ty)
}

pub fn is_floating(ty: &TypeDescriptor) -> bool {
    kind(ty).is_some_and(PrimitiveKind::is_floating)
}

pub fn is_bool(ty: &TypeDescriptor) -> bool {
    kind(ty) == Some(PrimitiveKind::Bool)
}

pub fn is_enum(ty: &TypeDescriptor) -> bool {
    ty.enum_id().is_some()
}

pub fn is_void(ty: &TypeDescriptor) -> bool {
    kind(ty) == Some(PrimitiveKind::Void)
}

/// Pointer or array.
pub fn is_pointer_like(ty: &TypeDescriptor) -> bool {
    matches!(ty.outer(), Some(Layer::Pointer(_) | Layer::Array(_)))
}

pub fn is_pointer(ty: &TypeDescriptor) -> bool {
    matches!(ty.outer(), Some(Layer::Pointer(_)))
}

pub fn is_array(ty: &TypeDescriptor) -> bool {
    matches!(ty.outer(), Some(Layer::Array(_)))
}

pub fn is_void_pointer(ty: &TypeDescriptor) -> bool {
    is_pointer(ty) && ty.pointee().is_some_and(|p| is_void(&p))
}

pub fn is_function_pointer(ty: &TypeDescriptor) -> bool {
    is_pointer(ty) && ty.pointee().is_some_and(|p| is_function_type(&p))
}

/// Pointer to an object type (not `void`, not a function).
pub fn is_object_pointer(ty: &TypeDescriptor) -> bool {
    is_pointer(ty)
        && ty
            .pointee()
            .is_some_and(|p| !is_void(&p) && !is_function_type(&p))
}

pub fn is_member_pointer(ty: &TypeDescriptor) -> bool {
    matches!(ty.outer(), Some(Layer::MemberPointer { .. }))
}

/// Class, struct or union with no derived layers besides a reference.
pub fn is_class_type(ty: &TypeDescriptor) -> bool {
    ty.class_id().is_some()
}

pub fn is_function_type(ty: &TypeDescriptor) -> bool {
    matches!(ty.outer(), Some(Layer::Function(_)))
}

/// Neither a class, a function nor `void`.
pub fn is_scalar(ty: &TypeDescriptor) -> bool {
    !is_class_type(ty) && !is_function_type(ty) && !is_void(ty)
}

/// Target of a pointer, member pointer or array.
pub fn pointee(ty: &TypeDescriptor) -> Option<TypeDescriptor> {
    ty.pointee()
}

/// The class of a class type or of a pointer to one.
pub fn class_of(ty: &TypeDescriptor) -> Option<ClassId> {
    if let Some(id) = ty.class_id() {
        return Some(id.clone());
    }
    if is_pointer(ty) {
        return ty.pointee().and_then(|p| p.class_id().cloned());
    }
    None
}

/// Value type after array-to-pointer and function-to-pointer decay.
pub fn decay(ty: &TypeDescriptor) -> TypeDescriptor {
    ty.decay()
}

/// Same base type and the same layers, ignoring cv-qualification at every
/// level. Function layers compare their parameter lists the same way.
pub fn compare_structural(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    if a.base() != b.base() || a.layers().len() != b.layers().len() {
        return false;
    }
    a.layers()
        .iter()
        .zip(b.layers())
        .all(|pair| match pair {
            (Layer::Pointer(_), Layer::Pointer(_)) | (Layer::Reference, Layer::Reference) => true,
            (Layer::Array(x), Layer::Array(y)) => x == y,
            (
                Layer::MemberPointer { class: x, .. },
                Layer::MemberPointer { class: y, .. },
            ) => x == y,
            (Layer::Function(x), Layer::Function(y)) => {
                x.has_ellipsis == y.has_ellipsis
                    && x.params.len() == y.params.len()
                    && x
                        .params
                        .iter()
                        .zip(&y.params)
                        .all(|(p, q)| compare_structural(p, q))
            }
            _ => false,
        })
}

/// Equal once the top-level qualifiers of both are dropped.
pub fn same_unqualified(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    a.strip_reference().unqualified() == b.strip_reference().unqualified()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{EnumId, FunctionPrototype, Qualifiers};

    fn double() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Double)
    }

    #[test]
    fn integral_and_arithmetic() {
        let color = TypeDescriptor::enumeration(EnumId::new("Color"));
        assert!(is_integral(&color));
        assert!(is_arithmetic(&color));
        assert!(is_integral(&TypeDescriptor::int().reference_to()));
        assert!(!is_integral(&double()));
        assert!(is_arithmetic(&double()));
        assert!(!is_arithmetic(&TypeDescriptor::void()));
        assert!(!is_integral(&TypeDescriptor::int().pointer_to()));
    }

    #[test]
    fn pointer_shapes() {
        let int_ptr = TypeDescriptor::int().pointer_to();
        let array = TypeDescriptor::int().array_of(Some(4));
        let func = TypeDescriptor::int().function_returning(FunctionPrototype::new(vec![]));
        assert!(is_pointer_like(&int_ptr));
        assert!(is_pointer_like(&array));
        assert!(is_pointer_like(&int_ptr.reference_to()));
        assert!(is_object_pointer(&int_ptr));
        assert!(is_function_pointer(&func.pointer_to()));
        assert!(!is_object_pointer(&func.pointer_to()));
        assert!(is_void_pointer(&TypeDescriptor::void().pointer_to()));
        assert!(is_function_type(&func));
        assert!(!is_scalar(&func));
        assert!(is_scalar(&int_ptr));
    }

    #[test]
    fn class_types() {
        let c = ClassId::new("C");
        let ty = TypeDescriptor::class(c.clone());
        assert!(is_class_type(&ty));
        assert!(is_class_type(&ty.reference_to()));
        assert!(!is_class_type(&ty.pointer_to()));
        assert_eq!(class_of(&ty.pointer_to()), Some(c));
    }

    #[test]
    fn structural_comparison_ignores_qualifiers() {
        let a = TypeDescriptor::int()
            .with_base_quals(Qualifiers::CONST)
            .pointer_to();
        let b = TypeDescriptor::int().pointer_to();
        assert!(compare_structural(&a, &b));
        assert!(!compare_structural(
            &TypeDescriptor::int().array_of(Some(3)),
            &TypeDescriptor::int().array_of(Some(4))
        ));

        let f1 = TypeDescriptor::void().function_returning(FunctionPrototype::new(vec![
            TypeDescriptor::int().with_base_quals(Qualifiers::CONST).pointer_to(),
        ]));
        let f2 = TypeDescriptor::void()
            .function_returning(FunctionPrototype::new(vec![TypeDescriptor::int().pointer_to()]));
        assert!(compare_structural(&f1, &f2));

        let m1 = TypeDescriptor::int().member_pointer_to(ClassId::new("A"));
        let m2 = TypeDescriptor::int().member_pointer_to(ClassId::new("B"));
        assert!(!compare_structural(&m1, &m2));
    }
}
