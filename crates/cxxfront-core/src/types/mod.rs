//! The C++ type model.

mod descriptor;
mod primitive;
mod qualifiers;

pub use descriptor::{BaseType, ClassId, EnumId, FunctionPrototype, Layer, TypeDescriptor};
pub use primitive::PrimitiveKind;
pub use qualifiers::Qualifiers;
