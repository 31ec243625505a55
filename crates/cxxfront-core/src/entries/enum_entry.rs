//! Enumerations and their enumerators.

use std::rc::Rc;

use crate::{Access, ClassId, EnumId, TypeDescriptor, TypeHash};

#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub id: EnumId,
    pub constants: Vec<Rc<EnumConstantEntry>>,
    /// Enclosing class for member enumerations.
    pub owner: Option<ClassId>,
    pub access: Access,
}

impl EnumEntry {
    pub fn new(qualified_name: &str) -> Self {
        Self {
            id: EnumId::new(qualified_name),
            constants: Vec::new(),
            owner: None,
            access: Access::Public,
        }
    }

    /// Member enumeration `owner::name`.
    pub fn member(owner: &ClassId, name: &str, access: Access) -> Self {
        let mut entry = Self::new(&format!("{}::{name}", owner.name()));
        entry.owner = Some(owner.clone());
        entry.access = access;
        entry
    }

    /// Add an enumerator; it inherits the enumeration's owner and access.
    pub fn with_value(mut self, name: &str, value: i64) -> Self {
        self.constants.push(Rc::new(EnumConstantEntry {
            hash: TypeHash::from_variable(self.id.name(), name),
            name: name.to_string(),
            enum_id: self.id.clone(),
            value,
            owner: self.owner.clone(),
            access: self.access,
        }));
        self
    }

    pub fn ty(&self) -> TypeDescriptor {
        TypeDescriptor::enumeration(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstantEntry {
    pub hash: TypeHash,
    pub name: String,
    pub enum_id: EnumId,
    pub value: i64,
    pub owner: Option<ClassId>,
    pub access: Access,
}

impl EnumConstantEntry {
    pub fn ty(&self) -> TypeDescriptor {
        TypeDescriptor::enumeration(self.enum_id.clone())
    }
}
