//! The lexical context an expression is validated in.

use crate::{ClassId, QualifiedName, TypeHash};

/// Where the expression being built appears: its namespace, its enclosing
/// class (inside member functions and class bodies) and its enclosing
/// function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ScopeId {
    /// Enclosing namespaces, outermost first.
    pub namespace: Vec<String>,
    pub class: Option<ClassId>,
    pub function: Option<TypeHash>,
}

impl ScopeId {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn in_namespace(name: &QualifiedName) -> Self {
        let mut namespace = name.qualifier.clone();
        namespace.push(name.name.clone());
        Self {
            namespace,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &ClassId) -> Self {
        self.class = Some(class.clone());
        self
    }

    pub fn with_function(mut self, function: TypeHash) -> Self {
        self.function = Some(function);
        self
    }

    /// Namespaces to search for an unqualified name, innermost first,
    /// ending with the global namespace.
    pub fn enclosing_namespaces(&self) -> impl Iterator<Item = &[String]> {
        (0..=self.namespace.len())
            .rev()
            .map(move |depth| &self.namespace[..depth])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_are_searched_innermost_first() {
        let scope = ScopeId::in_namespace(&QualifiedName::from("a::b"));
        let order: Vec<String> = scope
            .enclosing_namespaces()
            .map(|ns| ns.join("::"))
            .collect();
        assert_eq!(order, vec!["a::b", "a", ""]);
    }
}
