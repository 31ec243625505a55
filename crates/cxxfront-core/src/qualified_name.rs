use std::fmt;

/// A possibly qualified C++ name such as `std::vector` or `Outer::Inner::f`.
///
/// The leading segments are the enclosing namespaces or classes; the last one
/// is the declared name. `::x` and `x` name the same global entity.
///
/// ```
/// use cxxfront_core::QualifiedName;
///
/// let name = QualifiedName::from_qualified_string("::ns::Widget::draw");
/// assert_eq!(name.simple_name(), "draw");
/// assert_eq!(name.qualifier_string(), "ns::Widget");
/// assert_eq!(name.to_string(), "ns::Widget::draw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Declared name (e.g. `draw`, `operator+`).
    pub name: String,
    /// Enclosing scopes, outermost first. Empty for the global scope.
    pub qualifier: Vec<String>,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>, qualifier: Vec<String>) -> Self {
        Self {
            name: name.into(),
            qualifier,
        }
    }

    /// A name declared in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: Vec::new(),
        }
    }

    /// Split on `::`; the last segment is the name.
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split("::")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match parts.pop() {
            Some(name) => Self {
                name,
                qualifier: parts,
            },
            None => Self::global(""),
        }
    }

    pub fn is_global(&self) -> bool {
        self.qualifier.is_empty()
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    pub fn qualifier_path(&self) -> &[String] {
        &self.qualifier
    }

    pub fn qualifier_string(&self) -> String {
        self.qualifier.join("::")
    }

    /// Number of `::`-separated segments.
    pub fn depth(&self) -> usize {
        self.qualifier.len() + 1
    }

    /// `Outer` + `Inner` = `Outer::Inner`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut qualifier = self.qualifier.clone();
        qualifier.push(self.name.clone());
        Self {
            name: name.into(),
            qualifier,
        }
    }

    /// The enclosing scope as a name, if any (`a::b::c` -> `a::b`).
    pub fn parent(&self) -> Option<Self> {
        let (last, rest) = self.qualifier.split_last()?;
        Some(Self {
            name: last.clone(),
            qualifier: rest.to_vec(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.qualifier {
            write!(f, "{segment}::")?;
        }
        write!(f, "{}", self.name)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::from_qualified_string(&s)
    }
}
