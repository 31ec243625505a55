//! Access specifiers for class members and base-class edges.

use std::fmt;

/// `public`, `protected` or `private`.
///
/// Ordered from most to least permissive so that `min`/`max` express
/// "cap at" and "most permissive of".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    /// The more permissive of two access levels.
    #[inline]
    pub fn most_permissive(self, other: Access) -> Access {
        self.min(other)
    }

    /// The more restrictive of two access levels.
    #[inline]
    pub fn most_restrictive(self, other: Access) -> Access {
        self.max(other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
