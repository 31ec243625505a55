//! Fundamental C++ types.

use std::fmt;

/// A fundamental type after sign/size modifiers have been folded in.
///
/// `unsigned short int` and `short unsigned` both arrive here as
/// [`PrimitiveKind::UnsignedShort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    WChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Float,
    Double,
    LongDouble,
}

impl PrimitiveKind {
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::SignedChar => "signed char",
            PrimitiveKind::UnsignedChar => "unsigned char",
            PrimitiveKind::WChar => "wchar_t",
            PrimitiveKind::Short => "short",
            PrimitiveKind::UnsignedShort => "unsigned short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::UnsignedInt => "unsigned int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::UnsignedLong => "unsigned long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::LongDouble => "long double",
        }
    }

    /// bool, the character types and the signed/unsigned integers.
    pub const fn is_integral(self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Void
                | PrimitiveKind::Float
                | PrimitiveKind::Double
                | PrimitiveKind::LongDouble
        )
    }

    pub const fn is_floating(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::LongDouble
        )
    }

    pub const fn is_arithmetic(self) -> bool {
        !matches!(self, PrimitiveKind::Void)
    }

    /// Plain `char` is signed on every target we model.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char
                | PrimitiveKind::SignedChar
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
                | PrimitiveKind::Float
                | PrimitiveKind::Double
                | PrimitiveKind::LongDouble
        )
    }

    /// Integer conversion rank; `None` for non-integral kinds.
    pub const fn integer_rank(self) -> Option<u8> {
        match self {
            PrimitiveKind::Bool => Some(0),
            PrimitiveKind::Char | PrimitiveKind::SignedChar | PrimitiveKind::UnsignedChar => {
                Some(1)
            }
            PrimitiveKind::Short | PrimitiveKind::UnsignedShort | PrimitiveKind::WChar => Some(2),
            PrimitiveKind::Int | PrimitiveKind::UnsignedInt => Some(3),
            PrimitiveKind::Long | PrimitiveKind::UnsignedLong => Some(4),
            _ => None,
        }
    }

    /// Floating-point rank; `None` for non-floating kinds.
    pub const fn floating_rank(self) -> Option<u8> {
        match self {
            PrimitiveKind::Float => Some(0),
            PrimitiveKind::Double => Some(1),
            PrimitiveKind::LongDouble => Some(2),
            _ => None,
        }
    }

    /// Storage size on the modelled LP64 target.
    pub const fn size_bytes(self) -> u64 {
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Bool
            | PrimitiveKind::Char
            | PrimitiveKind::SignedChar
            | PrimitiveKind::UnsignedChar => 1,
            PrimitiveKind::Short | PrimitiveKind::UnsignedShort => 2,
            PrimitiveKind::WChar
            | PrimitiveKind::Int
            | PrimitiveKind::UnsignedInt
            | PrimitiveKind::Float => 4,
            PrimitiveKind::Long | PrimitiveKind::UnsignedLong | PrimitiveKind::Double => 8,
            PrimitiveKind::LongDouble => 16,
        }
    }

    /// Unsigned counterpart of a signed integer kind.
    pub const fn to_unsigned(self) -> PrimitiveKind {
        match self {
            PrimitiveKind::Char | PrimitiveKind::SignedChar => PrimitiveKind::UnsignedChar,
            PrimitiveKind::Short => PrimitiveKind::UnsignedShort,
            PrimitiveKind::Int => PrimitiveKind::UnsignedInt,
            PrimitiveKind::Long => PrimitiveKind::UnsignedLong,
            other => other,
        }
    }

    /// Integral promotion: everything below `int` becomes `int`.
    pub const fn promoted(self) -> PrimitiveKind {
        match self {
            PrimitiveKind::Bool
            | PrimitiveKind::Char
            | PrimitiveKind::SignedChar
            | PrimitiveKind::UnsignedChar
            | PrimitiveKind::WChar
            | PrimitiveKind::Short
            | PrimitiveKind::UnsignedShort => PrimitiveKind::Int,
            other => other,
        }
    }

    /// Whether every value of `self` is representable in `other`.
    pub fn fits_in(self, other: PrimitiveKind) -> bool {
        if self == other {
            return true;
        }
        match (self.floating_rank(), other.floating_rank()) {
            (Some(a), Some(b)) => return a <= b,
            (Some(_), None) => return false,
            (None, Some(_)) => return self.is_integral(),
            (None, None) => {}
        }
        if !self.is_integral() || !other.is_integral() {
            return false;
        }
        if self == PrimitiveKind::Bool {
            return true;
        }
        match (self.is_signed(), other.is_signed()) {
            (true, false) => false,
            (false, true) => self.size_bytes() < other.size_bytes(),
            _ => self.size_bytes() <= other.size_bytes(),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
