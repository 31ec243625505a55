use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// cv-qualification of a type level or of a member function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
    pub struct Qualifiers: u8 {
        const CONST = 0b01;
        const VOLATILE = 0b10;
    }
}

impl Qualifiers {
    #[inline]
    pub fn is_const(self) -> bool {
        self.contains(Qualifiers::CONST)
    }

    #[inline]
    pub fn is_volatile(self) -> bool {
        self.contains(Qualifiers::VOLATILE)
    }

    /// `self` is at least as qualified as `other`.
    #[inline]
    pub fn at_least(self, other: Qualifiers) -> bool {
        self.contains(other)
    }

    /// Number of qualifiers set; used to measure qualification distance.
    #[inline]
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

impl fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_const(), self.is_volatile()) {
            (true, true) => f.write_str("const volatile"),
            (true, false) => f.write_str("const"),
            (false, true) => f.write_str("volatile"),
            (false, false) => Ok(()),
        }
    }
}
