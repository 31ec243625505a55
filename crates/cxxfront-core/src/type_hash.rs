//! Deterministic identities for classes, enums, functions and members.
//!
//! [`TypeHash`] is a 64-bit XXHash of a qualified name (and, for callables,
//! of the owning class and the spelled parameter types). Two declarations
//! with the same spelling always get the same identity, which lets the
//! registry accept forward references and lets the semantic core compare
//! candidates without string comparisons.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Different entity kinds sharing a spelling (`struct S` and a function `S`)
/// must not collide.
pub mod hash_constants {
    /// Separator constant for path components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for class, struct, union and enum identities.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for namespace-scope functions.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for member functions (including operators).
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for constructors.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for variables and data members.
    pub const VARIABLE: u64 = 0x1a095090689d4647;

    /// Parameter position mixing constants; order of parameters matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

/// A deterministic 64-bit identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Identity of a class, struct, union or enum from its qualified name.
    ///
    /// ```
    /// use cxxfront_core::TypeHash;
    ///
    /// assert_eq!(TypeHash::from_name("ns::Widget"), TypeHash::from_name("ns::Widget"));
    /// assert_ne!(TypeHash::from_name("Widget"), TypeHash::from_name("ns::Widget"));
    /// ```
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Identity of a namespace-scope function from its qualified name and the
    /// spelling of its parameter types.
    ///
    /// ```
    /// use cxxfront_core::TypeHash;
    ///
    /// let f_int = TypeHash::from_function("f", &["int"], false);
    /// let f_double = TypeHash::from_function("f", &["double"], false);
    /// assert_ne!(f_int, f_double);
    /// ```
    pub fn from_function<S: AsRef<str>>(name: &str, params: &[S], ellipsis: bool) -> Self {
        let seed = hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params, ellipsis))
    }

    /// Identity of a member function. `cv` distinguishes `f()` from `f() const`.
    pub fn from_method<S: AsRef<str>>(
        owner: TypeHash,
        name: &str,
        params: &[S],
        ellipsis: bool,
        cv: u8,
    ) -> Self {
        let seed = hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0) ^ u64::from(cv);
        TypeHash(mix_params(seed, params, ellipsis))
    }

    /// Identity of a constructor; constructors are identified by owner + params.
    pub fn from_constructor<S: AsRef<str>>(owner: TypeHash, params: &[S], ellipsis: bool) -> Self {
        let seed = hash_constants::CONSTRUCTOR ^ owner.0;
        TypeHash(mix_params(seed, params, ellipsis))
    }

    /// Identity of a variable, parameter or data member.
    #[inline]
    pub fn from_variable(scope: &str, name: &str) -> Self {
        let scope_hash = xxh64(scope.as_bytes(), 0);
        TypeHash(
            (hash_constants::VARIABLE ^ scope_hash)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(xxh64(name.as_bytes(), 0)),
        )
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params<S: AsRef<str>>(seed: u64, params: &[S], ellipsis: bool) -> u64 {
    let mut hash = seed;
    for (i, param) in params.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        let param_hash = xxh64(param.as_ref().as_bytes(), 0);
        // wrapping_mul keeps parameter order significant
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param_hash);
    }
    if ellipsis {
        hash = hash.wrapping_mul(hash_constants::SEP).rotate_left(7);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
