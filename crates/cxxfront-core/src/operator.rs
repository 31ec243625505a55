//! Operator codes handed to the expression builders.
//!
//! One code per syntactic operator form. Overloadable codes also know the
//! name of the operator function that implements them (`operator+=`), which
//! is what member and namespace lookup search for.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCode {
    // === Binary arithmetic and bitwise ===
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,

    // === Logical and relational ===
    LogicalAnd,
    LogicalOr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // === Assignment ===
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    OrAssign,
    XorAssign,

    // === Postfix and member access ===
    Comma,
    Subscript,
    Call,
    /// `.`
    Dot,
    /// `->`
    Arrow,
    /// `.*`
    DotStar,
    /// `->*`
    ArrowStar,

    // === Allocation ===
    New,
    NewArray,
    Delete,
    DeleteArray,

    // === Casts ===
    StaticCast,
    DynamicCast,
    ReinterpretCast,
    ConstCast,
    /// `(T)e`
    CStyleCast,
    /// `T(e)`
    FunctionalCast,

    // === Unary ===
    Conditional,
    AddressOf,
    Indirection,
    UnaryPlus,
    UnaryMinus,
    BitNot,
    LogicalNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    SizeOf,
}

impl OperatorCode {
    /// Source spelling, as used in diagnostics.
    pub const fn spelling(self) -> &'static str {
        match self {
            OperatorCode::Add | OperatorCode::UnaryPlus => "+",
            OperatorCode::Sub | OperatorCode::UnaryMinus => "-",
            OperatorCode::Mul | OperatorCode::Indirection => "*",
            OperatorCode::Div => "/",
            OperatorCode::Mod => "%",
            OperatorCode::Shl => "<<",
            OperatorCode::Shr => ">>",
            OperatorCode::BitAnd | OperatorCode::AddressOf => "&",
            OperatorCode::BitOr => "|",
            OperatorCode::BitXor => "^",
            OperatorCode::LogicalAnd => "&&",
            OperatorCode::LogicalOr => "||",
            OperatorCode::Eq => "==",
            OperatorCode::Ne => "!=",
            OperatorCode::Lt => "<",
            OperatorCode::Gt => ">",
            OperatorCode::Le => "<=",
            OperatorCode::Ge => ">=",
            OperatorCode::Assign => "=",
            OperatorCode::AddAssign => "+=",
            OperatorCode::SubAssign => "-=",
            OperatorCode::MulAssign => "*=",
            OperatorCode::DivAssign => "/=",
            OperatorCode::ModAssign => "%=",
            OperatorCode::ShlAssign => "<<=",
            OperatorCode::ShrAssign => ">>=",
            OperatorCode::AndAssign => "&=",
            OperatorCode::OrAssign => "|=",
            OperatorCode::XorAssign => "^=",
            OperatorCode::Comma => ",",
            OperatorCode::Subscript => "[]",
            OperatorCode::Call | OperatorCode::FunctionalCast => "()",
            OperatorCode::Dot => ".",
            OperatorCode::Arrow => "->",
            OperatorCode::DotStar => ".*",
            OperatorCode::ArrowStar => "->*",
            OperatorCode::New => "new",
            OperatorCode::NewArray => "new[]",
            OperatorCode::Delete => "delete",
            OperatorCode::DeleteArray => "delete[]",
            OperatorCode::StaticCast => "static_cast",
            OperatorCode::DynamicCast => "dynamic_cast",
            OperatorCode::ReinterpretCast => "reinterpret_cast",
            OperatorCode::ConstCast => "const_cast",
            OperatorCode::CStyleCast => "(cast)",
            OperatorCode::Conditional => "?:",
            OperatorCode::BitNot => "~",
            OperatorCode::LogicalNot => "!",
            OperatorCode::PreIncrement | OperatorCode::PostIncrement => "++",
            OperatorCode::PreDecrement | OperatorCode::PostDecrement => "--",
            OperatorCode::SizeOf => "sizeof",
        }
    }

    /// Name of the operator function a user may declare for this code.
    ///
    /// `None` for the non-overloadable forms (`.`, `.*`, `?:`, casts, `sizeof`).
    pub const fn function_name(self) -> Option<&'static str> {
        Some(match self {
            OperatorCode::Add | OperatorCode::UnaryPlus => "operator+",
            OperatorCode::Sub | OperatorCode::UnaryMinus => "operator-",
            OperatorCode::Mul | OperatorCode::Indirection => "operator*",
            OperatorCode::Div => "operator/",
            OperatorCode::Mod => "operator%",
            OperatorCode::Shl => "operator<<",
            OperatorCode::Shr => "operator>>",
            OperatorCode::BitAnd | OperatorCode::AddressOf => "operator&",
            OperatorCode::BitOr => "operator|",
            OperatorCode::BitXor => "operator^",
            OperatorCode::LogicalAnd => "operator&&",
            OperatorCode::LogicalOr => "operator||",
            OperatorCode::Eq => "operator==",
            OperatorCode::Ne => "operator!=",
            OperatorCode::Lt => "operator<",
            OperatorCode::Gt => "operator>",
            OperatorCode::Le => "operator<=",
            OperatorCode::Ge => "operator>=",
            OperatorCode::Assign => "operator=",
            OperatorCode::AddAssign => "operator+=",
            OperatorCode::SubAssign => "operator-=",
            OperatorCode::MulAssign => "operator*=",
            OperatorCode::DivAssign => "operator/=",
            OperatorCode::ModAssign => "operator%=",
            OperatorCode::ShlAssign => "operator<<=",
            OperatorCode::ShrAssign => "operator>>=",
            OperatorCode::AndAssign => "operator&=",
            OperatorCode::OrAssign => "operator|=",
            OperatorCode::XorAssign => "operator^=",
            OperatorCode::Comma => "operator,",
            OperatorCode::Subscript => "operator[]",
            OperatorCode::Call => "operator()",
            OperatorCode::Arrow => "operator->",
            OperatorCode::ArrowStar => "operator->*",
            OperatorCode::New => "operator new",
            OperatorCode::NewArray => "operator new[]",
            OperatorCode::Delete => "operator delete",
            OperatorCode::DeleteArray => "operator delete[]",
            OperatorCode::BitNot => "operator~",
            OperatorCode::LogicalNot => "operator!",
            OperatorCode::PreIncrement | OperatorCode::PostIncrement => "operator++",
            OperatorCode::PreDecrement | OperatorCode::PostDecrement => "operator--",
            OperatorCode::Dot
            | OperatorCode::DotStar
            | OperatorCode::Conditional
            | OperatorCode::StaticCast
            | OperatorCode::DynamicCast
            | OperatorCode::ReinterpretCast
            | OperatorCode::ConstCast
            | OperatorCode::CStyleCast
            | OperatorCode::FunctionalCast
            | OperatorCode::SizeOf => return None,
        })
    }

    /// `=` and the compound assignments.
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            OperatorCode::Assign
                | OperatorCode::AddAssign
                | OperatorCode::SubAssign
                | OperatorCode::MulAssign
                | OperatorCode::DivAssign
                | OperatorCode::ModAssign
                | OperatorCode::ShlAssign
                | OperatorCode::ShrAssign
                | OperatorCode::AndAssign
                | OperatorCode::OrAssign
                | OperatorCode::XorAssign
        )
    }

    /// The binary operator a compound assignment applies (`+=` -> `+`).
    pub const fn compound_base(self) -> Option<OperatorCode> {
        match self {
            OperatorCode::AddAssign => Some(OperatorCode::Add),
            OperatorCode::SubAssign => Some(OperatorCode::Sub),
            OperatorCode::MulAssign => Some(OperatorCode::Mul),
            OperatorCode::DivAssign => Some(OperatorCode::Div),
            OperatorCode::ModAssign => Some(OperatorCode::Mod),
            OperatorCode::ShlAssign => Some(OperatorCode::Shl),
            OperatorCode::ShrAssign => Some(OperatorCode::Shr),
            OperatorCode::AndAssign => Some(OperatorCode::BitAnd),
            OperatorCode::OrAssign => Some(OperatorCode::BitOr),
            OperatorCode::XorAssign => Some(OperatorCode::BitXor),
            _ => None,
        }
    }

    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            OperatorCode::Eq
                | OperatorCode::Ne
                | OperatorCode::Lt
                | OperatorCode::Gt
                | OperatorCode::Le
                | OperatorCode::Ge
        )
    }

    /// Operators whose operands must be integral after promotion.
    pub const fn requires_integral(self) -> bool {
        matches!(
            self,
            OperatorCode::Mod
                | OperatorCode::Shl
                | OperatorCode::Shr
                | OperatorCode::BitAnd
                | OperatorCode::BitOr
                | OperatorCode::BitXor
                | OperatorCode::BitNot
        )
    }

    pub const fn is_cast(self) -> bool {
        matches!(
            self,
            OperatorCode::StaticCast
                | OperatorCode::DynamicCast
                | OperatorCode::ReinterpretCast
                | OperatorCode::ConstCast
                | OperatorCode::CStyleCast
                | OperatorCode::FunctionalCast
        )
    }

    /// Number of operands a builder expects, when fixed.
    pub const fn arity(self) -> Option<usize> {
        match self {
            OperatorCode::UnaryPlus
            | OperatorCode::UnaryMinus
            | OperatorCode::BitNot
            | OperatorCode::LogicalNot
            | OperatorCode::AddressOf
            | OperatorCode::Indirection
            | OperatorCode::PreIncrement
            | OperatorCode::PreDecrement
            | OperatorCode::PostIncrement
            | OperatorCode::PostDecrement
            | OperatorCode::SizeOf
            | OperatorCode::Delete
            | OperatorCode::DeleteArray => Some(1),
            OperatorCode::Conditional => Some(3),
            OperatorCode::Call
            | OperatorCode::New
            | OperatorCode::NewArray
            | OperatorCode::FunctionalCast => None,
            _ => Some(2),
        }
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names() {
        assert_eq!(OperatorCode::AddAssign.function_name(), Some("operator+="));
        assert_eq!(OperatorCode::PostIncrement.function_name(), Some("operator++"));
        assert_eq!(OperatorCode::Arrow.function_name(), Some("operator->"));
        assert_eq!(OperatorCode::Dot.function_name(), None);
        assert_eq!(OperatorCode::StaticCast.function_name(), None);
    }

    #[test]
    fn compound_assignment_decomposes() {
        assert_eq!(OperatorCode::ShlAssign.compound_base(), Some(OperatorCode::Shl));
        assert!(OperatorCode::XorAssign.is_assignment());
        assert!(OperatorCode::Assign.compound_base().is_none());
        assert!(!OperatorCode::Eq.is_assignment());
    }

    #[test]
    fn arity() {
        assert_eq!(OperatorCode::Conditional.arity(), Some(3));
        assert_eq!(OperatorCode::Indirection.arity(), Some(1));
        assert_eq!(OperatorCode::Add.arity(), Some(2));
        assert_eq!(OperatorCode::Call.arity(), None);
    }
}
