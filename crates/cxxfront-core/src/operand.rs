//! The validated expression tree.
//!
//! Nodes are shared through `Rc<Operand>`: wrapping a node in a conversion
//! or reusing it as a default argument never copies it. The result type
//! stored on a node is never a reference type; references surface as
//! lvalue-ness instead.

use ordered_float::OrderedFloat;
use std::fmt;
use std::rc::Rc;

use crate::{
    ClassId, Declaration, FunctionEntry, InheritancePath, OperatorCode, PrimitiveKind,
    Qualifiers, Span, TypeDescriptor,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Integer(i128),
    Float(OrderedFloat<f64>),
    Char(u32),
    Bool(bool),
    String(Rc<str>),
}

impl Literal {
    /// Type a literal has when the parser gave it no suffix.
    pub fn default_type(&self) -> TypeDescriptor {
        match self {
            Literal::Integer(value) => {
                if i32::try_from(*value).is_ok() {
                    TypeDescriptor::int()
                } else if i64::try_from(*value).is_ok() {
                    TypeDescriptor::primitive(PrimitiveKind::Long)
                } else {
                    TypeDescriptor::primitive(PrimitiveKind::UnsignedLong)
                }
            }
            Literal::Float(_) => TypeDescriptor::primitive(PrimitiveKind::Double),
            Literal::Char(_) => TypeDescriptor::primitive(PrimitiveKind::Char),
            Literal::Bool(_) => TypeDescriptor::bool(),
            Literal::String(text) => TypeDescriptor::primitive(PrimitiveKind::Char)
                .with_base_quals(Qualifiers::CONST)
                .array_of(Some(text.len() as u64 + 1)),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Char(c) => match char::from_u32(*c) {
                Some(ch) => write!(f, "'{ch}'"),
                None => write!(f, "'\\x{c:x}'"),
            },
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::String(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PrimaryKind {
    Identifier(Declaration),
    Literal(Literal),
    This,
}

#[derive(Debug, Clone)]
pub struct Primary {
    pub kind: PrimaryKind,
    pub ty: TypeDescriptor,
    pub is_lvalue: bool,
    pub span: Span,
}

/// A type used as an operand (`sizeof(T)`, the target of a cast, `new T`).
#[derive(Debug, Clone)]
pub struct TypeOperand {
    pub ty: TypeDescriptor,
    pub span: Span,
}

/// An unresolved set of callables sharing a name.
#[derive(Debug, Clone)]
pub struct OverloadSet {
    pub name: String,
    pub candidates: Vec<Rc<FunctionEntry>>,
    /// Object expression for `obj.f` / `ptr->f`.
    pub object: Option<Rc<Operand>>,
    /// Named with a qualifier (`C::f`); `&C::f` then forms a member pointer.
    pub qualified: bool,
    pub span: Span,
}

/// A single implicit conversion applied to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStep {
    /// Only the cv-qualification changes.
    Qualification,
    ArrayToPointer,
    FunctionToPointer,
    /// Integral/floating conversion; `promotion` when it is a promotion.
    Arithmetic { promotion: bool },
    /// A null pointer constant becomes a (member) pointer.
    NullPointer,
    /// Pointer, arithmetic or enum tested as `bool`.
    ToBool,
    PointerToVoid,
    /// `void*` to an object pointer (`static_cast` only).
    VoidToPointer,
    DerivedToBase { path: InheritancePath },
    BaseToDerived { path: InheritancePath },
    EnumToIntegral,
    IntegralToEnum,
    IntegralToPointer,
    PointerToIntegral,
    /// Reinterpreting pointer or reference conversion.
    Reinterpret,
    /// Checked downcast/crosscast.
    Dynamic,
    /// cv-qualifiers removed by `const_cast`.
    ConstAdjust,
    /// Binding a reference to an object (or to a temporary).
    BindReference { temporary: bool },
    /// Value discarded (`static_cast<void>`).
    ToVoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Static,
    Dynamic,
    Reinterpret,
    Const,
    CStyle,
    Functional,
}

impl CastKind {
    pub fn from_operator(op: OperatorCode) -> Option<CastKind> {
        Some(match op {
            OperatorCode::StaticCast => CastKind::Static,
            OperatorCode::DynamicCast => CastKind::Dynamic,
            OperatorCode::ReinterpretCast => CastKind::Reinterpret,
            OperatorCode::ConstCast => CastKind::Const,
            OperatorCode::CStyleCast => CastKind::CStyle,
            OperatorCode::FunctionalCast => CastKind::Functional,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Callee {
    Direct(Rc<FunctionEntry>),
    /// Call through a function pointer or reference expression.
    Indirect(Rc<Operand>),
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Callee,
    /// Implicit object argument of a member call.
    pub object: Option<Rc<Operand>>,
    pub args: Vec<Rc<Operand>>,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub allocated: TypeDescriptor,
    /// Synthetic byte count passed to the allocation function.
    pub size: Rc<Operand>,
    pub array_length: Option<Rc<Operand>>,
    pub placement: Vec<Rc<Operand>>,
    pub initializer: Vec<Rc<Operand>>,
    pub allocator: Rc<FunctionEntry>,
    pub constructor: Option<Rc<FunctionEntry>>,
}

#[derive(Debug, Clone)]
pub struct DeleteExpr {
    pub operand: Rc<Operand>,
    pub is_array: bool,
    pub deallocator: Rc<FunctionEntry>,
    pub destructor: Option<Rc<FunctionEntry>>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Unary {
        op: OperatorCode,
        operand: Rc<Operand>,
    },
    Binary {
        op: OperatorCode,
        lhs: Rc<Operand>,
        rhs: Rc<Operand>,
    },
    Ternary {
        condition: Rc<Operand>,
        then_branch: Rc<Operand>,
        else_branch: Rc<Operand>,
    },
    Call(CallExpr),
    New(NewExpr),
    Delete(DeleteExpr),
    /// `.` or `->` selecting a data member or a static member function.
    Member {
        op: OperatorCode,
        object: Rc<Operand>,
        member: Declaration,
    },
    Conversion {
        step: ConversionStep,
        operand: Rc<Operand>,
    },
    Cast {
        kind: CastKind,
        operand: Rc<Operand>,
    },
    SizeOf {
        measured: TypeDescriptor,
        bytes: Option<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExprKind,
    pub ty: TypeDescriptor,
    pub is_lvalue: bool,
    pub span: Span,
}

/// A node of the validated tree.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Already diagnosed; never diagnosed again.
    Error,
    Type(TypeOperand),
    Primary(Primary),
    Expression(Expression),
    Overload(OverloadSet),
}

impl Operand {
    // === Constructors ===

    pub fn literal(literal: Literal, span: Span) -> Rc<Operand> {
        let ty = literal.default_type();
        Self::typed_literal(literal, ty, span)
    }

    /// A literal with an explicit type (`10u`, `2.0f`).
    pub fn typed_literal(literal: Literal, ty: TypeDescriptor, span: Span) -> Rc<Operand> {
        let is_lvalue = matches!(literal, Literal::String(_));
        Rc::new(Operand::Primary(Primary {
            kind: PrimaryKind::Literal(literal),
            ty,
            is_lvalue,
            span,
        }))
    }

    pub fn integer(value: i128, span: Span) -> Rc<Operand> {
        Self::literal(Literal::Integer(value), span)
    }

    /// An identifier that resolved to `decl`.
    ///
    /// Objects and functions are lvalues; enumerators are not. A reference
    /// variable designates its referent.
    pub fn identifier(decl: Declaration, span: Span) -> Rc<Operand> {
        let (ty, is_lvalue) = match &decl {
            Declaration::Variable(v) => (v.ty.strip_reference(), true),
            Declaration::Function(f) => (f.function_type(), true),
            Declaration::EnumConstant(c) => (c.ty(), false),
            other => match other.ty() {
                Some(ty) => {
                    return Rc::new(Operand::Type(TypeOperand { ty, span }));
                }
                None => return Rc::new(Operand::Error),
            },
        };
        Rc::new(Operand::Primary(Primary {
            kind: PrimaryKind::Identifier(decl),
            ty,
            is_lvalue,
            span,
        }))
    }

    /// `this` inside a member function of `class` with qualification `cv`.
    pub fn this(class: &ClassId, cv: Qualifiers, span: Span) -> Rc<Operand> {
        let ty = TypeDescriptor::class(class.clone())
            .with_base_quals(cv)
            .pointer_to();
        Rc::new(Operand::Primary(Primary {
            kind: PrimaryKind::This,
            ty,
            is_lvalue: false,
            span,
        }))
    }

    pub fn type_name(ty: TypeDescriptor, span: Span) -> Rc<Operand> {
        Rc::new(Operand::Type(TypeOperand { ty, span }))
    }

    pub fn overloads(
        name: impl Into<String>,
        candidates: Vec<Rc<FunctionEntry>>,
        object: Option<Rc<Operand>>,
        qualified: bool,
        span: Span,
    ) -> Rc<Operand> {
        Rc::new(Operand::Overload(OverloadSet {
            name: name.into(),
            candidates,
            object,
            qualified,
            span,
        }))
    }

    /// A composite node. A reference result type becomes an lvalue of the
    /// referred type.
    pub fn expression(
        kind: ExprKind,
        ty: TypeDescriptor,
        is_lvalue: bool,
        span: Span,
    ) -> Rc<Operand> {
        let (ty, is_lvalue) = if ty.is_reference() {
            (ty.strip_reference(), true)
        } else {
            (ty, is_lvalue)
        };
        Rc::new(Operand::Expression(Expression {
            kind,
            ty,
            is_lvalue,
            span,
        }))
    }

    // === Queries ===

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Operand::Error)
    }

    /// Type of a value-producing node.
    pub fn ty(&self) -> Option<&TypeDescriptor> {
        match self {
            Operand::Primary(p) => Some(&p.ty),
            Operand::Expression(e) => Some(&e.ty),
            _ => None,
        }
    }

    /// The type named by a [`Operand::Type`] node.
    pub fn named_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Operand::Type(t) => Some(&t.ty),
            _ => None,
        }
    }

    pub fn is_lvalue(&self) -> bool {
        match self {
            Operand::Primary(p) => p.is_lvalue,
            Operand::Expression(e) => e.is_lvalue,
            _ => false,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Operand::Error => Span::synthetic(),
            Operand::Type(t) => t.span,
            Operand::Primary(p) => p.span,
            Operand::Expression(e) => e.span,
            Operand::Overload(o) => o.span,
        }
    }

    pub fn as_overload(&self) -> Option<&OverloadSet> {
        match self {
            Operand::Overload(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Operand::Expression(e) => Some(e),
            _ => None,
        }
    }

    /// Declaration named by an identifier node.
    pub fn declaration(&self) -> Option<&Declaration> {
        match self {
            Operand::Primary(Primary {
                kind: PrimaryKind::Identifier(decl),
                ..
            }) => Some(decl),
            _ => None,
        }
    }

    pub fn literal_value(&self) -> Option<&Literal> {
        match self {
            Operand::Primary(Primary {
                kind: PrimaryKind::Literal(literal),
                ..
            }) => Some(literal),
            _ => None,
        }
    }

    pub fn is_this(&self) -> bool {
        matches!(
            self,
            Operand::Primary(Primary {
                kind: PrimaryKind::This,
                ..
            })
        )
    }

    /// An integral literal with value zero.
    pub fn is_null_pointer_constant(&self) -> bool {
        match self {
            Operand::Primary(Primary {
                kind: PrimaryKind::Literal(Literal::Integer(0)),
                ty,
                ..
            }) => ty.primitive_kind().is_some_and(PrimitiveKind::is_integral),
            _ => false,
        }
    }

    /// Names a function (or an unresolved set of them) rather than an object.
    pub fn is_function_designator(&self) -> bool {
        match self {
            Operand::Overload(_) => true,
            Operand::Primary(Primary {
                kind: PrimaryKind::Identifier(Declaration::Function(_)),
                ..
            }) => true,
            _ => false,
        }
    }

    /// Peel implicit conversion wrappers.
    pub fn innermost(node: &Rc<Operand>) -> &Rc<Operand> {
        let mut current = node;
        while let Operand::Expression(Expression {
            kind: ExprKind::Conversion { operand, .. },
            ..
        }) = current.as_ref()
        {
            current = operand;
        }
        current
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Error => f.write_str("<error>"),
            Operand::Type(t) => write!(f, "{}", t.ty),
            Operand::Primary(p) => match &p.kind {
                PrimaryKind::Identifier(decl) => f.write_str(decl.name()),
                PrimaryKind::Literal(literal) => write!(f, "{literal}"),
                PrimaryKind::This => f.write_str("this"),
            },
            Operand::Overload(set) => write!(f, "{}", set.name),
            Operand::Expression(e) => match &e.kind {
                ExprKind::Unary { op, operand } => match op {
                    OperatorCode::PostIncrement | OperatorCode::PostDecrement => {
                        write!(f, "({operand}{op})")
                    }
                    _ => write!(f, "({op}{operand})"),
                },
                ExprKind::Binary { op, lhs, rhs } => match op {
                    OperatorCode::Subscript => write!(f, "{lhs}[{rhs}]"),
                    _ => write!(f, "({lhs} {op} {rhs})"),
                },
                ExprKind::Ternary {
                    condition,
                    then_branch,
                    else_branch,
                } => write!(f, "({condition} ? {then_branch} : {else_branch})"),
                ExprKind::Call(call) => {
                    if let Some(object) = &call.object {
                        write!(f, "{object}.")?;
                    }
                    match &call.callee {
                        Callee::Direct(func) => f.write_str(&func.name)?,
                        Callee::Indirect(target) => write!(f, "({target})")?,
                    }
                    f.write_str("(")?;
                    for (i, arg) in call.args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")
                }
                ExprKind::New(new) => write!(f, "new {}", new.allocated),
                ExprKind::Delete(delete) => {
                    if delete.is_array {
                        write!(f, "delete[] {}", delete.operand)
                    } else {
                        write!(f, "delete {}", delete.operand)
                    }
                }
                ExprKind::Member { op, object, member } => {
                    write!(f, "{object}{op}{}", member.name())
                }
                ExprKind::Conversion { operand, .. } => write!(f, "{operand}"),
                ExprKind::Cast { operand, .. } => write!(f, "({}){operand}", e.ty),
                ExprKind::SizeOf { measured, .. } => write!(f, "sizeof({measured})"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariableEntry;

    #[test]
    fn literal_types() {
        assert_eq!(Literal::Integer(7).default_type(), TypeDescriptor::int());
        assert_eq!(
            Literal::Integer(1 << 40).default_type(),
            TypeDescriptor::primitive(PrimitiveKind::Long)
        );
        assert_eq!(
            Literal::String(Rc::from("hi")).default_type().to_string(),
            "const char[3]"
        );
    }

    #[test]
    fn null_pointer_constant_is_integral_zero_literal() {
        assert!(Operand::integer(0, Span::synthetic()).is_null_pointer_constant());
        assert!(!Operand::integer(1, Span::synthetic()).is_null_pointer_constant());
        let zero_float = Operand::literal(Literal::Float(OrderedFloat(0.0)), Span::synthetic());
        assert!(!zero_float.is_null_pointer_constant());
    }

    #[test]
    fn reference_variables_designate_lvalues_of_the_referent() {
        let var = VariableEntry::global("r", TypeDescriptor::int().reference_to());
        let operand = Operand::identifier(Declaration::Variable(Rc::new(var)), Span::new(1, 1, 1));
        assert_eq!(operand.ty(), Some(&TypeDescriptor::int()));
        assert!(operand.is_lvalue());
    }

    #[test]
    fn expression_results_are_never_references() {
        let inner = Operand::integer(1, Span::synthetic());
        let node = Operand::expression(
            ExprKind::Unary {
                op: OperatorCode::Indirection,
                operand: inner,
            },
            TypeDescriptor::int().reference_to(),
            false,
            Span::synthetic(),
        );
        assert!(!node.ty().is_some_and(TypeDescriptor::is_reference));
        assert!(node.is_lvalue());
    }

    #[test]
    fn innermost_peels_conversions() {
        let leaf = Operand::integer(3, Span::synthetic());
        let wrapped = Operand::expression(
            ExprKind::Conversion {
                step: ConversionStep::Arithmetic { promotion: false },
                operand: Rc::clone(&leaf),
            },
            TypeDescriptor::primitive(PrimitiveKind::Double),
            false,
            Span::synthetic(),
        );
        assert!(Rc::ptr_eq(Operand::innermost(&wrapped), &leaf));
    }
}
