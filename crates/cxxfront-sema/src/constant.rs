//! Integral constant evaluation.
//!
//! Folds the integral subset of the validated tree: literals, enumerators,
//! `sizeof`, integral conversions and the arithmetic, bitwise, relational
//! and logical operators. Anything else (floating values, calls, objects)
//! is not a constant. Results are wrapped to the width of the node's type.

use cxxfront_core::{
    CastKind, ConversionStep, Declaration, ExprKind, Literal, Operand, OperatorCode,
    PrimitiveKind, TypeDescriptor,
};

use crate::classify::is_integral;

/// Value of an integral constant expression.
pub fn evaluate(operand: &Operand) -> Option<i128> {
    let ty = operand.ty()?;
    if !is_integral(ty) {
        return None;
    }
    let raw = match operand {
        Operand::Primary(_) => primary(operand)?,
        Operand::Expression(expr) => match &expr.kind {
            ExprKind::Conversion { step, operand } => match step {
                ConversionStep::Arithmetic { .. }
                | ConversionStep::EnumToIntegral
                | ConversionStep::IntegralToEnum
                | ConversionStep::Qualification => evaluate(operand)?,
                ConversionStep::ToBool => i128::from(evaluate(operand)? != 0),
                _ => return None,
            },
            ExprKind::Cast { kind, operand } => match kind {
                CastKind::Static | CastKind::CStyle | CastKind::Functional => evaluate(operand)?,
                _ => return None,
            },
            ExprKind::Unary { op, operand } => unary(*op, evaluate(operand)?)?,
            ExprKind::Binary { op, lhs, rhs } => binary(*op, lhs, rhs)?,
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if evaluate(condition)? != 0 {
                    evaluate(then_branch)?
                } else {
                    evaluate(else_branch)?
                }
            }
            ExprKind::SizeOf { bytes, .. } => i128::from((*bytes)?),
            _ => return None,
        },
        _ => return None,
    };
    Some(wrap(raw, ty))
}

/// An integral constant equal to zero.
pub fn is_zero(operand: &Operand) -> bool {
    evaluate(operand) == Some(0)
}

fn primary(operand: &Operand) -> Option<i128> {
    if let Some(literal) = operand.literal_value() {
        return match literal {
            Literal::Integer(v) => Some(*v),
            Literal::Char(c) => Some(i128::from(*c)),
            Literal::Bool(b) => Some(i128::from(*b)),
            Literal::Float(_) | Literal::String(_) => None,
        };
    }
    match operand.declaration()? {
        Declaration::EnumConstant(constant) => Some(i128::from(constant.value)),
        _ => None,
    }
}

fn unary(op: OperatorCode, value: i128) -> Option<i128> {
    Some(match op {
        OperatorCode::UnaryPlus => value,
        OperatorCode::UnaryMinus => value.checked_neg()?,
        OperatorCode::BitNot => !value,
        OperatorCode::LogicalNot => i128::from(value == 0),
        _ => return None,
    })
}

fn binary(op: OperatorCode, lhs: &Operand, rhs: &Operand) -> Option<i128> {
    // Short-circuit forms need only the left value when it decides.
    match op {
        OperatorCode::LogicalAnd => {
            return Some(i128::from(evaluate(lhs)? != 0 && evaluate(rhs)? != 0));
        }
        OperatorCode::LogicalOr => {
            return Some(i128::from(evaluate(lhs)? != 0 || evaluate(rhs)? != 0));
        }
        OperatorCode::Comma => return evaluate(rhs),
        _ => {}
    }
    let (a, b) = (evaluate(lhs)?, evaluate(rhs)?);
    Some(match op {
        OperatorCode::Add => a.checked_add(b)?,
        OperatorCode::Sub => a.checked_sub(b)?,
        OperatorCode::Mul => a.checked_mul(b)?,
        OperatorCode::Div => a.checked_div(b)?,
        OperatorCode::Mod => a.checked_rem(b)?,
        OperatorCode::Shl => a.checked_shl(u32::try_from(b).ok()?)?,
        OperatorCode::Shr => a.checked_shr(u32::try_from(b).ok()?)?,
        OperatorCode::BitAnd => a & b,
        OperatorCode::BitOr => a | b,
        OperatorCode::BitXor => a ^ b,
        OperatorCode::Eq => i128::from(a == b),
        OperatorCode::Ne => i128::from(a != b),
        OperatorCode::Lt => i128::from(a < b),
        OperatorCode::Gt => i128::from(a > b),
        OperatorCode::Le => i128::from(a <= b),
        OperatorCode::Ge => i128::from(a >= b),
        _ => return None,
    })
}

/// Reduce `value` modulo the width of `ty`, sign-extending signed kinds.
fn wrap(value: i128, ty: &TypeDescriptor) -> i128 {
    let kind = ty.primitive_kind().unwrap_or(PrimitiveKind::Int);
    if kind == PrimitiveKind::Bool {
        return i128::from(value != 0);
    }
    let bits = kind.size_bytes() * 8;
    if bits == 0 || bits >= 128 {
        return value;
    }
    let modulus = 1i128 << bits;
    let truncated = value.rem_euclid(modulus);
    if kind.is_signed() && truncated >= modulus / 2 {
        truncated - modulus
    } else {
        truncated
    }
}
