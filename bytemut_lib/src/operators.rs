//! The `operators` module provides the substitution tables used by the built-in mutators and
//! helper functions listing the instructions each table affects.

use crate::instruction::{ArithOp, Comparison, ValueKind};

/// Return the operation that replaces `op` for values of `kind`, or `None` if the operation
/// has no replacement for that kind.
pub fn math_replacement(kind: ValueKind, op: ArithOp) -> Option<ArithOp> {
    if kind == ValueKind::Reference || (op.is_integral_only() && !kind.is_integral()) {
        return None;
    }

    match op {
        ArithOp::Add => Some(ArithOp::Subtract),
        ArithOp::Subtract => Some(ArithOp::Add),
        ArithOp::Multiply => Some(ArithOp::Divide),
        ArithOp::Divide => Some(ArithOp::Multiply),
        ArithOp::Remainder => Some(ArithOp::Multiply),
        ArithOp::And => Some(ArithOp::Or),
        ArithOp::Or => Some(ArithOp::And),
        ArithOp::Xor => Some(ArithOp::And),
        ArithOp::ShiftLeft => Some(ArithOp::ShiftRight),
        ArithOp::ShiftRight => Some(ArithOp::ShiftLeft),
        ArithOp::UnsignedShiftRight => Some(ArithOp::ShiftLeft),
    }
}

/// Return the comparison that moves the boundary of `cond` by one, or `None` for equality
/// tests.
pub fn boundary_replacement(cond: Comparison) -> Option<Comparison> {
    match cond {
        Comparison::Lt => Some(Comparison::Le),
        Comparison::Le => Some(Comparison::Lt),
        Comparison::Gt => Some(Comparison::Ge),
        Comparison::Ge => Some(Comparison::Gt),
        Comparison::Eq | Comparison::Ne => None,
    }
}

/// Return the logical negation of `cond`.
pub fn negated_comparison(cond: Comparison) -> Comparison {
    match cond {
        Comparison::Eq => Comparison::Ne,
        Comparison::Ne => Comparison::Eq,
        Comparison::Lt => Comparison::Ge,
        Comparison::Ge => Comparison::Lt,
        Comparison::Gt => Comparison::Le,
        Comparison::Le => Comparison::Gt,
    }
}

/// Return the [`Vec<&str>`] object containing the arithmetic operations.
pub fn arithmetic_operations() -> Vec<&'static str> {
    vec![
        "ADD",
        "SUBTRACT",
        "MULTIPLY",
        "DIVIDE",
        "REMAINDER",
        "AND",
        "OR",
        "XOR",
        "SHIFT_LEFT",
        "SHIFT_RIGHT",
        "UNSIGNED_SHIFT_RIGHT",
    ]
}

/// Return the [`Vec<&str>`] object containing the ordering comparisons.
pub fn boundary_comparisons() -> Vec<&'static str> {
    vec![">", "<", ">=", "<="]
}

/// Return the [`Vec<&str>`] object containing all comparisons.
pub fn comparisons() -> Vec<&'static str> {
    vec!["==", "!=", ">", "<", ">=", "<="]
}
