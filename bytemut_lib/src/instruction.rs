//! The `instruction` module defines the instruction set of a compiled method body.
//!
//! The stream mixes executable instructions with structural markers.  Markers carry the facts
//! the mutation engine needs about the shape of the method (jump targets, source lines, block
//! boundaries and exception-cleanup regions) and never execute.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;

/// The identifier of a jump target within one method.
pub type LabelId = u32;

/// The computational type an instruction operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl ValueKind {
    /// Return true if the kind is an integral type.
    pub fn is_integral(&self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Long)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Reference => "reference",
        };
        write!(f, "{}", text)
    }
}

/// Binary arithmetic and bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
}

impl ArithOp {
    /// Return true if the operation is only defined for integral kinds.
    pub fn is_integral_only(&self) -> bool {
        !matches!(
            self,
            ArithOp::Add | ArithOp::Subtract | ArithOp::Multiply | ArithOp::Divide | ArithOp::Remainder
        )
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            ArithOp::Add => "ADD",
            ArithOp::Subtract => "SUBTRACT",
            ArithOp::Multiply => "MULTIPLY",
            ArithOp::Divide => "DIVIDE",
            ArithOp::Remainder => "REMAINDER",
            ArithOp::And => "AND",
            ArithOp::Or => "OR",
            ArithOp::Xor => "XOR",
            ArithOp::ShiftLeft => "SHIFT_LEFT",
            ArithOp::ShiftRight => "SHIFT_RIGHT",
            ArithOp::UnsignedShiftRight => "UNSIGNED_SHIFT_RIGHT",
        };
        write!(f, "{}", text)
    }
}

/// Comparison used by conditional jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        };
        write!(f, "{}", text)
    }
}

/// The dispatch kind of a method invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

/// A constant pushed by [`Instruction::Const`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Int(i32),
    Long(i64),
    Null,
}

/// One entry in a method's instruction stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Marks a jump target.
    Label { id: LabelId },
    /// Associates the following instructions with a source line.
    LineNumber { line: u32 },
    /// The traversal crosses into a new lexical block.
    BlockStart,
    /// The traversal enters an exception-cleanup sequence.
    CleanupStart,
    /// The traversal leaves the innermost exception-cleanup sequence.
    CleanupEnd,

    Nop,
    Const { value: Constant },
    Load { kind: ValueKind, slot: u16 },
    Store { kind: ValueKind, slot: u16 },
    Arith { kind: ValueKind, op: ArithOp },
    Neg { kind: ValueKind },
    /// Add `amount` to the int local in `slot`.
    Inc { slot: u16, amount: i32 },
    Pop,
    Pop2,
    Dup,
    /// Compare the int on top of the stack against zero and jump when `cond` holds.
    If { cond: Comparison, target: LabelId },
    /// Compare the two ints on top of the stack and jump when `cond` holds.
    IfCmp { cond: Comparison, target: LabelId },
    Goto { target: LabelId },
    Invoke {
        kind: InvokeKind,
        owner: String,
        name: String,
        descriptor: String,
    },
    Return,
    ReturnValue { kind: ValueKind },
    Throw,
}

impl Instruction {
    /// Return true if the instruction is a structural marker rather than executable code.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            Instruction::Label { .. }
                | Instruction::LineNumber { .. }
                | Instruction::BlockStart
                | Instruction::CleanupStart
                | Instruction::CleanupEnd
        )
    }

    /// Return the jump target of the instruction, if it has one.
    pub fn jump_target(&self) -> Option<LabelId> {
        match self {
            Instruction::If { target, .. }
            | Instruction::IfCmp { target, .. }
            | Instruction::Goto { target } => Some(*target),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Label { id } => write!(f, "L{}:", id),
            Instruction::LineNumber { line } => write!(f, "LINE {}", line),
            Instruction::BlockStart => write!(f, "BLOCK"),
            Instruction::CleanupStart => write!(f, "CLEANUP_START"),
            Instruction::CleanupEnd => write!(f, "CLEANUP_END"),
            Instruction::Nop => write!(f, "NOP"),
            Instruction::Const { value } => match value {
                Constant::Int(v) => write!(f, "CONST int {}", v),
                Constant::Long(v) => write!(f, "CONST long {}", v),
                Constant::Null => write!(f, "CONST null"),
            },
            Instruction::Load { kind, slot } => write!(f, "LOAD {} {}", kind, slot),
            Instruction::Store { kind, slot } => write!(f, "STORE {} {}", kind, slot),
            Instruction::Arith { kind, op } => write!(f, "{} {}", op, kind),
            Instruction::Neg { kind } => write!(f, "NEG {}", kind),
            Instruction::Inc { slot, amount } => write!(f, "INC {} {}", slot, amount),
            Instruction::Pop => write!(f, "POP"),
            Instruction::Pop2 => write!(f, "POP2"),
            Instruction::Dup => write!(f, "DUP"),
            Instruction::If { cond, target } => write!(f, "IF {} 0 GOTO L{}", cond, target),
            Instruction::IfCmp { cond, target } => write!(f, "IFCMP {} GOTO L{}", cond, target),
            Instruction::Goto { target } => write!(f, "GOTO L{}", target),
            Instruction::Invoke {
                kind,
                owner,
                name,
                descriptor,
            } => write!(f, "INVOKE {:?} {}.{}{}", kind, owner, name, descriptor),
            Instruction::Return => write!(f, "RETURN"),
            Instruction::ReturnValue { kind } => write!(f, "RETURN {}", kind),
            Instruction::Throw => write!(f, "THROW"),
        }
    }
}
