//! The `mutators` module provides the objects that implement the built-in mutation operators and
//! the factory that implements [`MutatorFactory`].

use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::instruction::{Comparison, Constant, Instruction, InvokeKind, ValueKind};
use crate::mutation::OperatorType;
use crate::mutator::*;
use crate::operators::{boundary_replacement, math_replacement, negated_comparison};
use std::str::FromStr;

/// The object that implements the `MATH` operator.
struct MathMutator {
    name: String,
}

impl MathMutator {
    fn new() -> MathMutator {
        MathMutator {
            name: OperatorType::Math.to_string(),
        }
    }
}

impl Mutator for MathMutator {
    fn id(&self) -> &str {
        &self.name
    }

    fn inspect(&self, instruction: &Instruction, _context: &InstructionContext) -> Option<Rewrite> {
        if let Instruction::Arith { kind, op } = instruction {
            let replacement = math_replacement(*kind, *op)?;
            return Some(Rewrite::new(
                format!("replaced {} {} → {}", kind, op, replacement),
                vec![Instruction::Arith {
                    kind: *kind,
                    op: replacement,
                }],
            ));
        }
        None
    }
}

/// The object that implements mutations for conditional jumps.
///
/// Both conditional operators rewrite the comparison of an `If` or `IfCmp` instruction and
/// differ only in how they choose the new comparison, so one structure serves both.
struct ComparisonMutator {
    name: String,

    /// The verb used in the description of the rewrite.
    verb: &'static str,

    /// Return the replacement comparison, or `None` if the comparison is left alone.
    replace: fn(Comparison) -> Option<Comparison>,
}

impl ComparisonMutator {
    fn boundary() -> ComparisonMutator {
        ComparisonMutator {
            name: OperatorType::ConditionalsBoundary.to_string(),
            verb: "changed conditional boundary",
            replace: boundary_replacement,
        }
    }

    fn negation() -> ComparisonMutator {
        ComparisonMutator {
            name: OperatorType::NegateConditionals.to_string(),
            verb: "negated conditional",
            replace: |cond| Some(negated_comparison(cond)),
        }
    }
}

impl Mutator for ComparisonMutator {
    fn id(&self) -> &str {
        &self.name
    }

    fn inspect(&self, instruction: &Instruction, _context: &InstructionContext) -> Option<Rewrite> {
        let (cond, target, compares_two_values) = match instruction {
            Instruction::If { cond, target } => (*cond, *target, false),
            Instruction::IfCmp { cond, target } => (*cond, *target, true),
            _ => return None,
        };

        let new_cond = (self.replace)(cond)?;
        let mutated = if compares_two_values {
            Instruction::IfCmp {
                cond: new_cond,
                target,
            }
        } else {
            Instruction::If {
                cond: new_cond,
                target,
            }
        };

        Some(Rewrite::new(
            format!("{} {} → {}", self.verb, cond, new_cond),
            vec![mutated],
        ))
    }
}

/// The object that implements the `INCREMENTS` operator.
struct IncrementsMutator {
    name: String,
}

impl Mutator for IncrementsMutator {
    fn id(&self) -> &str {
        &self.name
    }

    fn inspect(&self, instruction: &Instruction, _context: &InstructionContext) -> Option<Rewrite> {
        if let Instruction::Inc { slot, amount } = instruction {
            let negated = amount.checked_neg()?;
            return Some(Rewrite::new(
                format!(
                    "changed increment of local {} from {} to {}",
                    slot, amount, negated
                ),
                vec![Instruction::Inc {
                    slot: *slot,
                    amount: negated,
                }],
            ));
        }
        None
    }
}

/// The object that implements the `INVERT_NEGS` operator.
struct InvertNegsMutator {
    name: String,
}

impl Mutator for InvertNegsMutator {
    fn id(&self) -> &str {
        &self.name
    }

    fn inspect(&self, instruction: &Instruction, _context: &InstructionContext) -> Option<Rewrite> {
        if let Instruction::Neg { kind } = instruction {
            return Some(Rewrite::new(
                format!("removed {} negation", kind),
                vec![Instruction::Nop],
            ));
        }
        None
    }
}

/// The object that replaces returned values with a constant.  Implements `TRUE_RETURNS`,
/// `FALSE_RETURNS` and `NULL_RETURNS`.
struct ReturnValueMutator {
    name: String,

    /// The constant returned by the mutant.
    constant: Constant,

    /// The text used for the constant in the description.
    constant_text: &'static str,
}

impl ReturnValueMutator {
    fn new(operator_type: OperatorType) -> ReturnValueMutator {
        let (constant, constant_text) = match operator_type {
            OperatorType::TrueReturns => (Constant::Int(1), "true"),
            OperatorType::FalseReturns => (Constant::Int(0), "false"),
            _ => (Constant::Null, "null"),
        };

        ReturnValueMutator {
            name: operator_type.to_string(),
            constant,
            constant_text,
        }
    }

    /// Return the value kind of the return instructions this mutator rewrites in a method
    /// returning `return_type`.
    fn applicable_kind(&self, return_type: &TypeDescriptor) -> Option<ValueKind> {
        match self.constant {
            Constant::Int(_) if *return_type == TypeDescriptor::Boolean => Some(ValueKind::Int),
            Constant::Null if return_type.is_reference() => Some(ValueKind::Reference),
            _ => None,
        }
    }
}

impl Mutator for ReturnValueMutator {
    fn id(&self) -> &str {
        &self.name
    }

    fn inspect(&self, instruction: &Instruction, context: &InstructionContext) -> Option<Rewrite> {
        if let Instruction::ReturnValue { kind } = instruction {
            let expected = self.applicable_kind(&context.descriptor().return_type)?;
            if *kind != expected {
                return None;
            }

            return Some(Rewrite::new(
                format!(
                    "replaced return value with {} for {}",
                    self.constant_text,
                    context.method()
                ),
                vec![
                    Instruction::Pop,
                    Instruction::Const {
                        value: self.constant,
                    },
                    Instruction::ReturnValue { kind: *kind },
                ],
            ));
        }
        None
    }
}

/// The object that implements the `VOID_METHOD_CALLS` operator.
struct VoidMethodCallMutator {
    name: String,
}

impl Mutator for VoidMethodCallMutator {
    fn id(&self) -> &str {
        &self.name
    }

    fn avoids_cleanup_regions(&self) -> bool {
        true
    }

    fn inspect(&self, instruction: &Instruction, _context: &InstructionContext) -> Option<Rewrite> {
        if let Instruction::Invoke {
            kind,
            owner,
            name,
            descriptor,
        } = instruction
        {
            if name == "<init>" {
                return None;
            }

            let parsed = match MethodDescriptor::from_str(descriptor) {
                Ok(d) => d,
                Err(e) => {
                    log::debug!("VoidMethodCallMutator skipped call to {}.{}: {}", owner, name, e);
                    return None;
                }
            };

            if !parsed.returns_void() {
                return None;
            }

            // Discard the arguments from the top of the stack down, then the receiver.
            let mut replacement: Vec<Instruction> = parsed
                .parameters
                .iter()
                .rev()
                .map(|p| {
                    if p.slot_size() == 2 {
                        Instruction::Pop2
                    } else {
                        Instruction::Pop
                    }
                })
                .collect();

            if *kind != InvokeKind::Static {
                replacement.push(Instruction::Pop);
            }

            if replacement.is_empty() {
                replacement.push(Instruction::Nop);
            }

            log::debug!(
                "VoidMethodCallMutator discards {} argument slots of {}.{}",
                parsed.argument_slots(),
                owner,
                name
            );

            return Some(Rewrite::new(
                format!("removed call to {}::{}", owner, name),
                replacement,
            ));
        }
        None
    }
}

/// The factory that creates the built-in mutators.
#[derive(Default)]
pub struct BuiltinMutatorFactory {}

impl MutatorFactory for BuiltinMutatorFactory {
    fn mutator_for(&self, operator_type: &OperatorType) -> Option<Box<dyn Mutator>> {
        match operator_type {
            OperatorType::Math => Some(Box::new(MathMutator::new())),
            OperatorType::ConditionalsBoundary => Some(Box::new(ComparisonMutator::boundary())),
            OperatorType::NegateConditionals => Some(Box::new(ComparisonMutator::negation())),
            OperatorType::Increments => Some(Box::new(IncrementsMutator {
                name: operator_type.to_string(),
            })),
            OperatorType::InvertNegs => Some(Box::new(InvertNegsMutator {
                name: operator_type.to_string(),
            })),
            OperatorType::TrueReturns
            | OperatorType::FalseReturns
            | OperatorType::NullReturns => Some(Box::new(ReturnValueMutator::new(*operator_type))),
            OperatorType::VoidMethodCalls => Some(Box::new(VoidMethodCallMutator {
                name: operator_type.to_string(),
            })),
        }
    }
}
