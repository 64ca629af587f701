//! The `mutator` module provides traits for objects that implement mutation operators and the
//! types those objects exchange with the method mutator.

use crate::block_counter::BlockId;
use crate::class::MethodSignature;
use crate::descriptor::MethodDescriptor;
use crate::instruction::Instruction;
use crate::mutation::OperatorType;

/// The facts about the traversal point that a mutator may consult when inspecting an
/// instruction.
#[derive(Debug, Clone)]
pub struct InstructionContext<'a> {
    class_name: &'a str,
    method: &'a MethodSignature,
    descriptor: &'a MethodDescriptor,
    block: BlockId,
    inside_cleanup_region: bool,
    line: Option<u32>,
}

impl<'a> InstructionContext<'a> {
    /// Create a new context.
    ///
    /// # Arguments
    ///
    /// * `class_name` - The name of the class being traversed.
    /// * `method` - The signature of the method being traversed.
    /// * `descriptor` - The parsed descriptor of the method.
    /// * `block` - The block containing the instruction.
    /// * `inside_cleanup_region` - True if the instruction lies inside a cleanup region.
    /// * `line` - The source line of the instruction, if known.
    pub fn new(
        class_name: &'a str,
        method: &'a MethodSignature,
        descriptor: &'a MethodDescriptor,
        block: BlockId,
        inside_cleanup_region: bool,
        line: Option<u32>,
    ) -> InstructionContext<'a> {
        InstructionContext {
            class_name,
            method,
            descriptor,
            block,
            inside_cleanup_region,
            line,
        }
    }

    pub fn class_name(&self) -> &str {
        self.class_name
    }

    pub fn method(&self) -> &MethodSignature {
        self.method
    }

    pub fn descriptor(&self) -> &MethodDescriptor {
        self.descriptor
    }

    pub fn current_block(&self) -> BlockId {
        self.block
    }

    pub fn inside_cleanup_region(&self) -> bool {
        self.inside_cleanup_region
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

/// The replacement a mutator offers for one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Human-readable description of the change.
    pub description: String,

    /// The instructions that take the place of the inspected instruction.
    pub replacement: Vec<Instruction>,
}

impl Rewrite {
    pub fn new(description: String, replacement: Vec<Instruction>) -> Rewrite {
        Rewrite {
            description,
            replacement,
        }
    }
}

/// Trait that describes the functionality that an object implementing a mutation operator
/// must provide.
///
/// Mutators are shared read-only between threads once registered, so they hold no state that
/// changes while inspecting instructions.  The same instruction and context must always yield
/// the same rewrite.
pub trait Mutator: Send + Sync {
    /// Return the stable identifier of the operator, for example `MATH`.
    fn id(&self) -> &str;

    /// Return true if the mutator should never be offered instructions inside exception-cleanup
    /// regions.
    fn avoids_cleanup_regions(&self) -> bool {
        false
    }

    /// When given an executable instruction and its context, return the rewrite the operator
    /// proposes, or `None` if the operator does not apply to the instruction.
    ///
    /// # Arguments
    ///
    /// * `instruction` - The instruction to inspect.
    /// * `context` - The structural context of the instruction.
    fn inspect(&self, instruction: &Instruction, context: &InstructionContext) -> Option<Rewrite>;
}

/// Trait that describes the functionality needed from the object that creates mutators for
/// operator types.
pub trait MutatorFactory {
    /// If possible, return a mutator object that implements the requested operator.
    ///
    /// # Arguments
    ///
    /// * `operator_type` - The operator.
    fn mutator_for(&self, operator_type: &OperatorType) -> Option<Box<dyn Mutator>>;
}
