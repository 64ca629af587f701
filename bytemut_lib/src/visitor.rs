//! The `visitor` module provides the [`InstructionVisitor`] trait and [`traverse_method`], the
//! single linear pass over a method body shared by mutation discovery and mutation application.

use crate::block_counter::BlockCounter;
use crate::class::CompiledMethod;
use crate::error::BytemutError;
use crate::instruction::Instruction;
use crate::mutator::InstructionContext;

/// Trait that describes the behavior required from objects that traverse a method body.
///
/// The traversal calls the methods in this order:
///
/// * `on_start_method` - once, before the first instruction.
/// * `visit_marker` or `visit` - once per entry of the instruction stream, in order.  Markers
/// go to `visit_marker` after the traversal has updated the structural context; executable
/// instructions go to `visit` together with that context.
/// * `on_end_method` - once, after the last instruction.
pub trait InstructionVisitor {
    /// The traversal calls this function before the first instruction of `method`.
    ///
    /// # Arguments
    ///
    /// * `method` - The method about to be traversed.
    fn on_start_method(&mut self, _method: &CompiledMethod) {}

    /// The traversal calls this function for each structural marker.
    ///
    /// # Arguments
    ///
    /// * `position` - The position of the marker in the instruction stream.
    /// * `marker` - The marker.
    fn visit_marker(&mut self, _position: usize, _marker: &Instruction) {}

    /// The traversal calls this function for each executable instruction.
    ///
    /// # Arguments
    ///
    /// * `position` - The position of the instruction in the instruction stream.
    /// * `instruction` - The instruction.
    /// * `context` - The structural context at the instruction.
    fn visit(
        &mut self,
        position: usize,
        instruction: &Instruction,
        context: &InstructionContext,
    ) -> Result<(), BytemutError>;

    /// The traversal calls this function after the last instruction of `method`.
    ///
    /// # Arguments
    ///
    /// * `method` - The method just traversed.
    fn on_end_method(&mut self, _method: &CompiledMethod) -> Result<(), BytemutError> {
        Ok(())
    }
}

/// Traverse the instructions of `method` in order, keeping `counter` up to date and handing
/// every entry to `visitor`.
///
/// # Arguments
///
/// * `class_name` - The name of the class declaring `method`.
/// * `method` - The method to traverse.
/// * `counter` - The structural context tracker.  The traversal resets it before starting.
/// * `visitor` - The object processing the instructions.
pub fn traverse_method<V: InstructionVisitor>(
    class_name: &str,
    method: &CompiledMethod,
    counter: &mut dyn BlockCounter,
    visitor: &mut V,
) -> Result<(), BytemutError> {
    let descriptor = method.descriptor()?;
    let mut line: Option<u32> = None;

    counter.enter_method();
    visitor.on_start_method(method);

    for (position, instruction) in method.instructions.iter().enumerate() {
        match instruction {
            Instruction::BlockStart => {
                counter.enter_block();
            }
            Instruction::CleanupStart => counter.enter_cleanup_region(),
            Instruction::CleanupEnd => {
                if !counter.inside_cleanup_region() {
                    return Err(BytemutError::MalformedInput(format!(
                        "cleanup region closed at {} without being opened in {}",
                        position, method.signature
                    )));
                }
                counter.exit_cleanup_region();
            }
            Instruction::LineNumber { line: l } => line = Some(*l),
            _ => {}
        }

        if instruction.is_marker() {
            visitor.visit_marker(position, instruction);
            continue;
        }

        let context = InstructionContext::new(
            class_name,
            &method.signature,
            &descriptor,
            counter.current_block(),
            counter.inside_cleanup_region(),
            line,
        );
        visitor.visit(position, instruction, &context)?;
    }

    visitor.on_end_method(method)
}
