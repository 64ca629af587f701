//! The `method_mutator` module provides [`MethodMutator`], which discovers the mutation
//! candidates of one method and rewrites the method for a selection of them.
//!
//! Discovery and application run the same traversal.  Each candidate's index is the number of
//! candidates its operator produced earlier in the method, so replaying the traversal on an
//! unchanged method recomputes exactly the identifiers that discovery reported.

use crate::block_counter::ConcreteBlockCounter;
use crate::class::CompiledMethod;
use crate::error::BytemutError;
use crate::id::{MutationDetails, MutationIdentifier};
use crate::instruction::Instruction;
use crate::mutator::{InstructionContext, Rewrite};
use crate::registry::OperatorRegistry;
use crate::target::TargetSet;
use crate::visitor::{traverse_method, InstructionVisitor};
use std::collections::HashMap;

/// Per-method counters handing out successive indices to each operator.
#[derive(Debug, Default)]
struct OperatorIndices {
    next: HashMap<String, usize>,
}

impl OperatorIndices {
    /// Return the next index for `operator` and advance its counter.
    fn next_index(&mut self, operator: &str) -> usize {
        let counter = self.next.entry(String::from(operator)).or_insert(0);
        let index = *counter;
        *counter += 1;
        index
    }
}

/// The visitor that records the details of every accepted candidate in a method.
struct MutationCollector<'a> {
    class_name: &'a str,
    source_file: Option<&'a str>,
    registry: &'a OperatorRegistry,
    targets: &'a TargetSet,
    indices: OperatorIndices,
    mutations: Vec<MutationDetails>,
}

impl<'a> InstructionVisitor for MutationCollector<'a> {
    fn visit(
        &mut self,
        position: usize,
        instruction: &Instruction,
        context: &InstructionContext,
    ) -> Result<(), BytemutError> {
        for (mutator, rewrite) in self.registry.for_each_applicable(instruction, context)? {
            // The index is allocated before filtering so numbering does not depend on the
            // target set.
            let index = self.indices.next_index(mutator.id());
            let id = MutationIdentifier::new(self.class_name, context.method(), mutator.id(), index);

            if !self.targets.accepts(&id) {
                continue;
            }

            self.mutations.push(MutationDetails {
                id,
                file: self.source_file.map(String::from),
                line: context.line(),
                block: context.current_block(),
                description: rewrite.description,
                inside_cleanup_region: context.inside_cleanup_region(),
                instruction_position: position,
            });
        }
        Ok(())
    }
}

/// The visitor that copies a method while substituting the rewrites of selected candidates.
struct MutationMaker<'a> {
    class_name: &'a str,
    registry: &'a OperatorRegistry,
    indices: OperatorIndices,

    /// The requested identifiers, without duplicates.
    selected: Vec<MutationIdentifier>,

    /// `found[i]` is true once the traversal reached `selected[i]`.
    found: Vec<bool>,

    /// The rewritten instruction stream.
    instructions: Vec<Instruction>,
}

impl<'a> MutationMaker<'a> {
    fn new(
        class_name: &'a str,
        registry: &'a OperatorRegistry,
        selected: &[MutationIdentifier],
    ) -> MutationMaker<'a> {
        let mut selected = selected.to_vec();
        selected.sort();
        selected.dedup();
        let found = vec![false; selected.len()];

        MutationMaker {
            class_name,
            registry,
            indices: OperatorIndices::default(),
            selected,
            found,
            instructions: Vec::new(),
        }
    }
}

impl<'a> InstructionVisitor for MutationMaker<'a> {
    fn on_start_method(&mut self, method: &CompiledMethod) {
        self.instructions.reserve(method.instructions.len());
    }

    fn visit_marker(&mut self, _position: usize, marker: &Instruction) {
        self.instructions.push(marker.clone());
    }

    fn visit(
        &mut self,
        position: usize,
        instruction: &Instruction,
        context: &InstructionContext,
    ) -> Result<(), BytemutError> {
        let mut chosen: Option<Rewrite> = None;

        for (mutator, rewrite) in self.registry.for_each_applicable(instruction, context)? {
            let index = self.indices.next_index(mutator.id());
            let id = MutationIdentifier::new(self.class_name, context.method(), mutator.id(), index);

            if let Some(slot) = self.selected.iter().position(|s| s.matches(&id)) {
                if chosen.is_some() {
                    return Err(BytemutError::ConflictingMutations {
                        method: context.method().to_string(),
                        position,
                    });
                }
                self.found[slot] = true;
                chosen = Some(rewrite);
            }
        }

        match chosen {
            Some(rewrite) => {
                log::debug!(
                    "Rewrote {} at {} in {}: {}",
                    instruction,
                    position,
                    context.method(),
                    rewrite.description
                );
                self.instructions.extend(rewrite.replacement);
            }
            None => self.instructions.push(instruction.clone()),
        }

        Ok(())
    }

    fn on_end_method(&mut self, _method: &CompiledMethod) -> Result<(), BytemutError> {
        match self.found.iter().position(|found| !found) {
            Some(missing) => Err(BytemutError::MutationNotFound(
                self.selected[missing].clone(),
            )),
            None => Ok(()),
        }
    }
}

/// Discovers and applies mutations within the methods of one class.
pub struct MethodMutator<'a> {
    class_name: &'a str,
    source_file: Option<&'a str>,
    registry: &'a OperatorRegistry,
    targets: &'a TargetSet,
}

impl<'a> MethodMutator<'a> {
    /// Create a new method mutator.
    ///
    /// # Arguments
    ///
    /// * `class_name` - The name of the class declaring the methods.
    /// * `registry` - The operators to query.
    /// * `targets` - The candidates discovery should report.
    pub fn new(
        class_name: &'a str,
        registry: &'a OperatorRegistry,
        targets: &'a TargetSet,
    ) -> MethodMutator<'a> {
        MethodMutator {
            class_name,
            source_file: None,
            registry,
            targets,
        }
    }

    /// Name the source file recorded in the details of discovered candidates.
    ///
    /// # Arguments
    ///
    /// * `source_file` - The source file the class was compiled from, if known.
    pub fn with_source_file(mut self, source_file: Option<&'a str>) -> MethodMutator<'a> {
        self.source_file = source_file;
        self
    }

    /// Return the details of every candidate in `method` accepted by the target set, in
    /// traversal order.
    ///
    /// # Arguments
    ///
    /// * `method` - The method to inspect.
    pub fn discover(&self, method: &CompiledMethod) -> Result<Vec<MutationDetails>, BytemutError> {
        let mut collector = MutationCollector {
            class_name: self.class_name,
            source_file: self.source_file,
            registry: self.registry,
            targets: self.targets,
            indices: OperatorIndices::default(),
            mutations: Vec::new(),
        };

        traverse_method(
            self.class_name,
            method,
            &mut ConcreteBlockCounter::new(),
            &mut collector,
        )?;

        log::debug!(
            "Found {} mutations in {}.{}",
            collector.mutations.len(),
            self.class_name,
            method.signature
        );

        Ok(collector.mutations)
    }

    /// Return a copy of `method` with the rewrites of every candidate in `selected` applied.
    ///
    /// The target set does not restrict which candidates can be applied.  If any identifier in
    /// `selected` does not name a candidate of `method` the whole request fails with
    /// [`BytemutError::MutationNotFound`].
    ///
    /// # Arguments
    ///
    /// * `method` - The method to rewrite.
    /// * `selected` - The identifiers of the candidates to apply.
    pub fn apply(
        &self,
        method: &CompiledMethod,
        selected: &[MutationIdentifier],
    ) -> Result<CompiledMethod, BytemutError> {
        let mut maker = MutationMaker::new(self.class_name, self.registry, selected);

        traverse_method(
            self.class_name,
            method,
            &mut ConcreteBlockCounter::new(),
            &mut maker,
        )?;

        Ok(CompiledMethod {
            signature: method.signature.clone(),
            max_stack: method.max_stack,
            max_locals: method.max_locals,
            instructions: maker.instructions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::MethodSignature;
    use crate::instruction::{ArithOp, Comparison, InvokeKind, ValueKind};
    use crate::mutation::OperatorType;
    use crate::target::MutationTarget;

    static CLASS: &str = "com/example/Calculator";

    fn load(slot: u16) -> Instruction {
        Instruction::Load {
            kind: ValueKind::Int,
            slot,
        }
    }

    fn arith(op: ArithOp) -> Instruction {
        Instruction::Arith {
            kind: ValueKind::Int,
            op,
        }
    }

    fn return_int() -> Instruction {
        Instruction::ReturnValue {
            kind: ValueKind::Int,
        }
    }

    fn close_call() -> Instruction {
        Instruction::Invoke {
            kind: InvokeKind::Virtual,
            owner: String::from("java/io/InputStream"),
            name: String::from("close"),
            descriptor: String::from("()V"),
        }
    }

    fn add_method() -> CompiledMethod {
        CompiledMethod::new(
            "add",
            "(II)I",
            vec![load(1), load(2), arith(ArithOp::Add), return_int()],
        )
    }

    fn mixed_method() -> CompiledMethod {
        CompiledMethod::new(
            "mix",
            "(II)I",
            vec![
                Instruction::LineNumber { line: 20 },
                load(1),
                load(2),
                arith(ArithOp::Add),
                Instruction::BlockStart,
                Instruction::LineNumber { line: 21 },
                load(1),
                arith(ArithOp::Multiply),
                Instruction::If {
                    cond: Comparison::Lt,
                    target: 1,
                },
                Instruction::Inc { slot: 1, amount: 1 },
                Instruction::Label { id: 1 },
                load(1),
                arith(ArithOp::Subtract),
                return_int(),
            ],
        )
    }

    fn registry(operator_types: &[OperatorType]) -> OperatorRegistry {
        OperatorRegistry::from_operator_types(operator_types).unwrap()
    }

    fn all_registry() -> OperatorRegistry {
        registry(&crate::mutation::get_all_operator_types())
    }

    #[test]
    fn test_single_addition_scenario() {
        let registry = registry(&[OperatorType::Math]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = add_method();

        let mutations = mutator.discover(&method).unwrap();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].id.index, 0);
        assert_eq!(mutations[0].id.operator, "MATH");
        assert!(mutations[0].description.contains("ADD → SUBTRACT"));
        assert_eq!(mutations[0].instruction_position, 2);

        let mutated = mutator.apply(&method, &[mutations[0].id.clone()]).unwrap();
        assert_eq!(
            mutated.instructions,
            vec![load(1), load(2), arith(ArithOp::Subtract), return_int()]
        );
        assert_eq!(mutated.signature, method.signature);
    }

    #[test]
    fn test_apply_unknown_index_fails() {
        let registry = registry(&[OperatorType::Math]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = CompiledMethod::new(
            "twice",
            "(II)I",
            vec![
                load(1),
                load(2),
                arith(ArithOp::Add),
                load(2),
                arith(ArithOp::Add),
                return_int(),
            ],
        );
        assert_eq!(mutator.discover(&method).unwrap().len(), 2);

        let missing = MutationIdentifier::new(CLASS, &method.signature, "MATH", 5);
        let result = mutator.apply(&method, &[missing.clone()]);
        assert!(matches!(result, Err(BytemutError::MutationNotFound(id)) if id == missing));
    }

    #[test]
    fn test_batch_fails_when_any_identifier_is_missing() {
        let registry = registry(&[OperatorType::Math]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = add_method();

        let present = MutationIdentifier::new(CLASS, &method.signature, "MATH", 0);
        let absent = MutationIdentifier::new(CLASS, &method.signature, "INCREMENTS", 0);
        assert!(matches!(
            mutator.apply(&method, &[present, absent]),
            Err(BytemutError::MutationNotFound(_))
        ));
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let registry = all_registry();
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = mixed_method();

        let first = mutator.discover(&method).unwrap();
        let second = mutator.discover(&method).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_indices_increase_per_operator() {
        let registry = all_registry();
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let mutations = mutator.discover(&mixed_method()).unwrap();

        let mut last_index: HashMap<String, usize> = HashMap::new();
        for details in &mutations {
            if let Some(previous) = last_index.get(&details.id.operator) {
                assert!(details.id.index > *previous);
            } else {
                assert_eq!(details.id.index, 0);
            }
            last_index.insert(details.id.operator.clone(), details.id.index);
        }

        let math: Vec<usize> = mutations
            .iter()
            .filter(|d| d.id.operator == "MATH")
            .map(|d| d.id.index)
            .collect();
        assert_eq!(math, vec![0, 1, 2]);
    }

    #[test]
    fn test_details_record_block_and_line() {
        let registry = registry(&[OperatorType::Math]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let mutations = mutator.discover(&mixed_method()).unwrap();

        assert_eq!(mutations[0].block, 0);
        assert_eq!(mutations[0].line, Some(20));
        assert_eq!(mutations[1].block, 1);
        assert_eq!(mutations[1].line, Some(21));
        assert!(mutations.iter().all(|d| !d.inside_cleanup_region));
    }

    #[test]
    fn test_target_filter_keeps_original_numbering() {
        let registry = registry(&[OperatorType::Math, OperatorType::Increments]);
        let method = mixed_method();
        let targets: TargetSet = vec![MutationTarget::any()
            .with_operator("MATH")
            .with_index(1)]
        .into();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);

        let mutations = mutator.discover(&method).unwrap();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].id.index, 1);
        assert!(mutations[0].description.contains("MULTIPLY → DIVIDE"));

        // Unselected candidates can still be applied explicitly.
        let increment = MutationIdentifier::new(CLASS, &method.signature, "INCREMENTS", 0);
        let mutated = mutator.apply(&method, &[increment]).unwrap();
        assert!(mutated
            .instructions
            .contains(&Instruction::Inc { slot: 1, amount: -1 }));
    }

    #[test]
    fn test_cleanup_regions_suppress_sensitive_operators() {
        let registry = registry(&[OperatorType::VoidMethodCalls, OperatorType::Math]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = CompiledMethod::new(
            "read",
            "(Ljava/io/InputStream;)I",
            vec![
                Instruction::Load {
                    kind: ValueKind::Reference,
                    slot: 1,
                },
                close_call(),
                Instruction::CleanupStart,
                Instruction::Load {
                    kind: ValueKind::Reference,
                    slot: 1,
                },
                close_call(),
                load(2),
                load(2),
                arith(ArithOp::Add),
                Instruction::Pop,
                Instruction::CleanupEnd,
                load(2),
                return_int(),
            ],
        );

        let mutations = mutator.discover(&method).unwrap();
        let void_calls: Vec<&MutationDetails> = mutations
            .iter()
            .filter(|d| d.id.operator == "VOID_METHOD_CALLS")
            .collect();
        assert_eq!(void_calls.len(), 1);
        assert_eq!(void_calls[0].instruction_position, 1);
        assert!(void_calls.iter().all(|d| !d.inside_cleanup_region));

        // Operators without the sensitivity still see cleanup code, and the flag is recorded.
        let math: Vec<&MutationDetails> = mutations
            .iter()
            .filter(|d| d.id.operator == "MATH")
            .collect();
        assert_eq!(math.len(), 1);
        assert!(math[0].inside_cleanup_region);
    }

    #[test]
    fn test_multiple_mutations_in_one_method() {
        let registry = all_registry();
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = mixed_method();
        let mutations = mutator.discover(&method).unwrap();

        let first_math = mutations.iter().find(|d| d.id.operator == "MATH").unwrap();
        let increment = mutations
            .iter()
            .find(|d| d.id.operator == "INCREMENTS")
            .unwrap();

        let both = mutator
            .apply(&method, &[first_math.id.clone(), increment.id.clone()])
            .unwrap();
        assert_eq!(both.instructions[3], arith(ArithOp::Subtract));
        assert_eq!(
            both.instructions[9],
            Instruction::Inc { slot: 1, amount: -1 }
        );
        assert_eq!(both.instructions.len(), method.instructions.len());

        // Every untouched position is copied verbatim.
        for (position, instruction) in method.instructions.iter().enumerate() {
            if position != 3 && position != 9 {
                assert_eq!(&both.instructions[position], instruction);
            }
        }
    }

    #[test]
    fn test_two_selected_mutations_on_one_instruction_conflict() {
        let registry = registry(&[
            OperatorType::ConditionalsBoundary,
            OperatorType::NegateConditionals,
        ]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = mixed_method();

        let ids: Vec<MutationIdentifier> = mutator
            .discover(&method)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids.len(), 2);

        let result = mutator.apply(&method, &ids);
        assert!(matches!(
            result,
            Err(BytemutError::ConflictingMutations { position: 8, .. })
        ));
    }

    #[test]
    fn test_duplicate_selection_applies_once() {
        let registry = registry(&[OperatorType::Math]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = add_method();
        let id = MutationIdentifier::new(CLASS, &MethodSignature::new("add", "(II)I"), "MATH", 0);

        let mutated = mutator.apply(&method, &[id.clone(), id]).unwrap();
        assert_eq!(mutated.instructions[2], arith(ArithOp::Subtract));
    }

    #[test]
    fn test_wide_rewrites_keep_markers_in_place() {
        let registry = registry(&[OperatorType::TrueReturns]);
        let targets = TargetSet::new();
        let mutator = MethodMutator::new(CLASS, &registry, &targets);
        let method = CompiledMethod::new(
            "isPositive",
            "(I)Z",
            vec![
                load(1),
                Instruction::BlockStart,
                Instruction::LineNumber { line: 4 },
                return_int(),
            ],
        );

        let id = mutator.discover(&method).unwrap()[0].id.clone();
        let mutated = mutator.apply(&method, &[id]).unwrap();
        assert_eq!(
            mutated.instructions,
            vec![
                load(1),
                Instruction::BlockStart,
                Instruction::LineNumber { line: 4 },
                Instruction::Pop,
                Instruction::Const {
                    value: crate::instruction::Constant::Int(1)
                },
                return_int(),
            ]
        );
    }
}
