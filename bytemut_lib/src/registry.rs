//! The `registry` module provides [`OperatorRegistry`], the ordered collection of mutators the
//! method mutator queries for every instruction.

use crate::error::BytemutError;
use crate::instruction::Instruction;
use crate::mutation::OperatorType;
use crate::mutator::{InstructionContext, Mutator, MutatorFactory, Rewrite};
use crate::mutators::BuiltinMutatorFactory;
use std::str::FromStr;

/// The ordered collection of registered mutators.
///
/// A registry is filled once at startup and then only read, so it can be shared between threads
/// discovering or applying mutations in different classes.
#[derive(Default)]
pub struct OperatorRegistry {
    mutators: Vec<Box<dyn Mutator>>,
}

impl OperatorRegistry {
    /// Create an empty registry.
    pub fn new() -> OperatorRegistry {
        OperatorRegistry {
            mutators: Vec::new(),
        }
    }

    /// Create a registry holding the built-in mutators for `operator_types`, in order.
    ///
    /// # Arguments
    ///
    /// * `operator_types` - The operators to register.
    pub fn from_operator_types(
        operator_types: &[OperatorType],
    ) -> Result<OperatorRegistry, BytemutError> {
        let factory = BuiltinMutatorFactory::default();
        let mut registry = OperatorRegistry::new();

        for operator_type in operator_types {
            match factory.mutator_for(operator_type) {
                Some(mutator) => registry.register(mutator)?,
                None => {
                    return Err(BytemutError::OperatorNotSupported(
                        operator_type.to_string(),
                    ))
                }
            }
        }

        Ok(registry)
    }

    /// Create a registry from operator names such as `MATH`.
    ///
    /// # Arguments
    ///
    /// * `names` - The names of the operators to register.
    pub fn from_operator_names(names: &[String]) -> Result<OperatorRegistry, BytemutError> {
        let operator_types = names
            .iter()
            .map(|name| OperatorType::from_str(name))
            .collect::<Result<Vec<OperatorType>, BytemutError>>()?;
        OperatorRegistry::from_operator_types(&operator_types)
    }

    /// Add `mutator` after the mutators already registered.
    ///
    /// # Arguments
    ///
    /// * `mutator` - The mutator to register.  Its id must not already be registered.
    pub fn register(&mut self, mutator: Box<dyn Mutator>) -> Result<(), BytemutError> {
        if self.mutators.iter().any(|m| m.id() == mutator.id()) {
            return Err(BytemutError::OperatorConflict(String::from(mutator.id())));
        }

        log::debug!("Registered mutation operator {}", mutator.id());
        self.mutators.push(mutator);
        Ok(())
    }

    /// Return the number of registered mutators.
    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    /// Return true if no mutator is registered.
    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }

    /// Return the ids of the registered mutators in registration order.
    pub fn operator_ids(&self) -> Vec<&str> {
        self.mutators.iter().map(|m| m.id()).collect()
    }

    /// Query every registered mutator, in registration order, about `instruction` and return
    /// the mutators that accept it together with their rewrites.
    ///
    /// Mutators that avoid cleanup regions are not queried when the context lies inside one.
    ///
    /// # Arguments
    ///
    /// * `instruction` - The executable instruction to inspect.
    /// * `context` - The structural context of the instruction.
    pub fn for_each_applicable<'a>(
        &'a self,
        instruction: &Instruction,
        context: &InstructionContext,
    ) -> Result<Vec<(&'a dyn Mutator, Rewrite)>, BytemutError> {
        let mut applicable = Vec::new();

        for mutator in &self.mutators {
            if context.inside_cleanup_region() && mutator.avoids_cleanup_regions() {
                continue;
            }

            if let Some(rewrite) = mutator.inspect(instruction, context) {
                check_rewrite(mutator.id(), instruction, &rewrite)?;
                applicable.push((mutator.as_ref(), rewrite));
            }
        }

        Ok(applicable)
    }
}

/// Check that a rewrite keeps the structure of the method intact: it replaces the instruction
/// with at least one executable instruction, introduces no markers and only jumps where the
/// original instruction jumped.
fn check_rewrite(
    operator: &str,
    original: &Instruction,
    rewrite: &Rewrite,
) -> Result<(), BytemutError> {
    let unsupported = |reason: String| BytemutError::UnsupportedRewrite {
        operator: String::from(operator),
        reason,
    };

    if rewrite.replacement.is_empty() {
        return Err(unsupported(format!("empty replacement for {}", original)));
    }

    for instruction in &rewrite.replacement {
        if instruction.is_marker() {
            return Err(unsupported(format!(
                "replacement for {} contains marker {}",
                original, instruction
            )));
        }

        if let Some(target) = instruction.jump_target() {
            if original.jump_target() != Some(target) {
                return Err(unsupported(format!(
                    "replacement for {} jumps to L{}",
                    original, target
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::MethodSignature;
    use crate::descriptor::MethodDescriptor;
    use crate::instruction::{ArithOp, ValueKind};

    /// A mutator with a configurable id and rewrite, used to exercise the registry.
    struct FixedMutator {
        name: &'static str,
        avoids_cleanup: bool,
        replacement: Vec<Instruction>,
    }

    impl Mutator for FixedMutator {
        fn id(&self) -> &str {
            self.name
        }

        fn avoids_cleanup_regions(&self) -> bool {
            self.avoids_cleanup
        }

        fn inspect(&self, _instruction: &Instruction, _context: &InstructionContext) -> Option<Rewrite> {
            Some(Rewrite::new(
                String::from(self.name),
                self.replacement.clone(),
            ))
        }
    }

    fn fixed(name: &'static str, avoids_cleanup: bool) -> Box<dyn Mutator> {
        Box::new(FixedMutator {
            name,
            avoids_cleanup,
            replacement: vec![Instruction::Nop],
        })
    }

    fn query(
        registry: &OperatorRegistry,
        instruction: &Instruction,
        inside_cleanup_region: bool,
    ) -> Result<Vec<String>, BytemutError> {
        let signature = MethodSignature::new("run", "()V");
        let descriptor = MethodDescriptor::from_str("()V").unwrap();
        let context = InstructionContext::new(
            "com/example/Runner",
            &signature,
            &descriptor,
            0,
            inside_cleanup_region,
            None,
        );
        Ok(registry
            .for_each_applicable(instruction, &context)?
            .into_iter()
            .map(|(m, _)| String::from(m.id()))
            .collect())
    }

    #[test]
    fn test_duplicate_registration_conflicts() {
        let mut registry = OperatorRegistry::new();
        registry.register(fixed("FIRST", false)).unwrap();
        let result = registry.register(fixed("FIRST", true));
        assert!(matches!(result, Err(BytemutError::OperatorConflict(id)) if id == "FIRST"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_operator_names_conflict() {
        let names = vec![String::from("MATH"), String::from("MATH")];
        assert!(matches!(
            OperatorRegistry::from_operator_names(&names),
            Err(BytemutError::OperatorConflict(_))
        ));
    }

    #[test]
    fn test_unknown_operator_name() {
        let names = vec![String::from("MATH"), String::from("NOPE")];
        assert!(matches!(
            OperatorRegistry::from_operator_names(&names),
            Err(BytemutError::OperatorNotSupported(_))
        ));
    }

    #[test]
    fn test_operators_queried_in_registration_order() {
        let mut registry = OperatorRegistry::new();
        registry.register(fixed("SECOND", false)).unwrap();
        registry.register(fixed("FIRST", false)).unwrap();

        assert_eq!(registry.operator_ids(), vec!["SECOND", "FIRST"]);
        assert_eq!(
            query(&registry, &Instruction::Dup, false).unwrap(),
            vec!["SECOND", "FIRST"]
        );
    }

    #[test]
    fn test_cleanup_sensitive_operators_are_skipped_in_cleanup_regions() {
        let mut registry = OperatorRegistry::new();
        registry.register(fixed("CAREFUL", true)).unwrap();
        registry.register(fixed("CARELESS", false)).unwrap();

        assert_eq!(
            query(&registry, &Instruction::Dup, true).unwrap(),
            vec!["CARELESS"]
        );
        assert_eq!(
            query(&registry, &Instruction::Dup, false).unwrap(),
            vec!["CAREFUL", "CARELESS"]
        );
    }

    #[test]
    fn test_rewrites_breaking_structure_are_rejected() {
        for replacement in [
            vec![],
            vec![Instruction::BlockStart],
            vec![Instruction::Goto { target: 9 }],
        ] {
            let mut registry = OperatorRegistry::new();
            registry
                .register(Box::new(FixedMutator {
                    name: "BROKEN",
                    avoids_cleanup: false,
                    replacement,
                }))
                .unwrap();

            let result = query(&registry, &Instruction::Dup, false);
            assert!(matches!(
                result,
                Err(BytemutError::UnsupportedRewrite { operator, .. }) if operator == "BROKEN"
            ));
        }
    }

    #[test]
    fn test_builtin_registry_finds_math() {
        let registry =
            OperatorRegistry::from_operator_types(&[OperatorType::Math, OperatorType::InvertNegs])
                .unwrap();
        let add = Instruction::Arith {
            kind: ValueKind::Int,
            op: ArithOp::Add,
        };
        assert_eq!(query(&registry, &add, false).unwrap(), vec!["MATH"]);
        assert!(query(&registry, &Instruction::Pop, false)
            .unwrap()
            .is_empty());
    }
}
