//! The `engine` module provides [`ClassMutationEngine`], the entry point that discovers the
//! mutations of a whole class and synthesizes mutant classes from selected identifiers.

use crate::class::{CompiledClass, CompiledMethod};
use crate::codec::codec_for_bytes;
use crate::error::BytemutError;
use crate::id::{MutationDetails, MutationIdentifier};
use crate::method_mutator::MethodMutator;
use crate::mutation::default_operator_types;
use crate::registry::OperatorRegistry;
use crate::target::TargetSet;
use serde::{Deserialize, Serialize};

/// The settings an engine is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfiguration {
    /// The ids of the operators to register, in registration order.
    pub operators: Vec<String>,

    /// The candidates discovery reports.  Empty accepts every candidate.
    #[serde(default)]
    pub targets: TargetSet,
}

impl Default for EngineConfiguration {
    fn default() -> Self {
        EngineConfiguration {
            operators: default_operator_types()
                .iter()
                .map(|t| t.to_string())
                .collect(),
            targets: TargetSet::new(),
        }
    }
}

/// Discovers mutations in classes and builds mutant classes.
///
/// The engine only reads its registry and target set after construction, so one engine can
/// serve several threads working on different classes.
pub struct ClassMutationEngine {
    registry: OperatorRegistry,
    targets: TargetSet,
}

impl ClassMutationEngine {
    /// Create a new engine.
    ///
    /// # Arguments
    ///
    /// * `registry` - The registered operators.
    /// * `targets` - The candidates discovery reports.
    pub fn new(registry: OperatorRegistry, targets: TargetSet) -> ClassMutationEngine {
        ClassMutationEngine { registry, targets }
    }

    /// Create an engine with the built-in operators named in `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - The engine settings.
    pub fn from_configuration(
        config: &EngineConfiguration,
    ) -> Result<ClassMutationEngine, BytemutError> {
        let registry = OperatorRegistry::from_operator_names(&config.operators)?;
        Ok(ClassMutationEngine::new(registry, config.targets.clone()))
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Decode `class_bytes` and return the details of every accepted candidate, method by
    /// method in declaration order.
    ///
    /// # Arguments
    ///
    /// * `class_bytes` - The serialized class in any supported format.
    pub fn find_mutations(&self, class_bytes: &[u8]) -> Result<Vec<MutationDetails>, BytemutError> {
        let class = codec_for_bytes(class_bytes)?.decode(class_bytes)?;
        self.find_mutations_in_class(&class)
    }

    /// Return the details of every accepted candidate in `class`, method by method in
    /// declaration order.
    ///
    /// # Arguments
    ///
    /// * `class` - The decoded class.
    pub fn find_mutations_in_class(
        &self,
        class: &CompiledClass,
    ) -> Result<Vec<MutationDetails>, BytemutError> {
        let mutator = MethodMutator::new(&class.name, &self.registry, &self.targets)
            .with_source_file(class.source_file.as_deref());
        let mut mutations: Vec<MutationDetails> = Vec::new();

        for method in &class.methods {
            mutations.extend(mutator.discover(method)?);
        }

        log::debug!(
            "Found {} mutations in class {} with {} methods",
            mutations.len(),
            class.name,
            class.methods.len()
        );

        Ok(mutations)
    }

    /// Decode `class_bytes` and return the details of the discovered candidates matching `id`.
    ///
    /// The result is empty if discovery does not report the candidate, either because it does
    /// not exist or because the target set filters it out.
    ///
    /// # Arguments
    ///
    /// * `class_bytes` - The serialized class in any supported format.
    /// * `id` - The identifier of the mutation.
    pub fn get_mutation_details(
        &self,
        class_bytes: &[u8],
        id: &MutationIdentifier,
    ) -> Result<Vec<MutationDetails>, BytemutError> {
        let details = self
            .find_mutations(class_bytes)?
            .into_iter()
            .filter(|d| d.matches_id(id))
            .collect();
        Ok(details)
    }

    /// Return a copy of `class` with every mutation in `ids` applied.
    ///
    /// The ids are grouped by method and each affected method is rewritten once.  Methods
    /// without selected mutations are copied unchanged.
    ///
    /// # Arguments
    ///
    /// * `class` - The class to mutate.
    /// * `ids` - The identifiers of the mutations to apply.
    pub fn mutate_class(
        &self,
        class: &CompiledClass,
        ids: &[MutationIdentifier],
    ) -> Result<CompiledClass, BytemutError> {
        for id in ids {
            if id.class_name != class.name {
                log::warn!("Mutation {} does not belong to class {}", id, class.name);
                return Err(BytemutError::MutationNotFound(id.clone()));
            }

            if class.method(&id.method).is_none() {
                return Err(BytemutError::MutationNotFound(id.clone()));
            }
        }

        let mutator = MethodMutator::new(&class.name, &self.registry, &self.targets);
        let methods = class
            .methods
            .iter()
            .map(|method| {
                let selected: Vec<MutationIdentifier> = ids
                    .iter()
                    .filter(|id| id.method == method.signature)
                    .cloned()
                    .collect();

                if selected.is_empty() {
                    Ok(method.clone())
                } else {
                    mutator.apply(method, &selected)
                }
            })
            .collect::<Result<Vec<CompiledMethod>, BytemutError>>()?;

        Ok(CompiledClass {
            name: class.name.clone(),
            source_file: class.source_file.clone(),
            methods,
        })
    }

    /// Build the serialized mutant of `class_bytes` embodying every mutation in `ids`.
    ///
    /// The artifact uses the format of the input.  With no ids the input is validated and
    /// returned unchanged.
    ///
    /// # Arguments
    ///
    /// * `class_bytes` - The serialized class in any supported format.
    /// * `ids` - The identifiers of the mutations to apply.
    pub fn build_artifact(
        &self,
        class_bytes: &[u8],
        ids: &[MutationIdentifier],
    ) -> Result<Vec<u8>, BytemutError> {
        let codec = codec_for_bytes(class_bytes)?;
        let class = codec.decode(class_bytes)?;

        if ids.is_empty() {
            return Ok(class_bytes.to_vec());
        }

        let mutant = self.mutate_class(&class, ids)?;
        log::info!(
            "Built {} artifact for {} with {} mutations",
            codec.format(),
            class.name,
            ids.len()
        );

        codec.encode(&mutant)
    }

    /// Build the serialized mutant of `class_bytes` embodying the single mutation `id`.
    ///
    /// # Arguments
    ///
    /// * `class_bytes` - The serialized class in any supported format.
    /// * `id` - The identifier of the mutation.
    pub fn get_mutation(
        &self,
        class_bytes: &[u8],
        id: &MutationIdentifier,
    ) -> Result<Vec<u8>, BytemutError> {
        self.build_artifact(class_bytes, std::slice::from_ref(id))
    }
}
