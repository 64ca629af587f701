//! The `class` module contains [`CompiledClass`] and [`CompiledMethod`], the in-memory form of a
//! compiled class that the mutation engine reads and rewrites.

use crate::descriptor::MethodDescriptor;
use crate::error::BytemutError;
use crate::instruction::{Instruction, LabelId, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

/// The name and descriptor that identify a method within its class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub descriptor: String,
}

impl MethodSignature {
    pub fn new(name: &str, descriptor: &str) -> MethodSignature {
        MethodSignature {
            name: String::from(name),
            descriptor: String::from(descriptor),
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// A method body: its signature, frame sizes and instruction stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledMethod {
    pub signature: MethodSignature,
    pub max_stack: u16,
    pub max_locals: u16,
    pub instructions: Vec<Instruction>,
}

impl CompiledMethod {
    /// Create a new method.
    ///
    /// # Arguments
    ///
    /// * `name` - The method name.
    /// * `descriptor` - The method descriptor, for example `(II)Z`.
    /// * `instructions` - The method body.
    pub fn new(name: &str, descriptor: &str, instructions: Vec<Instruction>) -> CompiledMethod {
        CompiledMethod {
            signature: MethodSignature::new(name, descriptor),
            max_stack: 4,
            max_locals: 4,
            instructions,
        }
    }

    /// Return the parsed descriptor of the method.
    pub fn descriptor(&self) -> Result<MethodDescriptor, BytemutError> {
        MethodDescriptor::from_str(&self.signature.descriptor)
    }

    /// Check the structural facts the engine relies on: a parseable descriptor, unique labels,
    /// defined jump targets, balanced cleanup markers and arithmetic only on numeric values.
    pub fn validate(&self) -> Result<(), BytemutError> {
        self.descriptor()?;

        let mut labels: HashSet<LabelId> = HashSet::new();
        for instruction in &self.instructions {
            if let Instruction::Label { id } = instruction {
                if !labels.insert(*id) {
                    return Err(BytemutError::MalformedInput(format!(
                        "label L{} defined twice in {}",
                        id, self.signature
                    )));
                }
            }
        }

        let mut cleanup_depth: usize = 0;
        for instruction in &self.instructions {
            if let Some(target) = instruction.jump_target() {
                if !labels.contains(&target) {
                    return Err(BytemutError::MalformedInput(format!(
                        "jump to undefined label L{} in {}",
                        target, self.signature
                    )));
                }
            }

            match instruction {
                Instruction::CleanupStart => cleanup_depth += 1,
                Instruction::CleanupEnd => {
                    if cleanup_depth == 0 {
                        return Err(BytemutError::MalformedInput(format!(
                            "cleanup region closed without being opened in {}",
                            self.signature
                        )));
                    }
                    cleanup_depth -= 1;
                }
                Instruction::Arith {
                    kind: ValueKind::Reference,
                    ..
                }
                | Instruction::Neg {
                    kind: ValueKind::Reference,
                } => {
                    return Err(BytemutError::MalformedInput(format!(
                        "arithmetic on a reference value in {}",
                        self.signature
                    )));
                }
                _ => {}
            }
        }

        if cleanup_depth != 0 {
            return Err(BytemutError::MalformedInput(format!(
                "unterminated cleanup region in {}",
                self.signature
            )));
        }

        Ok(())
    }
}

/// A compiled class: its name, optional source file and methods in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledClass {
    pub name: String,
    pub source_file: Option<String>,
    pub methods: Vec<CompiledMethod>,
}

impl CompiledClass {
    pub fn new(name: &str, methods: Vec<CompiledMethod>) -> CompiledClass {
        CompiledClass {
            name: String::from(name),
            source_file: None,
            methods,
        }
    }

    /// Return the method with `signature`, if the class declares it.
    pub fn method(&self, signature: &MethodSignature) -> Option<&CompiledMethod> {
        self.methods.iter().find(|m| &m.signature == signature)
    }

    /// Validate the class and every method in it.
    pub fn validate(&self) -> Result<(), BytemutError> {
        if self.name.is_empty() {
            return Err(BytemutError::MalformedInput(String::from(
                "class has no name",
            )));
        }

        let mut signatures: HashSet<&MethodSignature> = HashSet::new();
        for method in &self.methods {
            if !signatures.insert(&method.signature) {
                return Err(BytemutError::MalformedInput(format!(
                    "method {} declared twice in {}",
                    method.signature, self.name
                )));
            }
            method.validate()?;
        }

        Ok(())
    }
}
