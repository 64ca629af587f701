//! # Bytemut Lib
//!
//! `bytemut_lib` provides an API to use for an application to generate and apply mutations to
//! the methods of compiled classes.  A mutation is a small semantic change to one instruction,
//! such as replacing an addition with a subtraction, that a test suite should detect.
//!
//! ## Bytemut Lib Design
//!
//! `bytemut_lib` provides interfaces that allow the library user to accomplish the following:
//! - Decode a compiled class from its JSON or binary encoding.
//! - Select the mutation operators to use.
//! - Discover every mutation the operators can make in a class, each with a stable identifier.
//! - Build a mutant class embodying one or several selected mutations.
//!
//! Discovery and application share one traversal of each method.  The traversal tracks the
//! lexical block and exception-cleanup region of every instruction and numbers the candidates
//! of each operator in order, so an identifier reported by discovery always names the same
//! instruction when the mutant is built later.

pub use self::class::{CompiledClass, CompiledMethod, MethodSignature};
pub use self::codec::{ClassCodec, ClassFormat};
pub use self::engine::{ClassMutationEngine, EngineConfiguration};
pub use self::error::BytemutError;
pub use self::id::{MutationDetails, MutationIdentifier};
pub use self::mutation::OperatorType;
pub use self::registry::OperatorRegistry;
pub use self::target::{MutationTarget, TargetSet};

pub mod block_counter;
pub mod class;
pub mod codec;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod id;
pub mod instruction;
pub mod method_mutator;
pub mod mutation;
pub mod mutator;
mod mutators;
mod operators;
pub mod registry;
pub mod target;
pub mod visitor;
