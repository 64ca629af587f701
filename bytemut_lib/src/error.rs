//! The `error` module contains `BytemutError`, the error enumeration used to communicate
//! library errors.

use crate::id::MutationIdentifier;
use std::convert::From;
use thiserror::Error;

/// The list of errors that the library can generate.
#[derive(Error, Debug)]
pub enum BytemutError {
    #[error("IO error: {0}")]
    IO(std::io::Error),

    /// An error indicating that JSON parsing or writing failed.
    #[error("JSON error occurred: {0}")]
    JSON(serde_json::Error),

    /// An error indicating that the binary class encoding could not be read or written.
    #[error("Binary encoding error occurred: {0}")]
    Binary(bincode::Error),

    /// An error indicating that the class or method facts could not be extracted from the
    /// input bytes.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// An error indicating that two mutation operators share the same identifier.
    #[error("Mutation operator {0} is already registered")]
    OperatorConflict(String),

    /// An error indicating that an apply request named a mutation that a fresh discovery pass
    /// did not find.
    #[error("Mutation {0} not found")]
    MutationNotFound(MutationIdentifier),

    /// An error indicating that an operator produced a rewrite that would break the
    /// structure of the method.
    #[error("Operator {operator} produced an unsupported rewrite: {reason}")]
    UnsupportedRewrite { operator: String, reason: String },

    /// An error indicating that more than one selected mutation targets the same instruction.
    #[error("More than one selected mutation rewrites instruction {position} of {method}")]
    ConflictingMutations { method: String, position: usize },

    /// An error indicating that an operator name does not correspond to any known operator.
    #[error("Mutation operator not supported: {0}")]
    OperatorNotSupported(String),

    /// An error indicating that the tool received a configuration file that it cannot read.
    #[error("Configuration file {0} not supported")]
    ConfigFileNotSupported(String),

    /// An error indicating that the tool received a configuration file that does not have the
    /// correct file extension.
    #[error("Configuration file {0} does not have the correct extension")]
    ConfigFileBadExtension(String),
}

impl From<std::io::Error> for BytemutError {
    fn from(e: std::io::Error) -> Self {
        BytemutError::IO(e)
    }
}

impl From<serde_json::Error> for BytemutError {
    fn from(e: serde_json::Error) -> Self {
        BytemutError::JSON(e)
    }
}

impl From<bincode::Error> for BytemutError {
    fn from(e: bincode::Error) -> Self {
        BytemutError::Binary(e)
    }
}
