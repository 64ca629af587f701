//! The `mutation` module contains the enumeration of the built-in mutation operators supported
//! by the library and their descriptions.

use crate::error::BytemutError;
use crate::operators::{arithmetic_operations, boundary_comparisons, comparisons};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

/// Each item in the enumeration represents one built-in mutation operator.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
pub enum OperatorType {
    /// Replace a binary arithmetic or bitwise operation with another.
    ///
    /// # Example
    ///
    /// `a + b` becomes `a - b`.
    ///
    /// `a & b` becomes `a | b`.
    Math,

    /// Move the boundary of an ordering comparison by one.
    ///
    /// # Example
    ///
    /// `a < b` becomes `a <= b`.
    ConditionalsBoundary,

    /// Negate the comparison of a conditional jump.
    ///
    /// # Example
    ///
    /// `a == b` becomes `a != b`.
    NegateConditionals,

    /// Negate the amount of a local variable increment.
    ///
    /// # Example
    ///
    /// `i++` becomes `i--`.
    Increments,

    /// Remove the negation of a numeric value.
    ///
    /// # Example
    ///
    /// `return -x;` becomes `return x;`.
    InvertNegs,

    /// Replace the result of a boolean method with `true`.
    TrueReturns,

    /// Replace the result of a boolean method with `false`.
    FalseReturns,

    /// Replace the result of a method returning an object with `null`.
    NullReturns,

    /// Remove calls to methods that do not return a value.
    ///
    /// The operator leaves exception-cleanup regions alone: removing resource release calls
    /// from cleanup code yields mutants whose failures tests cannot meaningfully observe.
    VoidMethodCalls,
}

/// Provide the ability to convert a string value into a [`OperatorType`] enum.
impl FromStr for OperatorType {
    type Err = BytemutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATH" => Ok(OperatorType::Math),
            "CONDITIONALS_BOUNDARY" => Ok(OperatorType::ConditionalsBoundary),
            "NEGATE_CONDITIONALS" => Ok(OperatorType::NegateConditionals),
            "INCREMENTS" => Ok(OperatorType::Increments),
            "INVERT_NEGS" => Ok(OperatorType::InvertNegs),
            "TRUE_RETURNS" => Ok(OperatorType::TrueReturns),
            "FALSE_RETURNS" => Ok(OperatorType::FalseReturns),
            "NULL_RETURNS" => Ok(OperatorType::NullReturns),
            "VOID_METHOD_CALLS" => Ok(OperatorType::VoidMethodCalls),
            _last => Err(BytemutError::OperatorNotSupported(String::from(_last))),
        }
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            OperatorType::Math => "MATH",
            OperatorType::ConditionalsBoundary => "CONDITIONALS_BOUNDARY",
            OperatorType::NegateConditionals => "NEGATE_CONDITIONALS",
            OperatorType::Increments => "INCREMENTS",
            OperatorType::InvertNegs => "INVERT_NEGS",
            OperatorType::TrueReturns => "TRUE_RETURNS",
            OperatorType::FalseReturns => "FALSE_RETURNS",
            OperatorType::NullReturns => "NULL_RETURNS",
            OperatorType::VoidMethodCalls => "VOID_METHOD_CALLS",
        };

        write!(f, "{}", text)
    }
}

/// Return a list of all the built-in operators sorted by name.
pub fn get_all_operator_types() -> Vec<OperatorType> {
    let mut operators: Vec<OperatorType> = all_operator_descriptions().into_keys().collect();

    operators.sort_unstable_by(|a, b| {
        let a_str = a.to_string();
        let b_str = b.to_string();
        a_str.cmp(&b_str)
    });

    operators
}

/// Return the operators enabled when the caller does not name any.
pub fn default_operator_types() -> Vec<OperatorType> {
    vec![
        OperatorType::ConditionalsBoundary,
        OperatorType::Increments,
        OperatorType::InvertNegs,
        OperatorType::Math,
        OperatorType::NegateConditionals,
        OperatorType::VoidMethodCalls,
    ]
}

/// Type that holds the description of a mutation operator.
pub struct OperatorDescription {
    /// The basic summary of the operator.
    pub summary: &'static str,
    /// Extra useful details about the operator.
    pub extra_details: &'static str,
    /// A list of operations the operator may affect.
    pub operations: Vec<&'static str>,
    /// Examples of operator behavior.
    pub examples: &'static str,
}

/// Return a map of operator types to the operator descriptions.
pub fn all_operator_descriptions() -> HashMap<OperatorType, OperatorDescription> {
    let mut operator_map: HashMap<OperatorType, OperatorDescription> = HashMap::new();

    operator_map.insert(
        OperatorType::Math,
        OperatorDescription {
            summary: "Replace binary arithmetic and bitwise operations with another operation.",
            extra_details: "Addition and subtraction swap, multiplication becomes division, \
            division and remainder become multiplication, the bitwise operations trade places \
            and shifts reverse direction. Floating-point values only receive the arithmetic \
            replacements.",
            operations: arithmetic_operations(),
            examples: "a + b becomes a - b, a % b becomes a * b, a << b becomes a >> b",
        },
    );

    operator_map.insert(
        OperatorType::ConditionalsBoundary,
        OperatorDescription {
            summary: "Move the boundary of ordering comparisons in conditional jumps.",
            extra_details: "Strict comparisons become inclusive and inclusive comparisons \
            become strict. Equality tests are left alone.",
            operations: boundary_comparisons(),
            examples: "a < b becomes a <= b, a >= 0 becomes a > 0",
        },
    );

    operator_map.insert(
        OperatorType::NegateConditionals,
        OperatorDescription {
            summary: "Negate the comparison of conditional jumps.",
            extra_details: "",
            operations: comparisons(),
            examples: "a == b becomes a != b, a < b becomes a >= b",
        },
    );

    operator_map.insert(
        OperatorType::Increments,
        OperatorDescription {
            summary: "Negate the amount added by local variable increments.",
            extra_details: "",
            operations: vec!["INC"],
            examples: "i++ becomes i--, i += 3 becomes i -= 3",
        },
    );

    operator_map.insert(
        OperatorType::InvertNegs,
        OperatorDescription {
            summary: "Remove the negation of numeric values.",
            extra_details: "",
            operations: vec!["NEG"],
            examples: "return -x; becomes return x;",
        },
    );

    operator_map.insert(
        OperatorType::TrueReturns,
        OperatorDescription {
            summary: "Replace the return value of boolean methods with true.",
            extra_details: "The computed value is discarded and the constant returned instead.",
            operations: vec!["RETURN int"],
            examples: "return a > b; becomes return true;",
        },
    );

    operator_map.insert(
        OperatorType::FalseReturns,
        OperatorDescription {
            summary: "Replace the return value of boolean methods with false.",
            extra_details: "The computed value is discarded and the constant returned instead.",
            operations: vec!["RETURN int"],
            examples: "return a > b; becomes return false;",
        },
    );

    operator_map.insert(
        OperatorType::NullReturns,
        OperatorDescription {
            summary: "Replace the return value of methods returning objects or arrays with \
            null.",
            extra_details: "",
            operations: vec!["RETURN reference"],
            examples: "return name; becomes return null;",
        },
    );

    operator_map.insert(
        OperatorType::VoidMethodCalls,
        OperatorDescription {
            summary: "Remove calls to methods that do not return a value.",
            extra_details: "The call is replaced by instructions that discard its arguments. \
            Constructors are never removed and calls inside exception-cleanup regions are \
            left alone.",
            operations: vec!["INVOKE"],
            examples: "list.clear(); is removed",
        },
    );

    operator_map
}
