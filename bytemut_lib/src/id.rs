//! The `id` module provides [`MutationIdentifier`], the durable handle of one mutation
//! candidate, and [`MutationDetails`], the record produced for each discovered candidate.

use crate::block_counter::BlockId;
use crate::class::MethodSignature;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;

/// Identifies exactly one mutation candidate within one class.
///
/// The `index` counts the candidates a single operator finds in the method, in traversal order,
/// so the same unchanged method always yields the same identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationIdentifier {
    pub class_name: String,
    pub method: MethodSignature,
    pub operator: String,
    pub index: usize,
}

impl MutationIdentifier {
    /// Create a new identifier.
    ///
    /// # Arguments
    ///
    /// * `class_name` - The name of the class containing the candidate.
    /// * `method` - The signature of the method containing the candidate.
    /// * `operator` - The id of the operator that produced the candidate.
    /// * `index` - The position of the candidate among the operator's candidates in the method.
    pub fn new(
        class_name: &str,
        method: &MethodSignature,
        operator: &str,
        index: usize,
    ) -> MutationIdentifier {
        MutationIdentifier {
            class_name: String::from(class_name),
            method: method.clone(),
            operator: String::from(operator),
            index,
        }
    }

    /// Return true if every field of `other` equals the corresponding field of this identifier.
    pub fn matches(&self, other: &MutationIdentifier) -> bool {
        self.class_name == other.class_name
            && self.method == other.method
            && self.operator == other.operator
            && self.index == other.index
    }
}

impl fmt::Display for MutationIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} [{} #{}]",
            self.class_name, self.method, self.operator, self.index
        )
    }
}

/// Details recorded for a discovered mutation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDetails {
    pub id: MutationIdentifier,

    /// The source file the class was compiled from, if the class records it.
    #[serde(default)]
    pub file: Option<String>,

    /// The source line of the mutated instruction, if the method carries line markers.
    pub line: Option<u32>,

    /// The block containing the mutated instruction.
    pub block: BlockId,

    /// Human-readable description of the rewrite.
    pub description: String,

    /// True if the mutated instruction lies inside an exception-cleanup region.
    pub inside_cleanup_region: bool,

    /// The position of the mutated instruction in the method's instruction stream.
    pub instruction_position: usize,
}

impl MutationDetails {
    /// Return true if the details describe the candidate identified by `id`.
    pub fn matches_id(&self, id: &MutationIdentifier) -> bool {
        self.id.matches(id)
    }
}

impl fmt::Display for MutationDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " {}:{}", file, line)?,
            (Some(file), None) => write!(f, " {}", file)?,
            (None, Some(line)) => write!(f, " line {}", line)?,
            (None, None) => {}
        }
        write!(f, ": {}", self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_match_on_all_fields() {
        let method = MethodSignature::new("sum", "(II)I");
        let id = MutationIdentifier::new("com/example/Calc", &method, "MATH", 0);

        assert!(id.matches(&MutationIdentifier::new(
            "com/example/Calc",
            &method,
            "MATH",
            0
        )));
        assert!(!id.matches(&MutationIdentifier::new(
            "com/example/Calc",
            &method,
            "MATH",
            1
        )));
        assert!(!id.matches(&MutationIdentifier::new(
            "com/example/Calc",
            &MethodSignature::new("sum", "(JJ)J"),
            "MATH",
            0
        )));
    }

    #[test]
    fn test_details_serialize_hand_off_fields() {
        let details = MutationDetails {
            id: MutationIdentifier::new(
                "com/example/Calc",
                &MethodSignature::new("sum", "(II)I"),
                "MATH",
                2,
            ),
            file: Some(String::from("Calc.java")),
            line: Some(12),
            block: 1,
            description: String::from("replaced int ADD → SUBTRACT"),
            inside_cleanup_region: false,
            instruction_position: 4,
        };

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["id"]["class_name"], "com/example/Calc");
        assert_eq!(value["id"]["method"]["name"], "sum");
        assert_eq!(value["id"]["operator"], "MATH");
        assert_eq!(value["id"]["index"], 2);
        assert_eq!(value["block"], 1);
        assert_eq!(value["inside_cleanup_region"], false);
        assert_eq!(value["file"], "Calc.java");

        let restored: MutationDetails = serde_json::from_value(value).unwrap();
        assert_eq!(restored, details);
    }

    #[test]
    fn test_details_display_and_lookup() {
        let method = MethodSignature::new("sum", "(II)I");
        let mut details = MutationDetails {
            id: MutationIdentifier::new("com/example/Calc", &method, "MATH", 0),
            file: Some(String::from("Calc.java")),
            line: Some(7),
            block: 0,
            description: String::from("replaced int ADD → SUBTRACT"),
            inside_cleanup_region: false,
            instruction_position: 2,
        };

        assert_eq!(
            details.to_string(),
            "com/example/Calc::sum(II)I [MATH #0] Calc.java:7: replaced int ADD → SUBTRACT"
        );
        let same = MutationIdentifier::new("com/example/Calc", &method, "MATH", 0);
        let next = MutationIdentifier::new("com/example/Calc", &method, "MATH", 1);
        assert!(details.matches_id(&same));
        assert!(!details.matches_id(&next));

        details.file = None;
        details.line = None;
        assert_eq!(
            details.to_string(),
            "com/example/Calc::sum(II)I [MATH #0]: replaced int ADD → SUBTRACT"
        );

        let mut value = serde_json::to_value(&details).unwrap();
        value.as_object_mut().unwrap().remove("file");
        let restored: MutationDetails = serde_json::from_value(value).unwrap();
        assert_eq!(restored.file, None);
    }
}
