//! The `target` module provides [`MutationTarget`] and [`TargetSet`], the caller supplied
//! restriction on which discovered mutations the engine materializes.
//!
//! A target is an identifier whose fields are optional.  A missing field acts as a wildcard, so
//! a target naming only a method and an operator selects every candidate that operator finds in
//! that method:
//! ```rust.ignore
//! let mut targets = TargetSet::new();
//! targets.add_target(MutationTarget::any().with_operator("MATH"));
//! if targets.accepts(&id) {
//!     ...
//! }
//! ```

use crate::class::MethodSignature;
use crate::id::MutationIdentifier;
use serde::{Deserialize, Serialize};

/// An identifier pattern.  Fields set to `None` match any value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationTarget {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub method: Option<MethodSignature>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
}

impl MutationTarget {
    /// Create a target that matches every identifier.
    pub fn any() -> MutationTarget {
        MutationTarget::default()
    }

    pub fn with_class(mut self, class_name: &str) -> MutationTarget {
        self.class_name = Some(String::from(class_name));
        self
    }

    pub fn with_method(mut self, method: &MethodSignature) -> MutationTarget {
        self.method = Some(method.clone());
        self
    }

    pub fn with_operator(mut self, operator: &str) -> MutationTarget {
        self.operator = Some(String::from(operator));
        self
    }

    pub fn with_index(mut self, index: usize) -> MutationTarget {
        self.index = Some(index);
        self
    }

    /// Return true if every field present in the target equals the corresponding field of `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier of a mutation candidate.
    pub fn matches(&self, id: &MutationIdentifier) -> bool {
        self.class_name
            .as_ref()
            .map_or(true, |class_name| *class_name == id.class_name)
            && self.method.as_ref().map_or(true, |method| *method == id.method)
            && self
                .operator
                .as_ref()
                .map_or(true, |operator| *operator == id.operator)
            && self.index.map_or(true, |index| index == id.index)
    }
}

impl From<MutationIdentifier> for MutationTarget {
    fn from(id: MutationIdentifier) -> Self {
        MutationTarget {
            class_name: Some(id.class_name),
            method: Some(id.method),
            operator: Some(id.operator),
            index: Some(id.index),
        }
    }
}

/// The collection of targets supplied before a mutation run.  An empty set accepts every
/// candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet {
    targets: Vec<MutationTarget>,
}

impl TargetSet {
    /// Create a new, unrestricted target set.
    pub fn new() -> TargetSet {
        TargetSet {
            targets: Vec::new(),
        }
    }

    /// Add `target` to the set.
    pub fn add_target(&mut self, target: MutationTarget) {
        self.targets.push(target)
    }

    /// Remove the first target equal to `target`, if present.
    pub fn remove_target(&mut self, target: &MutationTarget) {
        if let Some(position) = self.targets.iter().position(|t| t == target) {
            self.targets.remove(position);
        }
    }

    /// Return true if the set is empty or some target matches `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier of a mutation candidate.
    pub fn accepts(&self, id: &MutationIdentifier) -> bool {
        self.is_empty() || self.iter().any(|target| target.matches(id))
    }

    /// Return the number of targets in the set.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Return true if the set holds no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Remove every target from the set.
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Return an iterator over the targets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MutationTarget> {
        self.targets.iter()
    }
}

impl From<Vec<MutationTarget>> for TargetSet {
    fn from(targets: Vec<MutationTarget>) -> Self {
        TargetSet { targets }
    }
}

impl FromIterator<MutationTarget> for TargetSet {
    fn from_iter<I: IntoIterator<Item = MutationTarget>>(iter: I) -> Self {
        TargetSet {
            targets: iter.into_iter().collect(),
        }
    }
}
