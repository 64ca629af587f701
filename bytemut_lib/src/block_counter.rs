//! The `block_counter` module provides the [`BlockCounter`] trait and [`ConcreteBlockCounter`],
//! the structural context tracked while traversing one method.

/// Identifier of a lexical block within one method.
pub type BlockId = u32;

/// Trait for objects that follow block and cleanup-region boundaries during a single linear
/// traversal of a method.
pub trait BlockCounter {
    /// Reset the counter at the start of a method.  Must be called exactly once before the
    /// first instruction of each method.
    fn enter_method(&mut self);

    /// Record that the traversal crossed into a new lexical block and return its id.
    fn enter_block(&mut self) -> BlockId;

    /// Record that the traversal entered an exception-cleanup region.
    fn enter_cleanup_region(&mut self);

    /// Record that the traversal left the innermost exception-cleanup region.
    fn exit_cleanup_region(&mut self);

    /// Return the id of the block containing the current traversal point.
    fn current_block(&self) -> BlockId;

    /// Return true if the current traversal point lies inside at least one cleanup region.
    fn inside_cleanup_region(&self) -> bool;
}

/// The block counter used by the method mutator.
#[derive(Debug, Default, Clone)]
pub struct ConcreteBlockCounter {
    current_block: BlockId,

    // Cleanup regions nest, so this is a depth rather than a flag.
    cleanup_depth: usize,
}

impl ConcreteBlockCounter {
    pub fn new() -> ConcreteBlockCounter {
        ConcreteBlockCounter::default()
    }
}

impl BlockCounter for ConcreteBlockCounter {
    fn enter_method(&mut self) {
        self.current_block = 0;
        self.cleanup_depth = 0;
    }

    fn enter_block(&mut self) -> BlockId {
        self.current_block += 1;
        self.current_block
    }

    fn enter_cleanup_region(&mut self) {
        self.cleanup_depth += 1;
    }

    fn exit_cleanup_region(&mut self) {
        self.cleanup_depth = self.cleanup_depth.saturating_sub(1);
    }

    fn current_block(&self) -> BlockId {
        self.current_block
    }

    fn inside_cleanup_region(&self) -> bool {
        self.cleanup_depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_increase_and_reset_per_method() {
        let mut counter = ConcreteBlockCounter::new();
        counter.enter_method();
        assert_eq!(counter.current_block(), 0);
        assert_eq!(counter.enter_block(), 1);
        assert_eq!(counter.enter_block(), 2);
        assert_eq!(counter.current_block(), 2);

        counter.enter_method();
        assert_eq!(counter.current_block(), 0);
    }

    #[test]
    fn test_nested_cleanup_regions() {
        let mut counter = ConcreteBlockCounter::new();
        counter.enter_method();
        assert!(!counter.inside_cleanup_region());

        counter.enter_cleanup_region();
        counter.enter_cleanup_region();
        counter.exit_cleanup_region();
        assert!(counter.inside_cleanup_region());

        counter.exit_cleanup_region();
        assert!(!counter.inside_cleanup_region());

        // An extra exit does not underflow.
        counter.exit_cleanup_region();
        counter.enter_cleanup_region();
        assert!(counter.inside_cleanup_region());
    }

    #[test]
    fn test_enter_method_clears_cleanup_depth() {
        let mut counter = ConcreteBlockCounter::new();
        counter.enter_cleanup_region();
        counter.enter_method();
        assert!(!counter.inside_cleanup_region());
    }
}
