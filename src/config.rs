//! Construction options.

use crate::error::{Error, Result};

/// Configuration for a [`RadixTree`](crate::RadixTree) or [`RadixMap`](crate::RadixMap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Initial number of node slots reserved in the arena, root included.
    ///
    /// This bounds nodes, not keys: a key of length `n` may need up to `n` nodes.
    pub initial_capacity: usize,
    /// Hard ceiling on simultaneously live nodes, root included.
    ///
    /// `None` lets the arena grow until the allocator refuses.
    pub max_nodes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_nodes: None,
        }
    }
}

impl Config {
    /// Set the initial node capacity.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the node ceiling.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Check that the options describe an arena that can at least hold the root.
    pub fn validate(&self) -> Result<()> {
        let invalid = self.initial_capacity == 0
            || self
                .max_nodes
                .is_some_and(|max| max < self.initial_capacity);
        if invalid {
            return Err(Error::InvalidCapacity {
                initial: self.initial_capacity,
                max: self.max_nodes,
            });
        }
        Ok(())
    }
}
