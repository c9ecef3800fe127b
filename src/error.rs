//! Error types.

use thiserror::Error;

/// Errors raised by fallible [`RadixTree`](crate::RadixTree) and
/// [`RadixMap`](crate::RadixMap) operations.
///
/// Missing keys are never errors; lookups and removals report them as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The node arena cannot supply the nodes an insertion needs.
    ///
    /// The insertion that hit the limit changes nothing. Also returned when the
    /// allocator refuses the arena's initial reservation.
    #[error("node arena exhausted: {requested} live nodes requested, limit is {limit}")]
    CapacityExceeded {
        /// Live nodes the insertion would have required.
        requested: usize,
        /// Hard ceiling on live nodes.
        limit: usize,
    },

    /// Construction options cannot describe a usable arena.
    #[error("invalid arena capacity: initial {initial}, max {max:?}")]
    InvalidCapacity {
        /// Requested initial node capacity.
        initial: usize,
        /// Requested node ceiling, if any.
        max: Option<usize>,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
