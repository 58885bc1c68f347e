//! # Spatial Index Error Types
//!
//! All errors that can occur while mutating the creature quadtree.

use thiserror::Error;
use umbra_geometry::Fixed;

use crate::entry::CreatureId;

/// Errors that can occur in the spatial index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpatialError {
    /// The tree is corrupted (insert into an internal node, runaway descent,
    /// subdivision below fixed-point resolution, stale locator).
    #[error("structural invariant violated at node {node}: {reason}")]
    StructuralInvariantViolation {
        /// Arena index of the offending node.
        node: usize,
        /// What went wrong.
        reason: &'static str,
    },

    /// A move or reinsert would have to leave the root square.
    #[error("node {node} has no parent: position ({x}, {y}) escapes the root square")]
    NodeHasNoParent {
        /// Arena index of the node the walk started from.
        node: usize,
        /// Target x.
        x: Fixed,
        /// Target y.
        y: Fixed,
    },

    /// Insert position lies outside the root square.
    #[error("position ({x}, {y}) is outside the index bounds")]
    OutOfBounds {
        /// Rejected x.
        x: Fixed,
        /// Rejected y.
        y: Fixed,
    },

    /// The creature is not in the index.
    #[error("unknown creature: {0}")]
    UnknownCreature(CreatureId),

    /// The creature is already in the index.
    #[error("creature already indexed: {0}")]
    DuplicateCreature(CreatureId),
}

/// Result type for spatial index operations.
pub type SpatialResult<T> = Result<T, SpatialError>;
