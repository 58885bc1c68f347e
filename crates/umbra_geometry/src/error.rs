//! # Geometry Error Types
//!
//! All errors that can occur while building polygons and rails.

use thiserror::Error;

/// Errors that can occur in the geometry layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Two consecutive rail vertices share the same `y`.
    #[error("division by zero: rail edge {from} -> {to} has no vertical span")]
    DivisionByZero {
        /// Ring index of the upper vertex.
        from: usize,
        /// Ring index of the lower vertex.
        to: usize,
    },

    /// The point set cannot form a polygon (too few points, or all collinear).
    #[error("degenerate polygon: {points} usable points")]
    DegeneratePolygon {
        /// Number of distinct points that were available.
        points: usize,
    },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
