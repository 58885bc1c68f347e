//! # Culling Error Types
//!
//! All errors that can occur while driving a culling frame.

use thiserror::Error;
use umbra_geometry::GeometryError;
use umbra_spatial::SpatialError;

/// Errors that can occur in the culling orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CullingError {
    /// Polygon or rail construction failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The creature index is corrupted or was misused.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// A camera corner ray hit neither the ground nor any map boundary.
    #[error("camera ray {corner} does not intersect the ground or the map bounds")]
    DegenerateRayPlaneIntersection {
        /// Corner index: 0-3 main camera, 4-7 minimap camera.
        corner: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CullingError {
    /// Returns true for errors that mean the index or a rail is corrupted.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Spatial(SpatialError::StructuralInvariantViolation { .. })
        )
    }
}

/// Result type for culling operations.
pub type CullingResult<T> = Result<T, CullingError>;
