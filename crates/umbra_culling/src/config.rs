//! # Culling Configuration
//!
//! Loaded once at startup. Every field has a default, so a config file only
//! needs the values it overrides:
//!
//! ```toml
//! zoom_factor = 1.08
//! map_max = 200.0
//! index_center = [100.0, 100.0]
//! index_radius = 128.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use umbra_geometry::{Fixed, FixedVector2, Plane, Vec3};

use crate::error::{CullingError, CullingResult};

/// Tunables for the culling manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Scale applied to the footprint about its centroid before the hull.
    /// Slightly above 1 so border tiles are never culled too early.
    pub zoom_factor: f64,
    /// Center of the creature index root square, in tiles.
    pub index_center: [f64; 2],
    /// Half width of the creature index root square, in tiles.
    pub index_radius: f64,
    /// Lowest map coordinate on both axes.
    pub map_min: f32,
    /// Highest map coordinate on both axes.
    pub map_max: f32,
    /// Distance of the wall planes from the map edge.
    pub wall_inset: f32,
    /// Height of the ceiling plane.
    pub ceiling: f32,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl CullingConfig {
    /// Production config for a 396 x 396 tile map.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            zoom_factor: 1.0565,
            index_center: [200.0, 200.0],
            index_radius: 256.0,
            map_min: 0.0,
            map_max: 396.0,
            wall_inset: 1.0,
            ceiling: 20.0,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`CullingError::InvalidConfig`] on a parse error or a failed
    /// [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> CullingResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| CullingError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`CullingError::InvalidConfig`] if the file cannot be read or is
    /// invalid.
    pub fn from_file(path: impl AsRef<Path>) -> CullingResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CullingError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks that the values describe a usable map.
    ///
    /// # Errors
    ///
    /// [`CullingError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> CullingResult<()> {
        let invalid = |msg: &str| Err(CullingError::InvalidConfig(msg.to_string()));

        if !self.zoom_factor.is_finite() || self.zoom_factor <= 0.0 {
            return invalid("zoom_factor must be a positive number");
        }
        if self.map_min.is_nan() || self.map_max.is_nan() || self.map_max <= self.map_min {
            return invalid("map_max must be greater than map_min");
        }
        if self.wall_inset.is_nan()
            || self.wall_inset < 0.0
            || 2.0 * self.wall_inset >= self.map_max - self.map_min
        {
            return invalid("wall_inset must be non-negative and leave room inside the map");
        }
        if self.ceiling.is_nan() || self.ceiling <= 0.0 {
            return invalid("ceiling must be above the ground");
        }
        if !self.index_radius.is_finite() || self.index_radius <= 0.0 {
            return invalid("index_radius must be a positive number");
        }

        let [cx, cy] = self.index_center;
        let (lo, hi) = (f64::from(self.map_min), f64::from(self.map_max));
        let covers = |c: f64| c - self.index_radius < lo && c + self.index_radius > hi;
        if !covers(cx) || !covers(cy) {
            return invalid("creature index must strictly contain the whole map");
        }
        Ok(())
    }

    /// Planes tried after the ground, in order: ceiling, then the four walls.
    #[must_use]
    pub fn bounding_planes(&self) -> [Plane; 5] {
        let low = self.map_min + self.wall_inset;
        let high = self.map_max - self.wall_inset;
        [
            Plane::new(0.0, 0.0, -1.0, self.ceiling),
            Plane::new(0.0, 1.0, 0.0, -low),
            Plane::new(0.0, -1.0, 0.0, high),
            Plane::new(1.0, 0.0, 0.0, -low),
            Plane::new(-1.0, 0.0, 0.0, high),
        ]
    }

    /// Returns true if `p` lies over the map (closed bounds).
    #[must_use]
    pub fn in_bounds(&self, p: Vec3) -> bool {
        let range = self.map_min..=self.map_max;
        range.contains(&p.x) && range.contains(&p.y)
    }

    /// Clamps `p` onto the map rectangle.
    #[must_use]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.max(self.map_min).min(self.map_max),
            p.y.max(self.map_min).min(self.map_max),
            p.z,
        )
    }

    /// Root square center of the creature index.
    #[must_use]
    pub fn index_center(&self) -> FixedVector2 {
        FixedVector2::from_f64s(self.index_center[0], self.index_center[1])
    }

    /// Root square half width of the creature index.
    #[must_use]
    pub fn index_radius(&self) -> Fixed {
        Fixed::from_f64(self.index_radius)
    }
}
