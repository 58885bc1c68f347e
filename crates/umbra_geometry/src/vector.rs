//! Engine-side float types.
//!
//! Camera corners arrive from the renderer as `f32` world-space vectors. They
//! are intersected with the map's bounding planes here, then converted once
//! into [`FixedVector3`](crate::FixedVector3) for the rest of the pipeline.

use std::ops::{Add, Mul, Sub};

use bytemuck::{Pod, Zeroable};

/// 3D engine vector.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A plane in 3D space (Ax + By + Cz + D = 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Plane {
    /// Normal X component.
    pub a: f32,
    /// Normal Y component.
    pub b: f32,
    /// Normal Z component.
    pub c: f32,
    /// Distance from origin.
    pub d: f32,
}

impl Plane {
    /// The ground plane `z = 0`, facing up.
    pub const GROUND: Self = Self::new(0.0, 0.0, 1.0, 0.0);

    /// Creates a new plane.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Plane normal.
    #[inline]
    #[must_use]
    pub const fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Returns the signed distance from a point to the plane.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.normal().dot(p) + self.d
    }
}

/// Half-line from `origin` along `direction`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Direction (not necessarily normalized).
    pub direction: Vec3,
}

impl Ray {
    /// Below this `|n·d|` the ray is treated as parallel to the plane.
    const PARALLEL_EPSILON: f32 = 1e-6;

    /// Creates a new ray.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray through two points, starting at `from`.
    #[must_use]
    pub fn through(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point at parameter `t`.
    #[inline]
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Parameter of the intersection with `plane`, if the ray hits it going forward.
    #[must_use]
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal().dot(self.direction);
        if denom.abs() < Self::PARALLEL_EPSILON {
            return None;
        }
        let t = -plane.distance_to_point(self.origin) / denom;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_ground() {
        let ray = Ray::through(Vec3::new(10.0, 10.0, 20.0), Vec3::new(12.0, 14.0, 10.0));
        let t = ray.intersect_plane(&Plane::GROUND).unwrap();
        let hit = ray.point_at(t);

        assert!((t - 2.0).abs() < 1e-5);
        assert!((hit.x - 14.0).abs() < 1e-4);
        assert!((hit.y - 18.0).abs() < 1e-4);
        assert!(hit.z.abs() < 1e-4);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_plane(&Plane::GROUND).is_none());
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(ray.intersect_plane(&Plane::GROUND).is_none());
    }

    #[test]
    fn test_plane_distance() {
        let wall = Plane::new(-1.0, 0.0, 0.0, 395.0);
        assert!((wall.distance_to_point(Vec3::new(395.0, 3.0, 1.0))).abs() < 1e-4);
    }
}
