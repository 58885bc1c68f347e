//! Directed lines used to clip the creature index.

use crate::fixed::FixedVector2;

/// Side of a [`Segment`] a point lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Strictly to the left of the direction of travel (clipped away).
    Outside,
    /// Exactly on the line.
    On,
    /// Strictly to the right of the direction of travel.
    Inside,
}

impl Side {
    /// Classifies the sign of a cross product.
    #[inline]
    #[must_use]
    pub fn from_cross(cross: i128) -> Self {
        match cross.signum() {
            1 => Self::Outside,
            0 => Self::On,
            _ => Self::Inside,
        }
    }
}

/// A directed line: `tail` plus `delta`.
///
/// A point `p` is outside when `delta × (p - tail) > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Start point.
    pub tail: FixedVector2,
    /// Direction vector (head - tail).
    pub delta: FixedVector2,
}

impl Segment {
    /// Segment from `tail` to `head`.
    #[inline]
    #[must_use]
    pub fn new(tail: FixedVector2, head: FixedVector2) -> Self {
        Self {
            tail,
            delta: head - tail,
        }
    }

    /// End point.
    #[inline]
    #[must_use]
    pub fn head(&self) -> FixedVector2 {
        self.tail + self.delta
    }

    /// Exact cross product `delta × (p - tail)`.
    #[inline]
    #[must_use]
    pub fn cross_to(&self, p: FixedVector2) -> i128 {
        self.delta.cross(p - self.tail)
    }

    /// Which side of the line `p` lies on.
    #[inline]
    #[must_use]
    pub fn side(&self, p: FixedVector2) -> Side {
        Side::from_cross(self.cross_to(p))
    }

    /// Same line, opposite direction.
    #[inline]
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.head(), self.tail)
    }
}
