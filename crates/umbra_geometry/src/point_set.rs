//! # Point Sets
//!
//! An unordered bag of ground points that becomes a polygon ring once
//! [`PointSet::sort`] (or [`PointSet::convex_hull`]) has run.
//!
//! ## Ring order
//!
//! ```text
//!            UL  |  UR            buckets are relative to the centroid,
//!          ------c------          ties (x == cx or y == cy) go to the
//!            LL  |  LR            "<=" side, i.e. UL / LL / LR.
//! ```
//!
//! The ring is `UR, UL, LL, LR`, each bucket ordered by polar angle. On a
//! y-up ground plane that runs counter-clockwise; [`PolygonRail`] reads the
//! orientation from the signed area instead of assuming it.
//!
//! [`PolygonRail`]: crate::PolygonRail

use std::cmp::Ordering;
use std::ops::Index;

use crate::error::{GeometryError, GeometryResult};
use crate::fixed::{Fixed, FixedVector2, FixedVector3};
use crate::segment::Segment;

/// Quadrant buckets in ring order.
const UPPER_RIGHT: usize = 0;
const UPPER_LEFT: usize = 1;
const LOWER_LEFT: usize = 2;
const LOWER_RIGHT: usize = 3;

/// Ordered sequence of ground points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointSet {
    points: Vec<FixedVector3>,
}

impl PointSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Appends a point.
    #[inline]
    pub fn push(&mut self, point: FixedVector3) {
        self.points.push(point);
    }

    /// Removes every point.
    #[inline]
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in their current order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[FixedVector3] {
        &self.points
    }

    /// Iterates the points in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, FixedVector3> {
        self.points.iter()
    }

    /// Component-wise mean, or `None` for an empty set.
    #[must_use]
    pub fn centroid(&self) -> Option<FixedVector3> {
        if self.points.is_empty() {
            return None;
        }
        let n = i128::try_from(self.points.len()).ok()?;
        let (mut sx, mut sy, mut sz) = (0i128, 0i128, 0i128);
        for p in &self.points {
            sx += i128::from(p.x.raw());
            sy += i128::from(p.y.raw());
            sz += i128::from(p.z.raw());
        }
        Some(FixedVector3::new(
            Fixed::from_raw(i64::try_from(sx / n).ok()?),
            Fixed::from_raw(i64::try_from(sy / n).ok()?),
            Fixed::from_raw(i64::try_from(sz / n).ok()?),
        ))
    }

    /// Orders the points around the centroid (see the module docs).
    pub fn sort(&mut self) {
        let Some(center) = self.centroid() else {
            return;
        };
        let c = center.xy();

        let mut buckets: [Vec<FixedVector3>; 4] = Default::default();
        for p in self.points.drain(..) {
            let d = p.xy() - c;
            let bucket = match (d.x > Fixed::ZERO, d.y > Fixed::ZERO) {
                (true, true) => UPPER_RIGHT,
                (false, true) => UPPER_LEFT,
                (false, false) => LOWER_LEFT,
                (true, false) => LOWER_RIGHT,
            };
            buckets[bucket].push(p);
        }

        for bucket in &mut buckets {
            bucket.sort_by(|a, b| angular_cmp(a.xy() - c, b.xy() - c));
            self.points.append(bucket);
        }
    }

    /// Scales every point's offset from the centroid by `factor`.
    pub fn zoom(&mut self, factor: f64) {
        let Some(c) = self.centroid() else {
            return;
        };
        for p in &mut self.points {
            *p = FixedVector3::new(
                c.x + (p.x - c.x).scale(factor),
                c.y + (p.y - c.y).scale(factor),
                c.z + (p.z - c.z).scale(factor),
            );
        }
    }

    /// Replaces the set with its convex hull ring, in [`Self::sort`] order.
    ///
    /// Duplicate and collinear points are dropped, so the result never has
    /// more points than the input and never repeats the closing vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegeneratePolygon`] for fewer than three
    /// distinct points or a collinear set. The set is left untouched.
    pub fn convex_hull(&mut self) -> GeometryResult<()> {
        if self.points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon {
                points: self.points.len(),
            });
        }
        self.sort();

        let mut pts = self.points.clone();
        pts.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
        pts.dedup_by(|a, b| a.x == b.x && a.y == b.y);
        if pts.len() < 3 {
            return Err(GeometryError::DegeneratePolygon { points: pts.len() });
        }

        // Monotone chain: lower hull left to right, then upper hull back.
        let mut hull: Vec<FixedVector3> = Vec::with_capacity(pts.len() + 1);
        for &p in &pts {
            while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
                hull.pop();
            }
            hull.push(p);
        }
        let lower_len = hull.len() + 1;
        for &p in pts.iter().rev().skip(1) {
            while hull.len() >= lower_len
                && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();

        if hull.len() < 3 {
            return Err(GeometryError::DegeneratePolygon { points: pts.len() });
        }
        self.points = hull;
        self.sort();
        Ok(())
    }

    /// Twice the signed area of the ring (positive when counter-clockwise, y up).
    #[must_use]
    pub fn signed_area2(&self) -> i128 {
        let n = self.points.len();
        (0..n)
            .map(|i| self.points[i].xy().cross(self.points[(i + 1) % n].xy()))
            .sum()
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> Option<(FixedVector2, FixedVector2)> {
        let first = self.points.first()?.xy();
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                FixedVector2::new(lo.x.min(p.x), lo.y.min(p.y)),
                FixedVector2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// One clipping segment per ring edge, directed so that the polygon
    /// interior is never on the outside of any of them.
    ///
    /// Expects a convex ring (e.g. after [`Self::convex_hull`]); a ring with
    /// zero area yields no segments.
    #[must_use]
    pub fn boundary_segments(&self) -> Vec<Segment> {
        let area = self.signed_area2();
        if area == 0 {
            return Vec::new();
        }
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i].xy();
                let b = self.points[(i + 1) % n].xy();
                if area > 0 {
                    Segment::new(b, a)
                } else {
                    Segment::new(a, b)
                }
            })
            .collect()
    }
}

/// Orders offsets within one quadrant bucket by polar angle.
///
/// Uses the exact cross product, so vertical offsets (`dx == 0`) are fine.
/// A zero offset sorts first; equal angles fall back to distance.
fn angular_cmp(a: FixedVector2, b: FixedVector2) -> Ordering {
    match (a == FixedVector2::ZERO, b == FixedVector2::ZERO) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match a.cross(b).cmp(&0) {
            Ordering::Greater => Ordering::Less,
            Ordering::Less => Ordering::Greater,
            Ordering::Equal => a.length_squared().cmp(&b.length_squared()),
        },
    }
}

/// Cross product of `a - o` and `b - o`; positive for a left turn.
fn turn(o: FixedVector3, a: FixedVector3, b: FixedVector3) -> i128 {
    (a.xy() - o.xy()).cross(b.xy() - o.xy())
}

impl Index<usize> for PointSet {
    type Output = FixedVector3;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl From<Vec<FixedVector3>> for PointSet {
    fn from(points: Vec<FixedVector3>) -> Self {
        Self { points }
    }
}

impl FromIterator<FixedVector3> for PointSet {
    fn from_iter<I: IntoIterator<Item = FixedVector3>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a FixedVector3;
    type IntoIter = std::slice::Iter<'a, FixedVector3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
