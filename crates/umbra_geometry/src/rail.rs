//! # Polygon Rails
//!
//! A convex ring split into two monotone chains running from its top vertex
//! to its bottom vertex: the left rail and the right rail. Walking scan-lines
//! downward, each rail answers "what is my x on this row" in amortised O(1).
//!
//! ## Layout
//!
//! ```text
//!   path:    [top, v1, v2, ..., bottom]        ring indices
//!   slopes:  [0,   s01, s12, ..., s(n-1)n, 0]   dx/dy per edge, sentinels
//!   cursor:  number of path vertices strictly above the current row
//! ```
//!
//! With `cursor == 0` the row is at or above the top and the rail answers the
//! top vertex's `x`. Past the bottom the trailing zero slope pins `x` to the
//! bottom vertex.

use crate::error::{GeometryError, GeometryResult};
use crate::fixed::{Fixed, FixedVector3};
use crate::point_set::PointSet;

/// One monotone chain of a [`PolygonRail`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Rail {
    /// Ring indices from top to bottom.
    path: Vec<usize>,
    /// `path.len() + 1` slopes; the first and last are zero.
    slopes: Vec<Fixed>,
    cursor: usize,
}

impl Rail {
    fn build(
        vertices: &[FixedVector3],
        top: usize,
        bottom: usize,
        forward: bool,
    ) -> GeometryResult<Self> {
        let n = vertices.len();
        let mut path = vec![top];
        let mut i = top;
        while i != bottom {
            i = if forward { (i + 1) % n } else { (i + n - 1) % n };
            path.push(i);
        }

        let mut slopes = Vec::with_capacity(path.len() + 1);
        slopes.push(Fixed::ZERO);
        for pair in path.windows(2) {
            slopes.push(Fixed::ratio_between(
                (pair[0], vertices[pair[0]]),
                (pair[1], vertices[pair[1]]),
            )?);
        }
        slopes.push(Fixed::ZERO);

        Ok(Self {
            path,
            slopes,
            cursor: 0,
        })
    }

    fn notify(&mut self, vertices: &[FixedVector3], y: Fixed) -> bool {
        let start = self.cursor;
        while self.cursor < self.path.len() && y < vertices[self.path[self.cursor]].y {
            self.cursor += 1;
        }
        self.cursor != start
    }

    fn current_x(&self, vertices: &[FixedVector3], y: Fixed) -> Fixed {
        if self.cursor == 0 {
            return vertices[self.path[0]].x;
        }
        let prev = vertices[self.path[self.cursor - 1]];
        prev.x + Fixed::mul_slope(self.slopes[self.cursor], y - prev.y)
    }

    fn top(&self) -> usize {
        self.path[0]
    }

    fn bottom(&self) -> usize {
        self.path[self.path.len() - 1]
    }
}

/// Scan-line view of a convex polygon.
///
/// Build once per polygon with [`PolygonRail::new`], then walk rows from top
/// to bottom with [`notify_on_move_down`](Self::notify_on_move_down) and the
/// `current_x_*` queries, or simply [`span_at`](Self::span_at).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolygonRail {
    vertices: Vec<FixedVector3>,
    clockwise: bool,
    left: Rail,
    right: Rail,
}

impl PolygonRail {
    /// Sorts `points` into a ring and builds both rails.
    ///
    /// `points` should be convex (e.g. the output of
    /// [`PointSet::convex_hull`]).
    ///
    /// # Errors
    ///
    /// [`GeometryError::DegeneratePolygon`] for fewer than three points or a
    /// ring with zero area, [`GeometryError::DivisionByZero`] when a rail edge
    /// is horizontal.
    pub fn new(points: PointSet) -> GeometryResult<Self> {
        let mut rail = Self {
            vertices: Vec::new(),
            clockwise: false,
            left: Rail::default(),
            right: Rail::default(),
        };
        rail.build_slopes(points)?;
        Ok(rail)
    }

    /// Rebuilds the rails from a new ring. On error `self` is unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`PolygonRail::new`].
    pub fn build_slopes(&mut self, mut points: PointSet) -> GeometryResult<()> {
        points.sort();
        let area = points.signed_area2();
        if points.len() < 3 || area == 0 {
            return Err(GeometryError::DegeneratePolygon {
                points: points.len(),
            });
        }
        let vertices = points.as_slice().to_vec();

        // Left rail prefers the leftmost of equal-y extremes, right rail the
        // rightmost, so a flat top or bottom is split between them.
        let left_top = extreme(&vertices, |a, b| (a.y, -a.x) > (b.y, -b.x));
        let left_bottom = extreme(&vertices, |a, b| (a.y, a.x) < (b.y, b.x));
        let right_top = extreme(&vertices, |a, b| (a.y, a.x) > (b.y, b.x));
        let right_bottom = extreme(&vertices, |a, b| (a.y, -a.x) < (b.y, -b.x));

        // Counter-clockwise from the top runs down the left side.
        let clockwise = area < 0;
        let left = Rail::build(&vertices, left_top, left_bottom, !clockwise)?;
        let right = Rail::build(&vertices, right_top, right_bottom, clockwise)?;

        self.vertices = vertices;
        self.clockwise = clockwise;
        self.left = left;
        self.right = right;
        Ok(())
    }

    /// Resets both cursors to the top of their rails.
    pub fn prepare_walk(&mut self) {
        self.left.cursor = 0;
        self.right.cursor = 0;
    }

    /// Advances both cursors past every rail vertex strictly above `y`.
    ///
    /// Rows must be visited in non-increasing order between two calls to
    /// [`prepare_walk`](Self::prepare_walk). Returns true if any cursor moved.
    pub fn notify_on_move_down(&mut self, y: Fixed) -> bool {
        let left = self.left.notify(&self.vertices, y);
        let right = self.right.notify(&self.vertices, y);
        left || right
    }

    /// Left boundary at row `y` for the current cursor.
    #[must_use]
    pub fn current_x_left(&self, y: Fixed) -> Fixed {
        self.left.current_x(&self.vertices, y)
    }

    /// Right boundary at row `y` for the current cursor.
    #[must_use]
    pub fn current_x_right(&self, y: Fixed) -> Fixed {
        self.right.current_x(&self.vertices, y)
    }

    /// Moves down to `y` and returns the closed span `[left, right]` on that
    /// row, or `None` if the row misses the polygon vertically.
    pub fn span_at(&mut self, y: Fixed) -> Option<(Fixed, Fixed)> {
        if y > self.top() || y < self.bottom() {
            return None;
        }
        self.notify_on_move_down(y);
        Some((self.current_x_left(y), self.current_x_right(y)))
    }

    /// Highest `y` of the polygon.
    #[must_use]
    pub fn top(&self) -> Fixed {
        self.vertices[self.left.top()].y
    }

    /// Lowest `y` of the polygon.
    #[must_use]
    pub fn bottom(&self) -> Fixed {
        self.vertices[self.left.bottom()].y
    }

    /// Top vertex of the left rail.
    #[must_use]
    pub fn left_top(&self) -> FixedVector3 {
        self.vertices[self.left.top()]
    }

    /// Bottom vertex of the left rail.
    #[must_use]
    pub fn left_bottom(&self) -> FixedVector3 {
        self.vertices[self.left.bottom()]
    }

    /// Top vertex of the right rail.
    #[must_use]
    pub fn right_top(&self) -> FixedVector3 {
        self.vertices[self.right.top()]
    }

    /// Bottom vertex of the right rail.
    #[must_use]
    pub fn right_bottom(&self) -> FixedVector3 {
        self.vertices[self.right.bottom()]
    }

    /// Left rail as ring indices, top to bottom.
    #[must_use]
    pub fn left_path(&self) -> &[usize] {
        &self.left.path
    }

    /// Right rail as ring indices, top to bottom.
    #[must_use]
    pub fn right_path(&self) -> &[usize] {
        &self.right.path
    }

    /// The sorted vertex ring.
    #[must_use]
    pub fn vertices(&self) -> &[FixedVector3] {
        &self.vertices
    }

    /// Whether the sorted ring runs clockwise (y up).
    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }
}

/// Index of the vertex for which `better` holds against every other one.
fn extreme(vertices: &[FixedVector3], better: impl Fn(&FixedVector3, &FixedVector3) -> bool) -> usize {
    let mut best = 0;
    for (i, v) in vertices.iter().enumerate().skip(1) {
        if better(v, &vertices[best]) {
            best = i;
        }
    }
    best
}
