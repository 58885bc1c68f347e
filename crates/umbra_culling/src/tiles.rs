//! # Tile Diff
//!
//! Scan-line diff of two footprints. Tile `(i, j)` belongs to a footprint
//! iff the lattice point `(i, j)` lies in the closed span of its rail on
//! row `j`. Rows are walked from the higher top down to the lower bottom,
//! so each rail cursor only ever moves forward.
//!
//! ```text
//!   row j:   old  |----------|
//!            new        |-----------|
//!                 hide  | keep | show
//! ```

use std::ops::BitOr;

use umbra_geometry::{Fixed, PolygonRail};

use crate::collaborators::TileGrid;

/// Which toggles a diff pass may issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiffMode(u8);

impl DiffMode {
    /// Hide tiles of the old footprint.
    pub const HIDE: Self = Self(1);
    /// Show tiles of the new footprint.
    pub const SHOW: Self = Self(2);
    /// Hide what left, show what entered, leave the overlap alone.
    pub const BOTH: Self = Self(3);

    /// Returns true if every flag of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DiffMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Outcome of one diff pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileDiff {
    /// `show_tile` calls issued.
    pub shown: usize,
    /// `hide_tile` calls issued.
    pub hidden: usize,
    /// Rows walked.
    pub rows: usize,
}

#[derive(Clone, Copy)]
enum Toggle {
    Show,
    Hide,
}

fn toggle_for(in_old: bool, in_new: bool, mode: DiffMode) -> Option<Toggle> {
    match (in_old, in_new) {
        (true, true) if mode == DiffMode::BOTH => None,
        (true, _) if mode.contains(DiffMode::HIDE) => Some(Toggle::Hide),
        (_, true) if mode.contains(DiffMode::SHOW) => Some(Toggle::Show),
        _ => None,
    }
}

fn covers(span: Option<(Fixed, Fixed)>, x: Fixed) -> bool {
    span.is_some_and(|(left, right)| left <= x && x <= right)
}

/// Diffs `old` against `new` and toggles the tiles that changed.
///
/// Both rails are rewound first. Passing clones of the same rail with
/// [`DiffMode::SHOW`] shows its tiles; with [`DiffMode::HIDE`] it hides them.
/// Tiles outside the grid are skipped.
pub fn bash_and_splash<G: TileGrid + ?Sized>(
    old: &mut PolygonRail,
    new: &mut PolygonRail,
    mode: DiffMode,
    grid: &mut G,
) -> TileDiff {
    let mut diff = TileDiff::default();
    let (columns, rows) = grid.map_size();
    if columns == 0 || rows == 0 {
        return diff;
    }

    old.prepare_walk();
    new.prepare_walk();

    let top = old.top().max(new.top()).floor_int().min(i64::from(rows) - 1);
    let bottom = old.bottom().min(new.bottom()).ceil_int().max(0);

    for j in (bottom..=top).rev() {
        let row = Fixed::from_int(j);
        let a = old.span_at(row);
        let b = new.span_at(row);
        diff.rows += 1;

        let spans = [a, b];
        let Some(first) = spans
            .iter()
            .flatten()
            .map(|&(left, _)| left.ceil_int())
            .min()
        else {
            continue;
        };
        let last = spans
            .iter()
            .flatten()
            .map(|&(_, right)| right.floor_int())
            .max()
            .unwrap_or(first);

        for i in first.max(0)..=last.min(i64::from(columns) - 1) {
            let x = Fixed::from_int(i);
            let Some(toggle) = toggle_for(covers(a, x), covers(b, x), mode) else {
                continue;
            };
            let Some(tile) = grid.tile(i, j) else {
                continue;
            };
            match toggle {
                Toggle::Show => {
                    grid.show_tile(tile);
                    diff.shown += 1;
                }
                Toggle::Hide => {
                    grid.hide_tile(tile);
                    diff.hidden += 1;
                }
            }
        }
    }
    diff
}

/// Shows every tile of the grid. Returns the number of tiles touched.
pub fn show_all<G: TileGrid + ?Sized>(grid: &mut G) -> usize {
    for_each_tile(grid, G::show_tile)
}

/// Hides every tile of the grid. Returns the number of tiles touched.
pub fn hide_all<G: TileGrid + ?Sized>(grid: &mut G) -> usize {
    for_each_tile(grid, G::hide_tile)
}

fn for_each_tile<G: TileGrid + ?Sized>(grid: &mut G, mut apply: impl FnMut(&mut G, G::Handle)) -> usize {
    let (columns, rows) = grid.map_size();
    let mut touched = 0;
    for j in 0..i64::from(rows) {
        for i in 0..i64::from(columns) {
            if let Some(tile) = grid.tile(i, j) {
                apply(grid, tile);
                touched += 1;
            }
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxhash::FxHashSet;
    use umbra_geometry::{FixedVector3, PointSet};

    /// Grid that remembers which tiles are lit.
    struct Board {
        size: u32,
        lit: FxHashSet<(i64, i64)>,
    }

    impl TileGrid for Board {
        type Handle = (i64, i64);

        fn map_size(&self) -> (u32, u32) {
            (self.size, self.size)
        }

        fn tile(&self, x: i64, y: i64) -> Option<(i64, i64)> {
            let size = i64::from(self.size);
            ((0..size).contains(&x) && (0..size).contains(&y)).then_some((x, y))
        }

        fn show_tile(&mut self, tile: (i64, i64)) {
            self.lit.insert(tile);
        }

        fn hide_tile(&mut self, tile: (i64, i64)) {
            self.lit.remove(&tile);
        }
    }

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> PolygonRail {
        let points: PointSet = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
            .iter()
            .map(|&(x, y)| FixedVector3::from_ints(x, y))
            .collect();
        PolygonRail::new(points).unwrap()
    }

    fn tiles(x0: i64, y0: i64, x1: i64, y1: i64) -> FxHashSet<(i64, i64)> {
        (x0..=x1).flat_map(|x| (y0..=y1).map(move |y| (x, y))).collect()
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(DiffMode::HIDE | DiffMode::SHOW, DiffMode::BOTH);
        assert!(DiffMode::BOTH.contains(DiffMode::SHOW));
        assert!(!DiffMode::SHOW.contains(DiffMode::HIDE));
    }

    #[test]
    fn test_show_then_hide_same_rail() {
        let mut board = Board {
            size: 16,
            lit: FxHashSet::default(),
        };
        let mut rail = rect(2, 2, 6, 6);

        let shown = bash_and_splash(&mut rail.clone(), &mut rail, DiffMode::SHOW, &mut board);
        assert_eq!(shown.shown, 25);
        assert_eq!(shown.hidden, 0);
        assert_eq!(board.lit, tiles(2, 2, 6, 6));

        let hidden = bash_and_splash(&mut rail.clone(), &mut rail, DiffMode::HIDE, &mut board);
        assert_eq!(hidden.hidden, 25);
        assert!(board.lit.is_empty());
    }

    #[test]
    fn test_grow_one_column() {
        let mut board = Board {
            size: 16,
            lit: tiles(2, 2, 6, 6),
        };
        let mut old = rect(2, 2, 6, 6);
        let mut new = rect(2, 2, 7, 6);

        let diff = bash_and_splash(&mut old, &mut new, DiffMode::BOTH, &mut board);
        assert_eq!(diff.hidden, 0);
        assert_eq!(diff.shown, 5);
        assert_eq!(diff.rows, 5);
        assert_eq!(board.lit, tiles(2, 2, 7, 6));
    }

    #[test]
    fn test_disjoint_footprints_swap() {
        let mut board = Board {
            size: 32,
            lit: tiles(1, 1, 4, 4),
        };
        let mut old = rect(1, 1, 4, 4);
        let mut new = rect(20, 10, 25, 12);

        let diff = bash_and_splash(&mut old, &mut new, DiffMode::BOTH, &mut board);
        assert_eq!(diff.hidden, 16);
        assert_eq!(diff.shown, 18);
        assert_eq!(board.lit, tiles(20, 10, 25, 12));
    }

    #[test]
    fn test_clips_to_grid() {
        let mut board = Board {
            size: 4,
            lit: FxHashSet::default(),
        };
        let mut rail = rect(-3, -3, 2, 10);

        let diff = bash_and_splash(&mut rail.clone(), &mut rail, DiffMode::SHOW, &mut board);
        assert_eq!(diff.shown, 12);
        assert_eq!(board.lit, tiles(0, 0, 2, 3));
    }

    #[test]
    fn test_show_and_hide_all() {
        let mut board = Board {
            size: 5,
            lit: FxHashSet::default(),
        };
        assert_eq!(show_all(&mut board), 25);
        assert_eq!(board.lit.len(), 25);
        assert_eq!(hide_all(&mut board), 25);
        assert!(board.lit.is_empty());
    }
}
