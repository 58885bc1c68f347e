//! # Creature Visibility
//!
//! Each pass clips a private copy of the creature index by the footprint
//! hull and compares the survivors with the previous pass:
//!
//! ```text
//!   ascending  = current - previous              -> show
//!   descending = previous - current - mortuary   -> hide
//! ```
//!
//! Creatures in the mortuary died since the last pass. The registry has
//! already dropped them, so they are never hidden.

use fxhash::FxHashSet;
use umbra_geometry::PointSet;
use umbra_spatial::{CreatureId, SpatialIndex};

use crate::collaborators::CreatureRegistry;

/// Visibility changes from one creature pass, each list sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreatureDiff {
    /// Creatures that entered the footprint.
    pub ascending: Vec<CreatureId>,
    /// Creatures that left the footprint and are still alive.
    pub descending: Vec<CreatureId>,
}

impl CreatureDiff {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ascending.is_empty() && self.descending.is_empty()
    }

    /// Issues the show and hide calls.
    pub fn apply<R: CreatureRegistry + ?Sized>(&self, registry: &mut R) {
        for &creature in &self.ascending {
            registry.show_creature(creature);
        }
        for &creature in &self.descending {
            registry.hide_creature(creature);
        }
    }
}

/// Remembers which creatures the last pass left visible.
#[derive(Clone, Debug, Default)]
pub struct CreatureCuller {
    visible: FxHashSet<CreatureId>,
}

impl CreatureCuller {
    /// Creates a culler that has seen nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creatures visible after the last pass.
    #[must_use]
    pub fn visible(&self) -> &FxHashSet<CreatureId> {
        &self.visible
    }

    /// Forgets the last pass, so the next one shows everything in view.
    pub fn reset(&mut self) {
        self.visible.clear();
    }

    /// Runs one pass against `hull` and records the survivors.
    ///
    /// The index lock is held only while the snapshot is taken.
    pub fn cull(&mut self, index: &SpatialIndex, hull: &PointSet) -> CreatureDiff {
        let snapshot = index.snapshot();
        let mut clipped = snapshot.index;
        for segment in hull.boundary_segments() {
            clipped.cut(&segment);
        }
        let current = clipped.creatures();

        let dead: FxHashSet<CreatureId> = snapshot.mortuary.into_iter().collect();
        let mut ascending: Vec<CreatureId> = current.difference(&self.visible).copied().collect();
        let mut descending: Vec<CreatureId> = self
            .visible
            .difference(&current)
            .filter(|creature| !dead.contains(creature))
            .copied()
            .collect();
        ascending.sort_unstable();
        descending.sort_unstable();

        self.visible = current;
        CreatureDiff {
            ascending,
            descending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_geometry::{Fixed, FixedVector2, FixedVector3};

    fn index() -> SpatialIndex {
        SpatialIndex::new(FixedVector2::from_ints(32, 32), Fixed::from_int(64))
    }

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> PointSet {
        let mut hull: PointSet = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
            .iter()
            .map(|&(x, y)| FixedVector3::from_ints(x, y))
            .collect();
        hull.convex_hull().unwrap();
        hull
    }

    #[test]
    fn test_first_pass_shows_creatures_in_view() {
        let index = index();
        index.insert(CreatureId(1), FixedVector2::from_ints(5, 5)).unwrap();
        index.insert(CreatureId(2), FixedVector2::from_ints(8, 3)).unwrap();
        index.insert(CreatureId(3), FixedVector2::from_ints(40, 40)).unwrap();

        let mut culler = CreatureCuller::new();
        let diff = culler.cull(&index, &square(0, 0, 10, 10));
        assert_eq!(diff.ascending, vec![CreatureId(1), CreatureId(2)]);
        assert!(diff.descending.is_empty());

        // Nothing moved, nothing changes.
        assert!(culler.cull(&index, &square(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn test_creature_walks_out_of_view() {
        let index = index();
        index.insert(CreatureId(1), FixedVector2::from_ints(5, 5)).unwrap();
        index.insert(CreatureId(2), FixedVector2::from_ints(6, 6)).unwrap();

        let mut culler = CreatureCuller::new();
        culler.cull(&index, &square(0, 0, 10, 10));

        index.move_creature(CreatureId(2), FixedVector2::from_ints(30, 6)).unwrap();
        let diff = culler.cull(&index, &square(0, 0, 10, 10));
        assert!(diff.ascending.is_empty());
        assert_eq!(diff.descending, vec![CreatureId(2)]);
        assert!(culler.visible().contains(&CreatureId(1)));
    }

    #[test]
    fn test_dead_creature_is_not_hidden() {
        let index = index();
        index.insert(CreatureId(1), FixedVector2::from_ints(5, 5)).unwrap();
        index.insert(CreatureId(2), FixedVector2::from_ints(6, 6)).unwrap();

        let mut culler = CreatureCuller::new();
        culler.cull(&index, &square(0, 0, 10, 10));

        index.remove_creature(CreatureId(2)).unwrap();
        let diff = culler.cull(&index, &square(0, 0, 10, 10));
        assert!(diff.is_empty());
        assert_eq!(culler.visible().len(), 1);

        // The mortuary is drained by the pass.
        assert!(index.lock().mortuary().is_empty());
    }

    #[test]
    fn test_reset_shows_again() {
        let index = index();
        index.insert(CreatureId(7), FixedVector2::from_ints(2, 2)).unwrap();

        let mut culler = CreatureCuller::new();
        culler.cull(&index, &square(0, 0, 10, 10));
        culler.reset();
        let diff = culler.cull(&index, &square(0, 0, 10, 10));
        assert_eq!(diff.ascending, vec![CreatureId(7)]);
    }
}
