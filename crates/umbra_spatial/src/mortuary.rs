//! # Mortuary Index
//!
//! The quadtree root plus the list of creatures removed from it since the
//! last creature culling pass.
//!
//! A creature that dies (or is otherwise taken out of the game) disappears
//! from the tree exactly like one that walked out of the camera footprint.
//! The culler reads the mortuary so that it does not fire a hide for a
//! creature whose mesh is already gone.

use fxhash::FxHashSet;
use umbra_geometry::{Fixed, FixedVector2, Segment};

use crate::entry::CreatureId;
use crate::error::SpatialResult;
use crate::tree::{NodeId, SpatialQuadTree};

/// Creature quadtree with a pending-removal list.
///
/// `Clone` copies the whole arena; the culler clips the copy, never the
/// live index.
#[derive(Clone, Debug)]
pub struct MortuaryIndex {
    tree: SpatialQuadTree,
    mortuary: Vec<CreatureId>,
}

impl MortuaryIndex {
    /// Creates an empty index covering `center ± radius`.
    #[must_use]
    pub fn new(center: FixedVector2, radius: Fixed) -> Self {
        Self {
            tree: SpatialQuadTree::new(center, radius),
            mortuary: Vec::new(),
        }
    }

    /// The underlying tree.
    #[must_use]
    pub fn tree(&self) -> &SpatialQuadTree {
        &self.tree
    }

    /// Mutable access to the underlying tree.
    pub fn tree_mut(&mut self) -> &mut SpatialQuadTree {
        &mut self.tree
    }

    /// Indexes a new creature.
    ///
    /// # Errors
    ///
    /// See [`SpatialQuadTree::insert`].
    pub fn insert(&mut self, creature: CreatureId, position: FixedVector2) -> SpatialResult<NodeId> {
        self.tree.insert(creature, position)
    }

    /// Moves an indexed creature.
    ///
    /// # Errors
    ///
    /// See [`SpatialQuadTree::move_entry_delta`].
    pub fn move_creature(
        &mut self,
        creature: CreatureId,
        position: FixedVector2,
    ) -> SpatialResult<NodeId> {
        self.tree.move_entry_delta(creature, position)
    }

    /// Takes a creature out of the tree and records it in the mortuary.
    ///
    /// # Errors
    ///
    /// [`SpatialError::UnknownCreature`](crate::SpatialError::UnknownCreature);
    /// the mortuary is left unchanged.
    pub fn remove_creature(&mut self, creature: CreatureId) -> SpatialResult<FixedVector2> {
        let position = self.tree.remove(creature)?;
        self.mortuary_insert(creature);
        Ok(position)
    }

    /// Records a removed creature.
    pub fn mortuary_insert(&mut self, creature: CreatureId) {
        self.mortuary.push(creature);
    }

    /// Creatures removed since the mortuary was last cleared.
    #[must_use]
    pub fn mortuary(&self) -> &[CreatureId] {
        &self.mortuary
    }

    /// Empties the mortuary.
    pub fn clear_mortuary(&mut self) {
        self.mortuary.clear();
    }

    /// Empties the mortuary, returning what it held.
    pub fn take_mortuary(&mut self) -> Vec<CreatureId> {
        std::mem::take(&mut self.mortuary)
    }

    /// Clips the tree by one half-plane (see [`SpatialQuadTree::cut`]).
    pub fn cut(&mut self, segment: &Segment) {
        self.tree.cut(segment);
    }

    /// Every creature currently in the tree.
    #[must_use]
    pub fn creatures(&self) -> FxHashSet<CreatureId> {
        self.tree.creatures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> FixedVector2 {
        FixedVector2::from_ints(x, y)
    }

    #[test]
    fn test_remove_goes_to_mortuary() {
        let mut index = MortuaryIndex::new(p(0, 0), Fixed::from_int(16));
        index.insert(CreatureId(1), p(2, 2)).unwrap();
        index.insert(CreatureId(2), p(-2, 2)).unwrap();

        assert_eq!(index.remove_creature(CreatureId(1)), Ok(p(2, 2)));
        assert_eq!(index.mortuary(), &[CreatureId(1)]);
        assert!(!index.creatures().contains(&CreatureId(1)));

        assert!(index.remove_creature(CreatureId(1)).is_err());
        assert_eq!(index.mortuary().len(), 1);

        assert_eq!(index.take_mortuary(), vec![CreatureId(1)]);
        assert!(index.mortuary().is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut index = MortuaryIndex::new(p(0, 0), Fixed::from_int(16));
        index.insert(CreatureId(1), p(5, 5)).unwrap();
        index.insert(CreatureId(2), p(-5, 5)).unwrap();

        let mut copy = index.clone();
        copy.cut(&Segment::new(p(0, 10), p(0, -10)));
        copy.clear_mortuary();

        assert_eq!(copy.creatures().len(), 1);
        assert_eq!(index.creatures().len(), 2);
        index.tree().check_invariants().unwrap();
    }
}
