//! # Spatial Index Handle
//!
//! The object the game holds on to. One `parking_lot::Mutex` guards the
//! whole [`MortuaryIndex`]; every public mutation takes it for its full
//! duration, and the culler holds it only long enough to clone the tree.
//!
//! ```rust
//! use std::sync::Arc;
//! use umbra_geometry::{Fixed, FixedVector2};
//! use umbra_spatial::{CreatureId, SpatialIndex};
//!
//! let index = Arc::new(SpatialIndex::new(FixedVector2::from_ints(0, 0), Fixed::from_int(64)));
//! index.insert(CreatureId(7), FixedVector2::from_ints(3, 4)).unwrap();
//! index.move_creature(CreatureId(7), FixedVector2::from_ints(-10, 2)).unwrap();
//!
//! let snapshot = index.snapshot();
//! assert!(snapshot.index.creatures().contains(&CreatureId(7)));
//! ```

use parking_lot::{Mutex, MutexGuard};
use umbra_geometry::{Fixed, FixedVector2};

use crate::entry::CreatureId;
use crate::error::SpatialResult;
use crate::mortuary::MortuaryIndex;
use crate::tree::NodeId;

/// Private copy of the index taken for one culling pass.
#[derive(Clone, Debug)]
pub struct IndexSnapshot {
    /// Deep copy of the tree. Its own mortuary is empty.
    pub index: MortuaryIndex,
    /// Creatures removed since the previous snapshot.
    pub mortuary: Vec<CreatureId>,
}

/// Thread-safe creature index.
#[derive(Debug)]
pub struct SpatialIndex {
    inner: Mutex<MortuaryIndex>,
}

impl SpatialIndex {
    /// Creates an empty index covering `center ± radius`.
    #[must_use]
    pub fn new(center: FixedVector2, radius: Fixed) -> Self {
        Self::from_index(MortuaryIndex::new(center, radius))
    }

    /// Wraps an existing index.
    #[must_use]
    pub fn from_index(index: MortuaryIndex) -> Self {
        Self {
            inner: Mutex::new(index),
        }
    }

    /// Indexes a new creature.
    ///
    /// # Errors
    ///
    /// See [`SpatialQuadTree::insert`](crate::SpatialQuadTree::insert).
    pub fn insert(&self, creature: CreatureId, position: FixedVector2) -> SpatialResult<NodeId> {
        self.inner.lock().insert(creature, position)
    }

    /// Moves an indexed creature.
    ///
    /// # Errors
    ///
    /// See [`SpatialQuadTree::move_entry_delta`](crate::SpatialQuadTree::move_entry_delta).
    pub fn move_creature(&self, creature: CreatureId, position: FixedVector2) -> SpatialResult<NodeId> {
        self.inner.lock().move_creature(creature, position)
    }

    /// Removes a creature and records it in the mortuary.
    ///
    /// # Errors
    ///
    /// [`SpatialError::UnknownCreature`](crate::SpatialError::UnknownCreature).
    pub fn remove_creature(&self, creature: CreatureId) -> SpatialResult<FixedVector2> {
        self.inner.lock().remove_creature(creature)
    }

    /// Inserts a batch of creatures under a single lock. Returns how many
    /// were inserted.
    ///
    /// # Errors
    ///
    /// Stops at the first failing insert; earlier ones stay indexed.
    pub fn populate<I>(&self, creatures: I) -> SpatialResult<usize>
    where
        I: IntoIterator<Item = (CreatureId, FixedVector2)>,
    {
        let mut index = self.inner.lock();
        let mut inserted = 0;
        for (creature, position) in creatures {
            index.insert(creature, position)?;
            inserted += 1;
        }
        tracing::debug!(inserted, "spatial index populated");
        Ok(inserted)
    }

    /// Scoped guard for batches of mutations.
    pub fn lock(&self) -> MutexGuard<'_, MortuaryIndex> {
        self.inner.lock()
    }

    /// Clones the tree and drains the mortuary under one lock acquisition.
    #[must_use]
    pub fn snapshot(&self) -> IndexSnapshot {
        let mut live = self.inner.lock();
        let mortuary = live.take_mortuary();
        IndexSnapshot {
            index: live.clone(),
            mortuary,
        }
    }

    /// Number of indexed creatures.
    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.inner.lock().tree().creature_count()
    }
}
