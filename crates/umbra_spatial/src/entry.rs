//! Creatures and the entries that group them by exact position.

use std::fmt;

use umbra_geometry::FixedVector2;

/// Opaque creature handle issued by the game's creature registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CreatureId(pub u64);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All creatures standing on exactly one coordinate.
///
/// A leaf holds at most one entry; creatures that collide on a coordinate
/// share it instead of forcing a subdivision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Indexed position.
    pub position: FixedVector2,
    /// Creatures at `position`. Never empty while stored in a tree.
    pub creatures: Vec<CreatureId>,
}

impl Entry {
    /// Entry holding a single creature.
    #[must_use]
    pub fn new(creature: CreatureId, position: FixedVector2) -> Self {
        Self {
            position,
            creatures: vec![creature],
        }
    }

    /// Returns true if exactly one creature stands here.
    #[inline]
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.creatures.len() == 1
    }

    /// Removes `creature`, returning whether it was present.
    pub fn remove(&mut self, creature: CreatureId) -> bool {
        match self.creatures.iter().position(|&c| c == creature) {
            Some(i) => {
                self.creatures.swap_remove(i);
                true
            }
            None => false,
        }
    }
}
