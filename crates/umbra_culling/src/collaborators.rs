//! # Collaborator Traits
//!
//! The culling manager owns no renderer, tile grid, camera or creature list.
//! The client implements these traits and passes them into every call.
//!
//! ```text
//! client implements:          CullingManager calls:
//! ┌──────────────────┐        ┌──────────────────────────┐
//! │ impl TileGrid    │ ←───── │ show_tile / hide_tile    │
//! │ impl CameraRig   │ ←───── │ main / minimap frustum   │
//! │ impl Creatures   │ ←───── │ show / hide creature     │
//! └──────────────────┘        └──────────────────────────┘
//! ```

use umbra_geometry::{FixedVector2, Vec3};
use umbra_spatial::CreatureId;

// ============================================================================
// TILES
// ============================================================================

/// The dungeon floor as a grid of toggleable tiles.
pub trait TileGrid {
    /// Opaque per-tile handle handed back to `show_tile` / `hide_tile`.
    type Handle: Copy;

    /// Grid size in tiles as `(columns, rows)`.
    fn map_size(&self) -> (u32, u32);

    /// Tile at column `x`, row `y`, or `None` if the grid has no tile there.
    fn tile(&self, x: i64, y: i64) -> Option<Self::Handle>;

    /// Makes a tile visible.
    fn show_tile(&mut self, tile: Self::Handle);

    /// Makes a tile invisible.
    fn hide_tile(&mut self, tile: Self::Handle);
}

// ============================================================================
// CAMERAS
// ============================================================================

/// World-space camera frusta, refreshed by the client before each frame.
///
/// Corners 0-3 lie on the near plane and 4-7 on the far plane, with corner
/// `i + 4` behind corner `i`.
pub trait CameraRig {
    /// Frustum of the main camera.
    fn main_frustum(&self) -> [Vec3; 8];

    /// Frustum of the minimap camera, if one is active.
    fn minimap_frustum(&self) -> Option<[Vec3; 8]> {
        None
    }
}

// ============================================================================
// CREATURES
// ============================================================================

/// Live creatures and their renderer visibility.
pub trait CreatureRegistry {
    /// Every creature with its ground position, used to seed the index.
    fn creature_positions(&self) -> Vec<(CreatureId, FixedVector2)>;

    /// Makes a creature visible.
    fn show_creature(&mut self, creature: CreatureId);

    /// Makes a creature invisible.
    fn hide_creature(&mut self, creature: CreatureId);
}
