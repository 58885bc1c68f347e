//! Culling statistics.

/// Counters from the last culling frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullingStats {
    /// Tiles switched on.
    pub tiles_shown: usize,
    /// Tiles switched off.
    pub tiles_hidden: usize,
    /// Scan-lines walked by the tile diff.
    pub rows_scanned: usize,
    /// Creatures that entered the footprint.
    pub creatures_shown: usize,
    /// Creatures that left the footprint.
    pub creatures_hidden: usize,
    /// Camera corners dropped for lack of a ground intersection.
    pub skipped_corners: usize,
}

impl CullingStats {
    /// Total show/hide calls issued.
    #[must_use]
    pub fn toggles(&self) -> usize {
        self.tiles_shown + self.tiles_hidden + self.creatures_shown + self.creatures_hidden
    }

    /// Returns true if the frame changed nothing.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.toggles() == 0
    }
}
