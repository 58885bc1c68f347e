//! # Culling Manager
//!
//! Per-frame driver. Tile culling is a two-state machine; creature culling
//! is an independent flag.
//!
//! ```text
//!            start_tile_culling
//!   ┌──────┐ ─────────────────► ┌────────┐
//!   │ Idle │                    │ Active │ ◄─┐ on_frame_started:
//!   └──────┘ ◄───────────────── └────────┘ ──┘ diff old vs new rail
//!            stop_tile_culling
//! ```
//!
//! The renderer, tile grid, cameras and creature registry are passed into
//! every call; the manager keeps only the last footprint, its rail, the
//! visible creature set and the creature index.

use std::sync::Arc;

use tracing::{debug, error, trace, warn};
use umbra_geometry::{GeometryError, PointSet, PolygonRail};
use umbra_spatial::SpatialIndex;

use crate::collaborators::{CameraRig, CreatureRegistry, TileGrid};
use crate::config::CullingConfig;
use crate::creatures::CreatureCuller;
use crate::error::{CullingError, CullingResult};
use crate::projection::project_footprint;
use crate::stats::CullingStats;
use crate::tiles::{bash_and_splash, hide_all, show_all, DiffMode};

/// Tile culling state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CullingState {
    /// Every tile is shown; no diffing.
    #[default]
    Idle,
    /// Only tiles under the camera footprint are shown.
    Active,
}

/// Drives tile and creature visibility from the camera footprint.
#[derive(Debug)]
pub struct CullingManager {
    config: CullingConfig,
    index: Arc<SpatialIndex>,
    state: CullingState,
    cull_creatures: bool,
    /// Last non-degenerate footprint hull.
    hull: Option<PointSet>,
    /// Rail of the footprint whose tiles are shown. `Some` iff `Active`.
    rail: Option<PolygonRail>,
    creatures: CreatureCuller,
    stats: CullingStats,
}

impl CullingManager {
    /// Creates a manager with a fresh creature index sized by `config`.
    ///
    /// # Errors
    ///
    /// [`CullingError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: CullingConfig) -> CullingResult<Self> {
        let index = SpatialIndex::new(config.index_center(), config.index_radius());
        Self::with_index(config, Arc::new(index))
    }

    /// Creates a manager around an index shared with the simulation.
    ///
    /// # Errors
    ///
    /// [`CullingError::InvalidConfig`] if `config` does not validate.
    pub fn with_index(config: CullingConfig, index: Arc<SpatialIndex>) -> CullingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            index,
            state: CullingState::Idle,
            cull_creatures: false,
            hull: None,
            rail: None,
            creatures: CreatureCuller::new(),
            stats: CullingStats::default(),
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CullingConfig {
        &self.config
    }

    /// The creature index. Clone the `Arc` to move creatures from another
    /// thread.
    #[must_use]
    pub fn index(&self) -> &Arc<SpatialIndex> {
        &self.index
    }

    /// Current tile culling state.
    #[must_use]
    pub fn state(&self) -> CullingState {
        self.state
    }

    /// Whether creature culling runs each frame.
    #[must_use]
    pub fn is_culling_creatures(&self) -> bool {
        self.cull_creatures
    }

    /// Counters from the last call that did any culling work.
    #[must_use]
    pub fn stats(&self) -> CullingStats {
        self.stats
    }

    /// Last footprint hull, if one was ever computed.
    #[must_use]
    pub fn footprint(&self) -> Option<&PointSet> {
        self.hull.as_ref()
    }

    /// Creatures left visible by the last creature pass.
    #[must_use]
    pub fn creature_culler(&self) -> &CreatureCuller {
        &self.creatures
    }

    /// Seeds the creature index from the registry.
    ///
    /// # Errors
    ///
    /// [`CullingError::Spatial`] from the first failing insert.
    pub fn populate_index<R: CreatureRegistry + ?Sized>(&self, registry: &R) -> CullingResult<usize> {
        self.index
            .populate(registry.creature_positions())
            .map_err(|e| report(e.into()))
    }

    /// Hides every tile, then shows the ones under the current footprint.
    ///
    /// Does nothing if tile culling is already active.
    ///
    /// # Errors
    ///
    /// [`CullingError::Geometry`] if no usable footprint exists yet; the
    /// state stays `Idle` and no tile is touched.
    pub fn start_tile_culling<C, G>(&mut self, cameras: &C, grid: &mut G) -> CullingResult<()>
    where
        C: CameraRig + ?Sized,
        G: TileGrid + ?Sized,
    {
        if self.state == CullingState::Active {
            debug!("tile culling already active");
            return Ok(());
        }
        self.stats = CullingStats::default();
        self.refresh_footprint(cameras).map_err(report)?;
        let mut rail = PolygonRail::new(self.current_hull()?).map_err(|e| report(e.into()))?;

        self.stats.tiles_hidden = hide_all(grid);
        let diff = bash_and_splash(&mut rail.clone(), &mut rail, DiffMode::SHOW, grid);
        self.stats.tiles_shown = diff.shown;
        self.stats.rows_scanned = diff.rows;

        self.rail = Some(rail);
        self.state = CullingState::Active;
        debug!("tile culling started: {} tiles in view", diff.shown);
        Ok(())
    }

    /// Hides the footprint tiles, then shows every tile.
    ///
    /// Does nothing if tile culling is not active.
    pub fn stop_tile_culling<G: TileGrid + ?Sized>(&mut self, grid: &mut G) {
        let Some(mut rail) = self.rail.take() else {
            debug!("tile culling already stopped");
            return;
        };
        self.stats = CullingStats::default();
        let diff = bash_and_splash(&mut rail.clone(), &mut rail, DiffMode::HIDE, grid);
        self.stats.tiles_hidden = diff.hidden;
        self.stats.rows_scanned = diff.rows;
        self.stats.tiles_shown = show_all(grid);

        self.state = CullingState::Idle;
        debug!("tile culling stopped");
    }

    /// Turns creature culling on. The next pass shows every creature in view.
    ///
    /// Removals recorded while creature culling was off are discarded.
    pub fn start_creature_culling(&mut self) {
        self.cull_creatures = true;
        self.creatures.reset();
        self.index.lock().clear_mortuary();
        debug!("creature culling started");
    }

    /// Turns creature culling off. Creature visibility is left as is.
    pub fn stop_creature_culling(&mut self) {
        self.cull_creatures = false;
        debug!("creature culling stopped");
    }

    /// Recomputes the footprint and applies the tile and creature diffs.
    ///
    /// A degenerate footprint keeps the previous one for this frame. While
    /// creature culling is off the mortuary is emptied every frame.
    ///
    /// # Errors
    ///
    /// [`CullingError::Geometry`] if no usable footprint was ever computed.
    pub fn on_frame_started<C, G, R>(
        &mut self,
        cameras: &C,
        grid: &mut G,
        registry: &mut R,
    ) -> CullingResult<CullingStats>
    where
        C: CameraRig + ?Sized,
        G: TileGrid + ?Sized,
        R: CreatureRegistry + ?Sized,
    {
        if !self.cull_creatures {
            self.index.lock().clear_mortuary();
            if self.state == CullingState::Idle {
                return Ok(CullingStats::default());
            }
        }
        self.stats = CullingStats::default();
        self.refresh_footprint(cameras).map_err(report)?;

        if let Some(old) = self.rail.as_mut() {
            let hull = self.hull.clone().ok_or(GeometryError::DegeneratePolygon { points: 0 })?;
            match PolygonRail::new(hull) {
                Ok(mut rail) => {
                    let diff = bash_and_splash(old, &mut rail, DiffMode::BOTH, grid);
                    self.stats.tiles_shown = diff.shown;
                    self.stats.tiles_hidden = diff.hidden;
                    self.stats.rows_scanned = diff.rows;
                    *old = rail;
                }
                Err(e) => {
                    error!("footprint rail rejected, keeping previous: {e}");
                }
            }
        }

        if self.cull_creatures {
            if let Some(hull) = &self.hull {
                let diff = self.creatures.cull(&self.index, hull);
                diff.apply(registry);
                self.stats.creatures_shown = diff.ascending.len();
                self.stats.creatures_hidden = diff.descending.len();
            }
        }

        trace!(
            tiles_shown = self.stats.tiles_shown,
            tiles_hidden = self.stats.tiles_hidden,
            creatures_shown = self.stats.creatures_shown,
            creatures_hidden = self.stats.creatures_hidden,
            "culling frame"
        );
        Ok(self.stats)
    }

    /// End-of-frame hook.
    pub fn on_frame_ended(&mut self) {
        trace!(toggles = self.stats.toggles(), "culling frame ended");
    }

    /// Projects the cameras and replaces the hull, keeping the old one if
    /// the new footprint is degenerate.
    fn refresh_footprint<C: CameraRig + ?Sized>(&mut self, cameras: &C) -> CullingResult<()> {
        let footprint = project_footprint(&self.config, cameras);
        self.stats.skipped_corners = footprint.skipped_corners;
        match footprint.into_hull(self.config.zoom_factor) {
            Ok(hull) => {
                self.hull = Some(hull);
                Ok(())
            }
            Err(e) if self.hull.is_some() => {
                warn!("degenerate footprint, keeping previous polygon: {e}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn current_hull(&self) -> CullingResult<PointSet> {
        self.hull
            .clone()
            .ok_or(CullingError::Geometry(GeometryError::DegeneratePolygon { points: 0 }))
    }
}

/// Logs a failed step; index corruption also trips a debug assertion.
fn report(error: CullingError) -> CullingError {
    if error.is_structural() {
        error!("creature index corrupted: {error}");
    } else {
        warn!("culling step failed: {error}");
    }
    debug_assert!(!error.is_structural(), "{error}");
    error
}
