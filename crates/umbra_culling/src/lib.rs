//! # UMBRA Culling
//!
//! Keeps the renderer's work proportional to what the camera sees.
//!
//! ## Frame flow
//!
//! 1. Camera frustum edges are projected onto the floor ([`projection`])
//! 2. The footprint is zoomed and reduced to a convex hull
//! 3. Tiles: the new hull's rail is diffed against the previous one and
//!    only the changed tiles are toggled ([`tiles::bash_and_splash`])
//! 4. Creatures: a snapshot of the [`SpatialIndex`] is clipped by the hull
//!    and compared with the previous visible set ([`creatures`])
//!
//! The game talks to the [`CullingManager`]; everything it renders is
//! reached through the traits in [`collaborators`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collaborators;
pub mod config;
pub mod creatures;
pub mod error;
pub mod manager;
pub mod projection;
pub mod stats;
pub mod tiles;

pub use collaborators::{CameraRig, CreatureRegistry, TileGrid};
pub use config::CullingConfig;
pub use creatures::{CreatureCuller, CreatureDiff};
pub use error::{CullingError, CullingResult};
pub use manager::{CullingManager, CullingState};
pub use projection::{project_corner, project_footprint, Footprint};
pub use stats::CullingStats;
pub use tiles::{bash_and_splash, hide_all, show_all, DiffMode, TileDiff};

pub use umbra_spatial::{CreatureId, SpatialIndex};
