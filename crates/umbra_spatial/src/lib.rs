//! # UMBRA Spatial
//!
//! Creature index for visibility culling.
//!
//! ## Structure
//!
//! ```text
//! SpatialIndex              Mutex, shared with the simulation thread
//!   └─ MortuaryIndex        tree + creatures removed since the last pass
//!        └─ SpatialQuadTree arena of QuadNodes, creature locator
//! ```
//!
//! ## Thread Safety
//!
//! Moves arrive from whichever thread runs the simulation; the culler runs
//! on the frame thread. Both go through [`SpatialIndex`], which holds the
//! lock for a whole mutation and only for the clone step of a culling pass.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod entry;
pub mod error;
pub mod index;
pub mod mortuary;
pub mod tree;

pub use entry::{CreatureId, Entry};
pub use error::{SpatialError, SpatialResult};
pub use index::{IndexSnapshot, SpatialIndex};
pub use mortuary::MortuaryIndex;
pub use tree::{NodeId, QuadNode, Quadrant, SpatialQuadTree, MAX_DEPTH};
