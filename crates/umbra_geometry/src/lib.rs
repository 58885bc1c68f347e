//! # UMBRA Geometry
//!
//! Deterministic ground-plane math for the visibility culler.
//!
//! ## Pipeline
//!
//! 1. Camera rays hit the ground in engine floats ([`Vec3`], [`Ray`], [`Plane`])
//! 2. Hits are converted once into fixed point ([`FixedVector3`])
//! 3. A [`PointSet`] is zoomed and reduced to its convex hull
//! 4. A [`PolygonRail`] answers per-row x spans for the scan-line diff
//! 5. Hull edges become [`Segment`]s that clip the creature index
//!
//! ## Example
//!
//! ```rust
//! use umbra_geometry::{Fixed, FixedVector3, PointSet, PolygonRail};
//!
//! let mut footprint: PointSet = [(0, 0), (8, 0), (8, 6), (0, 6), (3, 3)]
//!     .iter()
//!     .map(|&(x, y)| FixedVector3::from_ints(x, y))
//!     .collect();
//! footprint.convex_hull().unwrap();
//!
//! let mut rail = PolygonRail::new(footprint).unwrap();
//! let row = Fixed::from_int(3);
//! assert_eq!(rail.span_at(row), Some((Fixed::ZERO, Fixed::from_int(8))));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod fixed;
pub mod point_set;
pub mod rail;
pub mod segment;
pub mod vector;

pub use error::{GeometryError, GeometryResult};
pub use fixed::{Fixed, FixedVector2, FixedVector3, PRECISION_DIGITS, UNIT};
pub use point_set::PointSet;
pub use rail::PolygonRail;
pub use segment::{Segment, Side};
pub use vector::{Plane, Ray, Vec3};
