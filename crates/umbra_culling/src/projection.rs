//! # Ground Projection
//!
//! Casts one ray per frustum edge (near corner `i` through far corner
//! `i + 4`) onto the dungeon floor and collects the hits as a fixed-point
//! footprint.
//!
//! ## Plane order
//!
//! 1. Ground `z = 0`, accepted when the hit lies over the map
//! 2. Ceiling, then the walls at `low` / `high` on each axis
//! 3. The ground hit clamped onto the map
//!
//! A ray that hits nothing is reported and its corner dropped.

use tracing::warn;
use umbra_geometry::{FixedVector3, Plane, PointSet, Ray, Vec3};

use crate::collaborators::CameraRig;
use crate::config::CullingConfig;
use crate::error::{CullingError, CullingResult};

/// Corners per frustum face.
const FACE_CORNERS: usize = 4;

/// Projected camera footprint before zoom and hull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Ground hits, `z` flattened to zero.
    pub points: PointSet,
    /// Corners whose ray hit nothing.
    pub skipped_corners: usize,
}

impl Footprint {
    /// Zooms the footprint about its centroid and reduces it to its hull.
    ///
    /// # Errors
    ///
    /// [`CullingError::Geometry`] wrapping `DegeneratePolygon` for fewer
    /// than three usable corners or a collinear footprint.
    pub fn into_hull(self, zoom_factor: f64) -> CullingResult<PointSet> {
        let mut points = self.points;
        points.zoom(zoom_factor);
        points.convex_hull()?;
        Ok(points)
    }
}

/// Projects the ray from `near` through `far` onto the map.
///
/// `corner` only labels the error.
///
/// # Errors
///
/// [`CullingError::DegenerateRayPlaneIntersection`] if the ray misses the
/// ground and every bounding plane.
pub fn project_corner(
    config: &CullingConfig,
    near: Vec3,
    far: Vec3,
    corner: usize,
) -> CullingResult<Vec3> {
    let ray = Ray::through(near, far);
    let hit = |plane: &Plane| ray.intersect_plane(plane).map(|t| ray.point_at(t));

    let ground = hit(&Plane::GROUND);
    if let Some(p) = ground.filter(|&p| config.in_bounds(p)) {
        return Ok(p);
    }
    if let Some(p) = config
        .bounding_planes()
        .iter()
        .filter_map(hit)
        .find(|&p| config.in_bounds(p))
    {
        return Ok(p);
    }
    ground
        .map(|p| config.clamp(p))
        .ok_or(CullingError::DegenerateRayPlaneIntersection { corner })
}

/// Projects the main camera (corners 0-3) and, when present, the minimap
/// camera (corners 4-7).
#[must_use]
pub fn project_footprint<C: CameraRig + ?Sized>(config: &CullingConfig, cameras: &C) -> Footprint {
    let mut footprint = Footprint {
        points: PointSet::with_capacity(2 * FACE_CORNERS),
        skipped_corners: 0,
    };

    let frusta = [Some(cameras.main_frustum()), cameras.minimap_frustum()];
    for (camera, frustum) in frusta.iter().enumerate() {
        let Some(frustum) = frustum else {
            continue;
        };
        for i in 0..FACE_CORNERS {
            let corner = camera * FACE_CORNERS + i;
            match project_corner(config, frustum[i], frustum[i + FACE_CORNERS], corner) {
                Ok(p) => footprint
                    .points
                    .push(FixedVector3::from_vec3(Vec3::new(p.x, p.y, 0.0))),
                Err(e) => {
                    warn!(corner, error = %e, "skipping camera corner");
                    footprint.skipped_corners += 1;
                }
            }
        }
    }
    footprint
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_geometry::{Fixed, GeometryError};

    struct TopDown {
        minimap: bool,
    }

    fn column(x: f32, y: f32) -> (Vec3, Vec3) {
        (Vec3::new(x, y, 30.0), Vec3::new(x, y, -10.0))
    }

    fn frustum(xy: [(f32, f32); 4]) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, &(x, y)) in xy.iter().enumerate() {
            let (near, far) = column(x, y);
            corners[i] = near;
            corners[i + 4] = far;
        }
        corners
    }

    impl CameraRig for TopDown {
        fn main_frustum(&self) -> [Vec3; 8] {
            frustum([(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0)])
        }

        fn minimap_frustum(&self) -> Option<[Vec3; 8]> {
            self.minimap
                .then(|| frustum([(50.0, 50.0), (60.0, 50.0), (60.0, 60.0), (50.0, 60.0)]))
        }
    }

    #[test]
    fn test_straight_down_hits_ground() {
        let config = CullingConfig::production();
        let p = project_corner(
            &config,
            Vec3::new(12.0, 14.0, 30.0),
            Vec3::new(12.0, 14.0, -10.0),
            0,
        )
        .unwrap();
        assert_eq!(p, Vec3::new(12.0, 14.0, 0.0));
    }

    #[test]
    fn test_off_map_ground_hit_falls_back_to_wall() {
        let config = CullingConfig::production();
        let p = project_corner(
            &config,
            Vec3::new(390.0, 200.0, 10.0),
            Vec3::new(400.0, 200.0, 0.0),
            1,
        )
        .unwrap();
        assert!((p.x - 395.0).abs() < 1e-3);
        assert!((p.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_off_map_ground_hit_is_clamped() {
        let config = CullingConfig::production();
        let p = project_corner(
            &config,
            Vec3::new(500.0, 200.0, 10.0),
            Vec3::new(510.0, 200.0, 0.0),
            2,
        )
        .unwrap();
        assert_eq!(p, Vec3::new(396.0, 200.0, 0.0));
    }

    #[test]
    fn test_ray_into_the_sky_is_degenerate() {
        let config = CullingConfig::production();
        let err = project_corner(
            &config,
            Vec3::new(-50.0, -50.0, 5.0),
            Vec3::new(-60.0, -60.0, 10.0),
            3,
        )
        .unwrap_err();
        assert_eq!(err, CullingError::DegenerateRayPlaneIntersection { corner: 3 });
    }

    #[test]
    fn test_footprint_with_minimap() {
        let config = CullingConfig::production();

        let main_only = project_footprint(&config, &TopDown { minimap: false });
        assert_eq!(main_only.points.len(), 4);
        assert_eq!(main_only.skipped_corners, 0);

        let both = project_footprint(&config, &TopDown { minimap: true });
        assert_eq!(both.points.len(), 8);
        assert!(both.points.iter().all(|p| p.z == Fixed::ZERO));
    }

    #[test]
    fn test_hull_of_footprint() {
        let config = CullingConfig::production();
        let hull = project_footprint(&config, &TopDown { minimap: true })
            .into_hull(1.0)
            .unwrap();
        // The two squares share a hull with six corners.
        assert_eq!(hull.len(), 6);

        let err = Footprint::default().into_hull(1.0).unwrap_err();
        assert_eq!(
            err,
            CullingError::Geometry(GeometryError::DegeneratePolygon { points: 0 })
        );
    }
}
