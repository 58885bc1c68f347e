//! # Culling Benchmark
//!
//! One tile diff per frame for a camera panning across the map, and a full
//! frame with creature culling on.
//!
//! Run with: cargo bench --package umbra_culling --bench culling_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use umbra_culling::{
    bash_and_splash, CameraRig, CreatureId, CreatureRegistry, CullingConfig, CullingManager,
    DiffMode, TileGrid,
};
use umbra_geometry::{FixedVector2, FixedVector3, PointSet, PolygonRail, Vec3};

const MAP: u32 = 396;

/// Grid that only counts toggles.
struct CountingGrid {
    toggles: u64,
}

impl TileGrid for CountingGrid {
    type Handle = ();

    fn map_size(&self) -> (u32, u32) {
        (MAP, MAP)
    }

    fn tile(&self, _x: i64, _y: i64) -> Option<()> {
        Some(())
    }

    fn show_tile(&mut self, _tile: ()) {
        self.toggles += 1;
    }

    fn hide_tile(&mut self, _tile: ()) {
        self.toggles += 1;
    }
}

struct Tilted {
    x: f32,
}

impl CameraRig for Tilted {
    fn main_frustum(&self) -> [Vec3; 8] {
        let near = [(0.0, 0.0), (1.0, 0.0), (1.2, 1.0), (-0.2, 1.0)];
        let far = [(-20.0, 30.0), (21.0, 30.0), (30.0, 70.0), (-29.0, 70.0)];
        let mut corners = [Vec3::ZERO; 8];
        for i in 0..4 {
            corners[i] = Vec3::new(self.x + near[i].0, 100.0 + near[i].1, 20.0);
            corners[i + 4] = Vec3::new(self.x + far[i].0, 100.0 + far[i].1, -2.0);
        }
        corners
    }
}

struct Crowd {
    creatures: Vec<(CreatureId, FixedVector2)>,
}

impl CreatureRegistry for Crowd {
    fn creature_positions(&self) -> Vec<(CreatureId, FixedVector2)> {
        self.creatures.clone()
    }

    fn show_creature(&mut self, creature: CreatureId) {
        black_box(creature);
    }

    fn hide_creature(&mut self, creature: CreatureId) {
        black_box(creature);
    }
}

fn quad(x: i64) -> PolygonRail {
    let points: PointSet = [(x, 100), (x + 40, 100), (x + 55, 140), (x - 15, 140)]
        .iter()
        .map(|&(x, y)| FixedVector3::from_ints(x, y))
        .collect();
    PolygonRail::new(points).unwrap()
}

fn bench_tile_diff(c: &mut Criterion) {
    let mut grid = CountingGrid { toggles: 0 };
    let mut old = quad(100);
    let mut new = quad(101);

    c.bench_function("bash_and_splash_pan_one_tile", |b| {
        b.iter(|| {
            black_box(bash_and_splash(&mut old, &mut new, DiffMode::BOTH, &mut grid));
        });
    });
}

fn bench_frame(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut crowd = Crowd {
        creatures: (0..1_500u64)
            .map(|i| {
                let at = FixedVector2::from_f64s(rng.gen_range(1.0..395.0), rng.gen_range(1.0..395.0));
                (CreatureId(i), at)
            })
            .collect(),
    };
    let mut grid = CountingGrid { toggles: 0 };
    let mut manager = CullingManager::new(CullingConfig::production()).unwrap();
    manager.populate_index(&crowd).unwrap();

    let mut camera = Tilted { x: 100.0 };
    manager.start_tile_culling(&camera, &mut grid).unwrap();
    manager.start_creature_culling();

    c.bench_function("culling_frame_panning", |b| {
        b.iter(|| {
            camera.x = if camera.x > 300.0 { 100.0 } else { camera.x + 0.5 };
            black_box(manager.on_frame_started(&camera, &mut grid, &mut crowd).unwrap());
            manager.on_frame_ended();
        });
    });
}

criterion_group!(benches, bench_tile_diff, bench_frame);
criterion_main!(benches);
