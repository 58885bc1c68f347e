//! Integration test for the creature quadtree invariants.

use std::sync::Arc;
use std::thread;

use fxhash::FxHashSet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use umbra_geometry::{Fixed, FixedVector2};
use umbra_spatial::{CreatureId, Quadrant, SpatialError, SpatialIndex, SpatialQuadTree};

fn p(x: i64, y: i64) -> FixedVector2 {
    FixedVector2::from_ints(x, y)
}

fn random_point(rng: &mut StdRng, span: f64) -> FixedVector2 {
    FixedVector2::from_f64s(rng.gen_range(-span..span), rng.gen_range(-span..span))
}

#[test]
fn test_scenario_merge_then_split() {
    let mut tree = SpatialQuadTree::new(p(0, 0), Fixed::from_int(16));

    tree.insert(CreatureId(1), p(5, 5)).unwrap();
    assert_eq!(tree.find(tree.root(), p(5, 5)).unwrap(), tree.root());

    tree.insert(CreatureId(2), p(5, 5)).unwrap();
    let root = tree.node(tree.root());
    assert!(root.is_leaf());
    assert_eq!(root.entry().unwrap().creatures.len(), 2);

    tree.insert(CreatureId(3), p(-5, 5)).unwrap();
    let children = tree.node(tree.root()).children().unwrap();
    let ur = tree.node(children[Quadrant::UpperRight.index()]).entry().unwrap();
    let ul = tree.node(children[Quadrant::UpperLeft.index()]).entry().unwrap();
    assert_eq!(ur.position, p(5, 5));
    assert_eq!(ur.creatures.len(), 2);
    assert_eq!(ul.creatures, vec![CreatureId(3)]);
}

#[test]
fn test_round_trip_any_order() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut points: Vec<(CreatureId, FixedVector2)> = (0..300u64)
        .map(|i| (CreatureId(i), random_point(&mut rng, 200.0)))
        .collect();
    let expected: FxHashSet<_> = points.iter().map(|(c, _)| *c).collect();

    for _ in 0..4 {
        points.shuffle(&mut rng);
        let mut tree = SpatialQuadTree::new(p(0, 0), Fixed::from_int(256));
        for (creature, position) in &points {
            tree.insert(*creature, *position).unwrap();
        }
        assert_eq!(tree.creatures(), expected);
        tree.check_invariants().unwrap();
    }
}

#[test]
fn test_random_moves_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut tree = SpatialQuadTree::new(p(200, 200), Fixed::from_int(256));

    for i in 0..200u64 {
        // Small integer grid so shared entries are common.
        let at = p(rng.gen_range(190..210), rng.gen_range(190..210));
        tree.insert(CreatureId(i), at).unwrap();
    }
    tree.check_invariants().unwrap();

    for step in 0..5_000 {
        let creature = CreatureId(rng.gen_range(0..200));
        let target = if rng.gen_bool(0.5) {
            p(rng.gen_range(185..215), rng.gen_range(185..215))
        } else {
            let here = tree.position_of(creature).unwrap();
            here + FixedVector2::from_f64s(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        };
        tree.move_entry_delta(creature, target).unwrap();
        assert_eq!(tree.position_of(creature), Some(target), "step {step}");
    }
    tree.check_invariants().unwrap();
    assert_eq!(tree.creature_count(), 200);
}

#[test]
fn test_move_idempotence() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut tree = SpatialQuadTree::new(p(0, 0), Fixed::from_int(64));
    for i in 0..50u64 {
        tree.insert(CreatureId(i), random_point(&mut rng, 60.0)).unwrap();
    }

    for i in 0..50u64 {
        let creature = CreatureId(i);
        let node = tree.locate(creature).unwrap();
        let nodes = tree.node_count();
        let here = tree.position_of(creature).unwrap();

        assert_eq!(tree.move_entry_delta(creature, here).unwrap(), node);
        assert_eq!(tree.node_count(), nodes);
    }
}

#[test]
fn test_escape_is_rejected() {
    let mut tree = SpatialQuadTree::new(p(0, 0), Fixed::from_int(16));
    tree.insert(CreatureId(1), p(5, 5)).unwrap();
    tree.insert(CreatureId(2), p(-5, -5)).unwrap();

    let err = tree.move_entry_delta(CreatureId(1), p(17, 5)).unwrap_err();
    assert!(matches!(err, SpatialError::NodeHasNoParent { .. }));
    assert_eq!(tree.position_of(CreatureId(1)), Some(p(5, 5)));
    tree.check_invariants().unwrap();
}

#[test]
fn test_concurrent_moves_through_the_handle() {
    let index = Arc::new(SpatialIndex::new(p(0, 0), Fixed::from_int(128)));
    index
        .populate((0..64u64).map(|i| (CreatureId(i), p(i as i64 - 32, 0))))
        .unwrap();

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t);
                for _ in 0..500 {
                    let creature = CreatureId(t * 16 + rng.gen_range(0..16));
                    let target = p(rng.gen_range(-100..100), rng.gen_range(-100..100));
                    index.move_creature(creature, target).unwrap();
                }
            })
        })
        .collect();

    for _ in 0..20 {
        let snapshot = index.snapshot();
        assert_eq!(snapshot.index.creatures().len(), 64);
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let guard = index.lock();
    guard.tree().check_invariants().unwrap();
    assert_eq!(guard.tree().creature_count(), 64);
}
