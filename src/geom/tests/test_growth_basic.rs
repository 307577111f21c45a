use std::f64::consts::PI;

use crate::geom::{Growth, GrowthError, GrowthOptions, SpatialHash, SweepOptions, Vec2};
use crate::graph::is_single_chain;

fn ring(count: usize, radius: f64) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            Vec2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn seeded(seed: u64) -> GrowthOptions {
    GrowthOptions {
        seed: Some(seed),
        ..GrowthOptions::default()
    }
}

/// Options under which only smoothing moves nodes.
fn smoothing_only(smoothing: f64) -> GrowthOptions {
    GrowthOptions {
        repulsion: 0.0,
        attraction: 0.0,
        insertion_rate: 0.0,
        min_neighbours: 0,
        smoothing,
        seed: Some(1),
        ..GrowthOptions::default()
    }
}

#[test]
fn seeded_growth_is_reproducible() {
    let mut a = Growth::new(ring(30, 100.0), seeded(42)).expect("growth");
    let mut b = Growth::new(ring(30, 100.0), seeded(42)).expect("growth");
    a.grow_n(15);
    b.grow_n(15);
    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.stats(), b.stats());
    assert_eq!(a.stats().iterations, 15);
    assert!(a.nodes().iter().all(|n| n.is_finite()));
}

#[test]
fn sparse_ring_gains_nodes_and_stays_one_loop() {
    let mut growth = Growth::new(ring(30, 100.0), seeded(3)).expect("growth");
    growth.grow_n(10);
    let stats = growth.stats();
    assert!(stats.nodes > 30);
    assert!(stats.insertions > 0);
    assert_eq!(growth.edges().len(), stats.nodes);

    let graph = growth.edge_graph();
    assert_eq!(graph.len(), stats.nodes);
    assert_eq!(is_single_chain(&graph), Ok(true));
}

#[test]
fn overlong_edges_are_split_at_the_attraction_radius() {
    let triangle = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1000.0, 0.0),
        Vec2::new(500.0, 866.0),
    ];
    let mut growth = Growth::new(triangle, smoothing_only(0.0)).expect("growth");
    growth.grow();
    assert_eq!(growth.stats().splits, 3);
    // every edge is about 1000 long: floor(1000 / 90) = 11 pieces each
    assert_eq!(growth.nodes().len(), 3 + 3 * 10);
    for [a, b] in growth.edges() {
        assert!(a.distance_to(b) <= 2.0 * growth.options().attraction_radius);
    }
}

#[test]
fn smoothing_pulls_nodes_towards_neighbour_midpoints() {
    let square = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(10.0, 10.0),
        Vec2::new(0.0, 10.0),
    ];
    let mut growth = Growth::new(square, smoothing_only(0.5)).expect("growth");
    growth.grow();
    assert_eq!(growth.nodes().len(), 4);
    assert_eq!(growth.nodes()[0], Vec2::new(2.5, 2.5));
    assert_eq!(growth.nodes()[2], Vec2::new(7.5, 7.5));
}

#[test]
fn spatial_hash_returns_the_surrounding_block() {
    let points = [
        Vec2::new(0.0, 0.0),
        Vec2::new(9.0, 0.0),
        Vec2::new(25.0, 0.0),
        Vec2::new(0.0, -11.0),
    ];
    let hash = SpatialHash::build(&points, 10.0);
    let mut near: Vec<usize> = hash.neighbours(Vec2::ZERO).collect();
    near.sort_unstable();
    assert_eq!(near, vec![0, 1, 3]);
    assert_eq!(hash.neighbour_count(Vec2::new(30.0, 0.0)), 1);
}

#[test]
fn outputs_lift_the_ring_to_a_height() {
    let growth = Growth::new(ring(12, 20.0), seeded(5)).expect("growth");
    let polygon = growth.as_polygon(4.0);
    assert_eq!(polygon.len(), 12);
    assert!(polygon.iter().all(|p| p.z == 4.0));

    let closed = growth.as_closed_polyline(4.0);
    assert_eq!(closed.len(), 13);
    assert_eq!(closed.first(), closed.last());

    let offset = growth.as_offset_polygon(4.0, |_, _| 1.0).expect("offset");
    assert_eq!(offset.len(), 12);

    let options = SweepOptions {
        radius: 0.5,
        divisions: 6,
        ..SweepOptions::default()
    };
    let (pipe, diag) = growth.to_sweep(4.0, options).expect("pipe");
    assert!(pipe.closed);
    assert_eq!(pipe.ring_count, 13);
    assert!(diag.is_manifold());
}

#[test]
fn stats_read_as_a_sentence() {
    let growth = Growth::new(ring(5, 10.0), seeded(9)).expect("growth");
    assert_eq!(
        growth.stats().to_string(),
        "growing curve with 5 nodes, grown 0 times, split 0 times, inserted 0 times"
    );
}

#[test]
fn invalid_input_is_rejected() {
    assert_eq!(
        Growth::new(ring(2, 1.0), seeded(1)).unwrap_err(),
        GrowthError::TooFewNodes { count: 2 }
    );

    let mut nodes = ring(4, 1.0);
    nodes[2] = Vec2::new(f64::NAN, 0.0);
    assert_eq!(
        Growth::new(nodes, seeded(1)).unwrap_err(),
        GrowthError::NonFiniteNode { index: 2 }
    );

    let rough = GrowthOptions {
        smoothing: 1.5,
        ..seeded(1)
    };
    assert_eq!(
        Growth::new(ring(4, 1.0), rough).unwrap_err(),
        GrowthError::InvalidOption { name: "smoothing" }
    );

    let mut growth = Growth::new(ring(4, 1.0), seeded(1)).expect("growth");
    assert_eq!(
        growth.set_boundary(vec![Vec2::new(0.0, f64::INFINITY)]),
        Err(GrowthError::NonFiniteNode { index: 0 })
    );
}
