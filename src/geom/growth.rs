//! Differential growth of a closed planar curve.
//!
//! The curve is an ordered ring of 2D nodes. Every [`Growth::grow`] step splits
//! overlong edges, pulls stretched edges together, pushes nearby nodes apart,
//! inserts midpoints where the neighbourhood is sparse and finally smooths the
//! ring. Nodes are bucketed in a [`SpatialHash`] whose cells are one repulsion
//! radius wide, so neighbour lookups only visit the surrounding 3×3 cells.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::curves::{CurveError, offset_polyline};
use super::diagnostics::GeomMeshDiagnostics;
use super::sweep::{SweepError, SweepMesh, SweepOptions, sweep_polyline};
use super::{Point3, Vec2};
use crate::graph::{PositionKey, UndirectedEdgeMap, growth_edges_to_graph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthOptions {
    pub repulsion: f64,
    pub attraction: f64,
    pub repulsion_radius: f64,
    pub attraction_radius: f64,
    /// Edges longer than this are subdivided; `None` means twice the attraction radius.
    pub split_distance: Option<f64>,
    pub jiggle_radius: f64,
    pub jiggle: bool,
    /// Blend factor towards the neighbour midpoint, in `[0, 1]`.
    pub smoothing: f64,
    /// Chance per edge and step of inserting a midpoint in a permissive neighbourhood.
    pub insertion_rate: f64,
    /// No insertion once a node sees this many neighbours.
    pub max_neighbours: usize,
    /// Insertion is forced below this many neighbours.
    pub min_neighbours: usize,
    /// Repulsion multiplier for fixed boundary nodes.
    pub boundary_weight: f64,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GrowthOptions {
    fn default() -> Self {
        Self {
            repulsion: 0.75,
            attraction: 0.55,
            repulsion_radius: 60.0,
            attraction_radius: 90.0,
            split_distance: None,
            jiggle_radius: 0.01,
            jiggle: false,
            smoothing: 0.75,
            insertion_rate: 0.001,
            max_neighbours: 45,
            min_neighbours: 20,
            boundary_weight: 10.0,
            seed: None,
        }
    }
}

impl GrowthOptions {
    #[must_use]
    pub fn split_distance(&self) -> f64 {
        self.split_distance.unwrap_or(self.attraction_radius * 2.0)
    }

    fn validate(&self) -> Result<(), GrowthError> {
        let positive = [
            ("repulsion radius", self.repulsion_radius),
            ("attraction radius", self.attraction_radius),
            ("split distance", self.split_distance()),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GrowthError::InvalidOption { name });
            }
        }
        let finite = [
            ("repulsion", self.repulsion),
            ("attraction", self.attraction),
            ("jiggle radius", self.jiggle_radius),
            ("boundary weight", self.boundary_weight),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(GrowthError::InvalidOption { name });
            }
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(GrowthError::InvalidOption { name: "smoothing" });
        }
        if !(0.0..=1.0).contains(&self.insertion_rate) {
            return Err(GrowthError::InvalidOption { name: "insertion rate" });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GrowthError {
    #[error("growth requires at least 3 nodes, got {count}")]
    TooFewNodes { count: usize },
    #[error("node {index} is not finite")]
    NonFiniteNode { index: usize },
    #[error("invalid growth option: {name}")]
    InvalidOption { name: &'static str },
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Sweep(#[from] SweepError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Spatial hash
// ─────────────────────────────────────────────────────────────────────────────

/// Uniform grid of node indices keyed by rounded `position / cell_size`.
#[derive(Debug, Clone, Default)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialHash {
    #[must_use]
    pub fn build(points: &[Vec2], cell_size: f64) -> Self {
        let mut hash = Self {
            cell_size,
            cells: HashMap::new(),
        };
        for (i, &p) in points.iter().enumerate() {
            hash.cells.entry(hash.key(p)).or_default().push(i);
        }
        hash
    }

    fn key(&self, p: Vec2) -> (i64, i64) {
        (
            (p.x / self.cell_size).round() as i64,
            (p.y / self.cell_size).round() as i64,
        )
    }

    /// Indices in the 3×3 block of cells around `p`, including `p`'s own index
    /// if it was hashed.
    pub fn neighbours(&self, p: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.key(p);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(|key| self.cells.get(&key))
            .flatten()
            .copied()
    }

    #[must_use]
    pub fn neighbour_count(&self, p: Vec2) -> usize {
        self.neighbours(p).count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth
// ─────────────────────────────────────────────────────────────────────────────

/// Counters reported by [`Growth::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthStats {
    pub nodes: usize,
    pub iterations: usize,
    pub splits: usize,
    pub insertions: usize,
}

impl fmt::Display for GrowthStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "growing curve with {} nodes, grown {} times, split {} times, inserted {} times",
            self.nodes, self.iterations, self.splits, self.insertions
        )
    }
}

#[derive(Debug, Clone)]
pub struct Growth {
    nodes: Vec<Vec2>,
    boundary: Vec<Vec2>,
    options: GrowthOptions,
    rng: StdRng,
    iterations: usize,
    splits: usize,
    insertions: usize,
}

impl Growth {
    pub fn new(nodes: Vec<Vec2>, options: GrowthOptions) -> Result<Self, GrowthError> {
        options.validate()?;
        if nodes.len() < 3 {
            return Err(GrowthError::TooFewNodes { count: nodes.len() });
        }
        if let Some(index) = nodes.iter().position(|n| !n.is_finite()) {
            return Err(GrowthError::NonFiniteNode { index });
        }
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            nodes,
            boundary: Vec::new(),
            options,
            rng,
            iterations: 0,
            splits: 0,
            insertions: 0,
        })
    }

    /// Fixed nodes that repel the curve but never move.
    pub fn set_boundary(&mut self, boundary: Vec<Vec2>) -> Result<(), GrowthError> {
        if let Some(index) = boundary.iter().position(|n| !n.is_finite()) {
            return Err(GrowthError::NonFiniteNode { index });
        }
        self.boundary = boundary;
        Ok(())
    }

    #[must_use]
    pub fn nodes(&self) -> &[Vec2] {
        &self.nodes
    }

    #[must_use]
    pub fn options(&self) -> &GrowthOptions {
        &self.options
    }

    #[must_use]
    pub fn stats(&self) -> GrowthStats {
        GrowthStats {
            nodes: self.nodes.len(),
            iterations: self.iterations,
            splits: self.splits,
            insertions: self.insertions,
        }
    }

    /// Ring edges `[node i, node i + 1]`, closing back to the first node.
    #[must_use]
    pub fn edges(&self) -> Vec<[Vec2; 2]> {
        let n = self.nodes.len();
        (0..n)
            .map(|i| [self.nodes[i], self.nodes[(i + 1) % n]])
            .collect()
    }

    #[must_use]
    pub fn edge_graph(&self) -> UndirectedEdgeMap<PositionKey, usize> {
        growth_edges_to_graph(&self.edges())
    }

    /// One relaxation step.
    pub fn grow(&mut self) {
        self.split();
        self.attract();
        self.repel();
        self.insert();
        if self.options.jiggle {
            self.jiggle();
        }
        self.smooth();
        if let Some(index) = self.nodes.iter().position(|n| !n.is_finite()) {
            log::warn!("growth: node {index} left the finite range at step {}", self.iterations);
        }
        self.iterations += 1;
        log::debug!("growth: {}", self.stats());
    }

    /// Runs `steps` growth steps.
    pub fn grow_n(&mut self, steps: usize) {
        for _ in 0..steps {
            self.grow();
        }
    }

    fn split(&mut self) {
        let limit = self.options.split_distance();
        let target = self.options.attraction_radius;
        let n = self.nodes.len();
        let mut ring = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (self.nodes[i], self.nodes[(i + 1) % n]);
            ring.push(a);
            let length = a.distance_to(b);
            if length > limit {
                let pieces = (length / target).floor().max(1.0) as usize;
                for k in 1..pieces {
                    ring.push(a.lerp(b, k as f64 / pieces as f64));
                }
                self.splits += 1;
            }
        }
        self.nodes = ring;
    }

    /// Edges stretched past the attraction radius pull their endpoints together.
    fn attract(&mut self) {
        let radius = self.options.attraction_radius;
        let strength = self.options.attraction;
        let n = self.nodes.len();
        let mut moves = vec![Vec2::ZERO; n];
        for i in 0..n {
            let j = (i + 1) % n;
            let delta = self.nodes[j] - self.nodes[i];
            let length = delta.length();
            if length <= radius {
                continue;
            }
            let Some(direction) = delta.normalized() else {
                continue;
            };
            let pull = direction * (strength * (length - radius) * 0.5);
            moves[i] += pull;
            moves[j] -= pull;
        }
        for (node, m) in self.nodes.iter_mut().zip(moves) {
            *node += m;
        }
    }

    fn repel(&mut self) {
        let radius = self.options.repulsion_radius;
        let strength = self.options.repulsion;
        let nodes_hash = SpatialHash::build(&self.nodes, radius);
        let boundary_hash = SpatialHash::build(&self.boundary, radius);

        let push = |from: Vec2, to: Vec2, weight: f64| -> Vec2 {
            let away = to - from;
            let d = away.length();
            if d >= radius {
                return Vec2::ZERO;
            }
            away.normalized()
                .map_or(Vec2::ZERO, |dir| dir * (weight * strength * (1.0 - d / radius).powi(2)))
        };

        let moves: Vec<Vec2> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut total = Vec2::ZERO;
                for j in nodes_hash.neighbours(v).filter(|&j| j != i) {
                    total += push(self.nodes[j], v, 1.0);
                }
                for j in boundary_hash.neighbours(v) {
                    total += push(self.boundary[j], v, self.options.boundary_weight);
                }
                total
            })
            .collect();

        for (node, m) in self.nodes.iter_mut().zip(moves) {
            *node += m;
        }
    }

    fn insert(&mut self) {
        let radius = self.options.repulsion_radius;
        let nodes_hash = SpatialHash::build(&self.nodes, radius);
        let boundary_hash = SpatialHash::build(&self.boundary, radius);

        let n = self.nodes.len();
        let mut ring = Vec::with_capacity(n * 2);
        for i in 0..n {
            let (a, b) = (self.nodes[i], self.nodes[(i + 1) % n]);
            ring.push(a);
            let crowd = nodes_hash.neighbour_count(a) + boundary_hash.neighbour_count(a);
            let lucky = self.rng.random::<f64>() < self.options.insertion_rate;
            let allowed = crowd < self.options.max_neighbours;
            let forced = crowd < self.options.min_neighbours;
            if allowed && (forced || lucky) {
                ring.push(a.midpoint(b));
                self.insertions += 1;
            }
        }
        self.nodes = ring;
    }

    fn jiggle(&mut self) {
        let radius = self.options.jiggle_radius;
        for node in &mut self.nodes {
            let angle = self.rng.random::<f64>() * 2.0 * PI;
            let r = self.rng.random::<f64>() * radius;
            *node += Vec2::new(r * angle.cos(), r * angle.sin());
        }
    }

    fn smooth(&mut self) {
        let t = self.options.smoothing;
        let n = self.nodes.len();
        self.nodes = (0..n)
            .map(|i| {
                let v = self.nodes[i];
                let target = self.nodes[(i + n - 1) % n].midpoint(self.nodes[(i + 1) % n]);
                v + (target - v) * t
            })
            .collect();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    /// Nodes lifted to `height`, without repeating the first node.
    #[must_use]
    pub fn as_polygon(&self, height: f64) -> Vec<Point3> {
        self.nodes.iter().map(|v| v.to_point3(height)).collect()
    }

    /// Nodes offset along their corner bisectors by `distance(node, index)`, lifted to `height`.
    pub fn as_offset_polygon(
        &self,
        height: f64,
        distance: impl Fn(Vec2, usize) -> f64,
    ) -> Result<Vec<Point3>, GrowthError> {
        Ok(offset_polyline(&self.nodes, distance)?
            .into_iter()
            .map(|v| v.to_point3(height))
            .collect())
    }

    /// [`as_polygon`](Self::as_polygon) with the first node repeated at the end.
    #[must_use]
    pub fn as_closed_polyline(&self, height: f64) -> Vec<Point3> {
        let mut points = self.as_polygon(height);
        if let Some(&first) = points.first() {
            points.push(first);
        }
        points
    }

    /// Tube around the closed curve at `height`.
    pub fn to_sweep(
        &self,
        height: f64,
        options: SweepOptions,
    ) -> Result<(SweepMesh, GeomMeshDiagnostics), GrowthError> {
        Ok(sweep_polyline(&self.as_closed_polyline(height), options)?)
    }
}
