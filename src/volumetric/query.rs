//! Read-only queries over faces, cells and the whole mesh.

use std::collections::{HashMap, HashSet};

use crate::geom::{
    FaceLayout, GeomMesh, Point3, PolyFace, PolyMesh, SweepMesh, SweepOptions, catmull_polygon_n,
    sweep_polyline,
};

use super::error::{EdgeMeshError, MissingAdjacencyError, TopologyError};
use super::mesh::VolumetricMesh;
use super::{CellId, FaceId, HalfEdgeId, VertexId};

/// Corner-cutting rounds applied to face outlines.
const POLYGON_SMOOTHING: usize = 3;

/// Thin tubes drawn along face outlines by [`VolumetricMesh::edge_meshes`].
pub const EDGE_TUBE_OPTIONS: SweepOptions = SweepOptions {
    radius: 0.05,
    divisions: 20,
    uv_scale: 2.5,
    layout: FaceLayout::Triangles,
    apply_width_scale: false,
};

impl VolumetricMesh {
    // ─────────────────────────────────────────────────────────────────────────
    // Faces
    // ─────────────────────────────────────────────────────────────────────────

    /// Every boundary edge has a pair.
    #[must_use]
    pub fn face_is_closed(&self, face: FaceId) -> bool {
        self.face(face)
            .edges()
            .iter()
            .all(|&e| !self.half_edge(e).is_naked())
    }

    #[must_use]
    pub fn face_naked_edges(&self, face: FaceId) -> Vec<HalfEdgeId> {
        self.face(face)
            .edges()
            .iter()
            .copied()
            .filter(|&e| self.half_edge(e).is_naked())
            .collect()
    }

    #[must_use]
    pub fn face_covered_edges(&self, face: FaceId) -> Vec<HalfEdgeId> {
        self.face(face)
            .edges()
            .iter()
            .copied()
            .filter(|&e| !self.half_edge(e).is_naked())
            .collect()
    }

    /// Faces across the paired edges of `face`, one per covered edge.
    #[must_use]
    pub fn face_internal_neighbours(&self, face: FaceId) -> Vec<FaceId> {
        self.face(face)
            .edges()
            .iter()
            .filter_map(|&e| self.half_edge(e).pair())
            .filter_map(|pair| self.half_edge(pair).face())
            .collect()
    }

    /// Smoothed outline: the quarter points of every edge, corner-cut three times.
    pub fn face_polygon(&self, face: FaceId) -> Result<Vec<Point3>, MissingAdjacencyError> {
        let mut outline = Vec::with_capacity(self.face(face).edges().len() * 2);
        for &edge in self.face(face).edges() {
            outline.extend(self.edge_quarter_points(edge)?);
        }
        Ok(catmull_polygon_n(&outline, POLYGON_SMOOTHING))
    }

    /// Fan triangulation of the face's vertex loop.
    #[must_use]
    pub fn face_triangles(&self, face: FaceId) -> Vec<[VertexId; 3]> {
        let ring = self.face_vertices(face);
        if ring.len() < 3 {
            return Vec::new();
        }
        (1..ring.len() - 1)
            .map(|i| [ring[0], ring[i], ring[i + 1]])
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cells
    // ─────────────────────────────────────────────────────────────────────────

    /// Distinct vertices of the cell in first-seen order.
    pub fn cell_vertices(&self, cell: CellId) -> Result<Vec<VertexId>, TopologyError> {
        let mut seen = HashSet::new();
        let mut vertices = Vec::new();
        for &face in self.cell_or_err(cell)?.faces() {
            for v in self.face_vertices(face) {
                if seen.insert(v) {
                    vertices.push(v);
                }
            }
        }
        Ok(vertices)
    }

    pub fn cell_naked_edges(&self, cell: CellId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        Ok(self
            .cell_or_err(cell)?
            .faces()
            .iter()
            .flat_map(|&f| self.face_naked_edges(f))
            .collect())
    }

    pub fn cell_covered_edges(&self, cell: CellId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        Ok(self
            .cell_or_err(cell)?
            .faces()
            .iter()
            .flat_map(|&f| self.face_covered_edges(f))
            .collect())
    }

    /// Pairs of faces sharing a paired edge. Each adjacency appears once no
    /// matter which of its two half-edges is reached first.
    pub fn cell_dual_graph(&self, cell: CellId) -> Result<Vec<(FaceId, FaceId)>, TopologyError> {
        let mut checked = HashSet::new();
        let mut pairs = Vec::new();
        for &face in self.cell_or_err(cell)?.faces() {
            for &edge in self.face(face).edges() {
                if !checked.insert(edge) {
                    continue;
                }
                let Some(pair) = self.half_edge(edge).pair() else {
                    continue;
                };
                checked.insert(pair);
                if let Some(other) = self.half_edge(pair).face() {
                    pairs.push((face, other));
                }
            }
        }
        Ok(pairs)
    }

    /// [`cell_dual_graph`](Self::cell_dual_graph) as lines between face centres.
    pub fn cell_dual_graph_as_lines(
        &self,
        cell: CellId,
    ) -> Result<Vec<[Point3; 2]>, TopologyError> {
        Ok(self
            .cell_dual_graph(cell)?
            .into_iter()
            .filter_map(|(a, b)| Some([self.face_center(a)?, self.face_center(b)?]))
            .collect())
    }

    pub fn cell_polygons(&self, cell: CellId) -> Result<Vec<Vec<Point3>>, TopologyError> {
        self.cell_or_err(cell)?
            .faces()
            .iter()
            .map(|&f| self.face_polygon(f).map_err(TopologyError::from))
            .collect()
    }

    /// Faces of the cell over a compact vertex pool. Triangles and quads keep
    /// their shape; larger faces are fanned into triangles.
    pub fn cell_to_poly_mesh(&self, cell: CellId) -> Result<PolyMesh, TopologyError> {
        let faces = self.cell_or_err(cell)?.faces().to_vec();
        Ok(self.faces_to_poly_mesh(&faces))
    }

    fn faces_to_poly_mesh(&self, faces: &[FaceId]) -> PolyMesh {
        let mut slots = HashMap::new();
        let mut positions = Vec::new();
        let mut slot = |v: VertexId| -> u32 {
            *slots.entry(v).or_insert_with(|| {
                positions.push(self.position(v).to_array());
                (positions.len() - 1) as u32
            })
        };

        let mut poly_faces = Vec::with_capacity(faces.len());
        for &face in faces {
            let ring: Vec<u32> = self.face_vertices(face).into_iter().map(&mut slot).collect();
            match ring.as_slice() {
                &[a, b, c] => poly_faces.push(PolyFace::Triangle([a, b, c])),
                &[a, b, c, d] => poly_faces.push(PolyFace::Quad([a, b, c, d])),
                [first, rest @ ..] if rest.len() >= 3 => {
                    poly_faces.extend(
                        rest.windows(2)
                            .map(|w| PolyFace::Triangle([*first, w[0], w[1]])),
                    );
                }
                _ => log::warn!("skipping degenerate face {face} with {} vertices", ring.len()),
            }
        }
        PolyMesh::new(positions, poly_faces)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mesh
    // ─────────────────────────────────────────────────────────────────────────

    /// Every face owned by a cell, in cell order.
    #[must_use]
    pub fn cell_faces(&self) -> Vec<FaceId> {
        self.cell_ids()
            .filter_map(|c| self.cell(c))
            .flat_map(|c| c.faces().iter().copied())
            .collect()
    }

    pub fn naked_edges(&self) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let mut edges = Vec::new();
        for cell in self.cell_ids() {
            edges.extend(self.cell_naked_edges(cell)?);
        }
        Ok(edges)
    }

    pub fn dual_graph_as_lines(&self) -> Result<Vec<[Point3; 2]>, TopologyError> {
        let mut lines = Vec::new();
        for cell in self.cell_ids() {
            lines.extend(self.cell_dual_graph_as_lines(cell)?);
        }
        Ok(lines)
    }

    pub fn polygons(&self) -> Result<Vec<Vec<Point3>>, TopologyError> {
        let mut polygons = Vec::new();
        for cell in self.cell_ids() {
            polygons.extend(self.cell_polygons(cell)?);
        }
        Ok(polygons)
    }

    /// Pairs of cells whose faces were linked as neighbours, each listed once
    /// with the lower id first.
    #[must_use]
    pub fn cell_adjacency(&self) -> Vec<(CellId, CellId)> {
        let mut pairs = Vec::new();
        for face in self.cell_faces() {
            let data = self.face(face);
            let (Some(cell), Some(neighbour)) = (data.cell(), data.neighbour()) else {
                continue;
            };
            let Some(other) = self.face(neighbour).cell() else {
                continue;
            };
            if cell < other {
                pairs.push((cell, other));
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    #[must_use]
    pub fn to_poly_mesh(&self) -> PolyMesh {
        self.faces_to_poly_mesh(&self.cell_faces())
    }

    #[must_use]
    pub fn to_geom_mesh(&self) -> GeomMesh {
        self.to_poly_mesh().to_geom_mesh()
    }

    /// One closed tube per face outline.
    pub fn edge_meshes(&self, options: SweepOptions) -> Result<Vec<SweepMesh>, EdgeMeshError> {
        let polygons = self.polygons()?;
        let mut meshes = Vec::with_capacity(polygons.len());
        for mut polygon in polygons {
            if let Some(&first) = polygon.first() {
                polygon.push(first);
            }
            let (mesh, _) = sweep_polyline(&polygon, options)?;
            meshes.push(mesh);
        }
        log::debug!("edge_meshes: {} tube(s)", meshes.len());
        Ok(meshes)
    }
}
