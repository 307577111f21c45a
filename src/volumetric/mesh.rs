//! Arena storage and primitive operations of the volumetric half-edge mesh.
//!
//! Every element lives in a `Vec` owned by [`VolumetricMesh`] and is addressed
//! by a typed index. A half-edge runs from `previous.vertex` to `vertex`; faces
//! wind clockwise when seen from the side their normal points to, so a face
//! normal is the first non-degenerate `d_i × d_0` of its edge directions.
//!
//! Ids are only meaningful for the mesh that issued them. The plain accessors
//! and the infallible face queries panic on a foreign id; operations returning
//! `Result` report [`TopologyError::UnknownFace`] and friends instead.

use crate::geom::{Point3, Vec3};

use super::error::{AdjacencyLink, MissingAdjacencyError, TopologyError};
use super::{CellId, FaceId, HalfEdgeId, VertexId};

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3,
    half_edge: Option<HalfEdgeId>,
    offspring: Option<VertexId>,
}

impl Vertex {
    /// Most recently attached half-edge ending at this vertex.
    #[must_use]
    pub fn half_edge(&self) -> Option<HalfEdgeId> {
        self.half_edge
    }

    /// Cached extrusion target, if one was generated and not cleared.
    #[must_use]
    pub fn offspring(&self) -> Option<VertexId> {
        self.offspring
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfEdge {
    vertex: VertexId,
    next: Option<HalfEdgeId>,
    previous: Option<HalfEdgeId>,
    pair: Option<HalfEdgeId>,
    face_pair: Option<HalfEdgeId>,
    face: Option<FaceId>,
    side_offspring: Option<FaceId>,
}

impl HalfEdge {
    /// Destination vertex.
    #[must_use]
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    #[must_use]
    pub fn next(&self) -> Option<HalfEdgeId> {
        self.next
    }

    #[must_use]
    pub fn previous(&self) -> Option<HalfEdgeId> {
        self.previous
    }

    /// Opposing half-edge on the adjacent face; `None` for a naked edge.
    #[must_use]
    pub fn pair(&self) -> Option<HalfEdgeId> {
        self.pair
    }

    /// Coincident half-edge on a linked face of a neighbouring cell.
    #[must_use]
    pub fn face_pair(&self) -> Option<HalfEdgeId> {
        self.face_pair
    }

    #[must_use]
    pub fn face(&self) -> Option<FaceId> {
        self.face
    }

    /// Side face built on this edge by the last extrusion.
    #[must_use]
    pub fn side_offspring(&self) -> Option<FaceId> {
        self.side_offspring
    }

    #[must_use]
    pub fn is_naked(&self) -> bool {
        self.pair.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    edges: Vec<HalfEdgeId>,
    neighbour: Option<FaceId>,
    cell: Option<CellId>,
    offspring: Option<FaceId>,
}

impl Face {
    /// Boundary loop; `edges[i].next == edges[(i + 1) % n]`.
    #[must_use]
    pub fn edges(&self) -> &[HalfEdgeId] {
        &self.edges
    }

    /// Linked face of an adjacent cell. A face with a neighbour is internal.
    #[must_use]
    pub fn neighbour(&self) -> Option<FaceId> {
        self.neighbour
    }

    #[must_use]
    pub fn cell(&self) -> Option<CellId> {
        self.cell
    }

    /// Top face produced by a split-off extrusion of this face.
    #[must_use]
    pub fn offspring(&self) -> Option<FaceId> {
        self.offspring
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub(crate) faces: Vec<FaceId>,
}

impl Cell {
    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }
}

/// Owner of all vertices, half-edges, faces and cells.
#[derive(Debug, Clone, Default)]
pub struct VolumetricMesh {
    vertices: Vec<Vertex>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    cells: Vec<Cell>,
}

impl VolumetricMesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Arena access
    // ─────────────────────────────────────────────────────────────────────────

    /// # Panics
    ///
    /// Panics if `id` was not issued by this mesh.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this mesh; see [`half_edge_or_err`](Self::half_edge_or_err).
    #[must_use]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id.index()]
    }

    pub fn half_edge_or_err(&self, id: HalfEdgeId) -> Result<&HalfEdge, TopologyError> {
        self.half_edges.get(id.index()).ok_or(TopologyError::UnknownHalfEdge(id))
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this mesh; see [`face_or_err`](Self::face_or_err).
    #[must_use]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    pub fn face_or_err(&self, id: FaceId) -> Result<&Face, TopologyError> {
        self.faces.get(id.index()).ok_or(TopologyError::UnknownFace(id))
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    pub(crate) fn cell_or_err(&self, id: CellId) -> Result<&Cell, TopologyError> {
        self.cell(id).ok_or(TopologyError::UnknownCell(id))
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this mesh.
    #[must_use]
    pub fn position(&self, id: VertexId) -> Point3 {
        self.vertices[id.index()].position
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.cells.len()).map(CellId::new)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_vertex(&mut self, position: Point3) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex {
            position,
            half_edge: None,
            offspring: None,
        });
        id
    }

    /// New unlinked half-edge ending at `vertex`; becomes the vertex's half-edge.
    pub fn add_half_edge(&mut self, vertex: VertexId) -> HalfEdgeId {
        let id = HalfEdgeId::new(self.half_edges.len());
        self.half_edges.push(HalfEdge {
            vertex,
            next: None,
            previous: None,
            pair: None,
            face_pair: None,
            face: None,
            side_offspring: None,
        });
        self.vertices[vertex.index()].half_edge = Some(id);
        id
    }

    pub fn set_next(&mut self, edge: HalfEdgeId, next: HalfEdgeId) {
        self.half_edges[edge.index()].next = Some(next);
        self.half_edges[next.index()].previous = Some(edge);
    }

    /// Links each edge to the following one, the last back to the first.
    pub fn link_chain(&mut self, edges: &[HalfEdgeId]) {
        let n = edges.len();
        for i in 0..n {
            self.set_next(edges[i], edges[(i + 1) % n]);
        }
    }

    /// Builds a face over `edges`, linking them into a ring.
    pub fn add_face(&mut self, edges: Vec<HalfEdgeId>) -> FaceId {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::default());
        self.set_face_edges(id, edges);
        id
    }

    /// Replaces a face's boundary loop, keeping its cell, neighbour and offspring.
    pub(crate) fn set_face_edges(&mut self, face: FaceId, edges: Vec<HalfEdgeId>) {
        self.link_chain(&edges);
        for &edge in &edges {
            self.half_edges[edge.index()].face = Some(face);
        }
        self.faces[face.index()].edges = edges;
    }

    pub fn add_cell(&mut self, faces: Vec<FaceId>) -> CellId {
        let id = CellId::new(self.cells.len());
        for &face in &faces {
            self.faces[face.index()].cell = Some(id);
        }
        self.cells.push(Cell { faces });
        id
    }

    pub(crate) fn set_cell_faces(&mut self, cell: CellId, faces: Vec<FaceId>) {
        for &face in &faces {
            self.faces[face.index()].cell = Some(cell);
        }
        self.cells[cell.index()].faces = faces;
    }

    /// Keeps only the listed cells, in the given order. Faces of dropped cells stay
    /// in the arena without an owning cell.
    pub fn retain_cells(&mut self, keep: &[CellId]) -> Result<(), TopologyError> {
        for &id in keep {
            self.cell_or_err(id)?;
        }
        let old = std::mem::take(&mut self.cells);
        for face in &mut self.faces {
            face.cell = None;
        }
        for &id in keep {
            let faces = old[id.index()].faces.clone();
            self.add_cell(faces);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pairing
    // ─────────────────────────────────────────────────────────────────────────

    /// Pairs `a` and `b`. Returns the previous pair of `a`, which can only be `b`
    /// itself; pairing an edge that already has another partner is an error.
    pub fn set_pair(
        &mut self,
        a: HalfEdgeId,
        b: HalfEdgeId,
    ) -> Result<Option<HalfEdgeId>, TopologyError> {
        self.half_edge_or_err(b)?;
        let previous = self.half_edge_or_err(a)?.pair;
        if let Some(existing) = previous.filter(|&p| p != b) {
            return Err(TopologyError::AlreadyPaired { edge: a, existing });
        }
        if let Some(existing) = self.half_edges[b.index()].pair.filter(|&p| p != a) {
            return Err(TopologyError::AlreadyPaired { edge: b, existing });
        }
        self.link_pair(a, b);
        Ok(previous)
    }

    /// Pairs `a` and `b`, unpairing any previous partners so no one-sided pair is
    /// left behind. Returns the previous pair of `a`.
    pub fn repair_pair(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> Option<HalfEdgeId> {
        let previous = self.unpair(a);
        if let Some(orphan) = self.unpair(b) {
            log::debug!("repair_pair: {orphan} lost its pair {b}");
        }
        self.link_pair(a, b);
        previous
    }

    /// Removes the pairing of `edge` on both sides. Returns the old partner.
    pub fn unpair(&mut self, edge: HalfEdgeId) -> Option<HalfEdgeId> {
        let partner = self.half_edges[edge.index()].pair.take()?;
        let back = &mut self.half_edges[partner.index()].pair;
        if *back == Some(edge) {
            *back = None;
        }
        Some(partner)
    }

    pub(crate) fn link_pair(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edges[a.index()].pair = Some(b);
        self.half_edges[b.index()].pair = Some(a);
    }

    /// New half-edge running opposite to `edge` (ending at its start vertex),
    /// paired with it. The new edge is not yet part of a face.
    pub fn construct_pair(&mut self, edge: HalfEdgeId) -> Result<HalfEdgeId, TopologyError> {
        if let Some(existing) = self.half_edge_or_err(edge)?.pair {
            return Err(TopologyError::AlreadyPaired { edge, existing });
        }
        let start = self.edge_start(edge)?;
        let pair = self.add_half_edge(start);
        self.link_pair(edge, pair);
        Ok(pair)
    }

    /// Records `a` and `b` as coincident faces of neighbouring cells and links
    /// their matching half-edges as face-pairs.
    pub fn link_faces(&mut self, a: FaceId, b: FaceId) -> Result<(), TopologyError> {
        self.face_or_err(b)?;
        let mut matches = Vec::with_capacity(self.face_or_err(a)?.edges.len());
        for &ea in &self.faces[a.index()].edges {
            let key_a = (self.edge_start(ea)?, self.half_edges[ea.index()].vertex);
            for &eb in &self.faces[b.index()].edges {
                let key_b = (self.edge_start(eb)?, self.half_edges[eb.index()].vertex);
                if key_a == key_b || key_a == (key_b.1, key_b.0) {
                    matches.push((ea, eb));
                }
            }
        }
        self.faces[a.index()].neighbour = Some(b);
        self.faces[b.index()].neighbour = Some(a);
        for (ea, eb) in matches {
            self.half_edges[ea.index()].face_pair = Some(eb);
            self.half_edges[eb.index()].face_pair = Some(ea);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Offspring caches
    // ─────────────────────────────────────────────────────────────────────────

    /// Cached offspring of `vertex`, or a new vertex at
    /// `position + normal * height` where the normal averages the faces of
    /// `scope` that touch the vertex.
    pub fn generate_offspring(
        &mut self,
        vertex: VertexId,
        height: f64,
        scope: &[FaceId],
    ) -> Result<VertexId, TopologyError> {
        if let Some(existing) = self.vertices[vertex.index()].offspring {
            return Ok(existing);
        }
        let target = self.offspring_position(vertex, height, scope)?;
        let offspring = self.add_vertex(target);
        self.set_vertex_offspring(vertex, offspring);
        Ok(offspring)
    }

    pub(crate) fn set_vertex_offspring(&mut self, vertex: VertexId, offspring: VertexId) {
        self.vertices[vertex.index()].offspring = Some(offspring);
    }

    pub(crate) fn offspring_position(
        &self,
        vertex: VertexId,
        height: f64,
        scope: &[FaceId],
    ) -> Result<Point3, TopologyError> {
        let normal = self
            .vertex_normal(vertex, scope)?
            .ok_or(TopologyError::NoVertexNormal { vertex })?;
        Ok(self.position(vertex) + normal * height)
    }

    pub fn clear_offspring(&mut self, vertex: VertexId) {
        self.vertices[vertex.index()].offspring = None;
    }

    /// Forgets the top face and the per-edge side faces of the last extrusion.
    pub fn clear_face_offspring(&mut self, face: FaceId) {
        self.faces[face.index()].offspring = None;
        for i in 0..self.faces[face.index()].edges.len() {
            let edge = self.faces[face.index()].edges[i];
            self.half_edges[edge.index()].side_offspring = None;
        }
    }

    /// Drops every cached vertex and face offspring so the mesh can be
    /// extruded again from its current state.
    pub fn clear_all_offspring(&mut self) {
        for v in 0..self.vertices.len() {
            self.clear_offspring(VertexId::new(v));
        }
        for f in 0..self.faces.len() {
            self.clear_face_offspring(FaceId::new(f));
        }
    }

    pub(crate) fn set_face_offspring(&mut self, face: FaceId, offspring: FaceId) {
        self.faces[face.index()].offspring = Some(offspring);
    }

    pub(crate) fn set_side_offspring(&mut self, edge: HalfEdgeId, side: FaceId) {
        self.half_edges[edge.index()].side_offspring = Some(side);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edge geometry
    // ─────────────────────────────────────────────────────────────────────────

    fn link(
        &self,
        edge: HalfEdgeId,
        link: AdjacencyLink,
    ) -> Result<HalfEdgeId, MissingAdjacencyError> {
        let he = &self.half_edges[edge.index()];
        let target = match link {
            AdjacencyLink::Previous => he.previous,
            AdjacencyLink::Next => he.next,
        };
        target.ok_or(MissingAdjacencyError { edge, link })
    }

    /// Start vertex, i.e. the vertex of the previous half-edge.
    pub fn edge_start(&self, edge: HalfEdgeId) -> Result<VertexId, MissingAdjacencyError> {
        let previous = self.link(edge, AdjacencyLink::Previous)?;
        Ok(self.half_edges[previous.index()].vertex)
    }

    pub fn edge_line(&self, edge: HalfEdgeId) -> Result<[Point3; 2], MissingAdjacencyError> {
        let start = self.edge_start(edge)?;
        let end = self.half_edges[edge.index()].vertex;
        Ok([self.position(start), self.position(end)])
    }

    /// Unnormalized `end - start`.
    pub fn edge_direction(&self, edge: HalfEdgeId) -> Result<Vec3, MissingAdjacencyError> {
        let [start, end] = self.edge_line(edge)?;
        Ok(end - start)
    }

    /// Points at a quarter and three quarters along the edge that follows `edge`,
    /// used for corner-cut face outlines.
    pub fn edge_quarter_points(
        &self,
        edge: HalfEdgeId,
    ) -> Result<[Point3; 2], MissingAdjacencyError> {
        let next = self.link(edge, AdjacencyLink::Next)?;
        let from = self.position(self.half_edges[edge.index()].vertex);
        let to = self.position(self.half_edges[next.index()].vertex);
        Ok([from.lerp(to, 0.25), from.lerp(to, 0.75)])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Face and vertex geometry
    // ─────────────────────────────────────────────────────────────────────────

    /// Unit normal, or `None` for faces with fewer than three edges or with all
    /// edge directions parallel to the first.
    pub fn face_normal(&self, face: FaceId) -> Result<Option<Vec3>, MissingAdjacencyError> {
        let edges = &self.faces[face.index()].edges;
        if edges.len() < 3 {
            return Ok(None);
        }
        let d0 = self.edge_direction(edges[0])?;
        for &edge in &edges[1..] {
            let cross = self.edge_direction(edge)?.cross(d0);
            if cross.length() > 1e-5 {
                return Ok(cross.normalized());
            }
        }
        Ok(None)
    }

    /// Average of the face's vertex positions.
    #[must_use]
    pub fn face_center(&self, face: FaceId) -> Option<Point3> {
        Point3::centroid(&self.face_positions(face))
    }

    #[must_use]
    pub fn face_vertices(&self, face: FaceId) -> Vec<VertexId> {
        self.faces[face.index()]
            .edges
            .iter()
            .map(|e| self.half_edges[e.index()].vertex)
            .collect()
    }

    #[must_use]
    pub fn face_positions(&self, face: FaceId) -> Vec<Point3> {
        self.face_vertices(face)
            .into_iter()
            .map(|v| self.position(v))
            .collect()
    }

    /// Normalized sum of the normals of the `scope` faces that contain `vertex`.
    pub fn vertex_normal(
        &self,
        vertex: VertexId,
        scope: &[FaceId],
    ) -> Result<Option<Vec3>, MissingAdjacencyError> {
        let mut sum = Vec3::ZERO;
        for &face in scope {
            let touches = self.faces[face.index()]
                .edges
                .iter()
                .any(|e| self.half_edges[e.index()].vertex == vertex);
            if !touches {
                continue;
            }
            if let Some(normal) = self.face_normal(face)? {
                sum += normal;
            }
        }
        Ok(sum.normalized())
    }
}
