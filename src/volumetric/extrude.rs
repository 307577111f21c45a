//! Face extrusion, cell expansion and ring closing.

use std::collections::HashSet;

use crate::graph::{UndirectedEdgeMap, find_all_chains_of_dual_degree_nodes};

use super::error::TopologyError;
use super::mesh::VolumetricMesh;
use super::{CellId, FaceId, HalfEdgeId, VertexId};

/// Faces produced by one [`VolumetricMesh::extrude_face`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceExtrusion {
    /// One quad per boundary edge, in boundary order.
    pub sides: Vec<FaceId>,
    /// Closing face over the side tops. Without a split this is the extruded face itself.
    pub top: FaceId,
    /// Closing face over the side bottoms, only for split-off extrusions.
    pub bottom: Option<FaceId>,
    /// Cell holding the split-off solid.
    pub cell: Option<CellId>,
}

impl FaceExtrusion {
    /// Sides, then top, then bottom.
    #[must_use]
    pub fn faces(&self) -> Vec<FaceId> {
        let mut faces = self.sides.clone();
        faces.push(self.top);
        faces.extend(self.bottom);
        faces
    }
}

impl VolumetricMesh {
    /// Extrudes `face` along its vertices' offspring.
    ///
    /// Missing offspring are generated from the face's own normal. With
    /// `split_off_cell` the side quads, a top and a bottom cap form a new cell
    /// and the original face stays where it is; `link_face` then records the
    /// bottom cap and the original face as neighbours. Without a split the
    /// side quads are built on the original boundary edges, the face itself is
    /// moved up as the top, and the owning cell's face list is updated.
    pub fn extrude_face(
        &mut self,
        face: FaceId,
        height: f64,
        split_off_cell: bool,
        link_face: bool,
    ) -> Result<FaceExtrusion, TopologyError> {
        self.check_extrudable(face)?;
        let mut targets = Vec::new();
        for v in self.face_vertices(face) {
            if self.vertex(v).offspring().is_none() {
                targets.push((v, self.offspring_position(v, height, &[face])?));
            }
        }
        for (v, target) in targets {
            let offspring = self.add_vertex(target);
            self.set_vertex_offspring(v, offspring);
        }
        self.extrude_prepared(face, split_off_cell, link_face)
    }

    /// Generates offspring for every vertex of `cell` once (normals averaged over
    /// the cell's faces), then extrudes the faces at `face_indices`, or all faces
    /// when the list is empty. Returns `cell` followed by every split-off cell.
    pub fn extrude_upwards(
        &mut self,
        cell: CellId,
        face_indices: &[usize],
        height: f64,
        split_off_cell: bool,
        link_faces: bool,
    ) -> Result<Vec<CellId>, TopologyError> {
        let cell_faces = self.cell_or_err(cell)?.faces().to_vec();

        let mut indices: Vec<usize> = if face_indices.is_empty() {
            (0..cell_faces.len()).collect()
        } else {
            face_indices.to_vec()
        };
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        for &index in &indices {
            let Some(&face) = cell_faces.get(index) else {
                return Err(TopologyError::FaceIndexOutOfRange {
                    cell,
                    index,
                    len: cell_faces.len(),
                });
            };
            self.check_extrudable(face)?;
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for &face in &cell_faces {
            for v in self.face_vertices(face) {
                if seen.insert(v) && self.vertex(v).offspring().is_none() {
                    targets.push((v, self.offspring_position(v, height, &cell_faces)?));
                }
            }
        }
        for (v, target) in targets {
            let offspring = self.add_vertex(target);
            self.set_vertex_offspring(v, offspring);
        }

        let mut cells = vec![cell];
        for index in indices {
            let extrusion = self.extrude_prepared(cell_faces[index], split_off_cell, link_faces)?;
            cells.extend(extrusion.cell);
        }
        // split-off cells were created from the highest index down
        cells[1..].reverse();

        log::debug!(
            "extrude_upwards {cell}: {} cell(s), {} faces in arena",
            cells.len(),
            self.face_count()
        );
        Ok(cells)
    }

    /// Closes a ring of half-edges with a new face of paired, reversed edges.
    ///
    /// The input must trace exactly one loop with consistent orientation; it is
    /// ordered by chain tracing, so the edges may be given in any order. The new
    /// ring starts with the pair of `edges[0]`. With `reuse` the ring replaces the
    /// boundary of that face instead of creating a new one.
    pub fn construct_closing_face_from_edges(
        &mut self,
        edges: &[HalfEdgeId],
        reuse: Option<FaceId>,
    ) -> Result<FaceId, TopologyError> {
        let ordered = self.order_ring(edges)?;

        let pairs: Vec<HalfEdgeId> = ordered
            .iter()
            .map(|&edge| self.construct_pair(edge))
            .collect::<Result<_, _>>()?;
        let mut ring = Vec::with_capacity(pairs.len());
        ring.push(pairs[0]);
        ring.extend(pairs[1..].iter().rev());

        let face = match reuse {
            Some(face) => {
                self.set_face_edges(face, ring);
                face
            }
            None => self.add_face(ring),
        };
        Ok(face)
    }

    /// Validates a closing ring and returns it in traversal order starting at
    /// `edges[0]`, without touching the mesh.
    fn order_ring(&self, edges: &[HalfEdgeId]) -> Result<Vec<HalfEdgeId>, TopologyError> {
        if edges.len() < 3 {
            return Err(TopologyError::RingTooShort { count: edges.len() });
        }

        let mut map: UndirectedEdgeMap<VertexId, HalfEdgeId> = UndirectedEdgeMap::new();
        for &edge in edges {
            if let Some(existing) = self.half_edge(edge).pair() {
                return Err(TopologyError::AlreadyPaired { edge, existing });
            }
            map.insert(self.edge_start(edge)?, self.half_edge(edge).vertex(), edge);
        }

        let chains = find_all_chains_of_dual_degree_nodes(&map)?;
        let is_loop = chains.first().is_some_and(|c| c.is_loop);
        if chains.len() != 1 || !is_loop || map.len() != edges.len() {
            return Err(TopologyError::MalformedRing {
                chains: chains.len(),
                is_loop,
            });
        }

        let mut ordered: Vec<HalfEdgeId> = chains[0]
            .edges
            .iter()
            .map(|&i| map.edges()[i].items[0])
            .collect();

        let forward = self.first_misdirected(&ordered)?;
        if forward.is_some() {
            ordered.reverse();
            if let Some(edge) = self.first_misdirected(&ordered)? {
                return Err(TopologyError::MixedRingOrientation { edge });
            }
        }

        if let Some(start) = ordered.iter().position(|&e| e == edges[0]) {
            ordered.rotate_left(start);
        }
        Ok(ordered)
    }

    /// First edge whose successor in `ring` does not start where it ends.
    fn first_misdirected(
        &self,
        ring: &[HalfEdgeId],
    ) -> Result<Option<HalfEdgeId>, TopologyError> {
        let n = ring.len();
        for i in 0..n {
            let following = ring[(i + 1) % n];
            if self.edge_start(following)? != self.half_edge(ring[i]).vertex() {
                return Ok(Some(ring[i]));
            }
        }
        Ok(None)
    }

    fn check_extrudable(&self, face: FaceId) -> Result<(), TopologyError> {
        let data = self.face_or_err(face)?;
        if data.neighbour().is_some() {
            return Err(TopologyError::FaceNotExtrudable { face });
        }
        if data.offspring().is_some() {
            return Err(TopologyError::AlreadyExtruded { face });
        }
        let edges = data.edges();
        if edges.len() < 3 {
            return Err(TopologyError::RingTooShort { count: edges.len() });
        }
        let mut seen = HashSet::new();
        for &edge in edges {
            self.edge_start(edge)?;
            self.edge_quarter_points(edge)?;
            if !seen.insert(self.half_edge(edge).vertex()) {
                return Err(TopologyError::RepeatedVertex { face });
            }
        }
        Ok(())
    }

    /// Extrusion body; every vertex of `face` already has an offspring.
    fn extrude_prepared(
        &mut self,
        face: FaceId,
        split_off_cell: bool,
        link_face: bool,
    ) -> Result<FaceExtrusion, TopologyError> {
        let ring = self.face(face).edges().to_vec();
        let n = ring.len();
        let mut corners = Vec::with_capacity(n);
        for &edge in &ring {
            let a = self.edge_start(edge)?;
            let b = self.half_edge(edge).vertex();
            let lift = |v: VertexId| self.vertex(v).offspring().unwrap_or(v);
            corners.push((a, b, lift(a), lift(b)));
        }

        let mut sides = Vec::with_capacity(n);
        let mut tops = Vec::with_capacity(n);
        let mut bottoms = Vec::with_capacity(n);
        let mut verticals = Vec::with_capacity(n);

        for (i, &(a, b, a_top, b_top)) in corners.iter().enumerate() {
            let side = if split_off_cell {
                let bottom = self.add_half_edge(a);
                let up = self.add_half_edge(a_top);
                let top = self.add_half_edge(b_top);
                let down = self.add_half_edge(b);
                bottoms.push(bottom);
                tops.push(top);
                verticals.push((up, down));
                self.add_face(vec![bottom, up, top, down])
            } else {
                let up = self.add_half_edge(b_top);
                let top = self.add_half_edge(a_top);
                let down = self.add_half_edge(a);
                tops.push(top);
                verticals.push((down, up));
                self.add_face(vec![ring[i], up, top, down])
            };
            self.set_side_offspring(ring[i], side);
            sides.push(side);
        }

        // the closing vertical of side i meets the opening vertical of side i + 1
        for i in 0..n {
            let (_, closing) = verticals[i];
            let (opening, _) = verticals[(i + 1) % n];
            self.link_pair(closing, opening);
        }

        if !split_off_cell {
            let top = self.construct_closing_face_from_edges(&tops, Some(face))?;
            if let Some(cell) = self.face(face).cell() {
                let mut faces = self.cell_or_err(cell)?.faces().to_vec();
                if let Some(position) = faces.iter().position(|&f| f == face) {
                    faces.splice(position..=position, sides.iter().copied().chain([face]));
                }
                self.set_cell_faces(cell, faces);
            }
            return Ok(FaceExtrusion {
                sides,
                top,
                bottom: None,
                cell: None,
            });
        }

        let top = self.construct_closing_face_from_edges(&tops, None)?;
        let bottom = self.construct_closing_face_from_edges(&bottoms, None)?;
        self.set_face_offspring(face, top);
        if link_face {
            self.link_faces(bottom, face)?;
        }

        let mut faces = sides.clone();
        faces.push(top);
        faces.push(bottom);
        let cell = self.add_cell(faces);

        Ok(FaceExtrusion {
            sides,
            top,
            bottom: Some(bottom),
            cell: Some(cell),
        })
    }
}
