use std::collections::HashMap;

use serde::Serialize;

use super::diagnostics::GeomMeshDiagnostics;
use super::{Point3, Vec3};

/// Triangulated render mesh with optional per-vertex attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
        }
    }

    #[must_use]
    pub fn with_attributes(
        positions: Vec<[f64; 3]>,
        indices: Vec<u32>,
        uvs: Option<Vec<[f64; 2]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            positions,
            indices,
            uvs,
            normals,
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polygon meshes (triangle-or-quad output contract)
// ─────────────────────────────────────────────────────────────────────────────

/// One face of a [`PolyMesh`]; serializes as a plain index array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PolyFace {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl PolyFace {
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        match self {
            Self::Triangle(tri) => tri,
            Self::Quad(quad) => quad,
        }
    }

    /// Same corners, opposite winding.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Triangle([a, b, c]) => Self::Triangle([c, b, a]),
            Self::Quad([a, b, c, d]) => Self::Quad([d, c, b, a]),
        }
    }

    /// Quads split as `[0,1,2]` and `[0,2,3]`.
    #[must_use]
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        match *self {
            Self::Triangle(tri) => vec![tri],
            Self::Quad([a, b, c, d]) => vec![[a, b, c], [a, c, d]],
        }
    }

    fn offset(self, by: u32) -> Self {
        match self {
            Self::Triangle([a, b, c]) => Self::Triangle([a + by, b + by, c + by]),
            Self::Quad([a, b, c, d]) => Self::Quad([a + by, b + by, c + by, d + by]),
        }
    }
}

/// Positions plus triangle/quad faces, as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PolyMesh {
    pub positions: Vec<[f64; 3]>,
    pub faces: Vec<PolyFace>,
}

impl PolyMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, faces: Vec<PolyFace>) -> Self {
        Self { positions, faces }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len() as u32;
        self.faces
            .iter()
            .all(|face| face.indices().iter().all(|&i| i < n))
    }

    /// Flips the winding of every face in place.
    pub fn invert_faces(&mut self) {
        for face in &mut self.faces {
            *face = face.inverted();
        }
    }

    /// Appends another mesh, shifting its indices past the current vertex pool.
    pub fn append(&mut self, other: &PolyMesh) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.faces
            .extend(other.faces.iter().map(|face| face.offset(offset)));
    }

    /// Triangulated copy with area-weighted smooth normals.
    #[must_use]
    pub fn to_geom_mesh(&self) -> GeomMesh {
        let indices: Vec<u32> = self
            .faces
            .iter()
            .flat_map(PolyFace::triangles)
            .flatten()
            .collect();
        let normals = compute_smooth_normals(&self.positions, &indices);
        GeomMesh::with_attributes(self.positions.clone(), indices, None, Some(normals))
    }

    #[must_use]
    pub fn diagnostics(&self) -> GeomMeshDiagnostics {
        face_diagnostics(self.positions.len(), self.faces.iter().map(PolyFace::indices))
    }

    /// Single triangle in the XY plane.
    #[must_use]
    pub fn example_triangle() -> Self {
        Self::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![PolyFace::Triangle([0, 1, 2])],
        )
    }

    /// Unit square in the XY plane.
    #[must_use]
    pub fn example_quad() -> Self {
        Self::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![PolyFace::Quad([0, 1, 2, 3])],
        )
    }

    /// Unit cube with outward, counter-clockwise quads.
    #[must_use]
    pub fn example_cube() -> Self {
        Self::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            vec![
                PolyFace::Quad([0, 3, 2, 1]),
                PolyFace::Quad([4, 5, 6, 7]),
                PolyFace::Quad([0, 1, 5, 4]),
                PolyFace::Quad([1, 2, 6, 5]),
                PolyFace::Quad([2, 3, 7, 6]),
                PolyFace::Quad([3, 0, 4, 7]),
            ],
        )
    }
}

/// Builds diagnostics for an arbitrary polygon index list.
pub(crate) fn face_diagnostics<'a>(
    vertex_count: usize,
    faces: impl Iterator<Item = &'a [u32]> + Clone,
) -> GeomMeshDiagnostics {
    let mut diagnostics = GeomMeshDiagnostics {
        vertex_count,
        ..GeomMeshDiagnostics::default()
    };

    for face in faces.clone() {
        match face.len() {
            3 => diagnostics.triangle_count += 1,
            4 => diagnostics.quad_count += 1,
            _ => {}
        }
        let mut corners = face.to_vec();
        corners.sort_unstable();
        corners.dedup();
        if corners.len() < face.len() {
            diagnostics.degenerate_face_count += 1;
        }
    }

    let (open, non_manifold) = count_edge_topology(faces);
    diagnostics.open_edge_count = open;
    diagnostics.non_manifold_edge_count = non_manifold;
    diagnostics
}

/// Counts open (one face) and non-manifold (three or more faces) undirected edges.
pub(crate) fn count_edge_topology<'a>(faces: impl Iterator<Item = &'a [u32]>) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for face in faces {
        let n = face.len();
        for i in 0..n {
            let (ea, eb) = (face[i], face[(i + 1) % n]);
            if ea == eb {
                continue;
            }
            let key = if ea <= eb { (ea, eb) } else { (eb, ea) };
            *edge_counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut open_edge_count = 0usize;
    let mut non_manifold_edge_count = 0usize;
    for count in edge_counts.into_values() {
        if count == 1 {
            open_edge_count += 1;
        } else if count > 2 {
            non_manifold_edge_count += 1;
        }
    }

    (open_edge_count, non_manifold_edge_count)
}

pub(crate) fn compute_smooth_normals(positions: &[[f64; 3]], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(a), Some(b), Some(c)) = (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };
        let (a, b, c) = (Point3::from(*a), Point3::from(*b), Point3::from(*c));
        let n = (b - a).cross(c - a);
        sums[i0] += n;
        sums[i1] += n;
        sums[i2] += n;
    }

    sums.into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Z).to_array())
        .collect()
}
