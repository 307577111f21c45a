//! Plain-text OBJ and ASCII STL serialization of one or more meshes.
//!
//! Meshes are first merged into an [`ExportData`] pool: each mesh's indices are
//! shifted by the number of vertices already emitted, so faces from different
//! meshes never share vertices.

use std::fmt::{self, Write as _};

use serde::Serialize;

use super::Vec3;
use super::mesh::{GeomMesh, PolyFace, PolyMesh};
use super::sweep::SweepMesh;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("face {face} references vertex {index}, but only {vertex_count} exist")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("failed to format export text")]
    Format(#[from] fmt::Error),
}

/// Shared vertex pool with per-vertex UVs and normals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportData {
    pub positions: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    pub normals: Vec<[f64; 3]>,
    pub faces: Vec<PolyFace>,
}

impl ExportData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_sweeps(meshes: &[SweepMesh]) -> Self {
        let mut data = Self::new();
        for mesh in meshes {
            data.push_sweep(mesh);
        }
        data
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn offset(&self) -> u32 {
        self.positions.len() as u32
    }

    fn push_faces(&mut self, offset: u32, faces: impl IntoIterator<Item = PolyFace>) {
        self.faces.extend(faces.into_iter().map(|face| match face {
            PolyFace::Triangle([a, b, c]) => PolyFace::Triangle([a + offset, b + offset, c + offset]),
            PolyFace::Quad([a, b, c, d]) => {
                PolyFace::Quad([a + offset, b + offset, c + offset, d + offset])
            }
        }));
    }

    pub fn push_sweep(&mut self, mesh: &SweepMesh) {
        let offset = self.offset();
        self.positions.extend_from_slice(&mesh.positions);
        self.uvs.extend_from_slice(&mesh.uvs);
        self.normals.extend_from_slice(&mesh.normals);
        self.push_faces(offset, mesh.faces.iter().copied());
    }

    /// Adds a polygon mesh with smooth vertex normals and zero UVs.
    pub fn push_poly(&mut self, mesh: &PolyMesh) {
        let offset = self.offset();
        let render = mesh.to_geom_mesh();
        self.positions.extend_from_slice(&mesh.positions);
        self.uvs.resize(self.positions.len(), [0.0, 0.0]);
        match render.normals {
            Some(normals) if normals.len() == mesh.positions.len() => self.normals.extend(normals),
            _ => self.normals.resize(self.positions.len(), [0.0, 0.0, 0.0]),
        }
        self.push_faces(offset, mesh.faces.iter().copied());
    }

    pub fn push_geom(&mut self, mesh: &GeomMesh) {
        let offset = self.offset();
        let count = mesh.positions.len();
        self.positions.extend_from_slice(&mesh.positions);
        match &mesh.uvs {
            Some(uvs) if uvs.len() == count => self.uvs.extend_from_slice(uvs),
            _ => self.uvs.resize(self.positions.len(), [0.0, 0.0]),
        }
        match &mesh.normals {
            Some(normals) if normals.len() == count => self.normals.extend_from_slice(normals),
            _ => self.normals.resize(self.positions.len(), [0.0, 0.0, 0.0]),
        }
        self.push_faces(
            offset,
            mesh.indices
                .chunks_exact(3)
                .map(|t| PolyFace::Triangle([t[0], t[1], t[2]])),
        );
    }

    fn check(&self) -> Result<(), ExportError> {
        if self.faces.is_empty() {
            return Err(ExportError::Empty);
        }
        let vertex_count = self.positions.len();
        for (face, poly) in self.faces.iter().enumerate() {
            if let Some(&index) = poly.indices().iter().find(|&&i| i as usize >= vertex_count) {
                return Err(ExportError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Wavefront OBJ: `v`, `vt` and `vn` blocks followed by `f a/a/a ...`
    /// lines with 1-based indices.
    pub fn write_obj(&self, name: &str) -> Result<String, ExportError> {
        self.check()?;
        let mut out = String::new();
        writeln!(out, "# babsrects export")?;
        writeln!(out, "o {name}")?;
        for p in &self.positions {
            writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
        }
        for uv in &self.uvs {
            writeln!(out, "vt {} {}", uv[0], uv[1])?;
        }
        for n in &self.normals {
            writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for face in &self.faces {
            out.push('f');
            for &i in face.indices() {
                let index = i + 1;
                write!(out, " {index}/{index}/{index}")?;
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// ASCII STL. Quads keep all four corners in one facet; the facet normal
    /// comes from the first three corners.
    pub fn write_stl(&self, name: &str) -> Result<String, ExportError> {
        self.check()?;
        let mut out = String::new();
        writeln!(out, "solid {name}")?;
        for face in &self.faces {
            let corners: Vec<Vec3> = face
                .indices()
                .iter()
                .map(|&i| Vec3::from(self.positions[i as usize]))
                .collect();
            let normal = (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .normalized()
                .unwrap_or(Vec3::ZERO);
            writeln!(out, "facet normal {} {} {}", normal.x, normal.y, normal.z)?;
            writeln!(out, "outer loop")?;
            for c in &corners {
                writeln!(out, "vertex {} {} {}", c.x, c.y, c.z)?;
            }
            writeln!(out, "endloop")?;
            writeln!(out, "endfacet")?;
        }
        writeln!(out, "endsolid {name}")?;
        Ok(out)
    }
}
