//! Mesh diagnostics returned next to every mesh the builders produce.
//!
//! Diagnostics describe the face layout and the edge topology of the emitted
//! index buffer, and carry human-readable warnings about recoverable input
//! problems (degenerate sweep segments, tangent reversals, doubled loft rows).
//!
//! # Example
//!
//! ```ignore
//! use babsrects_engine::geom::{sweep_polyline, SweepOptions};
//!
//! let (mesh, diagnostics) = sweep_polyline(&points, SweepOptions::default())?;
//! if !diagnostics.is_watertight() {
//!     println!("tube has {} open edges", diagnostics.open_edge_count);
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Counts and warnings collected while building a mesh.
///
/// - `open_edge_count`: edges used by exactly one face (tube ends, loft borders)
/// - `non_manifold_edge_count`: edges shared by more than two faces
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct GeomMeshDiagnostics {
    /// Total number of vertices in the emitted mesh.
    pub vertex_count: usize,

    /// Number of triangle faces.
    pub triangle_count: usize,

    /// Number of quad faces.
    pub quad_count: usize,

    /// Faces skipped or flagged because two of their corners coincide.
    pub degenerate_face_count: usize,

    pub open_edge_count: usize,

    pub non_manifold_edge_count: usize,

    /// Human-readable warnings about input repairs.
    ///
    /// Examples:
    /// - "segment 3 has zero length; reusing neighbouring tangent"
    /// - "tangent reversal at sample 7; width scale capped at 1"
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if every edge is shared by two faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.triangle_count + self.quad_count
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Sums counts and appends warnings, used when several meshes are exported together.
    pub fn merge(&mut self, other: &GeomMeshDiagnostics) {
        self.vertex_count += other.vertex_count;
        self.triangle_count += other.triangle_count;
        self.quad_count += other.quad_count;
        self.degenerate_face_count += other.degenerate_face_count;
        self.open_edge_count += other.open_edge_count;
        self.non_manifold_edge_count += other.non_manifold_edge_count;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Short summary for logging: `"V:{vertices} T:{triangles} Q:{quads} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} Q:{}",
            self.vertex_count, self.triangle_count, self.quad_count
        )];

        if self.degenerate_face_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_face_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings:{}", self.warnings.len()));
        }

        parts.join(" ")
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_only_present_issues() {
        let mut diagnostics = GeomMeshDiagnostics {
            vertex_count: 8,
            quad_count: 6,
            ..GeomMeshDiagnostics::default()
        };
        assert_eq!(diagnostics.summary(), "V:8 T:0 Q:6");

        diagnostics.open_edge_count = 4;
        diagnostics.add_warning("ring 2 collapsed");
        assert_eq!(diagnostics.to_string(), "V:8 T:0 Q:6 open:4 warnings:1");
        assert!(!diagnostics.is_watertight());
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = GeomMeshDiagnostics {
            vertex_count: 3,
            triangle_count: 1,
            ..GeomMeshDiagnostics::default()
        };
        let b = GeomMeshDiagnostics {
            vertex_count: 4,
            quad_count: 1,
            warnings: vec!["x".to_string()],
            ..GeomMeshDiagnostics::default()
        };
        a.merge(&b);
        assert_eq!(a.vertex_count, 7);
        assert_eq!(a.face_count(), 2);
        assert_eq!(a.warnings.len(), 1);
    }
}
