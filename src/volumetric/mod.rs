//! Volumetric half-edge kernel: vertices, half-edges, faces and cells stored in
//! arenas of one [`VolumetricMesh`], with face extrusion, ring closing and
//! dual-graph queries.

mod builders;
mod error;
mod extrude;
mod index;
mod mesh;
mod query;

pub use error::{AdjacencyLink, EdgeMeshError, MissingAdjacencyError, TopologyError};
pub use extrude::FaceExtrusion;
pub use index::{CellId, FaceId, HalfEdgeId, VertexId};
pub use mesh::{Cell, Face, HalfEdge, Vertex, VolumetricMesh};
pub use query::EDGE_TUBE_OPTIONS;

#[cfg(test)]
mod tests;
