//! Error types for the volumetric kernel.

use std::fmt;

use thiserror::Error;

use super::{CellId, FaceId, HalfEdgeId, VertexId};
use crate::geom::SweepError;
use crate::graph::ChainError;

/// The link a query needed but the half-edge does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacencyLink {
    Previous,
    Next,
}

impl fmt::Display for AdjacencyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Previous => "previous",
            Self::Next => "next",
        })
    }
}

/// A direction, line or normal was requested on a half-edge outside a complete ring.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("half-edge {edge} has no {link} link")]
pub struct MissingAdjacencyError {
    pub edge: HalfEdgeId,
    pub link: AdjacencyLink,
}

/// Errors raised by topological operations. A failed operation leaves the mesh unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("half-edge {edge} is already paired with {existing}")]
    AlreadyPaired {
        edge: HalfEdgeId,
        existing: HalfEdgeId,
    },

    #[error(transparent)]
    MissingAdjacency(#[from] MissingAdjacencyError),

    #[error("closing ring must trace exactly one loop, found {chains} chain(s) (loop: {is_loop})")]
    MalformedRing { chains: usize, is_loop: bool },

    #[error("closing ring has inconsistent edge orientation at {edge}")]
    MixedRingOrientation { edge: HalfEdgeId },

    #[error("closing ring needs at least three edges, got {count}")]
    RingTooShort { count: usize },

    #[error("inconsistent edge graph: {0}")]
    Chain(#[from] ChainError),

    #[error("face {face} already has a neighbour and is not extrudable")]
    FaceNotExtrudable { face: FaceId },

    #[error("face {face} already has an extrusion offspring; clear it first")]
    AlreadyExtruded { face: FaceId },

    #[error("face {face} is degenerate and has no normal")]
    DegenerateFace { face: FaceId },

    #[error("vertex {vertex} has no usable normal for its offspring")]
    NoVertexNormal { vertex: VertexId },

    #[error("face {face} repeats a vertex in its boundary ring")]
    RepeatedVertex { face: FaceId },

    #[error("face index {index} out of range for cell {cell} with {len} faces")]
    FaceIndexOutOfRange {
        cell: CellId,
        index: usize,
        len: usize,
    },

    #[error("unknown cell {0}")]
    UnknownCell(CellId),

    #[error("unknown face {0}")]
    UnknownFace(FaceId),

    #[error("unknown half-edge {0}")]
    UnknownHalfEdge(HalfEdgeId),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

/// Failure while turning face outlines into tube meshes.
#[derive(Error, Debug, PartialEq)]
pub enum EdgeMeshError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Sweep(#[from] SweepError),
}
