//! Graaf-utilities voor randverzamelingen: ongerichte randen en ketentracering.
//!
//! De half-edge kern gebruikt deze module om een verzameling randen na extrusie
//! te ordenen tot één gesloten ring.

pub mod chains;
pub mod edges;

pub use chains::{
    ChainError, EdgeChain, find_all_chains_of_dual_degree_nodes, find_chains_with_limit,
    is_single_chain,
};
pub use edges::{
    PolygonEdge, PositionKey, UndirectedEdge, UndirectedEdgeMap, growth_edges_to_graph,
    position_key,
};
