//! Ketens van knopen met graad twee.
//!
//! Een keten is een maximaal pad waarvan elke binnenknoop precies twee randen
//! heeft. Knopen met een andere graad zijn eindpunten. Een keten waarvan alle
//! knopen graad twee hebben is een lus (een cyclus-component).

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::edges::UndirectedEdgeMap;

/// Resultaat van de tracering: randindices in volgorde en de knopen ertussen.
///
/// Voor een open keten geldt `nodes.len() == edges.len() + 1`; voor een lus
/// wordt de startknoop niet herhaald en geldt `nodes.len() == edges.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeChain<K> {
    pub edges: Vec<usize>,
    pub nodes: Vec<K>,
    pub is_loop: bool,
}

impl<K: Copy + PartialEq> EdgeChain<K> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Een lus, of een open keten waarvan beide eindpunten op dezelfde
    /// vertakkingsknoop liggen.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_loop || (self.nodes.len() > 1 && self.nodes.first() == self.nodes.last())
    }
}

/// Fouttype voor ketentracering; wijst op een inconsistente randgraaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Meer stappen dan de opgegeven limiet.
    Runaway { limit: usize },
    /// Een rand werd tweemaal bereikt terwijl dat topologisch onmogelijk is.
    InconsistentAdjacency { edge: usize },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runaway { limit } => {
                write!(f, "ketentracering afgebroken na {limit} stappen")
            }
            Self::InconsistentAdjacency { edge } => {
                write!(f, "rand {edge} hoort al bij een andere keten")
            }
        }
    }
}

impl std::error::Error for ChainError {}

struct Tracer<'a, K> {
    incident: HashMap<K, Vec<usize>>,
    ends: Vec<(K, K)>,
    visited: &'a mut [bool],
    steps: usize,
    limit: usize,
}

impl<K: Copy + Eq + Hash> Tracer<'_, K> {
    fn degree(&self, node: K) -> usize {
        self.incident.get(&node).map_or(0, Vec::len)
    }

    /// Markeert `edge` als bezocht en telt de stap mee tegen de limiet.
    fn consume(&mut self, edge: usize) -> Result<(), ChainError> {
        self.steps += 1;
        if self.steps > self.limit {
            log::warn!("chain tracing exceeded {} steps", self.limit);
            return Err(ChainError::Runaway { limit: self.limit });
        }
        self.visited[edge] = true;
        Ok(())
    }

    fn other(&self, edge: usize, node: K) -> K {
        let (a, b) = self.ends[edge];
        if a == node { b } else { a }
    }

    /// Loopt vanaf `node` (bereikt via `from_edge`) door knopen met graad twee.
    /// Geeft `true` terug als de wandeling terugkomt bij `start`.
    fn walk(
        &mut self,
        start: usize,
        from_edge: usize,
        mut node: K,
        edges: &mut Vec<usize>,
        nodes: &mut Vec<K>,
    ) -> Result<bool, ChainError> {
        let mut current = from_edge;
        loop {
            if self.degree(node) != 2 {
                return Ok(false);
            }
            let incident = &self.incident[&node];
            let next = if incident[0] == current {
                incident[1]
            } else {
                incident[0]
            };
            if next == start {
                return Ok(true);
            }
            if self.visited[next] {
                return Err(ChainError::InconsistentAdjacency { edge: next });
            }
            self.consume(next)?;
            node = self.other(next, node);
            edges.push(next);
            nodes.push(node);
            current = next;
        }
    }
}

/// Verdeelt alle randen van de map in maximale ketens over knopen met graad twee.
///
/// Elke rand komt in precies één keten terecht. Een rand van een knoop naar
/// zichzelf vormt een eigen lus. Het aantal stappen is begrensd door het
/// aantal randen.
pub fn find_all_chains_of_dual_degree_nodes<K, E>(
    map: &UndirectedEdgeMap<K, E>,
) -> Result<Vec<EdgeChain<K>>, ChainError>
where
    K: Copy + Eq + Hash + Ord,
{
    find_chains_with_limit(map, map.len())
}

/// Als [`find_all_chains_of_dual_degree_nodes`], maar breekt af met
/// [`ChainError::Runaway`] zodra meer dan `max_steps` randen zijn doorlopen.
pub fn find_chains_with_limit<K, E>(
    map: &UndirectedEdgeMap<K, E>,
    max_steps: usize,
) -> Result<Vec<EdgeChain<K>>, ChainError>
where
    K: Copy + Eq + Hash + Ord,
{
    let all = map.edges();

    let mut incident: HashMap<K, Vec<usize>> = HashMap::new();
    for (i, edge) in all.iter().enumerate() {
        if edge.v0 == edge.v1 {
            continue;
        }
        incident.entry(edge.v0).or_default().push(i);
        incident.entry(edge.v1).or_default().push(i);
    }

    let mut visited = vec![false; all.len()];
    let mut tracer = Tracer {
        incident,
        ends: all.iter().map(|e| (e.v0, e.v1)).collect(),
        visited: &mut visited,
        steps: 0,
        limit: max_steps,
    };

    let mut chains = Vec::new();

    for start in 0..all.len() {
        if tracer.visited[start] {
            continue;
        }
        tracer.consume(start)?;

        let (v0, v1) = tracer.ends[start];
        if v0 == v1 {
            chains.push(EdgeChain {
                edges: vec![start],
                nodes: vec![v0],
                is_loop: true,
            });
            continue;
        }

        let mut forward_edges = vec![start];
        let mut forward_nodes = vec![v0, v1];
        if tracer.walk(start, start, v1, &mut forward_edges, &mut forward_nodes)? {
            forward_nodes.pop();
            chains.push(EdgeChain {
                edges: forward_edges,
                nodes: forward_nodes,
                is_loop: true,
            });
            continue;
        }

        let mut back_edges = Vec::new();
        let mut back_nodes = vec![v0];
        tracer.walk(start, start, v0, &mut back_edges, &mut back_nodes)?;
        back_edges.reverse();
        back_nodes.reverse();

        back_edges.extend(forward_edges);
        back_nodes.extend(forward_nodes.into_iter().skip(1));
        chains.push(EdgeChain {
            edges: back_edges,
            nodes: back_nodes,
            is_loop: false,
        });
    }

    Ok(chains)
}

/// `true` als alle randen samen precies één keten vormen.
pub fn is_single_chain<K, E>(map: &UndirectedEdgeMap<K, E>) -> Result<bool, ChainError>
where
    K: Copy + Eq + Hash + Ord,
{
    Ok(find_all_chains_of_dual_degree_nodes(map)?.len() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec2;
    use crate::graph::edges::{PolygonEdge, growth_edges_to_graph};

    fn map_of(pairs: &[(u32, u32)]) -> UndirectedEdgeMap<u32, usize> {
        UndirectedEdgeMap::from_directed(pairs.iter().enumerate().map(|(i, &(a, b))| (a, b, i)))
    }

    #[test]
    fn simple_cycle_is_one_loop() {
        let map = map_of(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 1);
        assert!(chains[0].is_loop);
        assert_eq!(chains[0].len(), 4);
        assert_eq!(chains[0].nodes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn open_path_is_traced_from_end_to_end() {
        let map = map_of(&[(1, 2), (0, 1), (2, 3)]);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 1);
        assert!(!chains[0].is_loop);
        assert_eq!(chains[0].nodes, vec![0, 1, 2, 3]);
        assert_eq!(chains[0].edges, vec![1, 0, 2]);
    }

    #[test]
    fn branch_nodes_split_chains() {
        // ster met drie armen van lengte twee
        let map = map_of(&[(0, 1), (1, 2), (0, 3), (3, 4), (0, 5), (5, 6)]);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 3);
        assert!(chains.iter().all(|c| c.len() == 2 && !c.is_loop));
    }

    #[test]
    fn complete_graph_yields_one_chain_per_edge() {
        let map = map_of(&[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 6);
        assert!(chains.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn tracing_stops_when_the_step_limit_is_exceeded() {
        let map = map_of(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        assert_eq!(
            find_chains_with_limit(&map, 3).map(|c| c.len()),
            Err(ChainError::Runaway { limit: 3 })
        );
        let chains = find_chains_with_limit(&map, 5).expect("ketens");
        assert_eq!(chains.len(), 1);
        assert!(chains[0].is_loop);
    }

    #[test]
    fn step_limit_counts_edges_across_all_chains() {
        // driehoek 0-1-2 met steel 0-3: vier randen in twee ketens
        let map = map_of(&[(0, 1), (1, 2), (2, 0), (0, 3)]);
        assert!(matches!(
            find_chains_with_limit(&map, 3),
            Err(ChainError::Runaway { limit: 3 })
        ));
        assert_eq!(find_chains_with_limit(&map, 4).map(|c| c.len()), Ok(2));
    }

    #[test]
    fn lollipop_loop_closes_on_branch_node() {
        // driehoek 0-1-2 met steel 0-3
        let map = map_of(&[(0, 1), (1, 2), (2, 0), (0, 3)]);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 2);
        let ring = chains.iter().find(|c| c.len() == 3).expect("ring");
        assert!(!ring.is_loop);
        assert!(ring.is_closed());
        assert_eq!(ring.nodes.first(), Some(&0));
        assert_eq!(ring.nodes.last(), Some(&0));
    }

    #[test]
    fn duplicate_directed_edges_share_one_undirected_edge() {
        let map = map_of(&[(0, 1), (1, 0), (1, 2)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.naked_edges().count(), 1);
        assert_eq!(map.get(1, 0).map(|e| e.items.len()), Some(2));
        assert!(is_single_chain(&map).expect("ketens"));
    }

    #[test]
    fn disjoint_cycles_are_separate_loops() {
        let map = map_of(&[(0, 1), (1, 2), (2, 0), (10, 11), (11, 12), (12, 10)]);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.is_loop));
        assert!(!is_single_chain(&map).expect("ketens"));
    }

    #[test]
    fn polygons_share_edges() {
        let polygons = vec![vec![0u32, 1, 2, 3], vec![1, 4, 5, 2]];
        let map = UndirectedEdgeMap::from_polygons(&polygons, true);
        assert_eq!(map.len(), 7);
        let shared = map.get(2, 1).expect("gedeelde rand");
        assert_eq!(
            shared.items,
            vec![
                PolygonEdge { polygon: 0, position: 1 },
                PolygonEdge { polygon: 1, position: 3 },
            ]
        );
        assert_eq!(map.naked_edges().count(), 6);
    }

    #[test]
    fn growth_segments_weld_by_position() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        let c = Vec2::new(0.0, 1.0);
        let nearly_a = Vec2::new(1e-9, -1e-9);
        let map = growth_edges_to_graph(&[[a, b], [b, c], [c, nearly_a]]);
        assert_eq!(map.node_count(), 3);
        let chains = find_all_chains_of_dual_degree_nodes(&map).expect("ketens");
        assert_eq!(chains.len(), 1);
        assert!(chains[0].is_loop);
    }
}
