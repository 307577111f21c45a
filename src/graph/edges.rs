//! Ongerichte randen bovenop gerichte (half-)randen.

use std::collections::HashMap;
use std::hash::Hash;

use crate::geom::Vec2;

/// Ongerichte rand tussen twee knopen. `v0` is altijd de kleinste sleutel; `items`
/// bevat de gerichte randen die deze verbinding realiseren (één of twee bij een
/// nette half-edge structuur).
#[derive(Debug, Clone, PartialEq)]
pub struct UndirectedEdge<K, E> {
    pub v0: K,
    pub v1: K,
    pub items: Vec<E>,
}

impl<K: Copy + PartialEq, E> UndirectedEdge<K, E> {
    /// Geeft de andere knoop van de rand terug, of `None` als `node` er niet op ligt.
    #[must_use]
    pub fn other(&self, node: K) -> Option<K> {
        if node == self.v0 {
            Some(self.v1)
        } else if node == self.v1 {
            Some(self.v0)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, node: K) -> bool {
        node == self.v0 || node == self.v1
    }

    /// Een "naakte" rand wordt door precies één gerichte rand gerealiseerd.
    #[must_use]
    pub fn is_naked(&self) -> bool {
        self.items.len() == 1
    }
}

/// Map van ongeordende knoopparen naar [`UndirectedEdge`]. De volgorde van
/// invoegen blijft behouden zodat tracering deterministisch is.
#[derive(Debug, Clone)]
pub struct UndirectedEdgeMap<K, E> {
    edges: Vec<UndirectedEdge<K, E>>,
    index: HashMap<(K, K), usize>,
}

impl<K, E> Default for UndirectedEdgeMap<K, E> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Ord, E> UndirectedEdgeMap<K, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bouwt de map uit gerichte randen `(van, naar, item)`.
    pub fn from_directed(directed: impl IntoIterator<Item = (K, K, E)>) -> Self {
        let mut map = Self::new();
        for (a, b, item) in directed {
            map.insert(a, b, item);
        }
        map
    }

    /// Voeg een gerichte rand toe; paren met dezelfde eindpunten worden samengevoegd.
    /// Geeft de index van de ongerichte rand terug.
    pub fn insert(&mut self, a: K, b: K, item: E) -> usize {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&idx) = self.index.get(&key) {
            self.edges[idx].items.push(item);
            return idx;
        }
        let idx = self.edges.len();
        self.edges.push(UndirectedEdge {
            v0: key.0,
            v1: key.1,
            items: vec![item],
        });
        self.index.insert(key, idx);
        idx
    }

    #[must_use]
    pub fn get(&self, a: K, b: K) -> Option<&UndirectedEdge<K, E>> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.index.get(&key).map(|&idx| &self.edges[idx])
    }

    #[must_use]
    pub fn edges(&self) -> &[UndirectedEdge<K, E>] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Aantal verschillende knopen dat door de randen wordt geraakt.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut nodes: Vec<K> = self.edges.iter().flat_map(|e| [e.v0, e.v1]).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes.len()
    }

    /// Randen die door precies één gerichte rand gerealiseerd worden.
    pub fn naked_edges(&self) -> impl Iterator<Item = &UndirectedEdge<K, E>> {
        self.edges.iter().filter(|edge| edge.is_naked())
    }
}

/// Herkomst van een rand in [`UndirectedEdgeMap::from_polygons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonEdge {
    pub polygon: usize,
    pub position: usize,
}

impl<K: Copy + Eq + Hash + Ord> UndirectedEdgeMap<K, PolygonEdge> {
    /// Randen van een reeks polygonen. Bij `closed` wordt ook de rand van het laatste
    /// naar het eerste punt toegevoegd.
    #[must_use]
    pub fn from_polygons(polygons: &[Vec<K>], closed: bool) -> Self {
        let mut map = Self::new();
        for (polygon, nodes) in polygons.iter().enumerate() {
            let n = nodes.len();
            if n < 2 {
                continue;
            }
            let count = if closed && n > 2 { n } else { n - 1 };
            for position in 0..count {
                map.insert(
                    nodes[position],
                    nodes[(position + 1) % n],
                    PolygonEdge { polygon, position },
                );
            }
        }
        map
    }
}

/// Knoopsleutel voor geometrische knopen: coördinaten afgerond op zes decimalen.
pub type PositionKey = (i64, i64);

#[must_use]
pub fn position_key(v: Vec2) -> PositionKey {
    ((v.x * 1e6).round() as i64, (v.y * 1e6).round() as i64)
}

/// Vertaalt losse segmenten (bijvoorbeeld de randen van een groei-simulatie) naar
/// een ongerichte graaf; samenvallende eindpunten worden dezelfde knoop. Het item
/// is de index van het segment.
#[must_use]
pub fn growth_edges_to_graph(segments: &[[Vec2; 2]]) -> UndirectedEdgeMap<PositionKey, usize> {
    UndirectedEdgeMap::from_directed(
        segments
            .iter()
            .enumerate()
            .map(|(i, [a, b])| (position_key(*a), position_key(*b), i)),
    )
}
