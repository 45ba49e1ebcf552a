//! Whole-graph analytics: all-pairs distances and minimum spanning forests.
//!
//! Both are pure functions of a [`Graph`] and ignore drone range.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::{Edge, Graph, VertexId};

/// Shortest distances between every ordered pair of vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    vertices: Vec<VertexId>,
    #[serde(skip)]
    index: HashMap<VertexId, usize>,
    /// `f64::INFINITY` marks unreachable pairs.
    distances: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Vertices in row/column order (ascending identity).
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Shortest distance from `source` to `target`.
    ///
    /// `None` when either vertex is unknown or `target` is unreachable.
    pub fn distance(&self, source: &str, target: &str) -> Option<f64> {
        let row = *self.index.get(source)?;
        let column = *self.index.get(target)?;
        let distance = self.distances[row][column];
        distance.is_finite().then_some(distance)
    }

    /// Largest finite distance between two vertices; `0.0` for graphs with
    /// fewer than two mutually reachable vertices.
    pub fn diameter(&self) -> f64 {
        self.distances
            .iter()
            .flatten()
            .copied()
            .filter(|distance| distance.is_finite())
            .fold(0.0, f64::max)
    }

    /// Closeness centrality of `vertex`: reachable vertices divided by the sum
    /// of distances to them. Isolated vertices score `0.0`.
    pub fn closeness_centrality(&self, vertex: &str) -> Option<f64> {
        let row = *self.index.get(vertex)?;
        let (reachable, total) = self.distances[row]
            .iter()
            .enumerate()
            .filter(|(column, distance)| *column != row && distance.is_finite())
            .fold((0usize, 0.0), |(count, sum), (_, distance)| {
                (count + 1, sum + distance)
            });

        if reachable == 0 || total == 0.0 {
            return Some(0.0);
        }
        Some(reachable as f64 / total)
    }
}

/// Floyd-Warshall relaxation over every vertex triple. `O(V³)`.
pub fn all_pairs_shortest_paths(graph: &Graph) -> DistanceMatrix {
    let vertices: Vec<VertexId> = graph
        .vertices()
        .into_iter()
        .map(|vertex| vertex.id().clone())
        .collect();
    let index: HashMap<VertexId, usize> = vertices
        .iter()
        .enumerate()
        .map(|(position, id)| (id.clone(), position))
        .collect();

    let n = vertices.len();
    let mut distances = vec![vec![f64::INFINITY; n]; n];
    for (row, id) in vertices.iter().enumerate() {
        distances[row][row] = 0.0;
        for (target, weight) in graph.neighbours(id) {
            let Some(&column) = index.get(target) else {
                continue;
            };
            if weight < distances[row][column] {
                distances[row][column] = weight;
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            let through = distances[i][k];
            if !through.is_finite() {
                continue;
            }
            for j in 0..n {
                let candidate = through + distances[k][j];
                if candidate < distances[i][j] {
                    distances[i][j] = candidate;
                }
            }
        }
    }

    tracing::debug!(vertices = n, "computed all-pairs distances");
    DistanceMatrix {
        vertices,
        index,
        distances,
    }
}

/// Minimum spanning forest: one tree per connected component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningForest {
    pub edges: Vec<Edge>,
    pub total_weight: f64,
    /// Number of trees in the forest.
    pub components: usize,
}

impl SpanningForest {
    /// `true` when the forest is a single tree covering every vertex.
    pub fn is_spanning_tree(&self) -> bool {
        self.components <= 1
    }
}

/// Kruskal's algorithm. Directed edges are treated as undirected.
///
/// Edges are taken by ascending weight, then by endpoint identity, so the
/// result is deterministic when weights tie.
pub fn minimum_spanning_tree(graph: &Graph) -> SpanningForest {
    let vertices = graph.vertices();
    let index: HashMap<&VertexId, usize> = vertices
        .iter()
        .enumerate()
        .map(|(position, vertex)| (vertex.id(), position))
        .collect();

    let mut candidates = graph.edges();
    candidates.sort_by(|a, b| {
        a.weight
            .total_cmp(&b.weight)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });

    let mut sets = UnionFind::new(vertices.len());
    let mut edges = Vec::new();
    let mut total_weight = 0.0;
    for edge in candidates {
        let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        if sets.union(a, b) {
            total_weight += edge.weight;
            edges.push(edge);
        }
    }

    SpanningForest {
        components: vertices.len() - edges.len(),
        edges,
        total_weight,
    }
}

/// Disjoint sets with path compression and union by rank.
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, item: usize) -> usize {
        let mut root = item;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = item;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`; `false` when already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        match self.rank[a].cmp(&self.rank[b]) {
            std::cmp::Ordering::Less => self.parent[a] = b,
            std::cmp::Ordering::Greater => self.parent[b] = a,
            std::cmp::Ordering::Equal => {
                self.parent[b] = a;
                self.rank[a] += 1;
            }
        }
        true
    }
}
