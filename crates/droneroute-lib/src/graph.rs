use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stable external identity of a vertex (for example `"N12"`).
///
/// Cloning is cheap, so routes and indexes keep their own copies instead of
/// borrowing from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(Arc<str>);

impl VertexId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for VertexId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VertexId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&VertexId> for VertexId {
    fn from(value: &VertexId) -> Self {
        value.clone()
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a vertex plays in the delivery network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexRole {
    /// Warehouse where deliveries originate.
    Depot,
    /// Charging point where the remaining range can be restored.
    Waystation,
    /// Client location that receives deliveries.
    Destination,
}

impl VertexRole {
    pub const ALL: [VertexRole; 3] = [
        VertexRole::Depot,
        VertexRole::Waystation,
        VertexRole::Destination,
    ];
}

impl fmt::Display for VertexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            VertexRole::Depot => "depot",
            VertexRole::Waystation => "waystation",
            VertexRole::Destination => "destination",
        };
        f.write_str(value)
    }
}

/// Informational geographic position of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Vertex stored in the graph. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vertex {
    id: VertexId,
    role: VertexRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<Coordinates>,
}

impl Vertex {
    pub fn id(&self) -> &VertexId {
        &self.id
    }

    pub fn role(&self) -> VertexRole {
        self.role
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}

/// Whether edges are one-way or stored symmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    Directed,
    #[default]
    Undirected,
}

/// Identity of an inserted edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeId {
    pub source: VertexId,
    pub target: VertexId,
}

/// Weighted edge as reported by [`Graph::edges`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub weight: f64,
}

/// Number of vertices per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub depots: usize,
    pub waystations: usize,
    pub destinations: usize,
}

impl RoleCounts {
    pub fn get(&self, role: VertexRole) -> usize {
        match role {
            VertexRole::Depot => self.depots,
            VertexRole::Waystation => self.waystations,
            VertexRole::Destination => self.destinations,
        }
    }

    pub fn total(&self) -> usize {
        self.depots + self.waystations + self.destinations
    }
}

type AdjacencyMap = HashMap<VertexId, BTreeMap<VertexId, f64>>;

/// Typed, weighted adjacency-map graph used by the routing engine.
///
/// Neighbour maps are ordered by vertex identity so traversal order, and
/// therefore tie-breaking during search, is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    kind: GraphKind,
    vertices: HashMap<VertexId, Vertex>,
    outgoing: AdjacencyMap,
    // Only populated for directed graphs; undirected edges live in `outgoing`
    // under both endpoints.
    incoming: AdjacencyMap,
    edge_count: usize,
}

impl Graph {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn undirected() -> Self {
        Self::new(GraphKind::Undirected)
    }

    pub fn directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == GraphKind::Directed
    }

    /// Insert a vertex with the given role and optional coordinates.
    pub fn add_vertex(
        &mut self,
        id: impl Into<VertexId>,
        role: VertexRole,
        coordinates: Option<Coordinates>,
    ) -> Result<VertexId> {
        let id = id.into();
        if self.vertices.contains_key(&id) {
            return Err(Error::DuplicateVertex { id });
        }

        self.vertices.insert(
            id.clone(),
            Vertex {
                id: id.clone(),
                role,
                coordinates,
            },
        );
        self.outgoing.insert(id.clone(), BTreeMap::new());
        if self.is_directed() {
            self.incoming.insert(id.clone(), BTreeMap::new());
        }
        Ok(id)
    }

    /// Insert a weighted edge between two existing vertices.
    ///
    /// For undirected graphs `(v, u)` is the same edge as `(u, v)`.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) -> Result<EdgeId> {
        let source = self.resolve(source)?;
        let target = self.resolve(target)?;

        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight {
                from: source,
                to: target,
                weight,
            });
        }

        if self.edge_weight(&source, &target).is_some() {
            return Err(Error::DuplicateEdge {
                from: source,
                to: target,
            });
        }

        self.adjacency_mut(&source).insert(target.clone(), weight);
        if self.is_directed() {
            self.incoming
                .entry(target.clone())
                .or_default()
                .insert(source.clone(), weight);
        } else {
            self.adjacency_mut(&target).insert(source.clone(), weight);
        }
        self.edge_count += 1;

        Ok(EdgeId { source, target })
    }

    /// Remove an edge and return its weight.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<f64> {
        let weight = self
            .outgoing
            .get_mut(source)
            .and_then(|edges| edges.remove(target))
            .ok_or_else(|| Error::UnknownEdge {
                from: VertexId::new(source),
                to: VertexId::new(target),
            })?;

        if self.is_directed() {
            if let Some(edges) = self.incoming.get_mut(target) {
                edges.remove(source);
            }
        } else if let Some(edges) = self.outgoing.get_mut(target) {
            edges.remove(source);
        }
        self.edge_count -= 1;

        Ok(weight)
    }

    /// Remove a vertex together with every incident edge.
    pub fn remove_vertex(&mut self, id: &str) -> Result<Vertex> {
        let vertex = self
            .vertices
            .remove(id)
            .ok_or_else(|| Error::UnknownVertex {
                id: VertexId::new(id),
            })?;

        let outgoing = self.outgoing.remove(id).unwrap_or_default();
        if self.is_directed() {
            let incoming = self.incoming.remove(id).unwrap_or_default();
            for target in outgoing.keys() {
                if let Some(edges) = self.incoming.get_mut(target) {
                    edges.remove(id);
                }
            }
            for source in incoming.keys() {
                if let Some(edges) = self.outgoing.get_mut(source) {
                    edges.remove(id);
                }
            }
            // A self-loop shows up in both maps but is a single edge.
            let self_loop = usize::from(outgoing.contains_key(id));
            self.edge_count -= outgoing.len() + incoming.len() - self_loop;
        } else {
            for neighbour in outgoing.keys() {
                if let Some(edges) = self.outgoing.get_mut(neighbour) {
                    edges.remove(id);
                }
            }
            self.edge_count -= outgoing.len();
        }

        Ok(vertex)
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn role(&self, id: &str) -> Option<VertexRole> {
        self.vertices.get(id).map(Vertex::role)
    }

    /// All vertices, ordered by identity.
    pub fn vertices(&self) -> Vec<&Vertex> {
        let mut vertices: Vec<&Vertex> = self.vertices.values().collect();
        vertices.sort_by(|a, b| a.id.cmp(&b.id));
        vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Every edge once, ordered by source then target. Undirected edges are
    /// reported with the lexicographically smaller endpoint as source.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for vertex in self.vertices() {
            for (target, weight) in self.neighbours(&vertex.id) {
                if !self.is_directed() && *target < vertex.id {
                    continue;
                }
                edges.push(Edge {
                    source: vertex.id.clone(),
                    target: target.clone(),
                    weight,
                });
            }
        }
        edges
    }

    /// Outgoing neighbours of `id` with edge weights, ordered by identity.
    /// Unknown vertices have no neighbours.
    pub fn neighbours<'a>(&'a self, id: &str) -> impl Iterator<Item = (&'a VertexId, f64)> + 'a {
        self.outgoing
            .get(id)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(target, weight)| (target, *weight)))
    }

    /// Incoming neighbours of `id`. Same as [`Graph::neighbours`] for undirected graphs.
    pub fn predecessors<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = (&'a VertexId, f64)> + 'a {
        let map = if self.is_directed() {
            &self.incoming
        } else {
            &self.outgoing
        };
        map.get(id)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(source, weight)| (source, *weight)))
    }

    pub fn edge_weight(&self, source: &str, target: &str) -> Option<f64> {
        self.outgoing
            .get(source)
            .and_then(|edges| edges.get(target))
            .copied()
    }

    /// Number of outgoing edges of a vertex.
    pub fn degree(&self, id: &str) -> usize {
        self.outgoing.get(id).map(BTreeMap::len).unwrap_or(0)
    }

    /// Vertices with the given role, ordered by identity.
    pub fn vertices_by_role(&self, role: VertexRole) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = self
            .vertices
            .values()
            .filter(|vertex| vertex.role == role)
            .map(|vertex| vertex.id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn role_counts(&self) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for vertex in self.vertices.values() {
            match vertex.role {
                VertexRole::Depot => counts.depots += 1,
                VertexRole::Waystation => counts.waystations += 1,
                VertexRole::Destination => counts.destinations += 1,
            }
        }
        counts
    }

    /// Breadth-first connectivity check from an arbitrary vertex.
    ///
    /// Directed graphs are checked for weak connectivity. An empty graph is
    /// considered connected.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.vertices.keys().next() else {
            return true;
        };
        self.reachable_from(start).len() == self.vertices.len()
    }

    /// Vertex sets of every (weakly) connected component. Components and their
    /// members are ordered by identity.
    pub fn connected_components(&self) -> Vec<Vec<VertexId>> {
        let mut seen: HashSet<VertexId> = HashSet::new();
        let mut components = Vec::new();

        for vertex in self.vertices() {
            if seen.contains(&vertex.id) {
                continue;
            }
            let mut component: Vec<VertexId> =
                self.reachable_from(&vertex.id).into_iter().collect();
            component.sort();
            seen.extend(component.iter().cloned());
            components.push(component);
        }

        components
    }

    fn reachable_from(&self, start: &VertexId) -> HashSet<VertexId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start.clone());

        while let Some(current) = queue.pop_front() {
            let successors = self.neighbours(&current);
            let predecessors = self
                .is_directed()
                .then(|| self.predecessors(&current))
                .into_iter()
                .flatten();
            for (next, _) in successors.chain(predecessors) {
                if visited.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }

        visited
    }

    fn resolve(&self, id: &str) -> Result<VertexId> {
        self.vertices
            .get_key_value(id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| Error::UnknownVertex {
                id: VertexId::new(id),
            })
    }

    fn adjacency_mut(&mut self, id: &VertexId) -> &mut BTreeMap<VertexId, f64> {
        self.outgoing.entry(id.clone()).or_default()
    }
}
