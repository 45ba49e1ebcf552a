use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::{Graph, VertexId, VertexRole};

/// How the search moved into a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Traversed a graph edge of the recorded weight.
    Edge,
    /// Restored the remaining range at a waystation without moving.
    Recharge,
}

/// One settled state on the winning search path, origin first.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchStep {
    pub vertex: VertexId,
    /// Remaining range after entering the state; `None` for unconstrained searches.
    pub remaining: Option<f64>,
    /// `None` for the origin state.
    pub via: Option<Transition>,
    /// Edge weight for [`Transition::Edge`], zero otherwise.
    pub weight: f64,
}

/// Run Dijkstra over the expanded `(vertex, range_used)` state space.
///
/// `range_used` is the distance flown since departure or the last recharge.
/// Traversing an edge of weight `w` needs `used + w <= max_range`, summed in
/// flight order so the bound matches [`Route::verify`](crate::routing::Route::verify)
/// exactly. Settling a waystation state with range used also offers a
/// zero-cost recharge back to zero. The first popped state at `destination`
/// wins, regardless of the range left.
pub(crate) fn find_route_with_range(
    graph: &Graph,
    origin: &VertexId,
    destination: &VertexId,
    max_range: f64,
) -> Option<Vec<SearchStep>> {
    let start = StateKey::new(origin.clone(), 0.0);

    let mut best: HashMap<StateKey, Label> = HashMap::new();
    let mut parents: HashMap<StateKey, (StateKey, Transition, f64)> = HashMap::new();
    // Lowest range used settled per vertex. Pops are ordered by cost, so any
    // later state that has used at least as much is dominated.
    let mut settled_used: HashMap<VertexId, f64> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut expanded = 0usize;

    best.insert(start.clone(), Label::new(0.0, 0));
    queue.push(RangeEntry::new(start, Label::new(0.0, 0)));

    while let Some(entry) = queue.pop() {
        let RangeEntry { key, label } = entry;
        if best.get(&key).is_some_and(|known| *known < label) {
            continue;
        }

        let used = key.used();
        if settled_used
            .get(&key.vertex)
            .is_some_and(|settled| *settled <= used)
        {
            continue;
        }
        settled_used.insert(key.vertex.clone(), used);
        expanded += 1;

        if key.vertex == *destination {
            tracing::trace!(expanded, "range-constrained search reached destination");
            return Some(reconstruct_states(&parents, key, max_range));
        }

        for (next, weight) in graph.neighbours(&key.vertex) {
            let next_used = used + weight;
            if next_used > max_range {
                continue;
            }
            let next_key = StateKey::new(next.clone(), next_used);
            let next_label = Label::new(label.cost.0 + weight, label.recharges);
            relax(
                &mut best,
                &mut parents,
                &mut queue,
                (&key, Transition::Edge, weight),
                next_key,
                next_label,
            );
        }

        if used > 0.0 && graph.role(&key.vertex) == Some(VertexRole::Waystation) {
            let next_key = StateKey::new(key.vertex.clone(), 0.0);
            let next_label = Label::new(label.cost.0, label.recharges + 1);
            relax(
                &mut best,
                &mut parents,
                &mut queue,
                (&key, Transition::Recharge, 0.0),
                next_key,
                next_label,
            );
        }
    }

    tracing::trace!(expanded, "range-constrained search exhausted state space");
    None
}

/// Run Dijkstra's algorithm without any range limit.
pub(crate) fn find_route_dijkstra(
    graph: &Graph,
    origin: &VertexId,
    destination: &VertexId,
) -> Option<Vec<SearchStep>> {
    let mut distances: HashMap<VertexId, f64> = HashMap::new();
    let mut parents: HashMap<VertexId, (VertexId, f64)> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(origin.clone(), 0.0);
    queue.push(QueueEntry::new(origin.clone(), 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        if entry.node == *destination {
            return Some(reconstruct_path(&parents, origin, destination));
        }

        for (next, weight) in graph.neighbours(&entry.node) {
            let next_cost = current_distance + weight;
            if next_cost < *distances.get(next).unwrap_or(&f64::INFINITY) {
                distances.insert(next.clone(), next_cost);
                parents.insert(next.clone(), (entry.node.clone(), weight));
                queue.push(QueueEntry::new(next.clone(), next_cost));
            }
        }
    }

    None
}

fn relax(
    best: &mut HashMap<StateKey, Label>,
    parents: &mut HashMap<StateKey, (StateKey, Transition, f64)>,
    queue: &mut BinaryHeap<RangeEntry>,
    (from, via, weight): (&StateKey, Transition, f64),
    key: StateKey,
    label: Label,
) {
    if best.get(&key).is_some_and(|known| *known <= label) {
        return;
    }
    best.insert(key.clone(), label);
    parents.insert(key.clone(), (from.clone(), via, weight));
    queue.push(RangeEntry::new(key, label));
}

fn reconstruct_states(
    parents: &HashMap<StateKey, (StateKey, Transition, f64)>,
    goal: StateKey,
    max_range: f64,
) -> Vec<SearchStep> {
    let mut steps = Vec::new();
    let mut current = goal;
    loop {
        match parents.get(&current) {
            Some((parent, via, weight)) => {
                steps.push(SearchStep {
                    vertex: current.vertex.clone(),
                    remaining: Some(max_range - current.used()),
                    via: Some(*via),
                    weight: *weight,
                });
                current = parent.clone();
            }
            None => {
                steps.push(SearchStep {
                    remaining: Some(max_range - current.used()),
                    vertex: current.vertex,
                    via: None,
                    weight: 0.0,
                });
                break;
            }
        }
    }
    steps.reverse();
    steps
}

fn reconstruct_path(
    parents: &HashMap<VertexId, (VertexId, f64)>,
    origin: &VertexId,
    destination: &VertexId,
) -> Vec<SearchStep> {
    let mut steps = Vec::new();
    let mut current = destination.clone();
    while current != *origin {
        let Some((parent, weight)) = parents.get(&current) else {
            break;
        };
        steps.push(SearchStep {
            vertex: current,
            remaining: None,
            via: Some(Transition::Edge),
            weight: *weight,
        });
        current = parent.clone();
    }
    steps.push(SearchStep {
        vertex: current,
        remaining: None,
        via: None,
        weight: 0.0,
    });
    steps.reverse();
    steps
}

/// Search state identity: a vertex plus the exact range used since the last recharge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    vertex: VertexId,
    used_bits: u64,
}

impl StateKey {
    fn new(vertex: VertexId, used: f64) -> Self {
        // Fold -0.0 into 0.0 so both map to the same state.
        let used = if used == 0.0 { 0.0 } else { used };
        Self {
            vertex,
            used_bits: used.to_bits(),
        }
    }

    fn used(&self) -> f64 {
        f64::from_bits(self.used_bits)
    }
}

/// Cumulative cost with the number of recharges as tie-breaker, so equal-cost
/// alternatives without a recharge are preferred.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Label {
    cost: FloatOrd,
    recharges: u32,
}

impl Label {
    fn new(cost: f64, recharges: u32) -> Self {
        Self {
            cost: FloatOrd(cost),
            recharges,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct RangeEntry {
    key: StateKey,
    label: Label,
}

impl RangeEntry {
    fn new(key: StateKey, label: Label) -> Self {
        Self { key, label }
    }
}

impl Ord for RangeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by label.
        other
            .label
            .cmp(&self.label)
            .then_with(|| other.key.vertex.cmp(&self.key.vertex))
            .then_with(|| other.key.used_bits.cmp(&self.key.used_bits))
    }
}

impl PartialOrd for RangeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: VertexId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: VertexId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
