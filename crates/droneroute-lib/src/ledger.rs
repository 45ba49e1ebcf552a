//! History of flown routes and the analytics derived from it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Client, Order, OrderStatus};
use crate::error::{Error, Result};
use crate::frequency::RouteFrequencyTree;
use crate::graph::VertexId;
use crate::hash_index::{HashIndex, HashIndexConfig};
use crate::routing::Route;

/// Delimiter between vertex identities in a canonical route key.
pub const ROUTE_KEY_SEPARATOR: &str = " -> ";

/// Join the vertex identities of a path into its frequency key.
///
/// ```
/// use droneroute_lib::{canonical_route_key, VertexId};
///
/// let path = [VertexId::new("N1"), VertexId::new("N4"), VertexId::new("N9")];
/// assert_eq!(canonical_route_key(&path), "N1 -> N4 -> N9");
/// ```
pub fn canonical_route_key<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(ROUTE_KEY_SEPARATOR)
}

/// A flown route with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    route: Route,
    key: String,
    recorded_at: DateTime<Utc>,
}

impl RouteRecord {
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Canonical route key used by the frequency tree.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Visit counts split by the position a vertex held in each route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeVisitBreakdown {
    pub origins: Vec<(VertexId, u64)>,
    pub destinations: Vec<(VertexId, u64)>,
    pub intermediates: Vec<(VertexId, u64)>,
}

/// Aggregate outcome of the orders tracked by a ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliverySummary {
    pub total_orders: usize,
    pub delivered: usize,
    pub failed: usize,
    pub pending: usize,
    pub routes_recorded: usize,
    pub total_cost: f64,
    pub total_recharge_stops: usize,
}

impl DeliverySummary {
    /// Share of orders delivered, in percent. Zero when there are no orders.
    pub fn delivery_rate(&self) -> f64 {
        if self.total_orders == 0 {
            0.0
        } else {
            self.delivered as f64 * 100.0 / self.total_orders as f64
        }
    }
}

/// Records every flown route and keeps the indexes used for analytics.
///
/// All queries are read-only projections; only `record*`, `register_*` and
/// `reset` mutate the ledger.
#[derive(Debug, Clone)]
pub struct RouteLedger {
    history: Vec<RouteRecord>,
    frequencies: RouteFrequencyTree,
    visits: HashIndex<VertexId, u64>,
    clients: HashIndex<String, Client>,
    orders: HashIndex<String, Order>,
}

impl Default for RouteLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteLedger {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            frequencies: RouteFrequencyTree::new(),
            visits: HashIndex::new(),
            clients: HashIndex::new(),
            orders: HashIndex::new(),
        }
    }

    /// Create a ledger whose indexes use a custom sizing policy.
    pub fn with_index_config(config: HashIndexConfig) -> Result<Self> {
        Ok(Self {
            history: Vec::new(),
            frequencies: RouteFrequencyTree::new(),
            visits: HashIndex::with_config(config)?,
            clients: HashIndex::with_config(config)?,
            orders: HashIndex::with_config(config)?,
        })
    }

    /// Append a flown route, bump its frequency and every visited vertex.
    pub fn record(&mut self, route: Route) -> &RouteRecord {
        let key = route.canonical_key();
        self.frequencies.insert(key.clone());
        for vertex in route.path() {
            match self.visits.get_mut(vertex) {
                Some(count) => *count += 1,
                None => {
                    self.visits.put(vertex.clone(), 1);
                }
            }
        }

        tracing::trace!(route = %key, "route recorded");
        self.history.push(RouteRecord {
            route,
            key,
            recorded_at: Utc::now(),
        });
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[RouteRecord] {
        &self.history
    }

    pub fn route_count(&self) -> usize {
        self.history.len()
    }

    pub fn frequency_tree(&self) -> &RouteFrequencyTree {
        &self.frequencies
    }

    pub fn visits(&self) -> &HashIndex<VertexId, u64> {
        &self.visits
    }

    pub fn visit_count(&self, vertex: &str) -> u64 {
        self.visits.get(vertex).copied().unwrap_or(0)
    }

    /// The `k` most flown routes, ties broken by ascending key.
    pub fn top_routes(&self, k: usize) -> Vec<(String, u64)> {
        self.frequencies.top_k(k)
    }

    /// The `k` most visited vertices, ties broken by ascending identity.
    pub fn top_visited_nodes(&self, k: usize) -> Vec<(VertexId, u64)> {
        let mut visits: Vec<(VertexId, u64)> = self
            .visits
            .iter()
            .map(|(vertex, count)| (vertex.clone(), *count))
            .collect();
        sort_counts(&mut visits);
        visits.truncate(k);
        visits
    }

    /// Visit counts split into route origins, destinations and pass-through vertices.
    pub fn node_visit_breakdown(&self) -> NodeVisitBreakdown {
        let mut origins: BTreeMap<VertexId, u64> = BTreeMap::new();
        let mut destinations: BTreeMap<VertexId, u64> = BTreeMap::new();
        let mut intermediates: BTreeMap<VertexId, u64> = BTreeMap::new();

        for record in &self.history {
            let path = record.route.path();
            *origins.entry(record.route.origin().clone()).or_default() += 1;
            *destinations
                .entry(record.route.destination().clone())
                .or_default() += 1;
            if path.len() > 2 {
                for vertex in &path[1..path.len() - 1] {
                    *intermediates.entry(vertex.clone()).or_default() += 1;
                }
            }
        }

        let ranked = |counts: BTreeMap<VertexId, u64>| {
            let mut counts: Vec<_> = counts.into_iter().collect();
            sort_counts(&mut counts);
            counts
        };
        NodeVisitBreakdown {
            origins: ranked(origins),
            destinations: ranked(destinations),
            intermediates: ranked(intermediates),
        }
    }

    /// Register or replace a client, returning the replaced entry.
    ///
    /// A replacement keeps the order count of the client it replaces, since
    /// that count belongs to the orders already in the ledger.
    pub fn register_client(&mut self, mut client: Client) -> Option<Client> {
        if let Some(existing) = self.clients.get(&client.id) {
            client.total_orders = existing.total_orders;
        }
        self.clients.put(client.id.clone(), client)
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Registered clients ordered by identifier.
    pub fn clients(&self) -> Vec<&Client> {
        let mut clients: Vec<&Client> = self.clients.values().collect();
        clients.sort_by(|a, b| a.id.cmp(&b.id));
        clients
    }

    /// Register an order for an already registered client and count it
    /// against that client. Re-registering an order id replaces the entry
    /// without counting it twice.
    pub fn register_order(&mut self, order: Order) -> Result<()> {
        let Some(client) = self.clients.get_mut(&order.client_id) else {
            return Err(Error::UnknownClient {
                id: order.client_id,
            });
        };
        if !self.orders.contains_key(&order.id) {
            client.total_orders += 1;
        }
        self.orders.put(order.id.clone(), order);
        Ok(())
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Registered orders ordered by identifier.
    pub fn orders(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        orders
    }

    /// Mark an order delivered over `route` and record the route.
    pub fn record_delivery(&mut self, order_id: &str, route: Route) -> Result<&RouteRecord> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| Error::UnknownOrder {
                id: order_id.to_string(),
            })?;
        order.mark_delivered(route.total_cost());
        Ok(self.record(route))
    }

    /// Mark an order as failed. No route is recorded.
    pub fn record_failure(&mut self, order_id: &str) -> Result<()> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| Error::UnknownOrder {
                id: order_id.to_string(),
            })?;
        order.mark_failed();
        Ok(())
    }

    /// Orders placed per client, most active first, ties by client id.
    /// Clients without orders are left out.
    pub fn client_order_counts(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .clients
            .values()
            .filter(|client| client.total_orders > 0)
            .map(|client| (client.id.clone(), client.total_orders))
            .collect();
        sort_counts(&mut counts);
        counts
    }

    /// Delivered orders, most expensive first, ties by order id.
    pub fn order_by_cost(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| order.status == OrderStatus::Delivered)
            .collect();
        orders.sort_by(|a, b| {
            b.total_cost
                .total_cmp(&a.total_cost)
                .then_with(|| a.id.cmp(&b.id))
        });
        orders
    }

    pub fn delivery_summary(&self) -> DeliverySummary {
        let mut summary = DeliverySummary {
            total_orders: self.orders.len(),
            routes_recorded: self.history.len(),
            total_recharge_stops: self
                .history
                .iter()
                .map(|record| record.route.recharge_stops().len())
                .sum(),
            ..DeliverySummary::default()
        };

        for order in self.orders.values() {
            match order.status {
                OrderStatus::Delivered => {
                    summary.delivered += 1;
                    summary.total_cost += order.total_cost;
                }
                OrderStatus::Failed => summary.failed += 1,
                OrderStatus::Pending => summary.pending += 1,
            }
        }
        summary
    }

    /// Drop all history, counters and registrations.
    pub fn reset(&mut self) {
        self.history.clear();
        self.frequencies = RouteFrequencyTree::new();
        self.visits.clear();
        self.clients.clear();
        self.orders.clear();
    }
}

fn sort_counts<K: Ord>(counts: &mut [(K, u64)]) {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_is_deterministic() {
        let a = canonical_route_key(&["N1", "N2"]);
        let b = canonical_route_key(&[VertexId::new("N1"), VertexId::new("N2")]);
        assert_eq!(a, b);
        assert_eq!(a, "N1 -> N2");
    }

    #[test]
    fn canonical_key_of_single_vertex() {
        assert_eq!(canonical_route_key(&["N3"]), "N3");
    }

    #[test]
    fn empty_ledger_summary() {
        let ledger = RouteLedger::new();
        let summary = ledger.delivery_summary();
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.delivery_rate(), 0.0);
        assert!(ledger.top_routes(5).is_empty());
        assert!(ledger.top_visited_nodes(5).is_empty());
    }
}
