//! A delivery scenario: one network, its clients and the ledger of flights.

use serde::{Deserialize, Serialize};

use crate::domain::{Client, ClientKind, Order};
use crate::error::{Error, Result};
use crate::graph::{Graph, RoleCounts, VertexId, VertexRole};
use crate::ledger::RouteLedger;
use crate::routing::{RangeConstrainedRouter, Route};

/// Bounds accepted for a scenario's network size and role mix.
pub const MIN_NODES: usize = 10;
pub const MAX_NODES: usize = 150;
pub const MIN_EDGES: usize = 10;
pub const MIN_ORDERS: usize = 1;
pub const MAX_ORDERS: usize = 500;
pub const MIN_ROLE_PERCENT: u32 = 10;
pub const MAX_ROLE_PERCENT: u32 = 40;
/// Depots and waystations together may take at most this share, leaving
/// at least 10% of vertices as destinations.
pub const MAX_SUPPLY_PERCENT: u32 = 90;

/// Scenario sizing and drone settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub nodes: usize,
    pub edges: usize,
    pub orders: usize,
    /// Share of vertices acting as depots, in percent.
    pub depot_percent: u32,
    /// Share of vertices acting as waystations, in percent.
    pub waystation_percent: u32,
    /// Range of a fully charged drone.
    pub max_range: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            nodes: 15,
            edges: 20,
            orders: 10,
            depot_percent: 20,
            waystation_percent: 20,
            max_range: 50.0,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_NODES..=MAX_NODES).contains(&self.nodes) {
            return Err(Error::config(format!(
                "nodes must be between {MIN_NODES} and {MAX_NODES}, got {}",
                self.nodes
            )));
        }

        let max_edges = self.nodes * (self.nodes - 1);
        if !(MIN_EDGES..=max_edges).contains(&self.edges) {
            return Err(Error::config(format!(
                "edges must be between {MIN_EDGES} and {max_edges}, got {}",
                self.edges
            )));
        }

        if !(MIN_ORDERS..=MAX_ORDERS).contains(&self.orders) {
            return Err(Error::config(format!(
                "orders must be between {MIN_ORDERS} and {MAX_ORDERS}, got {}",
                self.orders
            )));
        }

        for (name, percent) in [
            ("depot_percent", self.depot_percent),
            ("waystation_percent", self.waystation_percent),
        ] {
            if !(MIN_ROLE_PERCENT..=MAX_ROLE_PERCENT).contains(&percent) {
                return Err(Error::config(format!(
                    "{name} must be between {MIN_ROLE_PERCENT} and {MAX_ROLE_PERCENT}, got {percent}"
                )));
            }
        }
        if self.depot_percent + self.waystation_percent > MAX_SUPPLY_PERCENT {
            return Err(Error::config(format!(
                "depot and waystation shares add up to {}%, at most {MAX_SUPPLY_PERCENT}% allowed",
                self.depot_percent + self.waystation_percent
            )));
        }

        if !self.max_range.is_finite() || self.max_range <= 0.0 {
            return Err(Error::config(format!(
                "max_range must be a positive number, got {}",
                self.max_range
            )));
        }

        Ok(())
    }

    /// Number of vertices per role implied by the configured shares.
    ///
    /// Depots and waystations are rounded down but kept at one or more;
    /// destinations take the rest.
    pub fn role_targets(&self) -> RoleCounts {
        let share = |percent: u32| (self.nodes * percent as usize / 100).max(1);
        let depots = share(self.depot_percent);
        let waystations = share(self.waystation_percent);
        RoleCounts {
            depots,
            waystations,
            destinations: self.nodes.saturating_sub(depots + waystations),
        }
    }
}

/// Result of processing one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderOutcome {
    Delivered { order_id: String, route: Route },
    Failed { order_id: String },
}

impl OrderOutcome {
    pub fn order_id(&self) -> &str {
        match self {
            OrderOutcome::Delivered { order_id, .. } | OrderOutcome::Failed { order_id } => {
                order_id
            }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, OrderOutcome::Delivered { .. })
    }
}

/// Owns the network, its settings and the ledger of everything flown on it.
#[derive(Debug, Clone)]
pub struct Scenario {
    config: ScenarioConfig,
    graph: Graph,
    ledger: RouteLedger,
}

impl Scenario {
    /// Start a scenario on `graph`. The graph needs at least one depot and
    /// one destination.
    pub fn new(config: ScenarioConfig, graph: Graph) -> Result<Self> {
        config.validate()?;
        check_roles(&graph)?;

        let counts = graph.role_counts();
        tracing::debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            depots = counts.depots,
            waystations = counts.waystations,
            destinations = counts.destinations,
            max_range = config.max_range,
            "scenario initialized"
        );

        Ok(Self {
            config,
            graph,
            ledger: RouteLedger::new(),
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn ledger(&self) -> &RouteLedger {
        &self.ledger
    }

    pub fn max_range(&self) -> f64 {
        self.config.max_range
    }

    /// Replace the network and start over with an empty ledger.
    pub fn reset(&mut self, graph: Graph) -> Result<()> {
        check_roles(&graph)?;
        self.graph = graph;
        self.ledger.reset();
        tracing::debug!(vertices = self.graph.vertex_count(), "scenario reset");
        Ok(())
    }

    /// Check that a delivery would leave from a depot and arrive at a destination.
    pub fn route_endpoints_valid(&self, origin: &str, destination: &str) -> Result<()> {
        let origin_role = self.role_of(origin)?;
        let destination_role = self.role_of(destination)?;
        if origin_role != VertexRole::Depot || destination_role != VertexRole::Destination {
            return Err(Error::InvalidEndpoints {
                origin: VertexId::new(origin),
                destination: VertexId::new(destination),
            });
        }
        Ok(())
    }

    /// Plan a depot to destination route with the scenario's range.
    pub fn plan(&self, origin: &str, destination: &str) -> Result<Route> {
        self.route_endpoints_valid(origin, destination)?;
        RangeConstrainedRouter::new(&self.graph).find_route(
            origin,
            destination,
            self.config.max_range,
        )
    }

    /// Register a client living at an existing destination vertex.
    pub fn register_client(&mut self, client: Client) -> Result<()> {
        if self.role_of(&client.node)? != VertexRole::Destination {
            return Err(Error::InvalidScenario {
                message: format!("client {} must live at a destination vertex", client.id),
            });
        }
        self.ledger.register_client(client);
        Ok(())
    }

    /// Register one client per destination vertex, numbered `C001`, `C002`, ...
    /// in vertex order. Returns the number of clients created. Running it again
    /// replaces the clients but keeps their order counts.
    pub fn populate_clients<F>(&mut self, mut kind_of: F) -> usize
    where
        F: FnMut(&VertexId) -> ClientKind,
    {
        let destinations = self.graph.vertices_by_role(VertexRole::Destination);
        for (position, node) in destinations.iter().enumerate() {
            let number = position + 1;
            let kind = kind_of(node);
            self.ledger.register_client(Client::new(
                format!("C{number:03}"),
                format!("Client {number}"),
                node.clone(),
                kind,
            ));
        }
        destinations.len()
    }

    /// Route one order and record the outcome in the ledger.
    ///
    /// An order without a feasible route is marked failed and reported as
    /// [`OrderOutcome::Failed`]; malformed orders are returned as errors and
    /// leave the ledger untouched.
    pub fn process_order(&mut self, order: Order) -> Result<OrderOutcome> {
        self.route_endpoints_valid(&order.origin, &order.destination)?;
        let order_id = order.id.clone();
        let planned = RangeConstrainedRouter::new(&self.graph).find_route(
            &order.origin,
            &order.destination,
            self.config.max_range,
        );
        self.ledger.register_order(order)?;

        match planned {
            Ok(route) => {
                tracing::debug!(
                    order = %order_id,
                    cost = route.total_cost(),
                    recharges = route.recharge_stops().len(),
                    "order delivered"
                );
                self.ledger.record_delivery(&order_id, route.clone())?;
                Ok(OrderOutcome::Delivered { order_id, route })
            }
            Err(Error::RouteNotFound { .. }) => {
                tracing::warn!(order = %order_id, "no feasible route, order failed");
                self.ledger.record_failure(&order_id)?;
                Ok(OrderOutcome::Failed { order_id })
            }
            Err(err) => Err(err),
        }
    }

    /// Process orders in sequence, stopping at the first malformed one.
    pub fn process_orders<I>(&mut self, orders: I) -> Result<Vec<OrderOutcome>>
    where
        I: IntoIterator<Item = Order>,
    {
        orders
            .into_iter()
            .map(|order| self.process_order(order))
            .collect()
    }

    fn role_of(&self, id: &str) -> Result<VertexRole> {
        self.graph.role(id).ok_or_else(|| Error::UnknownVertex {
            id: VertexId::new(id),
        })
    }
}

fn check_roles(graph: &Graph) -> Result<()> {
    let counts = graph.role_counts();
    if counts.depots == 0 || counts.destinations == 0 {
        return Err(Error::InvalidScenario {
            message: format!(
                "network needs at least one depot and one destination (has {} and {})",
                counts.depots, counts.destinations
            ),
        });
    }
    Ok(())
}
