//! Route planning for range-limited delivery drones.
//!
//! This module provides:
//! - [`RouteRequest`] - High-level route planning request
//! - [`Route`] - Planned route result with recharge stops and per-leg costs
//! - [`plan_route`] - Main entry point for computing routes
//! - [`RangeConstrainedRouter`] - Convenience wrapper bound to a single graph
//!
//! # Range model
//!
//! A route starts with `max_range` available. Each edge adds its weight to
//! the range used since the last recharge, and may only be taken while that
//! running sum stays within `max_range`. Waystations reset it at no cost. Only waystations where a
//! recharge actually happened are listed in [`Route::recharge_stops`].
//!
//! # Example
//!
//! ```
//! use droneroute_lib::{Graph, RangeConstrainedRouter, VertexRole};
//!
//! let mut graph = Graph::undirected();
//! graph.add_vertex("A", VertexRole::Depot, None)?;
//! graph.add_vertex("R1", VertexRole::Waystation, None)?;
//! graph.add_vertex("D", VertexRole::Destination, None)?;
//! graph.add_edge("A", "R1", 15.0)?;
//! graph.add_edge("R1", "D", 15.0)?;
//!
//! let route = RangeConstrainedRouter::new(&graph).find_route("A", "D", 15.0)?;
//! assert_eq!(route.total_cost(), 30.0);
//! assert_eq!(route.recharge_stops().len(), 1);
//! # Ok::<(), droneroute_lib::Error>(())
//! ```

mod planner;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Graph, VertexId, VertexRole};
use crate::ledger::canonical_route_key;
use crate::path::{SearchStep, Transition};

use planner::select_planner;

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
    /// Range available on departure and after every recharge. `None` plans the
    /// plain shortest path.
    pub max_range: Option<f64>,
}

impl RouteRequest {
    /// Request a route that must respect `max_range`.
    pub fn with_range(
        origin: impl Into<String>,
        destination: impl Into<String>,
        max_range: f64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            max_range: Some(max_range),
        }
    }

    /// Request the shortest path without a range limit.
    pub fn unconstrained(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            max_range: None,
        }
    }
}

/// A single edge traversal within a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub from: VertexId,
    pub to: VertexId,
    pub cost: f64,
    /// `true` when the range was restored at `from` right before this leg.
    pub recharged_before: bool,
    /// Range left on arrival at `to`; `None` for unconstrained routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_range: Option<f64>,
}

/// Part of a route flown on a single charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub vertices: Vec<VertexId>,
    pub cost: f64,
}

/// Planned route returned by the library. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    path: Vec<VertexId>,
    total_cost: f64,
    recharge_stops: Vec<VertexId>,
    legs: Vec<RouteLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_range: Option<f64>,
}

impl Route {
    fn from_steps(steps: Vec<SearchStep>, max_range: Option<f64>) -> Result<Self> {
        let mut steps = steps.into_iter();
        let origin = steps
            .next()
            .ok_or_else(|| Error::invariant("search returned no states"))?;

        let mut path = vec![origin.vertex];
        let mut recharge_stops = Vec::new();
        let mut legs: Vec<RouteLeg> = Vec::new();
        let mut recharge_pending = false;

        for step in steps {
            match step.via {
                Some(Transition::Recharge) => {
                    recharge_stops.push(step.vertex);
                    recharge_pending = true;
                }
                Some(Transition::Edge) => {
                    let from = path
                        .last()
                        .cloned()
                        .ok_or_else(|| Error::invariant("route path is empty"))?;
                    legs.push(RouteLeg {
                        from,
                        to: step.vertex.clone(),
                        cost: step.weight,
                        recharged_before: recharge_pending,
                        remaining_range: step.remaining,
                    });
                    path.push(step.vertex);
                    recharge_pending = false;
                }
                None => return Err(Error::invariant("search state without transition")),
            }
        }

        let total_cost = legs.iter().fold(0.0, |total, leg| total + leg.cost);
        Ok(Self {
            path,
            total_cost,
            recharge_stops,
            legs,
            max_range,
        })
    }

    fn singleton(vertex: VertexId, max_range: Option<f64>) -> Self {
        Self {
            path: vec![vertex],
            total_cost: 0.0,
            recharge_stops: Vec::new(),
            legs: Vec::new(),
            max_range,
        }
    }

    pub fn path(&self) -> &[VertexId] {
        &self.path
    }

    pub fn origin(&self) -> &VertexId {
        &self.path[0]
    }

    pub fn destination(&self) -> &VertexId {
        &self.path[self.path.len() - 1]
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Waystations where the range was restored, in flight order.
    pub fn recharge_stops(&self) -> &[VertexId] {
        &self.recharge_stops
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    pub fn max_range(&self) -> Option<f64> {
        self.max_range
    }

    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Canonical frequency key for this route (see [`canonical_route_key`]).
    pub fn canonical_key(&self) -> String {
        canonical_route_key(&self.path)
    }

    /// Split the route at recharge events.
    pub fn segments(&self) -> Vec<RouteSegment> {
        let mut segments = Vec::new();
        let mut current = RouteSegment {
            vertices: vec![self.origin().clone()],
            cost: 0.0,
        };

        for leg in &self.legs {
            if leg.recharged_before {
                let next = RouteSegment {
                    vertices: vec![leg.from.clone()],
                    cost: 0.0,
                };
                segments.push(std::mem::replace(&mut current, next));
            }
            current.vertices.push(leg.to.clone());
            current.cost += leg.cost;
        }

        segments.push(current);
        segments
    }

    /// Re-check the route against `graph`.
    ///
    /// Every leg must be an existing edge with the recorded weight, recharges
    /// must happen at waystations, no segment may exceed the planning range,
    /// and the declared cost must equal the sum of the legs.
    pub fn verify(&self, graph: &Graph) -> Result<()> {
        if self.legs.len() + 1 != self.path.len() {
            return Err(Error::invariant(format!(
                "route has {} vertices but {} legs",
                self.path.len(),
                self.legs.len()
            )));
        }

        let mut used = 0.0;
        let mut recharges = 0usize;
        for (leg, pair) in self.legs.iter().zip(self.path.windows(2)) {
            if leg.from != pair[0] || leg.to != pair[1] {
                return Err(Error::invariant(format!(
                    "leg {} -> {} does not follow the path",
                    leg.from, leg.to
                )));
            }
            match graph.edge_weight(&leg.from, &leg.to) {
                Some(weight) if weight == leg.cost => {}
                _ => {
                    return Err(Error::invariant(format!(
                        "leg {} -> {} with cost {} is not an edge of the graph",
                        leg.from, leg.to, leg.cost
                    )))
                }
            }
            if leg.recharged_before {
                if graph.role(&leg.from) != Some(VertexRole::Waystation) {
                    return Err(Error::invariant(format!(
                        "recharge at {} which is not a waystation",
                        leg.from
                    )));
                }
                recharges += 1;
                used = 0.0;
            }
            used += leg.cost;
            if let Some(limit) = self.max_range {
                if used > limit {
                    return Err(Error::invariant(format!(
                        "segment ending at {} uses {used} of {limit} range",
                        leg.to
                    )));
                }
            }
        }

        if recharges != self.recharge_stops.len() {
            return Err(Error::invariant(format!(
                "{} recharge stops declared but {recharges} recharges flown",
                self.recharge_stops.len()
            )));
        }

        let sum = self.legs.iter().fold(0.0, |total, leg| total + leg.cost);
        if sum != self.total_cost {
            return Err(Error::invariant(format!(
                "declared cost {} differs from leg sum {sum}",
                self.total_cost
            )));
        }

        Ok(())
    }
}

/// Resolve a vertex name to the graph's identity, returning an error for unknown vertices.
fn resolve_vertex(graph: &Graph, name: &str) -> Result<VertexId> {
    graph
        .vertex(name)
        .map(|vertex| vertex.id().clone())
        .ok_or_else(|| Error::UnknownVertex {
            id: VertexId::new(name),
        })
}

/// Compute a route for the request.
///
/// This is the main entry point for route planning. It:
/// 1. Resolves origin and destination
/// 2. Validates the maximum range
/// 3. Selects the planner strategy and runs the search
/// 4. Rebuilds the route from the settled search states
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<Route> {
    let origin = resolve_vertex(graph, &request.origin)?;
    let destination = resolve_vertex(graph, &request.destination)?;

    if let Some(max_range) = request.max_range {
        if !max_range.is_finite() || max_range < 0.0 {
            return Err(Error::InvalidRange { max_range });
        }
    }

    if origin == destination {
        return Ok(Route::singleton(origin, request.max_range));
    }

    let planner = select_planner(request);
    let Some(steps) = planner.search(graph, &origin, &destination) else {
        tracing::debug!(%origin, %destination, max_range = ?request.max_range, "no route found");
        return Err(Error::RouteNotFound {
            origin,
            destination,
        });
    };

    let route = Route::from_steps(steps, planner.max_range())?;
    tracing::debug!(
        %origin,
        %destination,
        cost = route.total_cost(),
        hops = route.hop_count(),
        recharges = route.recharge_stops().len(),
        "route planned"
    );
    Ok(route)
}

/// Routing engine bound to a read-only graph.
#[derive(Debug, Clone, Copy)]
pub struct RangeConstrainedRouter<'g> {
    graph: &'g Graph,
}

impl<'g> RangeConstrainedRouter<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Find the cheapest route that never lets the remaining range go negative.
    pub fn find_route(&self, origin: &str, destination: &str, max_range: f64) -> Result<Route> {
        plan_route(
            self.graph,
            &RouteRequest::with_range(origin, destination, max_range),
        )
    }

    /// Find the cheapest route ignoring range.
    pub fn shortest_route(&self, origin: &str, destination: &str) -> Result<Route> {
        plan_route(self.graph, &RouteRequest::unconstrained(origin, destination))
    }
}
