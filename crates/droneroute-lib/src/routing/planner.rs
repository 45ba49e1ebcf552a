//! Route planning strategies.
//!
//! The `RoutePlanner` trait lets [`plan_route`](super::plan_route) switch
//! between the range-constrained search and a plain shortest-path search
//! without changing the orchestration logic.

use crate::graph::{Graph, VertexId};
use crate::path::{find_route_dijkstra, find_route_with_range, SearchStep};

use super::RouteRequest;

/// Trait for route planning strategies.
pub(crate) trait RoutePlanner: Send + Sync {
    /// Maximum range honoured by this planner, `None` when unconstrained.
    fn max_range(&self) -> Option<f64>;

    /// Execute the search on the given graph.
    ///
    /// Returns the settled states from origin to destination, or `None` when
    /// the destination cannot be reached.
    fn search(
        &self,
        graph: &Graph,
        origin: &VertexId,
        destination: &VertexId,
    ) -> Option<Vec<SearchStep>>;
}

/// Dijkstra over `(vertex, range_used)` states with waystation recharges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RangeConstrainedPlanner {
    max_range: f64,
}

impl RangeConstrainedPlanner {
    pub(crate) fn new(max_range: f64) -> Self {
        Self { max_range }
    }
}

impl RoutePlanner for RangeConstrainedPlanner {
    fn max_range(&self) -> Option<f64> {
        Some(self.max_range)
    }

    fn search(
        &self,
        graph: &Graph,
        origin: &VertexId,
        destination: &VertexId,
    ) -> Option<Vec<SearchStep>> {
        find_route_with_range(graph, origin, destination, self.max_range)
    }
}

/// Plain Dijkstra ignoring range; used for network inspection and for
/// requests without a range limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ShortestPathPlanner;

impl RoutePlanner for ShortestPathPlanner {
    fn max_range(&self) -> Option<f64> {
        None
    }

    fn search(
        &self,
        graph: &Graph,
        origin: &VertexId,
        destination: &VertexId,
    ) -> Option<Vec<SearchStep>> {
        find_route_dijkstra(graph, origin, destination)
    }
}

/// Select the appropriate planner for a given request.
pub(crate) fn select_planner(request: &RouteRequest) -> Box<dyn RoutePlanner> {
    match request.max_range {
        Some(max_range) => Box::new(RangeConstrainedPlanner::new(max_range)),
        None => Box::new(ShortestPathPlanner),
    }
}
