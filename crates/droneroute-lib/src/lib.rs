//! Droneroute library entry points.
//!
//! This crate models a delivery network of depots, waystations and
//! destinations, plans routes for drones whose range is restored only at
//! waystations, and keeps a ledger of flown routes with frequency and visit
//! analytics. Higher-level consumers (dashboards, services) should only depend
//! on the functions exported here instead of reimplementing behavior.
//!
//! Logging goes through `tracing`; the library never installs a subscriber.

#![deny(warnings)]

pub mod analytics;
pub mod domain;
pub mod error;
pub mod frequency;
pub mod graph;
pub mod hash_index;
pub mod ledger;
mod path;
pub mod routing;
pub mod scenario;

pub use analytics::{
    all_pairs_shortest_paths, minimum_spanning_tree, DistanceMatrix, SpanningForest,
};
pub use domain::{Client, ClientKind, Order, OrderStatus, Priority};
pub use error::{Error, Result};
pub use frequency::{RouteFrequencyTree, TreeSnapshot};
pub use graph::{
    Coordinates, Edge, EdgeId, Graph, GraphKind, RoleCounts, Vertex, VertexId, VertexRole,
};
pub use hash_index::{positional_hash, HashIndex, HashIndexConfig, IndexKey};
pub use ledger::{
    canonical_route_key, DeliverySummary, NodeVisitBreakdown, RouteLedger, RouteRecord,
    ROUTE_KEY_SEPARATOR,
};
pub use routing::{plan_route, RangeConstrainedRouter, Route, RouteLeg, RouteRequest, RouteSegment};
pub use scenario::{OrderOutcome, Scenario, ScenarioConfig};
