//! Clients and delivery orders tracked by the route ledger.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::VertexId;
use crate::hash_index::IndexKey;

/// Service tier of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    Premium,
    #[default]
    Normal,
}

/// Client living at a destination vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub node: VertexId,
    pub kind: ClientKind,
    /// Number of orders placed by this client.
    pub total_orders: u64,
}

impl Client {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node: impl Into<VertexId>,
        kind: ClientKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node: node.into(),
            kind,
            total_orders: 0,
        }
    }
}

impl IndexKey for Client {
    fn index_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }
}

/// Delivery urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
    Failed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Failed => "failed",
        };
        f.write_str(value)
    }
}

/// Delivery order from a depot to a client's vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub origin: VertexId,
    pub destination: VertexId,
    /// Parcel weight in kilograms.
    pub weight: f64,
    pub priority: Priority,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    /// Cost of the flown route, zero until delivered.
    pub total_cost: f64,
}

impl Order {
    /// Create a pending order for `client`, delivered to the client's vertex.
    pub fn new(
        id: impl Into<String>,
        client: &Client,
        origin: impl Into<VertexId>,
        weight: f64,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            client_id: client.id.clone(),
            origin: origin.into(),
            destination: client.node.clone(),
            weight,
            priority,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            delivered_at: None,
            total_cost: 0.0,
        }
    }

    pub fn mark_delivered(&mut self, cost: f64) {
        self.status = OrderStatus::Delivered;
        self.delivered_at = Some(Utc::now());
        self.total_cost = cost;
    }

    pub fn mark_failed(&mut self) {
        self.status = OrderStatus::Failed;
        self.delivered_at = None;
    }
}

impl IndexKey for Order {
    fn index_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }
}
