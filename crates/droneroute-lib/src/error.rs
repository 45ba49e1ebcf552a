use thiserror::Error;

use crate::graph::VertexId;

/// Convenient result alias for the droneroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Raised when a vertex identity is not present in the graph.
    #[error("unknown vertex: {id}")]
    UnknownVertex { id: VertexId },

    /// Raised when adding a vertex whose identity is already taken.
    #[error("vertex {id} already exists")]
    DuplicateVertex { id: VertexId },

    /// Raised when an edge between the same ordered endpoints already exists.
    #[error("edge {from} -> {to} already exists")]
    DuplicateEdge { from: VertexId, to: VertexId },

    /// Raised when removing an edge that is not part of the graph.
    #[error("no edge between {from} and {to}")]
    UnknownEdge { from: VertexId, to: VertexId },

    /// Raised when an edge weight is negative, NaN or infinite.
    #[error("invalid weight {weight} for edge {from} -> {to}")]
    InvalidWeight {
        from: VertexId,
        to: VertexId,
        weight: f64,
    },

    /// Raised when the requested maximum range is negative or not finite.
    #[error("invalid maximum range: {max_range}")]
    InvalidRange { max_range: f64 },

    /// Raised when no range-respecting route exists between two vertices.
    #[error("no route found between {origin} and {destination}")]
    RouteNotFound {
        origin: VertexId,
        destination: VertexId,
    },

    /// Raised when a structural invariant does not hold.
    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },

    /// Raised when a configuration value is out of its accepted range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when a scenario cannot be set up from the supplied graph and settings.
    #[error("invalid scenario: {message}")]
    InvalidScenario { message: String },

    /// Raised when a delivery request does not go from a depot to a destination.
    #[error("route must start at a depot and end at a destination (got {origin} -> {destination})")]
    InvalidEndpoints {
        origin: VertexId,
        destination: VertexId,
    },

    /// Raised when a client identifier is not registered.
    #[error("unknown client: {id}")]
    UnknownClient { id: String },

    /// Raised when an order identifier is not registered.
    #[error("unknown order: {id}")]
    UnknownOrder { id: String },
}

impl Error {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Error::InvariantViolation {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}
