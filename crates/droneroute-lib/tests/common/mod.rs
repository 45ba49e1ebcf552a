//! Common test utilities and fixture graphs.
//!
//! Integration tests share the small `{A, B, C, D, R1}` network used to check
//! range handling, plus a seeded random network generator for property tests.

use droneroute_lib::{Graph, VertexRole};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Install a `tracing` subscriber honouring `RUST_LOG`. Safe to call repeatedly.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Five-vertex fixture:
///
/// ```text
///   A --20-- B --20-- C        A --45-- C
///   A --15-- R1 --15-- D       (R1 is the only waystation)
/// ```
#[allow(dead_code)]
pub fn fixture_graph() -> Graph {
    let mut graph = Graph::undirected();
    graph
        .add_vertex("A", VertexRole::Depot, None)
        .expect("add A");
    graph
        .add_vertex("B", VertexRole::Destination, None)
        .expect("add B");
    graph
        .add_vertex("C", VertexRole::Destination, None)
        .expect("add C");
    graph
        .add_vertex("D", VertexRole::Destination, None)
        .expect("add D");
    graph
        .add_vertex("R1", VertexRole::Waystation, None)
        .expect("add R1");

    for (source, target, weight) in [
        ("A", "B", 20.0),
        ("B", "C", 20.0),
        ("A", "R1", 15.0),
        ("R1", "D", 15.0),
        ("A", "C", 45.0),
    ] {
        graph
            .add_edge(source, target, weight)
            .expect("fixture edge");
    }
    graph
}

/// Deterministic RNG for property tests.
#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random undirected network with integer weights in `1..=30`.
///
/// Vertices are named `N0..N{n-1}`. Roles cycle depot, waystation,
/// destination, destination so every role is present from four vertices on.
/// A spanning chain keeps the network connected before extra edges are added.
#[allow(dead_code)]
pub fn random_graph(rng: &mut StdRng, vertices: usize, extra_edges: usize) -> Graph {
    let mut graph = Graph::undirected();
    for index in 0..vertices {
        let role = match index % 4 {
            0 => VertexRole::Depot,
            1 => VertexRole::Waystation,
            _ => VertexRole::Destination,
        };
        graph
            .add_vertex(format!("N{index}"), role, None)
            .expect("unique vertex");
    }

    for index in 1..vertices {
        let previous = rng.random_range(0..index);
        let weight = f64::from(rng.random_range(1..=30u32));
        graph
            .add_edge(&format!("N{previous}"), &format!("N{index}"), weight)
            .expect("chain edge");
    }

    let mut added = 0;
    let mut attempts = 0;
    while added < extra_edges && attempts < extra_edges * 10 && vertices > 1 {
        attempts += 1;
        let a = rng.random_range(0..vertices);
        let b = rng.random_range(0..vertices);
        if a == b {
            continue;
        }
        let weight = f64::from(rng.random_range(1..=30u32));
        if graph
            .add_edge(&format!("N{a}"), &format!("N{b}"), weight)
            .is_ok()
        {
            added += 1;
        }
    }
    graph
}
