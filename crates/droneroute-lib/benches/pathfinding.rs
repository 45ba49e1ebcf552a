use criterion::{criterion_group, criterion_main, Criterion};
use droneroute_lib::{
    plan_route, Graph, RouteFrequencyTree, RouteLedger, RouteRequest, VertexRole,
};
use once_cell::sync::Lazy;
use std::hint::black_box;

const NODES: usize = 150;

/// Ring of 150 vertices with chords every 7 steps; every fifth vertex is a waystation.
fn network() -> Graph {
    let mut graph = Graph::undirected();
    for index in 0..NODES {
        let role = match index % 5 {
            0 => VertexRole::Waystation,
            1 if index % 10 == 1 => VertexRole::Depot,
            _ => VertexRole::Destination,
        };
        graph
            .add_vertex(format!("N{index}"), role, None)
            .expect("unique vertex");
    }
    for index in 0..NODES {
        let next = format!("N{}", (index + 1) % NODES);
        let chord = format!("N{}", (index + 7) % NODES);
        let from = format!("N{index}");
        graph
            .add_edge(&from, &next, 7.0 + (index % 5) as f64)
            .expect("ring edge");
        graph
            .add_edge(&from, &chord, 20.0 + (index % 11) as f64)
            .expect("chord edge");
    }
    graph
}

static NETWORK: Lazy<Graph> = Lazy::new(network);
static RANGED_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::with_range("N1", "N78", 30.0));
static TIGHT_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::with_range("N1", "N78", 18.0));
static UNCONSTRAINED_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::unconstrained("N1", "N78"));

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*NETWORK;

    c.bench_function("range_30_n1_n78", |b| {
        let request = &*RANGED_REQUEST;
        b.iter(|| {
            let route = plan_route(graph, request).expect("route exists");
            black_box(route.recharge_stops().len())
        });
    });

    c.bench_function("range_18_n1_n78", |b| {
        let request = &*TIGHT_REQUEST;
        b.iter(|| {
            let route = plan_route(graph, request).expect("route exists");
            black_box(route.total_cost())
        });
    });

    c.bench_function("dijkstra_n1_n78", |b| {
        let request = &*UNCONSTRAINED_REQUEST;
        b.iter(|| {
            let route = plan_route(graph, request).expect("route exists");
            black_box(route.hop_count())
        });
    });
}

fn benchmark_analytics(c: &mut Criterion) {
    let graph = &*NETWORK;
    let route = plan_route(graph, &RANGED_REQUEST).expect("route exists");

    c.bench_function("ledger_record_1000", |b| {
        b.iter(|| {
            let mut ledger = RouteLedger::new();
            for _ in 0..1000 {
                ledger.record(route.clone());
            }
            black_box(ledger.top_visited_nodes(10))
        });
    });

    c.bench_function("frequency_tree_insert_1000", |b| {
        b.iter(|| {
            let mut tree = RouteFrequencyTree::new();
            for index in 0..1000 {
                tree.insert(format!("N{} -> N{}", index % 97, index % 31));
            }
            black_box(tree.height())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding, benchmark_analytics);
criterion_main!(benches);
