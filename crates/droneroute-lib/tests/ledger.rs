mod common;

use droneroute_lib::{
    Client, ClientKind, Error, Order, OrderStatus, Priority, RangeConstrainedRouter, Route,
    RouteLedger, VertexId, VertexRole,
};

use common::{fixture_graph, random_graph, seeded_rng};

fn route(origin: &str, destination: &str, max_range: f64) -> Route {
    let graph = fixture_graph();
    RangeConstrainedRouter::new(&graph)
        .find_route(origin, destination, max_range)
        .expect("fixture route exists")
}

fn ledger_with_clients() -> RouteLedger {
    let mut ledger = RouteLedger::new();
    ledger.register_client(Client::new("C001", "Client 1", "B", ClientKind::Premium));
    ledger.register_client(Client::new("C002", "Client 2", "C", ClientKind::Normal));
    ledger.register_client(Client::new("C003", "Client 3", "D", ClientKind::Normal));
    ledger
}

fn order(ledger: &RouteLedger, id: &str, client_id: &str) -> Order {
    let client = ledger.client(client_id).expect("client registered");
    Order::new(id, client, "A", 1.5, Priority::Normal)
}

#[test]
fn recording_updates_frequency_and_visits() {
    let mut ledger = RouteLedger::new();
    ledger.record(route("A", "D", 15.0));
    ledger.record(route("A", "D", 15.0));
    let record = ledger.record(route("A", "C", 50.0));
    assert_eq!(record.key(), "A -> B -> C");

    assert_eq!(ledger.route_count(), 3);
    assert_eq!(
        ledger.top_routes(5),
        vec![
            ("A -> R1 -> D".to_string(), 2),
            ("A -> B -> C".to_string(), 1),
        ]
    );
    assert_eq!(ledger.visit_count("A"), 3);
    assert_eq!(ledger.visit_count("R1"), 2);
    assert_eq!(ledger.visit_count("Z"), 0);
    assert_eq!(
        ledger.top_visited_nodes(3),
        vec![
            (VertexId::new("A"), 3),
            (VertexId::new("D"), 2),
            (VertexId::new("R1"), 2),
        ]
    );
}

#[test]
fn visit_totals_match_recorded_paths() {
    let mut rng = seeded_rng(11);
    let graph = random_graph(&mut rng, 30, 45);
    let router = RangeConstrainedRouter::new(&graph);
    let mut ledger = RouteLedger::new();

    for origin in graph.vertices_by_role(VertexRole::Depot) {
        for (position, destination) in graph
            .vertices_by_role(VertexRole::Destination)
            .iter()
            .enumerate()
        {
            if let Ok(route) = router.find_route(&origin, destination, 40.0) {
                // Fly every third route twice so frequencies differ.
                if position % 3 == 0 {
                    ledger.record(route.clone());
                }
                ledger.record(route);
            }
        }
    }
    assert!(ledger.route_count() > 0);

    let path_total: usize = ledger
        .history()
        .iter()
        .map(|record| record.route().path().len())
        .sum();
    let visit_total: u64 = ledger.visits().values().sum();
    assert_eq!(visit_total, path_total as u64);

    let ranked_routes: u64 = ledger
        .top_routes(usize::MAX)
        .iter()
        .map(|(_, frequency)| frequency)
        .sum();
    assert_eq!(ranked_routes, ledger.route_count() as u64);
    let ranked_visits: u64 = ledger
        .top_visited_nodes(usize::MAX)
        .iter()
        .map(|(_, count)| count)
        .sum();
    assert_eq!(ranked_visits, path_total as u64);
    assert_eq!(
        ledger.frequency_tree().total_frequency(),
        ledger.route_count() as u64
    );
    ledger
        .frequency_tree()
        .check_invariants()
        .expect("frequency tree stays balanced");
    ledger
        .visits()
        .check_invariants()
        .expect("visit index stays consistent");
}

#[test]
fn node_visit_breakdown_separates_positions() {
    let mut ledger = RouteLedger::new();
    ledger.record(route("A", "D", 15.0));
    ledger.record(route("A", "C", 50.0));

    let breakdown = ledger.node_visit_breakdown();
    assert_eq!(breakdown.origins, vec![(VertexId::new("A"), 2)]);
    assert_eq!(
        breakdown.destinations,
        vec![(VertexId::new("C"), 1), (VertexId::new("D"), 1)]
    );
    assert_eq!(
        breakdown.intermediates,
        vec![(VertexId::new("B"), 1), (VertexId::new("R1"), 1)]
    );
}

#[test]
fn deliveries_and_failures_update_orders() {
    let mut ledger = ledger_with_clients();
    for (id, client) in [("ORD001", "C001"), ("ORD002", "C003"), ("ORD003", "C003")] {
        let order = order(&ledger, id, client);
        ledger.register_order(order).expect("client registered");
    }

    ledger
        .record_delivery("ORD001", route("A", "B", 50.0))
        .expect("order exists");
    ledger
        .record_delivery("ORD002", route("A", "D", 15.0))
        .expect("order exists");
    ledger.record_failure("ORD003").expect("order exists");

    let delivered = ledger.order("ORD002").expect("order exists");
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(delivered.total_cost, 30.0);
    assert!(delivered.delivered_at.is_some());
    assert_eq!(
        ledger.order("ORD003").map(|order| order.status),
        Some(OrderStatus::Failed)
    );

    let by_cost: Vec<&str> = ledger
        .order_by_cost()
        .iter()
        .map(|order| order.id.as_str())
        .collect();
    assert_eq!(by_cost, vec!["ORD002", "ORD001"]);

    assert_eq!(
        ledger.client_order_counts(),
        vec![("C003".to_string(), 2), ("C001".to_string(), 1)]
    );
    assert_eq!(ledger.client("C003").map(|c| c.total_orders), Some(2));

    let summary = ledger.delivery_summary();
    assert_eq!(summary.total_orders, 3);
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.pending, 0);
    assert_eq!(summary.routes_recorded, 2);
    assert_eq!(summary.total_cost, 50.0);
    assert_eq!(summary.total_recharge_stops, 1);
}

#[test]
fn re_registering_a_client_keeps_its_order_count() {
    let mut ledger = ledger_with_clients();
    for id in ["ORD001", "ORD002"] {
        let order = order(&ledger, id, "C001");
        ledger.register_order(order).expect("client registered");
    }

    let replaced = ledger
        .register_client(Client::new("C001", "Renamed", "B", ClientKind::Normal))
        .expect("C001 was registered");
    assert_eq!(replaced.total_orders, 2);

    let client = ledger.client("C001").expect("client registered");
    assert_eq!(client.name, "Renamed");
    assert_eq!(client.total_orders, 2);
    assert_eq!(ledger.client_order_counts(), vec![("C001".to_string(), 2)]);

    let order = order(&ledger, "ORD003", "C001");
    ledger.register_order(order).expect("client registered");
    assert_eq!(ledger.client("C001").map(|c| c.total_orders), Some(3));
}

#[test]
fn order_cost_ties_break_by_id() {
    let mut ledger = ledger_with_clients();
    for id in ["ORD002", "ORD001"] {
        let order = order(&ledger, id, "C002");
        ledger.register_order(order).expect("client registered");
        ledger
            .record_delivery(id, route("A", "C", 50.0))
            .expect("order exists");
    }
    let ids: Vec<&str> = ledger
        .order_by_cost()
        .iter()
        .map(|order| order.id.as_str())
        .collect();
    assert_eq!(ids, vec!["ORD001", "ORD002"]);
}

#[test]
fn unknown_ids_are_reported() {
    let mut ledger = ledger_with_clients();
    let error = ledger
        .record_delivery("ORD404", route("A", "B", 50.0))
        .expect_err("order not registered");
    assert_eq!(
        error,
        Error::UnknownOrder {
            id: "ORD404".to_string()
        }
    );
    assert_eq!(ledger.route_count(), 0);
    assert!(matches!(
        ledger.record_failure("ORD404"),
        Err(Error::UnknownOrder { .. })
    ));

    let stranger = Client::new("C999", "Stranger", "B", ClientKind::Normal);
    let error = ledger
        .register_order(Order::new("ORD001", &stranger, "A", 1.0, Priority::Urgent))
        .expect_err("client not registered");
    assert!(matches!(error, Error::UnknownClient { .. }));
}

#[test]
fn reset_clears_everything() {
    let mut ledger = ledger_with_clients();
    let order = order(&ledger, "ORD001", "C001");
    ledger.register_order(order).expect("client registered");
    ledger
        .record_delivery("ORD001", route("A", "B", 50.0))
        .expect("order exists");

    ledger.reset();
    assert_eq!(ledger.route_count(), 0);
    assert!(ledger.frequency_tree().is_empty());
    assert!(ledger.visits().is_empty());
    assert!(ledger.clients().is_empty());
    assert!(ledger.orders().is_empty());
    assert_eq!(ledger.delivery_summary().delivery_rate(), 0.0);
}

#[test]
fn record_serializes_with_timestamp() {
    let mut ledger = RouteLedger::new();
    let record = ledger.record(route("A", "D", 15.0));
    let json = serde_json::to_value(record).expect("serialize record");
    assert_eq!(json["key"], "A -> R1 -> D");
    assert!(json["recorded_at"].is_string());
}
