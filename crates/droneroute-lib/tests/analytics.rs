mod common;

use droneroute_lib::{all_pairs_shortest_paths, minimum_spanning_tree, Graph, VertexRole};

use common::{fixture_graph, random_graph, seeded_rng};

#[test]
fn all_pairs_distances_on_fixture() {
    let matrix = all_pairs_shortest_paths(&fixture_graph());

    assert_eq!(matrix.vertices().len(), 5);
    assert_eq!(matrix.distance("A", "C"), Some(40.0));
    assert_eq!(matrix.distance("C", "D"), Some(70.0));
    assert_eq!(matrix.distance("D", "D"), Some(0.0));
    assert_eq!(matrix.diameter(), 70.0);
}

#[test]
fn unreachable_pairs_have_no_distance() {
    let mut graph = fixture_graph();
    graph
        .add_vertex("Z", VertexRole::Destination, None)
        .expect("add Z");

    let matrix = all_pairs_shortest_paths(&graph);
    assert_eq!(matrix.distance("A", "Z"), None);
    assert_eq!(matrix.closeness_centrality("Z"), Some(0.0));
    assert_eq!(matrix.closeness_centrality("missing"), None);
    assert_eq!(matrix.diameter(), 70.0);
}

#[test]
fn hub_has_highest_closeness() {
    let matrix = all_pairs_shortest_paths(&fixture_graph());
    let hub = matrix.closeness_centrality("A").expect("A exists");
    for other in ["B", "C", "D", "R1"] {
        let score = matrix.closeness_centrality(other).expect("vertex exists");
        assert!(hub > score, "A should be more central than {other}");
    }
}

#[test]
fn all_pairs_agree_with_router() {
    let mut rng = seeded_rng(5);
    let graph = random_graph(&mut rng, 20, 30);
    let matrix = all_pairs_shortest_paths(&graph);
    let router = droneroute_lib::RangeConstrainedRouter::new(&graph);

    for source in graph.vertices() {
        for target in graph.vertices() {
            let route = router
                .shortest_route(source.id(), target.id())
                .expect("connected graph");
            assert_eq!(
                matrix.distance(source.id(), target.id()),
                Some(route.total_cost())
            );
        }
    }
}

#[test]
fn spanning_tree_of_fixture() {
    let forest = minimum_spanning_tree(&fixture_graph());

    assert!(forest.is_spanning_tree());
    assert_eq!(forest.edges.len(), 4);
    // Drops A -- C (45), the heaviest edge on the only cycle.
    assert_eq!(forest.total_weight, 70.0);
}

#[test]
fn spanning_forest_of_disconnected_graph() {
    let mut graph = Graph::undirected();
    for id in ["A", "B", "C", "D"] {
        graph
            .add_vertex(id, VertexRole::Destination, None)
            .expect("add vertex");
    }
    graph.add_edge("A", "B", 3.0).expect("A-B");
    graph.add_edge("C", "D", 4.0).expect("C-D");

    let forest = minimum_spanning_tree(&graph);
    assert_eq!(forest.components, 2);
    assert!(!forest.is_spanning_tree());
    assert_eq!(forest.total_weight, 7.0);
}

#[test]
fn spanning_tree_size_on_random_graphs() {
    let mut rng = seeded_rng(8);
    for size in [5, 15, 45] {
        let graph = random_graph(&mut rng, size, size);
        let forest = minimum_spanning_tree(&graph);
        assert_eq!(forest.edges.len(), size - 1);
        assert_eq!(forest.components, 1);
    }
}
