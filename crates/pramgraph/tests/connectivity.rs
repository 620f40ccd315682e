//! Cross-checks of the parallel connectivity algorithms against union-find.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pramgraph::{
    components_sequential, connected_components, ConnectivityAlgorithm, ConnectivityConfig,
    Convergence, Graph, GraphConfig, GraphError, NodeId,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Random graph on `0..nodes` with `edges` uniformly drawn arcs.
fn random_graph(seed: u64, config: GraphConfig, nodes: u32, edges: usize) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(config);
    for node in 0..nodes {
        graph.add_node(node).expect("node id in range");
    }
    for _ in 0..edges {
        let x = rng.gen_range(0..nodes);
        let y = rng.gen_range(0..nodes);
        graph.insert_edge(x, y).expect("unweighted insert");
    }
    graph
}

#[test]
fn test_random_sparse_graphs_match_union_find() {
    init_tracing();

    for seed in 0..16 {
        // Below the percolation threshold: many small components
        let graph = random_graph(seed, GraphConfig::new(), 300, 120);
        let reference = components_sequential(&graph).expect("union-find");

        for algorithm in ConnectivityAlgorithm::ALL {
            let config = ConnectivityConfig::new().with_threads(4);
            let components =
                connected_components(&graph, algorithm, &config).expect("connectivity failed");
            assert!(
                components.same_partition(&reference),
                "seed {} {}: partition differs from union-find",
                seed,
                algorithm.name()
            );
        }
    }
}

#[test]
fn test_random_dense_graphs_match_union_find() {
    init_tracing();

    for seed in 100..104 {
        let graph = random_graph(seed, GraphConfig::new(), 500, 2_000);
        let reference = components_sequential(&graph).expect("union-find");

        for algorithm in ConnectivityAlgorithm::ALL {
            let components =
                connected_components(&graph, algorithm, &ConnectivityConfig::default())
                    .expect("connectivity failed");
            assert_eq!(components.sets(), reference.sets());
        }
    }
}

#[test]
fn test_directed_arcs_are_undirected_for_connectivity() {
    let graph = random_graph(7, GraphConfig::new().oriented(), 200, 150);
    let reference = components_sequential(&graph).expect("union-find");

    for algorithm in ConnectivityAlgorithm::ALL {
        let components = connected_components(&graph, algorithm, &ConnectivityConfig::default())
            .expect("connectivity failed");
        assert!(components.same_partition(&reference));
    }
}

#[test]
fn test_results_do_not_depend_on_thread_count() {
    let graph = random_graph(42, GraphConfig::new(), 400, 300);

    for algorithm in ConnectivityAlgorithm::ALL {
        let config = ConnectivityConfig::new().with_threads(1);
        let single =
            connected_components(&graph, algorithm, &config).expect("single-threaded run");
        for threads in [2, 3, 8] {
            let config = ConnectivityConfig::new().with_threads(threads);
            let multi = connected_components(&graph, algorithm, &config).expect("parallel run");
            assert_eq!(single, multi, "{} with {} threads", algorithm.name(), threads);
        }
    }
}

#[test]
fn test_two_disjoint_triangles() {
    let graph = Graph::from_edges(
        GraphConfig::new(),
        &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)],
    )
    .expect("graph");

    for algorithm in ConnectivityAlgorithm::ALL {
        let components = connected_components(&graph, algorithm, &ConnectivityConfig::default())
            .expect("connectivity failed");
        assert_eq!(components.len(), 2);
        assert!(components.same_component(NodeId(0), NodeId(2)));
        assert!(components.same_component(NodeId(3), NodeId(5)));
        assert!(!components.same_component(NodeId(2), NodeId(3)));
    }
}

#[test]
fn test_all_passes_rule_never_merges_distinct_components() {
    for seed in 0..8 {
        let graph = random_graph(seed, GraphConfig::new(), 200, 150);
        let reference = components_sequential(&graph).expect("union-find");
        let config = ConnectivityConfig::new().with_convergence(Convergence::AllPassesChanged);

        for algorithm in [
            ConnectivityAlgorithm::DirectConnect,
            ConnectivityAlgorithm::RootConnect,
        ] {
            let components =
                connected_components(&graph, algorithm, &config).expect("connectivity failed");
            // May under-merge, never over-merge
            assert!(components.len() >= reference.len());
            for set in components.iter() {
                let first = *set.first().expect("non-empty component");
                assert!(set
                    .iter()
                    .all(|&node| reference.same_component(first, node)));
            }
        }
    }
}

#[test]
fn test_all_passes_rule_stops_before_fixed_point() {
    // Round one links 2 under 0; the shortcut pass finds nothing to do,
    // so the all-passes rule stops with the altered edge (0, 1) unused
    let graph = Graph::from_edges(GraphConfig::new(), &[(0, 2), (1, 2)]).expect("graph");
    let legacy = ConnectivityConfig::new().with_convergence(Convergence::AllPassesChanged);

    for algorithm in [
        ConnectivityAlgorithm::DirectConnect,
        ConnectivityAlgorithm::RootConnect,
    ] {
        let stopped = connected_components(&graph, algorithm, &legacy).expect("legacy rule");
        assert_eq!(stopped.len(), 2, "{}", algorithm.name());
        assert!(stopped.same_component(NodeId(0), NodeId(2)));
        assert!(!stopped.same_component(NodeId(0), NodeId(1)));

        let converged = connected_components(&graph, algorithm, &ConnectivityConfig::default())
            .expect("default rule");
        assert_eq!(converged.len(), 1, "{}", algorithm.name());
        assert!(!converged.same_partition(&stopped));
    }
}

#[test]
fn test_round_limit_reports_algorithm() {
    let graph = random_graph(3, GraphConfig::new(), 50, 80);
    let config = ConnectivityConfig::new().with_max_rounds(1);

    let err = connected_components(&graph, ConnectivityAlgorithm::ParentConnect, &config)
        .expect_err("one round cannot reach a fixed point");
    match err {
        GraphError::NoConvergence { algorithm, rounds } => {
            assert_eq!(algorithm, "parent-connect");
            assert_eq!(rounds, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}
