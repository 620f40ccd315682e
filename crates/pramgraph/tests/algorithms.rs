//! Integration tests for the graph store and the traversal and
//! shortest-path algorithms.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pramgraph::{
    astar, bfs, bfs_parallel, bfs_parallel_with_config, dfs, dfs_preorder, dijkstra, lex_bfs,
    BfsConfig, Cost, CsrMatrix, Distance, Graph, GraphConfig, GraphError, NodeId,
};

fn random_weighted_graph(seed: u64, config: GraphConfig, nodes: u32, edges: usize) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(config.weighted());
    for node in 0..nodes {
        graph.add_node(node).expect("node id in range");
    }
    for _ in 0..edges {
        let x = rng.gen_range(0..nodes);
        let y = rng.gen_range(0..nodes);
        let w = rng.gen_range(1..100);
        graph.insert_weighted_edge(x, y, w).expect("weighted insert");
    }
    graph
}

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
fn test_edge_scenario_counts() {
    let mut graph = Graph::undirected();
    graph.insert_edge(1, 2).unwrap();
    graph.insert_edge(2, 3).unwrap();
    graph.insert_edge(1, 2).unwrap();

    assert_eq!(graph.number_of_nodes(), 3);
    assert_eq!(graph.number_of_edges(), 2);
    assert!(graph.are_adjacent(NodeId(2), NodeId(1)).unwrap());

    graph.delete_node(NodeId(2)).unwrap();
    assert_eq!(graph.number_of_edges(), 0);
    assert_eq!(graph.list_nodes(), vec![NodeId(1), NodeId(3)]);
}

#[test]
fn test_weight_policy_errors() {
    let mut weighted = Graph::weighted_directed();
    assert!(matches!(
        weighted.insert_edge(0, 1),
        Err(GraphError::WeightOmitted)
    ));

    let mut plain = Graph::directed();
    assert!(matches!(
        plain.insert_weighted_edge(0, 1, 5),
        Err(GraphError::UnexpectedWeight)
    ));
    plain.insert_edge(0, 1).unwrap();
    assert!(matches!(
        plain.list_neighbors_with_weight(NodeId(0)),
        Err(GraphError::NotWeighted)
    ));
}

#[test]
fn test_parallel_bfs_levels_match_sequential_bfs() {
    for seed in 0..6 {
        let graph = random_graph(seed, GraphConfig::new().oriented(), 250, 600);
        let config = BfsConfig::new().with_threads(4);

        for source in [0, 17, 101, 249].map(NodeId) {
            let sequential = bfs(&graph, source).unwrap();
            let tree = bfs_parallel_with_config(&graph, source, &config).unwrap();

            let expected: BTreeSet<_> = sequential.iter().copied().collect();
            assert_eq!(tree.reachable(), expected);

            // Levels never decrease along the order and every parent is one level up
            let levels: Vec<u32> = tree.order().iter().map(|&n| tree.distance(n).get()).collect();
            assert!(levels.windows(2).all(|w| w[0] <= w[1]));
            for &node in tree.order().iter().skip(1) {
                let parent = tree.parent(node).unwrap();
                assert!(graph.are_adjacent(parent, node).unwrap());
                assert_eq!(tree.distance(parent).increment(), tree.distance(node));
            }
        }
    }
}

#[test]
fn test_parallel_bfs_distances_equal_unit_dijkstra() {
    let plain = random_graph(9, GraphConfig::new(), 150, 260);
    let mut unit = Graph::weighted_undirected();
    for node in plain.nodes() {
        unit.add_node(node.get()).unwrap();
    }
    for edge in plain.list_edges() {
        unit.insert_weighted_edge(edge.source.get(), edge.target.get(), 1)
            .unwrap();
    }

    let tree = bfs_parallel(&plain, NodeId(0)).unwrap();
    let paths = dijkstra(&unit, NodeId(0)).unwrap();

    for node in plain.nodes() {
        let hops = tree.distance(node);
        let cost = paths.distance(node);
        if hops == Distance::INFINITY {
            assert_eq!(cost, Cost::INFINITY);
        } else {
            assert_eq!(cost, Cost::new(u64::from(hops.get())));
        }
    }
}

#[test]
fn test_dijkstra_matches_zero_heuristic_astar() {
    for seed in 0..4 {
        let graph = random_weighted_graph(seed, GraphConfig::new().oriented(), 80, 320);
        let paths = dijkstra(&graph, NodeId(0)).unwrap();

        for goal in graph.nodes().step_by(7) {
            let found = astar(&graph, NodeId(0), goal, |_| 0).unwrap();
            match found {
                Some(route) => {
                    assert_eq!(route.cost, paths.distance(goal));
                    assert_eq!(route.path.first(), Some(&NodeId(0)));
                    assert_eq!(route.path.last(), Some(&goal));
                }
                None => assert_eq!(paths.distance(goal), Cost::INFINITY),
            }
        }
    }
}

#[test]
fn test_dijkstra_paths_sum_to_distance() {
    let graph = random_weighted_graph(11, GraphConfig::new(), 60, 180);
    let paths = dijkstra(&graph, NodeId(5)).unwrap();

    for node in graph.nodes() {
        let Some(path) = paths.path_to(node) else {
            assert_eq!(paths.distance(node), Cost::INFINITY);
            continue;
        };
        let total: u64 = path
            .windows(2)
            .map(|hop| u64::from(graph.edge_weight(hop[0], hop[1]).unwrap().unwrap()))
            .sum();
        assert_eq!(Cost::new(total), paths.distance(node));
    }
}

#[test]
fn test_traversals_visit_reachable_set_once() {
    let graph = random_graph(21, GraphConfig::new(), 120, 140);

    for start in [0, 60, 119].map(NodeId) {
        let breadth = bfs(&graph, start).unwrap();
        let depth = dfs(&graph, start).unwrap();
        let preorder = dfs_preorder(&graph, start).unwrap();

        let reachable: BTreeSet<_> = breadth.iter().copied().collect();
        assert_eq!(reachable.len(), breadth.len());
        for order in [&depth, &preorder] {
            assert_eq!(order.len(), breadth.len());
            assert_eq!(order.iter().copied().collect::<BTreeSet<_>>(), reachable);
            assert_eq!(order[0], start);
        }
    }
}

#[test]
fn test_lex_bfs_is_permutation_of_all_nodes() {
    let graph = random_graph(5, GraphConfig::new(), 90, 200);
    let mut order = lex_bfs(&graph, NodeId(3)).unwrap();

    assert_eq!(order[0], NodeId(3));
    order.sort();
    assert_eq!(order, graph.list_nodes());
}

#[test]
fn test_csr_snapshot_is_valid() {
    let graph = random_graph(13, GraphConfig::new().oriented(), 100, 400);

    let csr = CsrMatrix::from_graph(&graph);
    csr.validate().unwrap();
    assert_eq!(csr.num_nodes(), graph.number_of_nodes());
    assert_eq!(csr.num_nonzeros(), graph.number_of_edges());

    let symmetric = CsrMatrix::symmetric_from_graph(&graph);
    symmetric.validate().unwrap();
    for (u, v) in symmetric.undirected_edges() {
        assert!(symmetric.neighbors(v).contains(&u));
    }
}

#[test]
fn test_absent_start_nodes() {
    let graph = random_graph(1, GraphConfig::new(), 10, 10);
    let missing = NodeId(500);

    assert!(matches!(bfs(&graph, missing), Err(GraphError::NoSuchNode(_))));
    assert!(matches!(dfs(&graph, missing), Err(GraphError::NoSuchNode(_))));
    assert!(matches!(lex_bfs(&graph, missing), Err(GraphError::NoSuchNode(_))));
    assert!(matches!(
        bfs_parallel(&graph, missing),
        Err(GraphError::NoSuchNode(_))
    ));
}
