//! Sequential breadth-first and depth-first traversal.
//!
//! Neighbors are enumerated in ascending id order, which fixes the tie-break
//! between nodes of the same BFS level or the same DFS stack frame.

use std::collections::{HashSet, VecDeque};

use crate::models::{Graph, NodeId};
use crate::Result;

/// Breadth-first visitation order from `start`.
///
/// Fails with [`crate::GraphError::NoSuchNode`] if `start` is absent.
pub fn bfs(graph: &Graph, start: NodeId) -> Result<Vec<NodeId>> {
    graph.adjacent(start)?;

    let mut order = Vec::with_capacity(graph.number_of_nodes());
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        order.push(node);

        for neighbor in graph.neighbors(node)? {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    Ok(order)
}

/// Stack-based depth-first visitation order from `start`.
///
/// Nodes are marked visited when pushed, and neighbors are pushed in
/// ascending order, so the largest unvisited neighbor is expanded first.
pub fn dfs(graph: &Graph, start: NodeId) -> Result<Vec<NodeId>> {
    graph.adjacent(start)?;

    let mut order = Vec::with_capacity(graph.number_of_nodes());
    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        order.push(node);

        for neighbor in graph.neighbors(node)? {
            if visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    Ok(order)
}

/// Backtracking depth-first preorder from `start`.
///
/// Each visited node is taken out of consideration, then the smallest
/// remaining neighbor is descended into until none is left. The store is
/// never modified.
pub fn dfs_preorder(graph: &Graph, start: NodeId) -> Result<Vec<NodeId>> {
    let mut order = vec![start];
    let mut visited = HashSet::from([start]);

    // Iterative DFS with one neighbor cursor per frame
    let mut stack = vec![graph.adjacent(start)?.keys()];

    while let Some(cursor) = stack.last_mut() {
        match cursor.find(|n| !visited.contains(*n)) {
            Some(&next) => {
                visited.insert(next);
                order.push(next);
                stack.push(graph.adjacent(next)?.keys());
            }
            None => {
                stack.pop();
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GraphConfig;
    use crate::GraphError;

    fn directed_sample() -> Graph {
        Graph::from_edges(
            GraphConfig::new().oriented(),
            &[(0, 1), (0, 2), (1, 2), (2, 0), (2, 3), (3, 3)],
        )
        .unwrap()
    }

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    /// Every node after the first must be reachable by one arc from an earlier one.
    fn assert_valid_traversal(graph: &Graph, order: &[NodeId]) {
        for (i, &node) in order.iter().enumerate().skip(1) {
            let has_parent = order[..i]
                .iter()
                .any(|&prev| graph.are_adjacent(prev, node).unwrap());
            assert!(has_parent, "node {} emitted before any neighbor", node);
        }
    }

    #[test]
    fn test_bfs_directed_sample() {
        let g = directed_sample();
        let order = bfs(&g, NodeId(2)).unwrap();

        assert_eq!(order, ids(&[2, 0, 3, 1]));
        assert_valid_traversal(&g, &order);
    }

    #[test]
    fn test_dfs_directed_sample() {
        let g = directed_sample();
        let order = dfs(&g, NodeId(0)).unwrap();

        assert_eq!(order, ids(&[0, 2, 3, 1]));
        assert_valid_traversal(&g, &order);
    }

    #[test]
    fn test_dfs_preorder_descends_first() {
        let g = directed_sample();
        let order = dfs_preorder(&g, NodeId(0)).unwrap();

        assert_eq!(order, ids(&[0, 1, 2, 3]));
        assert_valid_traversal(&g, &order);
    }

    #[test]
    fn test_dfs_preorder_backtracks() {
        // 0 - 1 - 2 and 0 - 3
        let g = Graph::from_edges(GraphConfig::new(), &[(0, 1), (1, 2), (0, 3)]).unwrap();
        let order = dfs_preorder(&g, NodeId(0)).unwrap();

        assert_eq!(order, ids(&[0, 1, 2, 3]));
    }

    #[test]
    fn test_traversal_stays_in_component() {
        let g = Graph::from_edges(GraphConfig::new(), &[(0, 1), (1, 2), (5, 6)]).unwrap();

        assert_eq!(bfs(&g, NodeId(1)).unwrap(), ids(&[1, 0, 2]));
        assert_eq!(dfs(&g, NodeId(5)).unwrap(), ids(&[5, 6]));
    }

    #[test]
    fn test_missing_start() {
        let g = directed_sample();

        assert!(matches!(
            bfs(&g, NodeId(42)),
            Err(GraphError::NoSuchNode(NodeId(42)))
        ));
        assert!(dfs(&g, NodeId(42)).is_err());
        assert!(dfs_preorder(&g, NodeId(42)).is_err());
    }
}
