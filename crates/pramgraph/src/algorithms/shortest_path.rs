//! Weighted shortest paths: Dijkstra and A*.
//!
//! Both run on non-negative integer weights with a binary-heap priority
//! queue and lazy deletion of stale entries. Result arrays are indexed by
//! raw node id (`0..graph.id_bound()`).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{debug, trace};

use super::bfs::reconstruct_path;
use crate::models::{Cost, Graph, NodeId};
use crate::{GraphError, Result};

/// Single-source shortest path distances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: NodeId,
    distances: Vec<Cost>,
    predecessors: Vec<NodeId>,
}

impl ShortestPaths {
    /// Source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Distance per raw node id; `Cost::INFINITY` for unreachable or absent ids.
    pub fn distances(&self) -> &[Cost] {
        &self.distances
    }

    /// Distance to `node`.
    pub fn distance(&self, node: NodeId) -> Cost {
        self.distances
            .get(node.index())
            .copied()
            .unwrap_or(Cost::INFINITY)
    }

    /// Predecessor on a shortest path (the source is its own predecessor).
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessors
            .get(node.index())
            .copied()
            .filter(NodeId::is_valid)
    }

    /// Shortest path from the source to `target`, both inclusive.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        reconstruct_path(&self.predecessors, target)
    }

    /// Consume into the distance array.
    pub fn into_distances(self) -> Vec<Cost> {
        self.distances
    }
}

/// Dijkstra's single-source shortest paths.
///
/// Fails with [`GraphError::NotWeighted`] on an unweighted graph and with
/// [`GraphError::NoSuchNode`] if `source` is absent.
pub fn dijkstra(graph: &Graph, source: NodeId) -> Result<ShortestPaths> {
    if !graph.is_weighted() {
        return Err(GraphError::NotWeighted);
    }
    graph.adjacent(source)?;

    let bound = graph.id_bound();
    let mut distances = vec![Cost::INFINITY; bound];
    let mut predecessors = vec![NodeId::INVALID; bound];
    distances[source.index()] = Cost::ZERO;
    predecessors[source.index()] = source;

    let mut heap = BinaryHeap::new();
    heap.push(Reverse((Cost::ZERO, source)));
    let mut settled = 0usize;

    while let Some(Reverse((dist, node))) = heap.pop() {
        // Skip if we've already found a better path
        if dist > distances[node.index()] {
            continue;
        }
        settled += 1;

        for (&neighbor, &weight) in graph.adjacent(node)? {
            let candidate = dist.add(u64::from(weight));
            let slot = neighbor.index();
            if candidate < distances[slot] {
                distances[slot] = candidate;
                predecessors[slot] = node;
                heap.push(Reverse((candidate, neighbor)));
            }
        }
    }

    debug!(source = source.get(), settled, "dijkstra finished");

    Ok(ShortestPaths {
        source,
        distances,
        predecessors,
    })
}

/// Path found by [`astar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AStarPath {
    /// Total weight of the path.
    pub cost: Cost,
    /// Nodes from start to goal, both inclusive.
    pub path: Vec<NodeId>,
    /// Number of node expansions, re-expansions of re-opened nodes included.
    pub expanded: usize,
    /// Number of times a closed node was re-opened by a cheaper path.
    pub reopened: usize,
}

/// A* search from `start` to `goal`.
///
/// The open set is ordered by `f = g + h`. A closed node is re-opened when a
/// strictly cheaper path to it is found, and the search stops when the goal
/// is popped. `heuristic` must be admissible for the returned cost to be
/// optimal; this is not checked.
///
/// Returns `Ok(None)` if the goal is unreachable.
pub fn astar<H>(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    heuristic: H,
) -> Result<Option<AStarPath>>
where
    H: Fn(NodeId) -> u64,
{
    if !graph.is_weighted() {
        return Err(GraphError::NotWeighted);
    }
    graph.adjacent(start)?;
    graph.adjacent(goal)?;

    let bound = graph.id_bound();
    let mut g_score = vec![Cost::INFINITY; bound];
    let mut parents = vec![NodeId::INVALID; bound];
    let mut closed = vec![false; bound];
    g_score[start.index()] = Cost::ZERO;
    parents[start.index()] = start;

    // Open set: (f, g, node)
    let mut open = BinaryHeap::new();
    open.push(Reverse((Cost::ZERO.add(heuristic(start)), Cost::ZERO, start)));
    let mut expanded = 0usize;
    let mut reopened = 0usize;

    while let Some(Reverse((_, g, node))) = open.pop() {
        if g > g_score[node.index()] {
            continue;
        }

        if node == goal {
            debug!(
                start = start.get(),
                goal = goal.get(),
                cost = g.get(),
                expanded,
                reopened,
                "a* reached goal"
            );
            let path = reconstruct_path(&parents, goal).unwrap_or_default();
            return Ok(Some(AStarPath {
                cost: g,
                path,
                expanded,
                reopened,
            }));
        }

        closed[node.index()] = true;
        expanded += 1;

        for (&successor, &weight) in graph.adjacent(node)? {
            let tentative = g.add(u64::from(weight));
            let slot = successor.index();
            if tentative < g_score[slot] {
                g_score[slot] = tentative;
                parents[slot] = node;
                if closed[slot] {
                    closed[slot] = false;
                    reopened += 1;
                    trace!(node = successor.get(), "re-opened closed node");
                }
                open.push(Reverse((
                    tentative.add(heuristic(successor)),
                    tentative,
                    successor,
                )));
            }
        }
    }

    debug!(
        start = start.get(),
        goal = goal.get(),
        expanded,
        reopened,
        "a* goal unreachable"
    );
    Ok(None)
}
