//! Parallel breadth-first search.
//!
//! Level-synchronous BFS over a frozen CSR snapshot:
//! 1. Expand every node of the current frontier in parallel
//! 2. A worker claims a neighbor with an atomic test-and-set on its
//!    `visited` flag; only the winner records itself as parent and enqueues
//!    the neighbor into the next frontier
//! 3. The parallel iterator completing is the level barrier; repeat until
//!    the frontier is empty
//!
//! All nodes at distance k are settled before level k + 1 starts.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::models::{CsrMatrix, Distance, Graph, NodeId};
use crate::{parallel, GraphError, Result};

/// Parallel BFS configuration.
#[derive(Debug, Clone)]
pub struct BfsConfig {
    /// Maximum distance to explore.
    pub max_distance: u32,
    /// Dedicated worker count; `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
}

impl Default for BfsConfig {
    fn default() -> Self {
        Self {
            max_distance: u32::MAX - 1,
            num_threads: None,
        }
    }
}

impl BfsConfig {
    /// Create new BFS configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum distance.
    pub fn with_max_distance(mut self, max: u32) -> Self {
        self.max_distance = max;
        self
    }

    /// Run on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }
}

/// BFS spanning tree rooted at the source.
///
/// Arrays are indexed by raw node id (`0..graph.id_bound()`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsTree {
    source: NodeId,
    parents: Vec<NodeId>,
    distances: Vec<Distance>,
    order: Vec<NodeId>,
}

impl BfsTree {
    /// Root of the tree.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Parent per raw node id; `NodeId::INVALID` if unreached. The source is
    /// its own parent.
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Parent array as a flat `u32` buffer.
    pub fn raw_parents(&self) -> &[u32] {
        bytemuck::cast_slice(&self.parents)
    }

    /// Parent of `node` in the tree.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents
            .get(node.index())
            .copied()
            .filter(NodeId::is_valid)
    }

    /// Level of `node`; `Distance::INFINITY` if unreached.
    pub fn distance(&self, node: NodeId) -> Distance {
        self.distances
            .get(node.index())
            .copied()
            .unwrap_or(Distance::INFINITY)
    }

    /// Reached nodes level by level, ascending id within a level.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Set of reached nodes.
    pub fn reachable(&self) -> BTreeSet<NodeId> {
        self.order.iter().copied().collect()
    }

    /// Number of reached nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing was reached (never true for a valid source).
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tree path from the source to `target`.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        reconstruct_path(&self.parents, target)
    }
}

/// Parallel BFS from `source` with the default configuration.
pub fn bfs_parallel(graph: &Graph, source: NodeId) -> Result<BfsTree> {
    bfs_parallel_with_config(graph, source, &BfsConfig::default())
}

/// Parallel BFS with configuration.
pub fn bfs_parallel_with_config(
    graph: &Graph,
    source: NodeId,
    config: &BfsConfig,
) -> Result<BfsTree> {
    let csr = CsrMatrix::from_graph(graph);
    let src = csr.index_of(source).ok_or(GraphError::NoSuchNode(source))?;
    let n = csr.num_nodes();

    let visited: Vec<AtomicBool> = (0..n).map(|_| AtomicBool::new(false)).collect();
    let parent: Vec<AtomicU32> = (0..n).map(|_| AtomicU32::new(u32::MAX)).collect();
    visited[src as usize].store(true, Ordering::Relaxed);
    parent[src as usize].store(src, Ordering::Relaxed);

    debug!(
        source = source.get(),
        nodes = n,
        arcs = csr.num_nonzeros(),
        "parallel bfs started"
    );

    let levels = parallel::install(config.num_threads, || {
        let mut levels = vec![vec![src]];
        let mut level = 0u32;

        // Level-synchronous BFS
        while level < config.max_distance {
            let Some(frontier) = levels.last() else {
                break;
            };
            level += 1;

            let claimed: Vec<Vec<u32>> = frontier
                .par_iter()
                .map(|&u| claim_neighbors(&csr, &visited, &parent, u))
                .collect::<Result<_>>()?;

            let mut next: Vec<u32> = claimed.into_iter().flatten().collect();
            if next.is_empty() {
                break;
            }
            next.sort_unstable();
            trace!(level, frontier = next.len(), "bfs level settled");
            levels.push(next);
        }

        Ok(levels)
    })?;

    // Map dense indices back to raw node ids
    let bound = graph.id_bound();
    let mut parents = vec![NodeId::INVALID; bound];
    let mut distances = vec![Distance::INFINITY; bound];
    let mut order = Vec::with_capacity(n);

    for (depth, frontier) in levels.iter().enumerate() {
        for &idx in frontier {
            let node = csr.node_at(idx)?;
            let parent_idx = parent[idx as usize].load(Ordering::Acquire);
            parents[node.index()] = csr.node_at(parent_idx)?;
            distances[node.index()] = Distance::new(depth as u32);
            order.push(node);
        }
    }

    debug!(
        source = source.get(),
        reached = order.len(),
        levels = levels.len(),
        "parallel bfs finished"
    );

    Ok(BfsTree {
        source,
        parents,
        distances,
        order,
    })
}

/// Expand one frontier node, returning the neighbors this worker claimed.
fn claim_neighbors(
    csr: &CsrMatrix,
    visited: &[AtomicBool],
    parent: &[AtomicU32],
    u: u32,
) -> Result<Vec<u32>> {
    if u as usize >= visited.len() {
        return Err(GraphError::InvalidNodeId(u as u64));
    }

    let mut claimed = Vec::new();
    for &v in csr.neighbors(u) {
        let flag = visited
            .get(v as usize)
            .ok_or(GraphError::InvalidNodeId(v as u64))?;

        // Plain read first, then a single test-and-set decides the winner
        if !flag.load(Ordering::Relaxed) && !flag.swap(true, Ordering::AcqRel) {
            parent[v as usize].store(u, Ordering::Release);
            claimed.push(v);
        }
    }
    Ok(claimed)
}

/// Reconstruct path from source to target using parent pointers.
///
/// `parents` is indexed by raw node id and the source is its own parent.
pub fn reconstruct_path(parents: &[NodeId], target: NodeId) -> Option<Vec<NodeId>> {
    let target_idx = target.index();
    if target_idx >= parents.len() || !parents[target_idx].is_valid() {
        return None;
    }

    let mut path = vec![target];
    let mut current = target;

    // Walk back to source
    while parents[current.index()] != current {
        current = parents[current.index()];
        if !current.is_valid() || path.len() > parents.len() {
            return None;
        }
        path.push(current);
    }

    path.reverse();
    Some(path)
}
