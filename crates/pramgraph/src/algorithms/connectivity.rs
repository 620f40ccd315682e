//! Parallel connected components over a shared atomic parent array.
//!
//! Three PRAM-style algorithms, each iterating rounds of parallel passes to
//! a fixed point:
//!
//! - **Direct connect** (A): for every edge `(lo, hi)`, `parent[hi] =
//!   min(parent[hi], lo)`; then one shortcut pass and one alter pass.
//! - **Root connect** (RA): like A, but only nodes that were roots at the
//!   start of the round are re-linked.
//! - **Parent connect** (S): for every edge, the larger of the two current
//!   parents is linked under the smaller; then shortcut until stable. No
//!   alter pass.
//!
//! The shared array starts as `parent[i] = i`. Links always write the
//! smaller label, so `parent[x] <= x` holds throughout and no cycle can
//! form. Every concurrent write is an atomic `fetch_min`; each pass is a
//! rayon parallel iterator, whose completion is the round barrier.
//!
//! The shortcut pass reads a snapshot of the array and writes
//! `parent[v] = snapshot[snapshot[v]]`, halving path lengths. The alter pass
//! replaces every edge by the edge between its endpoints' parents and drops
//! edges whose endpoints share a parent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::models::{ComponentId, CsrMatrix, Graph, NodeId};
use crate::{parallel, GraphError, Result};

/// Default safety net for the number of rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 65_536;

/// Connected-components algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityAlgorithm {
    /// Direct connect + shortcut + alter ("A").
    DirectConnect,
    /// Root connect + shortcut + alter ("RA").
    RootConnect,
    /// Parent connect + repeated shortcut ("S").
    ParentConnect,
}

impl ConnectivityAlgorithm {
    /// All variants.
    pub const ALL: [ConnectivityAlgorithm; 3] = [
        ConnectivityAlgorithm::DirectConnect,
        ConnectivityAlgorithm::RootConnect,
        ConnectivityAlgorithm::ParentConnect,
    ];

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ConnectivityAlgorithm::DirectConnect => "direct-connect",
            ConnectivityAlgorithm::RootConnect => "root-connect",
            ConnectivityAlgorithm::ParentConnect => "parent-connect",
        }
    }
}

/// Stop rule for the connect/shortcut/alter round loop.
///
/// Only the direct-connect and root-connect algorithms consult it; parent
/// connect always stops after a connect pass that changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Convergence {
    /// Keep going while any pass of the round changed something.
    #[default]
    AnyPassChanged,
    /// Keep going only while every pass of the round changed something.
    ///
    /// Legacy rule. It can stop before the fixed point and report
    /// components that should have been merged.
    AllPassesChanged,
}

impl Convergence {
    fn keep_going(&self, changes: &[bool]) -> bool {
        match self {
            Convergence::AnyPassChanged => changes.iter().any(|&c| c),
            Convergence::AllPassesChanged => changes.iter().all(|&c| c),
        }
    }
}

/// Configuration for the parallel connectivity algorithms.
#[derive(Debug, Clone)]
pub struct ConnectivityConfig {
    /// Dedicated worker count; `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    /// Rounds before giving up with [`GraphError::NoConvergence`].
    pub max_rounds: usize,
    /// Round-loop stop rule.
    pub convergence: Convergence,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            convergence: Convergence::default(),
        }
    }
}

impl ConnectivityConfig {
    /// Create new connectivity configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Set the round limit.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the stop rule.
    pub fn with_convergence(mut self, convergence: Convergence) -> Self {
        self.convergence = convergence;
        self
    }
}

/// Partition of the nodes into connected components.
///
/// Components are sorted by their smallest member, so two partitions of the
/// same node set compare equal iff they group the nodes identically,
/// whatever representatives the algorithms picked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Components {
    sets: Vec<BTreeSet<NodeId>>,
    labels: BTreeMap<NodeId, ComponentId>,
}

impl Components {
    /// Group `node_ids[i]` by `roots[i]` (dense indices).
    pub(crate) fn from_roots(node_ids: &[NodeId], roots: &[u32]) -> Result<Self> {
        let mut groups: BTreeMap<u32, BTreeSet<NodeId>> = BTreeMap::new();
        for (i, &root) in roots.iter().enumerate() {
            let node = node_ids
                .get(i)
                .copied()
                .ok_or(GraphError::InvalidNodeId(i as u64))?;
            groups.entry(root).or_default().insert(node);
        }

        let mut sets: Vec<BTreeSet<NodeId>> = groups.into_values().collect();
        sets.sort_by_key(|set| set.first().copied());

        let mut labels = BTreeMap::new();
        for (id, set) in sets.iter().enumerate() {
            for &node in set {
                labels.insert(node, ComponentId::new(id as u32));
            }
        }

        Ok(Self { sets, labels })
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if there are no components (empty graph).
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Components, sorted by smallest member.
    pub fn sets(&self) -> &[BTreeSet<NodeId>] {
        &self.sets
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &BTreeSet<NodeId>> {
        self.sets.iter()
    }

    /// Consume into the component sets.
    pub fn into_sets(self) -> Vec<BTreeSet<NodeId>> {
        self.sets
    }

    /// Component of `node` (its position in [`Components::sets`]).
    pub fn component_of(&self, node: NodeId) -> Option<ComponentId> {
        self.labels.get(&node).copied()
    }

    /// Check if two nodes are in the same component.
    pub fn same_component(&self, a: NodeId, b: NodeId) -> bool {
        match (self.component_of(a), self.component_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Size of the component containing `node`.
    pub fn component_size(&self, node: NodeId) -> Option<usize> {
        self.component_of(node)
            .and_then(|c| self.sets.get(c.get() as usize))
            .map(BTreeSet::len)
    }

    /// Check if both partitions group the nodes identically.
    pub fn same_partition(&self, other: &Components) -> bool {
        self.sets == other.sets
    }
}

/// Connected components with the selected algorithm.
pub fn connected_components(
    graph: &Graph,
    algorithm: ConnectivityAlgorithm,
    config: &ConnectivityConfig,
) -> Result<Components> {
    match algorithm {
        ConnectivityAlgorithm::DirectConnect => components_direct_connect(graph, config),
        ConnectivityAlgorithm::RootConnect => components_root_connect(graph, config),
        ConnectivityAlgorithm::ParentConnect => components_parent_connect(graph, config),
    }
}

/// Connected components by direct connect, shortcut and alter ("A").
pub fn components_direct_connect(graph: &Graph, config: &ConnectivityConfig) -> Result<Components> {
    run_with_alter(graph, config, ConnectivityAlgorithm::DirectConnect)
}

/// Connected components by root connect, shortcut and alter ("RA").
pub fn components_root_connect(graph: &Graph, config: &ConnectivityConfig) -> Result<Components> {
    run_with_alter(graph, config, ConnectivityAlgorithm::RootConnect)
}

/// Connected components by parent connect and repeated shortcut ("S").
pub fn components_parent_connect(graph: &Graph, config: &ConnectivityConfig) -> Result<Components> {
    let algorithm = ConnectivityAlgorithm::ParentConnect;
    let csr = CsrMatrix::symmetric_from_graph(graph);
    let edges = csr.undirected_edges();
    let parent = ParentArray::new(csr.num_nodes());
    log_start(algorithm, &csr, edges.len());

    let rounds = parallel::install(config.num_threads, || {
        for round in 1..=config.max_rounds {
            let snapshot = parent.snapshot();
            let connected = parent_connect(&parent, &snapshot, &edges)?;

            // Flatten every tree to a star before the next connect pass
            let mut jumps = 0usize;
            while shortcut(&parent)? {
                jumps += 1;
                if jumps > config.max_rounds {
                    return Err(no_convergence(algorithm, config.max_rounds));
                }
            }

            trace!(
                algorithm = algorithm.name(),
                round,
                connected,
                jumps,
                "round finished"
            );
            if !connected {
                return Ok(round);
            }
        }
        Err(no_convergence(algorithm, config.max_rounds))
    })?;

    finish(algorithm, &csr, &parent, rounds)
}

fn run_with_alter(
    graph: &Graph,
    config: &ConnectivityConfig,
    algorithm: ConnectivityAlgorithm,
) -> Result<Components> {
    let csr = CsrMatrix::symmetric_from_graph(graph);
    let parent = ParentArray::new(csr.num_nodes());
    let mut edges = csr.undirected_edges();
    log_start(algorithm, &csr, edges.len());

    let rounds = parallel::install(config.num_threads, || {
        for round in 1..=config.max_rounds {
            let connected = match algorithm {
                ConnectivityAlgorithm::RootConnect => {
                    let snapshot = parent.snapshot();
                    root_connect(&parent, &snapshot, &edges)?
                }
                _ => direct_connect(&parent, &edges)?,
            };
            let shortened = shortcut(&parent)?;
            let (remaining, altered) = alter(&parent, &edges)?;
            edges = remaining;

            trace!(
                algorithm = algorithm.name(),
                round,
                connected,
                shortened,
                altered,
                edges = edges.len(),
                "round finished"
            );
            if !config
                .convergence
                .keep_going(&[connected, shortened, altered])
            {
                return Ok(round);
            }
        }
        Err(no_convergence(algorithm, config.max_rounds))
    })?;

    finish(algorithm, &csr, &parent, rounds)
}

fn log_start(algorithm: ConnectivityAlgorithm, csr: &CsrMatrix, edges: usize) {
    debug!(
        algorithm = algorithm.name(),
        nodes = csr.num_nodes(),
        edges,
        "connected components started"
    );
}

fn no_convergence(algorithm: ConnectivityAlgorithm, rounds: usize) -> GraphError {
    GraphError::NoConvergence {
        algorithm: algorithm.name(),
        rounds,
    }
}

fn finish(
    algorithm: ConnectivityAlgorithm,
    csr: &CsrMatrix,
    parent: &ParentArray,
    rounds: usize,
) -> Result<Components> {
    let roots = parent.resolve_roots()?;
    let components = Components::from_roots(csr.node_ids(), &roots)?;
    debug!(
        algorithm = algorithm.name(),
        rounds,
        components = components.len(),
        "connected components converged"
    );
    Ok(components)
}

/// Shared parent array, one atomic slot per dense index.
struct ParentArray {
    slots: Vec<AtomicU32>,
}

impl ParentArray {
    fn new(n: usize) -> Self {
        Self {
            slots: (0..n as u32).map(AtomicU32::new).collect(),
        }
    }

    fn slot(&self, idx: u32) -> Result<&AtomicU32> {
        self.slots
            .get(idx as usize)
            .ok_or(GraphError::InvalidNodeId(idx as u64))
    }

    fn load(&self, idx: u32) -> Result<u32> {
        Ok(self.slot(idx)?.load(Ordering::Acquire))
    }

    /// Link `idx` under `label` if that lowers it. Returns whether it did.
    fn link(&self, idx: u32, label: u32) -> Result<bool> {
        let previous = self.slot(idx)?.fetch_min(label, Ordering::AcqRel);
        Ok(previous > label)
    }

    fn snapshot(&self) -> Vec<u32> {
        self.slots
            .par_iter()
            .map(|p| p.load(Ordering::Acquire))
            .collect()
    }

    /// Follow every chain to its root.
    fn resolve_roots(&self) -> Result<Vec<u32>> {
        let snapshot = self.snapshot();
        let n = snapshot.len();

        (0..n as u32)
            .into_par_iter()
            .map(|i| {
                let mut node = i;
                // Labels strictly decrease along a chain, so n steps suffice
                for _ in 0..=n {
                    let next = *snapshot
                        .get(node as usize)
                        .ok_or(GraphError::InvalidNodeId(node as u64))?;
                    if next == node {
                        return Ok(node);
                    }
                    node = next;
                }
                Err(GraphError::InvalidNodeId(i as u64))
            })
            .collect()
    }
}

/// `parent[hi] = min(parent[hi], lo)` for every edge.
fn direct_connect(parent: &ParentArray, edges: &[(u32, u32)]) -> Result<bool> {
    edges
        .par_iter()
        .map(|&(v, w)| {
            let (lo, hi) = (v.min(w), v.max(w));
            if lo == hi {
                return Ok(false);
            }
            parent.link(hi, lo)
        })
        .try_reduce(|| false, |a, b| Ok(a || b))
}

/// Like [`direct_connect`], restricted to nodes that were roots when the
/// round started.
fn root_connect(parent: &ParentArray, snapshot: &[u32], edges: &[(u32, u32)]) -> Result<bool> {
    edges
        .par_iter()
        .map(|&(v, w)| {
            let (lo, hi) = (v.min(w), v.max(w));
            let hi_parent = *snapshot
                .get(hi as usize)
                .ok_or(GraphError::InvalidNodeId(hi as u64))?;
            if lo == hi || hi_parent != hi {
                return Ok(false);
            }
            parent.link(hi, lo)
        })
        .try_reduce(|| false, |a, b| Ok(a || b))
}

/// Link the larger of the endpoints' parents under the smaller one.
fn parent_connect(parent: &ParentArray, snapshot: &[u32], edges: &[(u32, u32)]) -> Result<bool> {
    edges
        .par_iter()
        .map(|&(v, w)| {
            let pv = *snapshot
                .get(v as usize)
                .ok_or(GraphError::InvalidNodeId(v as u64))?;
            let pw = *snapshot
                .get(w as usize)
                .ok_or(GraphError::InvalidNodeId(w as u64))?;
            if pv == pw {
                return Ok(false);
            }
            parent.link(pv.max(pw), pv.min(pw))
        })
        .try_reduce(|| false, |a, b| Ok(a || b))
}

/// One pointer-jumping pass: `parent[v] = old[old[v]]`.
fn shortcut(parent: &ParentArray) -> Result<bool> {
    let snapshot = parent.snapshot();

    (0..snapshot.len())
        .into_par_iter()
        .map(|v| {
            let pv = snapshot[v];
            let grandparent = *snapshot
                .get(pv as usize)
                .ok_or(GraphError::InvalidNodeId(pv as u64))?;
            if grandparent == pv {
                return Ok(false);
            }
            // Only worker v writes slot v in this pass
            parent.slots[v].store(grandparent, Ordering::Release);
            Ok(true)
        })
        .try_reduce(|| false, |a, b| Ok(a || b))
}

/// Move every edge onto its endpoints' parents, dropping edges that
/// collapsed into a single component.
fn alter(parent: &ParentArray, edges: &[(u32, u32)]) -> Result<(Vec<(u32, u32)>, bool)> {
    let altered: Vec<(Option<(u32, u32)>, bool)> = edges
        .par_iter()
        .map(|&(v, w)| {
            let pv = parent.load(v)?;
            let pw = parent.load(w)?;
            if pv == pw {
                return Ok((None, true));
            }
            let moved = (pv.min(pw), pv.max(pw));
            Ok((Some(moved), moved != (v, w)))
        })
        .collect::<Result<_>>()?;

    let changed = altered.iter().any(|&(_, c)| c);
    let remaining = altered.into_iter().filter_map(|(e, _)| e).collect();
    Ok((remaining, changed))
}
