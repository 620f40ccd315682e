//! Adjacency-based graph store.
//!
//! The graph owns a map from node id to its incident-edge map. Both maps are
//! ordered, so neighbor enumeration is always ascending by id and every
//! traversal built on top of it is deterministic.
//!
//! Invariants:
//! - Every endpoint of an inserted edge is a node, also in directed graphs.
//! - In undirected graphs `x -> y` is stored iff `y -> x` is stored.
//! - There is at most one entry per (source, neighbor): re-inserting an edge
//!   replaces its weight and does not change the edge count.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::node::NodeId;
use crate::{GraphError, Result};

/// Edge weight. Weights are non-negative by construction.
pub type Weight = u32;

/// Graph mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphConfig {
    /// Directed (`true`) or undirected (`false`) edges.
    pub oriented: bool,
    /// Edges carry a weight.
    pub weighted: bool,
}

impl GraphConfig {
    /// Create new configuration (undirected, unweighted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Use directed edges.
    pub fn oriented(mut self) -> Self {
        self.oriented = true;
        self
    }

    /// Require a weight on every edge.
    pub fn weighted(mut self) -> Self {
        self.weighted = true;
        self
    }
}

/// A logical edge as reported by [`Graph::list_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Source endpoint (the lower id for undirected graphs).
    pub source: NodeId,
    /// Destination endpoint.
    pub target: NodeId,
    /// Weight, `None` on unweighted graphs.
    pub weight: Option<Weight>,
}

/// In-memory graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, Weight>>,
    config: GraphConfig,
    num_edges: usize,
}

impl Graph {
    /// Create an empty graph with the given mode.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            adjacency: BTreeMap::new(),
            config,
            num_edges: 0,
        }
    }

    /// Undirected, unweighted graph.
    pub fn undirected() -> Self {
        Self::new(GraphConfig::new())
    }

    /// Directed, unweighted graph.
    pub fn directed() -> Self {
        Self::new(GraphConfig::new().oriented())
    }

    /// Undirected, weighted graph.
    pub fn weighted_undirected() -> Self {
        Self::new(GraphConfig::new().weighted())
    }

    /// Directed, weighted graph.
    pub fn weighted_directed() -> Self {
        Self::new(GraphConfig::new().oriented().weighted())
    }

    /// Build an unweighted graph from an edge list.
    pub fn from_edges(config: GraphConfig, edges: &[(u32, u32)]) -> Result<Self> {
        let mut graph = Self::new(config);
        for &(x, y) in edges {
            graph.insert_edge(x, y)?;
        }
        Ok(graph)
    }

    /// Build a weighted graph from an edge list.
    pub fn from_weighted_edges(config: GraphConfig, edges: &[(u32, u32, Weight)]) -> Result<Self> {
        let mut graph = Self::new(config);
        for &(x, y, w) in edges {
            graph.insert_weighted_edge(x, y, w)?;
        }
        Ok(graph)
    }

    /// Graph mode.
    pub fn config(&self) -> GraphConfig {
        self.config
    }

    /// Check if edges are directed.
    pub fn is_oriented(&self) -> bool {
        self.config.oriented
    }

    /// Check if edges carry weights.
    pub fn is_weighted(&self) -> bool {
        self.config.weighted
    }

    /// Number of nodes.
    pub fn number_of_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of distinct logical edges (a self-loop counts once).
    pub fn number_of_edges(&self) -> usize {
        self.num_edges
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// One past the largest node id, i.e. the length of arrays indexed by raw id.
    pub fn id_bound(&self) -> usize {
        self.adjacency
            .keys()
            .next_back()
            .map_or(0, |last| last.index() + 1)
    }

    /// Check if a node exists.
    pub fn has_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Iterate over nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// All nodes in ascending id order.
    pub fn list_nodes(&self) -> Vec<NodeId> {
        self.nodes().collect()
    }

    /// Add an isolated node. Returns false if it already existed.
    ///
    /// Fails with [`GraphError::InvalidNodeId`] for `u32::MAX`, which is
    /// reserved for [`NodeId::INVALID`].
    pub fn add_node(&mut self, x: u32) -> Result<bool> {
        let node = checked_id(x)?;
        if self.adjacency.contains_key(&node) {
            return Ok(false);
        }
        self.adjacency.insert(node, BTreeMap::new());
        Ok(true)
    }

    /// Insert an unweighted edge `x -> y` (and `y -> x` if undirected).
    ///
    /// Fails with [`GraphError::WeightOmitted`] on a weighted graph.
    pub fn insert_edge(&mut self, x: u32, y: u32) -> Result<()> {
        if self.config.weighted {
            return Err(GraphError::WeightOmitted);
        }
        self.insert(checked_id(x)?, checked_id(y)?, 0);
        Ok(())
    }

    /// Insert a weighted edge `x -> y` (and `y -> x` if undirected).
    ///
    /// Fails with [`GraphError::UnexpectedWeight`] on an unweighted graph.
    pub fn insert_weighted_edge(&mut self, x: u32, y: u32, weight: Weight) -> Result<()> {
        if !self.config.weighted {
            return Err(GraphError::UnexpectedWeight);
        }
        self.insert(checked_id(x)?, checked_id(y)?, weight);
        Ok(())
    }

    fn insert(&mut self, x: NodeId, y: NodeId, weight: Weight) {
        let existed = self
            .adjacency
            .entry(x)
            .or_default()
            .insert(y, weight)
            .is_some();

        let reverse = self.adjacency.entry(y).or_default();
        if !self.config.oriented {
            reverse.insert(x, weight);
        }

        if !existed {
            self.num_edges += 1;
        }
    }

    /// Adjacency map of a node.
    pub(crate) fn adjacent(&self, x: NodeId) -> Result<&BTreeMap<NodeId, Weight>> {
        self.adjacency.get(&x).ok_or(GraphError::NoSuchNode(x))
    }

    /// Iterate over the (out-)neighbors of `x` in ascending id order.
    pub fn neighbors(&self, x: NodeId) -> Result<impl Iterator<Item = NodeId> + '_> {
        Ok(self.adjacent(x)?.keys().copied())
    }

    /// Neighbors of `x` in ascending id order.
    pub fn list_neighbors(&self, x: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.neighbors(x)?.collect())
    }

    /// Neighbors of `x` paired with the connecting edge weight.
    ///
    /// Fails with [`GraphError::NotWeighted`] on an unweighted graph.
    pub fn list_neighbors_with_weight(&self, x: NodeId) -> Result<Vec<(NodeId, Weight)>> {
        if !self.config.weighted {
            return Err(GraphError::NotWeighted);
        }
        Ok(self.adjacent(x)?.iter().map(|(&n, &w)| (n, w)).collect())
    }

    /// Degree (out-degree for directed graphs) of `x`.
    pub fn grad(&self, x: NodeId) -> Result<usize> {
        Ok(self.adjacent(x)?.len())
    }

    /// Check if `y` is a neighbor of `x`.
    pub fn are_adjacent(&self, x: NodeId, y: NodeId) -> Result<bool> {
        Ok(self.adjacent(x)?.contains_key(&y))
    }

    /// Weight of the edge `x -> y`, if present.
    pub fn edge_weight(&self, x: NodeId, y: NodeId) -> Result<Option<Weight>> {
        if !self.config.weighted {
            return Err(GraphError::NotWeighted);
        }
        Ok(self.adjacent(x)?.get(&y).copied())
    }

    /// All edges in ascending (source, target) order.
    ///
    /// Undirected edges are reported once, lower id first.
    pub fn list_edges(&self) -> Vec<Edge> {
        let weighted = self.config.weighted;
        let oriented = self.config.oriented;

        self.adjacency
            .iter()
            .flat_map(|(&source, adj)| {
                adj.iter()
                    .filter(move |&(&target, _)| oriented || source <= target)
                    .map(move |(&target, &w)| Edge {
                        source,
                        target,
                        weight: weighted.then_some(w),
                    })
            })
            .collect()
    }

    /// Remove `n` and strip it from every adjacency.
    ///
    /// Fails with [`GraphError::NoSuchNode`] if `n` is absent.
    pub fn delete_node(&mut self, n: NodeId) -> Result<()> {
        let outgoing = self
            .adjacency
            .remove(&n)
            .ok_or(GraphError::NoSuchNode(n))?;
        let mut removed = outgoing.len();

        if self.config.oriented {
            for adj in self.adjacency.values_mut() {
                if adj.remove(&n).is_some() {
                    removed += 1;
                }
            }
        } else {
            for neighbor in outgoing.keys() {
                if let Some(adj) = self.adjacency.get_mut(neighbor) {
                    adj.remove(&n);
                }
            }
        }

        self.num_edges = self.num_edges.saturating_sub(removed);
        debug!(node = n.get(), removed_edges = removed, "deleted node");
        Ok(())
    }

    /// Coarse edge deletion: removes both endpoint nodes entirely.
    ///
    /// Use [`Graph::remove_edge`] to drop a single edge and keep its endpoints.
    pub fn delete_edge(&mut self, x: NodeId, y: NodeId) -> Result<()> {
        if !self.has_node(x) {
            return Err(GraphError::NoSuchNode(x));
        }
        if !self.has_node(y) {
            return Err(GraphError::NoSuchNode(y));
        }

        self.delete_node(x)?;
        if x != y {
            self.delete_node(y)?;
        }
        Ok(())
    }

    /// Remove the single edge `x -> y` (and `y -> x` if undirected).
    ///
    /// Returns whether the edge existed. Both nodes stay in the graph.
    pub fn remove_edge(&mut self, x: NodeId, y: NodeId) -> Result<bool> {
        if !self.has_node(y) {
            return Err(GraphError::NoSuchNode(y));
        }
        let removed = match self.adjacency.get_mut(&x) {
            Some(adj) => adj.remove(&y).is_some(),
            None => return Err(GraphError::NoSuchNode(x)),
        };

        if removed {
            if !self.config.oriented {
                if let Some(adj) = self.adjacency.get_mut(&y) {
                    adj.remove(&x);
                }
            }
            self.num_edges -= 1;
        }
        Ok(removed)
    }

    /// Contract the edge `(x, y)` by collapsing `x` into `y`.
    ///
    /// Returns the merged neighbor set `N(x) ∪ N(y) \ {x}` and deletes `x`.
    /// The adjacency of `y` is left as it was.
    pub fn contr_edge(&mut self, x: NodeId, y: NodeId) -> Result<BTreeSet<NodeId>> {
        let mut merged: BTreeSet<NodeId> = self.adjacent(x)?.keys().copied().collect();
        merged.extend(self.adjacent(y)?.keys().copied());
        merged.remove(&x);

        self.delete_node(x)?;
        debug!(
            removed = x.get(),
            into = y.get(),
            merged = merged.len(),
            "contracted edge"
        );
        Ok(merged)
    }
}

/// Raw ids are accepted up to `u32::MAX - 1`.
fn checked_id(x: u32) -> Result<NodeId> {
    let node = NodeId(x);
    if node.is_valid() {
        Ok(node)
    } else {
        Err(GraphError::InvalidNodeId(u64::from(x)))
    }
}
