//! Compressed Sparse Row (CSR) snapshot of a [`Graph`].
//!
//! The parallel algorithms never touch the ordered adjacency maps of the
//! store. They run on a frozen, dense-indexed CSR copy instead:
//! - dense index `i` is the `i`-th smallest node id
//! - `row_ptr[i]` = starting index in col_idx for row i
//! - `col_idx[row_ptr[i]..row_ptr[i+1]]` = dense neighbor indices of row i
//! - `values` (optional) = edge weights

use super::graph::{Graph, Weight};
use super::node::NodeId;
use crate::{GraphError, Result};

/// Frozen CSR adjacency with a dense index space.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    /// Number of rows (nodes).
    pub num_rows: usize,
    /// Row pointers (length = num_rows + 1).
    pub row_ptr: Vec<u64>,
    /// Column indices (length = nnz), ascending within each row.
    pub col_idx: Vec<u32>,
    /// Optional edge weights.
    pub values: Option<Vec<Weight>>,
    /// Node id of each dense index, ascending.
    node_ids: Vec<NodeId>,
}

impl CsrMatrix {
    /// Snapshot the graph as stored (out-arcs for directed graphs).
    pub fn from_graph(graph: &Graph) -> Self {
        Self::build(graph, false)
    }

    /// Snapshot the graph with every arc also stored in reverse.
    ///
    /// This is the undirected view used by connectivity algorithms.
    pub fn symmetric_from_graph(graph: &Graph) -> Self {
        Self::build(graph, graph.is_oriented())
    }

    fn build(graph: &Graph, add_reverse: bool) -> Self {
        let node_ids = graph.list_nodes();
        let weighted = graph.is_weighted();
        let mut edges = Vec::with_capacity(graph.number_of_edges() * 2);

        for (src, &node) in node_ids.iter().enumerate() {
            let Ok(adj) = graph.adjacent(node) else {
                continue;
            };
            for (&neighbor, &w) in adj {
                let Ok(dst) = node_ids.binary_search(&neighbor) else {
                    continue;
                };
                let weight = weighted.then_some(w);
                edges.push((src as u32, dst as u32, weight));
                if add_reverse {
                    edges.push((dst as u32, src as u32, weight));
                }
            }
        }

        CsrMatrixBuilder { node_ids, edges }.build()
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_rows
    }

    /// Number of non-zero entries (stored arcs).
    pub fn num_nonzeros(&self) -> usize {
        self.col_idx.len()
    }

    /// Check if the snapshot has no arcs.
    pub fn is_empty(&self) -> bool {
        self.col_idx.is_empty()
    }

    /// Dense index of a node id.
    pub fn index_of(&self, node: NodeId) -> Option<u32> {
        self.node_ids
            .binary_search(&node)
            .ok()
            .map(|i| i as u32)
    }

    /// Node id at a dense index.
    pub fn node_at(&self, idx: u32) -> Result<NodeId> {
        self.node_ids
            .get(idx as usize)
            .copied()
            .ok_or(GraphError::InvalidNodeId(idx as u64))
    }

    /// Node ids in dense-index order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    /// Degree (number of stored arcs) of a dense index.
    pub fn degree(&self, idx: u32) -> usize {
        let i = idx as usize;
        if i >= self.num_rows {
            return 0;
        }
        (self.row_ptr[i + 1] - self.row_ptr[i]) as usize
    }

    /// Dense neighbor indices of a dense index.
    pub fn neighbors(&self, idx: u32) -> &[u32] {
        let i = idx as usize;
        if i >= self.num_rows {
            return &[];
        }
        let start = self.row_ptr[i] as usize;
        let end = self.row_ptr[i + 1] as usize;
        &self.col_idx[start..end]
    }

    /// Each stored arc between distinct nodes once, as `(low, high)` dense pairs.
    ///
    /// On a symmetric snapshot this is exactly the undirected edge set.
    pub fn undirected_edges(&self) -> Vec<(u32, u32)> {
        let mut edges = Vec::with_capacity(self.col_idx.len() / 2);
        for row in 0..self.num_rows as u32 {
            for &col in self.neighbors(row) {
                if row < col {
                    edges.push((row, col));
                }
            }
        }
        edges
    }

    /// Validate CSR structure.
    pub fn validate(&self) -> Result<()> {
        if self.row_ptr.len() != self.num_rows + 1 {
            return Err(GraphError::InvalidCsr(format!(
                "row_ptr length {} != num_rows + 1 = {}",
                self.row_ptr.len(),
                self.num_rows + 1
            )));
        }

        for i in 0..self.num_rows {
            if self.row_ptr[i] > self.row_ptr[i + 1] {
                return Err(GraphError::InvalidCsr(format!(
                    "row_ptr not monotonic at index {}",
                    i
                )));
            }
        }

        let nnz = *self.row_ptr.last().unwrap_or(&0) as usize;
        if nnz != self.col_idx.len() {
            return Err(GraphError::InvalidCsr(format!(
                "row_ptr[-1] = {} != col_idx.len() = {}",
                nnz,
                self.col_idx.len()
            )));
        }

        if let Some(ref vals) = self.values {
            if vals.len() != self.col_idx.len() {
                return Err(GraphError::InvalidCsr(format!(
                    "values.len() = {} != col_idx.len() = {}",
                    vals.len(),
                    self.col_idx.len()
                )));
            }
        }

        // Every column must address a row
        for &col in &self.col_idx {
            if col as usize >= self.num_rows {
                return Err(GraphError::InvalidCsr(format!(
                    "col_idx {} >= num_rows {}",
                    col, self.num_rows
                )));
            }
        }

        Ok(())
    }
}

/// Builder for CSR snapshots.
#[derive(Debug, Default)]
struct CsrMatrixBuilder {
    node_ids: Vec<NodeId>,
    edges: Vec<(u32, u32, Option<Weight>)>,
}

impl CsrMatrixBuilder {
    fn build(mut self) -> CsrMatrix {
        let num_nodes = self.node_ids.len();

        // Sort by (source, destination) and keep one arc per pair
        self.edges.sort_by_key(|e| (e.0, e.1));
        self.edges.dedup_by_key(|e| (e.0, e.1));

        let has_weights = self.edges.iter().any(|e| e.2.is_some());

        let mut row_ptr = vec![0u64; num_nodes + 1];
        for &(src, _, _) in &self.edges {
            if (src as usize) < num_nodes {
                row_ptr[src as usize + 1] += 1;
            }
        }

        // Cumulative sum
        for i in 1..=num_nodes {
            row_ptr[i] += row_ptr[i - 1];
        }

        let col_idx: Vec<u32> = self.edges.iter().map(|e| e.1).collect();
        let values = if has_weights {
            Some(self.edges.iter().map(|e| e.2.unwrap_or(0)).collect())
        } else {
            None
        };

        CsrMatrix {
            num_rows: num_nodes,
            row_ptr,
            col_idx,
            values,
            node_ids: self.node_ids,
        }
    }
}
