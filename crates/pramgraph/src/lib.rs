//! In-memory graph store with sequential and parallel graph algorithms.
//!
//! This crate provides an adjacency-based graph and a family of algorithms
//! over it:
//!
//! - **Graph**: directed/undirected, weighted/unweighted adjacency store
//! - **Traversal**: BFS, DFS and depth-first preorder
//! - **Lex-BFS**: partition-refinement ordering for chordal-graph recognition
//! - **Shortest paths**: Dijkstra and A*
//! - **Parallel BFS**: level-synchronous BFS with atomic claiming
//! - **Connectivity**: three PRAM-style connected-components algorithms
//!   (direct connect, root connect, parent connect) over a shared atomic
//!   parent array
//!
//! # Example
//!
//! ```
//! use pramgraph::{bfs, connected_components, ConnectivityAlgorithm, ConnectivityConfig};
//! use pramgraph::{Graph, NodeId};
//!
//! let mut graph = Graph::undirected();
//! graph.insert_edge(0, 1)?;
//! graph.insert_edge(1, 2)?;
//! graph.insert_edge(3, 4)?;
//!
//! let order = bfs(&graph, NodeId(0))?;
//! assert_eq!(order, vec![NodeId(0), NodeId(1), NodeId(2)]);
//!
//! let components = connected_components(
//!     &graph,
//!     ConnectivityAlgorithm::RootConnect,
//!     &ConnectivityConfig::default(),
//! )?;
//! assert_eq!(components.len(), 2);
//! # Ok::<(), pramgraph::GraphError>(())
//! ```

pub mod algorithms;
pub mod models;
mod parallel;

// Re-export main types
pub use algorithms::bfs::{bfs_parallel, bfs_parallel_with_config, BfsConfig, BfsTree};
pub use algorithms::connectivity::{
    components_direct_connect, components_parent_connect, components_root_connect,
    connected_components, Components, ConnectivityAlgorithm, ConnectivityConfig, Convergence,
};
pub use algorithms::lex_bfs::lex_bfs;
pub use algorithms::shortest_path::{astar, dijkstra, AStarPath, ShortestPaths};
pub use algorithms::traversal::{bfs, dfs, dfs_preorder};
pub use algorithms::union_find::{components_sequential, UnionFind};
pub use models::csr::CsrMatrix;
pub use models::graph::{Edge, Graph, GraphConfig, Weight};
pub use models::node::{ComponentId, Cost, Distance, NodeId};

/// Graph error types.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Weight-dependent operation on an unweighted graph.
    #[error("Graph not weighted")]
    NotWeighted,

    /// Edge inserted without a weight into a weighted graph.
    #[error("Weight omitted on weighted graph")]
    WeightOmitted,

    /// Edge inserted with a weight into an unweighted graph.
    #[error("Unexpected weight on unweighted graph")]
    UnexpectedWeight,

    /// Query against a node that is not in the graph.
    #[error("No such node: {0}")]
    NoSuchNode(NodeId),

    /// Reserved raw id on insert, or dense index out of range inside a
    /// parallel pass.
    #[error("Invalid node ID: {0}")]
    InvalidNodeId(u64),

    /// Invalid CSR snapshot.
    #[error("Invalid CSR format: {0}")]
    InvalidCsr(String),

    /// Iteration safety net tripped before reaching a fixed point.
    #[error("{algorithm} did not converge within {rounds} rounds")]
    NoConvergence {
        algorithm: &'static str,
        rounds: usize,
    },

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
