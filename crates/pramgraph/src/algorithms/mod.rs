//! Graph algorithms.
//!
//! Sequential:
//! - [`traversal`]: BFS, DFS and depth-first preorder
//! - [`lex_bfs`]: Lexicographic BFS by partition refinement
//! - [`shortest_path`]: Dijkstra and A*
//! - [`union_find`]: Sequential disjoint-set connected components
//!
//! Parallel:
//! - [`bfs`]: Level-synchronous BFS with atomic claiming
//! - [`connectivity`]: PRAM-style connected components

pub mod bfs;
pub mod connectivity;
pub mod lex_bfs;
pub mod shortest_path;
pub mod traversal;
pub mod union_find;

pub use bfs::{bfs_parallel, bfs_parallel_with_config, BfsConfig, BfsTree};
pub use connectivity::{
    components_direct_connect, components_parent_connect, components_root_connect,
    connected_components, Components, ConnectivityAlgorithm, ConnectivityConfig, Convergence,
};
pub use lex_bfs::lex_bfs;
pub use shortest_path::{astar, dijkstra, AStarPath, ShortestPaths};
pub use traversal::{bfs, dfs, dfs_preorder};
pub use union_find::{components_sequential, UnionFind};
