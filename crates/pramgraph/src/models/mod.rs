//! Graph data models.
//!
//! This module provides the core data structures for representing graphs:
//! - [`Graph`]: ordered adjacency store with node/edge CRUD
//! - [`CsrMatrix`]: frozen Compressed Sparse Row snapshot for parallel passes
//! - [`NodeId`], [`Distance`], [`Cost`], [`ComponentId`]: Graph node types

pub mod csr;
pub mod graph;
pub mod node;

pub use csr::CsrMatrix;
pub use graph::{Edge, Graph, GraphConfig, Weight};
pub use node::{ComponentId, Cost, Distance, NodeId};
