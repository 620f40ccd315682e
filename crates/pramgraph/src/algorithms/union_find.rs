//! Sequential union-find over dense CSR indices.
//!
//! `find` uses path halving and `union` links by rank, with ties going to
//! the smaller index. [`components_sequential`] runs it over every edge of
//! the symmetric snapshot and is the baseline the parallel connectivity
//! algorithms are checked and benchmarked against.

use tracing::debug;

use super::connectivity::Components;
use crate::models::{CsrMatrix, Graph};
use crate::Result;

/// Disjoint sets over `0..n`.
#[derive(Debug, Clone)]
pub struct UnionFind {
    /// `parent[i] == i` for roots.
    parent: Vec<u32>,
    /// Upper bound on tree height, meaningful for roots only.
    rank: Vec<u8>,
    num_components: usize,
}

impl UnionFind {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            rank: vec![0; n],
            num_components: n,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets.
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Root of `x`'s set; every other node on the way is re-pointed to its
    /// grandparent.
    pub fn find(&mut self, mut x: u32) -> u32 {
        loop {
            let p = self.parent[x as usize];
            if p == x {
                return x;
            }
            let grandparent = self.parent[p as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
    }

    /// Merge the sets of `x` and `y`. Returns false if they already shared one.
    pub fn union(&mut self, x: u32, y: u32) -> bool {
        let (a, b) = (self.find(x), self.find(y));
        if a == b {
            return false;
        }

        let (ra, rb) = (self.rank[a as usize], self.rank[b as usize]);
        let (root, child) = match ra.cmp(&rb) {
            std::cmp::Ordering::Greater => (a, b),
            std::cmp::Ordering::Less => (b, a),
            std::cmp::Ordering::Equal => (a.min(b), a.max(b)),
        };
        self.parent[child as usize] = root;
        if ra == rb {
            self.rank[root as usize] = self.rank[root as usize].saturating_add(1);
        }

        self.num_components -= 1;
        true
    }

    pub fn connected(&mut self, x: u32, y: u32) -> bool {
        self.find(x) == self.find(y)
    }

    /// Root of every element.
    pub fn roots(&mut self) -> Vec<u32> {
        (0..self.parent.len() as u32).map(|i| self.find(i)).collect()
    }
}

/// Sequential connected components of the graph, arcs taken as undirected.
pub fn components_sequential(graph: &Graph) -> Result<Components> {
    let csr = CsrMatrix::symmetric_from_graph(graph);
    let mut uf = UnionFind::new(csr.num_nodes());

    for (u, v) in csr.undirected_edges() {
        uf.union(u, v);
    }

    debug!(
        nodes = csr.num_nodes(),
        components = uf.num_components(),
        "sequential union-find finished"
    );

    let roots = uf.roots();
    Components::from_roots(csr.node_ids(), &roots)
}
