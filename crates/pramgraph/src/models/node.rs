//! Id and distance newtypes shared by the graph store and the algorithms.
//!
//! - [`NodeId`]: raw node identifier as inserted by the caller
//! - [`Distance`]: hop count from a BFS source
//! - [`Cost`]: sum of edge weights along a path
//! - [`ComponentId`]: position of a component in a [`crate::Components`] list
//!
//! All four are `#[repr(transparent)]` and `Pod`, so result arrays can be
//! viewed as flat integer buffers.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// Node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node" in parent and predecessor arrays.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Check if this is a real node id rather than the sentinel.
    pub const fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Raw id.
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Slot of this node in arrays indexed by raw id.
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.index()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SAFETY: NodeId is #[repr(transparent)] over u32
unsafe impl Zeroable for NodeId {}
unsafe impl Pod for NodeId {}

/// BFS level of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Distance(pub u32);

impl Distance {
    /// Not reached.
    pub const INFINITY: Distance = Distance(u32::MAX);

    pub const fn new(d: u32) -> Self {
        Distance(d)
    }

    pub const fn is_reachable(&self) -> bool {
        self.0 != u32::MAX
    }

    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Next level; infinity stays infinity.
    pub const fn increment(&self) -> Self {
        Distance(self.0.saturating_add(1))
    }
}

// SAFETY: Distance is #[repr(transparent)] over u32
unsafe impl Zeroable for Distance {}
unsafe impl Pod for Distance {}

/// Weighted path cost.
///
/// Edge weights are `u32` and costs accumulate in `u64`, so no realistic
/// path reaches the `INFINITY` sentinel by summation. Addition saturates
/// anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Cost(pub u64);

impl Cost {
    /// Unreachable.
    pub const INFINITY: Cost = Cost(u64::MAX);

    /// Cost of the source itself.
    pub const ZERO: Cost = Cost(0);

    pub const fn new(c: u64) -> Self {
        Cost(c)
    }

    pub const fn is_reachable(&self) -> bool {
        self.0 != u64::MAX
    }

    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Extend the path by one edge of `weight`.
    pub const fn add(&self, weight: u64) -> Self {
        Cost(self.0.saturating_add(weight))
    }
}

// SAFETY: Cost is #[repr(transparent)] over u64
unsafe impl Zeroable for Cost {}
unsafe impl Pod for Cost {}

/// Connected component label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentId(pub u32);

impl ComponentId {
    pub const fn new(id: u32) -> Self {
        ComponentId(id)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

// SAFETY: ComponentId is #[repr(transparent)] over u32
unsafe impl Zeroable for ComponentId {}
unsafe impl Pod for ComponentId {}
