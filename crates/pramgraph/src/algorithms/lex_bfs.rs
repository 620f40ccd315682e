//! Lexicographic BFS by ordered partition refinement.
//!
//! The state is an ordered list of blocks, starting as `{start}` followed by
//! every other node. Each round outputs the whole first block (ascending id
//! order), then splits every remaining block into the members adjacent to
//! the output block and the rest, keeping block order. Empty blocks are
//! dropped, so the first block is never empty and each round outputs at
//! least one node.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::trace;

use crate::models::{Graph, NodeId};
use crate::Result;

type Block = BTreeSet<NodeId>;

/// Lexicographic BFS ordering from `start`.
///
/// For directed graphs adjacency means out-neighbors.
pub fn lex_bfs(graph: &Graph, start: NodeId) -> Result<Vec<NodeId>> {
    graph.adjacent(start)?;

    let num_nodes = graph.number_of_nodes();
    let rest: Block = graph.nodes().filter(|&v| v != start).collect();

    let mut blocks: VecDeque<Block> = VecDeque::with_capacity(num_nodes);
    blocks.push_back(Block::from([start]));
    if !rest.is_empty() {
        blocks.push_back(rest);
    }

    let mut order = Vec::with_capacity(num_nodes);

    // Every round outputs at least one node
    for round in 0..num_nodes {
        let Some(block) = blocks.pop_front() else {
            break;
        };
        order.extend(block.iter().copied());
        if order.len() == num_nodes {
            break;
        }

        let mut pivot = HashSet::new();
        for &node in &block {
            pivot.extend(graph.neighbors(node)?);
        }

        blocks = refine(blocks, &pivot);
        trace!(round, output = order.len(), blocks = blocks.len(), "lex-bfs round");
    }

    Ok(order)
}

/// Split each block into (members in `pivot`, the rest), preserving order.
fn refine(blocks: VecDeque<Block>, pivot: &HashSet<NodeId>) -> VecDeque<Block> {
    let mut refined = VecDeque::with_capacity(blocks.len() * 2);

    for block in blocks {
        let (hit, miss): (Block, Block) = block.into_iter().partition(|v| pivot.contains(v));
        for part in [hit, miss] {
            if !part.is_empty() {
                refined.push_back(part);
            }
        }
    }

    refined
}
