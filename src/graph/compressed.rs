//! Compressed author interaction graph

use std::collections::HashMap;

use petgraph::Direction;

/// Compressed sparse representation of the directed reply graph.
///
/// Nodes are authors, numbered in order of first appearance in the input.
/// An edge `u -> v` means `u` replied to a comment written by `v`. The graph
/// is simple (no parallel edges) but may contain self-loops. Both directions
/// are stored so in-degree and reverse traversals are as cheap as forward ones.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// offsets[i] to offsets[i+1] defines the outgoing edge range for node i
    pub offsets: Vec<u32>,

    /// Concatenated, sorted lists of reply targets
    pub edges: Vec<u32>,

    /// Same layout as `offsets`, for incoming edges
    pub in_offsets: Vec<u32>,

    /// Concatenated, sorted lists of repliers
    pub in_edges: Vec<u32>,

    /// Author name of each node
    pub node_ids: Vec<String>,

    /// Replies whose parent comment was not among the records
    pub unresolved_linkages: usize,

    pub(crate) index: HashMap<String, u32>,
}

impl InteractionGraph {
    /// Get reply targets of a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Get repliers of a node
    pub fn incoming_edges(&self, node: usize) -> &[u32] {
        let start = self.in_offsets[node] as usize;
        let end = self.in_offsets[node + 1] as usize;
        &self.in_edges[start..end]
    }

    /// Neighbors of a node along the given direction
    pub fn neighbors_directed(&self, node: usize, direction: Direction) -> &[u32] {
        match direction {
            Direction::Outgoing => self.outgoing_edges(node),
            Direction::Incoming => self.incoming_edges(node),
        }
    }

    /// Check if there's an edge from src to dst
    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.outgoing_edges(src).binary_search(&dst).is_ok()
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.outgoing_edges(node).len()
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.incoming_edges(node).len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Author name of a node
    pub fn author(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    /// Node index of an author, if present
    pub fn node_index(&self, author: &str) -> Option<usize> {
        self.index.get(author).map(|&idx| idx as usize)
    }

    /// All edges as `(source, target)` pairs, ordered by source then target
    pub fn edge_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count).flat_map(move |src| {
            self.outgoing_edges(src)
                .iter()
                .map(move |&dst| (src, dst as usize))
        })
    }

    pub fn self_loop_count(&self) -> usize {
        (0..self.node_count)
            .filter(|&node| self.has_edge(node, node as u32))
            .count()
    }
}
