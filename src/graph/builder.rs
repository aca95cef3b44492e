//! Graph construction module

use std::collections::HashMap;

use crate::data::CommentRecord;
use crate::error::AnalysisError;
use crate::graph::InteractionGraph;

/// Builder for incrementally constructing an InteractionGraph
pub struct GraphBuilder {
    /// Mapping from author names to node indices
    id_to_index: HashMap<String, u32>,

    /// Author names in creation order
    node_ids: Vec<String>,

    /// Reply targets for each node, possibly with repeats until `build`
    adjacency_lists: Vec<Vec<u32>>,

    unresolved_linkages: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            unresolved_linkages: 0,
        }
    }

    /// Get or create a node for the given author
    pub fn get_or_create_node(&mut self, author: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(author) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(author.to_string(), idx);
        self.node_ids.push(author.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add a reply edge between two authors. Repeated pairs collapse on build.
    pub fn add_edge(&mut self, src: &str, dst: &str) {
        let src_idx = self.get_or_create_node(src);
        let dst_idx = self.get_or_create_node(dst);
        self.adjacency_lists[src_idx as usize].push(dst_idx);
    }

    pub fn record_unresolved(&mut self) {
        self.unresolved_linkages += 1;
    }

    /// Build the compressed graph
    pub fn build(mut self) -> InteractionGraph {
        let node_count = self.node_ids.len();

        for list in &mut self.adjacency_lists {
            // Sorted for binary search, deduplicated for simple-graph semantics
            list.sort_unstable();
            list.dedup();
        }

        let (offsets, edges) = to_csr(&self.adjacency_lists);

        let mut reverse_lists: Vec<Vec<u32>> = vec![Vec::new(); node_count];
        for (src, list) in self.adjacency_lists.iter().enumerate() {
            for &dst in list {
                reverse_lists[dst as usize].push(src as u32);
            }
        }
        // Sources are visited in ascending order, so reverse lists are already sorted
        let (in_offsets, in_edges) = to_csr(&reverse_lists);

        InteractionGraph {
            node_count,
            offsets,
            edges,
            in_offsets,
            in_edges,
            node_ids: self.node_ids,
            unresolved_linkages: self.unresolved_linkages,
            index: self.id_to_index,
        }
    }
}

fn to_csr(lists: &[Vec<u32>]) -> (Vec<u32>, Vec<u32>) {
    let mut offsets = Vec::with_capacity(lists.len() + 1);
    offsets.push(0);

    let mut offset = 0;
    for list in lists {
        offset += list.len() as u32;
        offsets.push(offset);
    }

    let mut edges = Vec::with_capacity(offset as usize);
    for list in lists {
        edges.extend_from_slice(list);
    }

    (offsets, edges)
}

/// Build the author reply graph from normalized comment records
pub fn build_interaction_graph(records: &[CommentRecord]) -> Result<InteractionGraph, AnalysisError> {
    build_interaction_graph_with(records, |_| {})
}

/// Build the author reply graph, calling `on_unresolved` for every reply whose
/// parent comment is not among `records`. Such replies add no edge.
pub fn build_interaction_graph_with<F>(
    records: &[CommentRecord],
    mut on_unresolved: F,
) -> Result<InteractionGraph, AnalysisError>
where
    F: FnMut(&CommentRecord),
{
    for (index, record) in records.iter().enumerate() {
        if record.author.is_empty() {
            return Err(AnalysisError::InvalidRecord { index, field: "author" });
        }
        if record.comment_id.is_empty() {
            return Err(AnalysisError::InvalidRecord { index, field: "comment_id" });
        }
    }

    let mut builder = GraphBuilder::with_capacity(records.len());

    // Node order follows first appearance; sampling and tie-breaks rely on it
    for record in records {
        builder.get_or_create_node(&record.author);
    }

    let mut comment_authors: HashMap<&str, &str> = HashMap::with_capacity(records.len());
    for record in records {
        comment_authors
            .entry(record.comment_id.as_str())
            .or_insert(record.author.as_str());
    }

    for record in records {
        let Some(parent_id) = record.linkage.as_deref() else {
            continue;
        };

        match comment_authors.get(parent_id) {
            Some(parent_author) => builder.add_edge(&record.author, parent_author),
            None => {
                builder.record_unresolved();
                on_unresolved(record);
            }
        }
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<CommentRecord> {
        vec![
            CommentRecord::new("c1", "A"),
            CommentRecord::new("c2", "B").reply_to("c1"),
            CommentRecord::new("c3", "C").reply_to("c2"),
        ]
    }

    #[test]
    fn test_reply_chain() {
        let graph = build_interaction_graph(&chain()).unwrap();

        assert_eq!(graph.node_ids, vec!["A", "B", "C"]);
        let edges: Vec<(usize, usize)> = graph.edge_pairs().collect();
        assert_eq!(edges, vec![(1, 0), (2, 1)]);

        assert_eq!((graph.in_degree(0), graph.out_degree(0)), (1, 0));
        assert_eq!((graph.in_degree(1), graph.out_degree(1)), (1, 1));
        assert_eq!((graph.in_degree(2), graph.out_degree(2)), (0, 1));
    }

    #[test]
    fn test_empty_input() {
        let graph = build_interaction_graph(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_unresolved_linkage_is_dropped_and_reported() {
        let records = vec![
            CommentRecord::new("c1", "A"),
            CommentRecord::new("c2", "B").reply_to("missing"),
        ];

        let mut reported = Vec::new();
        let graph =
            build_interaction_graph_with(&records, |r| reported.push(r.comment_id.clone())).unwrap();

        assert_eq!(graph.node_count, 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.unresolved_linkages, 1);
        assert_eq!(reported, vec!["c2"]);
    }

    #[test]
    fn test_self_reply_is_self_loop() {
        let records = vec![CommentRecord::new("c1", "A").reply_to("c1")];
        let graph = build_interaction_graph(&records).unwrap();

        assert!(graph.has_edge(0, 0));
        assert_eq!(graph.self_loop_count(), 1);
    }

    #[test]
    fn test_repeated_replies_collapse() {
        let records = vec![
            CommentRecord::new("c1", "A"),
            CommentRecord::new("c2", "B").reply_to("c1"),
            CommentRecord::new("c3", "B").reply_to("c1"),
            CommentRecord::new("c4", "A"),
            CommentRecord::new("c5", "B").reply_to("c4"),
        ];
        let graph = build_interaction_graph(&records).unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(1, 0));
        assert_eq!(graph.incoming_edges(0), &[1]);
    }

    #[test]
    fn test_first_record_wins_for_duplicate_ids() {
        let records = vec![
            CommentRecord::new("c1", "A"),
            CommentRecord::new("c1", "Z"),
            CommentRecord::new("c2", "B").reply_to("c1"),
        ];
        let graph = build_interaction_graph(&records).unwrap();
        let a = graph.node_index("A").unwrap();
        let b = graph.node_index("B").unwrap();
        assert!(graph.has_edge(b, a as u32));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_edges_never_dangle() {
        let records = vec![
            CommentRecord::new("c1", "A"),
            CommentRecord::new("c2", "B").reply_to("c1"),
            CommentRecord::new("c3", "C").reply_to("c9"),
            CommentRecord::new("c4", "A").reply_to("c3"),
            CommentRecord::new("c5", "D").reply_to("c5"),
        ];
        let graph = build_interaction_graph(&records).unwrap();
        for (src, dst) in graph.edge_pairs() {
            assert!(src < graph.node_count);
            assert!(dst < graph.node_count);
        }
    }

    #[test]
    fn test_invalid_record_fails_fast() {
        let records = vec![CommentRecord::new("c1", "A"), CommentRecord::new("c2", "")];
        let err = build_interaction_graph(&records).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidRecord { index: 1, field: "author" });

        let records = vec![CommentRecord::new("", "A")];
        let err = build_interaction_graph(&records).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidRecord { index: 0, field: "comment_id" });
    }
}
