//! Shortest-path algorithms over the interaction graph

use std::collections::VecDeque;

use petgraph::Direction;
use rayon::prelude::*;

use crate::graph::builder::GraphBuilder;
use crate::graph::{InteractionGraph, Subgraph};

/// Sources handled per parallel batch. Partial scores are summed batch by
/// batch, in source order, so results do not depend on scheduling.
const SOURCE_BATCH: usize = 256;

/// Breadth-first distances from `source` along `direction`
pub fn bfs_distances(graph: &InteractionGraph, source: usize, direction: Direction) -> Vec<Option<u32>> {
    let mut dist = vec![None; graph.node_count];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for &w in graph.neighbors_directed(v, direction) {
            let w = w as usize;
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }

    dist
}

/// Normalized shortest-path betweenness over directed paths (Brandes).
///
/// Endpoints are excluded and scores are scaled by `1 / ((n-1)(n-2))`, so every
/// value lies in [0, 1]. Graphs with fewer than three nodes score all zeros.
pub fn betweenness_centrality(graph: &InteractionGraph) -> Vec<f64> {
    let n = graph.node_count;
    let mut centrality = vec![0.0; n];
    if n < 3 {
        return centrality;
    }

    let sources: Vec<usize> = (0..n).collect();
    for batch in sources.chunks(SOURCE_BATCH) {
        let partials: Vec<Vec<f64>> = batch
            .par_iter()
            .map(|&source| brandes_from_source(graph, source))
            .collect();

        for partial in partials {
            for (total, score) in centrality.iter_mut().zip(partial) {
                *total += score;
            }
        }
    }

    let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    centrality
        .into_iter()
        .map(|c| (c * scale).clamp(0.0, 1.0))
        .collect()
}

/// Dependency of every node on shortest paths starting at `source`
fn brandes_from_source(graph: &InteractionGraph, source: usize) -> Vec<f64> {
    let n = graph.node_count;
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<i64> = vec![-1; n];

    sigma[source] = 1.0;
    dist[source] = 0;

    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        for &w in graph.outgoing_edges(v) {
            let w = w as usize;
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
    }
    delta[source] = 0.0;

    delta
}

/// Closeness centrality with the Wasserman–Faust correction.
///
/// For a node reaching `r` other nodes at total distance `s`, the score is
/// `(r / s) * (r / (n - 1))`. Nodes that reach nothing score 0.
pub fn closeness_centrality(graph: &InteractionGraph, direction: Direction) -> Vec<f64> {
    let n = graph.node_count;
    if n <= 1 {
        return vec![0.0; n];
    }

    (0..n)
        .into_par_iter()
        .map(|node| {
            let (reached, total) = bfs_distances(graph, node, direction)
                .into_iter()
                .flatten()
                .filter(|&d| d > 0)
                .fold((0usize, 0u64), |(r, s), d| (r + 1, s + d as u64));

            if total == 0 {
                return 0.0;
            }
            let reached = reached as f64;
            (reached / total as f64) * (reached / (n - 1) as f64)
        })
        .collect()
}

/// Extract the subgraph induced by the first `end` nodes in insertion order
pub fn extract_prefix(graph: &InteractionGraph, end: usize) -> InteractionGraph {
    let end = end.min(graph.node_count);
    if end == graph.node_count {
        return graph.clone();
    }

    let mut sub = GraphBuilder::with_capacity(end);
    for author in &graph.node_ids[..end] {
        sub.get_or_create_node(author);
    }

    for src in 0..end {
        for &dst in graph.outgoing_edges(src) {
            // Only include edges where both endpoints are in the prefix
            if (dst as usize) < end {
                sub.add_edge(graph.author(src), graph.author(dst as usize));
            }
        }
    }

    sub.build()
}

/// Subgraph induced by `members`, with nodes and edges in insertion order
pub fn induced_subgraph(graph: &InteractionGraph, members: &[usize]) -> Subgraph {
    let mut members: Vec<usize> = members.to_vec();
    members.sort_unstable();
    members.dedup();

    let mut edges = Vec::new();
    for &src in &members {
        for &dst in graph.outgoing_edges(src) {
            if members.binary_search(&(dst as usize)).is_ok() {
                edges.push((graph.author(src).to_string(), graph.author(dst as usize).to_string()));
            }
        }
    }

    Subgraph {
        nodes: members.iter().map(|&node| graph.author(node).to_string()).collect(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CommentRecord;
    use crate::graph::builder::build_interaction_graph;

    const EPS: f64 = 1e-9;

    /// Build a graph whose reply edges are given as author pairs
    fn graph_from_pairs(authors: &[&str], pairs: &[(&str, &str)]) -> InteractionGraph {
        let mut records: Vec<CommentRecord> = authors
            .iter()
            .map(|a| CommentRecord::new(format!("root-{a}"), *a))
            .collect();
        for (i, (src, dst)) in pairs.iter().enumerate() {
            records.push(CommentRecord::new(format!("reply-{i}"), *src).reply_to(format!("root-{dst}")));
        }
        build_interaction_graph(&records).unwrap()
    }

    #[test]
    fn test_betweenness_directed_path() {
        // C -> B -> A: B sits on the only path from C to A
        let graph = graph_from_pairs(&["A", "B", "C"], &[("B", "A"), ("C", "B")]);
        let bc = betweenness_centrality(&graph);

        assert!((bc[0] - 0.0).abs() < EPS);
        assert!((bc[1] - 0.5).abs() < EPS);
        assert!((bc[2] - 0.0).abs() < EPS);
    }

    #[test]
    fn test_betweenness_split_paths() {
        // S reaches T through X or Y: each carries half of that pair
        let graph = graph_from_pairs(
            &["S", "X", "Y", "T"],
            &[("S", "X"), ("S", "Y"), ("X", "T"), ("Y", "T")],
        );
        let bc = betweenness_centrality(&graph);
        let scale = 1.0 / 6.0;

        assert!((bc[1] - 0.5 * scale).abs() < EPS);
        assert!((bc[2] - 0.5 * scale).abs() < EPS);
        assert!(bc[0].abs() < EPS && bc[3].abs() < EPS);
    }

    #[test]
    fn test_betweenness_star_center_is_one() {
        // Every leaf replies to the hub and the hub replies to every leaf
        let leaves = ["L1", "L2", "L3", "L4"];
        let mut pairs = Vec::new();
        for leaf in leaves {
            pairs.push((leaf, "H"));
            pairs.push(("H", leaf));
        }
        let graph = graph_from_pairs(&["H", "L1", "L2", "L3", "L4"], &pairs);
        let bc = betweenness_centrality(&graph);

        assert!((bc[0] - 1.0).abs() < EPS);
        assert!(bc[1..].iter().all(|&b| b.abs() < EPS));
    }

    #[test]
    fn test_closeness_outgoing_and_incoming() {
        let graph = graph_from_pairs(&["A", "B", "C"], &[("B", "A"), ("C", "B")]);

        let out = closeness_centrality(&graph, Direction::Outgoing);
        // C reaches B (1) and A (2): (2/3) * (2/2)
        assert!((out[2] - 2.0 / 3.0).abs() < EPS);
        // B reaches A only: (1/1) * (1/2)
        assert!((out[1] - 0.5).abs() < EPS);
        assert_eq!(out[0], 0.0);

        let incoming = closeness_centrality(&graph, Direction::Incoming);
        assert!((incoming[0] - 2.0 / 3.0).abs() < EPS);
        assert_eq!(incoming[2], 0.0);
    }

    #[test]
    fn test_closeness_single_node() {
        let graph = graph_from_pairs(&["A"], &[("A", "A")]);
        assert_eq!(closeness_centrality(&graph, Direction::Outgoing), vec![0.0]);
    }

    #[test]
    fn test_bfs_distances_ignore_unreachable() {
        let graph = graph_from_pairs(&["A", "B", "C"], &[("B", "A")]);
        let dist = bfs_distances(&graph, 1, Direction::Outgoing);
        assert_eq!(dist, vec![Some(1), Some(0), None]);
    }

    #[test]
    fn test_extract_prefix() {
        let graph = graph_from_pairs(&["A", "B", "C"], &[("B", "A"), ("C", "B"), ("A", "C")]);
        let prefix = extract_prefix(&graph, 2);

        assert_eq!(prefix.node_ids, vec!["A", "B"]);
        assert_eq!(prefix.edge_pairs().collect::<Vec<_>>(), vec![(1, 0)]);

        let whole = extract_prefix(&graph, 10);
        assert_eq!(whole.node_count, 3);
        assert_eq!(whole.edge_count(), 3);
    }

    #[test]
    fn test_induced_subgraph_keeps_insertion_order() {
        let graph = graph_from_pairs(&["A", "B", "C"], &[("B", "A"), ("C", "B"), ("C", "A")]);
        let sub = induced_subgraph(&graph, &[2, 0]);

        assert_eq!(sub.nodes, vec!["A", "C"]);
        assert_eq!(sub.edges, vec![("C".to_string(), "A".to_string())]);
    }
}
