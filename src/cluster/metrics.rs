//! Centrality table and top-author subgraph

use petgraph::Direction;

use crate::cluster::CentralityRow;
use crate::config::ClosenessDirection;
use crate::graph::algorithms::{betweenness_centrality, closeness_centrality, induced_subgraph};
use crate::graph::{InteractionGraph, Subgraph};

impl From<ClosenessDirection> for Direction {
    fn from(direction: ClosenessDirection) -> Self {
        match direction {
            ClosenessDirection::Outgoing => Direction::Outgoing,
            ClosenessDirection::Incoming => Direction::Incoming,
        }
    }
}

/// Compute every centrality measure over the whole graph.
///
/// Rows are sorted by degree centrality, highest first; equal scores keep
/// node insertion order.
pub fn compute_centrality(graph: &InteractionGraph, closeness: ClosenessDirection) -> Vec<CentralityRow> {
    let n = graph.node_count;
    log::info!("Computing centrality for {} authors and {} reply edges", n, graph.edge_count());

    let norm = if n > 1 { (n - 1) as f64 } else { 0.0 };
    let scale = |count: usize| if norm > 0.0 { count as f64 / norm } else { 0.0 };

    let betweenness = betweenness_centrality(graph);
    let closeness = closeness_centrality(graph, closeness.into());

    let mut ranked: Vec<(usize, CentralityRow)> = (0..n)
        .map(|node| {
            // Replying to yourself links you to nobody else
            let self_loop = usize::from(graph.has_edge(node, node as u32));
            let in_degree = graph.in_degree(node) - self_loop;
            let out_degree = graph.out_degree(node) - self_loop;
            let degree = in_degree + out_degree;

            let row = CentralityRow {
                author: graph.author(node).to_string(),
                degree_centrality: scale(degree).min(1.0),
                in_degree_centrality: scale(in_degree),
                out_degree_centrality: scale(out_degree),
                betweenness_centrality: betweenness[node],
                closeness_centrality: closeness[node],
            };
            (degree, row)
        })
        .collect();

    // Rank on the raw count so capped scores still order by activity.
    // sort_by is stable, so ties stay in insertion order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    let rows: Vec<CentralityRow> = ranked.into_iter().map(|(_, row)| row).collect();

    if let Some(top) = rows.first() {
        log::debug!("Most connected author: {} ({:.4})", top.author, top.degree_centrality);
    }

    rows
}

/// Subgraph induced by the `n` authors with the highest degree centrality
pub fn top_subgraph(graph: &InteractionGraph, rows: &[CentralityRow], n: usize) -> Subgraph {
    let members: Vec<usize> = rows
        .iter()
        .take(n)
        .filter_map(|row| graph.node_index(&row.author))
        .collect();

    let subgraph = induced_subgraph(graph, &members);
    log::debug!(
        "Top subgraph has {} authors and {} edges",
        subgraph.nodes.len(),
        subgraph.edges.len()
    );

    subgraph
}
