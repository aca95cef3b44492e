//! Author importance and community analysis

pub mod detection;
pub mod metrics;

use serde::{Deserialize, Serialize};

pub use detection::detect_communities;
pub use metrics::{compute_centrality, top_subgraph};

/// Centrality scores of one author, each normalized to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRow {
    pub author: String,
    pub degree_centrality: f64,
    pub in_degree_centrality: f64,
    pub out_degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub closeness_centrality: f64,
}

/// Communities found in the sampled part of the graph.
///
/// The sample is the first `sampled_nodes` authors in insertion order, so the
/// partition is biased toward early commenters and says nothing about the
/// authors outside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPartition {
    /// Disjoint author sets covering exactly the sampled nodes
    pub communities: Vec<Vec<String>>,

    /// Number of communities
    pub count: usize,

    /// Number of authors in the sample
    pub sampled_nodes: usize,

    /// Edges removed before the partition appeared
    pub removed_edges: usize,
}

impl CommunityPartition {
    /// Size of each community, in partition order
    pub fn sizes(&self) -> Vec<usize> {
        self.communities.iter().map(|c| c.len()).collect()
    }
}
