//! Configuration management for the comment graph analyzer

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which shortest paths closeness centrality measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClosenessDirection {
    /// Distances from the author to the authors they reach by replying
    #[default]
    Outgoing,
    /// Distances to the author from the authors that reach them
    Incoming,
}

/// Default configuration for the comment graph analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of top-degree authors in the visualization subgraph
    pub top_n: usize,

    /// Number of nodes (in insertion order) sampled for community detection
    pub sample_size: usize,

    /// Number of centrality rows in the summary view
    pub table_rows: usize,

    /// Direction used for closeness centrality
    pub closeness_direction: ClosenessDirection,

    /// Run a splitting step even when two or more sampled components already carry edges
    pub split_disconnected_sample: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 50,
            sample_size: 500,
            table_rows: 10,
            closeness_direction: ClosenessDirection::Outgoing,
            split_disconnected_sample: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with custom sizes and default policies
    pub fn new(top_n: usize, sample_size: usize, table_rows: usize) -> Self {
        Self {
            top_n,
            sample_size,
            table_rows,
            ..Self::default()
        }
    }

    pub fn with_closeness_direction(mut self, direction: ClosenessDirection) -> Self {
        self.closeness_direction = direction;
        self
    }

    pub fn with_split_disconnected_sample(mut self, split: bool) -> Self {
        self.split_disconnected_sample = split;
        self
    }
}
