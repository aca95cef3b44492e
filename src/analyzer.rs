//! End-to-end comment interaction analysis

use serde::{Deserialize, Serialize};

use crate::cluster::{compute_centrality, detect_communities, top_subgraph, CentralityRow, CommunityPartition};
use crate::config::AnalysisConfig;
use crate::data::CommentRecord;
use crate::error::AnalysisError;
use crate::graph::{build_interaction_graph_with, Subgraph};

/// Size of the analyzed graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub record_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub self_loop_count: usize,
    pub unresolved_linkages: usize,
}

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stats: GraphStats,

    /// Full centrality table, most connected authors first
    pub centrality: Vec<CentralityRow>,

    /// Induced subgraph over the top authors, for rendering
    pub subgraph: Subgraph,

    pub communities: CommunityPartition,
}

impl AnalysisReport {
    /// The first `n` rows of the centrality table
    pub fn top_authors(&self, n: usize) -> &[CentralityRow] {
        &self.centrality[..n.min(self.centrality.len())]
    }
}

/// Analyze a set of normalized comment records
pub fn analyze(records: &[CommentRecord], config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    analyze_with(records, config, |_| {})
}

/// Analyze a set of normalized comment records, reporting each reply whose
/// parent comment is missing from `records` to `on_unresolved`
pub fn analyze_with<F>(
    records: &[CommentRecord],
    config: &AnalysisConfig,
    on_unresolved: F,
) -> Result<AnalysisReport, AnalysisError>
where
    F: FnMut(&CommentRecord),
{
    log::info!("Analyzing {} comment records", records.len());

    let graph = build_interaction_graph_with(records, on_unresolved)?;
    log::info!(
        "Built interaction graph with {} authors and {} reply edges",
        graph.node_count,
        graph.edge_count()
    );
    if graph.unresolved_linkages > 0 {
        log::debug!(
            "{} replies point at comments that were not fetched; no edge added",
            graph.unresolved_linkages
        );
    }

    let centrality = compute_centrality(&graph, config.closeness_direction);
    let subgraph = top_subgraph(&graph, &centrality, config.top_n);
    let communities = detect_communities(&graph, config.sample_size, config.split_disconnected_sample);

    let stats = GraphStats {
        record_count: records.len(),
        node_count: graph.node_count,
        edge_count: graph.edge_count(),
        self_loop_count: graph.self_loop_count(),
        unresolved_linkages: graph.unresolved_linkages,
    };

    Ok(AnalysisReport {
        stats,
        centrality,
        subgraph,
        communities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_reply_chain() {
        let records = vec![
            CommentRecord::new("c1", "A"),
            CommentRecord::new("c2", "B").reply_to("c1"),
            CommentRecord::new("c3", "C").reply_to("c2"),
            CommentRecord::new("c4", "D").reply_to("gone"),
        ];

        let mut unresolved = 0;
        let report = analyze_with(&records, &AnalysisConfig::default(), |_| unresolved += 1).unwrap();

        assert_eq!(unresolved, 1);
        assert_eq!(report.stats.node_count, 4);
        assert_eq!(report.stats.edge_count, 2);
        assert_eq!(report.stats.unresolved_linkages, 1);
        assert_eq!(report.centrality.len(), 4);
        assert_eq!(report.top_authors(2).len(), 2);
        assert_eq!(report.top_authors(99).len(), 4);
        assert_eq!(report.communities.count, 2);
        assert_eq!(report.communities.communities[1], vec!["D".to_string()]);
    }

    #[test]
    fn test_invalid_record_is_rejected() {
        let records = vec![CommentRecord::new("c1", "")];
        assert!(matches!(
            analyze(&records, &AnalysisConfig::default()),
            Err(AnalysisError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let report = analyze(&[], &AnalysisConfig::default()).unwrap();
        assert_eq!(report.stats, GraphStats::default());
        assert!(report.centrality.is_empty());
        assert!(report.subgraph.nodes.is_empty());
        assert_eq!(report.communities.count, 0);
    }
}
