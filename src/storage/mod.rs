//! Results persistence module

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::analyzer::AnalysisReport;
use crate::config::AnalysisConfig;
use crate::data::NormalizeStats;

/// Save analysis results to the specified directory
pub fn save_results(
    report: &AnalysisReport,
    config: &AnalysisConfig,
    normalize_stats: Option<&NormalizeStats>,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving analysis results to {}", output_dir);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir))?;

    save_summary(report, config, normalize_stats, output_dir)?;

    write_json(output_dir, "centrality.json", &report.centrality)?;
    write_json(output_dir, "top_authors.json", &report.top_authors(config.table_rows))?;
    write_json(output_dir, "subgraph.json", &report.subgraph)?;
    write_json(output_dir, "communities.json", &report.communities)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save summary information
fn save_summary(
    report: &AnalysisReport,
    config: &AnalysisConfig,
    normalize_stats: Option<&NormalizeStats>,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving summary information");

    let stats = &report.stats;
    let community_sizes: serde_json::Map<String, serde_json::Value> = report
        .communities
        .sizes()
        .into_iter()
        .enumerate()
        .map(|(i, size)| (format!("Community {}", i + 1), json!(size)))
        .collect();

    let avg_degree = if stats.node_count == 0 {
        0.0
    } else {
        stats.edge_count as f64 / stats.node_count as f64
    };

    let summary = json!({
        "config": config,
        "ingestion": normalize_stats,
        "graph_stats": {
            "record_count": stats.record_count,
            "node_count": stats.node_count,
            "edge_count": stats.edge_count,
            "self_loop_count": stats.self_loop_count,
            "unresolved_linkages": stats.unresolved_linkages,
            "avg_degree": avg_degree,
        },
        "top_authors": report
            .top_authors(config.table_rows)
            .iter()
            .map(|row| row.author.as_str())
            .collect::<Vec<_>>(),
        "subgraph": {
            "node_count": report.subgraph.nodes.len(),
            "edge_count": report.subgraph.edges.len(),
        },
        "community_stats": {
            "sampled_nodes": report.communities.sampled_nodes,
            "community_count": report.communities.count,
            "removed_edges": report.communities.removed_edges,
            "sizes": community_sizes,
        }
    });

    write_json(output_dir, "summary.json", &summary)
}

fn write_json<T: Serialize + ?Sized>(output_dir: &str, name: &str, value: &T) -> Result<()> {
    let path = Path::new(output_dir).join(name);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    Ok(())
}
