//! Visualization exports: graph and community files for external renderers

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;

use crate::cluster::CommunityPartition;
use crate::graph::Subgraph;

/// Write renderer inputs for the top-author subgraph and the sampled communities
pub fn generate_visualizations(
    subgraph: &Subgraph,
    communities: &CommunityPartition,
    output_dir: &str,
) -> Result<()> {
    log::info!(
        "Generating visualization data for {} authors and {} communities",
        subgraph.nodes.len(),
        communities.count
    );

    let viz_dir = Path::new(output_dir).join("visualizations");
    fs::create_dir_all(&viz_dir)?;

    write_subgraph_graphml(subgraph, communities, &viz_dir.join("top_authors.graphml"))?;
    write_community_members(communities, &viz_dir.join("communities.csv"))?;
    write_community_sizes(communities, &viz_dir.join("community_sizes.csv"))?;

    log::info!("Visualization data written to {}", viz_dir.display());

    Ok(())
}

/// GraphML for the subgraph. Authors that fall in a sampled community carry
/// its number so renderers can color them.
fn write_subgraph_graphml(subgraph: &Subgraph, communities: &CommunityPartition, path: &Path) -> Result<()> {
    let membership = community_lookup(communities);
    let position: HashMap<&str, usize> = subgraph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, author)| (author.as_str(), i))
        .collect();

    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    writeln!(file, "  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>")?;
    writeln!(file, "  <key id=\"community\" for=\"node\" attr.name=\"community\" attr.type=\"int\"/>")?;
    writeln!(file, "  <graph id=\"G\" edgedefault=\"directed\">")?;

    for (i, author) in subgraph.nodes.iter().enumerate() {
        writeln!(file, "    <node id=\"n{}\">", i)?;
        writeln!(file, "      <data key=\"label\">{}</data>", escape_xml(author))?;
        if let Some(community) = membership.get(author.as_str()) {
            writeln!(file, "      <data key=\"community\">{}</data>", community)?;
        }
        writeln!(file, "    </node>")?;
    }

    for (edge_id, (src, dst)) in subgraph.edges.iter().enumerate() {
        if let (Some(s), Some(t)) = (position.get(src.as_str()), position.get(dst.as_str())) {
            writeln!(file, "    <edge id=\"e{}\" source=\"n{}\" target=\"n{}\"/>", edge_id, s, t)?;
        }
    }

    writeln!(file, "  </graph>")?;
    writeln!(file, "</graphml>")?;
    file.flush()?;

    Ok(())
}

fn write_community_members(communities: &CommunityPartition, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "author,community")?;

    for (i, members) in communities.communities.iter().enumerate() {
        for author in members {
            writeln!(file, "{},{}", csv_field(author), i + 1)?;
        }
    }
    file.flush()?;

    Ok(())
}

fn write_community_sizes(communities: &CommunityPartition, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "community,size")?;

    for (i, size) in communities.sizes().into_iter().enumerate() {
        writeln!(file, "{},{}", i + 1, size)?;
    }
    file.flush()?;

    Ok(())
}

/// Community number (1-based) of each sampled author
fn community_lookup(communities: &CommunityPartition) -> HashMap<&str, usize> {
    communities
        .communities
        .iter()
        .enumerate()
        .flat_map(|(i, members)| members.iter().map(move |author| (author.as_str(), i + 1)))
        .collect()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
