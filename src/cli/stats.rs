//! Stats command - structural summary of a graph

use std::path::Path;

use anyhow::Result;
use console::style;

use partial_incentives::graph::summarize;

use super::open_graph;

pub fn run(graph_path: &Path, format: &str) -> Result<()> {
    let network = open_graph(graph_path)?;
    let summary = summarize(&network);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{}\n", style(graph_path.display()).bold());
    println!("  Nodes: {}", style(summary.nodes).cyan());
    println!("  Edges: {} ({} self-loops)", style(summary.edges).cyan(), summary.self_loops);
    println!("  Sources / sinks: {} / {}", summary.sources, summary.sinks);
    println!(
        "  Max in / out degree: {} / {}",
        summary.max_in_degree, summary.max_out_degree
    );
    println!(
        "  Strongly connected components: {} (largest {})",
        style(summary.strongly_connected_components).cyan(),
        summary.largest_component
    );
    Ok(())
}
