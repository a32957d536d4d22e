//! Prune command - write one stochastic sample of the graph

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use partial_incentives::io::store_graph;
use partial_incentives::pruner::prune;

use super::{edge_thresholds_for, open_graph};

pub fn run(graph_path: &Path, edge_thresholds_path: Option<&Path>, seed: u64, output: &Path) -> Result<()> {
    let network = open_graph(graph_path)?;
    let edge_thresholds = edge_thresholds_for(&network, edge_thresholds_path)?;

    let sample = prune(&network, &edge_thresholds, seed)?;
    store_graph(&sample, output).with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "  {} kept {} of {} edges (seed {}) -> {}",
        style("[OK]").green(),
        style(sample.edge_count()).cyan(),
        network.edge_count(),
        seed,
        style(output.display()).cyan()
    );
    Ok(())
}
