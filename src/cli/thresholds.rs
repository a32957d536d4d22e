//! Thresholds command - generate node and edge thresholds for a graph

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use partial_incentives::config::Config;
use partial_incentives::io::{save_binary, store_map, EDGE_THRESHOLDS_SUFFIX, NODE_THRESHOLDS_SUFFIX};
use partial_incentives::thresholds::{EdgeThresholdStrategy, NodeThresholdStrategy};

use super::{open_graph, sibling_path};

#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Config,
    graph_path: &Path,
    node: Option<&str>,
    edge: Option<&str>,
    seed: Option<u64>,
    output: Option<&Path>,
    attach: Option<&Path>,
) -> Result<()> {
    let node_strategy: NodeThresholdStrategy = match node {
        Some(spec) => spec.parse()?,
        None => config.thresholds.node_strategy()?,
    };
    let edge_strategy: EdgeThresholdStrategy = match edge {
        Some(spec) => spec.parse()?,
        None => config.thresholds.edge_strategy()?,
    };
    let seed = seed.unwrap_or(config.thresholds.seed);

    let mut network = open_graph(graph_path)?;
    let node_thresholds = node_strategy.assign(&network, seed)?;
    let edge_thresholds = edge_strategy.assign(&network, seed);

    let stem = output.unwrap_or(graph_path);
    let node_path = sibling_path(stem, NODE_THRESHOLDS_SUFFIX);
    let edge_path = sibling_path(stem, EDGE_THRESHOLDS_SUFFIX);
    store_map(&node_thresholds, &node_path, NODE_THRESHOLDS_SUFFIX)
        .with_context(|| format!("Failed to write {}", node_path.display()))?;
    store_map(&edge_thresholds, &edge_path, EDGE_THRESHOLDS_SUFFIX)
        .with_context(|| format!("Failed to write {}", edge_path.display()))?;

    info!(
        node_strategy = %node_strategy,
        edge_strategy = %edge_strategy,
        seed,
        "assigned thresholds"
    );
    println!(
        "  {} node thresholds ({}) -> {}",
        style("[OK]").green(),
        node_strategy,
        style(node_path.display()).cyan()
    );
    println!(
        "  {} edge thresholds ({}) -> {}",
        style("[OK]").green(),
        edge_strategy,
        style(edge_path.display()).cyan()
    );

    if let Some(snapshot) = attach {
        network.attach_node_thresholds(&node_thresholds)?;
        network.attach_edge_thresholds(&edge_thresholds)?;
        save_binary(&network, snapshot)
            .with_context(|| format!("Failed to write {}", snapshot.display()))?;
        println!(
            "  {} snapshot with attributes -> {}",
            style("[OK]").green(),
            style(snapshot.display()).cyan()
        );
    }
    Ok(())
}
