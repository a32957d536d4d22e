//! Allocate command - compute incentives with one of the strategies

use std::path::Path;

use anyhow::{bail, Context, Result};
use console::style;
use serde_json::json;
use tracing::info;

use partial_incentives::config::Config;
use partial_incentives::incentives::{allocate, total_cost, Strategy};
use partial_incentives::io::{store_map, INCENTIVES_SUFFIX};

use super::{node_thresholds_for, open_graph, sibling_path};

#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Config,
    graph_path: &Path,
    thresholds_path: Option<&Path>,
    strategy: Option<&str>,
    budget: Option<u64>,
    seed: Option<u64>,
    output: Option<&Path>,
    format: &str,
) -> Result<()> {
    let strategy: Strategy = match strategy {
        Some(name) => name.parse()?,
        None => config.allocation.strategy,
    };
    let seed = seed.unwrap_or(config.allocation.seed);
    let budget = match budget.or(config.allocation.budget) {
        Some(budget) => budget,
        None if strategy.needs_budget() => {
            bail!("{} needs a --budget (or `budget` in the config file)", strategy)
        }
        None => 0,
    };

    let network = open_graph(graph_path)?;
    let thresholds = node_thresholds_for(&network, thresholds_path)?;

    let incentives = allocate(strategy, &network, &thresholds, budget, seed)
        .with_context(|| format!("{} allocation failed", strategy))?;
    let cost = total_cost(&incentives);
    let targeted = incentives.values().filter(|&&v| v > 0).count();

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_path(graph_path, INCENTIVES_SUFFIX));
    store_map(&incentives, &out_path, INCENTIVES_SUFFIX)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    info!(%strategy, cost, targeted, "allocation finished");

    if format == "json" {
        let summary = json!({
            "strategy": strategy.to_string(),
            "nodes": network.node_count(),
            "edges": network.edge_count(),
            "total_cost": cost,
            "targeted_nodes": targeted,
            "output": out_path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{} allocation\n", style(strategy).bold());
    println!(
        "  Network: {} nodes, {} edges",
        style(network.node_count()).cyan(),
        style(network.edge_count()).cyan()
    );
    if strategy.needs_budget() {
        println!("  Budget: {}", style(budget).cyan());
    }
    println!(
        "  Total incentive: {} across {} nodes",
        style(cost).green().bold(),
        style(targeted).cyan()
    );
    println!("  Written to {}", style(out_path.display()).dim());
    Ok(())
}
