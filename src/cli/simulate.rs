//! Simulate and evaluate commands - measure how far incentives spread

use std::path::Path;

use anyhow::Result;
use console::style;
use serde_json::json;

use partial_incentives::cascade::{evaluate, simulate};
use partial_incentives::config::Config;
use partial_incentives::incentives::total_cost;

use super::{edge_thresholds_for, incentives_for, node_thresholds_for, open_graph};

/// Deterministic cascade on the full graph.
pub fn run_once(
    graph_path: &Path,
    thresholds_path: Option<&Path>,
    incentives_path: Option<&Path>,
    format: &str,
) -> Result<()> {
    let network = open_graph(graph_path)?;
    let thresholds = node_thresholds_for(&network, thresholds_path)?;
    let incentives = incentives_for(incentives_path)?;

    let cascade = simulate(&network, &thresholds, &incentives)?;

    if format == "json" {
        let summary = json!({
            "nodes": network.node_count(),
            "activated": cascade.activated_count(),
            "complete": cascade.is_complete(),
            "rounds": cascade.depth(),
            "total_cost": total_cost(&incentives),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let marker = if cascade.is_complete() {
        style("[OK]").green()
    } else {
        style("[--]").yellow()
    };
    println!(
        "  {} {} of {} nodes active after {} rounds (incentive {})",
        marker,
        style(cascade.activated_count()).cyan(),
        network.node_count(),
        cascade.depth(),
        total_cost(&incentives)
    );
    let stuck: Vec<String> = cascade.inactive(&network).take(10).map(|n| n.to_string()).collect();
    if !stuck.is_empty() {
        println!("      inactive: {}", style(stuck.join(", ")).dim());
    }
    Ok(())
}

/// Monte-Carlo cascade over pruned samples.
#[allow(clippy::too_many_arguments)]
pub fn run_trials(
    config: &Config,
    graph_path: &Path,
    thresholds_path: Option<&Path>,
    edge_thresholds_path: Option<&Path>,
    incentives_path: Option<&Path>,
    trials: Option<usize>,
    seed: Option<u64>,
    format: &str,
) -> Result<()> {
    let trials = trials.unwrap_or(config.evaluation.trials);
    let seed = seed.unwrap_or(config.evaluation.seed);

    let network = open_graph(graph_path)?;
    let node_thresholds = node_thresholds_for(&network, thresholds_path)?;
    let edge_thresholds = edge_thresholds_for(&network, edge_thresholds_path)?;
    let incentives = incentives_for(incentives_path)?;

    let evaluation = evaluate(
        &network,
        &node_thresholds,
        &edge_thresholds,
        &incentives,
        trials,
        seed,
    )?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    println!("\nMonte-Carlo spread ({} trials, seed {})\n", trials, seed);
    println!(
        "  Mean active: {:.2} of {} ({:.1}%)",
        evaluation.mean_activated,
        evaluation.nodes,
        evaluation.mean_fraction() * 100.0
    );
    println!(
        "  Range: {} - {}",
        style(evaluation.min_activated).cyan(),
        style(evaluation.max_activated).cyan()
    );
    println!(
        "  Full activation in {} of {} trials",
        style(evaluation.complete_trials).green(),
        trials
    );
    Ok(())
}
