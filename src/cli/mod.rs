//! CLI command definitions and handlers

mod allocate;
mod prune;
mod simulate;
mod stats;
mod thresholds;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use partial_incentives::config::{load_config, Config, CONFIG_FILE_NAME};
use partial_incentives::graph::{
    EdgeThresholds, Incentives, Network, NodeThresholds, THRESHOLD_ATTR,
};
use partial_incentives::io::{
    load_graph, load_map, EDGE_THRESHOLDS_SUFFIX, INCENTIVES_SUFFIX, NODE_THRESHOLDS_SUFFIX,
};

/// Target set selection with partial incentives
///
/// Computes the incentives (threshold reductions) that make a directed
/// influence network fully active under the linear-threshold model.
#[derive(Parser, Debug)]
#[command(name = "incentives")]
#[command(
    version,
    about = "Partial-incentive target set selection on influence networks",
    after_help = "\
Examples:
  incentives thresholds data/wiki.txt --node proportional:0.5
  incentives allocate data/wiki.txt -t data/wiki.node.thresholds
  incentives allocate data/wiki.txt -t data/wiki.node.thresholds --strategy discount-frac --budget 500
  incentives evaluate data/wiki.txt -t data/wiki.node.thresholds -e data/wiki.edge.thresholds -i data/wiki.incentives
  incentives stats data/wiki.txt"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./incentives.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate node and edge thresholds for a graph
    Thresholds {
        /// Graph file (.txt, .csv or .graph)
        graph: PathBuf,

        /// Node strategy: constant:N, proportional[:F], random
        #[arg(long)]
        node: Option<String>,

        /// Edge strategy: random, proportional
        #[arg(long)]
        edge: Option<String>,

        #[arg(long)]
        seed: Option<u64>,

        /// Output stem (default: graph path without extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also write a .graph snapshot with thresholds attached as attributes
        #[arg(long)]
        attach: Option<PathBuf>,
    },

    /// Compute incentives
    Allocate {
        graph: PathBuf,

        /// Node thresholds file (default: `threshold` attributes of a .graph snapshot)
        #[arg(long, short = 't')]
        thresholds: Option<PathBuf>,

        /// tpi, discount-frac, degree-frac
        #[arg(long, short = 's')]
        strategy: Option<String>,

        /// Budget for discount-frac and degree-frac
        #[arg(long, short = 'b')]
        budget: Option<u64>,

        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: graph path with .incentives extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Sample a pruned copy of the graph
    Prune {
        graph: PathBuf,

        /// Edge thresholds file (default: `threshold` attributes of a .graph snapshot)
        #[arg(long, short = 'e')]
        edge_thresholds: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output graph (.txt or .graph)
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Run the threshold cascade once with the given incentives
    Simulate {
        graph: PathBuf,

        #[arg(long, short = 't')]
        thresholds: Option<PathBuf>,

        /// Incentives file (default: none)
        #[arg(long, short = 'i')]
        incentives: Option<PathBuf>,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Monte-Carlo spread of incentives over pruned samples
    Evaluate {
        graph: PathBuf,

        #[arg(long, short = 't')]
        thresholds: Option<PathBuf>,

        #[arg(long, short = 'e')]
        edge_thresholds: Option<PathBuf>,

        #[arg(long, short = 'i')]
        incentives: Option<PathBuf>,

        #[arg(long)]
        trials: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Structural summary of a graph
    Stats {
        graph: PathBuf,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = load_config(&config_path);

    match cli.command {
        Commands::Thresholds {
            graph,
            node,
            edge,
            seed,
            output,
            attach,
        } => thresholds::run(
            &config,
            &graph,
            node.as_deref(),
            edge.as_deref(),
            seed,
            output.as_deref(),
            attach.as_deref(),
        ),

        Commands::Allocate {
            graph,
            thresholds,
            strategy,
            budget,
            seed,
            output,
            format,
        } => allocate::run(
            &config,
            &graph,
            thresholds.as_deref(),
            strategy.as_deref(),
            budget,
            seed,
            output.as_deref(),
            &format,
        ),

        Commands::Prune {
            graph,
            edge_thresholds,
            seed,
            output,
        } => prune::run(&graph, edge_thresholds.as_deref(), seed, &output),

        Commands::Simulate {
            graph,
            thresholds,
            incentives,
            format,
        } => simulate::run_once(&graph, thresholds.as_deref(), incentives.as_deref(), &format),

        Commands::Evaluate {
            graph,
            thresholds,
            edge_thresholds,
            incentives,
            trials,
            seed,
            format,
        } => simulate::run_trials(
            &config,
            &graph,
            thresholds.as_deref(),
            edge_thresholds.as_deref(),
            incentives.as_deref(),
            trials,
            seed,
            &format,
        ),

        Commands::Stats { graph, format } => stats::run(&graph, &format),
    }
}

// ----------------------------------------------------------------------------
// Shared loaders
// ----------------------------------------------------------------------------

fn open_graph(path: &Path) -> Result<Network> {
    load_graph(path).with_context(|| format!("Failed to load graph {}", path.display()))
}

/// Thresholds from a file, or from the graph's own attributes.
fn node_thresholds_for(network: &Network, path: Option<&Path>) -> Result<NodeThresholds> {
    match path {
        Some(path) => load_map(path, NODE_THRESHOLDS_SUFFIX)
            .with_context(|| format!("Failed to load node thresholds {}", path.display())),
        None if !network.has_node_attr(THRESHOLD_ATTR) => {
            bail!("Graph carries no node thresholds; pass --thresholds")
        }
        None => network
            .node_thresholds()
            .context("Graph node thresholds are incomplete; pass --thresholds"),
    }
}

fn edge_thresholds_for(network: &Network, path: Option<&Path>) -> Result<EdgeThresholds> {
    match path {
        Some(path) => load_map(path, EDGE_THRESHOLDS_SUFFIX)
            .with_context(|| format!("Failed to load edge thresholds {}", path.display())),
        None if network.edge_count() > 0 && !network.has_edge_attr(THRESHOLD_ATTR) => {
            bail!("Graph carries no edge thresholds; pass --edge-thresholds")
        }
        None => network
            .edge_thresholds()
            .context("Graph edge thresholds are incomplete; pass --edge-thresholds"),
    }
}

fn incentives_for(path: Option<&Path>) -> Result<Incentives> {
    match path {
        Some(path) => load_map(path, INCENTIVES_SUFFIX)
            .with_context(|| format!("Failed to load incentives {}", path.display())),
        None => Ok(Incentives::new()),
    }
}

/// `dir/name.txt` -> `dir/name` + `suffix`
fn sibling_path(graph: &Path, suffix: &str) -> PathBuf {
    let stem = graph.with_extension("");
    PathBuf::from(format!("{}{}", stem.display(), suffix))
}
