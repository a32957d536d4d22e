//! Threshold assignment strategies
//!
//! Node thresholds (active in-neighbors needed) and edge thresholds (firing
//! probabilities for the pruner). Random strategies own a seeded generator
//! per call and walk ids in ascending order, so a seed fully determines the
//! result.
//!
//! Strategies parse from short specs used by config files and the CLI:
//!
//! ```text
//! constant:2          every node needs 2 active in-neighbors
//! proportional:0.5    floor(in_degree * 0.5) + 1
//! random              uniform in [1, degree]
//! ```

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::{GraphError, GraphResult};
use crate::graph::{EdgeThresholds, Network, NodeThresholds};

pub const NODE_BASE_SEED: u64 = 1;
pub const EDGE_BASE_SEED: u64 = 1;

const DEFAULT_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeThresholdStrategy {
    Constant(u64),
    DegreeProportional(f64),
    Random,
}

impl NodeThresholdStrategy {
    pub fn assign(&self, network: &Network, seed: u64) -> GraphResult<NodeThresholds> {
        match *self {
            NodeThresholdStrategy::Constant(value) => Ok(constant(network, value)),
            NodeThresholdStrategy::DegreeProportional(fraction) => {
                degree_proportional(network, fraction)
            }
            NodeThresholdStrategy::Random => Ok(random(network, seed)),
        }
    }
}

impl Default for NodeThresholdStrategy {
    fn default() -> Self {
        NodeThresholdStrategy::DegreeProportional(DEFAULT_FRACTION)
    }
}

impl fmt::Display for NodeThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeThresholdStrategy::Constant(value) => write!(f, "constant:{}", value),
            NodeThresholdStrategy::DegreeProportional(fraction) => {
                write!(f, "proportional:{}", fraction)
            }
            NodeThresholdStrategy::Random => write!(f, "random"),
        }
    }
}

impl FromStr for NodeThresholdStrategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };
        let bad_arg = |arg: &str| {
            GraphError::UnsupportedConfiguration(format!(
                "invalid argument '{}' for node threshold strategy '{}'",
                arg, name
            ))
        };

        match (name.to_ascii_lowercase().as_str(), arg) {
            ("constant", Some(arg)) => arg
                .parse::<u64>()
                .map(NodeThresholdStrategy::Constant)
                .map_err(|_| bad_arg(arg)),
            ("proportional" | "degree", None) => {
                Ok(NodeThresholdStrategy::DegreeProportional(DEFAULT_FRACTION))
            }
            ("proportional" | "degree", Some(arg)) => arg
                .parse::<f64>()
                .map(NodeThresholdStrategy::DegreeProportional)
                .map_err(|_| bad_arg(arg)),
            ("random", None) => Ok(NodeThresholdStrategy::Random),
            _ => Err(GraphError::UnsupportedConfiguration(format!(
                "unknown node threshold strategy '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeThresholdStrategy {
    #[default]
    Random,
    DegreeProportional,
}

impl EdgeThresholdStrategy {
    pub fn assign(&self, network: &Network, seed: u64) -> EdgeThresholds {
        match self {
            EdgeThresholdStrategy::Random => random_edges(network, seed),
            EdgeThresholdStrategy::DegreeProportional => degree_proportional_edges(network),
        }
    }
}

impl fmt::Display for EdgeThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeThresholdStrategy::Random => write!(f, "random"),
            EdgeThresholdStrategy::DegreeProportional => write!(f, "proportional"),
        }
    }
}

impl FromStr for EdgeThresholdStrategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(EdgeThresholdStrategy::Random),
            "proportional" | "degree" => Ok(EdgeThresholdStrategy::DegreeProportional),
            _ => Err(GraphError::UnsupportedConfiguration(format!(
                "unknown edge threshold strategy '{}'",
                s
            ))),
        }
    }
}

// ============================================================================
// NODE THRESHOLDS
// ============================================================================

pub fn constant(network: &Network, value: u64) -> NodeThresholds {
    network.node_ids().map(|n| (n, value)).collect()
}

/// `floor(in_degree * fraction) + 1` per node.
///
/// # Errors
/// - `InvalidParameter` if `fraction` is negative or not finite
pub fn degree_proportional(network: &Network, fraction: f64) -> GraphResult<NodeThresholds> {
    if !fraction.is_finite() || fraction < 0.0 {
        return Err(GraphError::InvalidParameter(format!(
            "fraction must be a non-negative number, got {}",
            fraction
        )));
    }
    Ok(network
        .node_ids()
        .map(|n| {
            let scaled = (network.in_degree(n) as f64 * fraction).floor() as u64;
            (n, scaled + 1)
        })
        .collect())
}

/// Uniform integer in `[1, degree]` per node (`degree` counts in and out
/// edges; isolated nodes get 1).
pub fn random(network: &Network, seed: u64) -> NodeThresholds {
    let mut rng = ChaCha8Rng::seed_from_u64(NODE_BASE_SEED.wrapping_add(seed));
    network
        .node_ids()
        .map(|n| {
            let upper = network.degree(n).max(1) as u64;
            (n, rng.random_range(1..=upper))
        })
        .collect()
}

// ============================================================================
// EDGE THRESHOLDS
// ============================================================================

/// Uniform probability in `[0, 1)` per edge.
pub fn random_edges(network: &Network, seed: u64) -> EdgeThresholds {
    let mut rng = ChaCha8Rng::seed_from_u64(EDGE_BASE_SEED.wrapping_add(seed));
    network.edge_ids().map(|e| (e, rng.random::<f64>())).collect()
}

/// `1 / in_degree(dst)` per edge, so a node's in-edges sum to one.
pub fn degree_proportional_edges(network: &Network) -> EdgeThresholds {
    network
        .edges()
        .map(|(id, edge)| (id, 1.0 / network.in_degree(edge.dst).max(1) as f64))
        .collect()
}
