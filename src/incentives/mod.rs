//! Incentive allocation strategies
//!
//! All three strategies share the `(network, thresholds) -> incentives`
//! shape and never mutate their inputs:
//!
//! - [`degree_frac`]: spend a fixed budget proportionally to out-degree
//! - [`discount_frac`]: greedy by remaining coverage, paying the discounted cost
//! - [`tpi`]: greedy graph reduction that guarantees full activation
//!
//! The incentive map always has one entry per node, zero included.

mod degree_frac;
mod discount_frac;
mod tpi;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use degree_frac::degree_frac;
pub use discount_frac::discount_frac;
pub use tpi::{selection_index, tpi, SelectionIndex};

use crate::errors::{GraphError, GraphResult};
use crate::graph::{Incentives, Network, NodeThresholds};

/// Allocation strategy selectable from config or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    DegreeFrac,
    DiscountFrac,
    #[default]
    Tpi,
}

impl Strategy {
    /// Whether the strategy spends a caller-supplied budget.
    pub fn needs_budget(&self) -> bool {
        !matches!(self, Strategy::Tpi)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DegreeFrac => write!(f, "degree-frac"),
            Strategy::DiscountFrac => write!(f, "discount-frac"),
            Strategy::Tpi => write!(f, "tpi"),
        }
    }
}

impl FromStr for Strategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "degree-frac" | "degree" => Ok(Strategy::DegreeFrac),
            "discount-frac" | "discount" => Ok(Strategy::DiscountFrac),
            "tpi" => Ok(Strategy::Tpi),
            other => Err(GraphError::UnsupportedConfiguration(format!(
                "unknown allocation strategy '{}'",
                other
            ))),
        }
    }
}

/// Run `strategy` with the given budget and seed; strategies ignore the
/// parameters they do not use.
pub fn allocate(
    strategy: Strategy,
    network: &Network,
    thresholds: &NodeThresholds,
    budget: u64,
    seed: u64,
) -> GraphResult<Incentives> {
    match strategy {
        Strategy::DegreeFrac => degree_frac(network, budget, seed),
        Strategy::DiscountFrac => discount_frac(network, thresholds, budget),
        Strategy::Tpi => tpi(network, thresholds),
    }
}

/// Sum of all incentives.
pub fn total_cost(incentives: &Incentives) -> u64 {
    incentives.values().sum()
}

/// Thresholds left after subtracting incentives, floored at zero.
pub fn apply_incentives(thresholds: &NodeThresholds, incentives: &Incentives) -> NodeThresholds {
    thresholds
        .iter()
        .map(|(&node, &threshold)| {
            let paid = incentives.get(&node).copied().unwrap_or(0);
            (node, threshold.saturating_sub(paid))
        })
        .collect()
}

/// Look up the threshold of every node, failing on the first gap.
pub(crate) fn require_thresholds(network: &Network, thresholds: &NodeThresholds) -> GraphResult<()> {
    match network.node_ids().find(|node| !thresholds.contains_key(node)) {
        Some(node) => Err(GraphError::missing_node_threshold(node)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("tpi".parse::<Strategy>().unwrap(), Strategy::Tpi);
        assert_eq!("degree_frac".parse::<Strategy>().unwrap(), Strategy::DegreeFrac);
        assert_eq!("Discount-Frac".parse::<Strategy>().unwrap(), Strategy::DiscountFrac);
        assert!(matches!(
            "greedy".parse::<Strategy>(),
            Err(GraphError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_strategy_display_parses_back() {
        for strategy in [Strategy::DegreeFrac, Strategy::DiscountFrac, Strategy::Tpi] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_apply_incentives_floors_at_zero() {
        let thresholds: NodeThresholds = [(0, 2), (1, 1), (2, 3)].into_iter().collect();
        let incentives: Incentives = [(0, 5), (2, 1)].into_iter().collect();
        let applied = apply_incentives(&thresholds, &incentives);
        assert_eq!(applied[&0], 0);
        assert_eq!(applied[&1], 1);
        assert_eq!(applied[&2], 2);
    }

    #[test]
    fn test_allocate_dispatch() {
        let g = Network::from_edges(&[(0, 1), (1, 2)]);
        let thresholds: NodeThresholds = [(0, 1), (1, 1), (2, 1)].into_iter().collect();
        let by_tpi = allocate(Strategy::Tpi, &g, &thresholds, 0, 0).unwrap();
        assert_eq!(by_tpi, tpi(&g, &thresholds).unwrap());
        let by_degree = allocate(Strategy::DegreeFrac, &g, &thresholds, 4, 7).unwrap();
        assert_eq!(total_cost(&by_degree), 4);
    }
}
