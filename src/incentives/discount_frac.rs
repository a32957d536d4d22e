//! Greedy allocation by remaining coverage with discounted cost.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::require_thresholds;
use crate::errors::GraphResult;
use crate::graph::{Incentives, Network, NodeId, NodeThresholds};

/// Repeatedly take the unprocessed node with the most out-edges into
/// unprocessed nodes (ties: smallest id) and pay what it still needs once
/// its processed in-neighbors are counted, capped by the remaining budget.
///
/// Stops when the budget is gone or every node is processed; untouched nodes
/// keep an incentive of zero. Counters are maintained incrementally and the
/// frontier is an ordered set, so each step costs O(degree * log V).
///
/// # Errors
/// - `MissingAttribute` if a node has no threshold
pub fn discount_frac(
    network: &Network,
    thresholds: &NodeThresholds,
    budget: u64,
) -> GraphResult<Incentives> {
    require_thresholds(network, thresholds)?;

    let mut incentives: Incentives = network.node_ids().map(|n| (n, 0)).collect();
    let mut remaining_out: FxHashMap<NodeId, usize> = network
        .node_ids()
        .map(|n| (n, network.out_degree(n)))
        .collect();
    let mut processed_in: FxHashMap<NodeId, u64> = FxHashMap::default();
    let mut processed: FxHashSet<NodeId> = FxHashSet::default();

    // First element is the highest coverage, then the smallest id
    let mut frontier: BTreeSet<(Reverse<usize>, NodeId)> = remaining_out
        .iter()
        .map(|(&n, &out)| (Reverse(out), n))
        .collect();

    let mut budget_left = budget;
    while budget_left > 0 {
        let Some((Reverse(coverage), candidate)) = frontier.pop_first() else {
            break;
        };
        processed.insert(candidate);

        let threshold = thresholds[&candidate];
        let discount = processed_in.get(&candidate).copied().unwrap_or(0);
        let spend = threshold.saturating_sub(discount).min(budget_left);
        incentives.insert(candidate, spend);
        budget_left -= spend;

        debug!(node = candidate, coverage, threshold, discount, spend, "discount_frac pick");

        // Every unprocessed source pointing at the candidate loses one unit of coverage
        for source in network.in_neighbors(candidate) {
            if processed.contains(&source) {
                continue;
            }
            if let Some(out) = remaining_out.get_mut(&source) {
                frontier.remove(&(Reverse(*out), source));
                *out = out.saturating_sub(1);
                frontier.insert((Reverse(*out), source));
            }
        }

        for target in network.out_neighbors(candidate) {
            *processed_in.entry(target).or_insert(0) += 1;
        }
    }

    debug!(
        budget,
        spent = budget - budget_left,
        processed = processed.len(),
        "discount_frac allocation"
    );
    Ok(incentives)
}
