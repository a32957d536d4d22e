//! Stochastic edge pruning
//!
//! One realization of the independent-cascade style sampling: every edge
//! survives with probability `1 - p(e)`, where `p(e)` is its edge threshold.
//! Each call owns its own generator so results depend only on the inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::errors::{GraphError, GraphResult};
use crate::graph::{EdgeId, EdgeThresholds, Network};

/// Base the per-call seed is derived from.
pub const PRUNE_BASE_SEED: u64 = i64::MAX as u64;

/// Generator for one pruning pass with the given seed.
pub(crate) fn prune_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(PRUNE_BASE_SEED.wrapping_sub(seed))
}

/// Return a pruned copy of `network`.
///
/// Edges are visited in ascending id with exactly one draw `v` in `[0, 1)`
/// each; the edge is removed when `v < edge_thresholds[e]`.
///
/// # Errors
/// - `MissingAttribute` if any edge has no threshold
/// - `InvalidParameter` if a threshold is NaN
pub fn prune(network: &Network, edge_thresholds: &EdgeThresholds, seed: u64) -> GraphResult<Network> {
    // Validate before drawing so a bad map never yields a partial sample
    for edge in network.edge_ids() {
        let p = edge_thresholds
            .get(&edge)
            .ok_or_else(|| GraphError::missing_edge_threshold(edge))?;
        if p.is_nan() {
            return Err(GraphError::InvalidParameter(format!(
                "edge {} has NaN threshold",
                edge
            )));
        }
    }

    let mut rng = prune_rng(seed);
    let doomed: Vec<EdgeId> = network
        .edge_ids()
        .filter(|edge| {
            let value: f64 = rng.random();
            value < edge_thresholds[edge]
        })
        .collect();

    let mut pruned = network.clone();
    for &edge in &doomed {
        pruned.delete_edge(edge)?;
    }

    debug!(
        seed,
        removed = doomed.len(),
        kept = pruned.edge_count(),
        "pruned network"
    );
    Ok(pruned)
}
