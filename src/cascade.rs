//! Linear-threshold cascade simulation
//!
//! [`simulate`] runs the deterministic cascade to its fixed point: a node
//! activates once the number of active in-edges reaches its threshold minus
//! its incentive. [`evaluate`] repeats that over pruned samples of the
//! network to estimate how far a given incentive map spreads when edges only
//! fire with some probability.
//!
//! Trials are independent (each owns its pruned copy and seeded stream), so
//! they run in parallel with rayon without affecting reproducibility.

use std::collections::VecDeque;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

use crate::errors::{GraphError, GraphResult};
use crate::graph::{EdgeThresholds, Incentives, Network, NodeId, NodeThresholds};
use crate::incentives::apply_incentives;
use crate::pruner::prune;

/// Outcome of one cascade run.
#[derive(Debug, Clone)]
pub struct Cascade {
    /// Activation round per active node; round 0 holds the self-activated.
    rounds: FxHashMap<NodeId, usize>,
    total: usize,
}

impl Cascade {
    pub fn activated_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.rounds.contains_key(&node)
    }

    pub fn is_complete(&self) -> bool {
        self.rounds.len() == self.total
    }

    /// Round in which `node` activated, if it did.
    pub fn round_of(&self, node: NodeId) -> Option<usize> {
        self.rounds.get(&node).copied()
    }

    /// Number of rounds until the fixed point (0 for an empty cascade).
    pub fn depth(&self) -> usize {
        self.rounds.values().max().map_or(0, |&r| r + 1)
    }

    /// Nodes that never activated, ascending.
    pub fn inactive<'a>(&'a self, network: &'a Network) -> impl Iterator<Item = NodeId> + 'a {
        network.node_ids().filter(move |n| !self.is_active(*n))
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.rounds.len() as f64 / self.total as f64
        }
    }
}

/// Run the cascade on `network` with `incentives` applied to `thresholds`.
///
/// Parallel edges count once each; self-loops never help since a node cannot
/// be active before it activates.
///
/// # Errors
/// - `MissingAttribute` if a node has no threshold
pub fn simulate(
    network: &Network,
    thresholds: &NodeThresholds,
    incentives: &Incentives,
) -> GraphResult<Cascade> {
    if let Some(node) = network.node_ids().find(|n| !thresholds.contains_key(n)) {
        return Err(GraphError::missing_node_threshold(node));
    }
    let effective = apply_incentives(thresholds, incentives);

    let mut rounds: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut active_in: FxHashMap<NodeId, u64> = FxHashMap::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for node in network.node_ids() {
        if effective[&node] == 0 {
            rounds.insert(node, 0);
            queue.push_back(node);
        }
    }

    while let Some(node) = queue.pop_front() {
        let round = rounds[&node];
        for target in network.out_neighbors(node) {
            if rounds.contains_key(&target) {
                continue;
            }
            let count = active_in.entry(target).or_insert(0);
            *count += 1;
            if *count >= effective[&target] {
                rounds.insert(target, round + 1);
                queue.push_back(target);
            }
        }
    }

    Ok(Cascade {
        rounds,
        total: network.node_count(),
    })
}

/// Aggregate spread over a batch of pruned samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub trials: usize,
    pub nodes: usize,
    pub mean_activated: f64,
    pub min_activated: usize,
    pub max_activated: usize,
    /// Trials in which every node activated.
    pub complete_trials: usize,
}

impl Evaluation {
    pub fn mean_fraction(&self) -> f64 {
        if self.nodes == 0 {
            1.0
        } else {
            self.mean_activated / self.nodes as f64
        }
    }
}

/// Monte-Carlo spread of `incentives`: trial `t` prunes with seed
/// `seed + t` and runs the cascade on the sample.
///
/// # Errors
/// - `InvalidParameter` if `trials == 0`
/// - `MissingAttribute` for a gap in either threshold map
pub fn evaluate(
    network: &Network,
    node_thresholds: &NodeThresholds,
    edge_thresholds: &EdgeThresholds,
    incentives: &Incentives,
    trials: usize,
    seed: u64,
) -> GraphResult<Evaluation> {
    if trials == 0 {
        return Err(GraphError::InvalidParameter(
            "trials must be at least 1".to_string(),
        ));
    }

    let counts: Vec<usize> = (0..trials)
        .into_par_iter()
        .map(|trial| -> GraphResult<usize> {
            let sample = prune(network, edge_thresholds, seed.wrapping_add(trial as u64))?;
            let cascade = simulate(&sample, node_thresholds, incentives)?;
            Ok(cascade.activated_count())
        })
        .collect::<GraphResult<Vec<usize>>>()?;

    let nodes = network.node_count();
    let evaluation = Evaluation {
        trials,
        nodes,
        mean_activated: counts.iter().sum::<usize>() as f64 / trials as f64,
        min_activated: counts.iter().copied().min().unwrap_or(0),
        max_activated: counts.iter().copied().max().unwrap_or(0),
        complete_trials: counts.iter().filter(|&&c| c == nodes).count(),
    };
    debug!(
        trials,
        mean = evaluation.mean_activated,
        complete = evaluation.complete_trials,
        "monte-carlo evaluation"
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(values: &[u64]) -> NodeThresholds {
        values.iter().enumerate().map(|(i, &t)| (i as NodeId, t)).collect()
    }

    #[test]
    fn test_path_cascades_in_order() {
        let g = Network::from_edges(&[(0, 1), (1, 2), (2, 3)]);
        let cascade = simulate(&g, &thresholds(&[0, 1, 1, 1]), &Incentives::new()).unwrap();
        assert!(cascade.is_complete());
        assert_eq!(cascade.round_of(3), Some(3));
        assert_eq!(cascade.depth(), 4);
    }

    #[test]
    fn test_nothing_starts_without_zero_threshold() {
        let g = Network::from_edges(&[(0, 1), (1, 2), (2, 0)]);
        let cascade = simulate(&g, &thresholds(&[1, 1, 1]), &Incentives::new()).unwrap();
        assert_eq!(cascade.activated_count(), 0);
        assert_eq!(cascade.inactive(&g).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_incentive_unlocks_cycle() {
        let g = Network::from_edges(&[(0, 1), (1, 2), (2, 0)]);
        let incentives: Incentives = [(1, 1)].into_iter().collect();
        let cascade = simulate(&g, &thresholds(&[1, 1, 1]), &incentives).unwrap();
        assert!(cascade.is_complete());
        assert_eq!(cascade.round_of(1), Some(0));
    }

    #[test]
    fn test_threshold_needs_enough_active_in_edges() {
        // Node 2 needs both 0 and 1
        let g = Network::from_edges(&[(0, 2), (1, 2)]);
        let partial = simulate(&g, &thresholds(&[0, 1, 2]), &Incentives::new()).unwrap();
        assert!(!partial.is_active(2));
        let full = simulate(&g, &thresholds(&[0, 0, 2]), &Incentives::new()).unwrap();
        assert!(full.is_active(2));
    }

    #[test]
    fn test_self_loop_cannot_self_activate() {
        let g = Network::from_edges(&[(0, 0)]);
        let cascade = simulate(&g, &thresholds(&[1]), &Incentives::new()).unwrap();
        assert!(!cascade.is_active(0));
    }

    #[test]
    fn test_missing_threshold() {
        let g = Network::from_edges(&[(0, 1)]);
        assert!(simulate(&g, &thresholds(&[0]), &Incentives::new()).is_err());
    }

    #[test]
    fn test_evaluate_without_pruning_matches_simulation() {
        let g = Network::from_edges(&[(0, 1), (1, 2), (2, 3)]);
        let node_thr = thresholds(&[0, 1, 1, 1]);
        let edge_thr: EdgeThresholds = g.edge_ids().map(|e| (e, 0.0)).collect();
        let eval = evaluate(&g, &node_thr, &edge_thr, &Incentives::new(), 8, 1).unwrap();
        assert_eq!(eval.complete_trials, 8);
        assert_eq!(eval.min_activated, 4);
        assert!((eval.mean_fraction() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_everything_pruned() {
        let g = Network::from_edges(&[(0, 1), (1, 2)]);
        let node_thr = thresholds(&[0, 1, 1]);
        let edge_thr: EdgeThresholds = g.edge_ids().map(|e| (e, 1.0)).collect();
        let eval = evaluate(&g, &node_thr, &edge_thr, &Incentives::new(), 4, 0).unwrap();
        assert_eq!(eval.max_activated, 1);
        assert_eq!(eval.complete_trials, 0);
    }

    #[test]
    fn test_evaluate_is_reproducible() {
        let mut edges = Vec::new();
        for i in 0..6u32 {
            for j in 0..6u32 {
                if i != j {
                    edges.push((i, j));
                }
            }
        }
        let g = Network::from_edges(&edges);
        let node_thr = thresholds(&[0, 1, 2, 2, 3, 1]);
        let edge_thr: EdgeThresholds = g.edge_ids().map(|e| (e, 0.4)).collect();
        let a = evaluate(&g, &node_thr, &edge_thr, &Incentives::new(), 16, 5).unwrap();
        let b = evaluate(&g, &node_thr, &edge_thr, &Incentives::new(), 16, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_rejects_zero_trials() {
        let g = Network::from_edges(&[(0, 1)]);
        let edge_thr: EdgeThresholds = [(0, 0.5)].into_iter().collect();
        assert!(matches!(
            evaluate(&g, &thresholds(&[0, 1]), &edge_thr, &Incentives::new(), 0, 0),
            Err(GraphError::InvalidParameter(_))
        ));
    }
}
