//! Budget split proportional to out-degree.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::errors::{GraphError, GraphResult};
use crate::graph::{Incentives, Network, NodeId};

/// Give every node `floor(budget * out_degree / |E|)`, then hand out the
/// rounding remainder one unit at a time to uniformly drawn nodes (with
/// replacement). The total always equals `budget`.
///
/// The floor is computed in exact integer arithmetic, so the proportional
/// part can never overshoot the budget. An edgeless network spends the whole
/// budget through the random draws.
///
/// # Errors
/// - `InvalidParameter` if `budget > 0` and the network has no nodes
pub fn degree_frac(network: &Network, budget: u64, seed: u64) -> GraphResult<Incentives> {
    let edges = network.edge_count() as u128;

    let mut incentives = Incentives::new();
    let mut spent: u64 = 0;
    for node in network.node_ids() {
        let share = if edges == 0 {
            0
        } else {
            (budget as u128 * network.out_degree(node) as u128 / edges) as u64
        };
        incentives.insert(node, share);
        spent += share;
    }

    let remainder = budget.saturating_sub(spent);
    if remainder > 0 {
        let nodes: Vec<NodeId> = network.node_ids().collect();
        if nodes.is_empty() {
            return Err(GraphError::InvalidParameter(format!(
                "cannot spend a budget of {} on an empty network",
                budget
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..remainder {
            let pick = nodes[rng.random_range(0..nodes.len())];
            *incentives.entry(pick).or_insert(0) += 1;
        }
    }

    debug!(budget, proportional = spent, remainder, "degree_frac allocation");
    Ok(incentives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incentives::total_cost;

    fn star(leaves: u32) -> Network {
        let edges: Vec<(u32, u32)> = (1..=leaves).map(|leaf| (0, leaf)).collect();
        Network::from_edges(&edges)
    }

    #[test]
    fn test_conservation_across_budgets() {
        let g = Network::from_edges(&[(0, 1), (0, 2), (1, 2), (2, 3), (3, 0), (3, 1), (3, 2)]);
        for budget in [0, 1, 2, 5, 7, 13, 100, 1001] {
            let incentives = degree_frac(&g, budget, 11).unwrap();
            assert_eq!(total_cost(&incentives), budget, "budget {}", budget);
            assert_eq!(incentives.len(), g.node_count());
        }
    }

    #[test]
    fn test_exact_multiple_has_no_remainder() {
        // 5 edges all out of the center: the center takes the whole budget
        let g = star(5);
        let incentives = degree_frac(&g, 10, 0).unwrap();
        assert_eq!(incentives[&0], 10);
        assert!((1..=5).all(|leaf| incentives[&leaf] == 0));
    }

    #[test]
    fn test_edgeless_network_spends_randomly() {
        let mut g = Network::new();
        for _ in 0..4 {
            g.add_node().unwrap();
        }
        let incentives = degree_frac(&g, 9, 3).unwrap();
        assert_eq!(total_cost(&incentives), 9);
    }

    #[test]
    fn test_empty_network() {
        let g = Network::new();
        assert!(degree_frac(&g, 0, 0).unwrap().is_empty());
        assert!(matches!(degree_frac(&g, 1, 0), Err(GraphError::InvalidParameter(_))));
    }

    #[test]
    fn test_deterministic_per_seed() {
        // No edges, so every unit goes through the sampler
        let mut g = Network::new();
        for _ in 0..10 {
            g.add_node().unwrap();
        }
        let a = degree_frac(&g, 50, 5).unwrap();
        let b = degree_frac(&g, 50, 5).unwrap();
        let c = degree_frac(&g, 50, 6).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
