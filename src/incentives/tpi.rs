//! Target set selection with partial incentives (TPI)
//!
//! Greedy reduction on a private copy of the network. Each round:
//!
//! 1. Forced incentives: a node asking for more active in-neighbors than it
//!    has in-edges is paid the difference and its threshold drops to its
//!    in-degree.
//! 2. Resolution: a node whose threshold reached zero activates on its own.
//!    It leaves the graph and credits each unprocessed out-neighbor with one
//!    active in-neighbor (edge deleted, threshold decremented). This can
//!    cascade.
//! 3. Edge removal: among the rest, the node with the largest cost index
//!    `t(t+1) / (d(d+1))` is set aside. Its out-edges are deleted so nobody
//!    counts on it, and it will be activated by its own in-neighbors.
//!
//! Reversing the order in which nodes leave the graph gives an activation
//! order, so the returned incentives always activate the whole network.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use super::{require_thresholds, total_cost};
use crate::errors::GraphResult;
use crate::graph::{EdgeId, Incentives, Network, NodeId, NodeThresholds};

/// Cost index of a node as an exact fraction.
///
/// `t(t+1) / (d(d+1))` for in-degree `d > 0`. With no in-edges the index is
/// the threshold itself. Comparison is by integer cross-multiplication, so
/// equal indices are detected exactly and ties fall back to node id.
#[derive(Debug, Clone, Copy)]
pub struct SelectionIndex {
    numerator: u128,
    denominator: u128,
}

impl SelectionIndex {
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

pub fn selection_index(threshold: u64, in_degree: usize) -> SelectionIndex {
    if in_degree == 0 {
        return SelectionIndex {
            numerator: threshold as u128,
            denominator: 1,
        };
    }
    let t = threshold as u128;
    let d = in_degree as u128;
    SelectionIndex {
        numerator: t.saturating_mul(t + 1),
        denominator: d * (d + 1),
    }
}

impl Ord for SelectionIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.numerator.saturating_mul(other.denominator);
        let rhs = other.numerator.saturating_mul(self.denominator);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for SelectionIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SelectionIndex {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SelectionIndex {}

/// Compute incentives that activate every node of `network`.
///
/// Neither `network` nor `thresholds` is modified; all mutation happens on
/// owned copies dropped before returning.
///
/// # Errors
/// - `MissingAttribute` if a node has no threshold
pub fn tpi(network: &Network, thresholds: &NodeThresholds) -> GraphResult<Incentives> {
    require_thresholds(network, thresholds)?;

    let mut reduction = Reduction::new(network, thresholds)?;
    while !reduction.is_done() {
        reduction.forced_incentive_pass();
        reduction.resolve_zero_thresholds()?;
        if reduction.is_done() {
            break;
        }
        reduction.remove_most_expensive()?;
    }

    debug!(
        nodes = network.node_count(),
        removals = reduction.removals,
        cost = total_cost(&reduction.incentives),
        "tpi allocation"
    );
    Ok(reduction.incentives)
}

/// Working state of one `tpi` call.
struct Reduction {
    graph: Network,
    thresholds: NodeThresholds,
    incentives: Incentives,
    unprocessed: BTreeSet<NodeId>,
    removals: usize,
}

impl Reduction {
    fn new(network: &Network, thresholds: &NodeThresholds) -> GraphResult<Self> {
        let mut graph = network.clone();

        // A node is never its own active in-neighbor
        let loops: Vec<EdgeId> = graph
            .edges()
            .filter(|(_, edge)| edge.src == edge.dst)
            .map(|(id, _)| id)
            .collect();
        for id in loops {
            graph.delete_edge(id)?;
        }

        Ok(Reduction {
            thresholds: network.node_ids().map(|n| (n, thresholds[&n])).collect(),
            incentives: network.node_ids().map(|n| (n, 0)).collect(),
            unprocessed: network.node_ids().collect(),
            removals: 0,
            graph,
        })
    }

    fn is_done(&self) -> bool {
        self.unprocessed.is_empty()
    }

    /// Pay every deficit `threshold - in_degree`. Returns whether anything
    /// changed; a second sweep right after is always a no-op.
    fn forced_incentive_pass(&mut self) -> bool {
        let mut changed = false;
        for &node in &self.unprocessed {
            let in_degree = self.graph.in_degree(node) as u64;
            let Some(threshold) = self.thresholds.get_mut(&node) else {
                continue;
            };
            if *threshold > in_degree {
                let deficit = *threshold - in_degree;
                *self.incentives.entry(node).or_insert(0) += deficit;
                *threshold = in_degree;
                changed = true;
                debug!(node, deficit, "tpi forced incentive");
            }
        }
        changed
    }

    /// Retire every node with nothing left to wait for, crediting its
    /// out-neighbors, until no unprocessed node has a zero threshold.
    fn resolve_zero_thresholds(&mut self) -> GraphResult<usize> {
        let mut ready: Vec<NodeId> = self
            .unprocessed
            .iter()
            .copied()
            .filter(|n| self.thresholds.get(n) == Some(&0))
            .collect();

        let mut resolved = 0;
        while let Some(node) = ready.pop() {
            if !self.unprocessed.remove(&node) {
                continue;
            }
            resolved += 1;

            let out: Vec<EdgeId> = self.graph.out_edges(node).to_vec();
            for edge_id in out {
                let Some(edge) = self.graph.edge(edge_id) else {
                    continue;
                };
                if !self.unprocessed.contains(&edge.dst) {
                    continue;
                }
                self.graph.delete_edge(edge_id)?;
                if let Some(threshold) = self.thresholds.get_mut(&edge.dst) {
                    if *threshold > 0 {
                        *threshold -= 1;
                        if *threshold == 0 {
                            ready.push(edge.dst);
                        }
                    }
                }
            }
        }
        Ok(resolved)
    }

    /// Set aside the node with the largest cost index (ties: smallest id)
    /// and delete its out-edges.
    fn remove_most_expensive(&mut self) -> GraphResult<Option<NodeId>> {
        let mut best: Option<(SelectionIndex, NodeId)> = None;
        for &node in &self.unprocessed {
            let index = selection_index(
                self.thresholds.get(&node).copied().unwrap_or(0),
                self.graph.in_degree(node),
            );
            // Ascending scan with a strict comparison keeps the smallest id on ties
            let better = match &best {
                None => true,
                Some((top, _)) => index > *top,
            };
            if better {
                best = Some((index, node));
            }
        }

        let Some((index, candidate)) = best else {
            return Ok(None);
        };

        let out: Vec<EdgeId> = self.graph.out_edges(candidate).to_vec();
        for edge_id in &out {
            self.graph.delete_edge(*edge_id)?;
        }
        self.unprocessed.remove(&candidate);
        self.removals += 1;

        debug!(
            node = candidate,
            index = index.as_f64(),
            dropped_edges = out.len(),
            "tpi edge removal"
        );
        Ok(Some(candidate))
    }
}
