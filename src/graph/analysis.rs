//! Structural summary of an influence network.
//!
//! Used by the `stats` command to sanity-check an input before allocating.
//! Strongly connected components come from petgraph's Tarjan implementation,
//! the same way the code graph finds circular dependencies.

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{Network, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub self_loops: usize,
    /// Nodes nothing points to; any positive threshold on them must be paid.
    pub sources: usize,
    pub sinks: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub strongly_connected_components: usize,
    pub largest_component: usize,
}

pub fn summarize(network: &Network) -> GraphSummary {
    let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(network.node_count(), network.edge_count());
    let mut index = FxHashMap::default();
    for node in network.node_ids() {
        index.insert(node, graph.add_node(node));
    }

    let mut self_loops = 0;
    for (_, edge) in network.edges() {
        if edge.src == edge.dst {
            self_loops += 1;
        }
        graph.add_edge(index[&edge.src], index[&edge.dst], ());
    }

    let sccs = tarjan_scc(&graph);

    GraphSummary {
        nodes: network.node_count(),
        edges: network.edge_count(),
        self_loops,
        sources: network.node_ids().filter(|&n| network.in_degree(n) == 0).count(),
        sinks: network.node_ids().filter(|&n| network.out_degree(n) == 0).count(),
        max_in_degree: network.node_ids().map(|n| network.in_degree(n)).max().unwrap_or(0),
        max_out_degree: network.node_ids().map(|n| network.out_degree(n)).max().unwrap_or(0),
        strongly_connected_components: sccs.len(),
        largest_component: sccs.iter().map(Vec::len).max().unwrap_or(0),
    }
}
