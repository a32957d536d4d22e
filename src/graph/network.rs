//! Arena-backed directed multigraph with per-node and per-edge attributes.
//!
//! Nodes live in an ordered map keyed by id so iteration is always ascending.
//! Edges live in an arena indexed by `EdgeId`; a deleted edge leaves a
//! tombstone so its id is never handed out again. `Clone` is a deep copy.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{EdgeId, EdgeThresholds, NodeId, NodeThresholds};
use crate::errors::{GraphError, GraphResult};

/// Attribute name thresholds are stored under.
pub const THRESHOLD_ATTR: &str = "threshold";

/// Endpoints of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Adjacency {
    in_edges: Vec<EdgeId>,
    out_edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    nodes: BTreeMap<NodeId, Adjacency>,
    edges: Vec<Option<Edge>>,
    live_edges: usize,
    next_node_id: NodeId,
    node_attrs: BTreeMap<String, FxHashMap<NodeId, i64>>,
    edge_attrs: BTreeMap<String, FxHashMap<EdgeId, f64>>,
}

fn detach(list: &mut Vec<EdgeId>, edge: EdgeId) {
    if let Some(pos) = list.iter().position(|&e| e == edge) {
        list.swap_remove(pos);
    }
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from `(src, dst)` pairs, creating nodes on first sight.
    /// Edge ids follow the order of `edges`.
    pub fn from_edges(edges: &[(NodeId, NodeId)]) -> Self {
        let mut network = Network::new();
        for &(src, dst) in edges {
            network.ensure_node(src);
            network.ensure_node(dst);
            // Both endpoints exist, so insertion cannot fail.
            let _ = network.add_edge(src, dst);
        }
        network
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Add a node with the next unused id.
    ///
    /// The cursor saturates at `NodeId::MAX`; once that id is taken the id
    /// space is exhausted and no node is added.
    pub fn add_node(&mut self) -> GraphResult<NodeId> {
        let id = self.next_node_id;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::InvalidParameter("node id space exhausted".to_string()));
        }
        self.nodes.insert(id, Adjacency::default());
        self.next_node_id = id.saturating_add(1);
        Ok(id)
    }

    /// Add a node with an explicit id, as edge-list loaders need.
    pub fn add_node_with_id(&mut self, id: NodeId) -> GraphResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id, Adjacency::default());
        self.next_node_id = self.next_node_id.max(id.saturating_add(1));
        Ok(())
    }

    /// Add `id` unless it already exists. Returns true if it was inserted.
    pub fn ensure_node(&mut self, id: NodeId) -> bool {
        self.add_node_with_id(id).is_ok()
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Add a directed edge and return its fresh id.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId) -> GraphResult<EdgeId> {
        let id = EdgeId::try_from(self.edges.len())
            .map_err(|_| GraphError::InvalidParameter("edge id space exhausted".to_string()))?;
        self.add_edge_with_id(id, src, dst)?;
        Ok(id)
    }

    /// Add an edge under an explicit id. Ids below the arena length are
    /// either live or retired, so they are rejected.
    fn add_edge_with_id(&mut self, id: EdgeId, src: NodeId, dst: NodeId) -> GraphResult<()> {
        if !self.has_node(src) {
            return Err(GraphError::NodeNotFound(src));
        }
        if !self.has_node(dst) {
            return Err(GraphError::NodeNotFound(dst));
        }
        let slot = id as usize;
        if slot < self.edges.len() {
            return Err(GraphError::DuplicateEdge(id));
        }
        self.edges.resize(slot + 1, None);
        self.edges[slot] = Some(Edge { src, dst });
        self.live_edges += 1;

        if let Some(adj) = self.nodes.get_mut(&src) {
            adj.out_edges.push(id);
        }
        if let Some(adj) = self.nodes.get_mut(&dst) {
            adj.in_edges.push(id);
        }
        Ok(())
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.edges.get(id as usize).copied().flatten()
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Live edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|edge| (i as EdgeId, edge)))
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges().map(|(id, _)| id)
    }

    /// Delete one edge by id. Its edge attributes go with it.
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id as usize)
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;
        self.live_edges -= 1;

        if let Some(adj) = self.nodes.get_mut(&edge.src) {
            detach(&mut adj.out_edges, id);
        }
        if let Some(adj) = self.nodes.get_mut(&edge.dst) {
            detach(&mut adj.in_edges, id);
        }
        for table in self.edge_attrs.values_mut() {
            table.remove(&id);
        }
        Ok(edge)
    }

    /// Delete every edge from `src` to `dst`, returning the removed ids.
    pub fn delete_edges_between(&mut self, src: NodeId, dst: NodeId) -> GraphResult<Vec<EdgeId>> {
        if !self.has_node(src) {
            return Err(GraphError::NodeNotFound(src));
        }
        if !self.has_node(dst) {
            return Err(GraphError::NodeNotFound(dst));
        }
        let doomed: Vec<EdgeId> = self
            .out_edges(src)
            .iter()
            .copied()
            .filter(|&e| self.edge(e).is_some_and(|edge| edge.dst == dst))
            .collect();

        for &id in &doomed {
            self.delete_edge(id)?;
        }
        Ok(doomed)
    }

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------

    /// Check that the adjacency lists, live-edge count, id cursor and
    /// attribute tables agree with the edge arena. Decoded snapshots are
    /// run through this before use.
    pub(crate) fn validate(&self) -> GraphResult<()> {
        let broken =
            |msg: String| Err(GraphError::InvalidGraphType(format!("inconsistent network: {}", msg)));

        let live = self.edges.iter().filter(|e| e.is_some()).count();
        if live != self.live_edges {
            return broken(format!("{} live edges recorded, arena holds {}", self.live_edges, live));
        }
        if let Some(&max) = self.nodes.keys().next_back() {
            if self.next_node_id <= max && max != NodeId::MAX {
                return broken(format!("id cursor {} is not above node {}", self.next_node_id, max));
            }
        }

        let mut listed_in = Vec::with_capacity(live);
        let mut listed_out = Vec::with_capacity(live);
        for (&node, adj) in &self.nodes {
            for &id in &adj.in_edges {
                match self.edge(id) {
                    Some(edge) if edge.dst == node => listed_in.push(id),
                    _ => return broken(format!("node {} lists stray in-edge {}", node, id)),
                }
            }
            for &id in &adj.out_edges {
                match self.edge(id) {
                    Some(edge) if edge.src == node => listed_out.push(id),
                    _ => return broken(format!("node {} lists stray out-edge {}", node, id)),
                }
            }
        }
        // Every listed id is live and correctly attached; with no repeats and
        // matching totals each live edge appears exactly once per direction.
        for listed in [&mut listed_in, &mut listed_out] {
            listed.sort_unstable();
            listed.dedup();
            if listed.len() != live {
                return broken(format!("adjacency covers {} of {} live edges", listed.len(), live));
            }
        }
        if listed_in.len() != self.nodes.values().map(|adj| adj.in_edges.len()).sum::<usize>()
            || listed_out.len() != self.nodes.values().map(|adj| adj.out_edges.len()).sum::<usize>()
        {
            return broken("adjacency lists repeat an edge".to_string());
        }

        for (name, table) in &self.node_attrs {
            if let Some(&node) = table.keys().find(|&&node| !self.has_node(node)) {
                return broken(format!("node attribute '{}' set on missing node {}", name, node));
            }
        }
        for (name, table) in &self.edge_attrs {
            if let Some(&edge) = table.keys().find(|&&edge| !self.has_edge(edge)) {
                return broken(format!("edge attribute '{}' set on missing edge {}", name, edge));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_live_edges(&mut self, count: usize) {
        self.live_edges = count;
    }

    // ------------------------------------------------------------------
    // Adjacency queries (unknown ids have no edges)
    // ------------------------------------------------------------------

    pub fn in_edges(&self, node: NodeId) -> &[EdgeId] {
        self.nodes.get(&node).map_or(&[][..], |adj| adj.in_edges.as_slice())
    }

    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        self.nodes.get(&node).map_or(&[][..], |adj| adj.out_edges.as_slice())
    }

    /// Source of every in-edge; parallel edges repeat the neighbor.
    pub fn in_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges(node)
            .iter()
            .filter_map(move |&e| self.edge(e).map(|edge| edge.src))
    }

    /// Destination of every out-edge; parallel edges repeat the neighbor.
    pub fn out_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node)
            .iter()
            .filter_map(move |&e| self.edge(e).map(|edge| edge.dst))
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.in_edges(node).len()
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).len()
    }

    /// In-degree plus out-degree; a self-loop counts twice.
    pub fn degree(&self, node: NodeId) -> usize {
        self.in_degree(node) + self.out_degree(node)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_node_attr(&mut self, name: &str, node: NodeId, value: i64) -> GraphResult<()> {
        if !self.has_node(node) {
            return Err(GraphError::NodeNotFound(node));
        }
        self.node_attrs
            .entry(name.to_string())
            .or_default()
            .insert(node, value);
        Ok(())
    }

    pub fn node_attr(&self, name: &str, node: NodeId) -> Option<i64> {
        self.node_attrs.get(name)?.get(&node).copied()
    }

    pub fn has_node_attr(&self, name: &str) -> bool {
        self.node_attrs.contains_key(name)
    }

    pub fn set_edge_attr(&mut self, name: &str, edge: EdgeId, value: f64) -> GraphResult<()> {
        if !self.has_edge(edge) {
            return Err(GraphError::EdgeNotFound(edge));
        }
        self.edge_attrs
            .entry(name.to_string())
            .or_default()
            .insert(edge, value);
        Ok(())
    }

    pub fn edge_attr(&self, name: &str, edge: EdgeId) -> Option<f64> {
        self.edge_attrs.get(name)?.get(&edge).copied()
    }

    pub fn has_edge_attr(&self, name: &str) -> bool {
        self.edge_attrs.contains_key(name)
    }

    /// Store node thresholds as the `threshold` node attribute.
    pub fn attach_node_thresholds(&mut self, thresholds: &NodeThresholds) -> GraphResult<()> {
        for (&node, &value) in thresholds {
            let value = i64::try_from(value).map_err(|_| {
                GraphError::InvalidParameter(format!("threshold {} of node {} overflows", value, node))
            })?;
            self.set_node_attr(THRESHOLD_ATTR, node, value)?;
        }
        Ok(())
    }

    /// Read the `threshold` node attribute back into a map covering every node.
    pub fn node_thresholds(&self) -> GraphResult<NodeThresholds> {
        self.node_ids()
            .map(|node| {
                let raw = self
                    .node_attr(THRESHOLD_ATTR, node)
                    .ok_or_else(|| GraphError::missing_node_threshold(node))?;
                let value = u64::try_from(raw).map_err(|_| {
                    GraphError::InvalidParameter(format!("node {} has negative threshold {}", node, raw))
                })?;
                Ok((node, value))
            })
            .collect()
    }

    /// Store edge thresholds as the `threshold` edge attribute.
    pub fn attach_edge_thresholds(&mut self, thresholds: &EdgeThresholds) -> GraphResult<()> {
        for (&edge, &value) in thresholds {
            self.set_edge_attr(THRESHOLD_ATTR, edge, value)?;
        }
        Ok(())
    }

    /// Read the `threshold` edge attribute back into a map covering every edge.
    pub fn edge_thresholds(&self) -> GraphResult<EdgeThresholds> {
        self.edge_ids()
            .map(|edge| {
                self.edge_attr(THRESHOLD_ATTR, edge)
                    .map(|value| (edge, value))
                    .ok_or_else(|| GraphError::missing_edge_threshold(edge))
            })
            .collect()
    }
}
