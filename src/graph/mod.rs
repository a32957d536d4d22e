//! Influence network model
//!
//! A single concrete directed multigraph ([`Network`]) with stable integer
//! ids and always-available attribute tables, plus the id and map aliases
//! shared by the allocators, the pruner and the cascade simulator.

mod analysis;
mod network;

use std::collections::BTreeMap;

pub use analysis::{summarize, GraphSummary};
pub use network::{Edge, Network, THRESHOLD_ATTR};

/// Node identifier, stable for the lifetime of a [`Network`].
pub type NodeId = u32;

/// Edge identifier, assigned at insertion and never reused.
pub type EdgeId = u32;

/// Activation threshold per node: active in-neighbors needed to activate.
pub type NodeThresholds = BTreeMap<NodeId, u64>;

/// Firing probability per edge, used only by the pruner.
pub type EdgeThresholds = BTreeMap<EdgeId, f64>;

/// Subsidy per node, subtracted from its threshold (floored at zero).
pub type Incentives = BTreeMap<NodeId, u64>;
