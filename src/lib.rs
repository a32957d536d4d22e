//! Partial incentives - target set selection on influence networks
//!
//! Under the linear-threshold model a node activates once enough of its
//! in-neighbors are active. An incentive lowers that requirement. This crate
//! computes incentive assignments that push a network towards (or, with
//! [`incentives::tpi`], guarantee) full activation:
//!
//! ```
//! use partial_incentives::graph::{Network, NodeThresholds};
//! use partial_incentives::incentives::tpi;
//!
//! let network = Network::from_edges(&[(0, 1), (1, 2), (2, 3)]);
//! let thresholds: NodeThresholds = [(0, 2), (1, 1), (2, 1), (3, 1)].into_iter().collect();
//! let incentives = tpi(&network, &thresholds).unwrap();
//! assert_eq!(incentives[&0], 2);
//! ```

pub mod cascade;
pub mod config;
pub mod errors;
pub mod graph;
pub mod incentives;
pub mod io;
pub mod pruner;
pub mod thresholds;

pub use errors::{GraphError, GraphResult};
