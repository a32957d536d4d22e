//! Error types for graph construction, threshold lookups and allocation.
//!
//! All public operations return `Result<T, GraphError>` instead of panicking
//! on bad input. Every variant is fatal to the call that produced it: no
//! partial incentive map or half-pruned graph is ever returned.

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Which attribute table a missing lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Node,
    Edge,
}

impl std::fmt::Display for AttrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrKind::Node => write!(f, "node"),
            AttrKind::Edge => write!(f, "edge"),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// A graph representation that cannot carry attributes was handed to an
    /// operation that needs them.
    #[error("invalid graph type: {0}")]
    InvalidGraphType(String),

    /// Threshold (or other attribute) lookup for an id with no entry.
    #[error("missing {kind} attribute '{name}' for id {id}")]
    MissingAttribute {
        kind: AttrKind,
        name: String,
        id: u32,
    },

    /// Unknown file format, graph kind or strategy name.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("edge {0} does not exist")]
    EdgeNotFound(EdgeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("edge id {0} is already in use")]
    DuplicateEdge(EdgeId),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary snapshot error: {0}")]
    Binary(#[from] bitcode::Error),
}

impl GraphError {
    pub(crate) fn missing_node_threshold(id: NodeId) -> Self {
        GraphError::MissingAttribute {
            kind: AttrKind::Node,
            name: "threshold".to_string(),
            id,
        }
    }

    pub(crate) fn missing_edge_threshold(id: EdgeId) -> Self {
        GraphError::MissingAttribute {
            kind: AttrKind::Edge,
            name: "threshold".to_string(),
            id,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
