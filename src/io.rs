//! Reading and writing networks, thresholds and incentives
//!
//! - Edge lists (`.txt` whitespace separated, `.csv` comma separated),
//!   `#` comments and blank lines ignored, nodes created on first sight
//! - Binary snapshots (`.graph`): bitcode encoding of the whole network,
//!   attributes and isolated nodes included
//! - JSON maps for node thresholds (`.node.thresholds`), edge thresholds
//!   (`.edge.thresholds`) and incentives (`.incentives`)

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{GraphError, GraphResult};
use crate::graph::{Network, NodeId};

/// On-disk edge list flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeListFormat {
    Txt,
    Csv,
}

impl EdgeListFormat {
    fn extension(&self) -> &'static str {
        match self {
            EdgeListFormat::Txt => "txt",
            EdgeListFormat::Csv => "csv",
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            EdgeListFormat::Txt => line.split_whitespace().collect(),
            EdgeListFormat::Csv => line.split(',').map(str::trim).collect(),
        }
    }
}

/// Graph representation requested by a caller. Only networks carry the
/// attributes the allocators need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    Undirected,
    Directed,
    Network,
}

impl FromStr for GraphKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "network" => Ok(GraphKind::Network),
            "directed" | "undirected" => Err(GraphError::UnsupportedConfiguration(format!(
                "graphs of type '{}' cannot carry thresholds, use 'network'",
                s
            ))),
            _ => Err(GraphError::UnsupportedConfiguration(format!(
                "graphs of type '{}' are not supported",
                s
            ))),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::Undirected => write!(f, "undirected"),
            GraphKind::Directed => write!(f, "directed"),
            GraphKind::Network => write!(f, "network"),
        }
    }
}

/// Input files the CLI accepts, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    EdgeList(EdgeListFormat),
    Binary,
}

impl GraphFormat {
    pub fn from_path(path: &Path) -> GraphResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("txt") => Ok(GraphFormat::EdgeList(EdgeListFormat::Txt)),
            Some("csv") => Ok(GraphFormat::EdgeList(EdgeListFormat::Csv)),
            Some("graph") => Ok(GraphFormat::Binary),
            _ => Err(GraphError::UnsupportedConfiguration(format!(
                "cannot infer graph format of {} (expected .txt, .csv or .graph)",
                path.display()
            ))),
        }
    }
}

fn require_suffix(path: &Path, suffix: &str) -> GraphResult<()> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(suffix) {
        Ok(())
    } else {
        Err(GraphError::UnsupportedConfiguration(format!(
            "file name {} must end with {}",
            path.display(),
            suffix
        )))
    }
}

/// Load any supported graph file.
pub fn load_graph(path: &Path) -> GraphResult<Network> {
    match GraphFormat::from_path(path)? {
        GraphFormat::EdgeList(format) => load_edge_list(path, format),
        GraphFormat::Binary => load_binary(path),
    }
}

/// Store a graph in the format its extension names.
pub fn store_graph(network: &Network, path: &Path) -> GraphResult<()> {
    match GraphFormat::from_path(path)? {
        GraphFormat::EdgeList(EdgeListFormat::Txt) => store_edge_list(network, path),
        GraphFormat::EdgeList(EdgeListFormat::Csv) => Err(GraphError::UnsupportedConfiguration(
            "edge lists are stored as .txt".to_string(),
        )),
        GraphFormat::Binary => save_binary(network, path),
    }
}

// ============================================================================
// EDGE LISTS
// ============================================================================

pub fn load_edge_list(path: &Path, format: EdgeListFormat) -> GraphResult<Network> {
    require_suffix(path, &format!(".{}", format.extension()))?;
    let content = fs::read_to_string(path)?;
    let network = parse_edge_list(&content, format)?;
    debug!(
        "Loaded {} nodes and {} edges from {}",
        network.node_count(),
        network.edge_count(),
        path.display()
    );
    Ok(network)
}

pub fn parse_edge_list(content: &str, format: EdgeListFormat) -> GraphResult<Network> {
    let mut network = Network::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = format.split(line);
        if fields.len() < 2 {
            return Err(GraphError::Parse {
                line: i + 1,
                message: format!("expected two node ids, got '{}'", line),
            });
        }
        let parse_id = |field: &str| {
            field.parse::<NodeId>().map_err(|_| GraphError::Parse {
                line: i + 1,
                message: format!("'{}' is not a valid node id", field),
            })
        };
        let src = parse_id(fields[0])?;
        let dst = parse_id(fields[1])?;
        network.ensure_node(src);
        network.ensure_node(dst);
        network.add_edge(src, dst)?;
    }
    Ok(network)
}

/// Write `# Nodes: N Edges: M` followed by one `src\tdst` line per edge.
pub fn store_edge_list(network: &Network, path: &Path) -> GraphResult<()> {
    require_suffix(path, ".txt")?;
    let mut out = BufWriter::new(fs::File::create(path)?);
    writeln!(out, "# Directed network")?;
    writeln!(
        out,
        "# Nodes: {} Edges: {}",
        network.node_count(),
        network.edge_count()
    )?;
    writeln!(out, "# SrcNId\tDstNId")?;
    for (_, edge) in network.edges() {
        writeln!(out, "{}\t{}", edge.src, edge.dst)?;
    }
    out.flush()?;
    Ok(())
}

// ============================================================================
// BINARY SNAPSHOTS
// ============================================================================

#[derive(Serialize, Deserialize)]
struct Snapshot {
    kind: GraphKind,
    network: Network,
}

pub fn save_binary(network: &Network, path: &Path) -> GraphResult<()> {
    require_suffix(path, ".graph")?;
    let snapshot = Snapshot {
        kind: GraphKind::Network,
        network: network.clone(),
    };
    let bytes = bitcode::serialize(&snapshot)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_binary(path: &Path) -> GraphResult<Network> {
    require_suffix(path, ".graph")?;
    let bytes = fs::read(path)?;
    decode_snapshot(&bytes)
}

fn decode_snapshot(bytes: &[u8]) -> GraphResult<Network> {
    let snapshot: Snapshot = bitcode::deserialize(bytes)?;
    if snapshot.kind != GraphKind::Network {
        return Err(GraphError::InvalidGraphType(format!(
            "snapshot holds a {} graph, thresholds need a network",
            snapshot.kind
        )));
    }
    snapshot.network.validate()?;
    Ok(snapshot.network)
}

// ============================================================================
// THRESHOLD AND INCENTIVE MAPS
// ============================================================================

pub const NODE_THRESHOLDS_SUFFIX: &str = ".node.thresholds";
pub const EDGE_THRESHOLDS_SUFFIX: &str = ".edge.thresholds";
pub const INCENTIVES_SUFFIX: &str = ".incentives";

/// Store an id-keyed map as pretty JSON, enforcing the file suffix.
pub fn store_map<V: Serialize>(map: &BTreeMap<u32, V>, path: &Path, suffix: &str) -> GraphResult<()> {
    require_suffix(path, suffix)?;
    let json = serde_json::to_string_pretty(map)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_map<V: DeserializeOwned>(path: &Path, suffix: &str) -> GraphResult<BTreeMap<u32, V>> {
    require_suffix(path, suffix)?;
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Incentives, NodeThresholds, THRESHOLD_ATTR};

    #[test]
    fn test_parse_txt_with_comments() {
        let content = "# Directed graph\n# FromNodeId\tToNodeId\n0\t1\n1 2\n\n2\t0\n";
        let g = parse_edge_list(content, EdgeListFormat::Txt).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.out_neighbors(2).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_parse_csv_keeps_parallel_edges() {
        let g = parse_edge_list("5,7\n5, 7\n7,5\n", EdgeListFormat::Csv).unwrap();
        assert_eq!(g.node_ids().collect::<Vec<_>>(), vec![5, 7]);
        assert_eq!(g.out_degree(5), 2);
    }

    #[test]
    fn test_parse_errors_report_line() {
        match parse_edge_list("0 1\n2\n", EdgeListFormat::Txt) {
            Err(GraphError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(matches!(
            parse_edge_list("0 x\n", EdgeListFormat::Txt),
            Err(GraphError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_extension_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.csv");
        fs::write(&path, "0 1\n").unwrap();
        assert!(matches!(
            load_edge_list(&path, EdgeListFormat::Txt),
            Err(GraphError::UnsupportedConfiguration(_))
        ));
        assert!(GraphFormat::from_path(Path::new("graph.bin")).is_err());
    }

    #[test]
    fn test_edge_list_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let g = Network::from_edges(&[(0, 1), (1, 2), (3, 0)]);
        store_edge_list(&g, &path).unwrap();
        let loaded = load_graph(&path).unwrap();
        assert_eq!(loaded.edge_count(), 3);
        assert_eq!(loaded.in_degree(0), 1);
    }

    #[test]
    fn test_binary_keeps_attributes_and_isolated_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.graph");
        let mut g = Network::from_edges(&[(0, 1), (1, 2)]);
        let lonely = g.add_node().unwrap();
        g.delete_edge(0).unwrap();
        g.set_node_attr(THRESHOLD_ATTR, lonely, 4).unwrap();
        g.set_edge_attr(THRESHOLD_ATTR, 1, 0.3).unwrap();

        save_binary(&g, &path).unwrap();
        let loaded = load_graph(&path).unwrap();
        assert!(loaded.has_node(lonely));
        assert_eq!(loaded.edge_ids().collect::<Vec<_>>(), vec![1]);
        assert_eq!(loaded.node_attr(THRESHOLD_ATTR, lonely), Some(4));
        assert_eq!(loaded.edge_attr(THRESHOLD_ATTR, 1), Some(0.3));
    }

    #[test]
    fn test_binary_rejects_non_network_snapshot() {
        let snapshot = Snapshot {
            kind: GraphKind::Directed,
            network: Network::new(),
        };
        let bytes = bitcode::serialize(&snapshot).unwrap();
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(GraphError::InvalidGraphType(_))
        ));
    }

    #[test]
    fn test_binary_rejects_inconsistent_network() {
        let mut network = Network::from_edges(&[(0, 1)]);
        network.set_live_edges(0);
        let snapshot = Snapshot {
            kind: GraphKind::Network,
            network,
        };
        let bytes = bitcode::serialize(&snapshot).unwrap();
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(GraphError::InvalidGraphType(_))
        ));
    }

    #[test]
    fn test_maps_round_trip_with_suffix_check() {
        let dir = tempfile::tempdir().unwrap();
        let thresholds: NodeThresholds = [(0, 2), (4, 1)].into_iter().collect();
        let path = dir.path().join("demo.node.thresholds");
        store_map(&thresholds, &path, NODE_THRESHOLDS_SUFFIX).unwrap();
        let loaded: NodeThresholds = load_map(&path, NODE_THRESHOLDS_SUFFIX).unwrap();
        assert_eq!(loaded, thresholds);

        let incentives: Incentives = [(0, 1)].into_iter().collect();
        let wrong = dir.path().join("demo.json");
        assert!(store_map(&incentives, &wrong, INCENTIVES_SUFFIX).is_err());
    }

    #[test]
    fn test_graph_kind_parse() {
        assert_eq!("network".parse::<GraphKind>().unwrap(), GraphKind::Network);
        assert!(matches!(
            "directed".parse::<GraphKind>(),
            Err(GraphError::UnsupportedConfiguration(_))
        ));
        assert!("hypergraph".parse::<GraphKind>().is_err());
    }
}
