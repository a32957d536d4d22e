//! Run configuration
//!
//! Loaded from `incentives.toml` in the working directory (or the file
//! passed with `--config`). Every field is optional; command-line flags
//! override whatever the file says.
//!
//! ```toml
//! [allocation]
//! strategy = "tpi"         # tpi, discount-frac, degree-frac
//! budget = 100             # used by the budgeted strategies
//! seed = 0
//!
//! [thresholds]
//! node = "proportional:0.5"
//! edge = "random"
//! seed = 0
//!
//! [evaluation]
//! trials = 100
//! seed = 0
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::GraphResult;
use crate::incentives::Strategy;
use crate::thresholds::{EdgeThresholdStrategy, NodeThresholdStrategy};

pub const CONFIG_FILE_NAME: &str = "incentives.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub allocation: AllocationConfig,
    pub thresholds: ThresholdConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllocationConfig {
    pub strategy: Strategy,
    /// Unset means the budgeted strategies need `--budget`
    pub budget: Option<u64>,
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Node threshold strategy spec, e.g. `constant:2`
    pub node: String,
    /// Edge threshold strategy spec, `random` or `proportional`
    pub edge: String,
    pub seed: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            node: NodeThresholdStrategy::default().to_string(),
            edge: EdgeThresholdStrategy::default().to_string(),
            seed: 0,
        }
    }
}

impl ThresholdConfig {
    pub fn node_strategy(&self) -> GraphResult<NodeThresholdStrategy> {
        self.node.parse()
    }

    pub fn edge_strategy(&self) -> GraphResult<EdgeThresholdStrategy> {
        self.edge.parse()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    pub trials: usize,
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig { trials: 100, seed: 0 }
    }
}

/// Load configuration, falling back to defaults when the file is missing
/// or cannot be parsed.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Config::default();
    }
    match load_toml_config(path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            Config::default()
        }
    }
}

fn load_toml_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    // Reject bad strategy specs here rather than halfway through a run
    config.thresholds.node_strategy()?;
    config.thresholds.edge_strategy()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.allocation.strategy, Strategy::Tpi);
        assert_eq!(config.allocation.budget, None);
        assert_eq!(config.evaluation.trials, 100);
        assert_eq!(
            config.thresholds.node_strategy().unwrap(),
            NodeThresholdStrategy::DegreeProportional(0.5)
        );
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
[allocation]
strategy = "discount-frac"
budget = 40

[thresholds]
node = "constant:2"
"#,
        )
        .unwrap();
        assert_eq!(config.allocation.strategy, Strategy::DiscountFrac);
        assert_eq!(config.allocation.budget, Some(40));
        assert_eq!(config.allocation.seed, 0);
        assert_eq!(
            config.thresholds.node_strategy().unwrap(),
            NodeThresholdStrategy::Constant(2)
        );
        assert_eq!(config.thresholds.edge_strategy().unwrap(), EdgeThresholdStrategy::Random);
        assert_eq!(config.evaluation, EvaluationConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join(CONFIG_FILE_NAME)), Config::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[thresholds]\nnode = \"linear\"\n").unwrap();
        assert_eq!(load_config(&path), Config::default());

        std::fs::write(&path, "[allocation\n").unwrap();
        assert_eq!(load_config(&path), Config::default());
    }

    #[test]
    fn test_valid_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[evaluation]\ntrials = 12\nseed = 4\n").unwrap();
        let config = load_config(&path);
        assert_eq!(config.evaluation.trials, 12);
        assert_eq!(config.evaluation.seed, 4);
    }
}
