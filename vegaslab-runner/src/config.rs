//! Serializable run configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vegaslab_core::StrategyConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Everything needed to reproduce one backtest run: the symbol, the
/// starting balance, and the full strategy parameter bundle. Candle data is
/// supplied separately by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub symbol: String,
    pub initial_balance: f64,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl RunConfig {
    pub fn new(symbol: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            symbol: symbol.into(),
            initial_balance,
            strategy: StrategyConfig::default(),
        }
    }

    /// Deterministic hash of the configuration. Two identical configs share
    /// a RunId, so persisted results can be looked up by content.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Load a configuration from a TOML file. Missing strategy keys fall
    /// back to their defaults.
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
