//! Backtest runner — wires the engine and metrics into a persistable result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vegaslab_core::domain::{Candle, EquityPoint, Trade};
use vegaslab_core::{BacktestEngine, ConfigError};

use crate::config::{RunConfig, RunId};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("candles not in ascending timestamp order at index {0}")]
    UnorderedCandles(usize),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete, persistable result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Content hash of the configuration that produced this result.
    pub run_id: RunId,
    pub symbol: String,
    pub start_time: i64,
    pub end_time: i64,
    pub bar_count: usize,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Run one backtest over pre-loaded candles.
///
/// Validates the configuration and candle ordering up front; the engine
/// itself never fails mid-run.
pub fn run_backtest(config: &RunConfig, candles: &[Candle]) -> Result<BacktestResult, RunError> {
    for (i, pair) in candles.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(RunError::UnorderedCandles(i + 1));
        }
    }

    let mut engine = BacktestEngine::new(&config.strategy)?;
    let result = engine.run(&config.symbol, candles, config.initial_balance);
    let metrics =
        PerformanceMetrics::compute(&result.trades, &result.equity_curve, config.initial_balance);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        symbol: result.symbol,
        start_time: result.start_time,
        end_time: result.end_time,
        bar_count: candles.len(),
        initial_balance: result.initial_balance,
        final_balance: result.final_balance,
        metrics,
        trades: result.trades,
        equity_curve: result.equity_curve,
    })
}
