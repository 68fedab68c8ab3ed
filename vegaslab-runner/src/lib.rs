//! VegasLab Runner — backtest orchestration on top of `vegaslab-core`.
//!
//! This crate provides:
//! - A serializable run configuration with content-addressed run ids
//! - A single-backtest runner producing schema-versioned results
//! - Performance metrics (win rate, drawdown, Sharpe, monthly returns)
//! - JSON and CSV export of results
//! - Parallel parameter sweeps over independent runs

pub mod config;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{RunConfig, RunId};
pub use export::{export_equity_csv, export_json, export_trades_csv, import_json};
pub use metrics::PerformanceMetrics;
pub use runner::{run_backtest, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{run_sweep, ParamGrid};
