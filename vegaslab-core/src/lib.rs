//! VegasLab Core — deterministic bar-by-bar backtesting engine for the
//! Vegas-tunnel/ADX entry ruleset.
//!
//! The crate is built around three parts:
//! - Incremental indicator state (five EMAs, Wilder ADX with slope, an
//!   optional volatility-regime classifier), each O(1) per candle
//! - A 16-rule entry engine (8 long + 8 short) driven by touch/cross state
//!   relative to the EMA bands, with fixed numeric precedence
//! - The trade lifecycle: bracket computation, position sizing, fee and PnL
//!   accounting, and equity sampling
//!
//! Everything is owned by one engine instance per run; identical candles and
//! configuration always reproduce a bit-identical trade list.

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod risk;
pub mod strategy;

pub use config::{ConfigError, StrategyConfig};
pub use engine::{BacktestEngine, RunResult, EQUITY_SAMPLE_STRIDE};
