//! Candle — the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// OHLCV candle for a single instrument at a single timestamp.
///
/// Immutable once produced by the (external) loader. Timestamps are UTC
/// milliseconds since epoch, strictly increasing within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Typical price (HLC/3).
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True if the candle closed above its open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// True if the candle closed below its open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute body size (|close - open|).
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Upper wick: high minus the body top.
    pub fn upper_wick(&self) -> f64 {
        self.high - self.close.max(self.open)
    }

    /// Lower wick: body bottom minus the low.
    pub fn lower_wick(&self) -> f64 {
        self.close.min(self.open) - self.low
    }
}
