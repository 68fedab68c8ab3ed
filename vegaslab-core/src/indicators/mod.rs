//! Incremental technical indicators.
//!
//! Every indicator updates in O(1) per candle and exposes `is_ready()`;
//! value queries before readiness return a defined neutral 0 rather than
//! failing. `reset()` returns an indicator to its pre-warm-up state.

pub mod adx;
pub mod ema;
pub mod regime;

pub use adx::Adx;
pub use ema::Ema;
pub use regime::{MarketRegime, Regime};

/// Wilder's true range against the previous close.
pub(crate) fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
pub(crate) fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| crate::domain::Candle {
            timestamp: i as i64 * 60_000,
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
        })
        .collect()
}
