//! Price-structure pattern checks used by the entry rules.
//!
//! All detectors read the rolling history only; the newest candle in the
//! history is the bar under evaluation.

use crate::strategy::history::RollingHistory;

/// 2B bullish: the current bar wicks strictly below the lowest low of the
/// preceding `lookback` bars, then closes back above it (a failed breakdown).
pub fn two_b_bullish(history: &RollingHistory, lookback: usize) -> bool {
    if history.len() < lookback.max(3) {
        return false;
    }
    let current = match history.last() {
        Some(c) => c,
        None => return false,
    };
    let prior_low = history
        .window(lookback + 1)
        .take(lookback)
        .map(|c| c.low)
        .fold(f64::INFINITY, f64::min);
    current.low < prior_low && current.close > prior_low
}

/// 2B bearish: the current bar wicks strictly above the highest high of the
/// preceding `lookback` bars, then closes back below it (a failed breakout).
pub fn two_b_bearish(history: &RollingHistory, lookback: usize) -> bool {
    if history.len() < lookback.max(3) {
        return false;
    }
    let current = match history.last() {
        Some(c) => c,
        None => return false,
    };
    let prior_high = history
        .window(lookback + 1)
        .take(lookback)
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    current.high > prior_high && current.close < prior_high
}

/// Double bottom: within the last `lookback` bars, two consecutive swing
/// lows (a low below both neighbors) sit within 2% of each other.
pub fn double_bottom(history: &RollingHistory, lookback: usize) -> bool {
    if history.len() < 5 {
        return false;
    }
    let window: Vec<f64> = history.window(lookback).map(|c| c.low).collect();
    let swings = swing_points(&window, |a, b| a < b);
    consecutive_pair_within(&swings, 0.02)
}

/// Double top: within the last `lookback` bars, two consecutive swing highs
/// (a high above both neighbors) sit within 2% of each other.
pub fn double_top(history: &RollingHistory, lookback: usize) -> bool {
    if history.len() < 5 {
        return false;
    }
    let window: Vec<f64> = history.window(lookback).map(|c| c.high).collect();
    let swings = swing_points(&window, |a, b| a > b);
    consecutive_pair_within(&swings, 0.02)
}

/// Any of the last five bars dipped below the fast EMA.
pub fn pullback_below(history: &RollingHistory, ema12: f64) -> bool {
    history.window(5).any(|c| c.low < ema12)
}

/// Any of the last five bars reached above the fast EMA.
pub fn pullback_above(history: &RollingHistory, ema12: f64) -> bool {
    history.window(5).any(|c| c.high > ema12)
}

/// Interior points more extreme than both neighbors, in order.
fn swing_points(values: &[f64], more_extreme: fn(f64, f64) -> bool) -> Vec<f64> {
    let mut swings = Vec::new();
    for i in 1..values.len().saturating_sub(1) {
        if more_extreme(values[i], values[i - 1]) && more_extreme(values[i], values[i + 1]) {
            swings.push(values[i]);
        }
    }
    swings
}

/// Any adjacent pair of swing values within `tolerance` (relative to the
/// first of the pair).
fn consecutive_pair_within(swings: &[f64], tolerance: f64) -> bool {
    swings.windows(2).any(|pair| {
        let base = pair[0].abs();
        base > 0.0 && (pair[1] - pair[0]).abs() / base <= tolerance
    })
}
