//! Bounded candle history for pattern and extreme queries.

use crate::domain::Candle;
use crate::indicators::true_range;
use std::collections::VecDeque;

/// FIFO of recent candles, sized at construction to the largest lookback any
/// consumer needs. Pushing past capacity drops the oldest candle; no
/// reallocation happens after warm-up.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push_back(candle);
        if self.candles.len() > self.capacity {
            self.candles.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// The most recent `n` candles, oldest first. Returns fewer when the
    /// history is still short.
    pub fn window(&self, n: usize) -> impl Iterator<Item = &Candle> {
        let skip = self.candles.len().saturating_sub(n);
        self.candles.iter().skip(skip)
    }

    /// Lowest low over the last `lookback` bars (clamped to what exists).
    pub fn lowest_low(&self, lookback: usize) -> f64 {
        self.window(lookback)
            .map(|c| c.low)
            .fold(f64::INFINITY, f64::min)
    }

    /// Highest high over the last `lookback` bars (clamped to what exists).
    pub fn highest_high(&self, lookback: usize) -> f64 {
        self.window(lookback)
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mean volume over the last `periods` bars; 0 when empty.
    pub fn average_volume(&self, periods: usize) -> f64 {
        let n = periods.min(self.candles.len());
        if n == 0 {
            return 0.0;
        }
        self.window(n).map(|c| c.volume).sum::<f64>() / n as f64
    }

    /// Simple-average true range over the last `periods` bars. Each bar's TR
    /// uses its predecessor's close, so `periods + 1` candles are required;
    /// returns 0 until then.
    pub fn average_true_range(&self, periods: usize) -> f64 {
        if self.candles.len() < periods + 1 {
            return 0.0;
        }
        let candles: Vec<&Candle> = self.candles.iter().collect();
        let start = candles.len() - periods;
        let mut sum = 0.0;
        for i in start..candles.len() {
            sum += true_range(candles[i].high, candles[i].low, candles[i - 1].close);
        }
        sum / periods as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn filled(capacity: usize, closes: &[f64]) -> RollingHistory {
        let mut h = RollingHistory::new(capacity);
        for c in make_candles(closes) {
            h.push(c);
        }
        h
    }

    #[test]
    fn bounded_at_capacity() {
        let h = filled(3, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(h.len(), 3);
        assert_eq!(h.last().unwrap().close, 5.0);
        // Oldest two were dropped
        assert_eq!(h.lowest_low(10), 3.0 - 0.5);
    }

    #[test]
    fn extremes_over_lookback() {
        let h = filled(10, &[10.0, 50.0, 20.0, 30.0]);
        // Last 2 bars only
        assert_eq!(h.lowest_low(2), 19.5);
        assert_eq!(h.highest_high(2), 30.5);
        // Whole history
        assert_eq!(h.highest_high(10), 50.5);
    }

    #[test]
    fn average_volume_clamps_to_available() {
        let h = filled(10, &[1.0, 2.0]);
        assert_eq!(h.average_volume(5), 1000.0);
        let empty = RollingHistory::new(4);
        assert_eq!(empty.average_volume(5), 0.0);
    }

    #[test]
    fn atr_requires_one_extra_bar() {
        let h = filled(10, &[100.0, 101.0, 102.0]);
        assert_eq!(h.average_true_range(3), 0.0);
        // TR per bar: max(1.0 range, |high-prev close|, |low-prev close|)
        // = max(1.0, 1.5, 0.5) = 1.5 for each rising bar
        let atr = h.average_true_range(2);
        assert!((atr - 1.5).abs() < 1e-12);
    }
}
