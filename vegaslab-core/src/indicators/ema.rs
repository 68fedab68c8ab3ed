//! Exponential Moving Average (EMA), incremental.
//!
//! Warm-up: simple average of the first `period` closes.
//! Once warm: EMA[t] = EMA[t-1] + (close[t] - EMA[t-1]) * 2/(period+1).
//! Zero allocation after construction.

/// Incremental EMA over a fixed period.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
    value: f64,
    sum: f64,
    count: usize,
    initialized: bool,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            value: 0.0,
            sum: 0.0,
            count: 0,
            initialized: false,
        }
    }

    /// Feed the next close price.
    pub fn update(&mut self, price: f64) {
        if !self.initialized {
            self.sum += price;
            self.count += 1;
            if self.count >= self.period {
                self.value = self.sum / self.period as f64;
                self.initialized = true;
            }
        } else {
            self.value += (price - self.value) * self.multiplier;
        }
    }

    /// Current value; neutral 0 until warm-up completes.
    pub fn value(&self) -> f64 {
        if self.initialized {
            self.value
        } else {
            0.0
        }
    }

    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    /// Return to the pre-warm-up state.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.sum = 0.0;
        self.count = 0;
        self.initialized = false;
    }

    pub fn period(&self) -> usize {
        self.period
    }
}
