//! ADX — Average Directional Index (Wilder), incremental.
//!
//! Steps per bar:
//! 1. True range and +DM/-DM from the previous bar
//! 2. First `period` bars: running simple averages; after that Wilder
//!    smoothing with alpha = 1/period
//! 3. +DI = 100 * smoothed(+DM)/smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX, first defined the moment DX is first
//!    computable (no further warm-up)
//!
//! Bars where smoothed TR or the DI sum is zero carry the previous ADX/DI
//! values forward instead of dividing.

use crate::domain::Candle;
use crate::indicators::true_range;
use std::collections::VecDeque;

/// Number of retained ADX values for the slope estimate.
const SLOPE_LOOKBACK: usize = 5;

/// Incremental Wilder ADX with directional indicators and a slope estimate.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    alpha: f64,

    prev_high: f64,
    prev_low: f64,
    prev_close: f64,

    tr: f64,
    plus_dm: f64,
    minus_dm: f64,

    plus_di: f64,
    minus_di: f64,
    adx: f64,

    initialized: bool,
    count: usize,

    /// Most recent ADX values, oldest first.
    adx_history: VecDeque<f64>,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            alpha: 1.0 / period as f64,
            prev_high: 0.0,
            prev_low: 0.0,
            prev_close: 0.0,
            tr: 0.0,
            plus_dm: 0.0,
            minus_dm: 0.0,
            plus_di: 0.0,
            minus_di: 0.0,
            adx: 0.0,
            initialized: false,
            count: 0,
            adx_history: VecDeque::with_capacity(SLOPE_LOOKBACK),
        }
    }

    /// Feed the next candle.
    pub fn update(&mut self, candle: &Candle) {
        if self.count == 0 {
            self.prev_high = candle.high;
            self.prev_low = candle.low;
            self.prev_close = candle.close;
            self.count = 1;
            return;
        }

        let current_tr = true_range(candle.high, candle.low, self.prev_close);
        let up_move = candle.high - self.prev_high;
        let down_move = self.prev_low - candle.low;
        let current_plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let current_minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        if self.count < self.period {
            let n = self.count as f64;
            self.tr = (self.tr * (n - 1.0) + current_tr) / n;
            self.plus_dm = (self.plus_dm * (n - 1.0) + current_plus_dm) / n;
            self.minus_dm = (self.minus_dm * (n - 1.0) + current_minus_dm) / n;
        } else {
            self.tr += (current_tr - self.tr) * self.alpha;
            self.plus_dm += (current_plus_dm - self.plus_dm) * self.alpha;
            self.minus_dm += (current_minus_dm - self.minus_dm) * self.alpha;

            if self.tr > 0.0 {
                self.plus_di = 100.0 * (self.plus_dm / self.tr);
                self.minus_di = 100.0 * (self.minus_dm / self.tr);

                let di_sum = self.plus_di + self.minus_di;
                if di_sum > 0.0 {
                    let dx = 100.0 * (self.plus_di - self.minus_di).abs() / di_sum;
                    if self.initialized {
                        self.adx += (dx - self.adx) * self.alpha;
                    } else {
                        self.adx = dx;
                        self.initialized = true;
                    }

                    if self.adx_history.len() == SLOPE_LOOKBACK {
                        self.adx_history.pop_front();
                    }
                    self.adx_history.push_back(self.adx);
                }
            }
        }

        self.prev_high = candle.high;
        self.prev_low = candle.low;
        self.prev_close = candle.close;
        self.count += 1;
    }

    /// Current ADX (0-100); neutral 0 until the first DX is computed.
    pub fn value(&self) -> f64 {
        if self.initialized {
            self.adx
        } else {
            0.0
        }
    }

    pub fn plus_di(&self) -> f64 {
        if self.initialized {
            self.plus_di
        } else {
            0.0
        }
    }

    pub fn minus_di(&self) -> f64 {
        if self.initialized {
            self.minus_di
        } else {
            0.0
        }
    }

    /// ADX change per bar over the retained history:
    /// (newest - oldest) / (n - 1). Zero with fewer than two samples.
    pub fn slope(&self) -> f64 {
        if self.adx_history.len() < 2 {
            return 0.0;
        }
        let oldest = self.adx_history.front().copied().unwrap_or(0.0);
        let newest = self.adx_history.back().copied().unwrap_or(0.0);
        (newest - oldest) / (self.adx_history.len() as f64 - 1.0)
    }

    pub fn is_slope_up(&self) -> bool {
        self.slope() > 0.0
    }

    pub fn is_slope_down(&self) -> bool {
        self.slope() < 0.0
    }

    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    pub fn reset(&mut self) {
        self.prev_high = 0.0;
        self.prev_low = 0.0;
        self.prev_close = 0.0;
        self.tr = 0.0;
        self.plus_dm = 0.0;
        self.minus_dm = 0.0;
        self.plus_di = 0.0;
        self.minus_di = 0.0;
        self.adx = 0.0;
        self.initialized = false;
        self.count = 0;
        self.adx_history.clear();
    }

    pub fn period(&self) -> usize {
        self.period
    }
}
