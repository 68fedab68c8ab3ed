//! Touch and cross bookkeeping against the EMA bands.
//!
//! The outer band is spanned by the two slow EMAs and the mid band by the two
//! medium EMAs. A bar that reaches into a band arms that side and resets its
//! cross counter; a later close crossing the fast EMA increments the armed
//! counters. Entry rules read the timestamps and counters, never raw candles.

use crate::domain::Candle;

/// Band edges for one bar, derived from the current EMA values. The lower
/// edge of each band is the smaller of its two EMAs regardless of which
/// period is on top.
#[derive(Debug, Clone, Copy)]
pub struct BandLevels {
    /// Lower edge of the outer (slow) band.
    pub outer_lower: f64,
    /// Upper edge of the outer (slow) band.
    pub outer_upper: f64,
    /// Lower edge of the mid (medium) band.
    pub mid_lower: f64,
    /// Upper edge of the mid (medium) band.
    pub mid_upper: f64,
}

impl BandLevels {
    pub fn new(ema144: f64, ema169: f64, ema576: f64, ema676: f64) -> Self {
        Self {
            outer_lower: ema576.min(ema676),
            outer_upper: ema576.max(ema676),
            mid_lower: ema144.min(ema169),
            mid_upper: ema144.max(ema169),
        }
    }
}

/// Per-side touch timestamps and cross counters.
///
/// `advance` is a pure transition over one bar: touch detection runs first
/// and resets the affected counters, then cross detection increments the
/// counters whose side has been touched. A bar that both touches and crosses
/// therefore ends with a counter of exactly 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchCrossState {
    /// Timestamp of the last dip into the outer band's lower edge (long side).
    pub last_touch_long: i64,
    /// Timestamp of the last reach into the outer band's upper edge (short side).
    pub last_touch_short: i64,
    /// Timestamp of the last dip into the mid band's lower edge.
    pub last_touch_mid_long: i64,
    /// Timestamp of the last reach into the mid band's upper edge.
    pub last_touch_mid_short: i64,

    /// Bullish fast-EMA crosses since the outer long touch.
    pub cross_count_long: u32,
    /// Bearish fast-EMA crosses since the outer short touch.
    pub cross_count_short: u32,
    /// Bullish crosses since the mid long touch.
    pub mid_cross_count_long: u32,
    /// Bearish crosses since the mid short touch.
    pub mid_cross_count_short: u32,

    /// Previous bar's close was above the fast EMA's current value.
    pub was_above_ema12: bool,
    /// Previous bar's close was below the fast EMA's current value.
    pub was_below_ema12: bool,
}

impl TouchCrossState {
    /// Advance the state by one bar. `prev_close` is the previous bar's
    /// close (None on the first tracked bar); `ema12` is the fast EMA after
    /// this bar's update.
    pub fn advance(&mut self, prev_close: Option<f64>, candle: &Candle, bands: BandLevels, ema12: f64) {
        // Touches reset before crosses count, so a touch-and-cross bar
        // leaves the counter at 1.
        if candle.low <= bands.outer_lower {
            self.last_touch_long = candle.timestamp;
            self.cross_count_long = 0;
        }
        if candle.high >= bands.outer_upper {
            self.last_touch_short = candle.timestamp;
            self.cross_count_short = 0;
        }
        if candle.low <= bands.mid_lower {
            self.last_touch_mid_long = candle.timestamp;
            self.mid_cross_count_long = 0;
        }
        if candle.high >= bands.mid_upper {
            self.last_touch_mid_short = candle.timestamp;
            self.mid_cross_count_short = 0;
        }

        if let Some(prev) = prev_close {
            let bullish_cross = prev <= ema12 && candle.close > ema12;
            let bearish_cross = prev >= ema12 && candle.close < ema12;

            if bullish_cross {
                if self.last_touch_long > 0 {
                    self.cross_count_long += 1;
                }
                if self.last_touch_mid_long > 0 {
                    self.mid_cross_count_long += 1;
                }
            }
            if bearish_cross {
                if self.last_touch_short > 0 {
                    self.cross_count_short += 1;
                }
                if self.last_touch_mid_short > 0 {
                    self.mid_cross_count_short += 1;
                }
            }

            self.was_above_ema12 = prev > ema12;
            self.was_below_ema12 = prev < ema12;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
