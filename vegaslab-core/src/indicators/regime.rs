//! Market regime classifier: trend strength + volatility.
//!
//! Combines the ADX reading with a 14-bar ATR and a 20-bar Bollinger width
//! to label the market as a strong trend, moderate trend, or a low/high
//! volatility range. The high-volatility range is the dangerous one and can
//! pause entries.

use crate::domain::Candle;
use crate::indicators::true_range;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const ATR_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_MULTIPLIER: f64 = 2.0;
const ATR_HISTORY_PERIOD: usize = 50;

/// Market regime classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// ADX at or above the strong-trend threshold.
    StrongTrend,
    /// ADX between the moderate and strong thresholds.
    ModerateTrend,
    /// Ranging with narrow bands and ordinary ATR.
    LowVolatilityRange,
    /// Ranging with expanded ATR or wide bands.
    HighVolatilityRange,
}

/// Incremental regime detector.
#[derive(Debug, Clone)]
pub struct MarketRegime {
    strong_trend_threshold: f64,
    moderate_trend_threshold: f64,

    tr_values: VecDeque<f64>,
    atr: f64,
    /// Recent ATR samples for the volatility ratio.
    atr_history: VecDeque<f64>,

    close_prices: VecDeque<f64>,
    bb_width: f64,

    current_regime: Regime,
    ready: bool,
    count: usize,
    prev_close: f64,
}

impl MarketRegime {
    pub fn new(strong_trend_threshold: f64, moderate_trend_threshold: f64) -> Self {
        Self {
            strong_trend_threshold,
            moderate_trend_threshold,
            tr_values: VecDeque::with_capacity(ATR_PERIOD + 1),
            atr: 0.0,
            atr_history: VecDeque::with_capacity(ATR_HISTORY_PERIOD + 1),
            close_prices: VecDeque::with_capacity(BB_PERIOD + 1),
            bb_width: 0.0,
            current_regime: Regime::LowVolatilityRange,
            ready: false,
            count: 0,
            prev_close: 0.0,
        }
    }

    /// Feed the next candle together with the current ADX value.
    pub fn update(&mut self, candle: &Candle, adx_value: f64) {
        self.count += 1;

        let tr = if self.count == 1 {
            candle.high - candle.low
        } else {
            true_range(candle.high, candle.low, self.prev_close)
        };
        self.prev_close = candle.close;

        self.tr_values.push_back(tr);
        if self.tr_values.len() > ATR_PERIOD {
            self.tr_values.pop_front();
        }
        if self.tr_values.len() >= ATR_PERIOD {
            self.atr = self.tr_values.iter().sum::<f64>() / self.tr_values.len() as f64;
            self.atr_history.push_back(self.atr);
            if self.atr_history.len() > ATR_HISTORY_PERIOD {
                self.atr_history.pop_front();
            }
        }

        self.close_prices.push_back(candle.close);
        if self.close_prices.len() > BB_PERIOD {
            self.close_prices.pop_front();
        }
        if self.close_prices.len() >= BB_PERIOD {
            let n = self.close_prices.len() as f64;
            let sma = self.close_prices.iter().sum::<f64>() / n;
            let variance = self
                .close_prices
                .iter()
                .map(|p| (p - sma) * (p - sma))
                .sum::<f64>()
                / n;
            let std_dev = variance.sqrt();
            if sma != 0.0 {
                let upper = sma + BB_MULTIPLIER * std_dev;
                let lower = sma - BB_MULTIPLIER * std_dev;
                self.bb_width = (upper - lower) / sma * 100.0;
            }
        }

        if self.count >= ATR_PERIOD.max(BB_PERIOD) {
            self.ready = true;
            self.current_regime = self.classify(adx_value);
        }
    }

    fn classify(&self, adx_value: f64) -> Regime {
        if adx_value >= self.strong_trend_threshold {
            Regime::StrongTrend
        } else if adx_value >= self.moderate_trend_threshold {
            Regime::ModerateTrend
        } else if self.atr_ratio() > 1.3 || self.bb_width > 6.0 {
            Regime::HighVolatilityRange
        } else {
            Regime::LowVolatilityRange
        }
    }

    fn average_atr(&self) -> f64 {
        if self.atr_history.is_empty() {
            return self.atr;
        }
        self.atr_history.iter().sum::<f64>() / self.atr_history.len() as f64
    }

    /// Current ATR over the average of recent ATR samples; 1.0 when no
    /// average is available.
    pub fn atr_ratio(&self) -> f64 {
        let avg = self.average_atr();
        if avg > 0.0 {
            self.atr / avg
        } else {
            1.0
        }
    }

    pub fn current_regime(&self) -> Regime {
        self.current_regime
    }

    /// Entries should pause in a high-volatility range.
    pub fn should_pause_trading(&self) -> bool {
        self.current_regime == Regime::HighVolatilityRange
    }

    /// Recommended reward ratio for the current regime.
    pub fn recommended_reward_ratio(&self) -> f64 {
        match self.current_regime {
            Regime::StrongTrend => 3.7,
            Regime::ModerateTrend => 2.5,
            Regime::LowVolatilityRange => 1.8,
            Regime::HighVolatilityRange => 1.5,
        }
    }

    pub fn atr(&self) -> f64 {
        self.atr
    }

    /// Bollinger band width as a percentage of the middle band.
    pub fn bb_width(&self) -> f64 {
        self.bb_width
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn reset(&mut self) {
        self.tr_values.clear();
        self.close_prices.clear();
        self.atr_history.clear();
        self.atr = 0.0;
        self.bb_width = 0.0;
        self.current_regime = Regime::LowVolatilityRange;
        self.ready = false;
        self.count = 0;
        self.prev_close = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn feed(regime: &mut MarketRegime, closes: &[f64], adx: f64) {
        for c in &make_candles(closes) {
            regime.update(c, adx);
        }
    }

    #[test]
    fn not_ready_before_both_windows_fill() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        let closes: Vec<f64> = (0..19).map(|i| 100.0 + i as f64 * 0.1).collect();
        feed(&mut regime, &closes, 30.0);
        // 19 bars: ATR window (14) is full but the Bollinger window (20) is not
        assert!(!regime.is_ready());
        assert_eq!(regime.current_regime(), Regime::LowVolatilityRange);
    }

    #[test]
    fn strong_trend_from_adx() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 0.1).collect();
        feed(&mut regime, &closes, 45.0);
        assert!(regime.is_ready());
        assert_eq!(regime.current_regime(), Regime::StrongTrend);
        assert!(!regime.should_pause_trading());
    }

    #[test]
    fn moderate_trend_between_thresholds() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 0.1).collect();
        feed(&mut regime, &closes, 30.0);
        assert_eq!(regime.current_regime(), Regime::ModerateTrend);
    }

    #[test]
    fn quiet_range_is_low_volatility() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        // Nearly flat closes: tight bands, steady ATR
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 2) as f64 * 0.05).collect();
        feed(&mut regime, &closes, 10.0);
        assert_eq!(regime.current_regime(), Regime::LowVolatilityRange);
        assert!(!regime.should_pause_trading());
    }

    #[test]
    fn wide_bands_flag_high_volatility() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        // Large swings: Bollinger width far above 6% of the mean
        let closes: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 90.0 } else { 110.0 })
            .collect();
        feed(&mut regime, &closes, 10.0);
        assert_eq!(regime.current_regime(), Regime::HighVolatilityRange);
        assert!(regime.should_pause_trading());
    }

    #[test]
    fn recommended_ratio_tracks_regime() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 0.1).collect();
        feed(&mut regime, &closes, 45.0);
        assert_eq!(regime.recommended_reward_ratio(), 3.7);
        feed(&mut regime, &closes, 30.0);
        assert_eq!(regime.recommended_reward_ratio(), 2.5);
        feed(&mut regime, &closes, 10.0);
        assert_eq!(regime.recommended_reward_ratio(), 1.8);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut regime = MarketRegime::new(40.0, 25.0);
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 0.1).collect();
        feed(&mut regime, &closes, 45.0);
        assert!(regime.is_ready());
        regime.reset();
        assert!(!regime.is_ready());
        assert_eq!(regime.current_regime(), Regime::LowVolatilityRange);
        assert_eq!(regime.atr(), 0.0);
    }
}
