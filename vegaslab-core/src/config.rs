//! Strategy configuration — one explicit immutable value per run.
//!
//! Every component receives the configuration by reference at construction;
//! there is no process-wide state. Defaults match the reference parameter
//! set (EMA tunnel 12/144/169/576/676, ADX 14, taker 0.075% / maker 0.02%).
//! `validate()` fails fast on malformed values, distinct from any runtime
//! trading condition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Configuration error raised at engine construction.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositivePeriod { name: &'static str, value: i64 },
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{name} must be non-negative, got {value}")]
    NegativeValue { name: &'static str, value: f64 },
}

/// Full parameter bundle for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    // ── Indicator periods ──
    pub ema12_len: usize,
    pub ema144_len: usize,
    pub ema169_len: usize,
    pub ema576_len: usize,
    pub ema676_len: usize,
    pub adx_period: usize,

    // ── ADX entry band ──
    pub adx_threshold: f64,
    pub adx_max_threshold: f64,
    pub adx_require_slope_up: bool,

    // ── Brackets and sizing ──
    /// Bars scanned for the stop-loss extreme (lowest low / highest high).
    pub stop_lookback: usize,
    pub leverage: u32,
    pub fixed_notional_usdt: f64,
    pub reward_ratio: f64,
    pub min_reward_ratio: f64,

    // ── Fees (percent of notional) ──
    pub maker_fee_percent: f64,
    pub taker_fee_percent: f64,

    // ── Rule enable flags, index 0 = rule 1 ──
    pub long_rules_enabled: [bool; 8],
    pub short_rules_enabled: [bool; 8],

    // ── Pattern lookbacks ──
    pub pattern_2b_lookback: usize,
    pub pattern_double_lookback: usize,

    // ── Volume spike filter ──
    pub volume_avg_period: usize,
    pub volume_spike_ratio: f64,

    // ── Time filter (UTC) ──
    pub blocked_hours: BTreeSet<u32>,
    /// ISO weekdays, 1 = Monday .. 7 = Sunday.
    pub blocked_days: BTreeSet<u32>,

    // ── Market regime filter ──
    pub enable_market_regime_filter: bool,
    pub pause_on_high_volatility_range: bool,
    pub adx_strong_trend_threshold: f64,
    pub adx_moderate_trend_threshold: f64,

    // ── Dynamic reward ratio ──
    pub enable_dynamic_reward_ratio: bool,
    pub strong_trend_reward_ratio: f64,
    pub moderate_trend_reward_ratio: f64,
    pub ranging_reward_ratio: f64,

    // ── Fixed-risk sizing ──
    pub enable_fixed_risk_sizing: bool,
    pub fixed_risk_per_trade_usdt: f64,

    // ── Max holding time ──
    pub enable_max_holding_time: bool,
    pub max_holding_time_hours: u64,

    // ── Dynamic leverage ──
    pub enable_dynamic_leverage: bool,
    pub base_leverage: u32,
    pub strong_trend_leverage_multiplier: f64,
    pub moderate_trend_leverage_multiplier: f64,
    pub low_vol_range_leverage_multiplier: f64,
    pub high_vol_range_leverage_multiplier: f64,
    pub min_leverage: u32,
    pub max_leverage: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ema12_len: 12,
            ema144_len: 144,
            ema169_len: 169,
            ema576_len: 576,
            ema676_len: 676,
            adx_period: 14,
            adx_threshold: 30.0,
            adx_max_threshold: 100.0,
            adx_require_slope_up: false,
            stop_lookback: 136,
            leverage: 50,
            fixed_notional_usdt: 100.0,
            reward_ratio: 3.7,
            min_reward_ratio: 2.0,
            maker_fee_percent: 0.02,
            taker_fee_percent: 0.075,
            long_rules_enabled: [true; 8],
            short_rules_enabled: [true; 8],
            pattern_2b_lookback: 10,
            pattern_double_lookback: 20,
            volume_avg_period: 20,
            volume_spike_ratio: 3.0,
            blocked_hours: BTreeSet::new(),
            blocked_days: BTreeSet::new(),
            enable_market_regime_filter: false,
            pause_on_high_volatility_range: true,
            adx_strong_trend_threshold: 40.0,
            adx_moderate_trend_threshold: 25.0,
            enable_dynamic_reward_ratio: false,
            strong_trend_reward_ratio: 3.7,
            moderate_trend_reward_ratio: 2.5,
            ranging_reward_ratio: 1.8,
            enable_fixed_risk_sizing: false,
            fixed_risk_per_trade_usdt: 100.0,
            enable_max_holding_time: false,
            max_holding_time_hours: 336,
            enable_dynamic_leverage: false,
            base_leverage: 50,
            strong_trend_leverage_multiplier: 1.0,
            moderate_trend_leverage_multiplier: 0.7,
            low_vol_range_leverage_multiplier: 0.4,
            high_vol_range_leverage_multiplier: 0.2,
            min_leverage: 5,
            max_leverage: 100,
        }
    }
}

impl StrategyConfig {
    /// Check the configuration for caller-side precondition violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods: [(&'static str, usize); 10] = [
            ("ema12_len", self.ema12_len),
            ("ema144_len", self.ema144_len),
            ("ema169_len", self.ema169_len),
            ("ema576_len", self.ema576_len),
            ("ema676_len", self.ema676_len),
            ("adx_period", self.adx_period),
            ("stop_lookback", self.stop_lookback),
            ("pattern_2b_lookback", self.pattern_2b_lookback),
            ("pattern_double_lookback", self.pattern_double_lookback),
            ("volume_avg_period", self.volume_avg_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::NonPositivePeriod { name, value: 0 });
            }
        }
        if self.leverage == 0 {
            return Err(ConfigError::NonPositivePeriod {
                name: "leverage",
                value: 0,
            });
        }
        if self.base_leverage == 0 {
            return Err(ConfigError::NonPositivePeriod {
                name: "base_leverage",
                value: 0,
            });
        }
        if self.adx_threshold > self.adx_max_threshold {
            return Err(ConfigError::InvertedRange {
                name: "adx_threshold",
                min: self.adx_threshold,
                max: self.adx_max_threshold,
            });
        }
        if self.min_leverage > self.max_leverage {
            return Err(ConfigError::InvertedRange {
                name: "leverage bounds",
                min: self.min_leverage as f64,
                max: self.max_leverage as f64,
            });
        }
        if self.adx_moderate_trend_threshold > self.adx_strong_trend_threshold {
            return Err(ConfigError::InvertedRange {
                name: "regime thresholds",
                min: self.adx_moderate_trend_threshold,
                max: self.adx_strong_trend_threshold,
            });
        }
        for (name, value) in [
            ("maker_fee_percent", self.maker_fee_percent),
            ("taker_fee_percent", self.taker_fee_percent),
            ("fixed_notional_usdt", self.fixed_notional_usdt),
            ("fixed_risk_per_trade_usdt", self.fixed_risk_per_trade_usdt),
            ("reward_ratio", self.reward_ratio),
            ("min_reward_ratio", self.min_reward_ratio),
            ("volume_spike_ratio", self.volume_spike_ratio),
            ("adx_threshold", self.adx_threshold),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeValue { name, value });
            }
        }
        Ok(())
    }

    /// Whether the given long rule (1-8) is enabled.
    pub fn is_long_rule_enabled(&self, rule_number: u8) -> bool {
        matches!(rule_number, 1..=8) && self.long_rules_enabled[rule_number as usize - 1]
    }

    /// Whether the given short rule (1-8) is enabled.
    pub fn is_short_rule_enabled(&self, rule_number: u8) -> bool {
        matches!(rule_number, 1..=8) && self.short_rules_enabled[rule_number as usize - 1]
    }

    /// Whether the given UTC hour (0-23) is blocked for entries.
    pub fn is_hour_blocked(&self, hour: u32) -> bool {
        self.blocked_hours.contains(&hour)
    }

    /// Whether the given ISO weekday (1=Mon..7=Sun) is blocked for entries.
    pub fn is_day_blocked(&self, day_of_week: u32) -> bool {
        self.blocked_days.contains(&day_of_week)
    }

    /// Rolling-history capacity: the largest lookback any consumer needs,
    /// with headroom for pattern neighbor scans.
    pub fn max_history_len(&self) -> usize {
        self.stop_lookback
            .max(self.pattern_2b_lookback)
            .max(self.pattern_double_lookback)
            + 50
    }
}
