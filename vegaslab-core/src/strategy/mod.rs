//! Entry strategy: indicators, touch/cross state, filters and the rule
//! table, wired together per bar.

pub mod filters;
pub mod history;
pub mod patterns;
pub mod rules;
pub mod touch_cross;

pub use history::RollingHistory;
pub use touch_cross::{BandLevels, TouchCrossState};

use crate::config::StrategyConfig;
use crate::domain::Candle;
use crate::indicators::{Adx, Ema, MarketRegime, Regime};
use rules::RuleContext;

/// The Vegas-tunnel strategy state for one run.
///
/// `update` must be called once per bar in timestamp order; the entry checks
/// then evaluate against the post-update indicator values. Touch/cross
/// tracking only begins once every indicator is warm, while the candle
/// history fills from the first bar.
#[derive(Debug, Clone)]
pub struct VegasStrategy {
    cfg: StrategyConfig,

    ema12: Ema,
    ema144: Ema,
    ema169: Ema,
    ema576: Ema,
    ema676: Ema,
    adx: Adx,
    /// Present only when the regime filter is enabled.
    regime: Option<MarketRegime>,

    history: RollingHistory,
    state: TouchCrossState,

    prev: Option<Candle>,
    current: Option<Candle>,
}

impl VegasStrategy {
    pub fn new(cfg: &StrategyConfig) -> Self {
        let regime = if cfg.enable_market_regime_filter {
            Some(MarketRegime::new(
                cfg.adx_strong_trend_threshold,
                cfg.adx_moderate_trend_threshold,
            ))
        } else {
            None
        };
        Self {
            ema12: Ema::new(cfg.ema12_len),
            ema144: Ema::new(cfg.ema144_len),
            ema169: Ema::new(cfg.ema169_len),
            ema576: Ema::new(cfg.ema576_len),
            ema676: Ema::new(cfg.ema676_len),
            adx: Adx::new(cfg.adx_period),
            regime,
            history: RollingHistory::new(cfg.max_history_len()),
            state: TouchCrossState::default(),
            prev: None,
            current: None,
            cfg: cfg.clone(),
        }
    }

    /// Feed the next candle.
    pub fn update(&mut self, candle: &Candle) {
        self.prev = self.current.take();

        self.ema12.update(candle.close);
        self.ema144.update(candle.close);
        self.ema169.update(candle.close);
        self.ema576.update(candle.close);
        self.ema676.update(candle.close);
        self.adx.update(candle);
        if let Some(regime) = &mut self.regime {
            regime.update(candle, self.adx.value());
        }

        self.history.push(candle.clone());

        if self.is_ready() {
            let bands = BandLevels::new(
                self.ema144.value(),
                self.ema169.value(),
                self.ema576.value(),
                self.ema676.value(),
            );
            let prev_close = self.prev.as_ref().map(|c| c.close);
            self.state
                .advance(prev_close, candle, bands, self.ema12.value());
        }

        self.current = Some(candle.clone());
    }

    /// All EMAs and the ADX are warm. Regime readiness is checked inside
    /// the filters, not here.
    pub fn is_ready(&self) -> bool {
        self.ema12.is_ready()
            && self.ema144.is_ready()
            && self.ema169.is_ready()
            && self.ema576.is_ready()
            && self.ema676.is_ready()
            && self.adx.is_ready()
    }

    /// Winning long rule for the bar last fed to `update`, if any.
    pub fn check_long_entry(&self, candle: &Candle) -> Option<u8> {
        if !self.passes_gate(candle) {
            return None;
        }
        rules::evaluate_long(&self.rule_context(candle))
    }

    /// Winning short rule for the bar last fed to `update`, if any.
    pub fn check_short_entry(&self, candle: &Candle) -> Option<u8> {
        if !self.passes_gate(candle) {
            return None;
        }
        rules::evaluate_short(&self.rule_context(candle))
    }

    fn passes_gate(&self, candle: &Candle) -> bool {
        self.is_ready()
            && filters::passes_common_filters(
                &self.cfg,
                &self.adx,
                self.regime.as_ref(),
                &self.history,
                candle,
            )
    }

    fn rule_context<'a>(&'a self, candle: &'a Candle) -> RuleContext<'a> {
        let ema12 = self.ema12.value();
        let prev_close = self.prev.as_ref().map(|c| c.close);
        let bullish_cross =
            prev_close.map_or(false, |p| p <= ema12 && candle.close > ema12);
        let bearish_cross =
            prev_close.map_or(false, |p| p >= ema12 && candle.close < ema12);
        RuleContext {
            cfg: &self.cfg,
            candle,
            prev: self.prev.as_ref(),
            ema12,
            ema144: self.ema144.value(),
            ema169: self.ema169.value(),
            ema576: self.ema576.value(),
            state: &self.state,
            history: &self.history,
            bullish_cross,
            bearish_cross,
        }
    }

    pub fn ema12(&self) -> f64 {
        self.ema12.value()
    }

    pub fn ema144(&self) -> f64 {
        self.ema144.value()
    }

    pub fn ema169(&self) -> f64 {
        self.ema169.value()
    }

    pub fn ema576(&self) -> f64 {
        self.ema576.value()
    }

    pub fn ema676(&self) -> f64 {
        self.ema676.value()
    }

    pub fn adx_value(&self) -> f64 {
        self.adx.value()
    }

    pub fn adx_slope(&self) -> f64 {
        self.adx.slope()
    }

    /// Current regime when the regime filter is enabled and warm.
    pub fn regime(&self) -> Option<Regime> {
        self.regime
            .as_ref()
            .filter(|r| r.is_ready())
            .map(|r| r.current_regime())
    }

    pub fn lowest_low(&self, lookback: usize) -> f64 {
        self.history.lowest_low(lookback)
    }

    pub fn highest_high(&self, lookback: usize) -> f64 {
        self.history.highest_high(lookback)
    }

    pub fn average_volume(&self, periods: usize) -> f64 {
        self.history.average_volume(periods)
    }

    pub fn average_true_range(&self, periods: usize) -> f64 {
        self.history.average_true_range(periods)
    }

    pub fn prev_candle(&self) -> Option<&Candle> {
        self.prev.as_ref()
    }

    /// Return to the pre-first-bar state.
    pub fn reset(&mut self) {
        self.ema12.reset();
        self.ema144.reset();
        self.ema169.reset();
        self.ema576.reset();
        self.ema676.reset();
        self.adx.reset();
        if let Some(regime) = &mut self.regime {
            regime.reset();
        }
        self.history.clear();
        self.state.reset();
        self.prev = None;
        self.current = None;
    }
}
