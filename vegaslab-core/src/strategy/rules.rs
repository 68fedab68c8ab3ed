//! Entry rule table.
//!
//! The eight long and eight short rules are descriptors over the same
//! evaluation path: enable flag, the triggering fast-EMA cross, an optional
//! band-touch counter requirement, then a bespoke structure/pattern check.
//! Rules are tried in ascending id and the first match wins, so precedence
//! is a property of the table, not of code order. Shorts mirror longs with
//! above/below and bullish/bearish swapped.

use crate::config::StrategyConfig;
use crate::domain::Candle;
use crate::strategy::history::RollingHistory;
use crate::strategy::patterns;
use crate::strategy::touch_cross::TouchCrossState;

/// Which EMA band a rule's touch requirement refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandGroup {
    /// The slow pair (EMA576/EMA676).
    Outer,
    /// The medium pair (EMA144/EMA169).
    Mid,
}

/// Requirement on the cross counter of the touched band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterReq {
    Exactly(u32),
    AtLeast(u32),
}

impl CounterReq {
    fn satisfied(self, counter: u32) -> bool {
        match self {
            CounterReq::Exactly(n) => counter == n,
            CounterReq::AtLeast(n) => counter >= n,
        }
    }
}

/// One entry rule: id, optional band requirement, bespoke predicate.
pub struct RuleSpec {
    pub id: u8,
    pub band: Option<(BandGroup, CounterReq)>,
    pub extra: fn(&RuleContext) -> bool,
}

/// Everything a rule predicate may inspect for one bar. The EMA values are
/// post-update; `bullish_cross`/`bearish_cross` say whether this bar's close
/// crossed the fast EMA.
pub struct RuleContext<'a> {
    pub cfg: &'a StrategyConfig,
    pub candle: &'a Candle,
    pub prev: Option<&'a Candle>,
    pub ema12: f64,
    pub ema144: f64,
    pub ema169: f64,
    pub ema576: f64,
    pub state: &'a TouchCrossState,
    pub history: &'a RollingHistory,
    pub bullish_cross: bool,
    pub bearish_cross: bool,
}

impl RuleContext<'_> {
    fn bullish_structure(&self) -> bool {
        self.ema12 > self.ema144 || self.candle.close > self.ema144
    }

    fn bearish_structure(&self) -> bool {
        self.ema12 < self.ema144 || self.candle.close < self.ema144
    }

    /// Established uptrend: close above EMA144 above EMA169.
    fn uptrend(&self) -> bool {
        self.candle.close > self.ema144 && self.ema144 > self.ema169
    }

    /// Established downtrend: close below EMA144 below EMA169.
    fn downtrend(&self) -> bool {
        self.candle.close < self.ema144 && self.ema144 < self.ema169
    }

    /// Bullish candle, or a close above the prior bar's high. True with no
    /// prior bar.
    fn momentum_up(&self) -> bool {
        self.candle.is_bullish() || self.prev.map_or(true, |p| self.candle.close > p.high)
    }

    fn momentum_down(&self) -> bool {
        self.candle.is_bearish() || self.prev.map_or(true, |p| self.candle.close < p.low)
    }

    /// Fast EMA strictly between EMA144 and EMA576, whichever order those
    /// two are in.
    fn ema12_in_middle_zone(&self) -> bool {
        let lower = self.ema144.min(self.ema576);
        let upper = self.ema144.max(self.ema576);
        self.ema12 > lower && self.ema12 < upper
    }
}

fn long_1(ctx: &RuleContext) -> bool {
    ctx.bullish_structure() && ctx.momentum_up()
}

fn long_2(ctx: &RuleContext) -> bool {
    ctx.candle.close > ctx.ema144
}

fn long_3(ctx: &RuleContext) -> bool {
    patterns::two_b_bullish(ctx.history, ctx.cfg.pattern_2b_lookback) && ctx.bullish_structure()
}

fn long_4(ctx: &RuleContext) -> bool {
    ctx.bullish_structure()
}

fn long_5(ctx: &RuleContext) -> bool {
    ctx.state.was_above_ema12
        && patterns::pullback_below(ctx.history, ctx.ema12)
        && ctx.uptrend()
}

fn long_6(ctx: &RuleContext) -> bool {
    ctx.downtrend()
        && patterns::double_bottom(ctx.history, ctx.cfg.pattern_double_lookback)
        && patterns::two_b_bullish(ctx.history, ctx.cfg.pattern_2b_lookback)
}

fn long_7(ctx: &RuleContext) -> bool {
    ctx.ema144 > ctx.ema169
        && patterns::pullback_below(ctx.history, ctx.ema12)
        && ctx.candle.close > ctx.ema144
}

fn long_8(ctx: &RuleContext) -> bool {
    ctx.downtrend() && ctx.ema12_in_middle_zone()
}

fn short_1(ctx: &RuleContext) -> bool {
    ctx.bearish_structure() && ctx.momentum_down()
}

fn short_2(ctx: &RuleContext) -> bool {
    ctx.candle.close < ctx.ema144
}

fn short_3(ctx: &RuleContext) -> bool {
    patterns::two_b_bearish(ctx.history, ctx.cfg.pattern_2b_lookback) && ctx.bearish_structure()
}

fn short_4(ctx: &RuleContext) -> bool {
    ctx.bearish_structure()
}

fn short_5(ctx: &RuleContext) -> bool {
    ctx.state.was_below_ema12
        && patterns::pullback_above(ctx.history, ctx.ema12)
        && ctx.downtrend()
}

fn short_6(ctx: &RuleContext) -> bool {
    ctx.uptrend()
        && patterns::double_top(ctx.history, ctx.cfg.pattern_double_lookback)
        && patterns::two_b_bearish(ctx.history, ctx.cfg.pattern_2b_lookback)
}

fn short_7(ctx: &RuleContext) -> bool {
    ctx.ema144 < ctx.ema169
        && patterns::pullback_above(ctx.history, ctx.ema12)
        && ctx.candle.close < ctx.ema144
}

fn short_8(ctx: &RuleContext) -> bool {
    ctx.uptrend() && ctx.ema12_in_middle_zone()
}

pub const LONG_RULES: [RuleSpec; 8] = [
    RuleSpec { id: 1, band: Some((BandGroup::Outer, CounterReq::Exactly(1))), extra: long_1 },
    RuleSpec { id: 2, band: Some((BandGroup::Outer, CounterReq::Exactly(2))), extra: long_2 },
    RuleSpec { id: 3, band: Some((BandGroup::Mid, CounterReq::Exactly(1))), extra: long_3 },
    RuleSpec { id: 4, band: Some((BandGroup::Mid, CounterReq::Exactly(2))), extra: long_4 },
    RuleSpec { id: 5, band: None, extra: long_5 },
    RuleSpec { id: 6, band: None, extra: long_6 },
    RuleSpec { id: 7, band: None, extra: long_7 },
    RuleSpec { id: 8, band: Some((BandGroup::Mid, CounterReq::AtLeast(2))), extra: long_8 },
];

pub const SHORT_RULES: [RuleSpec; 8] = [
    RuleSpec { id: 1, band: Some((BandGroup::Outer, CounterReq::Exactly(1))), extra: short_1 },
    RuleSpec { id: 2, band: Some((BandGroup::Outer, CounterReq::Exactly(2))), extra: short_2 },
    RuleSpec { id: 3, band: Some((BandGroup::Mid, CounterReq::Exactly(1))), extra: short_3 },
    RuleSpec { id: 4, band: Some((BandGroup::Mid, CounterReq::Exactly(2))), extra: short_4 },
    RuleSpec { id: 5, band: None, extra: short_5 },
    RuleSpec { id: 6, band: None, extra: short_6 },
    RuleSpec { id: 7, band: None, extra: short_7 },
    RuleSpec { id: 8, band: Some((BandGroup::Mid, CounterReq::AtLeast(2))), extra: short_8 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Long,
    Short,
}

fn evaluate(rules: &[RuleSpec; 8], side: Side, ctx: &RuleContext) -> Option<u8> {
    let crossed = match side {
        Side::Long => ctx.bullish_cross,
        Side::Short => ctx.bearish_cross,
    };
    if !crossed {
        return None;
    }
    for rule in rules {
        let enabled = match side {
            Side::Long => ctx.cfg.is_long_rule_enabled(rule.id),
            Side::Short => ctx.cfg.is_short_rule_enabled(rule.id),
        };
        if !enabled {
            continue;
        }
        if let Some((band, req)) = rule.band {
            let (last_touch, counter) = match (side, band) {
                (Side::Long, BandGroup::Outer) => {
                    (ctx.state.last_touch_long, ctx.state.cross_count_long)
                }
                (Side::Long, BandGroup::Mid) => {
                    (ctx.state.last_touch_mid_long, ctx.state.mid_cross_count_long)
                }
                (Side::Short, BandGroup::Outer) => {
                    (ctx.state.last_touch_short, ctx.state.cross_count_short)
                }
                (Side::Short, BandGroup::Mid) => {
                    (ctx.state.last_touch_mid_short, ctx.state.mid_cross_count_short)
                }
            };
            if last_touch <= 0 || !req.satisfied(counter) {
                continue;
            }
        }
        if (rule.extra)(ctx) {
            return Some(rule.id);
        }
    }
    None
}

/// First matching long rule, lowest id first.
pub fn evaluate_long(ctx: &RuleContext) -> Option<u8> {
    evaluate(&LONG_RULES, Side::Long, ctx)
}

/// First matching short rule, lowest id first.
pub fn evaluate_short(ctx: &RuleContext) -> Option<u8> {
    evaluate(&SHORT_RULES, Side::Short, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    struct Fixture {
        cfg: StrategyConfig,
        candle: Candle,
        prev: Candle,
        state: TouchCrossState,
        history: RollingHistory,
        ema12: f64,
        ema144: f64,
        ema169: f64,
        ema576: f64,
    }

    impl Fixture {
        // Bullish cross bar with an uptrend EMA stack. The quiet history
        // sits above the fast EMA so no pullback registers by default.
        fn new() -> Self {
            let mut history = RollingHistory::new(64);
            for c in make_candles(&[102.0; 10]) {
                history.push(c);
            }
            Self {
                cfg: StrategyConfig::default(),
                candle: Candle {
                    timestamp: 11 * 60_000,
                    open: 100.0,
                    high: 101.5,
                    low: 99.8,
                    close: 101.0,
                    volume: 1000.0,
                },
                prev: Candle {
                    timestamp: 10 * 60_000,
                    open: 100.0,
                    high: 100.4,
                    low: 99.6,
                    close: 99.9,
                    volume: 1000.0,
                },
                state: TouchCrossState::default(),
                history,
                ema12: 100.0,
                ema144: 99.0,
                ema169: 98.5,
                ema576: 97.0,
            }
        }

        fn ctx(&self) -> RuleContext<'_> {
            let bullish_cross = self.prev.close <= self.ema12 && self.candle.close > self.ema12;
            let bearish_cross = self.prev.close >= self.ema12 && self.candle.close < self.ema12;
            RuleContext {
                cfg: &self.cfg,
                candle: &self.candle,
                prev: Some(&self.prev),
                ema12: self.ema12,
                ema144: self.ema144,
                ema169: self.ema169,
                ema576: self.ema576,
                state: &self.state,
                history: &self.history,
                bullish_cross,
                bearish_cross,
            }
        }
    }

    #[test]
    fn rule_1_fires_on_first_cross_after_outer_touch() {
        let mut f = Fixture::new();
        f.state.last_touch_long = 5;
        f.state.cross_count_long = 1;
        assert_eq!(evaluate_long(&f.ctx()), Some(1));
    }

    #[test]
    fn no_cross_means_no_signal() {
        let mut f = Fixture::new();
        f.state.last_touch_long = 5;
        f.state.cross_count_long = 1;
        // Previous close already above the fast EMA: no cross this bar
        f.prev.close = 100.5;
        assert_eq!(evaluate_long(&f.ctx()), None);
    }

    #[test]
    fn untouched_band_blocks_counter_rules() {
        let mut f = Fixture::new();
        f.state.cross_count_long = 1; // counter without a touch timestamp
        assert_eq!(evaluate_long(&f.ctx()), None);
    }

    #[test]
    fn rule_2_needs_second_cross_and_close_above_mid() {
        let mut f = Fixture::new();
        f.state.last_touch_long = 5;
        f.state.cross_count_long = 2;
        assert_eq!(evaluate_long(&f.ctx()), Some(2));
        // Close at or below EMA144 fails the extra check
        f.ema144 = 102.0;
        f.ema12 = 100.0;
        assert_eq!(evaluate_long(&f.ctx()), None);
    }

    #[test]
    fn lower_id_wins_when_two_rules_match() {
        let mut f = Fixture::new();
        // Rule 4: second cross after a mid touch, bullish structure.
        f.state.last_touch_mid_long = 5;
        f.state.mid_cross_count_long = 2;
        // Rule 7 would also match: golden cross, pullback, close above EMA144.
        f.history.push(Candle {
            timestamp: 10 * 60_000,
            open: 100.0,
            high: 100.5,
            low: 99.0, // below ema12 = 100: a pullback
            close: 100.0,
            volume: 1000.0,
        });
        assert_eq!(evaluate_long(&f.ctx()), Some(4));
        // With rule 4 disabled the same bar falls through to rule 7.
        f.cfg.long_rules_enabled[3] = false;
        assert_eq!(evaluate_long(&f.ctx()), Some(7));
    }

    #[test]
    fn disabled_rule_never_fires() {
        let mut f = Fixture::new();
        f.state.last_touch_long = 5;
        f.state.cross_count_long = 1;
        f.cfg.long_rules_enabled = [false; 8];
        assert_eq!(evaluate_long(&f.ctx()), None);
    }

    #[test]
    fn rule_8_accepts_counter_at_least_two() {
        let mut f = Fixture::new();
        // Downtrend (close < EMA144 < EMA169) with the fast EMA inside the
        // EMA144..EMA576 zone; EMA576 below EMA144 keeps the zone valid.
        f.ema12 = 105.0;
        f.ema144 = 108.0;
        f.ema169 = 109.0;
        f.ema576 = 90.0;
        f.prev.close = 104.0;
        f.candle.close = 106.0; // bullish cross of ema12 = 105
        f.state.last_touch_mid_long = 5;
        f.state.mid_cross_count_long = 3;
        assert_eq!(evaluate_long(&f.ctx()), Some(8));
        // Counter 1 routes to rule 3 instead, which needs a 2B pattern
        f.state.mid_cross_count_long = 1;
        assert_eq!(evaluate_long(&f.ctx()), None);
    }

    #[test]
    fn short_rule_1_mirrors_long() {
        let mut f = Fixture::new();
        // Bearish cross: prev above, close below the fast EMA
        f.prev.close = 100.5;
        f.candle.close = 99.5;
        f.candle.open = 100.2; // bearish candle
        f.ema144 = 101.0; // close below EMA144: bearish structure
        f.state.last_touch_short = 5;
        f.state.cross_count_short = 1;
        assert_eq!(evaluate_short(&f.ctx()), Some(1));
        assert_eq!(evaluate_long(&f.ctx()), None);
    }

    #[test]
    fn rule_5_requires_prior_side_and_pullback() {
        let mut f = Fixture::new();
        f.state.was_above_ema12 = true;
        // Uptrend stack: close 101 > ema144 99 > ema169 98.5
        // Add a recent bar dipping below the fast EMA
        f.history.push(Candle {
            timestamp: 10 * 60_000,
            open: 100.0,
            high: 100.5,
            low: 99.5,
            close: 100.0,
            volume: 1000.0,
        });
        assert_eq!(evaluate_long(&f.ctx()), Some(5));
        f.state.was_above_ema12 = false;
        // Without the prior-side flag, rule 5 fails; rule 7 still sees the
        // pullback and the golden cross.
        assert_eq!(evaluate_long(&f.ctx()), Some(7));
    }
}
