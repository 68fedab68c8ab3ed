//! Brackets, reward ratio, leverage and position sizing.

use crate::config::StrategyConfig;
use crate::domain::Direction;
use crate::indicators::Regime;

/// Everything needed to open a position once a rule has fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub quantity: f64,
    pub notional_value: f64,
    pub leverage: u32,
}

/// Reward ratio for the bar: the regime's configured ratio under dynamic
/// reward, otherwise the static ratio floored at the minimum. Both ranging
/// regimes share the ranging ratio. With no regime reading the static path
/// applies.
pub fn effective_reward_ratio(cfg: &StrategyConfig, regime: Option<Regime>) -> f64 {
    if cfg.enable_dynamic_reward_ratio {
        match regime {
            Some(Regime::StrongTrend) => cfg.strong_trend_reward_ratio,
            Some(Regime::ModerateTrend) => cfg.moderate_trend_reward_ratio,
            Some(Regime::LowVolatilityRange) | Some(Regime::HighVolatilityRange) => {
                cfg.ranging_reward_ratio
            }
            None => cfg.reward_ratio.max(cfg.min_reward_ratio),
        }
    } else {
        cfg.reward_ratio.max(cfg.min_reward_ratio)
    }
}

/// Leverage for the bar. Static unless dynamic leverage is enabled;
/// dynamic scales the base by the regime multiplier and an ADX factor
/// `0.5 + 0.5·min(1, adx/strongThreshold)`, rounded and clamped to the
/// configured bounds. With no regime reading the moderate multiplier
/// applies.
pub fn effective_leverage(cfg: &StrategyConfig, regime: Option<Regime>, adx_value: f64) -> u32 {
    if !cfg.enable_dynamic_leverage {
        return cfg.leverage;
    }
    let multiplier = match regime {
        Some(Regime::StrongTrend) => cfg.strong_trend_leverage_multiplier,
        Some(Regime::LowVolatilityRange) => cfg.low_vol_range_leverage_multiplier,
        Some(Regime::HighVolatilityRange) => cfg.high_vol_range_leverage_multiplier,
        Some(Regime::ModerateTrend) | None => cfg.moderate_trend_leverage_multiplier,
    };
    let adx_factor = 0.5 + 0.5 * (adx_value / cfg.adx_strong_trend_threshold).min(1.0);
    let raw = (cfg.base_leverage as f64 * multiplier * adx_factor).round() as i64;
    (raw.max(cfg.min_leverage as i64) as u32).min(cfg.max_leverage)
}

/// Compute the full bracket for an entry. Returns None when the stop sits
/// on the wrong side of (or exactly at) the entry price, i.e. zero risk.
pub fn size_position(
    cfg: &StrategyConfig,
    direction: Direction,
    entry_price: f64,
    stop_loss: f64,
    regime: Option<Regime>,
    adx_value: f64,
) -> Option<Bracket> {
    let risk = match direction {
        Direction::Long => entry_price - stop_loss,
        Direction::Short => stop_loss - entry_price,
    };
    if risk <= 0.0 {
        return None;
    }

    let ratio = effective_reward_ratio(cfg, regime);
    let take_profit = match direction {
        Direction::Long => entry_price + risk * ratio,
        Direction::Short => entry_price - risk * ratio,
    };

    let leverage = effective_leverage(cfg, regime, adx_value);

    let (quantity, notional_value) = if cfg.enable_fixed_risk_sizing {
        let scaled_risk_budget =
            cfg.fixed_risk_per_trade_usdt * (leverage as f64 / cfg.base_leverage as f64);
        let quantity = scaled_risk_budget / risk;
        (quantity, quantity * entry_price)
    } else {
        let notional = cfg.fixed_notional_usdt * leverage as f64;
        (notional / entry_price, notional)
    };

    Some(Bracket {
        stop_loss,
        take_profit,
        quantity,
        notional_value,
        leverage,
    })
}
