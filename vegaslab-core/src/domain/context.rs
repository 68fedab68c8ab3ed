//! TradeContext — market state snapshot captured at entry.

use serde::{Deserialize, Serialize};

/// Everything the engine knew about the market the moment a position was
/// opened. Attached to the resulting [`super::Trade`] and immutable from
/// then on; consumed by external loss-pattern analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeContext {
    // ── Time of entry (UTC) ──
    /// Hour 0-23.
    pub entry_hour: u32,
    /// ISO weekday, 1 = Monday .. 7 = Sunday.
    pub entry_day_of_week: u32,
    /// Month 1-12.
    pub entry_month: u32,

    // ── Trend indicators ──
    pub adx: f64,
    pub ema12: f64,
    pub ema144: f64,
    pub ema169: f64,
    pub ema576: f64,
    pub ema676: f64,

    // ── Price and volume ──
    pub entry_price: f64,
    pub entry_volume: f64,
    pub avg_volume: f64,
    /// Entry volume over average volume (1.0 when no average available).
    pub volume_ratio: f64,
    pub stop_loss_distance_percent: f64,
    pub take_profit_distance_percent: f64,

    // ── Volatility ──
    /// 14-bar simple average true range.
    pub atr: f64,
    pub atr_percent: f64,
    /// Entry candle's high-low range.
    pub recent_range: f64,

    // ── EMA structure ──
    pub distance_from_ema12_percent: f64,
    pub distance_from_ema144_percent: f64,
    pub ema144_to_169_distance_percent: f64,
    pub golden_cross: bool,
    pub death_cross: bool,

    // ── Candle shape ──
    pub bullish_candle: bool,
    pub candle_body_percent: f64,
    pub upper_wick_percent: f64,
    pub lower_wick_percent: f64,

    // ── Streaks ──
    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    /// Hours since the previous trade closed, -1.0 when this is the first.
    pub hours_since_last_trade: f64,
}
