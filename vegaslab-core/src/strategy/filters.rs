//! Common entry filters applied before any rule is evaluated.
//!
//! Filter order matters for short-circuiting only; a candidate entry must
//! clear every filter. The session window and blocked hours/days are
//! interpreted in UTC.

use crate::config::StrategyConfig;
use crate::domain::Candle;
use crate::indicators::{Adx, MarketRegime};
use crate::strategy::history::RollingHistory;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// First tradable UTC hour, inclusive.
const SESSION_OPEN_HOUR: u32 = 6;
/// Last tradable UTC hour, inclusive.
const SESSION_CLOSE_HOUR: u32 = 22;

/// UTC datetime of a candle timestamp; None when the millis are out of
/// chrono's representable range.
pub(crate) fn candle_datetime(timestamp_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp_ms)
}

/// Gate shared by all sixteen entry rules.
pub fn passes_common_filters(
    cfg: &StrategyConfig,
    adx: &Adx,
    regime: Option<&MarketRegime>,
    history: &RollingHistory,
    candle: &Candle,
) -> bool {
    let adx_value = adx.value();
    if adx_value < cfg.adx_threshold {
        return false;
    }
    if adx_value > cfg.adx_max_threshold {
        return false;
    }
    // A falling ADX means the trend is losing strength even inside the band.
    if cfg.adx_require_slope_up && adx.slope() < 0.0 {
        return false;
    }

    if let Some(regime) = regime {
        if regime.is_ready()
            && cfg.pause_on_high_volatility_range
            && regime.should_pause_trading()
        {
            return false;
        }
    }

    // Abnormal volume spikes mark exhaustion moves, not entries.
    let avg_volume = history.average_volume(cfg.volume_avg_period);
    if avg_volume > 0.0 && candle.volume > avg_volume * cfg.volume_spike_ratio {
        return false;
    }

    let dt = match candle_datetime(candle.timestamp) {
        Some(dt) => dt,
        None => return false,
    };
    let hour = dt.hour();
    if cfg.is_hour_blocked(hour) {
        return false;
    }
    if cfg.is_day_blocked(dt.weekday().number_from_monday()) {
        return false;
    }
    if !(SESSION_OPEN_HOUR..=SESSION_CLOSE_HOUR).contains(&hour) {
        return false;
    }

    true
}
