//! End-to-end engine tests over engineered candle paths.

use vegaslab_core::domain::{Candle, Direction, ExitReason};
use vegaslab_core::strategy::VegasStrategy;
use vegaslab_core::{BacktestEngine, StrategyConfig};

const MINUTE_MS: i64 = 60_000;
// 2024-01-02 12:00:00 UTC, a Tuesday: inside the trading window.
const START_MS: i64 = 1_704_196_800_000;

fn bar(i: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: START_MS + i * MINUTE_MS,
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Short warm-up periods so the full tunnel is ready after six bars.
fn fast_config() -> StrategyConfig {
    StrategyConfig {
        ema12_len: 2,
        ema144_len: 3,
        ema169_len: 4,
        ema576_len: 5,
        ema676_len: 6,
        adx_period: 2,
        adx_threshold: 0.0,
        stop_lookback: 5,
        // Only long rule 1 in play
        long_rules_enabled: [true, false, false, false, false, false, false, false],
        short_rules_enabled: [false; 8],
        ..StrategyConfig::default()
    }
}

/// A decline into the slow band, a deep dip, then a recovery bar whose close
/// crosses the fast EMA: the textbook first-cross long setup.
///
/// Bar 11 is the signal bar: EMA12 there is 96.3056 (bar 10 value 94.9167,
/// then +2/3 of the gap to close 97), the previous close 94.5 sits below it
/// and 97.0 above. The dip at bar 10 (low 90) put the long-side touch in
/// place, and bar 11's low of 96.4 stays above both slow EMAs (96.2222 and
/// 96.3622), so the counter ends the bar at exactly 1.
fn long_rule_1_path() -> Vec<Candle> {
    let mut candles = Vec::new();
    // Bars 0-9: steady 0.5/bar decline
    for i in 0..10 {
        let close = 100.0 - 0.5 * i as f64;
        candles.push(bar(i as i64, close + 0.1, close + 0.2, close - 0.2, close));
    }
    // Bar 10: deep dip through the slow band
    candles.push(bar(10, 95.0, 95.5, 90.0, 94.5));
    // Bar 11: recovery close above the fast EMA
    candles.push(bar(11, 96.5, 97.1, 96.4, 97.0));
    candles
}

#[test]
fn rising_series_puts_fast_ema_above_slow() {
    // Scenario A: 700 identical-shape candles, closes up $1 per bar.
    let cfg = StrategyConfig::default();
    let mut strategy = VegasStrategy::new(&cfg);
    for i in 0..700 {
        let close = 100.0 + i as f64;
        strategy.update(&bar(i, close - 0.5, close + 1.0, close - 1.0, close));
    }
    assert!(strategy.is_ready());
    assert!(strategy.ema12() > strategy.ema144());
    assert!(strategy.ema144() > strategy.ema676());
}

#[test]
fn long_rule_1_fires_once_with_reference_sizing() {
    // Scenario B: the engineered path must produce exactly one entry, on
    // bar 11, with default fixed-notional sizing.
    let mut candles = long_rule_1_path();
    // Bar 12: spans the take-profit (122.9) without reaching the stop (90)
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);

    assert_eq!(result.trades.len(), 1);
    let t = &result.trades[0];
    assert_eq!(t.id, 1);
    assert_eq!(t.symbol, "BTCUSDT");
    assert_eq!(t.direction, Direction::Long);
    assert_eq!(t.rule_number, 1);
    assert_eq!(t.entry_time, START_MS + 11 * MINUTE_MS);
    assert_eq!(t.entry_price, 97.0);

    // Stop at the lowest low of the last 5 bars (the bar-10 dip)
    assert_eq!(t.stop_loss, 90.0);
    // Risk 7, reward ratio 3.7: TP = 97 + 25.9
    assert!((t.take_profit - 122.9).abs() < 1e-9);
    // quantity = notional x leverage / entry = 100 * 50 / 97
    assert!((t.quantity - 5000.0 / 97.0).abs() < 1e-12);
    assert!((t.notional_value - 5000.0).abs() < 1e-9);
    assert_eq!(t.leverage, 50);
}

#[test]
fn take_profit_exit_with_maker_fee_and_balance_identity() {
    // Scenario C on the same path: TP exit, maker fee on the way out.
    let mut candles = long_rule_1_path();
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);

    let t = &result.trades[0];
    assert_eq!(t.exit_reason, ExitReason::TakeProfit);
    assert!((t.exit_price - 122.9).abs() < 1e-9);

    // pnl = 25.9 * 5000/97; entry fee 0.075% and exit fee 0.02% of 5000
    let expected_pnl = 25.9 * 5000.0 / 97.0;
    assert!((t.pnl - expected_pnl).abs() < 1e-9);
    assert!((t.fees - 4.75).abs() < 1e-9);
    assert!((t.net_pnl - (expected_pnl - 4.75)).abs() < 1e-9);

    // Balance identity: final = initial + sum of net PnL
    let net_sum: f64 = result.trades.iter().map(|t| t.net_pnl).sum();
    assert!((result.final_balance - (10_000.0 + net_sum)).abs() < 1e-9);
}

#[test]
fn entry_context_snapshot() {
    let mut candles = long_rule_1_path();
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);

    let ctx = &result.trades[0].context;
    assert_eq!(ctx.entry_hour, 12);
    assert_eq!(ctx.entry_day_of_week, 2); // Tuesday
    assert_eq!(ctx.entry_month, 1);
    assert_eq!(ctx.entry_price, 97.0);
    assert!(ctx.bullish_candle);
    assert!((ctx.volume_ratio - 1.0).abs() < 1e-12);
    // First trade of the run
    assert_eq!(ctx.hours_since_last_trade, -1.0);
    assert_eq!(ctx.consecutive_wins, 0);
    // Stop 90 vs entry 97: distance just over 7.2%
    assert!((ctx.stop_loss_distance_percent - 700.0 / 97.0).abs() < 1e-9);
}

#[test]
fn max_holding_time_closes_at_bar_close() {
    // Scenario D: brackets never hit; the clock forces the exit.
    let cfg = StrategyConfig {
        enable_max_holding_time: true,
        max_holding_time_hours: 1,
        ..fast_config()
    };
    let mut candles = long_rule_1_path();
    // Quiet bars far from both brackets; entry is at bar 11, so the first
    // bar strictly past one hour of holding is bar 72.
    for i in 12..=75 {
        candles.push(bar(i, 97.0, 97.3, 96.8, 97.0));
    }

    let mut engine = BacktestEngine::new(&cfg).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);

    assert_eq!(result.trades.len(), 1);
    let t = &result.trades[0];
    assert_eq!(t.exit_reason, ExitReason::MaxHoldingTime);
    assert_eq!(t.exit_time, START_MS + 72 * MINUTE_MS);
    assert_eq!(t.exit_price, 97.0);
    // Flat exit: all loss is fees, taker on both legs
    assert!((t.pnl - 0.0).abs() < 1e-9);
    assert!((t.net_pnl + 7.5).abs() < 1e-9);
}

#[test]
fn disabled_rules_produce_no_trades() {
    let mut candles = long_rule_1_path();
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let cfg = StrategyConfig {
        long_rules_enabled: [false; 8],
        ..fast_config()
    };
    let mut engine = BacktestEngine::new(&cfg).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);
    assert!(result.trades.is_empty());
    assert_eq!(result.final_balance, 10_000.0);
}

#[test]
fn open_position_at_end_of_data_is_dropped() {
    // Stop at bar 11's entry; no exit bar follows.
    let candles = long_rule_1_path();
    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);
    assert!(result.trades.is_empty());
    // Fees settle at close, so the balance is untouched
    assert_eq!(result.final_balance, 10_000.0);
    // The position itself was opened
    assert!(engine.position().is_some());
}

#[test]
fn replay_is_bit_identical() {
    let mut candles = long_rule_1_path();
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let first = engine.run("BTCUSDT", &candles, 10_000.0);
    let second = engine.run("BTCUSDT", &candles, 10_000.0);
    assert_eq!(first, second);
}

#[test]
fn empty_input_is_a_flat_run() {
    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let result = engine.run("BTCUSDT", &[], 10_000.0);
    assert!(result.trades.is_empty());
    assert!(result.equity_curve.is_empty());
    assert_eq!(result.final_balance, 10_000.0);
}

#[test]
fn equity_curve_samples_first_and_last_bar() {
    let mut candles = long_rule_1_path();
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let mut engine = BacktestEngine::new(&fast_config()).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);
    // 13 bars: one stride sample at bar 0, plus the final bar
    assert_eq!(result.equity_curve.len(), 2);
    assert_eq!(result.equity_curve[0].balance, 10_000.0);
    assert_eq!(result.equity_curve[1].timestamp, START_MS + 12 * MINUTE_MS);
    assert!((result.equity_curve[1].balance - result.final_balance).abs() < 1e-12);
}

#[test]
fn blocked_day_suppresses_the_signal() {
    let mut candles = long_rule_1_path();
    candles.push(bar(12, 96.5, 123.0, 95.5, 96.0));

    let cfg = StrategyConfig {
        blocked_days: [2].into_iter().collect(), // Tuesday
        ..fast_config()
    };
    let mut engine = BacktestEngine::new(&cfg).unwrap();
    let result = engine.run("BTCUSDT", &candles, 10_000.0);
    assert!(result.trades.is_empty());
}
