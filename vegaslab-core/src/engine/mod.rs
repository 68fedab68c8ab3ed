//! Backtest engine: FLAT/OPEN trade lifecycle over an ordered candle
//! sequence.
//!
//! One engine instance owns all mutable run state. `run` resets everything
//! first, so replaying the same candles always reproduces a bit-identical
//! trade list. Exits are checked before entries on every bar, take-profit
//! before stop-loss, and the long side before the short side; at most one
//! position is open at any time.

use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{Candle, Direction, EquityPoint, ExitReason, Position, Trade, TradeContext};
use crate::risk;
use crate::strategy::filters::candle_datetime;
use crate::strategy::VegasStrategy;
use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

/// Bars between equity-curve samples; the final bar is always sampled.
pub const EQUITY_SAMPLE_STRIDE: usize = 1000;

/// ATR lookback recorded in the entry snapshot.
const CONTEXT_ATR_PERIOD: usize = 14;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Output of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub symbol: String,
    /// Timestamp of the first candle, 0 for an empty input.
    pub start_time: i64,
    /// Timestamp of the last candle, 0 for an empty input.
    pub end_time: i64,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Bar-by-bar backtest engine.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    cfg: StrategyConfig,
    strategy: VegasStrategy,

    symbol: String,
    balance: f64,
    position: Option<Position>,
    /// Entry snapshot for the open position, moved into the trade on close.
    position_context: Option<TradeContext>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,

    next_trade_id: u32,
    consecutive_wins: u32,
    consecutive_losses: u32,
    last_trade_close_time: Option<i64>,
}

impl BacktestEngine {
    /// Construct an engine, failing fast on a malformed configuration.
    pub fn new(cfg: &StrategyConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            strategy: VegasStrategy::new(cfg),
            cfg: cfg.clone(),
            symbol: String::new(),
            balance: 0.0,
            position: None,
            position_context: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            next_trade_id: 1,
            consecutive_wins: 0,
            consecutive_losses: 0,
            last_trade_close_time: None,
        })
    }

    /// Run a full backtest. All state is reset first, so repeated calls with
    /// identical inputs produce identical results.
    pub fn run(&mut self, symbol: &str, candles: &[Candle], initial_balance: f64) -> RunResult {
        self.reset(initial_balance);
        self.symbol = symbol.to_owned();

        let last = candles.len().saturating_sub(1);
        for (i, candle) in candles.iter().enumerate() {
            self.strategy.update(candle);

            if self.position.is_some() {
                self.check_exit(candle);
            }
            // A close above frees the slot for a same-bar re-entry.
            if self.position.is_none() && self.strategy.is_ready() {
                self.check_entry(candle);
            }

            if i % EQUITY_SAMPLE_STRIDE == 0 || i == last {
                self.equity_curve.push(EquityPoint {
                    timestamp: candle.timestamp,
                    balance: self.balance,
                });
            }
        }

        // A position still open at the end of data is dropped, not counted.
        RunResult {
            symbol: symbol.to_owned(),
            start_time: candles.first().map_or(0, |c| c.timestamp),
            end_time: candles.last().map_or(0, |c| c.timestamp),
            initial_balance,
            final_balance: self.balance,
            trades: std::mem::take(&mut self.trades),
            equity_curve: std::mem::take(&mut self.equity_curve),
        }
    }

    /// Clear all per-run state.
    pub fn reset(&mut self, initial_balance: f64) {
        self.strategy.reset();
        self.balance = initial_balance;
        self.position = None;
        self.position_context = None;
        self.trades.clear();
        self.equity_curve.clear();
        self.next_trade_id = 1;
        self.consecutive_wins = 0;
        self.consecutive_losses = 0;
        self.last_trade_close_time = None;
    }

    fn check_exit(&mut self, candle: &Candle) {
        let position = match &self.position {
            Some(p) => p,
            None => return,
        };

        // Take-profit wins when both brackets fall inside one bar.
        if position.take_profit_hit(candle.low, candle.high) {
            let price = position.take_profit;
            self.close_position(candle.timestamp, price, ExitReason::TakeProfit);
            return;
        }
        if position.stop_loss_hit(candle.low, candle.high) {
            let price = position.stop_loss;
            self.close_position(candle.timestamp, price, ExitReason::StopLoss);
            return;
        }
        if self.cfg.enable_max_holding_time {
            let held_hours = (candle.timestamp - position.entry_time) as f64 / MS_PER_HOUR;
            if held_hours > self.cfg.max_holding_time_hours as f64 {
                self.close_position(candle.timestamp, candle.close, ExitReason::MaxHoldingTime);
            }
        }
    }

    fn check_entry(&mut self, candle: &Candle) {
        if let Some(rule) = self.strategy.check_long_entry(candle) {
            self.open_position(Direction::Long, rule, candle);
        } else if let Some(rule) = self.strategy.check_short_entry(candle) {
            self.open_position(Direction::Short, rule, candle);
        }
    }

    fn open_position(&mut self, direction: Direction, rule_number: u8, candle: &Candle) {
        let entry_price = candle.close;
        let stop_loss = match direction {
            Direction::Long => self.strategy.lowest_low(self.cfg.stop_lookback),
            Direction::Short => self.strategy.highest_high(self.cfg.stop_lookback),
        };

        // Zero or inverted risk (stop at/through the entry) yields no trade.
        let bracket = match risk::size_position(
            &self.cfg,
            direction,
            entry_price,
            stop_loss,
            self.strategy.regime(),
            self.strategy.adx_value(),
        ) {
            Some(b) => b,
            None => return,
        };

        let entry_fee = bracket.notional_value * self.cfg.taker_fee_percent / 100.0;

        self.position_context = Some(self.build_context(candle, entry_price, &bracket));
        self.position = Some(Position {
            direction,
            entry_time: candle.timestamp,
            entry_price,
            quantity: bracket.quantity,
            stop_loss: bracket.stop_loss,
            take_profit: bracket.take_profit,
            rule_number,
            entry_fee,
            leverage: bracket.leverage,
            notional_value: bracket.notional_value,
        });
    }

    fn build_context(&self, candle: &Candle, entry_price: f64, bracket: &risk::Bracket) -> TradeContext {
        let (entry_hour, entry_day_of_week, entry_month) = match candle_datetime(candle.timestamp)
        {
            Some(dt) => (dt.hour(), dt.weekday().number_from_monday(), dt.month()),
            None => (0, 0, 0),
        };

        let ema12 = self.strategy.ema12();
        let ema144 = self.strategy.ema144();
        let ema169 = self.strategy.ema169();

        let avg_volume = self.strategy.average_volume(self.cfg.volume_avg_period);
        let volume_ratio = if avg_volume > 0.0 {
            candle.volume / avg_volume
        } else {
            1.0
        };

        let atr = self.strategy.average_true_range(CONTEXT_ATR_PERIOD);
        let range = candle.range();

        TradeContext {
            entry_hour,
            entry_day_of_week,
            entry_month,
            adx: self.strategy.adx_value(),
            ema12,
            ema144,
            ema169,
            ema576: self.strategy.ema576(),
            ema676: self.strategy.ema676(),
            entry_price,
            entry_volume: candle.volume,
            avg_volume,
            volume_ratio,
            stop_loss_distance_percent: percent_of(
                (entry_price - bracket.stop_loss).abs(),
                entry_price,
            ),
            take_profit_distance_percent: percent_of(
                (bracket.take_profit - entry_price).abs(),
                entry_price,
            ),
            atr,
            atr_percent: percent_of(atr, entry_price),
            recent_range: range,
            distance_from_ema12_percent: percent_of(candle.close - ema12, ema12),
            distance_from_ema144_percent: percent_of(candle.close - ema144, ema144),
            ema144_to_169_distance_percent: percent_of(ema144 - ema169, ema169),
            golden_cross: ema144 > ema169,
            death_cross: ema144 < ema169,
            bullish_candle: candle.is_bullish(),
            candle_body_percent: percent_of(candle.body(), range),
            upper_wick_percent: percent_of(candle.upper_wick(), range),
            lower_wick_percent: percent_of(candle.lower_wick(), range),
            consecutive_wins: self.consecutive_wins,
            consecutive_losses: self.consecutive_losses,
            hours_since_last_trade: self
                .last_trade_close_time
                .map_or(-1.0, |t| (candle.timestamp - t) as f64 / MS_PER_HOUR),
        }
    }

    fn close_position(&mut self, exit_time: i64, exit_price: f64, exit_reason: ExitReason) {
        let position = match self.position.take() {
            Some(p) => p,
            None => return,
        };
        let context = self.position_context.take().unwrap_or_default();

        let pnl = position.unrealized_pnl(exit_price);
        let exit_fee_rate = match exit_reason {
            ExitReason::TakeProfit => self.cfg.maker_fee_percent,
            ExitReason::StopLoss | ExitReason::MaxHoldingTime => self.cfg.taker_fee_percent,
        };
        let exit_fee = position.notional_value * exit_fee_rate / 100.0;
        let fees = position.entry_fee + exit_fee;
        let net_pnl = pnl - fees;
        let pnl_percent = percent_of(pnl, position.notional_value);

        self.balance += net_pnl;
        if net_pnl > 0.0 {
            self.consecutive_wins += 1;
            self.consecutive_losses = 0;
        } else {
            self.consecutive_losses += 1;
            self.consecutive_wins = 0;
        }
        self.last_trade_close_time = Some(exit_time);

        self.trades.push(Trade {
            id: self.next_trade_id,
            symbol: self.symbol.clone(),
            direction: position.direction,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            quantity: position.quantity,
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
            exit_time,
            exit_price,
            exit_reason,
            pnl,
            pnl_percent,
            fees,
            net_pnl,
            rule_number: position.rule_number,
            leverage: position.leverage,
            notional_value: position.notional_value,
            context,
        });
        self.next_trade_id += 1;
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }
}

fn percent_of(value: f64, base: f64) -> f64 {
    if base != 0.0 {
        value / base * 100.0
    } else {
        0.0
    }
}
