//! Performance metrics — pure functions over the trade list and equity curve.
//!
//! Every metric is a pure function: trades and/or equity points in, scalar
//! out. No dependency on the runner or the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vegaslab_core::domain::{EquityPoint, Trade};

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub net_profit: f64,
    /// Net profit over the initial balance, in percent.
    pub net_profit_percent: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    /// Deepest peak-to-trough equity decline, in percent of the peak.
    pub max_drawdown_percent: f64,
    /// Annualized Sharpe ratio over per-trade returns.
    pub sharpe: f64,
    pub total_fees: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_hold_time_hours: f64,
    /// Net PnL per calendar month of entry, keyed "YYYY-MM" in order.
    pub monthly_returns: BTreeMap<String, f64>,
}

impl PerformanceMetrics {
    pub fn compute(trades: &[Trade], equity_curve: &[EquityPoint], initial_balance: f64) -> Self {
        let net_profit: f64 = trades.iter().map(|t| t.net_pnl).sum();
        let winners: Vec<&Trade> = trades.iter().filter(|t| t.is_winner()).collect();
        let losers: Vec<&Trade> = trades.iter().filter(|t| !t.is_winner()).collect();

        Self {
            net_profit,
            net_profit_percent: if initial_balance > 0.0 {
                net_profit / initial_balance * 100.0
            } else {
                0.0
            },
            total_trades: trades.len(),
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            win_rate: win_rate(trades),
            avg_win: mean(winners.iter().map(|t| t.net_pnl)),
            avg_loss: mean(losers.iter().map(|t| t.net_pnl)),
            profit_factor: profit_factor(trades),
            max_drawdown_percent: max_drawdown_percent(equity_curve),
            sharpe: sharpe_ratio(trades, initial_balance),
            total_fees: trades.iter().map(|t| t.fees).sum(),
            max_consecutive_wins: longest_streak(trades, true),
            max_consecutive_losses: longest_streak(trades, false),
            avg_hold_time_hours: mean(trades.iter().map(Trade::hold_time_hours)),
            monthly_returns: monthly_returns(trades),
        }
    }
}

/// Fraction of trades with positive net PnL; 0 with no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Gross wins over gross losses. Infinity when there are wins but no
/// losses; 0 with no wins.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_win: f64 = trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| -t.net_pnl)
        .sum();
    if gross_loss > 0.0 {
        gross_win / gross_loss
    } else if gross_win > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Deepest decline from a running equity peak, in percent of that peak.
pub fn max_drawdown_percent(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for point in equity_curve {
        peak = peak.max(point.balance);
        if peak > 0.0 {
            worst = worst.max((peak - point.balance) / peak * 100.0);
        }
    }
    worst
}

/// Annualized Sharpe over per-trade returns (net PnL relative to the
/// initial balance), population standard deviation, sqrt(252) scaling.
/// 0 with fewer than two trades or zero variance.
pub fn sharpe_ratio(trades: &[Trade], initial_balance: f64) -> f64 {
    if trades.len() < 2 || initial_balance <= 0.0 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.net_pnl / initial_balance).collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / returns.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return 0.0;
    }
    mean / std_dev * 252.0f64.sqrt()
}

/// Longest run of consecutive winners (or losers) in close order.
pub fn longest_streak(trades: &[Trade], wins: bool) -> usize {
    let mut best = 0usize;
    let mut current = 0usize;
    for trade in trades {
        if trade.is_winner() == wins {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Net PnL summed per "YYYY-MM" month of entry. The BTreeMap keeps months
/// chronologically ordered, so output is deterministic.
pub fn monthly_returns(trades: &[Trade]) -> BTreeMap<String, f64> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        if let Some(dt) = chrono::DateTime::from_timestamp_millis(trade.entry_time) {
            let key = dt.format("%Y-%m").to_string();
            *months.entry(key).or_insert(0.0) += trade.net_pnl;
        }
    }
    months
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    collected.iter().sum::<f64>() / collected.len() as f64
}
