//! Trade — a completed round trip with full entry/exit/fee detail.

use super::context::TradeContext;
use super::position::Direction;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    MaxHoldingTime,
}

/// A closed trade. Appended to the run's trade list in close order and never
/// mutated afterwards. Carries the [`TradeContext`] snapshot captured at
/// entry for downstream analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Per-run identifier, starting at 1.
    pub id: u32,
    pub symbol: String,
    pub direction: Direction,

    // ── Entry ──
    pub entry_time: i64,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,

    // ── Exit ──
    pub exit_time: i64,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── PnL ──
    pub pnl: f64,
    pub pnl_percent: f64,
    /// Entry fee plus exit fee.
    pub fees: f64,
    pub net_pnl: f64,

    pub rule_number: u8,
    pub leverage: u32,
    pub notional_value: f64,

    /// Market state at entry; ownership passes to the trade on close.
    pub context: TradeContext,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }

    /// R-multiple: realized price move relative to the risked distance,
    /// signed by whether the trade went the intended way.
    pub fn r_multiple(&self) -> f64 {
        let risk = (self.entry_price - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        let reward = (self.exit_price - self.entry_price).abs() / risk;
        let won = match self.direction {
            Direction::Long => self.exit_price > self.entry_price,
            Direction::Short => self.exit_price < self.entry_price,
        };
        if won {
            reward
        } else {
            -reward
        }
    }

    /// Holding time in hours.
    pub fn hold_time_hours(&self) -> f64 {
        (self.exit_time - self.entry_time) as f64 / 3_600_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade {
            id: 1,
            symbol: "BTCUSDT".into(),
            direction: Direction::Long,
            entry_time: 0,
            entry_price: 100.0,
            quantity: 50.0,
            stop_loss: 95.0,
            take_profit: 118.5,
            exit_time: 7_200_000,
            exit_price: 118.5,
            exit_reason: ExitReason::TakeProfit,
            pnl: 925.0,
            pnl_percent: 18.5,
            fees: 4.75,
            net_pnl: 920.25,
            rule_number: 1,
            leverage: 50,
            notional_value: 5000.0,
            context: TradeContext::default(),
        }
    }

    #[test]
    fn winner_detection() {
        assert!(sample_trade().is_winner());
        let loser = Trade {
            net_pnl: -10.0,
            ..sample_trade()
        };
        assert!(!loser.is_winner());
    }

    #[test]
    fn r_multiple_long_win() {
        // Risk 5, move +18.5 → R = 3.7
        let t = sample_trade();
        assert!((t.r_multiple() - 3.7).abs() < 1e-12);
    }

    #[test]
    fn r_multiple_long_loss() {
        let t = Trade {
            exit_price: 95.0,
            exit_reason: ExitReason::StopLoss,
            ..sample_trade()
        };
        assert!((t.r_multiple() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn hold_time_in_hours() {
        assert!((sample_trade().hold_time_hours() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let t = sample_trade();
        let json = serde_json::to_string(&t).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(t, deser);
    }
}
