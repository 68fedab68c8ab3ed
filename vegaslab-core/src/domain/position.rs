//! Position — the single open position owned by the engine.

use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

/// An open position. At most one exists per run; the engine owns it
/// exclusively and converts it into a [`super::Trade`] on exit.
///
/// Bracket invariant: for `Long`, `stop_loss < entry_price < take_profit`;
/// for `Short`, the reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_time: i64,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Rule number (1-8) that triggered the entry.
    pub rule_number: u8,
    /// Taker fee charged at open, settled at close.
    pub entry_fee: f64,
    pub leverage: u32,
    pub notional_value: f64,
}

impl Position {
    /// Whether the bar's extremes reached the stop-loss level.
    pub fn stop_loss_hit(&self, bar_low: f64, bar_high: f64) -> bool {
        match self.direction {
            Direction::Long => bar_low <= self.stop_loss,
            Direction::Short => bar_high >= self.stop_loss,
        }
    }

    /// Whether the bar's extremes reached the take-profit level.
    pub fn take_profit_hit(&self, bar_low: f64, bar_high: f64) -> bool {
        match self.direction {
            Direction::Long => bar_high >= self.take_profit,
            Direction::Short => bar_low <= self.take_profit,
        }
    }

    /// Unrealized PnL at the given price.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => (price - self.entry_price) * self.quantity,
            Direction::Short => (self.entry_price - price) * self.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_position() -> Position {
        Position {
            direction: Direction::Long,
            entry_time: 0,
            entry_price: 100.0,
            quantity: 50.0,
            stop_loss: 95.0,
            take_profit: 118.5,
            rule_number: 1,
            entry_fee: 3.75,
            leverage: 50,
            notional_value: 5000.0,
        }
    }

    #[test]
    fn long_brackets() {
        let p = long_position();
        assert!(p.stop_loss_hit(94.9, 100.0));
        assert!(!p.stop_loss_hit(95.1, 100.0));
        assert!(p.take_profit_hit(100.0, 118.5));
        assert!(!p.take_profit_hit(100.0, 118.4));
    }

    #[test]
    fn short_brackets_mirror() {
        let p = Position {
            direction: Direction::Short,
            stop_loss: 105.0,
            take_profit: 81.5,
            ..long_position()
        };
        assert!(p.stop_loss_hit(100.0, 105.0));
        assert!(!p.stop_loss_hit(100.0, 104.9));
        assert!(p.take_profit_hit(81.5, 100.0));
        assert!(!p.take_profit_hit(81.6, 100.0));
    }

    #[test]
    fn unrealized_pnl_by_direction() {
        let long = long_position();
        assert_eq!(long.unrealized_pnl(102.0), 100.0);
        let short = Position {
            direction: Direction::Short,
            ..long_position()
        };
        assert_eq!(short.unrealized_pnl(102.0), -100.0);
    }
}
