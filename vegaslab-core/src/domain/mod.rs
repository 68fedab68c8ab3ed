//! Domain types: candles, positions, trades, trade context, equity points.

pub mod candle;
pub mod context;
pub mod equity;
pub mod position;
pub mod trade;

pub use candle::Candle;
pub use context::TradeContext;
pub use equity::EquityPoint;
pub use position::{Direction, Position};
pub use trade::{ExitReason, Trade};
