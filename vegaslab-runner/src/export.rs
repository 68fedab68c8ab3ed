//! Result export — JSON round-trip with schema versioning, plus CSV tapes
//! for external analysis tools.

use anyhow::{bail, Context, Result};
use vegaslab_core::domain::{EquityPoint, Trade};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema
/// versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: id, symbol, direction, rule, entry_time, entry_price, quantity,
/// stop_loss, take_profit, exit_time, exit_price, exit_reason, pnl, fees,
/// net_pnl, leverage, notional_value
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "symbol",
        "direction",
        "rule",
        "entry_time",
        "entry_price",
        "quantity",
        "stop_loss",
        "take_profit",
        "exit_time",
        "exit_price",
        "exit_reason",
        "pnl",
        "fees",
        "net_pnl",
        "leverage",
        "notional_value",
    ])
    .context("failed to write trades CSV header")?;

    for t in trades {
        wtr.write_record([
            t.id.to_string(),
            t.symbol.clone(),
            format!("{:?}", t.direction),
            t.rule_number.to_string(),
            t.entry_time.to_string(),
            t.entry_price.to_string(),
            t.quantity.to_string(),
            t.stop_loss.to_string(),
            t.take_profit.to_string(),
            t.exit_time.to_string(),
            t.exit_price.to_string(),
            format!("{:?}", t.exit_reason),
            t.pnl.to_string(),
            t.fees.to_string(),
            t.net_pnl.to_string(),
            t.leverage.to_string(),
            t.notional_value.to_string(),
        ])
        .context("failed to write trade row")?;
    }

    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV was not valid UTF-8")
}

/// Export the equity curve as CSV with `timestamp,balance` rows.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "balance"])
        .context("failed to write equity CSV header")?;
    for point in equity_curve {
        wtr.write_record([point.timestamp.to_string(), point.balance.to_string()])
            .context("failed to write equity row")?;
    }
    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV was not valid UTF-8")
}
