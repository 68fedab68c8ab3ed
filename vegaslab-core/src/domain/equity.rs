//! Equity curve sample point.

use serde::{Deserialize, Serialize};

/// Account balance at a point in time. Sampled at a fixed bar stride plus
/// unconditionally at the final bar of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equity_point_roundtrip() {
        let p = EquityPoint {
            timestamp: 1_700_000_000_000,
            balance: 10_250.5,
        };
        let json = serde_json::to_string(&p).unwrap();
        let deser: EquityPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, deser);
    }
}
