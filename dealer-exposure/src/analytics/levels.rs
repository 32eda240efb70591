//! Key strike levels and ATM straddle levels.

use serde::{Deserialize, Serialize};

use crate::exposure::{sorted_unique, ChainSnapshot, StrikeExposureRow};

/// Default number of points on a straddle payoff curve.
pub const DEFAULT_PAYOFF_POINTS: usize = 100;

/// Open-interest and GEX extremes across the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    /// Strike with the largest call OI. Not a sum-of-ITM-value max pain.
    pub max_pain: f64,
    pub highest_call_oi: f64,
    pub highest_put_oi: f64,
    pub max_positive_gex: f64,
    pub max_negative_gex: f64,
    pub total_call_oi: i64,
    pub total_put_oi: i64,
    /// Total put OI / total call OI; 1 when there is no call OI.
    pub pcr: f64,
}

impl KeyLevels {
    /// Returns `None` for an empty row set.
    ///
    /// Ties resolve to the lowest strike.
    pub fn compute(rows: &[StrikeExposureRow]) -> Option<Self> {
        let rows = sorted_unique(rows.iter().cloned());
        if rows.is_empty() {
            return None;
        }

        let highest_call_oi = extreme_strike(&rows, |r| r.call_oi as f64, true);
        let total_call_oi = rows.iter().fold(0i64, |acc, r| acc.saturating_add(r.call_oi));
        let total_put_oi = rows.iter().fold(0i64, |acc, r| acc.saturating_add(r.put_oi));
        let pcr = if total_call_oi > 0 {
            total_put_oi as f64 / total_call_oi as f64
        } else {
            1.0
        };

        Some(Self {
            max_pain: highest_call_oi,
            highest_call_oi,
            highest_put_oi: extreme_strike(&rows, |r| r.put_oi as f64, true),
            max_positive_gex: extreme_strike(&rows, |r| r.net_gex, true),
            max_negative_gex: extreme_strike(&rows, |r| r.net_gex, false),
            total_call_oi,
            total_put_oi,
            pcr,
        })
    }
}

/// Strike of the first row with the largest (or smallest) key.
fn extreme_strike(rows: &[StrikeExposureRow], key: impl Fn(&StrikeExposureRow) -> f64, largest: bool) -> f64 {
    let mut best = &rows[0];
    for row in &rows[1..] {
        let better = if largest {
            key(row) > key(best)
        } else {
            key(row) < key(best)
        };
        if better {
            best = row;
        }
    }
    best.strike
}

/// One sampled point of the ATM straddle payoff at expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub call_pnl: f64,
    pub put_pnl: f64,
    pub straddle_pnl: f64,
}

/// Long ATM straddle: breakevens and expiry payoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraddleLevels {
    pub atm_strike: f64,
    pub call_premium: f64,
    pub put_premium: f64,
    pub premium: f64,
    pub upper_breakeven: f64,
    pub lower_breakeven: f64,
}

impl StraddleLevels {
    pub fn from_snapshot(meta: &ChainSnapshot) -> Self {
        Self {
            atm_strike: meta.atm_strike,
            call_premium: meta.atm_call_premium,
            put_premium: meta.atm_put_premium,
            premium: meta.atm_straddle,
            upper_breakeven: meta.atm_strike + meta.atm_straddle,
            lower_breakeven: meta.atm_strike - meta.atm_straddle,
        }
    }

    pub fn payoff_at(&self, price: f64) -> PayoffPoint {
        let call_pnl = (price - self.atm_strike).max(0.0) - self.call_premium;
        let put_pnl = (self.atm_strike - price).max(0.0) - self.put_premium;
        PayoffPoint {
            price,
            call_pnl,
            put_pnl,
            straddle_pnl: call_pnl + put_pnl,
        }
    }

    /// `points` evenly spaced prices over [0.9, 1.1] x ATM, endpoints included.
    pub fn payoff_curve(&self, points: usize) -> Vec<PayoffPoint> {
        let low = self.atm_strike * 0.9;
        let high = self.atm_strike * 1.1;
        match points {
            0 => Vec::new(),
            1 => vec![self.payoff_at(low)],
            n => {
                let step = (high - low) / (n - 1) as f64;
                (0..n).map(|i| self.payoff_at(low + step * i as f64)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(strike: f64, call_oi: i64, put_oi: i64, net_gex: f64) -> StrikeExposureRow {
        StrikeExposureRow {
            strike,
            call_oi,
            put_oi,
            net_gex,
            ..Default::default()
        }
    }

    #[test]
    fn test_key_levels() {
        let rows = vec![
            row(110.0, 500, 100, -2.0),
            row(100.0, 200, 900, 3.0),
            row(105.0, 300, 400, 1.0),
        ];
        let levels = KeyLevels::compute(&rows).unwrap();

        assert_eq!(levels.max_pain, 110.0);
        assert_eq!(levels.highest_call_oi, 110.0);
        assert_eq!(levels.highest_put_oi, 100.0);
        assert_eq!(levels.max_positive_gex, 100.0);
        assert_eq!(levels.max_negative_gex, 110.0);
        assert_eq!(levels.total_call_oi, 1000);
        assert_eq!(levels.total_put_oi, 1400);
        assert_relative_eq!(levels.pcr, 1.4);
    }

    #[test]
    fn test_pcr_without_call_oi() {
        let levels = KeyLevels::compute(&[row(100.0, 0, 50, 0.0)]).unwrap();
        assert_eq!(levels.pcr, 1.0);
    }

    #[test]
    fn test_ties_resolve_to_lowest_strike() {
        let rows = vec![row(105.0, 100, 100, 1.0), row(100.0, 100, 100, 1.0)];
        let levels = KeyLevels::compute(&rows).unwrap();

        assert_eq!(levels.highest_call_oi, 100.0);
        assert_eq!(levels.highest_put_oi, 100.0);
        assert_eq!(levels.max_positive_gex, 100.0);
        assert_eq!(levels.max_negative_gex, 100.0);
    }

    #[test]
    fn test_oi_totals_saturate() {
        let rows = vec![row(100.0, i64::MAX, i64::MAX, 0.0), row(105.0, 10, 10, 0.0)];
        let levels = KeyLevels::compute(&rows).unwrap();

        assert_eq!(levels.total_call_oi, i64::MAX);
        assert_eq!(levels.total_put_oi, i64::MAX);
        assert_eq!(levels.pcr, 1.0);
    }

    #[test]
    fn test_empty_rows() {
        assert!(KeyLevels::compute(&[]).is_none());
    }

    fn straddle() -> StraddleLevels {
        StraddleLevels::from_snapshot(&ChainSnapshot {
            atm_strike: 100.0,
            atm_call_premium: 3.0,
            atm_put_premium: 2.0,
            atm_straddle: 5.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_straddle_breakevens() {
        let levels = straddle();
        assert_eq!(levels.upper_breakeven, 105.0);
        assert_eq!(levels.lower_breakeven, 95.0);
        assert_relative_eq!(levels.payoff_at(105.0).straddle_pnl, 0.0);
        assert_relative_eq!(levels.payoff_at(95.0).straddle_pnl, 0.0);
        assert_relative_eq!(levels.payoff_at(100.0).straddle_pnl, -5.0);
    }

    #[test]
    fn test_payoff_curve_span() {
        let curve = straddle().payoff_curve(DEFAULT_PAYOFF_POINTS);

        assert_eq!(curve.len(), 100);
        assert_relative_eq!(curve[0].price, 90.0, epsilon = 1e-9);
        assert_relative_eq!(curve[99].price, 110.0, epsilon = 1e-9);
        assert_relative_eq!(curve[0].call_pnl, -3.0);
        assert_relative_eq!(curve[0].put_pnl, 8.0, epsilon = 1e-9);
        assert!(straddle().payoff_curve(0).is_empty());
    }
}
