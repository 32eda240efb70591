//! Exposure table and chain-level metadata.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::row::StrikeExposureRow;

/// Chain-level metadata captured alongside the exposure table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub symbol: String,
    pub spot_price: f64,
    /// Cost-of-carry forward, spot * e^(rT).
    pub forward_price: f64,
    pub expiry: String,
    pub days_to_expiry: i64,
    pub atm_strike: f64,
    pub atm_call_premium: f64,
    pub atm_put_premium: f64,
    pub atm_straddle: f64,
    pub expiry_list: Vec<String>,
    pub timestamp: NaiveDateTime,
    /// Days to expiry after a time projection; `None` for a live table.
    #[serde(default)]
    pub projected_days_to_expiry: Option<f64>,
}

impl ChainSnapshot {
    /// Days to expiry the table's exposures currently reflect.
    pub fn effective_days_to_expiry(&self) -> f64 {
        self.projected_days_to_expiry
            .unwrap_or(self.days_to_expiry as f64)
    }
}

/// Sorted, strike-unique exposure rows plus their chain metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureTable {
    pub meta: ChainSnapshot,
    rows: Vec<StrikeExposureRow>,
}

impl ExposureTable {
    /// Build a table: sort and dedup by strike, then normalize hedging pressure.
    pub fn new(meta: ChainSnapshot, rows: Vec<StrikeExposureRow>) -> Self {
        let mut rows = sorted_unique(rows);
        apply_hedging_pressure(&mut rows);
        Self { meta, rows }
    }

    /// Build from rows that already carry their hedging pressure.
    ///
    /// Rows are still sorted and deduplicated.
    pub fn from_scaled_rows(meta: ChainSnapshot, rows: Vec<StrikeExposureRow>) -> Self {
        Self {
            meta,
            rows: sorted_unique(rows),
        }
    }

    pub fn rows(&self) -> &[StrikeExposureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn strikes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strike).collect()
    }

    pub fn row_at_strike(&self, strike: f64) -> Option<&StrikeExposureRow> {
        self.rows.iter().find(|r| r.strike == strike)
    }

    /// Largest |Net GEX| across the table.
    pub fn max_abs_net_gex(&self) -> f64 {
        max_abs_net_gex(&self.rows)
    }
}

/// Sort ascending by strike and keep the first row seen for each strike.
///
/// The sort is stable, so "first" refers to input order.
pub fn sorted_unique(rows: impl IntoIterator<Item = StrikeExposureRow>) -> Vec<StrikeExposureRow> {
    let mut rows: Vec<StrikeExposureRow> = rows.into_iter().collect();
    rows.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    rows.dedup_by(|later, earlier| later.strike == earlier.strike);
    rows
}

fn max_abs_net_gex(rows: &[StrikeExposureRow]) -> f64 {
    rows.iter()
        .map(|r| r.net_gex.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

/// Hedging pressure = Net GEX / max |Net GEX| * 100, or 0 everywhere when
/// there is no exposure at all.
fn apply_hedging_pressure(rows: &mut [StrikeExposureRow]) {
    let max_gex = max_abs_net_gex(rows);
    for row in rows.iter_mut() {
        row.hedging_pressure = if max_gex > 0.0 {
            (row.net_gex / max_gex * 100.0).clamp(-100.0, 100.0)
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(strike: f64, net_gex: f64) -> StrikeExposureRow {
        StrikeExposureRow {
            strike,
            net_gex,
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_sorted_and_unique() {
        let table = ExposureTable::new(
            ChainSnapshot::default(),
            vec![row(110.0, 1.0), row(100.0, 2.0), row(110.0, 3.0), row(105.0, 4.0)],
        );

        assert_eq!(table.strikes(), vec![100.0, 105.0, 110.0]);
        assert_eq!(table.row_at_strike(110.0).unwrap().net_gex, 1.0);
    }

    #[test]
    fn test_hedging_pressure_normalization() {
        let table = ExposureTable::new(
            ChainSnapshot::default(),
            vec![row(100.0, -4.0), row(105.0, 2.0), row(110.0, 1.0)],
        );
        let pressure: Vec<f64> = table.rows().iter().map(|r| r.hedging_pressure).collect();

        assert_eq!(pressure, vec![-100.0, 50.0, 25.0]);
        assert_eq!(table.max_abs_net_gex(), 4.0);
    }

    #[test]
    fn test_hedging_pressure_zero_without_exposure() {
        let table = ExposureTable::new(
            ChainSnapshot::default(),
            vec![row(100.0, 0.0), row(105.0, 0.0)],
        );
        assert!(table.rows().iter().all(|r| r.hedging_pressure == 0.0));
    }

    proptest! {
        #[test]
        fn prop_rows_strictly_ascending(
            strikes in prop::collection::vec(1u32..500, 0..60),
        ) {
            let rows = strikes.iter().map(|&k| row(f64::from(k) * 50.0, 1.0)).collect();
            let table = ExposureTable::new(ChainSnapshot::default(), rows);
            for pair in table.rows().windows(2) {
                prop_assert!(pair[0].strike < pair[1].strike);
            }
        }

        #[test]
        fn prop_hedging_pressure_bounded(
            gex in prop::collection::vec(-1e6f64..1e6, 1..60),
        ) {
            let rows = gex
                .iter()
                .enumerate()
                .map(|(i, &g)| row(100.0 + i as f64, g))
                .collect();
            let table = ExposureTable::new(ChainSnapshot::default(), rows);
            for r in table.rows() {
                prop_assert!((-100.0..=100.0).contains(&r.hedging_pressure));
            }
        }
    }
}
