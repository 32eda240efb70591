//! Exposure table analytics.
//!
//! Provides:
//! - Near-the-money flow metrics with GEX/DEX bias labels
//! - Gamma flip zone detection
//! - Key strike levels (OI extremes, GEX extremes, PCR) and straddle levels
//! - Volatility regime assessment with strategy suggestions

pub mod flip;
pub mod flow;
pub mod levels;
pub mod regime;

pub use flip::{detect_gamma_flip_zones, FlipDirection, FlipImpact, GammaFlipZone};
pub use flow::{DexBias, FlowMetrics, GexBias};
pub use levels::{KeyLevels, PayoffPoint, StraddleLevels, DEFAULT_PAYOFF_POINTS};
pub use regime::{RegimeAssessment, StrategySuggestion, VolatilityRegime};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exposure::ExposureTable;

/// Every analytic derived from one exposure table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAnalysis {
    pub flow: FlowMetrics,
    pub flip_zones: Vec<GammaFlipZone>,
    pub key_levels: KeyLevels,
    pub straddle: StraddleLevels,
    pub regime: RegimeAssessment,
}

impl ChainAnalysis {
    /// Analyze a table around its forward price.
    ///
    /// Returns `None` when the table has no rows.
    pub fn from_table(table: &ExposureTable) -> Option<Self> {
        let key_levels = KeyLevels::compute(table.rows())?;
        let flow = FlowMetrics::compute(table.rows(), table.meta.forward_price);
        let flip_zones = detect_gamma_flip_zones(table.rows());
        let regime = RegimeAssessment::from_flow(&flow);

        debug!(
            symbol = %table.meta.symbol,
            flips = flip_zones.len(),
            gex_near = flow.gex_near_total,
            "Chain analyzed"
        );

        Some(Self {
            flow,
            flip_zones,
            key_levels,
            straddle: StraddleLevels::from_snapshot(&table.meta),
            regime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawOptionChain;
    use crate::exposure::{
        ChainSnapshot, ContractSpec, ExposureAggregator, ExposureConfig, StrikeExposureRow,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 13)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    /// Five strikes around a 7-day forward of 100, equal OI and IV everywhere.
    fn symmetric_table() -> ExposureTable {
        let spot = 100.0 / (0.07 * 7.0 / 365.0_f64).exp();
        let legs = r#"{ "ce": { "oi": 1000, "implied_volatility": 20.0, "last_price": 3.0 },
                        "pe": { "oi": 1000, "implied_volatility": 20.0, "last_price": 2.0 } }"#;
        let strikes = ["90", "95", "100", "105", "110"]
            .iter()
            .map(|k| format!("\"{}\": {}", k, legs))
            .collect::<Vec<_>>()
            .join(",");
        let chain =
            RawOptionChain::from_json(&format!(r#"{{ "last_price": {}, "oc": {{ {} }} }}"#, spot, strikes))
                .unwrap();
        let aggregator = ExposureAggregator::new(
            ExposureConfig::default().with_contract("TEST", ContractSpec::new(1.0, 5.0)),
        );

        aggregator
            .aggregate("TEST", "2026-10-21", &[], &chain, now())
            .into_table()
            .unwrap()
    }

    #[test]
    fn test_symmetric_chain_end_to_end() {
        let table = symmetric_table();
        let analysis = ChainAnalysis::from_table(&table).unwrap();

        // Equal call and put OI cancel gamma exactly, so no sign divergence.
        assert!(table.rows().iter().all(|r| r.net_gex == 0.0));
        assert!(analysis.flip_zones.is_empty());
        assert_eq!(analysis.flow.gex_bias, GexBias::Neutral);

        // Net DEX per strike is OI * (2N(d1) - 1): monotonic in strike,
        // positive below the forward and negative above it.
        let dex: Vec<f64> = table.rows().iter().map(|r| r.net_dex).collect();
        for pair in dex.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert!(dex[0] > 0.0);
        assert!(dex[4] < 0.0);

        assert_eq!(analysis.key_levels.pcr, 1.0);
        assert_eq!(analysis.key_levels.max_pain, 90.0);
        assert_eq!(analysis.straddle.upper_breakeven, 105.0);
        assert_eq!(analysis.straddle.lower_breakeven, 95.0);
        assert_eq!(analysis.regime.regime, VolatilityRegime::Transitional);
    }

    #[test]
    fn test_divergent_gex_yields_flip() {
        let rows = vec![
            StrikeExposureRow {
                strike: 95.0,
                net_gex: 60.0,
                call_oi: 10,
                ..Default::default()
            },
            StrikeExposureRow {
                strike: 105.0,
                net_gex: -20.0,
                put_oi: 10,
                ..Default::default()
            },
        ];
        let meta = ChainSnapshot {
            forward_price: 100.0,
            ..Default::default()
        };
        let analysis = ChainAnalysis::from_table(&ExposureTable::new(meta, rows)).unwrap();

        assert_eq!(analysis.flip_zones.len(), 1);
        assert_eq!(analysis.flip_zones[0].impact, FlipImpact::Resistance);
        assert_eq!(analysis.flow.gex_near_total, 40.0);
        assert_eq!(analysis.flow.gex_bias, GexBias::Suppression);
    }

    #[test]
    fn test_empty_table_has_no_analysis() {
        assert!(ChainAnalysis::from_table(&ExposureTable::default()).is_none());
    }
}
