//! Volatility regime from near-the-money dealer exposure.
//!
//! Positive gamma dealers sell rallies and buy dips, so moves get damped.
//! Negative gamma dealers chase price, so moves get amplified.

use serde::{Deserialize, Serialize};

use super::flow::{FlowMetrics, STRONG_BIAS_THRESHOLD};

/// Near DEX magnitude needed to lean a trending regime directional.
pub const DIRECTIONAL_DEX_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityRegime {
    /// Near GEX > 50.
    LowVolMeanReversion,
    /// Near GEX < -50.
    HighVolTrending,
    Transitional,
}

impl VolatilityRegime {
    pub fn classify(gex_near_total: f64) -> Self {
        if gex_near_total > STRONG_BIAS_THRESHOLD {
            Self::LowVolMeanReversion
        } else if gex_near_total < -STRONG_BIAS_THRESHOLD {
            Self::HighVolTrending
        } else {
            Self::Transitional
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::LowVolMeanReversion => "Low Volatility / Mean Reversion",
            Self::HighVolTrending => "High Volatility / Trending",
            Self::Transitional => "Transitional / Mixed",
        }
    }

    /// Whether this regime favors selling premium.
    pub fn favors_premium_selling(&self) -> bool {
        matches!(self, Self::LowVolMeanReversion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategySuggestion {
    IronCondorOrShortStraddle,
    LongStraddleOrDirectional,
    BullCallSpread,
    BearPutSpread,
    WaitForClarity,
}

impl StrategySuggestion {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IronCondorOrShortStraddle => "Iron Condor / Short Straddle",
            Self::LongStraddleOrDirectional => "Long Straddle / Directional",
            Self::BullCallSpread => "Bull Call Spread",
            Self::BearPutSpread => "Bear Put Spread",
            Self::WaitForClarity => "Wait for Clarity",
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            Self::IronCondorOrShortStraddle => {
                "Positive GEX: market makers suppress moves, premium selling works well"
            }
            Self::LongStraddleOrDirectional => {
                "Negative GEX: volatility amplification, buy premium or trade breakouts"
            }
            Self::BullCallSpread => "Bullish DEX with high volatility: upside momentum likely",
            Self::BearPutSpread => "Bearish DEX with high volatility: downside momentum likely",
            Self::WaitForClarity => "Mixed signals, wait for GEX and DEX to align",
        }
    }
}

/// Regime plus the strategies it suggests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: VolatilityRegime,
    pub gex_near_total: f64,
    pub dex_near_total: f64,
    pub suggestions: Vec<StrategySuggestion>,
}

impl RegimeAssessment {
    pub fn assess(gex_near_total: f64, dex_near_total: f64) -> Self {
        let regime = VolatilityRegime::classify(gex_near_total);
        let suggestions = match regime {
            VolatilityRegime::LowVolMeanReversion => {
                vec![StrategySuggestion::IronCondorOrShortStraddle]
            }
            VolatilityRegime::HighVolTrending => {
                let mut s = vec![StrategySuggestion::LongStraddleOrDirectional];
                if dex_near_total > DIRECTIONAL_DEX_THRESHOLD {
                    s.push(StrategySuggestion::BullCallSpread);
                } else if dex_near_total < -DIRECTIONAL_DEX_THRESHOLD {
                    s.push(StrategySuggestion::BearPutSpread);
                }
                s
            }
            VolatilityRegime::Transitional => vec![StrategySuggestion::WaitForClarity],
        };

        Self {
            regime,
            gex_near_total,
            dex_near_total,
            suggestions,
        }
    }

    pub fn from_flow(flow: &FlowMetrics) -> Self {
        Self::assess(flow.gex_near_total, flow.dex_near_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_vol_regime() {
        let assessment = RegimeAssessment::assess(60.0, -100.0);
        assert_eq!(assessment.regime, VolatilityRegime::LowVolMeanReversion);
        assert_eq!(
            assessment.suggestions,
            vec![StrategySuggestion::IronCondorOrShortStraddle]
        );
        assert!(assessment.regime.favors_premium_selling());
    }

    #[test]
    fn test_trending_regime_directional_leans() {
        let bull = RegimeAssessment::assess(-60.0, 25.0);
        assert_eq!(bull.regime, VolatilityRegime::HighVolTrending);
        assert_eq!(
            bull.suggestions,
            vec![
                StrategySuggestion::LongStraddleOrDirectional,
                StrategySuggestion::BullCallSpread
            ]
        );

        let bear = RegimeAssessment::assess(-60.0, -25.0);
        assert_eq!(bear.suggestions[1], StrategySuggestion::BearPutSpread);

        let flat = RegimeAssessment::assess(-60.0, 20.0);
        assert_eq!(flat.suggestions.len(), 1);
    }

    #[test]
    fn test_transitional_regime() {
        for gex in [50.0, 0.0, -50.0] {
            let assessment = RegimeAssessment::assess(gex, 80.0);
            assert_eq!(assessment.regime, VolatilityRegime::Transitional);
            assert_eq!(assessment.suggestions, vec![StrategySuggestion::WaitForClarity]);
        }
        assert_eq!(VolatilityRegime::Transitional.description(), "Transitional / Mixed");
    }
}
