//! Near-the-money flow metrics and bias classification.
//!
//! - GEX near total: the 5 positive-GEX strikes closest to the forward plus
//!   the 5 negative-GEX strikes closest to the forward
//! - DEX near total: the 5 strikes just above the forward plus the 5 just
//!   below (by strike order, not distance)
//! - Combined signal: average of the two, classified like GEX
//!
//! Bias thresholds are +/-50 (billions) for both.

use serde::{Deserialize, Serialize};

use crate::exposure::{sorted_unique, StrikeExposureRow};

/// Strikes per bucket.
pub const NEAR_STRIKES: usize = 5;

/// Magnitude separating strong from mild bias.
pub const STRONG_BIAS_THRESHOLD: f64 = 50.0;

/// Gamma bias: do dealers dampen or amplify moves?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GexBias {
    StrongSuppression,
    Suppression,
    Neutral,
    Amplification,
    HighAmplification,
}

impl GexBias {
    pub fn classify(value: f64) -> Self {
        if value > STRONG_BIAS_THRESHOLD {
            Self::StrongSuppression
        } else if value > 0.0 {
            Self::Suppression
        } else if value < -STRONG_BIAS_THRESHOLD {
            Self::HighAmplification
        } else if value < 0.0 {
            Self::Amplification
        } else {
            Self::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongSuppression => "STRONG SUPPRESSION",
            Self::Suppression => "SUPPRESSION",
            Self::Neutral => "NEUTRAL",
            Self::Amplification => "AMPLIFICATION",
            Self::HighAmplification => "HIGH AMPLIFICATION",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::StrongSuppression => "Bullish - Low Vol Expected",
            Self::Suppression => "Mild Bullish",
            Self::Neutral => "Balanced",
            Self::Amplification => "Volatile",
            Self::HighAmplification => "High Volatility Expected",
        }
    }
}

/// Delta bias: which way does dealer hedging lean?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DexBias {
    Bullish,
    MildBullish,
    Neutral,
    MildBearish,
    Bearish,
}

impl DexBias {
    pub fn classify(value: f64) -> Self {
        if value > STRONG_BIAS_THRESHOLD {
            Self::Bullish
        } else if value < -STRONG_BIAS_THRESHOLD {
            Self::Bearish
        } else if value > 0.0 {
            Self::MildBullish
        } else if value < 0.0 {
            Self::MildBearish
        } else {
            Self::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::MildBullish => "Mild Bullish",
            Self::Neutral => "NEUTRAL",
            Self::MildBearish => "Mild Bearish",
            Self::Bearish => "BEARISH",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Bullish => "Strong Upward Pressure",
            Self::MildBullish => "Slight Upward Bias",
            Self::Neutral => "No Clear Direction",
            Self::MildBearish => "Slight Downward Bias",
            Self::Bearish => "Strong Downward Pressure",
        }
    }
}

/// Aggregate near-the-money exposure and its bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub gex_near_positive: f64,
    pub gex_near_negative: f64,
    pub gex_near_total: f64,
    /// Net GEX over every strike.
    pub gex_total: f64,
    pub gex_bias: GexBias,

    pub dex_near_above: f64,
    pub dex_near_below: f64,
    pub dex_near_total: f64,
    /// Net DEX over every strike.
    pub dex_total: f64,
    pub dex_bias: DexBias,

    pub vanna_total: f64,
    pub charm_total: f64,
    pub flow_gex_total: f64,
    pub flow_dex_total: f64,

    pub combined_signal: f64,
    pub combined_bias: GexBias,
}

impl FlowMetrics {
    /// Compute flow metrics around a forward price.
    ///
    /// Rows are deduplicated and sorted first, so any row slice is accepted.
    pub fn compute(rows: &[StrikeExposureRow], forward: f64) -> Self {
        let rows = sorted_unique(rows.iter().cloned());

        let gex_near_positive = nearest_gex_sum(&rows, forward, |gex| gex > 0.0);
        let gex_near_negative = nearest_gex_sum(&rows, forward, |gex| gex < 0.0);
        let gex_near_total = gex_near_positive + gex_near_negative;

        let dex_near_above: f64 = rows
            .iter()
            .filter(|r| r.strike > forward)
            .take(NEAR_STRIKES)
            .map(|r| r.net_dex)
            .sum();
        let below: Vec<&StrikeExposureRow> = rows.iter().filter(|r| r.strike < forward).collect();
        let dex_near_below: f64 = below
            .iter()
            .skip(below.len().saturating_sub(NEAR_STRIKES))
            .map(|r| r.net_dex)
            .sum();
        let dex_near_total = dex_near_above + dex_near_below;

        let combined_signal = (gex_near_total + dex_near_total) / 2.0;

        Self {
            gex_near_positive,
            gex_near_negative,
            gex_near_total,
            gex_total: rows.iter().map(|r| r.net_gex).sum(),
            gex_bias: GexBias::classify(gex_near_total),
            dex_near_above,
            dex_near_below,
            dex_near_total,
            dex_total: rows.iter().map(|r| r.net_dex).sum(),
            dex_bias: DexBias::classify(dex_near_total),
            vanna_total: rows.iter().map(|r| r.net_vanna).sum(),
            charm_total: rows.iter().map(|r| r.net_charm).sum(),
            flow_gex_total: rows.iter().map(|r| r.net_flow_gex).sum(),
            flow_dex_total: rows.iter().map(|r| r.net_flow_dex).sum(),
            combined_signal,
            combined_bias: GexBias::classify(combined_signal),
        }
    }
}

/// Sum Net GEX of the strikes nearest the forward within one sign bucket.
///
/// Ties in distance keep strike order.
fn nearest_gex_sum(rows: &[StrikeExposureRow], forward: f64, in_bucket: impl Fn(f64) -> bool) -> f64 {
    let mut bucket: Vec<(f64, f64)> = rows
        .iter()
        .filter(|r| in_bucket(r.net_gex))
        .map(|r| ((r.strike - forward).abs(), r.net_gex))
        .collect();
    bucket.sort_by(|a, b| a.0.total_cmp(&b.0));
    bucket.iter().take(NEAR_STRIKES).map(|(_, gex)| gex).sum()
}
