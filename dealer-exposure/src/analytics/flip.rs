//! Gamma flip zone detection.
//!
//! A flip zone is a pair of adjacent strikes whose Net GEX has strictly
//! opposite signs. The flip strike is linearly interpolated to where the
//! modeled GEX crosses zero. A zero on either side is not a flip.

use serde::{Deserialize, Serialize};

use crate::exposure::{sorted_unique, StrikeExposureRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlipDirection {
    PositiveToNegative,
    NegativeToPositive,
}

impl FlipDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PositiveToNegative => "Positive -> Negative",
            Self::NegativeToPositive => "Negative -> Positive",
        }
    }
}

/// How dealer hedging flow acts on price at the flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlipImpact {
    Support,
    Resistance,
}

impl FlipImpact {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Support => "Support",
            Self::Resistance => "Resistance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaFlipZone {
    pub flip_strike: f64,
    pub lower_strike: f64,
    pub upper_strike: f64,
    pub lower_gex: f64,
    pub upper_gex: f64,
    pub direction: FlipDirection,
    pub impact: FlipImpact,
}

impl GammaFlipZone {
    fn between(lower: &StrikeExposureRow, upper: &StrikeExposureRow) -> Option<Self> {
        let (g0, g1) = (lower.net_gex, upper.net_gex);
        let direction = if g0 > 0.0 && g1 < 0.0 {
            FlipDirection::PositiveToNegative
        } else if g0 < 0.0 && g1 > 0.0 {
            FlipDirection::NegativeToPositive
        } else {
            return None;
        };

        let magnitude = g0.abs() + g1.abs();
        let weight = if magnitude > 0.0 { g0.abs() / magnitude } else { 0.5 };

        Some(Self {
            flip_strike: lower.strike + (upper.strike - lower.strike) * weight,
            lower_strike: lower.strike,
            upper_strike: upper.strike,
            lower_gex: g0,
            upper_gex: g1,
            direction,
            impact: match direction {
                FlipDirection::PositiveToNegative => FlipImpact::Resistance,
                FlipDirection::NegativeToPositive => FlipImpact::Support,
            },
        })
    }
}

/// Scan adjacent strikes in ascending order and return every flip zone.
pub fn detect_gamma_flip_zones(rows: &[StrikeExposureRow]) -> Vec<GammaFlipZone> {
    let rows = sorted_unique(rows.iter().cloned());
    rows.windows(2)
        .filter_map(|pair| GammaFlipZone::between(&pair[0], &pair[1]))
        .collect()
}
