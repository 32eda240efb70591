//! Raw option chain snapshot as delivered by the broker feed.
//!
//! The feed is a JSON object keyed by strike label:
//!
//! ```json
//! { "last_price": 24510.4,
//!   "oc": { "24500.000000": { "ce": { "oi": 1200, ... }, "pe": { ... } } } }
//! ```
//!
//! Every leg field is optional and may be `null`. Parsing happens once, here,
//! into [`StrikeQuote`]s. Strike labels become exact decimals so that
//! `"24500"` and `"24500.000000"` collapse onto the same strike.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{OptionLegQuote, StrikeQuote};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One leg exactly as it appears in the feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLeg {
    #[serde(default)]
    pub oi: Option<f64>,
    #[serde(default)]
    pub previous_oi: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub last_price: Option<f64>,
}

impl RawLeg {
    /// Apply the default-substitution rules: absent or `null` numbers are 0.
    pub fn to_quote(&self) -> OptionLegQuote {
        OptionLegQuote {
            open_interest: contracts(self.oi),
            previous_open_interest: contracts(self.previous_oi),
            volume: contracts(self.volume),
            implied_volatility: finite_or_zero(self.implied_volatility),
            last_price: finite_or_zero(self.last_price),
        }
    }
}

/// Call and put legs of one strike, as they appear in the feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStrike {
    #[serde(default)]
    pub ce: Option<RawLeg>,
    #[serde(default)]
    pub pe: Option<RawLeg>,
}

/// Raw option chain for one expiry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOptionChain {
    /// Spot price of the underlying; `null` or absent reads as 0.
    #[serde(default)]
    pub last_price: Option<f64>,

    /// Strike label -> legs, in feed order.
    #[serde(default)]
    pub oc: Map<String, Value>,
}

impl RawOptionChain {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Spot price, or 0 when the feed sent something unusable.
    pub fn spot_price(&self) -> f64 {
        finite_or_zero(self.last_price)
    }

    /// Parse every strike into a validated quote.
    ///
    /// Unparsable labels, non-positive strikes and corrupt leg records are
    /// skipped. When two labels resolve to the same strike the later record
    /// wins but keeps the position of the first one. The result is in feed
    /// order.
    pub fn strike_quotes(&self) -> Vec<StrikeQuote> {
        let mut by_strike: BTreeMap<Decimal, (usize, StrikeQuote)> = BTreeMap::new();

        for (position, (label, value)) in self.oc.iter().enumerate() {
            let Some(strike) = parse_strike_label(label) else {
                debug!(label = %label, "skipping unparsable strike label");
                continue;
            };

            let raw: RawStrike = match serde_json::from_value(value.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(strike = %strike, error = %e, "skipping corrupt strike record");
                    continue;
                }
            };

            let quote = StrikeQuote::new(
                strike,
                raw.ce.unwrap_or_default().to_quote(),
                raw.pe.unwrap_or_default().to_quote(),
            );

            match by_strike.get_mut(&strike) {
                Some(entry) => {
                    debug!(strike = %strike, "duplicate strike, later record wins");
                    entry.1 = quote;
                }
                None => {
                    by_strike.insert(strike, (position, quote));
                }
            }
        }

        let mut quotes: Vec<(usize, StrikeQuote)> = by_strike.into_values().collect();
        quotes.sort_by_key(|(position, _)| *position);
        quotes.into_iter().map(|(_, quote)| quote).collect()
    }
}

/// Parse a strike label such as `"24500"`, `"24500.000000"` or `"2.45e4"`.
///
/// Returns `None` for anything that is not a positive number.
pub fn parse_strike_label(label: &str) -> Option<Decimal> {
    let label = label.trim();
    let strike = Decimal::from_str(label)
        .or_else(|_| Decimal::from_scientific(label))
        .ok()?;

    if strike > Decimal::ZERO {
        Some(strike.normalize())
    } else {
        None
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Largest contract count accepted from the feed.
pub const MAX_CONTRACTS: i64 = 1_000_000_000_000;

/// Whole contracts, clamped to `[0, MAX_CONTRACTS]`.
fn contracts(value: Option<f64>) -> i64 {
    (finite_or_zero(value).round() as i64).clamp(0, MAX_CONTRACTS)
}
