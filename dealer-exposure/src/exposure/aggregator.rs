//! Exposure aggregation.
//!
//! Turns one raw option chain snapshot into a per-strike exposure table:
//! 1. Days to expiry = max(expiry - now, 1), default when unparsable
//! 2. Forward = spot * e^(rT)
//! 3. Keep strikes within `strikes_range` spacings of the forward
//! 4. Pick the ATM strike (closest to forward, first seen on ties)
//! 5. Price each leg off the forward and convert to exposures
//! 6. Sort, dedup and normalize hedging pressure

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{ChainSource, OptionType, RawOptionChain, StrikeQuote};
use crate::pricing::BlackScholes;

use super::config::{ContractSpec, ExposureConfig};
use super::row::{LegExposure, StrikeExposureRow};
use super::table::{ChainSnapshot, ExposureTable};

const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// Why no table could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoDataReason {
    /// The expiry list was empty.
    NoExpiries,
    /// The snapshot for the selected expiry was missing.
    NoSnapshot,
    /// No strike survived parsing and window filtering.
    NoStrikesInWindow,
}

impl NoDataReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::NoExpiries => "no expiries available",
            Self::NoSnapshot => "option chain snapshot unavailable",
            Self::NoStrikesInWindow => "no usable strikes near the forward",
        }
    }
}

/// Result of one aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    NoData(NoDataReason),
    Computed(ExposureTable),
}

impl ChainOutcome {
    /// The table, if there is anything to analyze.
    ///
    /// `NoData` and a computed-but-empty table are both `None`.
    pub fn table(&self) -> Option<&ExposureTable> {
        match self {
            Self::Computed(table) if !table.is_empty() => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<ExposureTable> {
        match self {
            Self::Computed(table) if !table.is_empty() => Some(table),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.table().is_some()
    }
}

/// Builds exposure tables from raw snapshots.
#[derive(Debug, Clone)]
pub struct ExposureAggregator {
    config: ExposureConfig,
    model: BlackScholes,
}

impl Default for ExposureAggregator {
    fn default() -> Self {
        Self::new(ExposureConfig::default())
    }
}

impl ExposureAggregator {
    pub fn new(config: ExposureConfig) -> Self {
        let model = BlackScholes::new(config.risk_free_rate);
        Self { config, model }
    }

    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    /// Whole days until expiry, at least 1.
    pub fn days_to_expiry(&self, expiry: &str, now: NaiveDateTime) -> i64 {
        match NaiveDate::parse_from_str(expiry.trim(), EXPIRY_FORMAT) {
            Ok(date) => {
                let expiry_start = date.and_time(NaiveTime::MIN);
                expiry_start.signed_duration_since(now).num_days().max(1)
            }
            Err(_) => {
                warn!(expiry = %expiry, "unparsable expiry, using default days to expiry");
                self.config.default_days_to_expiry
            }
        }
    }

    /// Cost-of-carry forward.
    pub fn forward_price(&self, spot: f64, days_to_expiry: i64) -> f64 {
        let time = days_to_expiry as f64 / 365.0;
        spot * (self.config.risk_free_rate * time).exp()
    }

    /// Fetch from a source and aggregate.
    ///
    /// The expiry index is clamped to the last available expiry.
    pub fn process_chain<S: ChainSource + ?Sized>(
        &self,
        source: &S,
        symbol: &str,
        expiry_index: usize,
        now: NaiveDateTime,
    ) -> ChainOutcome {
        let expiry_list = source.expiry_list(symbol);
        let Some(last) = expiry_list.len().checked_sub(1) else {
            warn!(symbol = %symbol, "no expiries available");
            return ChainOutcome::NoData(NoDataReason::NoExpiries);
        };
        let expiry = expiry_list[expiry_index.min(last)].clone();

        match source.option_chain(symbol, &expiry) {
            Some(chain) => self.aggregate(symbol, &expiry, &expiry_list, &chain, now),
            None => {
                warn!(symbol = %symbol, expiry = %expiry, "option chain unavailable");
                ChainOutcome::NoData(NoDataReason::NoSnapshot)
            }
        }
    }

    /// Aggregate one raw chain into an exposure table.
    pub fn aggregate(
        &self,
        symbol: &str,
        expiry: &str,
        expiry_list: &[String],
        chain: &RawOptionChain,
        now: NaiveDateTime,
    ) -> ChainOutcome {
        let days_to_expiry = self.days_to_expiry(expiry, now);
        let time = days_to_expiry as f64 / 365.0;
        let spot = chain.spot_price();
        let forward = self.forward_price(spot, days_to_expiry);
        let contract = self.config.contract_for(symbol);

        let quotes: Vec<StrikeQuote> = chain
            .strike_quotes()
            .into_iter()
            .filter(|q| self.in_window(q.strike_f64(), forward, &contract))
            .collect();

        if quotes.is_empty() {
            warn!(symbol = %symbol, expiry = %expiry, forward, "no strikes in window");
            return ChainOutcome::NoData(NoDataReason::NoStrikesInWindow);
        }

        let atm = atm_quote(&quotes, forward);
        let rows: Vec<StrikeExposureRow> = quotes
            .iter()
            .map(|q| self.strike_row(q, forward, time, contract.contract_multiplier))
            .collect();

        let (atm_strike, atm_call_premium, atm_put_premium) = match atm {
            Some(q) => (q.strike_f64(), q.call.last_price, q.put.last_price),
            None => (0.0, 0.0, 0.0),
        };

        let meta = ChainSnapshot {
            symbol: symbol.to_string(),
            spot_price: spot,
            forward_price: forward,
            expiry: expiry.to_string(),
            days_to_expiry,
            atm_strike,
            atm_call_premium,
            atm_put_premium,
            atm_straddle: atm_call_premium + atm_put_premium,
            expiry_list: expiry_list.to_vec(),
            timestamp: now,
            projected_days_to_expiry: None,
        };

        let table = ExposureTable::new(meta, rows);
        info!(
            symbol = %symbol,
            expiry = %expiry,
            strikes = table.len(),
            forward,
            atm_strike,
            "aggregated option chain"
        );
        ChainOutcome::Computed(table)
    }

    fn in_window(&self, strike: f64, forward: f64, contract: &ContractSpec) -> bool {
        let distance = (strike - forward).abs() / contract.strike_spacing;
        let keep = strike > 0.0 && distance <= f64::from(self.config.strikes_range);
        if !keep {
            debug!(strike, forward, "strike outside window");
        }
        keep
    }

    /// Price both legs off the forward and convert to exposures.
    fn strike_row(
        &self,
        quote: &StrikeQuote,
        forward: f64,
        time: f64,
        multiplier: f64,
    ) -> StrikeExposureRow {
        let strike = quote.strike_f64();
        let leg_exposure = |opt_type: OptionType| {
            let leg = quote.leg(opt_type);
            let vol = leg.normalized_volatility(self.config.default_volatility);
            if !(leg.implied_volatility > 0.0) {
                debug!(strike, leg = opt_type.as_str(), vol, "no usable IV, using default volatility");
            }
            let greeks = self.model.leg_greeks(forward, strike, time, vol, opt_type);
            LegExposure::compute(leg, greeks, forward, multiplier, opt_type)
        };

        let call_exp = leg_exposure(OptionType::Call);
        let put_exp = leg_exposure(OptionType::Put);
        StrikeExposureRow::from_legs(strike, &quote.call, &quote.put, &call_exp, &put_exp)
    }
}

/// Strike closest to the forward; the first one wins a tie.
fn atm_quote(quotes: &[StrikeQuote], forward: f64) -> Option<&StrikeQuote> {
    let mut best: Option<(&StrikeQuote, f64)> = None;
    for quote in quotes {
        let diff = (quote.strike_f64() - forward).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((quote, diff)),
        }
    }
    best.map(|(quote, _)| quote)
}
