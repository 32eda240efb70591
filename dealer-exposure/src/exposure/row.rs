//! Per-strike exposure records.
//!
//! Exposures are expressed in billions of the underlying's currency:
//! - GEX: OI * gamma * F^2 * multiplier / 1e9 (puts negated, dealers are
//!   modeled as short put gamma)
//! - DEX, vanna, charm: OI * greek * F * multiplier / 1e9 (put delta is
//!   already negative, no extra sign flip)
//! - Flow variants use today's OI change instead of OI.

use serde::{Deserialize, Serialize};

use crate::data::{OptionLegQuote, OptionType};
use crate::pricing::LegGreeks;

const BILLION: f64 = 1e9;

/// Exposures of one leg of one strike.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegExposure {
    pub greeks: LegGreeks,
    pub gex: f64,
    pub dex: f64,
    pub vanna_exposure: f64,
    pub charm_exposure: f64,
    pub flow_gex: f64,
    pub flow_dex: f64,
}

impl LegExposure {
    pub fn compute(
        leg: &OptionLegQuote,
        greeks: LegGreeks,
        forward: f64,
        multiplier: f64,
        opt_type: OptionType,
    ) -> Self {
        let gamma_sign = match opt_type {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        };
        let oi = leg.open_interest as f64;
        let oi_change = leg.oi_change() as f64;
        let gamma_notional = greeks.gamma * forward * forward * multiplier / BILLION;
        let delta_notional = greeks.delta * forward * multiplier / BILLION;

        Self {
            greeks,
            gex: gamma_sign * oi * gamma_notional,
            dex: oi * delta_notional,
            vanna_exposure: oi * greeks.vanna * forward * multiplier / BILLION,
            charm_exposure: oi * greeks.charm * forward * multiplier / BILLION,
            flow_gex: gamma_sign * oi_change * gamma_notional,
            flow_dex: oi_change * delta_notional,
        }
    }
}

/// One strike's fully computed record.
///
/// Field order is the export column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeExposureRow {
    pub strike: f64,
    pub call_oi: i64,
    pub put_oi: i64,
    pub call_oi_change: i64,
    pub put_oi_change: i64,
    pub call_volume: i64,
    pub put_volume: i64,
    pub total_volume: i64,
    pub call_iv: f64,
    pub put_iv: f64,
    pub call_ltp: f64,
    pub put_ltp: f64,
    pub call_delta: f64,
    pub put_delta: f64,
    pub call_gamma: f64,
    pub put_gamma: f64,
    pub call_vanna: f64,
    pub put_vanna: f64,
    pub call_charm: f64,
    pub put_charm: f64,
    pub call_gex: f64,
    pub put_gex: f64,
    pub net_gex: f64,
    pub call_dex: f64,
    pub put_dex: f64,
    pub net_dex: f64,
    pub call_vanna_exp: f64,
    pub put_vanna_exp: f64,
    pub net_vanna: f64,
    pub call_charm_exp: f64,
    pub put_charm_exp: f64,
    pub net_charm: f64,
    pub call_flow_gex: f64,
    pub put_flow_gex: f64,
    pub net_flow_gex: f64,
    pub call_flow_dex: f64,
    pub put_flow_dex: f64,
    pub net_flow_dex: f64,
    /// Net GEX as a percentage of the largest |Net GEX| in the table.
    pub hedging_pressure: f64,
}

impl StrikeExposureRow {
    /// Build a row from both legs. Hedging pressure is filled in by the table.
    pub fn from_legs(
        strike: f64,
        call: &OptionLegQuote,
        put: &OptionLegQuote,
        call_exp: &LegExposure,
        put_exp: &LegExposure,
    ) -> Self {
        Self {
            strike,
            call_oi: call.open_interest,
            put_oi: put.open_interest,
            call_oi_change: call.oi_change(),
            put_oi_change: put.oi_change(),
            call_volume: call.volume,
            put_volume: put.volume,
            total_volume: call.volume.saturating_add(put.volume),
            call_iv: call.implied_volatility,
            put_iv: put.implied_volatility,
            call_ltp: call.last_price,
            put_ltp: put.last_price,
            call_delta: call_exp.greeks.delta,
            put_delta: put_exp.greeks.delta,
            call_gamma: call_exp.greeks.gamma,
            put_gamma: put_exp.greeks.gamma,
            call_vanna: call_exp.greeks.vanna,
            put_vanna: put_exp.greeks.vanna,
            call_charm: call_exp.greeks.charm,
            put_charm: put_exp.greeks.charm,
            call_gex: call_exp.gex,
            put_gex: put_exp.gex,
            net_gex: call_exp.gex + put_exp.gex,
            call_dex: call_exp.dex,
            put_dex: put_exp.dex,
            net_dex: call_exp.dex + put_exp.dex,
            call_vanna_exp: call_exp.vanna_exposure,
            put_vanna_exp: put_exp.vanna_exposure,
            net_vanna: call_exp.vanna_exposure + put_exp.vanna_exposure,
            call_charm_exp: call_exp.charm_exposure,
            put_charm_exp: put_exp.charm_exposure,
            net_charm: call_exp.charm_exposure + put_exp.charm_exposure,
            call_flow_gex: call_exp.flow_gex,
            put_flow_gex: put_exp.flow_gex,
            net_flow_gex: call_exp.flow_gex + put_exp.flow_gex,
            call_flow_dex: call_exp.flow_dex,
            put_flow_dex: put_exp.flow_dex,
            net_flow_dex: call_exp.flow_dex + put_exp.flow_dex,
            hedging_pressure: 0.0,
        }
    }
}
