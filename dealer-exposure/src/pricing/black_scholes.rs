//! Closed-form Black-Scholes Greeks for a single option leg.
//!
//! All functions take the price of the underlying (spot or forward), strike,
//! time to expiry in years, and a decimal volatility. Inputs outside the
//! model's domain (T <= 0, vol <= 0, S <= 0, K <= 0, or anything non-finite)
//! produce a zero Greek, as does any non-finite result.
//!
//! Conventions:
//! - Vega is per 1 vol point (divided by 100).
//! - Theta and charm are per calendar day (divided by 365).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::data::OptionType;

/// Validated model inputs.
///
/// Only constructible when every input is inside the model's domain, so
/// code holding a `GreekInputs` can divide by `vol * sqrt(T)` freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreekInputs {
    spot: f64,
    strike: f64,
    time: f64,
    vol: f64,
}

impl GreekInputs {
    pub fn new(spot: f64, strike: f64, time: f64, vol: f64) -> Option<Self> {
        let finite = spot.is_finite() && strike.is_finite() && time.is_finite() && vol.is_finite();
        if !finite || spot <= 0.0 || strike <= 0.0 || time <= 0.0 || vol <= 0.0 {
            return None;
        }
        Some(Self {
            spot,
            strike,
            time,
            vol,
        })
    }

    fn vol_sqrt_t(&self) -> f64 {
        self.vol * self.time.sqrt()
    }
}

/// Greeks of one leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegGreeks {
    pub delta: f64,
    pub gamma: f64,
    pub vanna: f64,
    pub charm: f64,
}

/// Black-Scholes calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes {
    /// Annualized risk-free rate.
    pub rate: f64,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self { rate: 0.07 }
    }
}

impl BlackScholes {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    fn d1(&self, x: &GreekInputs) -> f64 {
        let numerator = (x.spot / x.strike).ln() + (self.rate + 0.5 * x.vol * x.vol) * x.time;
        numerator / x.vol_sqrt_t()
    }

    fn d2(&self, x: &GreekInputs) -> f64 {
        self.d1(x) - x.vol_sqrt_t()
    }

    /// Standard normal CDF.
    fn norm_cdf(x: f64) -> f64 {
        match Normal::new(0.0, 1.0) {
            Ok(normal) => normal.cdf(x),
            Err(_) => 0.0,
        }
    }

    /// Standard normal PDF.
    fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Evaluate `f` on validated inputs, 0 outside the domain.
    fn guarded(
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        f: impl FnOnce(&GreekInputs) -> f64,
    ) -> f64 {
        match GreekInputs::new(spot, strike, time, vol) {
            Some(inputs) => {
                let value = f(&inputs);
                if value.is_finite() {
                    value
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Calculate gamma (same for calls and puts).
    pub fn gamma(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| {
            Self::norm_pdf(self.d1(x)) / (x.spot * x.vol_sqrt_t())
        })
    }

    pub fn call_delta(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| Self::norm_cdf(self.d1(x)))
    }

    pub fn put_delta(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| Self::norm_cdf(self.d1(x)) - 1.0)
    }

    /// Calculate delta based on type.
    pub fn delta(&self, spot: f64, strike: f64, time: f64, vol: f64, opt_type: OptionType) -> f64 {
        match opt_type {
            OptionType::Call => self.call_delta(spot, strike, time, vol),
            OptionType::Put => self.put_delta(spot, strike, time, vol),
        }
    }

    /// Calculate vega per 1% change in volatility.
    pub fn vega(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| {
            x.spot * Self::norm_pdf(self.d1(x)) * x.time.sqrt() / 100.0
        })
    }

    /// Calculate daily call theta.
    pub fn call_theta(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| {
            let term1 = -x.spot * Self::norm_pdf(self.d1(x)) * x.vol / (2.0 * x.time.sqrt());
            let term2 = -self.rate * x.strike * (-self.rate * x.time).exp() * Self::norm_cdf(self.d2(x));
            (term1 + term2) / 365.0
        })
    }

    /// Sensitivity of delta to volatility.
    pub fn vanna(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| {
            -Self::norm_pdf(self.d1(x)) * self.d2(x) / x.vol
        })
    }

    /// Daily sensitivity of delta to the passage of time.
    pub fn charm(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        Self::guarded(spot, strike, time, vol, |x| {
            let numerator = 2.0 * self.rate * x.time - self.d2(x) * x.vol_sqrt_t();
            let denominator = 2.0 * x.time * x.vol_sqrt_t();
            -Self::norm_pdf(self.d1(x)) * numerator / denominator / 365.0
        })
    }

    /// Delta, gamma, vanna and charm of one leg.
    pub fn leg_greeks(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        opt_type: OptionType,
    ) -> LegGreeks {
        LegGreeks {
            delta: self.delta(spot, strike, time, vol, opt_type),
            gamma: self.gamma(spot, strike, time, vol),
            vanna: self.vanna(spot, strike, time, vol),
            charm: self.charm(spot, strike, time, vol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_atm_values() {
        let bs = BlackScholes::new(0.05);
        // S=100, K=100, T=1, vol=0.20: d1 = 0.35, d2 = 0.15
        let delta = bs.call_delta(100.0, 100.0, 1.0, 0.20);
        assert_relative_eq!(delta, 0.636_830_6, epsilon = 1e-6);

        let gamma = bs.gamma(100.0, 100.0, 1.0, 0.20);
        assert_relative_eq!(gamma, 0.018_762_0, epsilon = 1e-6);

        let vega = bs.vega(100.0, 100.0, 1.0, 0.20);
        assert_relative_eq!(vega, 0.375_240_4, epsilon = 1e-6);
    }

    #[test]
    fn test_vanna_and_charm_closed_form() {
        let bs = BlackScholes::new(0.05);
        let (s, k, t, v) = (100.0, 100.0, 1.0, 0.20);
        let d1: f64 = 0.35;
        let d2: f64 = 0.15;
        let pdf = (-0.5 * d1 * d1).exp() / (2.0 * PI).sqrt();

        assert_relative_eq!(bs.vanna(s, k, t, v), -pdf * d2 / v, epsilon = 1e-12);

        let charm = -pdf * (2.0 * 0.05 * t - d2 * v * t.sqrt()) / (2.0 * t * v * t.sqrt()) / 365.0;
        assert_relative_eq!(bs.charm(s, k, t, v), charm, epsilon = 1e-12);
    }

    #[test]
    fn test_call_theta_negative() {
        let bs = BlackScholes::default();
        let theta = bs.call_theta(100.0, 100.0, 0.5, 0.25);
        assert!(theta < 0.0);
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        let bs = BlackScholes::default();
        let cases = [
            (100.0, 100.0, 0.0, 0.2),
            (100.0, 100.0, -0.1, 0.2),
            (100.0, 100.0, 0.1, 0.0),
            (100.0, 100.0, 0.1, -0.2),
            (0.0, 100.0, 0.1, 0.2),
            (100.0, 0.0, 0.1, 0.2),
            (f64::NAN, 100.0, 0.1, 0.2),
            (100.0, 100.0, f64::INFINITY, 0.2),
        ];

        for (s, k, t, v) in cases {
            assert_eq!(bs.gamma(s, k, t, v), 0.0);
            assert_eq!(bs.call_delta(s, k, t, v), 0.0);
            assert_eq!(bs.put_delta(s, k, t, v), 0.0);
            assert_eq!(bs.vega(s, k, t, v), 0.0);
            assert_eq!(bs.call_theta(s, k, t, v), 0.0);
            assert_eq!(bs.vanna(s, k, t, v), 0.0);
            assert_eq!(bs.charm(s, k, t, v), 0.0);
            assert_eq!(bs.leg_greeks(s, k, t, v, OptionType::Put), LegGreeks::default());
        }
    }

    #[test]
    fn test_guard_rejects_out_of_domain() {
        assert!(GreekInputs::new(100.0, 100.0, 0.1, 0.2).is_some());
        assert!(GreekInputs::new(100.0, 100.0, 0.0, 0.2).is_none());
        assert!(GreekInputs::new(100.0, 100.0, 0.1, 0.0).is_none());
    }

    #[test]
    fn test_leg_greeks_by_type() {
        let bs = BlackScholes::default();
        let call = bs.leg_greeks(100.0, 105.0, 0.1, 0.2, OptionType::Call);
        let put = bs.leg_greeks(100.0, 105.0, 0.1, 0.2, OptionType::Put);

        assert!(call.delta > 0.0 && call.delta < 1.0);
        assert!(put.delta > -1.0 && put.delta < 0.0);
        assert_eq!(call.gamma, put.gamma);
        assert_eq!(call.vanna, put.vanna);
        assert_eq!(call.charm, put.charm);
    }

    proptest! {
        #[test]
        fn prop_call_minus_put_delta_is_one(
            s in 1.0f64..50_000.0,
            k in 1.0f64..50_000.0,
            t in 0.001f64..2.0,
            r in -0.05f64..0.15,
            v in 0.01f64..2.0,
        ) {
            let bs = BlackScholes::new(r);
            let diff = bs.call_delta(s, k, t, v) - bs.put_delta(s, k, t, v);
            prop_assert!((diff - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_gamma_is_leg_independent(
            s in 1.0f64..50_000.0,
            k in 1.0f64..50_000.0,
            t in 0.001f64..2.0,
            r in -0.05f64..0.15,
            v in 0.01f64..2.0,
        ) {
            let bs = BlackScholes::new(r);
            let call = bs.leg_greeks(s, k, t, v, OptionType::Call);
            let put = bs.leg_greeks(s, k, t, v, OptionType::Put);
            prop_assert_eq!(call.gamma, put.gamma);
            prop_assert!(call.gamma >= 0.0);
        }

        #[test]
        fn prop_degenerate_time_or_vol_is_zero(
            s in 1.0f64..50_000.0,
            k in 1.0f64..50_000.0,
            t in -1.0f64..=0.0,
            v in -1.0f64..=0.0,
        ) {
            let bs = BlackScholes::default();
            for (time, vol) in [(t, 0.2), (0.1, v)] {
                prop_assert_eq!(bs.leg_greeks(s, k, time, vol, OptionType::Call), LegGreeks::default());
                prop_assert_eq!(bs.vega(s, k, time, vol), 0.0);
                prop_assert_eq!(bs.call_theta(s, k, time, vol), 0.0);
            }
        }
    }
}
