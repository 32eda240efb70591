//! Core data types for option chain snapshots.
//!
//! These types are the validated form of one broker snapshot: every
//! optional or loosely-typed field of the raw feed has already been
//! defaulted by the time a value of these types exists.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Exchange leg code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }
}

/// One side (call or put) of one strike, as quoted in the snapshot.
///
/// Never mutated after parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionLegQuote {
    /// Open interest (contracts).
    pub open_interest: i64,

    /// Open interest at the previous session close.
    pub previous_open_interest: i64,

    /// Traded volume.
    pub volume: i64,

    /// Implied volatility as quoted (percentage or decimal).
    pub implied_volatility: f64,

    /// Last traded price.
    pub last_price: f64,
}

impl OptionLegQuote {
    /// Today's change in open interest.
    pub fn oi_change(&self) -> i64 {
        self.open_interest.saturating_sub(self.previous_open_interest)
    }

    /// Implied volatility as a decimal suitable for pricing.
    ///
    /// Quotes above 1 are percentages. Zero, negative or non-finite quotes
    /// fall back to `default_volatility`.
    pub fn normalized_volatility(&self, default_volatility: f64) -> f64 {
        let iv = self.implied_volatility;
        if iv > 1.0 {
            iv / 100.0
        } else if iv > 0.0 {
            iv
        } else {
            default_volatility
        }
    }
}

/// Both legs of a single strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeQuote {
    /// Strike price, exact.
    pub strike: Decimal,

    /// Call leg.
    pub call: OptionLegQuote,

    /// Put leg.
    pub put: OptionLegQuote,
}

impl StrikeQuote {
    pub fn new(strike: Decimal, call: OptionLegQuote, put: OptionLegQuote) -> Self {
        Self { strike, call, put }
    }

    /// Strike as a float for pricing math.
    pub fn strike_f64(&self) -> f64 {
        self.strike.try_into().unwrap_or(0.0)
    }

    /// Get the leg for an option type.
    pub fn leg(&self, option_type: OptionType) -> &OptionLegQuote {
        match option_type {
            OptionType::Call => &self.call,
            OptionType::Put => &self.put,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_option_type_codes() {
        assert_eq!(OptionType::Call.as_str(), "CE");
        assert_eq!(OptionType::Put.as_str(), "PE");
    }

    #[test]
    fn test_volatility_normalization() {
        let leg = |iv| OptionLegQuote {
            implied_volatility: iv,
            ..Default::default()
        };

        assert_eq!(leg(18.5).normalized_volatility(0.15), 0.185);
        assert_eq!(leg(0.22).normalized_volatility(0.15), 0.22);
        assert_eq!(leg(1.0).normalized_volatility(0.15), 1.0);
        assert_eq!(leg(0.0).normalized_volatility(0.15), 0.15);
        assert_eq!(leg(-3.0).normalized_volatility(0.15), 0.15);
        assert_eq!(leg(f64::NAN).normalized_volatility(0.15), 0.15);
    }

    #[test]
    fn test_oi_change() {
        let leg = OptionLegQuote {
            open_interest: 1_200,
            previous_open_interest: 1_500,
            ..Default::default()
        };
        assert_eq!(leg.oi_change(), -300);

        let extreme = OptionLegQuote {
            open_interest: i64::MIN,
            previous_open_interest: i64::MAX,
            ..Default::default()
        };
        assert_eq!(extreme.oi_change(), i64::MIN);
    }

    #[test]
    fn test_strike_leg_access() {
        let call = OptionLegQuote {
            open_interest: 10,
            ..Default::default()
        };
        let put = OptionLegQuote {
            open_interest: 20,
            ..Default::default()
        };
        let quote = StrikeQuote::new(dec!(24500.00), call, put);

        assert_eq!(quote.strike_f64(), 24500.0);
        assert_eq!(quote.leg(OptionType::Call).open_interest, 10);
        assert_eq!(quote.leg(OptionType::Put).open_interest, 20);
    }
}
