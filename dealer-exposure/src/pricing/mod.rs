//! Option pricing model.

pub mod black_scholes;

pub use black_scholes::{BlackScholes, GreekInputs, LegGreeks};
