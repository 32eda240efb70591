//! Exposure calculation configuration.
//!
//! Risk-free rate, contract tables and the volatility fallback are passed to
//! the aggregator per call, never read from globals.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Contract metadata for one underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Units of underlying per contract.
    pub contract_multiplier: f64,

    /// Distance between listed strikes.
    pub strike_spacing: f64,
}

impl ContractSpec {
    pub fn new(contract_multiplier: f64, strike_spacing: f64) -> Self {
        Self {
            contract_multiplier,
            strike_spacing,
        }
    }
}

/// Configuration for exposure aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Annualized risk-free rate used for the forward and all Greeks.
    pub risk_free_rate: f64,

    /// Volatility substituted for zero or negative IV quotes.
    pub default_volatility: f64,

    /// Days to expiry used when the expiry date cannot be parsed.
    pub default_days_to_expiry: i64,

    /// Strike window radius, in multiples of strike spacing around the forward.
    pub strikes_range: u32,

    /// Contract metadata per symbol.
    pub contracts: HashMap<String, ContractSpec>,

    /// Symbol whose contract spec is used for unknown symbols.
    pub fallback_symbol: String,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        let contracts = [
            ("NIFTY", ContractSpec::new(25.0, 50.0)),
            ("BANKNIFTY", ContractSpec::new(15.0, 100.0)),
            ("FINNIFTY", ContractSpec::new(40.0, 50.0)),
            ("MIDCPNIFTY", ContractSpec::new(75.0, 25.0)),
        ]
        .into_iter()
        .map(|(symbol, spec)| (symbol.to_string(), spec))
        .collect();

        Self {
            risk_free_rate: 0.07,
            default_volatility: 0.15,
            default_days_to_expiry: 7,
            strikes_range: 12,
            contracts,
            fallback_symbol: "NIFTY".to_string(),
        }
    }
}

impl ExposureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a (possibly partial) JSON config file.
    ///
    /// Contracts in the file are merged over the built-in table and symbols
    /// are matched case-insensitively.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_str(json)?;
        let mut config = Self {
            contracts: Self::default().contracts,
            fallback_symbol: parsed.fallback_symbol.to_uppercase(),
            ..parsed.clone()
        };

        let mut seen = HashMap::new();
        for (symbol, spec) in parsed.contracts {
            let key = symbol.to_uppercase();
            if let Some(other) = seen.insert(key.clone(), symbol.clone()) {
                return Err(ConfigError::InvalidValue {
                    field: "contracts",
                    reason: format!("{} and {} name the same symbol", other, symbol),
                });
            }
            config.contracts.insert(key, spec);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_strikes_range(mut self, strikes_range: u32) -> Self {
        self.strikes_range = strikes_range;
        self
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn with_contract(mut self, symbol: &str, spec: ContractSpec) -> Self {
        self.contracts.insert(symbol.to_uppercase(), spec);
        self
    }

    /// Contract spec for a symbol, falling back to the fallback symbol.
    pub fn contract_for(&self, symbol: &str) -> ContractSpec {
        if let Some(spec) = self.contracts.get(&symbol.to_uppercase()) {
            return *spec;
        }
        match self.contracts.get(&self.fallback_symbol.to_uppercase()) {
            Some(spec) => *spec,
            None => {
                warn!(
                    symbol = %symbol,
                    fallback = %self.fallback_symbol,
                    "no contract spec for symbol or fallback, using unit multiplier and spacing"
                );
                ContractSpec::new(1.0, 1.0)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "risk_free_rate",
                reason: "must be finite".to_string(),
            });
        }
        if !(self.default_volatility > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "default_volatility",
                reason: "must be positive".to_string(),
            });
        }
        if self.default_days_to_expiry < 1 {
            return Err(ConfigError::InvalidValue {
                field: "default_days_to_expiry",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.contracts.contains_key(&self.fallback_symbol.to_uppercase()) {
            return Err(ConfigError::InvalidValue {
                field: "fallback_symbol",
                reason: format!("{} has no contract spec", self.fallback_symbol),
            });
        }
        for (symbol, spec) in &self.contracts {
            if !(spec.strike_spacing > 0.0) || !(spec.contract_multiplier > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "contracts",
                    reason: format!("{} needs positive spacing and multiplier", symbol),
                });
            }
        }
        Ok(())
    }
}
