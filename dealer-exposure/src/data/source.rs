//! Data-fetch collaborator seam.
//!
//! The exposure engine never talks to a broker itself. Whatever fetches the
//! expiry list and the option chain implements [`ChainSource`]; the crate
//! ships a JSON-file implementation for offline use.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::snapshot::{RawOptionChain, SnapshotError};

/// Supplies expiries and raw option chains for a symbol.
///
/// Implementations report "nothing available" as an empty list or `None`,
/// never as an error.
pub trait ChainSource {
    /// Available expiries (YYYY-MM-DD), nearest first.
    fn expiry_list(&self, symbol: &str) -> Vec<String>;

    /// Option chain for one expiry.
    fn option_chain(&self, symbol: &str, expiry: &str) -> Option<RawOptionChain>;
}

/// A captured snapshot stored as JSON.
///
/// ```json
/// { "symbol": "NIFTY",
///   "expiries": ["2026-10-20", "2026-10-27"],
///   "chains": { "2026-10-20": { "last_price": 24510.4, "oc": { ... } } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Empty serves every symbol.
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub expiries: Vec<String>,
    #[serde(default)]
    pub chains: HashMap<String, RawOptionChain>,
}

impl SnapshotFile {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    fn serves(&self, symbol: &str) -> bool {
        self.symbol.is_empty() || self.symbol.eq_ignore_ascii_case(symbol)
    }
}

impl ChainSource for SnapshotFile {
    fn expiry_list(&self, symbol: &str) -> Vec<String> {
        if self.serves(symbol) {
            self.expiries.clone()
        } else {
            Vec::new()
        }
    }

    fn option_chain(&self, symbol: &str, expiry: &str) -> Option<RawOptionChain> {
        if !self.serves(symbol) {
            return None;
        }
        self.chains.get(expiry).cloned()
    }
}
