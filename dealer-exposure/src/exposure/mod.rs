//! Dealer exposure aggregation.
//!
//! Provides:
//! - Per-strike GEX/DEX/vanna/charm exposure rows
//! - The sorted exposure table with hedging pressure
//! - Aggregation from raw snapshots, with explicit no-data outcomes
//! - CSV export

pub mod aggregator;
pub mod config;
pub mod export;
pub mod row;
pub mod table;

pub use aggregator::{ChainOutcome, ExposureAggregator, NoDataReason};
pub use config::{ConfigError, ContractSpec, ExposureConfig};
pub use export::{ExportError, EXPORT_COLUMNS};
pub use row::{LegExposure, StrikeExposureRow};
pub use table::{sorted_unique, ChainSnapshot, ExposureTable};
