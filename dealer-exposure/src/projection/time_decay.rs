//! Square-root-of-time gamma decay.
//!
//! Projects an exposure table `hours` into the future without re-pricing:
//! 1. new_days = max(current_days - hours / 24, 0.1)
//! 2. time_factor = new_days / current_days (1 when current_days <= 0)
//! 3. gamma_decay = sqrt(time_factor)
//! 4. Net GEX and hedging pressure of every row are scaled by gamma_decay
//!
//! This is a heuristic for gamma shrinking into expiry, not a re-derivation
//! through the pricing model with the shorter time. Every other row field is
//! carried over unchanged and the input table is never modified. The result
//! records its new days to expiry, so projecting it again continues from there.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::exposure::ExposureTable;

/// Floor on projected days to expiry.
pub const MIN_DAYS_TO_EXPIRY: f64 = 0.1;

/// Decay parameters for one hour offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeProjection {
    pub hours_forward: f64,
    pub current_days: f64,
    pub new_days: f64,
    pub time_factor: f64,
    pub gamma_decay: f64,
}

impl TimeProjection {
    pub fn new(current_days: f64, hours_forward: f64) -> Self {
        let new_days = (current_days - hours_forward / 24.0).max(MIN_DAYS_TO_EXPIRY);
        let time_factor = if current_days > 0.0 {
            new_days / current_days
        } else {
            1.0
        };

        Self {
            hours_forward,
            current_days,
            new_days,
            time_factor,
            gamma_decay: time_factor.sqrt(),
        }
    }

    /// Projection from the days to expiry a table currently reflects.
    pub fn for_table(table: &ExposureTable, hours_forward: f64) -> Self {
        Self::new(table.meta.effective_days_to_expiry(), hours_forward)
    }

    /// A new table with Net GEX and hedging pressure decayed.
    pub fn apply(&self, table: &ExposureTable) -> ExposureTable {
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.net_gex *= self.gamma_decay;
                row.hedging_pressure *= self.gamma_decay;
                row
            })
            .collect();

        let mut meta = table.meta.clone();
        meta.projected_days_to_expiry = Some(self.new_days);
        ExposureTable::from_scaled_rows(meta, rows)
    }
}

/// A projected table plus the projection that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTable {
    pub table: ExposureTable,
    pub projection: TimeProjection,
}

impl ProjectedTable {
    pub fn new_days(&self) -> f64 {
        self.projection.new_days
    }

    pub fn gamma_decay(&self) -> f64 {
        self.projection.gamma_decay
    }
}

impl ExposureTable {
    /// Project this table `hours_forward` hours ahead.
    pub fn project(&self, hours_forward: f64) -> ProjectedTable {
        let projection = TimeProjection::for_table(self, hours_forward);
        info!(
            hours = hours_forward,
            new_days = projection.new_days,
            decay = projection.gamma_decay,
            "Projected exposure table"
        );

        ProjectedTable {
            table: projection.apply(self),
            projection,
        }
    }
}

/// Project one table across many hour offsets in parallel.
///
/// Results come back in the order of `hours`.
pub fn project_ladder(table: &ExposureTable, hours: &[f64]) -> Vec<ProjectedTable> {
    hours.par_iter().map(|&h| table.project(h)).collect()
}
