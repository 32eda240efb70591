//! Forward-time projection of exposure tables.

pub mod time_decay;

pub use time_decay::{project_ladder, ProjectedTable, TimeProjection, MIN_DAYS_TO_EXPIRY};
