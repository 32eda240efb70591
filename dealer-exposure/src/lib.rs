pub mod analytics;
pub mod data;
pub mod exposure;
pub mod pricing;
pub mod projection;

// Re-export commonly used types
pub use analytics::{ChainAnalysis, FlowMetrics, GammaFlipZone, KeyLevels, RegimeAssessment};
pub use data::{ChainSource, OptionLegQuote, OptionType, RawOptionChain, SnapshotFile, StrikeQuote};
pub use exposure::{
    ChainOutcome, ChainSnapshot, ExposureAggregator, ExposureConfig, ExposureTable, NoDataReason,
    StrikeExposureRow,
};
pub use pricing::{BlackScholes, LegGreeks};
pub use projection::{project_ladder, ProjectedTable, TimeProjection};
