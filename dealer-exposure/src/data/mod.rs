pub mod snapshot;
pub mod source;
pub mod types;

pub use snapshot::{
    parse_strike_label, RawLeg, RawOptionChain, RawStrike, SnapshotError, MAX_CONTRACTS,
};
pub use source::{ChainSource, SnapshotFile};
pub use types::{OptionLegQuote, OptionType, StrikeQuote};
