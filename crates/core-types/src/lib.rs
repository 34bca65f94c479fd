pub mod enums;
pub mod error;
pub mod serde_nan;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Interval, Market, Period, TrendRegime};
pub use error::CoreError;
pub use structs::{
    normalize_symbol, AssetId, PriceBar, RawColumn, RawSeries, RawTimestamp, TimeSeries,
};
