use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("No price data available for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
