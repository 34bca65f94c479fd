use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No price data available for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<CoreError> for AnalyticsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DataUnavailable { symbol, reason } => {
                AnalyticsError::DataUnavailable { symbol, reason }
            }
            CoreError::InvalidSeries(msg) => AnalyticsError::InvalidSeries(msg),
            CoreError::InvalidInput(field, reason) => {
                AnalyticsError::InvalidParameter(format!("{}: {}", field, reason))
            }
        }
    }
}
