use analytics::AnalyticsError;
use api_client::error::ApiError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The source had nothing for the symbol, or nothing survived normalization.
    #[error("No price data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Price source error: {0}")]
    Source(ApiError),
}

// The conversions are written out by hand so that "no data" from any layer
// lands in the same variant.

impl From<ApiError> for AnalyzerError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::DataUnavailable { symbol, reason } => {
                AnalyzerError::DataUnavailable { symbol, reason }
            }
            other => AnalyzerError::Source(other),
        }
    }
}

impl From<AnalyticsError> for AnalyzerError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::DataUnavailable { symbol, reason } => {
                AnalyzerError::DataUnavailable { symbol, reason }
            }
            AnalyticsError::InvalidSeries(msg) => AnalyzerError::InvalidSeries(msg),
            AnalyticsError::InvalidParameter(msg) => AnalyzerError::InvalidInput(msg),
        }
    }
}

impl From<CoreError> for AnalyzerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DataUnavailable { symbol, reason } => {
                AnalyzerError::DataUnavailable { symbol, reason }
            }
            CoreError::InvalidSeries(msg) => AnalyzerError::InvalidSeries(msg),
            CoreError::InvalidInput(field, reason) => {
                AnalyzerError::InvalidInput(format!("{}: {}", field, reason))
            }
        }
    }
}
