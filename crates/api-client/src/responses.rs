use crate::error::ApiError;
use core_types::{RawSeries, RawTimestamp};
use serde::Deserialize;
use std::collections::HashMap;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// The top-level body of `GET /v8/finance/chart/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartErrorBody>,
}

/// The error object Yahoo embeds in the envelope, e.g. `{"code": "Not Found", ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartErrorBody {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub events: Option<ChartEvents>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartEvents {
    /// Keyed by the ex-date as a Unix-seconds string.
    #[serde(default)]
    pub dividends: HashMap<String, DividendEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjCloseColumn {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Converts the envelope into the provider-agnostic `RawSeries`.
    ///
    /// Columns Yahoo omitted are left out rather than filled, so the
    /// normalizer applies its own defaults. Dividends are placed on the row
    /// whose timestamp matches the event date and are `0.0` elsewhere.
    pub fn into_raw_series(self, symbol: &str) -> Result<RawSeries, ApiError> {
        if let Some(err) = self.chart.error {
            return Err(classify_chart_error(symbol, err));
        }

        let result = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ApiError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no chart result returned".to_string(),
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        if timestamps.is_empty() {
            return Err(ApiError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no rows in the requested period".to_string(),
            });
        }

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let mut series = RawSeries::new(symbol)
            .with_index(timestamps.iter().map(|t| RawTimestamp::Unix(*t)).collect());

        for (name, values) in [
            ("Open", quote.open),
            ("High", quote.high),
            ("Low", quote.low),
            ("Close", quote.close),
            ("Volume", quote.volume),
        ] {
            if !values.is_empty() {
                series = series.with_column(name, values);
            }
        }

        if let Some(adj) = result.indicators.adjclose.into_iter().next() {
            if !adj.adjclose.is_empty() {
                series = series.with_column("Adj Close", adj.adjclose);
            }
        }

        let events = result.events.unwrap_or_default();
        if !events.dividends.is_empty() {
            let by_date: HashMap<i64, f64> = events
                .dividends
                .into_values()
                .map(|d| (d.date, d.amount))
                .collect();
            let dividends = timestamps
                .iter()
                .map(|t| Some(by_date.get(t).copied().unwrap_or(0.0)))
                .collect();
            series = series.with_column("Dividends", dividends);
        }

        Ok(series)
    }
}

fn classify_chart_error(symbol: &str, err: ChartErrorBody) -> ApiError {
    let reason = err.description.unwrap_or_else(|| err.code.clone());
    if err.code.eq_ignore_ascii_case("Not Found") {
        ApiError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        }
    } else {
        ApiError::ApiError(format!("{}: {}", err.code, reason))
    }
}
