use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ProviderConfig;
use core_types::{Interval, Period, RawSeries};
use reqwest::Url;
use std::time::Duration;

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::ChartResponse;

/// The abstract interface for an upstream daily price-history provider.
/// The analyzer depends only on this trait, so the underlying implementation
/// (live or in-memory) can be swapped out.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Fetches the raw daily history for `symbol` over `period`.
    ///
    /// Unknown symbols and empty results are reported as
    /// `ApiError::DataUnavailable`.
    async fn fetch_price_history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<RawSeries, ApiError>;
}

/// A concrete implementation of `PriceHistorySource` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ApiError::InvalidData(format!("invalid provider base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidData(format!(
                "provider base_url '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Builds `{base}/v8/finance/chart/{symbol}?range=..&interval=..&events=div`.
    fn chart_url(&self, symbol: &str, period: Period, interval: Interval) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url.query_pairs_mut()
            .append_pair("range", period.as_str())
            .append_pair("interval", interval.as_str())
            .append_pair("events", "div")
            .append_pair("includeAdjustedClose", "true");
        url
    }
}

#[async_trait]
impl PriceHistorySource for YahooClient {
    async fn fetch_price_history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<RawSeries, ApiError> {
        let url = self.chart_url(symbol, period, interval);
        tracing::debug!(%symbol, %period, url = %url, "Fetching price history.");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let series = parse_chart_response(symbol, status.as_u16(), &text)?;
        tracing::debug!(%symbol, rows = series.index.len(), "Price history received.");
        Ok(series)
    }
}

/// Interprets a chart response body.
///
/// Yahoo reports unknown symbols as HTTP 404 with a JSON error envelope, so
/// the body is inspected before the status code.
pub fn parse_chart_response(symbol: &str, status: u16, body: &str) -> Result<RawSeries, ApiError> {
    match serde_json::from_str::<ChartResponse>(body) {
        Ok(parsed) => parsed.into_raw_series(symbol),
        Err(_) if !(200..300).contains(&status) => Err(ApiError::ApiError(format!(
            "HTTP {} for {}: {}",
            status,
            symbol,
            body.chars().take(200).collect::<String>()
        ))),
        Err(e) => Err(ApiError::Deserialization(e.to_string())),
    }
}
