//! # Quantlens Analyzer
//!
//! The orchestration layer: fetch one price history, hand it to the pure
//! `AnalyticsEngine`, and return an `AssetAnalysis`. Persistence is a separate,
//! best-effort step in `persistence`.

use analytics::{chart_frame, normalize, AnalysisParams, AnalyticsEngine, AssetAnalysis, ChartFrame};
use api_client::PriceHistorySource;
use chrono::Utc;
use core_types::{AssetId, Interval, Period, RawSeries};
use std::sync::Arc;

pub mod error;
pub mod persistence;

pub use error::AnalyzerError;
pub use persistence::save_best_effort;

/// The main analysis service.
///
/// Holds no per-request state, so a single instance can serve many
/// concurrent `analyze_asset` calls.
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn PriceHistorySource>,
    engine: Arc<AnalyticsEngine>,
}

impl Analyzer {
    pub fn new(source: Arc<dyn PriceHistorySource>) -> Self {
        Self {
            source,
            engine: Arc::new(AnalyticsEngine::new()),
        }
    }

    /// Produces the full analysis of one symbol.
    ///
    /// The symbol is trimmed and uppercased before the fetch; the result is
    /// stamped with the current instant.
    pub async fn analyze_asset(
        &self,
        symbol: &str,
        rf_annual: f64,
        period: Period,
    ) -> Result<AssetAnalysis, AnalyzerError> {
        // 1. Identify
        let asset = AssetId::new(symbol)?;
        let params = AnalysisParams {
            period,
            interval: Interval::OneDay,
            rf_annual,
        };
        params.validate()?;

        // 2. Fetch
        let raw = self.fetch(&asset, period).await?;

        // 3. Score
        let analysis = self.engine.analyze(asset, &raw, &params, Utc::now())?;

        tracing::info!(
            symbol = %analysis.asset.symbol,
            market = %analysis.asset.market,
            rows = analysis.metadata.rows,
            regime = %analysis.technical.trend_regime,
            "Asset analyzed."
        );
        Ok(analysis)
    }

    /// Fetches the series and returns the per-row indicator frame used for charts.
    pub async fn chart_series(&self, symbol: &str, period: Period) -> Result<ChartFrame, AnalyzerError> {
        let asset = AssetId::new(symbol)?;
        let raw = self.fetch(&asset, period).await?;
        let series = normalize(&raw)?;
        Ok(chart_frame(&series)?)
    }

    async fn fetch(&self, asset: &AssetId, period: Period) -> Result<RawSeries, AnalyzerError> {
        tracing::debug!(symbol = %asset.symbol, %period, "Requesting price history.");
        let raw = self
            .source
            .fetch_price_history(&asset.symbol, period, Interval::OneDay)
            .await?;
        Ok(raw)
    }
}
