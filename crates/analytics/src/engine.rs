use crate::error::AnalyticsError;
use crate::normalizer::normalize;
use crate::performance::quant_report;
use crate::report::{AnalysisMetadata, AssetAnalysis};
use crate::technical::technical_report;
use chrono::{DateTime, Utc};
use core_types::{AssetId, Interval, Period, RawSeries, TimeSeries};

/// The request-level inputs of one analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub period: Period,
    pub interval: Interval,
    /// Annual risk-free rate used by the Sharpe ratio (0.05 = 5%).
    pub rf_annual: f64,
}

impl AnalysisParams {
    /// Rejects parameters no analysis can be computed with.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        // (1 + rf) must be positive for the daily conversion to be defined.
        if !self.rf_annual.is_finite() || self.rf_annual <= -1.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "risk-free rate must be a finite number above -1, got {}",
                self.rf_annual
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            period: Period::default(),
            interval: Interval::default(),
            rf_annual: 0.0,
        }
    }
}

/// A stateless composer that turns a price series into an `AssetAnalysis`.
///
/// It performs no I/O: the caller fetches the raw series and supplies the
/// `asof` instant, which keeps every call reproducible.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point: normalize, then score.
    ///
    /// # Arguments
    ///
    /// * `asset` - The identified asset (symbol and derived market).
    /// * `raw` - The series exactly as the upstream source returned it.
    /// * `params` - Period, interval and risk-free rate of the request.
    /// * `asof` - The generation instant to stamp on the result.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AssetAnalysis` or an `AnalyticsError`.
    pub fn analyze(
        &self,
        asset: AssetId,
        raw: &RawSeries,
        params: &AnalysisParams,
        asof: DateTime<Utc>,
    ) -> Result<AssetAnalysis, AnalyticsError> {
        let series = normalize(raw)?;
        self.analyze_series(asset, &series, params, asof)
    }

    /// Scores an already normalized series.
    pub fn analyze_series(
        &self,
        asset: AssetId,
        series: &TimeSeries,
        params: &AnalysisParams,
        asof: DateTime<Utc>,
    ) -> Result<AssetAnalysis, AnalyticsError> {
        params.validate()?;

        let closes = series.closes();
        let quant = quant_report(&closes, params.rf_annual);
        let technical = technical_report(series)?;

        let metadata = AnalysisMetadata {
            period: params.period,
            interval: params.interval,
            rows: series.len(),
            rf_annual: params.rf_annual,
            first_date: series.first().date,
            last_date: series.last().date,
        };

        tracing::debug!(
            symbol = %asset.symbol,
            rows = metadata.rows,
            regime = %technical.trend_regime,
            "Analysis composed."
        );

        Ok(AssetAnalysis {
            asset,
            quant,
            technical,
            asof,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{Market, RawTimestamp, TrendRegime};

    fn raw_series(symbol: &str, closes: &[Option<f64>]) -> RawSeries {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().timestamp();
        let index = (0..closes.len())
            .map(|i| RawTimestamp::Unix(start + i as i64 * 86_400))
            .collect();
        RawSeries::new(symbol)
            .with_index(index)
            .with_column("Close", closes.to_vec())
    }

    #[test]
    fn composes_reports_and_metadata() {
        let closes: Vec<Option<f64>> = (0..300)
            .map(|i| if i == 10 { None } else { Some(100.0 + i as f64) })
            .collect();
        let raw = raw_series("AAPL", &closes);
        let asof = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let params = AnalysisParams {
            rf_annual: 0.02,
            ..Default::default()
        };

        let analysis = AnalyticsEngine::new()
            .analyze(AssetId::new("AAPL").unwrap(), &raw, &params, asof)
            .unwrap();

        assert_eq!(analysis.asset.market, Market::Us);
        assert_eq!(analysis.metadata.rows, 299);
        assert_eq!(analysis.metadata.period, Period::FiveYears);
        assert_eq!(analysis.metadata.rf_annual, 0.02);
        assert_eq!(analysis.asof, asof);
        assert_eq!(analysis.technical.trend_regime, TrendRegime::Bull);
        assert_eq!(analysis.quant.max_drawdown, 0.0);
        assert!(analysis.quant.cagr.is_finite());
        assert!(analysis.quant.vol_annual.is_finite());
    }

    #[test]
    fn unusable_series_is_unavailable() {
        let raw = raw_series("KNRI11", &[None, None]);
        let err = AnalyticsEngine::new()
            .analyze(
                AssetId::new("KNRI11").unwrap(),
                &raw,
                &AnalysisParams::default(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
    }

    #[test]
    fn single_row_yields_nan_metrics_not_errors() {
        let raw = raw_series("PETR4.SA", &[Some(30.0)]);
        let analysis = AnalyticsEngine::new()
            .analyze(
                AssetId::new("PETR4.SA").unwrap(),
                &raw,
                &AnalysisParams::default(),
                Utc::now(),
            )
            .unwrap();
        assert!(analysis.quant.cagr.is_nan());
        assert!(analysis.quant.vol_annual.is_nan());
        assert!(analysis.quant.sharpe.is_nan());
        assert_eq!(analysis.quant.max_drawdown, 0.0);
        assert_eq!(analysis.technical.trend_regime, TrendRegime::Unknown);
        assert_eq!(analysis.metadata.rows, 1);
    }

    #[test]
    fn rejects_risk_free_rate_at_or_below_minus_one() {
        let raw = raw_series("AAPL", &[Some(1.0), Some(2.0)]);
        let params = AnalysisParams {
            rf_annual: -1.0,
            ..Default::default()
        };
        let err = AnalyticsEngine::new()
            .analyze(AssetId::new("AAPL").unwrap(), &raw, &params, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
    }

    #[test]
    fn params_validation_accepts_negative_rates_above_minus_one() {
        let mut params = AnalysisParams {
            rf_annual: -0.5,
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        params.rf_annual = f64::NAN;
        assert!(params.validate().is_err());
        params.rf_annual = f64::INFINITY;
        assert!(params.validate().is_err());
    }
}
