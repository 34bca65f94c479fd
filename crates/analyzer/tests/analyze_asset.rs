use analytics::AssetAnalysis;
use analyzer::{save_best_effort, Analyzer, AnalyzerError};
use api_client::error::ApiError;
use api_client::PriceHistorySource;
use async_trait::async_trait;
use core_types::{Interval, Market, Period, RawSeries, RawTimestamp, TrendRegime};
use database::{AnalysisStore, DbError};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const DAY: i64 = 86_400;
const START: i64 = 1_546_300_800; // 2019-01-01T00:00:00Z

/// Serves a canned series and records every symbol it was asked for.
struct InMemorySource {
    series: Option<RawSeries>,
    requests: Mutex<Vec<(String, Period)>>,
}

impl InMemorySource {
    fn with(series: RawSeries) -> Self {
        Self {
            series: Some(series),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self {
            series: None,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PriceHistorySource for InMemorySource {
    async fn fetch_price_history(
        &self,
        symbol: &str,
        period: Period,
        _interval: Interval,
    ) -> Result<RawSeries, ApiError> {
        self.requests.lock().unwrap().push((symbol.to_string(), period));
        match &self.series {
            Some(series) => Ok(series.clone()),
            None => Err(ApiError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "not listed".to_string(),
            }),
        }
    }
}

struct FailingStore;

#[async_trait]
impl AnalysisStore for FailingStore {
    async fn save_analysis(&self, _user_id: &str, _analysis: &AssetAnalysis) -> Result<Uuid, DbError> {
        Err(DbError::ConnectionConfigError("database offline".to_string()))
    }
}

struct RecordingStore {
    saved: Mutex<Vec<String>>,
}

#[async_trait]
impl AnalysisStore for RecordingStore {
    async fn save_analysis(&self, user_id: &str, analysis: &AssetAnalysis) -> Result<Uuid, DbError> {
        self.saved
            .lock()
            .unwrap()
            .push(format!("{}:{}", user_id, analysis.asset.symbol));
        Ok(Uuid::new_v4())
    }
}

/// Five years of steadily rising closes with a small oscillation, so both
/// gains and losses appear in every RSI window.
fn five_year_series(symbol: &str) -> RawSeries {
    let n = 1_260;
    let index = (0..n).map(|i| RawTimestamp::Unix(START + i as i64 * DAY)).collect();
    let close: Vec<Option<f64>> = (0..n)
        .map(|i| {
            let t = i as f64;
            Some(100.0 * (0.001 * t).exp() * (1.0 + 0.01 * (t / 3.0).sin()))
        })
        .collect();
    RawSeries::new(symbol)
        .with_index(index)
        .with_column("Close", close.clone())
        .with_column("adj_close", close)
}

#[tokio::test]
async fn analyzes_five_years_of_history() {
    let source = Arc::new(InMemorySource::with(five_year_series("PETR4.SA")));
    let analyzer = Analyzer::new(source.clone());

    let analysis = analyzer
        .analyze_asset("  petr4.sa ", 0.05, Period::FiveYears)
        .await
        .unwrap();

    let requests = source.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![("PETR4.SA".to_string(), Period::FiveYears)]);

    assert_eq!(analysis.asset.symbol, "PETR4.SA");
    assert_eq!(analysis.asset.market, Market::Br);
    assert_eq!(analysis.metadata.rows, 1_260);
    assert_eq!(analysis.metadata.period, Period::FiveYears);
    assert_eq!(analysis.metadata.rf_annual, 0.05);

    assert_eq!(analysis.technical.trend_regime, TrendRegime::Bull);
    assert!(analysis.technical.rsi14 >= 0.0 && analysis.technical.rsi14 <= 100.0);
    assert!(analysis.quant.cagr > 0.0);
    assert!(analysis.quant.vol_annual > 0.0);
    assert!(analysis.quant.sharpe.is_finite());
    assert!(analysis.quant.max_drawdown <= 0.0 && analysis.quant.max_drawdown > -1.0);

    for key in ["cagr", "vol_annual", "sharpe", "max_drawdown"] {
        assert!(analysis.quant.explain.contains_key(key), "missing explain for {key}");
    }
}

#[tokio::test]
async fn unknown_symbol_is_data_unavailable() {
    let analyzer = Analyzer::new(Arc::new(InMemorySource::empty()));
    let err = analyzer
        .analyze_asset("NOPE", 0.0, Period::OneYear)
        .await
        .unwrap_err();
    match err {
        AnalyzerError::DataUnavailable { symbol, .. } => assert_eq!(symbol, "NOPE"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn all_null_closes_are_data_unavailable() {
    let raw = RawSeries::new("MXRF11.SA")
        .with_index(vec![RawTimestamp::Unix(START), RawTimestamp::Unix(START + DAY)])
        .with_column("Close", vec![None, None]);
    let analyzer = Analyzer::new(Arc::new(InMemorySource::with(raw)));
    let err = analyzer
        .analyze_asset("MXRF11.SA", 0.0, Period::OneYear)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::DataUnavailable { .. }));
}

#[tokio::test]
async fn blank_symbol_is_rejected_before_fetching() {
    let source = Arc::new(InMemorySource::empty());
    let analyzer = Analyzer::new(source.clone());
    let err = analyzer
        .analyze_asset("   ", 0.0, Period::OneYear)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    assert!(source.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_risk_free_rate_is_rejected_before_fetching() {
    let source = Arc::new(InMemorySource::with(five_year_series("AAPL")));
    let analyzer = Analyzer::new(source.clone());

    for rf in [-1.0, -2.5, f64::NAN, f64::INFINITY] {
        let err = analyzer
            .analyze_asset("AAPL", rf, Period::OneYear)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)), "rf {rf}: {err:?}");
    }
    assert!(source.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn short_history_keeps_nan_metrics_and_unknown_regime() {
    let raw = RawSeries::new("AAPL")
        .with_index(vec![RawTimestamp::Unix(START)])
        .with_column("Close", vec![Some(190.0)]);
    let analyzer = Analyzer::new(Arc::new(InMemorySource::with(raw)));

    let analysis = analyzer
        .analyze_asset("AAPL", 0.0, Period::OneYear)
        .await
        .unwrap();

    assert_eq!(analysis.technical.trend_regime, TrendRegime::Unknown);
    assert!(analysis.quant.cagr.is_nan());
    assert!(analysis.quant.sharpe.is_nan());

    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json["quant"]["cagr"].is_null());
    assert_eq!(json["technical"]["trend_regime"], "unknown");
}

#[tokio::test]
async fn chart_series_has_one_row_per_session() {
    let source = Arc::new(InMemorySource::with(five_year_series("AAPL")));
    let frame = Analyzer::new(source)
        .chart_series("aapl", Period::FiveYears)
        .await
        .unwrap();

    assert_eq!(frame.rows.len(), 1_260);
    assert!(frame.rows[0].sma20.is_nan());
    let last = frame.tail(1)[0].clone();
    assert!(last.sma20.is_finite() && last.sma50.is_finite() && last.sma200.is_finite());
}

#[tokio::test]
async fn failing_store_does_not_fail_the_analysis() {
    let analyzer = Analyzer::new(Arc::new(InMemorySource::with(five_year_series("VALE3.SA"))));
    let analysis = analyzer
        .analyze_asset("VALE3.SA", 0.0, Period::FiveYears)
        .await
        .unwrap();

    assert_eq!(save_best_effort(&FailingStore, "user-1", &analysis).await, None);

    let store = RecordingStore {
        saved: Mutex::new(Vec::new()),
    };
    assert!(save_best_effort(&store, "user-1", &analysis).await.is_some());
    assert_eq!(*store.saved.lock().unwrap(), vec!["user-1:VALE3.SA".to_string()]);
}

#[tokio::test]
async fn concurrent_analyses_share_one_analyzer() {
    let analyzer = Analyzer::new(Arc::new(InMemorySource::with(five_year_series("ITUB4.SA"))));
    let (a, b) = tokio::join!(
        analyzer.analyze_asset("ITUB4.SA", 0.0, Period::FiveYears),
        analyzer.analyze_asset("ITUB4.SA", 0.1, Period::FiveYears),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.quant.cagr, b.quant.cagr);
    assert!(a.quant.sharpe > b.quant.sharpe);
}
