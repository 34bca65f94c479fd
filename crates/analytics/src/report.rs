use chrono::{DateTime, Utc};
use core_types::{serde_nan, AssetId, Interval, Period, TrendRegime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single entry of an `explain` map: either a note or the number it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplainValue {
    Number(#[serde(with = "serde_nan")] f64),
    Text(String),
}

impl ExplainValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExplainValue::Number(v) => Some(*v),
            ExplainValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExplainValue::Text(s) => Some(s),
            ExplainValue::Number(_) => None,
        }
    }
}

impl From<f64> for ExplainValue {
    fn from(value: f64) -> Self {
        ExplainValue::Number(value)
    }
}

impl From<&str> for ExplainValue {
    fn from(value: &str) -> Self {
        ExplainValue::Text(value.to_string())
    }
}

impl From<String> for ExplainValue {
    fn from(value: String) -> Self {
        ExplainValue::Text(value)
    }
}

/// Field name -> human-readable derivation note or the value it was derived from.
pub type Explain = BTreeMap<String, ExplainValue>;

/// Annualized return and risk statistics of a close series.
///
/// Any metric may be `NaN` when the history is too short or has no
/// variance. `NaN` is a result, not a failure, and is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantReport {
    #[serde(with = "serde_nan")]
    pub cagr: f64,
    #[serde(with = "serde_nan")]
    pub vol_annual: f64,
    #[serde(with = "serde_nan")]
    pub sharpe: f64,
    #[serde(with = "serde_nan")]
    pub max_drawdown: f64,
    pub explain: Explain,
}

/// Trend regime and latest oscillator reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReport {
    pub trend_regime: TrendRegime,
    #[serde(with = "serde_nan")]
    pub rsi14: f64,
    pub explain: Explain,
}

/// Facts about the request and the series that was actually analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub period: Period,
    pub interval: Interval,
    /// Row count of the normalized series.
    pub rows: usize,
    pub rf_annual: f64,
    pub first_date: DateTime<Utc>,
    pub last_date: DateTime<Utc>,
}

/// The complete, explainable analysis of one asset.
///
/// Built once per request and never mutated afterwards. Serializes to a plain
/// nested mapping, with `NaN` written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAnalysis {
    pub asset: AssetId,
    pub quant: QuantReport,
    pub technical: TechnicalReport,
    /// Generation instant, serialized as ISO-8601 UTC.
    pub asof: DateTime<Utc>,
    pub metadata: AnalysisMetadata,
}
