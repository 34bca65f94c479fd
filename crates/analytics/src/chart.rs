//! Indicator columns for charting.
//!
//! The reports only carry the latest indicator values. Charts need the whole
//! series, so the indicator library is re-applied here on the normalized
//! series, outside of `AssetAnalysis`.

use crate::error::AnalyticsError;
use crate::indicators::{moving_average, relative_strength, DEFAULT_RSI_WINDOW};
use chrono::{DateTime, Utc};
use core_types::{serde_nan, TimeSeries};
use serde::Serialize;

pub const SMA_SHORT_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: DateTime<Utc>,
    pub close: f64,
    #[serde(with = "serde_nan")]
    pub sma20: f64,
    #[serde(with = "serde_nan")]
    pub sma50: f64,
    #[serde(with = "serde_nan")]
    pub sma200: f64,
    #[serde(with = "serde_nan")]
    pub rsi14: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub rows: Vec<ChartRow>,
}

impl ChartFrame {
    /// The last `n` rows (or all of them if there are fewer).
    pub fn tail(&self, n: usize) -> &[ChartRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}

/// Augments the close column with `sma20`, `sma50`, `sma200` and `rsi14`.
pub fn chart_frame(series: &TimeSeries) -> Result<ChartFrame, AnalyticsError> {
    let close = series.closes();
    let sma20 = moving_average(&close, SMA_SHORT_WINDOW)?;
    let sma50 = moving_average(&close, crate::technical::SMA_FAST_WINDOW)?;
    let sma200 = moving_average(&close, crate::technical::SMA_SLOW_WINDOW)?;
    let rsi14 = relative_strength(&close, DEFAULT_RSI_WINDOW)?;

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| ChartRow {
            date: bar.date,
            close: bar.close,
            sma20: sma20[i],
            sma50: sma50[i],
            sma200: sma200[i],
            rsi14: rsi14[i],
        })
        .collect();

    Ok(ChartFrame { rows })
}
