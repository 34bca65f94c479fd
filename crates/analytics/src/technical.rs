use crate::error::AnalyticsError;
use crate::indicators::{moving_average, relative_strength, DEFAULT_RSI_WINDOW};
use crate::report::{Explain, TechnicalReport};
use core_types::{TimeSeries, TrendRegime};

pub const SMA_FAST_WINDOW: usize = 50;
pub const SMA_SLOW_WINDOW: usize = 200;

/// Scores the trend regime and momentum of a normalized series.
pub fn technical_report(series: &TimeSeries) -> Result<TechnicalReport, AnalyticsError> {
    technical_report_from_closes(&series.closes())
}

/// Scores a raw close column.
///
/// Residual `NaN` closes are dropped first. An empty column yields an
/// `unknown` regime with an "insufficient data" note instead of an error.
pub fn technical_report_from_closes(closes: &[f64]) -> Result<TechnicalReport, AnalyticsError> {
    let close: Vec<f64> = closes.iter().copied().filter(|c| !c.is_nan()).collect();

    let Some(&last_close) = close.last() else {
        let mut explain = Explain::new();
        explain.insert("error".to_string(), "insufficient data".into());
        return Ok(TechnicalReport {
            trend_regime: TrendRegime::Unknown,
            rsi14: f64::NAN,
            explain,
        });
    };

    let last_sma50 = last_value(&moving_average(&close, SMA_FAST_WINDOW)?);
    let last_sma200 = last_value(&moving_average(&close, SMA_SLOW_WINDOW)?);
    let rsi14 = last_value(&relative_strength(&close, DEFAULT_RSI_WINDOW)?);

    let trend_regime = if last_sma200.is_nan() {
        TrendRegime::Unknown
    } else if last_close > last_sma200 {
        TrendRegime::Bull
    } else {
        TrendRegime::Bear
    };

    tracing::debug!(
        %trend_regime,
        last_close,
        last_sma50,
        last_sma200,
        rsi14,
        "Technical scoring complete."
    );

    let mut explain = Explain::new();
    explain.insert(
        "trend_regime".to_string(),
        "bull if close > SMA200, bear otherwise; unknown while SMA200 is undefined.".into(),
    );
    explain.insert(
        "rsi14".to_string(),
        "Classic RSI(14) on simple averages (0-100); undefined when the window has no losses.".into(),
    );
    explain.insert("last_close".to_string(), last_close.into());
    explain.insert("last_sma50".to_string(), last_sma50.into());
    explain.insert("last_sma200".to_string(), last_sma200.into());
    if trend_regime == TrendRegime::Unknown {
        explain.insert(
            "note".to_string(),
            format!(
                "insufficient history: {} sessions, SMA200 needs {}",
                close.len(),
                SMA_SLOW_WINDOW
            )
            .into(),
        );
    }

    Ok(TechnicalReport {
        trend_regime,
        rsi14,
        explain,
    })
}

fn last_value(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(f64::NAN)
}
