//! Stateless windowed transforms over a price column.
//!
//! Every function returns a vector aligned with its input: position `i` of
//! the output describes position `i` of the input and only looks at indices
//! `..=i`. `NaN` marks positions without enough history.

use crate::error::AnalyticsError;
use std::iter;

/// Look-back of the classic relative strength oscillator.
pub const DEFAULT_RSI_WINDOW: usize = 14;

fn check_window(window: usize, name: &str) -> Result<(), AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "{} window must be at least 1",
            name
        )));
    }
    Ok(())
}

/// Simple moving average over a trailing window of `window` observations.
///
/// The first `window - 1` positions are `NaN`. A window that contains a
/// `NaN` produces `NaN`.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<f64>, AnalyticsError> {
    check_window(window, "moving average")?;

    let warmup = (window - 1).min(values.len());
    let mut out = vec![f64::NAN; warmup];
    out.extend(
        values
            .windows(window)
            .map(|w| w.iter().sum::<f64>() / window as f64),
    );
    Ok(out)
}

/// Relative strength oscillator (RSI) using simple averages of gains and losses.
///
/// Positions before `window` are `NaN` since the first difference is
/// undefined. When the average loss over a window is exactly zero the ratio
/// is undefined and the oscillator is reported as `NaN`, not 100. Callers
/// must read `NaN` as "oscillator undefined".
pub fn relative_strength(values: &[f64], window: usize) -> Result<Vec<f64>, AnalyticsError> {
    check_window(window, "relative strength")?;

    let deltas: Vec<f64> = iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .take(values.len())
        .collect();

    let gains: Vec<f64> = deltas
        .iter()
        .map(|&d| if d.is_nan() { f64::NAN } else { d.max(0.0) })
        .collect();
    let losses: Vec<f64> = deltas
        .iter()
        .map(|&d| if d.is_nan() { f64::NAN } else { (-d).max(0.0) })
        .collect();

    let avg_gain = moving_average(&gains, window)?;
    let avg_loss = moving_average(&losses, window)?;

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| {
            if loss == 0.0 || loss.is_nan() {
                return f64::NAN;
            }
            let ratio = gain / loss;
            100.0 - 100.0 / (1.0 + ratio)
        })
        .collect())
}
