//! Return and risk statistics of a close series.
//!
//! All functions are pure and follow pandas conventions: sample standard
//! deviation (n - 1), and `NaN` rather than an error when a statistic is
//! undefined.

use crate::report::{Explain, QuantReport};

/// Sessions per trading year used for annualization.
pub const TRADING_DAYS: usize = 252;

/// Simple percentage change between consecutive closes.
///
/// The first observation has no predecessor and is dropped, so the result
/// has `len - 1` entries (empty for fewer than two closes).
pub fn daily_returns(close: &[f64]) -> Vec<f64> {
    close.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Compound annual growth rate implied by the daily returns of `close`.
///
/// Very short series annualize a handful of sessions and are unreliable;
/// the value is still returned as computed.
pub fn cagr(close: &[f64]) -> f64 {
    let returns = daily_returns(close);
    if returns.is_empty() {
        return f64::NAN;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    let years = returns.len() as f64 / TRADING_DAYS as f64;
    growth.powf(1.0 / years) - 1.0
}

/// Annualized volatility: sample standard deviation of returns times sqrt(252).
pub fn vol_annual(returns: &[f64]) -> f64 {
    sample_std(returns) * (TRADING_DAYS as f64).sqrt()
}

/// Standard deviations of daily returns at or below this are rounding noise.
///
/// Returns are differences of price ratios close to 1, so their rounding
/// error is on the order of `f64::EPSILON` whatever the return level.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Annualized Sharpe ratio of daily returns over an annual risk-free rate.
///
/// Returns `NaN` when the excess returns have zero or undefined variance,
/// including a constant return whose computed deviation is only rounding noise.
pub fn sharpe(returns: &[f64], rf_annual: f64) -> f64 {
    let rf_daily = (1.0 + rf_annual).powf(1.0 / TRADING_DAYS as f64) - 1.0;
    let excess: Vec<f64> = returns.iter().map(|r| r - rf_daily).collect();

    let denom = sample_std(&excess);
    if denom.is_nan() || denom <= ZERO_VARIANCE_TOLERANCE {
        return f64::NAN;
    }
    mean(&excess) / denom * (TRADING_DAYS as f64).sqrt()
}

/// Worst peak-to-trough relative decline of `close` (a value <= 0).
pub fn max_drawdown(close: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = f64::NAN;
    for &price in close {
        peak = peak.max(price);
        let drawdown = price / peak - 1.0;
        if worst.is_nan() || drawdown < worst {
            worst = drawdown;
        }
    }
    worst
}

/// Builds the quantitative report for a close series.
pub fn quant_report(close: &[f64], rf_annual: f64) -> QuantReport {
    let returns = daily_returns(close);

    let mut explain = Explain::new();
    explain.insert(
        "cagr".to_string(),
        "Compounded product of daily returns (1 + r), annualized over 252 sessions.".into(),
    );
    explain.insert(
        "vol_annual".to_string(),
        "Sample standard deviation of daily returns, annualized by sqrt(252).".into(),
    );
    explain.insert(
        "sharpe".to_string(),
        "(mean(R - Rf) / stdev(R - Rf)) * sqrt(252), with Rf the daily equivalent of the annual rate."
            .into(),
    );
    explain.insert(
        "max_drawdown".to_string(),
        "Worst peak-to-trough decline of the close over the period.".into(),
    );

    QuantReport {
        cagr: cagr(close),
        vol_annual: vol_annual(&returns),
        sharpe: sharpe(&returns, rf_annual),
        max_drawdown: max_drawdown(close),
        explain,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation. `NaN` below two values; exactly `0.0` when all
/// values are identical, regardless of rounding in the mean.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    if values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_enough(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn daily_returns_drop_the_first_observation() {
        let close = [100.0, 110.0, 99.0, 121.0];
        let rets = daily_returns(&close);
        assert_eq!(rets.len(), close.len() - 1);
        assert!(close_enough(rets[0], 0.1));
        assert!(close_enough(rets[1], -0.1));
        assert!(daily_returns(&[100.0]).is_empty());
        assert!(daily_returns(&[]).is_empty());
    }

    #[test]
    fn max_drawdown_of_reference_sequence() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 95.0, 80.0, 130.0]);
        assert!(close_enough(dd, 80.0 / 120.0 - 1.0));
    }

    #[test]
    fn max_drawdown_of_non_decreasing_series_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 1.0, 2.0, 3.0, 3.0]), 0.0);
        assert!(max_drawdown(&[]).is_nan());
    }

    #[test]
    fn cagr_annualizes_total_growth() {
        // 252 returns that double the price => exactly one year, 100% growth.
        let daily = 2f64.powf(1.0 / 252.0);
        let close: Vec<f64> = (0..=252).map(|i| 100.0 * daily.powi(i)).collect();
        assert!((cagr(&close) - 1.0).abs() < 1e-6);
        assert!(cagr(&[100.0]).is_nan());
    }

    #[test]
    fn volatility_is_undefined_for_short_history() {
        assert!(vol_annual(&[]).is_nan());
        assert!(vol_annual(&[0.01]).is_nan());
        let vol = vol_annual(&[0.01, -0.01]);
        let expected = (0.0002f64).sqrt() * (252f64).sqrt();
        assert!(close_enough(vol, expected));
    }

    #[test]
    fn sharpe_is_nan_for_constant_excess_returns() {
        // Doubling every session: every return is exactly 1.0.
        let close: Vec<f64> = (0..10).map(|i| 2f64.powi(i)).collect();
        assert!(sharpe(&daily_returns(&close), 0.0).is_nan());

        // Constant return equal to the risk-free rate.
        let returns = vec![0.0004; 30];
        let rf_annual = 1.0004f64.powi(252) - 1.0;
        assert!(sharpe(&returns, rf_annual).is_nan());

        // Flat prices.
        assert!(sharpe(&daily_returns(&[5.0; 20]), 0.0).is_nan());
    }

    #[test]
    fn sharpe_is_nan_for_geometric_closes_despite_rounding() {
        // 0.1% growth per session: returns are constant up to ~1e-15 noise.
        let close: Vec<f64> = (0..300).map(|i| 100.0 * 1.001f64.powi(i)).collect();
        let returns = daily_returns(&close);
        let rf_matching = 1.001f64.powi(252) - 1.0;

        assert!(sharpe(&returns, rf_matching).is_nan());
        assert!(sharpe(&returns, 0.0).is_nan());
        assert!(vol_annual(&returns) < 1e-9);
    }

    #[test]
    fn sharpe_stays_finite_for_tiny_but_real_variation() {
        // Returns alternating by one basis point are a real signal, far above the noise floor.
        let returns: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 0.0011 } else { 0.0009 })
            .collect();
        assert!(sharpe(&returns, 0.0).is_finite());
        assert!(sharpe(&returns, 0.0) > 0.0);
    }

    #[test]
    fn sharpe_matches_manual_formula() {
        let returns = [0.01, -0.005, 0.02, 0.0, 0.003];
        let rf_annual = 0.05;
        let rf_daily = 1.05f64.powf(1.0 / 252.0) - 1.0;
        let excess: Vec<f64> = returns.iter().map(|r| r - rf_daily).collect();
        let m = excess.iter().sum::<f64>() / 5.0;
        let sd = (excess.iter().map(|e| (e - m).powi(2)).sum::<f64>() / 4.0).sqrt();
        assert!(close_enough(sharpe(&returns, rf_annual), m / sd * 252f64.sqrt()));
    }

    #[test]
    fn quant_report_explains_every_metric() {
        let report = quant_report(&[100.0, 101.0, 99.0, 102.0], 0.0);
        for key in ["cagr", "vol_annual", "sharpe", "max_drawdown"] {
            assert!(report.explain.contains_key(key), "{key}");
        }
        assert!(report.max_drawdown <= 0.0);
        assert!(report.cagr.is_finite());
    }
}
