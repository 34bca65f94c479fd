//! The single gate between provider data and the engines.
//!
//! Everything downstream of [`normalize`] may assume a non-empty series with
//! a close on every row and strictly increasing UTC dates.

use crate::error::AnalyticsError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_types::{PriceBar, RawSeries, RawTimestamp, TimeSeries};

/// The canonical column schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Open,
    High,
    Low,
    Close,
    AdjustedClose,
    Volume,
    Dividends,
}

impl Column {
    /// Maps a provider column name onto the canonical schema. Matching ignores
    /// case, whitespace, `_` and `-`, so `Adj Close`, `adjclose` and
    /// `adjusted_close` all land on the same column.
    fn from_provider_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "open" => Some(Column::Open),
            "high" => Some(Column::High),
            "low" => Some(Column::Low),
            "close" => Some(Column::Close),
            "adjclose" | "adjustedclose" => Some(Column::AdjustedClose),
            "volume" => Some(Column::Volume),
            "dividends" | "dividend" => Some(Column::Dividends),
            _ => None,
        }
    }
}

/// Canonical columns borrowed from the raw series.
#[derive(Default)]
struct Columns<'a> {
    open: Option<&'a [Option<f64>]>,
    high: Option<&'a [Option<f64>]>,
    low: Option<&'a [Option<f64>]>,
    close: Option<&'a [Option<f64>]>,
    adjusted_close: Option<&'a [Option<f64>]>,
    volume: Option<&'a [Option<f64>]>,
    dividends: Option<&'a [Option<f64>]>,
}

impl<'a> Columns<'a> {
    fn slot(&mut self, column: Column) -> &mut Option<&'a [Option<f64>]> {
        match column {
            Column::Open => &mut self.open,
            Column::High => &mut self.high,
            Column::Low => &mut self.low,
            Column::Close => &mut self.close,
            Column::AdjustedClose => &mut self.adjusted_close,
            Column::Volume => &mut self.volume,
            Column::Dividends => &mut self.dividends,
        }
    }
}

/// Validates and standardizes a raw provider series.
///
/// # Errors
///
/// * `DataUnavailable` if the input has no rows, or none survive the
///   null-close filter.
/// * `InvalidSeries` if there is no close column, a column length does not
///   match the index, or a timestamp cannot be parsed.
pub fn normalize(raw: &RawSeries) -> Result<TimeSeries, AnalyticsError> {
    if raw.is_empty() {
        return Err(AnalyticsError::DataUnavailable {
            symbol: raw.symbol.clone(),
            reason: "the source returned no rows".to_string(),
        });
    }

    let rows = raw.index.len();
    let mut columns = Columns::default();
    for column in &raw.columns {
        let Some(canonical) = Column::from_provider_name(&column.name) else {
            tracing::debug!(column = %column.name, "Ignoring unknown provider column.");
            continue;
        };
        if column.values.len() != rows {
            return Err(AnalyticsError::InvalidSeries(format!(
                "column '{}' has {} values but the index has {} rows",
                column.name,
                column.values.len(),
                rows
            )));
        }
        let slot = columns.slot(canonical);
        if slot.is_none() {
            *slot = Some(column.values.as_slice());
        }
    }

    let close = columns.close.ok_or_else(|| {
        AnalyticsError::InvalidSeries(format!("close column missing for '{}'", raw.symbol))
    })?;

    let value_at = |col: Option<&[Option<f64>]>, i: usize| -> Option<f64> {
        col.and_then(|values| values[i]).filter(|v| !v.is_nan())
    };

    let mut bars = Vec::with_capacity(rows);
    for (i, timestamp) in raw.index.iter().enumerate() {
        let Some(close_value) = close[i].filter(|v| !v.is_nan()) else {
            continue;
        };
        bars.push(PriceBar {
            date: parse_timestamp(timestamp)?,
            open: value_at(columns.open, i).unwrap_or(f64::NAN),
            high: value_at(columns.high, i).unwrap_or(f64::NAN),
            low: value_at(columns.low, i).unwrap_or(f64::NAN),
            close: close_value,
            adjusted_close: value_at(columns.adjusted_close, i).unwrap_or(close_value),
            volume: value_at(columns.volume, i).unwrap_or(f64::NAN),
            dividends: value_at(columns.dividends, i).unwrap_or(0.0),
        });
    }

    let dropped = rows - bars.len();
    if dropped > 0 {
        tracing::debug!(symbol = %raw.symbol, dropped, "Dropped rows with a null close.");
    }

    // Stable sort, then keep the last row of every duplicated date.
    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => deduped.push(bar),
        }
    }

    if deduped.is_empty() {
        return Err(AnalyticsError::DataUnavailable {
            symbol: raw.symbol.clone(),
            reason: "no rows with a close price remain after cleaning".to_string(),
        });
    }

    Ok(TimeSeries::new(deduped)?)
}

fn parse_timestamp(timestamp: &RawTimestamp) -> Result<DateTime<Utc>, AnalyticsError> {
    match timestamp {
        RawTimestamp::Unix(secs) => Utc
            .timestamp_opt(*secs, 0)
            .single()
            .ok_or_else(|| AnalyticsError::InvalidSeries(format!("invalid unix timestamp: {}", secs))),
        RawTimestamp::Text(text) => {
            let text = text.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%:z") {
                return Ok(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| AnalyticsError::InvalidSeries(format!("unparsable date: '{}'", text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(days: &[&str]) -> Vec<RawTimestamp> {
        days.iter().map(|d| RawTimestamp::Text(d.to_string())).collect()
    }

    #[test]
    fn renames_provider_columns_and_backfills_defaults() {
        let raw = RawSeries::new("AAPL")
            .with_index(dates(&["2024-01-02", "2024-01-03"]))
            .with_column("Open", vec![Some(9.0), Some(10.0)])
            .with_column("Close", vec![Some(10.0), Some(11.0)])
            .with_column("Volume", vec![Some(100.0), None])
            .with_column("Stock Splits", vec![Some(0.0), Some(0.0)]);

        let series = normalize(&raw).unwrap();
        assert_eq!(series.len(), 2);
        let first = series.first();
        assert_eq!(first.open, 9.0);
        assert_eq!(first.adjusted_close, 10.0);
        assert_eq!(first.dividends, 0.0);
        assert!(first.high.is_nan());
        assert!(series.last().volume.is_nan());
    }

    #[test]
    fn adjusted_close_aliases_are_recognised() {
        for alias in ["Adj Close", "adjclose", "adj_close", "AdjustedClose"] {
            let raw = RawSeries::new("X")
                .with_index(vec![RawTimestamp::Unix(1_700_000_000)])
                .with_column("close", vec![Some(10.0)])
                .with_column(alias, vec![Some(9.5)]);
            assert_eq!(normalize(&raw).unwrap().first().adjusted_close, 9.5, "{alias}");
        }
    }

    #[test]
    fn drops_null_closes_and_orders_dates() {
        let raw = RawSeries::new("PETR4.SA")
            .with_index(dates(&["2024-01-04", "2024-01-02", "2024-01-03", "2024-01-02"]))
            .with_column("close", vec![Some(4.0), Some(2.0), None, Some(2.5)]);

        let series = normalize(&raw).unwrap();
        // 01-03 dropped (null close); duplicate 01-02 keeps the later row.
        assert_eq!(series.closes(), vec![2.5, 4.0]);
        assert!(series.dates()[0] < series.dates()[1]);
    }

    #[test]
    fn empty_input_is_unavailable() {
        let err = normalize(&RawSeries::new("NOPE")).unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
    }

    #[test]
    fn all_null_closes_are_unavailable() {
        let raw = RawSeries::new("NOPE")
            .with_index(dates(&["2024-01-02", "2024-01-03"]))
            .with_column("close", vec![None, Some(f64::NAN)]);
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
    }

    #[test]
    fn missing_close_column_is_invalid() {
        let raw = RawSeries::new("X")
            .with_index(dates(&["2024-01-02"]))
            .with_column("open", vec![Some(1.0)]);
        assert!(matches!(normalize(&raw), Err(AnalyticsError::InvalidSeries(_))));
    }

    #[test]
    fn mismatched_column_length_is_invalid() {
        let raw = RawSeries::new("X")
            .with_index(dates(&["2024-01-02", "2024-01-03"]))
            .with_column("close", vec![Some(1.0)]);
        assert!(matches!(normalize(&raw), Err(AnalyticsError::InvalidSeries(_))));
    }

    #[test]
    fn parses_all_supported_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        for ts in [
            RawTimestamp::Unix(expected.timestamp()),
            RawTimestamp::Text("2024-01-02".to_string()),
            RawTimestamp::Text("2024-01-02T00:00:00Z".to_string()),
            RawTimestamp::Text("2024-01-01 21:00:00-03:00".to_string()),
        ] {
            assert_eq!(parse_timestamp(&ts).unwrap(), expected, "{ts:?}");
        }
        assert!(parse_timestamp(&RawTimestamp::Text("yesterday".to_string())).is_err());
    }
}
