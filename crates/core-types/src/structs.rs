use crate::enums::Market;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trims whitespace and upper-cases a ticker (`" petr4.sa "` -> `"PETR4.SA"`).
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Identifies the analyzed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetId {
    pub symbol: String,
    pub market: Market,
}

impl AssetId {
    /// Normalizes the symbol and derives its market. Rejects empty symbols.
    pub fn new(symbol: &str) -> Result<Self, CoreError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let market = Market::from_symbol(&symbol);
        Ok(Self { symbol, market })
    }
}

/// A timestamp as delivered by a provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    /// Seconds since the Unix epoch.
    Unix(i64),
    /// An RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
    Text(String),
}

/// One named column of a raw series, in the provider's own vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Columnar price history exactly as the upstream source returned it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSeries {
    pub symbol: String,
    pub index: Vec<RawTimestamp>,
    pub columns: Vec<RawColumn>,
}

impl RawSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: Vec<RawTimestamp>) -> Self {
        self.index = index;
        self
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.push(RawColumn::new(name, values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// A single trading-day observation in canonical form.
///
/// `close` is always a number. The other fields may be `NaN` when the
/// source did not report them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: f64,
    pub dividends: f64,
}

/// A non-empty, date-ordered, close-complete price series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    bars: Vec<PriceBar>,
}

impl TimeSeries {
    /// Builds a series, enforcing the invariants every consumer relies on:
    /// at least one bar, no `NaN` close, strictly increasing dates.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, CoreError> {
        if bars.is_empty() {
            return Err(CoreError::InvalidSeries("series has no rows".to_string()));
        }
        if let Some(bar) = bars.iter().find(|b| b.close.is_nan()) {
            return Err(CoreError::InvalidSeries(format!(
                "missing close at {}",
                bar.date
            )));
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::InvalidSeries(format!(
                "dates are not strictly increasing at {}",
                pair[1].date
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    // Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }
}
