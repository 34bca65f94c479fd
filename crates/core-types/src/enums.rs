use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The market an asset trades in, derived from the shape of its ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "BR")]
    Br,
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "OTHER")]
    Other,
}

impl Market {
    /// `.SA` suffix => BR, alphabetic-only => US, anything else => OTHER.
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.ends_with(".SA") {
            Market::Br
        } else if !symbol.is_empty() && symbol.chars().all(char::is_alphabetic) {
            Market::Us
        } else {
            Market::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Br => "BR",
            Market::Us => "US",
            Market::Other => "OTHER",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The look-back window requested from the price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
    #[default]
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::OneYear,
        Period::ThreeYears,
        Period::FiveYears,
        Period::TenYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneYear => "1y",
            Period::ThreeYears => "3y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                CoreError::InvalidInput(
                    "period".to_string(),
                    format!("'{}' is not one of 1y, 3y, 5y, 10y", s),
                )
            })
    }
}

/// Bar interval. Only daily bars are analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneDay => "1d",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse trend classification relative to the 200-session moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendRegime {
    Bull,
    Bear,
    Unknown,
}

impl TrendRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendRegime::Bull => "bull",
            TrendRegime::Bear => "bear",
            TrendRegime::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TrendRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
