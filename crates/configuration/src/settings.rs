use crate::error::ConfigError;
use core_types::Period;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in the file; missing values fall back to the
/// `Default` implementations below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub provider: ProviderConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Defaults applied to an analysis request when the caller does not specify them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Symbol analyzed when none is given (e.g., "AAPL", "PETR4.SA").
    pub default_symbol: String,
    pub default_period: Period,
    /// Annual risk-free rate for the Sharpe ratio (0.05 = 5%).
    pub rf_annual: f64,
}

/// Connection settings for the upstream price-history provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Upper bound on a single history request. Callers rely on it to bound the fetch.
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Settings for the optional analysis archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Falls back to the `DATABASE_URL` environment variable when unset.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. "info" or "analyzer=debug,info".
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            default_symbol: "AAPL".to_string(),
            default_period: Period::FiveYears,
            rf_annual: 0.0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 30,
            user_agent: concat!("quantlens/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

impl Config {
    /// Rejects values that would make an analysis or a connection meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rf = self.analysis.rf_annual;
        if !rf.is_finite() || rf <= -1.0 {
            return Err(ConfigError::ValidationError(format!(
                "analysis.rf_annual must be a finite number above -1, got {}",
                rf
            )));
        }
        if self.analysis.default_symbol.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.default_symbol must not be empty".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
