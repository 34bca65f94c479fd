use config::{Environment, File};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{
    AnalysisSettings, Config, DatabaseConfig, LogFormat, LoggingConfig, ProviderConfig,
};

/// The file read by `load_config` from the working directory, if present.
pub const DEFAULT_CONFIG_FILE: &str = "quantlens.toml";

/// Prefix for environment overrides, e.g. `QUANTLENS__PROVIDER__TIMEOUT_SECS=10`.
pub const ENV_PREFIX: &str = "QUANTLENS";

/// Legacy variable holding the annual risk-free rate.
pub const LEGACY_RF_VAR: &str = "DEFAULT_RF_ANNUAL";

/// Loads the application configuration from `quantlens.toml` and the environment.
///
/// This function is the primary entry point for this crate. Missing files are
/// not an error: every setting has a default.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Some(Path::new(DEFAULT_CONFIG_FILE)))
}

/// Loads the configuration with an explicit file path.
///
/// Precedence, lowest first: built-in defaults, `DEFAULT_RF_ANNUAL`, the file,
/// then `QUANTLENS__*` variables.
pub fn load_config_from(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(rf) = legacy_rf_annual() {
        builder = builder.set_default("analysis.rf_annual", rf)?;
    }

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = settings.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Reads `DEFAULT_RF_ANNUAL`, ignoring it when unset or unparsable.
fn legacy_rf_annual() -> Option<f64> {
    let raw = std::env::var(LEGACY_RF_VAR).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(value = %raw, "Ignoring unparsable {}.", LEGACY_RF_VAR);
            None
        }
    }
}
