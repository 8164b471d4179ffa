//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ENTITLEMENT_SYNC_` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use entitlement_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Calendar offset: {}", config.reconciliation.calendar_offset());
//! ```

mod error;
mod reconciliation;
mod telemetry;

pub use error::{ConfigError, ValidationError};
pub use reconciliation::ReconciliationConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "ENTITLEMENT_SYNC";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reconciliation behaviour (calendar, checkout policies)
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,

    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ENTITLEMENT_SYNC` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ENTITLEMENT_SYNC__RECONCILIATION__CALENDAR_UTC_OFFSET_MINUTES=60`
    /// - `ENTITLEMENT_SYNC__TELEMETRY__JSON=true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a TOML file, with environment variables
    /// taking precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, malformed, or holds
    /// values of the wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Toml))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.reconciliation.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
