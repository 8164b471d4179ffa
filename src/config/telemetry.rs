//! Telemetry configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Rust log filter directive, used when `ENTITLEMENT_SYNC_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl TelemetryConfig {
    /// Validate telemetry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.filter.trim().is_empty() {
            return Err(ValidationError::EmptyLogFilter);
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "info,entitlement_sync=debug".to_string()
}
