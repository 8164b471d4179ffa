//! Tracing subscriber setup.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV_VAR: &str = "ENTITLEMENT_SYNC_LOG";

/// Install the global tracing subscriber.
///
/// `ENTITLEMENT_SYNC_LOG` takes precedence over `config.filter`. Output is
/// human-readable unless `config.json` is set. Logs go to stderr so stdout
/// stays free for command output.
///
/// # Errors
///
/// Returns `TryInitError` if a global subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (json, text) = if config.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
}
