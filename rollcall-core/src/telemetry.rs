//! Tracing subscriber initialization
//!
//! Libraries in this workspace only emit `tracing` events; binaries and test
//! harnesses call [`init_tracing`] once to decide where they go.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ConfigError, RollcallResult};

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive string, e.g. "rollcall_storage=debug,info"
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Service name attached to the startup event
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: std::env::var("ROLLCALL_LOG_FILTER")
                .unwrap_or_else(|_| "rollcall_storage=debug,info".to_string()),
            json: std::env::var("ROLLCALL_LOG_JSON")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            service_name: std::env::var("ROLLCALL_SERVICE_NAME")
                .unwrap_or_else(|_| "rollcall".to_string()),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter` when set. Returns a
/// `ConfigError::TracingInit` if a global subscriber is already installed,
/// so callers that may race (tests) can ignore the error.
pub fn init_tracing(config: &TelemetryConfig) -> RollcallResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ConfigError::InvalidValue {
            field: "filter".to_string(),
            value: config.filter.clone(),
            reason: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ConfigError::TracingInit {
        reason: e.to_string(),
    })?;

    tracing::info!(
        service_name = config.service_name,
        json = config.json,
        "Tracing initialized"
    );

    Ok(())
}
