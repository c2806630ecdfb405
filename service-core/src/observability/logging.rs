use crate::error::AppError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global JSON subscriber. `RUST_LOG` wins over `log_level`.
///
/// A subscriber that is already installed is left in place, so tests may call this
/// repeatedly.
pub fn init_tracing(service_name: &str, log_level: &str) -> Result<(), AppError> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid log level '{}': {}", log_level, e))
        })?;

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %service_name, "Tracing initialized");
    }

    Ok(())
}
