// Logging bootstrap: installs the global tracing subscriber.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config_store::GhxSettings;
use crate::constants::LogFormat;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` when
/// `settings.debug` is on and `info` when it is off. Installing twice is not
/// an error: the first subscriber stays in place.
pub fn init(settings: &GhxSettings) -> Result<()> {
    let default_level = if settings.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match settings.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}
