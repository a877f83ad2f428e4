use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "SPYT_LOG";
pub const DEFAULT_FILTER: &str = "spyt=info";

/// Installs the global tracing subscriber.
///
/// Diagnostics go to stderr so they never mix with command output on stdout.
/// The filter comes from `SPYT_LOG`, falling back to `spyt=info`.
pub fn init_tracing() -> Result<()> {
    let directives = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer = EnvFilter::try_new(&directives)
        .map_err(|e| Error::Configuration(format!("invalid {LOG_ENV} '{directives}': {e}")))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Configuration(format!("tracing already initialised: {e}")))?;
    Ok(())
}
