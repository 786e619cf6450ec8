use std::io;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor the config names one
pub const DEFAULT_LEVEL: &str = "warn";

/// Initialize tracing on stderr
///
/// `RUST_LOG` takes precedence over `level`. An invalid directive falls
/// back to [`DEFAULT_LEVEL`] with a note on stderr; stdout is left for
/// decoder output.
pub fn init(level: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = level.unwrap_or(DEFAULT_LEVEL);
            EnvFilter::try_new(level).unwrap_or_else(|e| {
                eprintln!(
                    "Invalid log level '{}': {}. Falling back to '{}'",
                    level, e, DEFAULT_LEVEL
                );
                EnvFilter::new(DEFAULT_LEVEL)
            })
        }
    };

    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
