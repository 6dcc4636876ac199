//! Tracing subscriber setup.

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber, fmt, prelude::*};

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// With `verbose` everything up to DEBUG is shown; otherwise `RUST_LOG`
/// decides, defaulting to "warn".
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::debug!("Verbose mode enabled");
        return Ok(());
    }

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
