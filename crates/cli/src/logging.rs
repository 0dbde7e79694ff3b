//! Subscriber setup for the binary

use nickel_bridge_core::constants::LOG_VAR;
use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact stderr subscriber filtered by `NICKEL_BRIDGE_LOG`
///
/// Defaults to `warn` so stdout only ever carries the evaluation result.
pub fn init() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_VAR).or_else(|_| EnvFilter::try_new("warn"))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
