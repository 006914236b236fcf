use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

static INITIALISED: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Filtering follows `RUST_LOG` and output
/// goes to stderr.
pub(super) fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|_| InitError::AlreadyInitialised)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|source| InitError::Subscriber(source.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub(super) enum InitError {
    #[error("tracing subscriber already initialised")]
    AlreadyInitialised,
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}
