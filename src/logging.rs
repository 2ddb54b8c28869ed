//! Process-wide `tracing` subscriber setup.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::ParseError, fmt, prelude::*, util::TryInitError};

/// Filter directives used when `RUST_LOG` is unset or empty.
pub const DEFAULT_FILTER: &str = "info";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    AlreadyInitialised(#[from] TryInitError),
}

/// Installs a compact formatter filtered by `RUST_LOG`, defaulting to
/// [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Returns [`LoggingError::AlreadyInitialised`] when called more than once per
/// process.
pub fn init() -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    install(filter)
}

/// Installs a compact formatter with explicit filter directives.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] for malformed directives and
/// [`LoggingError::AlreadyInitialised`] when a subscriber already exists.
pub fn init_with_filter(directives: &str) -> Result<(), LoggingError> {
    install(EnvFilter::try_new(directives)?)
}

fn install(filter: EnvFilter) -> Result<(), LoggingError> {
    let fmt_layer = fmt::layer().with_target(true).with_level(true).compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
