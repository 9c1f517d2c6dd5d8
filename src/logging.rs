//! Tracing setup.
//!
//! The library only emits `tracing` events. Applications that have no
//! subscriber of their own can install the default one here.

use linelog_core::{Error, Result};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Install a formatted subscriber filtered by `RUST_LOG`, or by `level`
/// (default `info`) when `RUST_LOG` is unset.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(level: Option<&str>) -> Result<()> {
    let default_level = level.unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| Error::Config(format!("failed to install tracing subscriber: {}", err)))
}
