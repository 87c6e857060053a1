//! Reconciles media libraries from Plex, Jellyfin, Emby and Subsonic servers
//! into one identity-mapped catalogue backed by SQLite.

#![allow(clippy::result_large_err)]

pub mod backends;
pub mod config;
pub mod constants;
pub mod db;
pub mod mapper;
pub mod merge;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides `default_filter`
/// (see [`config::LoggingConfig`]). Calling this twice is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
