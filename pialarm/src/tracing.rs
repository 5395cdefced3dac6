//! Tracing setup and prelude.
//!
//! Logs go to journald when the socket is available (the daemon normally
//! runs as a systemd unit on the Pi), otherwise to stderr. Filtering is
//! controlled with `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Initialize the global subscriber. Call once, from main.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match tracing_journald::layer() {
        Ok(journald) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(journald)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }
}
