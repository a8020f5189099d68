//! Subscriber setup for binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to
//! the application. The `logbeam` binary calls [`init_logging`] once at startup.

use std::io;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a global fmt subscriber writing to stderr.
///
/// The level filter comes from `RUST_LOG` and defaults to `info`. With `json`
/// set, each event is one flattened JSON object per line.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.with_target(false).init();
    }
}
