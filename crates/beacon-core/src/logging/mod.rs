//! Structured logging setup.
//!
//! Every log line is a JSON object on stderr carrying an `event` field named
//! `<crate>.<area>.<action>_<phase>`, so stdout stays clean for command output.

use tracing_subscriber::EnvFilter;

/// Install the global JSON subscriber.
///
/// `quiet` turns all output off (the CLI default). Otherwise `RUST_LOG` is
/// honoured, falling back to `info`. Calling this twice is harmless.
pub fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
