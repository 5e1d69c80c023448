//! Logging setup for the duckhunt binary.
//!
//! stdout is reserved for driver payloads; all log output goes to stderr.
//! `RUST_LOG` overrides the verbosity flags when set.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber. Call once at startup.
pub fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "dh_hunter={default_level},dh_hmm={default_level},duckhunt={default_level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
