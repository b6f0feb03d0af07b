//! Logging initialization.
//!
//! Controlled by the standard `RUST_LOG` environment variable (parsed via
//! [`tracing_subscriber::EnvFilter`]), defaulting to `info` when unset.
//!
//! `ONYO_LOG_FORMAT=json` switches to structured JSON output on stderr, for
//! piping into a log aggregator; otherwise a compact human-readable format is
//! used. onyo has no telemetry-export surface — no spans leave the process.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; a second call is a no-op panic guarded
/// against by `tracing`'s own "already set" error, which is ignored here
/// since tests may call `init` more than once across the suite.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("ONYO_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("warning: tracing subscriber already initialized: {e}");
    }
}
