//! Logging setup

use tracing_subscriber::EnvFilter;

/// Levels accepted on the command line
const LEVELS: [&str; 2] = ["info", "debug"];

/// Normalise a requested level; anything unknown falls back to `info`.
pub fn validate_level(level: &str) -> &'static str {
    let level = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .copied()
        .find(|known| *known == level)
        .unwrap_or("info")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Debug output uses the precise format with targets, threads and source
/// locations; otherwise the brief format is used. Logs go to stderr so that
/// generated code on stdout stays clean.
pub fn init(level: &str) {
    let level = validate_level(level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if level == "debug" {
        builder
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        builder.with_target(false).compact().init();
    }
}
