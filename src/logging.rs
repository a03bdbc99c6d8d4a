use tracing_subscriber::EnvFilter;

/// Crates whose events reach the terminal.
const CRATE_TARGETS: &[&str] = &["schoolday", "schoolday_core"];

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directives for our own crates at the level picked by `-v`.
fn default_directives(verbosity: u8) -> String {
    let level = level_for(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the stderr subscriber. Resolver warnings show by default;
/// each `-v` adds a level. A set `RUST_LOG` replaces the directives.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .init();
}
