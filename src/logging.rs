//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Level priority:
//! 1. `--verbose` selects DEBUG
//! 2. `FILE_SORTER_LOG` environment variable (e.g. "info", "debug")
//! 3. INFO
//!
//! Logs go to stderr.

use tracing::Level;

/// Environment variable consulted for the log level
pub const LOG_ENV: &str = "FILE_SORTER_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
	let level = resolve_level(verbose, std::env::var(LOG_ENV).ok().as_deref());

	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_target(true)
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

pub fn resolve_level(verbose: bool, env_value: Option<&str>) -> Level {
	if verbose {
		return Level::DEBUG;
	}
	env_value.and_then(parse_level).unwrap_or(Level::INFO)
}

pub fn parse_level(s: &str) -> Option<Level> {
	match s.trim().to_lowercase().as_str() {
		"error" => Some(Level::ERROR),
		"warn" | "warning" => Some(Level::WARN),
		"info" => Some(Level::INFO),
		"debug" => Some(Level::DEBUG),
		"trace" => Some(Level::TRACE),
		_ => None,
	}
}
