//! Logging setup
//!
//! Verbosity maps to a base level (0 = WARN, 1 = INFO, 2+ = DEBUG); `RUST_LOG`
//! directives refine it. Output goes to stderr so stdout stays clean for
//! command results.

use anyhow::{Result, anyhow};
use std::io::IsTerminal;
use tracing::debug;
use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Base level for a verbosity count
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Install the global subscriber
///
/// At DEBUG the source file and line of each event are included.
pub fn init(verbosity: u8, json: bool) -> Result<()> {
    let level = level_for(verbosity);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()
        .map_err(|e| anyhow!("invalid RUST_LOG directives: {e}"))?;
    let with_caller = verbosity >= 2;

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_file(with_caller)
        .with_line_number(with_caller)
        .with_ansi(!json && std::io::stderr().is_terminal());

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to set tracing subscriber: {e}"))?;

    debug!(effective_level = %level, "Configured logger");
    Ok(())
}
