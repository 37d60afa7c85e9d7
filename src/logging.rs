//! `tracing` subscriber setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::AppError;

/// Initialise the global subscriber.
///
/// `level` is an [`EnvFilter`] directive (`info`, `debug`, `labor_dash=trace`, ...).
/// With `log_file` set, output is appended there without ANSI colors;
/// otherwise it goes to stderr.
pub fn setup_logging(level: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = parse_filter(level)?;

    let init = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        None => {
            let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };
    init.map_err(|e| AppError::new(2, format!("Failed to initialise logging: {e}")))
}

/// A directive that does not parse is a usage error, not a silent `info`.
fn parse_filter(level: &str) -> Result<EnvFilter, AppError> {
    EnvFilter::try_new(level).map_err(|e| AppError::new(2, format!("Invalid log level '{level}': {e}")))
}

/// Level used when the terminal belongs to the TUI and no log file was given.
pub fn tui_level(requested: &str, log_file: Option<&Path>) -> String {
    if log_file.is_some() {
        requested.to_string()
    } else {
        "off".to_string()
    }
}
