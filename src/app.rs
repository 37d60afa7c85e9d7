//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initialises logging
//! - resolves the run configuration
//! - dispatches to the TUI or the text summary

use chrono::Datelike;
use clap::Parser;

use crate::cli::{Command, FetchArgs, SummaryArgs};
use crate::domain::{DashboardConfig, FetchPolicy, Indicator};
use crate::error::AppError;
use crate::report::Kpis;

pub mod pipeline;

/// Upper bound for `--backoff-ms` (one minute).
const MAX_BACKOFF_MS: u64 = 60_000;

/// Entry point for the `labor` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; the key may come from the real environment or a flag.
    dotenvy::dotenv().ok();

    // `labor` and `labor --start-year 2020` behave like `labor tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    crate::logging::setup_logging(&args.fetch.log_level, args.fetch.log_file.as_deref())?;

    let config = config_from_args(&args.fetch)?;
    let run = pipeline::run(&config)?;
    let kpis = Kpis::from_run(&run)
        .ok_or_else(|| AppError::new(4, "Observation table has no dates."))?;

    println!("{}", crate::report::format_summary(&run, &kpis, args.rows));

    if let Some(indicator) = args.plot {
        let label = indicator.label();
        let plot = crate::plot::render_series_plot(label, &run.table.observed(label), args.width, args.height);
        println!("{plot}");
    }

    if let Some(path) = &args.export {
        crate::io::export::write_table_csv(path, &run)?;
    }

    Ok(())
}

fn handle_tui(args: FetchArgs) -> Result<(), AppError> {
    // The alternate screen owns the terminal, so stderr logging would corrupt it.
    let level = crate::logging::tui_level(&args.log_level, args.log_file.as_deref());
    crate::logging::setup_logging(&level, args.log_file.as_deref())?;

    let config = config_from_args(&args)?;
    crate::tui::run(config)
}

/// Resolve CLI flags and environment into a [`DashboardConfig`].
pub fn config_from_args(args: &FetchArgs) -> Result<DashboardConfig, AppError> {
    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::new(2, "Missing BLS_API_KEY in environment (.env)."))?;

    if args.attempts == 0 {
        return Err(AppError::new(2, "--attempts must be at least 1."));
    }
    if args.timeout_secs == 0 {
        return Err(AppError::new(2, "--timeout-secs must be at least 1."));
    }
    if args.backoff_ms > MAX_BACKOFF_MS {
        return Err(AppError::new(2, format!("--backoff-ms must be at most {MAX_BACKOFF_MS}.")));
    }

    let end_year = args.end_year.unwrap_or_else(|| chrono::Local::now().year());

    let mut config = DashboardConfig::new(api_key, end_year);
    if let Some(url) = args.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config.base_url = url.trim().to_string();
    }
    config.series_ids = Indicator::ALL.iter().map(|i| i.series_id().to_string()).collect();
    config.start_year = args.start_year;
    config.fetch = FetchPolicy {
        timeout: std::time::Duration::from_secs(args.timeout_secs),
        max_attempts: args.attempts,
        backoff: std::time::Duration::from_millis(args.backoff_ms),
    };
    config.strict_periods = args.strict_periods;

    Ok(config)
}

/// Rewrite argv so `labor` defaults to `labor tui`.
///
/// Rules:
/// - `labor`                         -> `labor tui`
/// - `labor --start-year 2020 ...`   -> `labor tui --start-year 2020 ...`
/// - `labor --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fetch_args(extra: &[&str]) -> FetchArgs {
        let mut all = vec!["labor", "tui"];
        all.extend_from_slice(extra);
        match crate::cli::Cli::try_parse_from(all).unwrap().command {
            Command::Tui(args) => args,
            Command::Summary(_) => unreachable!(),
        }
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["labor"])), argv(&["labor", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["labor", "--start-year", "2020"])),
            argv(&["labor", "tui", "--start-year", "2020"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["labor", "summary"])), argv(&["labor", "summary"]));
        assert_eq!(rewrite_args(argv(&["labor", "--help"])), argv(&["labor", "--help"]));
        assert_eq!(rewrite_args(argv(&["labor", "-V"])), argv(&["labor", "-V"]));
    }

    #[test]
    fn config_requires_api_key() {
        let mut args = fetch_args(&["--api-key", "k"]);
        args.api_key = None;
        let err = config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("BLS_API_KEY"));

        args.api_key = Some("   ".into());
        assert!(config_from_args(&args).is_err());
    }

    #[test]
    fn config_maps_flags() {
        let args = fetch_args(&[
            "--api-key",
            " secret ",
            "--api-url",
            "http://localhost:9000/",
            "--start-year",
            "2019",
            "--end-year",
            "2024",
            "--timeout-secs",
            "5",
            "--attempts",
            "3",
            "--backoff-ms",
            "10",
            "--strict-periods",
        ]);
        let config = config_from_args(&args).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(config.start_year, 2019);
        assert_eq!(config.end_year, 2024);
        assert_eq!(config.series_ids.len(), Indicator::ALL.len());
        assert_eq!(config.fetch.timeout, std::time::Duration::from_secs(5));
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.backoff, std::time::Duration::from_millis(10));
        assert!(config.strict_periods);
    }

    #[test]
    fn zero_attempts_is_a_config_error() {
        let args = fetch_args(&["--api-key", "k", "--attempts", "0"]);
        assert_eq!(config_from_args(&args).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn zero_timeout_is_a_config_error() {
        let args = fetch_args(&["--api-key", "k", "--timeout-secs", "0"]);
        let err = config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("--timeout-secs"));
    }

    #[test]
    fn oversized_backoff_is_a_config_error() {
        let args = fetch_args(&["--api-key", "k", "--backoff-ms", "18446744073709551615"]);
        assert_eq!(config_from_args(&args).unwrap_err().exit_code(), 2);

        let args = fetch_args(&["--api-key", "k", "--backoff-ms", "60000"]);
        assert!(config_from_args(&args).is_ok());
    }
}
