//! Command-line parsing for the labor-market dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/reshape code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Indicator;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "labor", version, about = "U.S. labor market dashboard (BLS Public Data API)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Tui(FetchArgs),
    /// Print KPIs, yearly changes and recent rows; optionally plot/export.
    Summary(SummaryArgs),
}

/// Options shared by every command that fetches data.
#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// BLS registration key.
    #[arg(long, env = "BLS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the API endpoint.
    #[arg(long, env = "BLS_API_URL")]
    pub api_url: Option<String>,

    /// First year to request.
    #[arg(long, default_value_t = crate::domain::DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last year to request (defaults to the current year).
    #[arg(long)]
    pub end_year: Option<i32>,

    /// HTTP timeout for the API call, in seconds (at least 1).
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Total fetch attempts; transport failures are retried up to this count.
    #[arg(long, default_value_t = 1)]
    pub attempts: u32,

    /// Base back-off between attempts, in milliseconds (grows linearly, at most 60000).
    #[arg(long, default_value_t = 250)]
    pub backoff_ms: u64,

    /// Fail instead of skipping non-monthly period codes (e.g. M13 annual averages).
    #[arg(long)]
    pub strict_periods: bool,

    /// Log filter directive (e.g. info, debug, labor_dash=trace).
    #[arg(long, env = "LABOR_LOG", default_value = "info")]
    pub log_level: String,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Number of most recent rows to print.
    #[arg(long, default_value_t = 6)]
    pub rows: usize,

    /// Render an ASCII plot of one indicator.
    #[arg(long, value_enum)]
    pub plot: Option<Indicator>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the table (plus monthly change) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
