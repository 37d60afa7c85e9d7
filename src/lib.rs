//! `labor-dash` library crate.
//!
//! The binary (`labor`) is a thin wrapper around this library so that:
//!
//! - the fetch/reshape pipeline is testable without spawning processes
//! - the table and derived metrics can be reused by other front-ends
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod table;
pub mod tui;
