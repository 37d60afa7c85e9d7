//! Terminal plotting for the non-interactive `summary` command.

pub mod ascii;

pub use ascii::render_series_plot;
