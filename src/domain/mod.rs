//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the static indicator catalogue (`Indicator`, `Unit`)
//! - the request and raw response model (`SeriesRequest`, `RawSeriesBatch`)
//! - run configuration (`DashboardConfig`, `FetchPolicy`)

pub mod types;

pub use types::*;
