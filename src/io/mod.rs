//! File output helpers.
//!
//! - table export to CSV (`export`)

pub mod export;

pub use export::*;
