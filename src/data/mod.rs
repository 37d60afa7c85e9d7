//! Statistics API access.

pub mod bls;

pub use bls::{BlsClient, SeriesSource, fetch_with_retry, parse_response};
