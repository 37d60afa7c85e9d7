//! Shared domain types.
//!
//! These types are intentionally kept small and free of I/O so they can be:
//!
//! - built from CLI/env configuration at the boundary
//! - produced by the BLS client and consumed by the table builder
//! - constructed directly in tests without touching the network

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use clap::ValueEnum;

use crate::error::FetchError;

/// BLS Public Data API v2 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";

/// First year requested when the caller does not pick one.
pub const DEFAULT_START_YEAR: i32 = 2015;

/// Registered-key limits of the v2 API.
pub const MAX_SERIES_PER_REQUEST: usize = 50;
pub const MAX_YEARS_PER_REQUEST: i32 = 20;

/// Scale factor applied to "in thousands" values for display.
pub const THOUSANDS_SCALE: f64 = 1_000.0;

/// Measurement unit of a series as published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Counts of persons, published in thousands.
    Thousands,
    /// Rates and ratios, published in percent.
    Percent,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::Thousands => "thousands",
            Unit::Percent => "%",
        }
    }
}

/// The labor-market series shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Indicator {
    LaborForce,
    Employment,
    Unemployment,
    UnemploymentRate,
    NonfarmPayrolls,
    ParticipationRate,
    EmploymentPopulationRatio,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::LaborForce,
        Indicator::Employment,
        Indicator::Unemployment,
        Indicator::UnemploymentRate,
        Indicator::NonfarmPayrolls,
        Indicator::ParticipationRate,
        Indicator::EmploymentPopulationRatio,
    ];

    /// BLS series identifier (all seasonally adjusted).
    pub fn series_id(self) -> &'static str {
        match self {
            Indicator::LaborForce => "LNS11000000",
            Indicator::Employment => "LNS12000000",
            Indicator::Unemployment => "LNS13000000",
            Indicator::UnemploymentRate => "LNS14000000",
            Indicator::NonfarmPayrolls => "CES0000000001",
            Indicator::ParticipationRate => "LNS11300000",
            Indicator::EmploymentPopulationRatio => "LNS12300000",
        }
    }

    /// Column label used after renaming.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::LaborForce => "Civilian Labor Force",
            Indicator::Employment => "Civilian Employment",
            Indicator::Unemployment => "Civilian Unemployment",
            Indicator::UnemploymentRate => "Unemployment Rate",
            Indicator::NonfarmPayrolls => "Total Nonfarm Employment",
            Indicator::ParticipationRate => "Labor Force Participation Rate",
            Indicator::EmploymentPopulationRatio => "Employment-Population Ratio",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Indicator::LaborForce
            | Indicator::Employment
            | Indicator::Unemployment
            | Indicator::NonfarmPayrolls => Unit::Thousands,
            Indicator::UnemploymentRate
            | Indicator::ParticipationRate
            | Indicator::EmploymentPopulationRatio => Unit::Percent,
        }
    }

    /// Series id to label, for `table::rename`.
    pub fn rename_mapping() -> HashMap<String, String> {
        Indicator::ALL
            .iter()
            .map(|i| (i.series_id().to_string(), i.label().to_string()))
            .collect()
    }
}

/// Decoded sub-year period code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// `M01`..`M12`.
    Month(u32),
    /// `M13`: annual average, published alongside monthly data for some surveys.
    AnnualAverage,
    /// Anything else (`Q01`, `S01`, `A01`, malformed codes).
    Other,
}

impl Period {
    pub fn parse(code: &str) -> Period {
        let code = code.trim();
        let Some(digits) = code.strip_prefix('M') else {
            return Period::Other;
        };
        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Period::Other;
        }
        match digits.parse::<u32>() {
            Ok(m @ 1..=12) => Period::Month(m),
            Ok(13) => Period::AnnualAverage,
            _ => Period::Other,
        }
    }
}

/// One batched request to the statistics API.
///
/// Construction validates the invariants the API and the table builder rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    series_ids: Vec<String>,
    start_year: i32,
    end_year: i32,
    api_key: String,
}

impl SeriesRequest {
    pub fn new(
        series_ids: Vec<String>,
        start_year: i32,
        end_year: i32,
        api_key: impl Into<String>,
    ) -> Result<Self, FetchError> {
        if series_ids.is_empty() {
            return Err(FetchError::InvalidRequest("no series identifiers given".into()));
        }
        if series_ids.len() > MAX_SERIES_PER_REQUEST {
            return Err(FetchError::InvalidRequest(format!(
                "{} series requested; the API accepts at most {MAX_SERIES_PER_REQUEST}",
                series_ids.len()
            )));
        }
        let mut seen = HashSet::new();
        for id in &series_ids {
            if id.trim().is_empty() {
                return Err(FetchError::InvalidRequest("empty series identifier".into()));
            }
            if !seen.insert(id.as_str()) {
                return Err(FetchError::InvalidRequest(format!("duplicate series identifier {id}")));
            }
        }
        if start_year > end_year {
            return Err(FetchError::InvalidRequest(format!(
                "start year {start_year} is after end year {end_year}"
            )));
        }
        if end_year - start_year + 1 > MAX_YEARS_PER_REQUEST {
            return Err(FetchError::InvalidRequest(format!(
                "{start_year}-{end_year} spans more than {MAX_YEARS_PER_REQUEST} years"
            )));
        }

        Ok(Self {
            series_ids,
            start_year,
            end_year,
            api_key: api_key.into(),
        })
    }

    pub fn series_ids(&self) -> &[String] {
        &self.series_ids
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Human-readable metadata returned with `catalog: true`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesCatalog {
    pub title: Option<String>,
}

/// One raw observation. Year and value are still the API's text; an absent
/// value is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub year: String,
    pub period: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSeries {
    pub series_id: String,
    pub catalog: Option<SeriesCatalog>,
    pub points: Vec<SeriesPoint>,
}

impl RawSeries {
    /// Catalog title, falling back to the raw identifier.
    pub fn display_name(&self) -> &str {
        self.catalog
            .as_ref()
            .and_then(|c| c.title.as_deref())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.series_id)
    }
}

/// Decoded response of one batched fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSeriesBatch {
    pub status: String,
    pub messages: Vec<String>,
    pub series: Vec<RawSeries>,
}

/// Timeout and retry behavior of the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    /// Total attempts, including the first. `1` disables retry.
    pub max_attempts: u32,
    /// Sleep before attempt `n` (1-based retry index) is `backoff * n`.
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            backoff: Duration::from_millis(250),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags and the environment (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_key: String,
    pub base_url: String,
    pub series_ids: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub fetch: FetchPolicy,
    /// Fail the run when a non-monthly period code is seen instead of skipping it.
    pub strict_periods: bool,
    /// Column differenced for the monthly/yearly change metrics (post-rename label).
    pub level_column: String,
    pub display_scale: f64,
}

impl DashboardConfig {
    /// Defaults for the seven dashboard indicators.
    pub fn new(api_key: impl Into<String>, end_year: i32) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            series_ids: Indicator::ALL.iter().map(|i| i.series_id().to_string()).collect(),
            start_year: DEFAULT_START_YEAR,
            end_year,
            fetch: FetchPolicy::default(),
            strict_periods: false,
            level_column: Indicator::NonfarmPayrolls.label().to_string(),
            display_scale: THOUSANDS_SCALE,
        }
    }

    pub fn series_request(&self) -> Result<SeriesRequest, FetchError> {
        SeriesRequest::new(
            self.series_ids.clone(),
            self.start_year,
            self.end_year,
            self.api_key.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn period_codes() {
        assert_eq!(Period::parse("M01"), Period::Month(1));
        assert_eq!(Period::parse("M12"), Period::Month(12));
        assert_eq!(Period::parse("M13"), Period::AnnualAverage);
        assert_eq!(Period::parse("M00"), Period::Other);
        assert_eq!(Period::parse("M1"), Period::Other);
        assert_eq!(Period::parse("Q01"), Period::Other);
        assert_eq!(Period::parse("M+1"), Period::Other);
        assert_eq!(Period::parse(""), Period::Other);
    }

    #[test]
    fn request_rejects_duplicates_and_inverted_range() {
        assert!(SeriesRequest::new(ids(&["A", "B"]), 2015, 2020, "k").is_ok());

        let dup = SeriesRequest::new(ids(&["A", "A"]), 2015, 2020, "k");
        assert!(matches!(dup, Err(FetchError::InvalidRequest(_))));

        let inverted = SeriesRequest::new(ids(&["A"]), 2021, 2020, "k");
        assert!(matches!(inverted, Err(FetchError::InvalidRequest(_))));

        let empty = SeriesRequest::new(Vec::new(), 2015, 2020, "k");
        assert!(matches!(empty, Err(FetchError::InvalidRequest(_))));
    }

    #[test]
    fn request_enforces_api_limits() {
        let many: Vec<String> = (0..51).map(|i| format!("S{i}")).collect();
        assert!(SeriesRequest::new(many, 2015, 2020, "k").is_err());

        assert!(SeriesRequest::new(ids(&["A"]), 2000, 2019, "k").is_ok());
        assert!(SeriesRequest::new(ids(&["A"]), 2000, 2020, "k").is_err());
    }

    #[test]
    fn indicators_map_to_distinct_series() {
        let mapping = Indicator::rename_mapping();
        assert_eq!(mapping.len(), Indicator::ALL.len());
        assert_eq!(mapping["LNS14000000"], "Unemployment Rate");
        assert_eq!(Indicator::NonfarmPayrolls.unit(), Unit::Thousands);
        assert_eq!(Indicator::UnemploymentRate.unit(), Unit::Percent);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let mut series = RawSeries {
            series_id: "LNS14000000".into(),
            catalog: None,
            points: Vec::new(),
        };
        assert_eq!(series.display_name(), "LNS14000000");

        series.catalog = Some(SeriesCatalog {
            title: Some("(Seas) Unemployment Rate".into()),
        });
        assert_eq!(series.display_name(), "(Seas) Unemployment Rate");
    }

    #[test]
    fn default_config_requests_all_indicators() {
        let config = DashboardConfig::new("key", 2024);
        let request = config.series_request().unwrap();
        assert_eq!(request.series_ids().len(), Indicator::ALL.len());
        assert_eq!(request.start_year(), DEFAULT_START_YEAR);
        assert_eq!(request.end_year(), 2024);
        assert_eq!(config.level_column, "Total Nonfarm Employment");
    }
}
