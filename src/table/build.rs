//! Reshape a decoded API batch into an [`ObservationTable`].
//!
//! Row-level problems never abort the batch: each bad observation is skipped
//! and reported, leaving a gap in that date's column.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{Period, RawSeriesBatch, SeriesPoint};
use crate::error::ValueParseError;

use super::{Column, ObservationTable};

/// Why an observation did not make it into the table.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnparsableValue(ValueParseError),
    /// `M13` annual averages and non-monthly codes (`Q01`, `S01`, ...).
    NonMonthlyPeriod,
    InvalidDate,
    /// Same series, same year+period, seen before.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPoint {
    pub series_id: String,
    pub year: String,
    pub period: String,
    pub reason: SkipReason,
}

impl SkippedPoint {
    fn new(series_id: &str, point: &SeriesPoint, reason: SkipReason) -> Self {
        Self {
            series_id: series_id.to_string(),
            year: point.year.clone(),
            period: point.period.clone(),
            reason,
        }
    }
}

/// Build the table, discarding the skip report.
pub fn build_table(batch: &RawSeriesBatch) -> ObservationTable {
    build_table_with_report(batch).0
}

/// Build the table and return every skipped observation alongside it.
///
/// Columns are keyed by series identifier in batch order and titled from the
/// catalog. Rows are sorted ascending by date whatever order the API used.
pub fn build_table_with_report(batch: &RawSeriesBatch) -> (ObservationTable, Vec<SkippedPoint>) {
    let mut keys: Vec<(String, String)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: BTreeMap<NaiveDate, HashMap<usize, f64>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for series in &batch.series {
        let col = *index.entry(series.series_id.as_str()).or_insert_with(|| {
            keys.push((series.series_id.clone(), series.display_name().to_string()));
            keys.len() - 1
        });

        for point in &series.points {
            let month = match Period::parse(&point.period) {
                Period::Month(m) => m,
                Period::AnnualAverage | Period::Other => {
                    skipped.push(SkippedPoint::new(&series.series_id, point, SkipReason::NonMonthlyPeriod));
                    continue;
                }
            };
            let date = point
                .year
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1));
            let Some(date) = date else {
                skipped.push(SkippedPoint::new(&series.series_id, point, SkipReason::InvalidDate));
                continue;
            };
            let value = match parse_value(&series.series_id, point) {
                Ok(v) => v,
                Err(err) => {
                    tracing::debug!(error = %err, "dropping observation");
                    skipped.push(SkippedPoint::new(&series.series_id, point, SkipReason::UnparsableValue(err)));
                    continue;
                }
            };

            let row = rows.entry(date).or_default();
            if row.contains_key(&col) {
                skipped.push(SkippedPoint::new(&series.series_id, point, SkipReason::Duplicate));
                continue;
            }
            row.insert(col, value);
        }
    }

    let dates: Vec<NaiveDate> = rows.keys().copied().collect();
    let mut columns: Vec<Column> = keys
        .into_iter()
        .map(|(key, title)| Column {
            key,
            title,
            values: Vec::with_capacity(dates.len()),
        })
        .collect();
    for row in rows.values() {
        for (i, column) in columns.iter_mut().enumerate() {
            column.values.push(row.get(&i).copied());
        }
    }

    if !skipped.is_empty() {
        tracing::info!(skipped = skipped.len(), "observations skipped while building table");
    }
    tracing::debug!(rows = dates.len(), columns = columns.len(), "observation table built");

    (ObservationTable::from_parts(dates, columns), skipped)
}

/// Parse an observation value. Blank, `-`, `N/A` and non-finite values fail.
pub fn parse_value(series_id: &str, point: &SeriesPoint) -> Result<f64, ValueParseError> {
    let fail = || ValueParseError {
        series_id: series_id.to_string(),
        year: point.year.clone(),
        period: point.period.clone(),
        raw: point.value.clone(),
    };

    let trimmed = point.value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Err(fail());
    }
    let v = trimmed.parse::<f64>().map_err(|_| fail())?;
    if v.is_finite() { Ok(v) } else { Err(fail()) }
}
