//! Derived indicators computed from an [`ObservationTable`].
//!
//! Everything here is a pure function of the table. Derived series are kept
//! next to the table rather than written back into it.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::TableError;
use crate::table::ObservationTable;

pub mod calendar;

pub use calendar::{CalendarCell, calendar_cells};

/// Change in the level column between the last observations of two consecutive years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyChange {
    pub year: i32,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub level_column: String,
    /// Aligned with the table's dates; `None` on the first row and around gaps.
    pub month_over_month: Vec<Option<f64>>,
    pub yearly_change: Vec<YearlyChange>,
    pub display_scale: f64,
}

impl DerivedMetrics {
    /// Monthly change on the latest row, in display units.
    pub fn latest_month_over_month_display(&self) -> Option<f64> {
        self.month_over_month
            .last()
            .copied()
            .flatten()
            .map(|v| v * self.display_scale)
    }

    pub fn scale(&self, value: f64) -> f64 {
        value * self.display_scale
    }
}

/// Compute every derived metric for `level_column`.
pub fn derive(
    table: &ObservationTable,
    level_column: &str,
    display_scale: f64,
) -> Result<DerivedMetrics, TableError> {
    let column = table
        .column(level_column)
        .ok_or_else(|| TableError::MissingColumn(level_column.to_string()))?;

    let month_over_month = month_over_month(column.values());
    let yearly_change = yearly_change(table.dates(), column.values());

    tracing::debug!(
        column = level_column,
        months = month_over_month.iter().flatten().count(),
        years = yearly_change.len(),
        "derived metrics computed"
    );

    Ok(DerivedMetrics {
        level_column: level_column.to_string(),
        month_over_month,
        yearly_change,
        display_scale,
    })
}

/// `values[i] - values[i - 1]`; `None` on the first row or when either side is a gap.
pub fn month_over_month(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let diff = match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(cur)) => Some(cur - prev),
            _ => None,
        };
        out.push(diff);
    }
    out
}

/// Last observed value per calendar year, differenced between consecutive
/// calendar years.
///
/// A year without observations produces no entry, and neither does the year
/// after it.
pub fn yearly_change(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<YearlyChange> {
    let mut year_end: BTreeMap<i32, f64> = BTreeMap::new();
    for (date, value) in dates.iter().zip(values) {
        if let Some(v) = value {
            // Dates are ascending, so the last write per year wins.
            year_end.insert(date.year(), *v);
        }
    }

    year_end
        .iter()
        .filter_map(|(&year, &last)| {
            let prev = year_end.get(&(year - 1))?;
            Some(YearlyChange {
                year,
                change: last - prev,
            })
        })
        .collect()
}
