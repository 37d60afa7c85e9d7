//! The unified, date-indexed observation table.
//!
//! One row per first-of-month date, one column per series. Columns are aligned
//! on the union of dates; a missing observation is `None`, never zero.
//! Tables are immutable once built: relabeling returns a new table.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

pub mod build;

pub use build::{SkipReason, SkippedPoint, build_table, build_table_with_report, parse_value};

/// One named column, aligned with [`ObservationTable::dates`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    key: String,
    title: String,
    values: Vec<Option<f64>>,
}

impl Column {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Catalog title (or the raw identifier when the API sent none).
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl ObservationTable {
    /// `dates` must be strictly increasing and every column as long as `dates`.
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Self {
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(columns.iter().all(|c| c.values.len() == dates.len()));
        Self { dates, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn value(&self, key: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.column(key)?.values[idx]
    }

    /// Value of `key` on the latest row (a gap there yields `None`).
    pub fn latest_value(&self, key: &str) -> Option<f64> {
        self.column(key)?.values.last().copied().flatten()
    }

    /// Observed `(date, value)` pairs of one column, gaps skipped.
    pub fn observed(&self, key: &str) -> Vec<(NaiveDate, f64)> {
        let Some(col) = self.column(key) else {
            return Vec::new();
        };
        self.dates
            .iter()
            .zip(col.values.iter())
            .filter_map(|(&d, v)| v.map(|v| (d, v)))
            .collect()
    }
}

/// Relabel columns from series identifiers to human-readable names.
///
/// Values, row order and the date index are untouched. Unmapped columns keep
/// their key. A mapping whose label is already taken by another column is
/// ignored so keys stay unique.
pub fn rename(table: &ObservationTable, mapping: &HashMap<String, String>) -> ObservationTable {
    let mut taken: HashSet<String> = table.columns.iter().map(|c| c.key.clone()).collect();
    let mut columns = Vec::with_capacity(table.columns.len());

    for col in &table.columns {
        let mut renamed = col.clone();
        if let Some(label) = mapping.get(&col.key) {
            if label != &col.key {
                if taken.contains(label) {
                    tracing::warn!(column = %col.key, label = %label, "rename target already in use; keeping original key");
                } else {
                    taken.remove(&col.key);
                    taken.insert(label.clone());
                    renamed.key = label.clone();
                }
            }
        }
        columns.push(renamed);
    }

    ObservationTable {
        dates: table.dates.clone(),
        columns,
    }
}
