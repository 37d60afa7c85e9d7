//! Month × year layout of a column, for the heatmap.

use chrono::Datelike;

use crate::table::ObservationTable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarCell {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    pub value: f64,
}

/// One cell per observed value of `column`; gaps produce no cell.
pub fn calendar_cells(table: &ObservationTable, column: &str) -> Vec<CalendarCell> {
    table
        .observed(column)
        .into_iter()
        .map(|(date, value)| CalendarCell {
            year: date.year(),
            month: date.month(),
            value,
        })
        .collect()
}

/// `(min, max)` over all cells, or `None` when there are none.
pub fn value_range(cells: &[CalendarCell]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for c in cells {
        lo = lo.min(c.value);
        hi = hi.max(c.value);
    }
    if lo.is_finite() && hi.is_finite() { Some((lo, hi)) } else { None }
}
