//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observations: `o`
//! - line between consecutive observations: `-`

use chrono::{Datelike, NaiveDate};

/// Render one monthly series as a line plot.
pub fn render_series_plot(label: &str, points: &[(NaiveDate, f64)], width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return format!("Plot: {label} (no data)\n");
    };

    let x_axis = Axis::months(first.0, last.0, width.max(10));
    let y_axis = Axis::values(points, height.max(5));
    let mut canvas = Canvas::blank(x_axis.cells, y_axis.cells);

    let cells: Vec<(usize, usize)> = points
        .iter()
        .map(|&(d, v)| (x_axis.cell(month_index(d) as f64), y_axis.row(v)))
        .collect();

    // Line first so observations can overlay it.
    for pair in cells.windows(2) {
        canvas.segment(pair[0], pair[1], '-');
    }
    for &(x, y) in &cells {
        canvas.put(x, y, 'o');
    }

    format!(
        "Plot: {label} | {}..{} | y=[{:.2}, {:.2}]\n{}",
        first.0.format("%Y-%m"),
        last.0.format("%Y-%m"),
        y_axis.min,
        y_axis.max,
        canvas.render(),
    )
}

fn month_index(d: NaiveDate) -> i64 {
    d.year() as i64 * 12 + d.month0() as i64
}

/// Linear map from a data range onto `cells` grid positions.
struct Axis {
    min: f64,
    max: f64,
    cells: usize,
}

impl Axis {
    /// Month axis; a single month is widened by one month each side.
    fn months(first: NaiveDate, last: NaiveDate, cells: usize) -> Self {
        let (lo, hi) = (month_index(first) as f64, month_index(last) as f64);
        if hi > lo {
            Self { min: lo, max: hi, cells }
        } else {
            Self { min: lo - 1.0, max: hi + 1.0, cells }
        }
    }

    /// Value axis padded by 5% of the span; a flat series gets a unit span.
    fn values(points: &[(NaiveDate, f64)], cells: usize) -> Self {
        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
        let (lo, hi) = if lo.is_finite() && hi.is_finite() && hi > lo {
            (lo, hi)
        } else {
            let mid = points[0].1;
            (mid - 0.5, mid + 0.5)
        };
        let pad = ((hi - lo) * 0.05).max(1e-12);
        Self {
            min: lo - pad,
            max: hi + pad,
            cells,
        }
    }

    /// Column for `v`, clamped to the grid.
    fn cell(&self, v: f64) -> usize {
        let frac = ((v - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        (frac * (self.cells - 1) as f64).round() as usize
    }

    /// Row for `v`; row 0 is the top, so larger values sit higher.
    fn row(&self, v: f64) -> usize {
        self.cells - 1 - self.cell(v)
    }
}

/// Fixed-size character grid.
struct Canvas {
    width: usize,
    cells: Vec<char>,
}

impl Canvas {
    fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![' '; width * height],
        }
    }

    fn put(&mut self, x: usize, y: usize, ch: char) {
        if x < self.width {
            if let Some(cell) = self.cells.get_mut(y * self.width + x) {
                *cell = ch;
            }
        }
    }

    /// Straight segment sampled once per step along the longer axis. Only
    /// blank cells are written.
    fn segment(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let dx = to.0 as f64 - from.0 as f64;
        let dy = to.1 as f64 - from.1 as f64;
        let steps = dx.abs().max(dy.abs()) as usize;
        for i in 0..=steps {
            let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
            let x = (from.0 as f64 + t * dx).round() as usize;
            let y = (from.1 as f64 + t * dy).round() as usize;
            if x < self.width && self.cells.get(y * self.width + x) == Some(&' ') {
                self.put(x, y, ch);
            }
        }
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.cells.len() / self.width.max(1));
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}
