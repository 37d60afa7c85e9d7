//! Chart data prep for the dashboard pane.
//!
//! Everything here is pure: series and bounds are computed from a
//! [`DashboardRun`] so the Plotters widget only draws.

use chrono::{Datelike, NaiveDate};

use crate::analysis::calendar::{CalendarCell, calendar_cells, value_range};
use crate::app::pipeline::DashboardRun;
use crate::domain::Indicator;

/// The charts the pane cycles through, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    UnemploymentRate,
    MonthlyJobs,
    YearlyJobs,
    UnemploymentHeatmap,
    ParticipationRate,
    EmploymentPopulation,
    EmploymentVsUnemployment,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::UnemploymentRate,
        ChartKind::MonthlyJobs,
        ChartKind::YearlyJobs,
        ChartKind::UnemploymentHeatmap,
        ChartKind::ParticipationRate,
        ChartKind::EmploymentPopulation,
        ChartKind::EmploymentVsUnemployment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::UnemploymentRate => "U.S. Unemployment Rate Over Time",
            ChartKind::MonthlyJobs => "Monthly Change in U.S. Nonfarm Employment",
            ChartKind::YearlyJobs => "Yearly Change in U.S. Nonfarm Employment",
            ChartKind::UnemploymentHeatmap => "Unemployment Rate Heatmap",
            ChartKind::ParticipationRate => "Labor Force Participation Rate",
            ChartKind::EmploymentPopulation => "Employment-Population Ratio",
            ChartKind::EmploymentVsUnemployment => "U.S. Employment and Unemployment",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Finalized data for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Line {
        points: Vec<(f64, f64)>,
        x_bounds: [f64; 2],
        y_bounds: [f64; 2],
        y_label: &'static str,
    },
    /// Bars centred on `x`, `width` wide, rising from zero.
    Bars {
        bars: Vec<(f64, f64)>,
        width: f64,
        x_bounds: [f64; 2],
        y_bounds: [f64; 2],
        x_is_year: bool,
        y_label: &'static str,
    },
    /// Month (x) by year (y) grid.
    Heatmap {
        cells: Vec<CalendarCell>,
        x_bounds: [f64; 2],
        y_bounds: [f64; 2],
        value_range: (f64, f64),
    },
    DualAxis {
        left: Vec<(f64, f64)>,
        right: Vec<(f64, f64)>,
        x_bounds: [f64; 2],
        left_bounds: [f64; 2],
        right_bounds: [f64; 2],
        left_label: &'static str,
        right_label: &'static str,
    },
    /// Nothing to draw; the message explains why.
    Empty(String),
}

/// Build the data for `kind` from the current run.
pub fn chart_data(run: &DashboardRun, kind: ChartKind) -> ChartData {
    match kind {
        ChartKind::UnemploymentRate => line(run, Indicator::UnemploymentRate),
        ChartKind::ParticipationRate => line(run, Indicator::ParticipationRate),
        ChartKind::EmploymentPopulation => line(run, Indicator::EmploymentPopulationRatio),
        ChartKind::MonthlyJobs => monthly_bars(run),
        ChartKind::YearlyJobs => yearly_bars(run),
        ChartKind::UnemploymentHeatmap => heatmap(run),
        ChartKind::EmploymentVsUnemployment => dual_axis(run),
    }
}

/// Month start as fractional years (`2024-03-01` -> `2024.1667`).
pub fn month_x(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0
}

/// Inverse of [`month_x`] for tick labels.
pub fn fmt_month_x(v: f64) -> String {
    let year = v.floor();
    let month = (((v - year) * 12.0).round() as i64).clamp(0, 11) + 1;
    format!("{:.0}-{month:02}", year)
}

fn line(run: &DashboardRun, indicator: Indicator) -> ChartData {
    let points: Vec<(f64, f64)> = run
        .table
        .observed(indicator.label())
        .into_iter()
        .map(|(d, v)| (month_x(d), v))
        .collect();
    if points.is_empty() {
        return no_data(indicator.label());
    }

    ChartData::Line {
        x_bounds: x_bounds(&points, 1.0 / 12.0),
        y_bounds: padded_bounds(points.iter().map(|p| p.1), false),
        points,
        y_label: indicator.unit().label(),
    }
}

fn monthly_bars(run: &DashboardRun) -> ChartData {
    let bars: Vec<(f64, f64)> = run
        .table
        .dates()
        .iter()
        .zip(&run.derived.month_over_month)
        .filter_map(|(d, v)| v.map(|v| (month_x(*d), v)))
        .collect();
    if bars.is_empty() {
        return no_data("monthly change");
    }

    let width = 0.8 / 12.0;
    ChartData::Bars {
        x_bounds: x_bounds(&bars, width),
        y_bounds: padded_bounds(bars.iter().map(|b| b.1), true),
        bars,
        width,
        x_is_year: false,
        y_label: "change (thousands)",
    }
}

fn yearly_bars(run: &DashboardRun) -> ChartData {
    let bars: Vec<(f64, f64)> = run
        .derived
        .yearly_change
        .iter()
        .map(|c| (c.year as f64, c.change))
        .collect();
    if bars.is_empty() {
        return no_data("yearly change");
    }

    ChartData::Bars {
        x_bounds: x_bounds(&bars, 1.0),
        y_bounds: padded_bounds(bars.iter().map(|b| b.1), true),
        bars,
        width: 0.8,
        x_is_year: true,
        y_label: "change (thousands)",
    }
}

fn heatmap(run: &DashboardRun) -> ChartData {
    let cells = calendar_cells(&run.table, Indicator::UnemploymentRate.label());
    let Some(range) = value_range(&cells) else {
        return no_data(Indicator::UnemploymentRate.label());
    };

    let first_year = cells.iter().map(|c| c.year).min().unwrap_or(0) as f64;
    let last_year = cells.iter().map(|c| c.year).max().unwrap_or(0) as f64;

    ChartData::Heatmap {
        cells,
        x_bounds: [0.5, 12.5],
        y_bounds: [first_year - 0.5, last_year + 0.5],
        value_range: range,
    }
}

fn dual_axis(run: &DashboardRun) -> ChartData {
    let to_points = |ind: Indicator| -> Vec<(f64, f64)> {
        run.table
            .observed(ind.label())
            .into_iter()
            .map(|(d, v)| (month_x(d), v))
            .collect()
    };
    let left = to_points(Indicator::Employment);
    let right = to_points(Indicator::Unemployment);
    if left.is_empty() && right.is_empty() {
        return no_data("employment/unemployment");
    }

    let all: Vec<(f64, f64)> = left.iter().chain(&right).copied().collect();
    ChartData::DualAxis {
        x_bounds: x_bounds(&all, 1.0 / 12.0),
        left_bounds: padded_bounds(left.iter().map(|p| p.1), false),
        right_bounds: padded_bounds(right.iter().map(|p| p.1), false),
        left,
        right,
        left_label: "employment (thousands)",
        right_label: "unemployment (thousands)",
    }
}

fn no_data(what: &str) -> ChartData {
    ChartData::Empty(format!("No observations for {what}."))
}

fn x_bounds(points: &[(f64, f64)], pad: f64) -> [f64; 2] {
    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    [min - pad, max + pad]
}

/// Min/max with 5% padding; bar charts always include the zero line.
fn padded_bounds(values: impl Iterator<Item = f64>, include_zero: bool) -> [f64; 2] {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let pad = ((hi - lo) * 0.05).max(1e-12);
    [lo - pad, hi + pad]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_with_source;
    use crate::app::pipeline::tests::{StubSource, sample_batch};
    use crate::domain::DashboardConfig;

    fn sample_run() -> DashboardRun {
        run_with_source(&StubSource::ok(sample_batch()), &DashboardConfig::new("k", 2024)).unwrap()
    }

    #[test]
    fn chart_cycle_wraps_both_ways() {
        assert_eq!(ChartKind::UnemploymentRate.prev(), ChartKind::EmploymentVsUnemployment);
        assert_eq!(ChartKind::EmploymentVsUnemployment.next(), ChartKind::UnemploymentRate);

        let mut kind = ChartKind::UnemploymentRate;
        for _ in 0..ChartKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, ChartKind::UnemploymentRate);
    }

    #[test]
    fn month_axis_round_trips_labels() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(fmt_month_x(month_x(d)), "2024-03");
        assert_eq!(fmt_month_x(2020.0), "2020-01");
        assert_eq!(fmt_month_x(2020.0 + 11.0 / 12.0), "2020-12");
    }

    #[test]
    fn every_chart_has_data_for_a_full_run() {
        let run = sample_run();
        for kind in ChartKind::ALL {
            assert!(
                !matches!(chart_data(&run, kind), ChartData::Empty(_)),
                "{} is empty",
                kind.title()
            );
        }
    }

    #[test]
    fn monthly_bars_skip_the_first_date_and_include_zero() {
        let run = sample_run();
        let ChartData::Bars { bars, y_bounds, x_is_year, .. } = chart_data(&run, ChartKind::MonthlyJobs) else {
            panic!("expected bars");
        };
        assert!(!x_is_year);
        assert_eq!(bars.len(), run.table.len() - 1);
        assert!(y_bounds[0] < 0.0 && y_bounds[1] > 0.0);
    }

    #[test]
    fn heatmap_spans_observed_years() {
        let run = sample_run();
        let ChartData::Heatmap { cells, y_bounds, x_bounds, .. } = chart_data(&run, ChartKind::UnemploymentHeatmap)
        else {
            panic!("expected heatmap");
        };
        assert_eq!(cells.len(), 5);
        assert_eq!(y_bounds, [2022.5, 2024.5]);
        assert_eq!(x_bounds, [0.5, 12.5]);
    }

    #[test]
    fn missing_column_renders_empty_message() {
        let mut batch = sample_batch();
        batch
            .series
            .retain(|s| s.series_id != Indicator::ParticipationRate.series_id());
        let run = run_with_source(&StubSource::ok(batch), &DashboardConfig::new("k", 2024)).unwrap();
        assert!(matches!(
            chart_data(&run, ChartKind::ParticipationRate),
            ChartData::Empty(_)
        ));
    }

    #[test]
    fn flat_series_gets_nonzero_bounds() {
        let b = padded_bounds([4.0, 4.0].into_iter(), false);
        assert!(b[1] > b[0]);
    }
}
