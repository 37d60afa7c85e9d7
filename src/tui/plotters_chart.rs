//! Plotters-powered dashboard chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - bars, heatmap cells and a secondary y axis without manual work
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use super::series::{ChartData, fmt_month_x};

const LINE_RED: RGBColor = RGBColor(255, 123, 114);
const LINE_BLUE: RGBColor = RGBColor(88, 166, 255);

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Render-only chart: all series and bounds are computed before `render()`.
pub struct LaborPlottersChart<'a> {
    pub data: &'a ChartData,
}

impl<'a> Widget for LaborPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        match self.data {
            ChartData::Empty(msg) => {
                buf.set_string(area.x, area.y, msg, Style::default().fg(Color::Yellow));
            }
            ChartData::Line {
                points,
                x_bounds,
                y_bounds,
                y_label,
            } => {
                if !valid(x_bounds) || !valid(y_bounds) {
                    return;
                }
                let [x0, x1] = *x_bounds;
                let [y0, y1] = *y_bounds;
                widget_fn(move |root| {
                    let mut chart = ChartBuilder::on(&root)
                        .margin(1)
                        .set_label_area_size(LabelAreaPosition::Left, 6)
                        .set_label_area_size(LabelAreaPosition::Bottom, 3)
                        .build_cartesian_2d(x0..x1, y0..y1)?;

                    chart
                        .configure_mesh()
                        .disable_x_mesh()
                        .disable_y_mesh()
                        .x_desc("date")
                        .y_desc(*y_label)
                        .x_labels(5)
                        .y_labels(5)
                        .x_label_formatter(&|v| fmt_month_x(*v))
                        .y_label_formatter(&|v| format!("{v:.1}"))
                        .label_style(("sans-serif", 10).into_font().color(&WHITE))
                        .axis_style(&WHITE)
                        .bold_line_style(&WHITE)
                        .draw()?;

                    chart.draw_series(LineSeries::new(points.iter().copied(), &LINE_RED))?;
                    // `Circle` radii are mis-scaled by the backend; a `Pixel` marks each month.
                    chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
                    Ok(())
                })
                .render(area, buf);
            }
            ChartData::Bars {
                bars,
                width,
                x_bounds,
                y_bounds,
                x_is_year,
                y_label,
            } => {
                if !valid(x_bounds) || !valid(y_bounds) {
                    return;
                }
                let [x0, x1] = *x_bounds;
                let [y0, y1] = *y_bounds;
                let half = *width / 2.0;
                let x_is_year = *x_is_year;
                widget_fn(move |root| {
                    let mut chart = ChartBuilder::on(&root)
                        .margin(1)
                        .set_label_area_size(LabelAreaPosition::Left, 8)
                        .set_label_area_size(LabelAreaPosition::Bottom, 3)
                        .build_cartesian_2d(x0..x1, y0..y1)?;

                    chart
                        .configure_mesh()
                        .disable_x_mesh()
                        .disable_y_mesh()
                        .x_desc(if x_is_year { "year" } else { "date" })
                        .y_desc(*y_label)
                        .x_labels(5)
                        .y_labels(5)
                        .x_label_formatter(&|v| {
                            if x_is_year {
                                format!("{v:.0}")
                            } else {
                                fmt_month_x(*v)
                            }
                        })
                        .y_label_formatter(&|v| format!("{v:.0}"))
                        .label_style(("sans-serif", 10).into_font().color(&WHITE))
                        .axis_style(&WHITE)
                        .bold_line_style(&WHITE)
                        .draw()?;

                    chart.draw_series(
                        bars.iter()
                            .map(|&(x, y)| Rectangle::new([(x - half, 0.0), (x + half, y)], LINE_BLUE.filled())),
                    )?;
                    Ok(())
                })
                .render(area, buf);
            }
            ChartData::Heatmap {
                cells,
                x_bounds,
                y_bounds,
                value_range,
            } => {
                if !valid(x_bounds) || !valid(y_bounds) {
                    return;
                }
                let [x0, x1] = *x_bounds;
                let [y0, y1] = *y_bounds;
                let (lo, hi) = *value_range;
                widget_fn(move |root| {
                    let mut chart = ChartBuilder::on(&root)
                        .margin(1)
                        .set_label_area_size(LabelAreaPosition::Left, 6)
                        .set_label_area_size(LabelAreaPosition::Bottom, 3)
                        .build_cartesian_2d(x0..x1, y0..y1)?;

                    chart
                        .configure_mesh()
                        .disable_x_mesh()
                        .disable_y_mesh()
                        .x_desc("month")
                        .y_desc("year")
                        .x_labels(12)
                        .y_labels(((y1 - y0).round() as usize).clamp(2, 12))
                        .x_label_formatter(&|v| month_abbr(*v))
                        .y_label_formatter(&|v| format!("{v:.0}"))
                        .label_style(("sans-serif", 10).into_font().color(&WHITE))
                        .axis_style(&WHITE)
                        .bold_line_style(&WHITE)
                        .draw()?;

                    chart.draw_series(cells.iter().map(|c| {
                        let x = c.month as f64;
                        let y = c.year as f64;
                        Rectangle::new(
                            [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                            jet(normalize(c.value, lo, hi)).filled(),
                        )
                    }))?;
                    Ok(())
                })
                .render(area, buf);
            }
            ChartData::DualAxis {
                left,
                right,
                x_bounds,
                left_bounds,
                right_bounds,
                left_label,
                right_label,
            } => {
                if !valid(x_bounds) || !valid(left_bounds) || !valid(right_bounds) {
                    return;
                }
                let [x0, x1] = *x_bounds;
                let [l0, l1] = *left_bounds;
                let [r0, r1] = *right_bounds;
                widget_fn(move |root| {
                    let mut chart = ChartBuilder::on(&root)
                        .margin(1)
                        .set_label_area_size(LabelAreaPosition::Left, 8)
                        .set_label_area_size(LabelAreaPosition::Right, 8)
                        .set_label_area_size(LabelAreaPosition::Bottom, 3)
                        .build_cartesian_2d(x0..x1, l0..l1)?
                        .set_secondary_coord(x0..x1, r0..r1);

                    chart
                        .configure_mesh()
                        .disable_x_mesh()
                        .disable_y_mesh()
                        .x_desc("date")
                        .y_desc(*left_label)
                        .x_labels(5)
                        .y_labels(5)
                        .x_label_formatter(&|v| fmt_month_x(*v))
                        .y_label_formatter(&|v| format!("{v:.0}"))
                        .label_style(("sans-serif", 10).into_font().color(&LINE_BLUE))
                        .axis_style(&WHITE)
                        .bold_line_style(&WHITE)
                        .draw()?;

                    chart
                        .configure_secondary_axes()
                        .y_desc(*right_label)
                        .y_labels(5)
                        .y_label_formatter(&|v| format!("{v:.0}"))
                        .label_style(("sans-serif", 10).into_font().color(&LINE_RED))
                        .axis_style(&WHITE)
                        .draw()?;

                    chart.draw_series(LineSeries::new(left.iter().copied(), &LINE_BLUE))?;
                    chart.draw_secondary_series(LineSeries::new(right.iter().copied(), &LINE_RED))?;
                    Ok(())
                })
                .render(area, buf);
            }
        }
    }
}

fn valid(bounds: &[f64; 2]) -> bool {
    bounds[0].is_finite() && bounds[1].is_finite() && bounds[1] > bounds[0]
}

fn month_abbr(v: f64) -> String {
    let m = v.round() as i64;
    if (1..=12).contains(&m) {
        MONTHS[(m - 1) as usize].to_string()
    } else {
        String::new()
    }
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo { ((v - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 }
}

/// Blue -> cyan -> yellow -> red ramp for `t` in `[0, 1]`.
fn jet(t: f64) -> RGBColor {
    let channel = |offset: f64| -> u8 {
        let v = 1.5 - (4.0 * t - offset).abs();
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}
