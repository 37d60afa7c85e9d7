//! Ratatui-based terminal UI.
//!
//! The dashboard shows the latest month, a row of KPI cards, and one chart pane
//! that cycles through the labor-market charts.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{self, DashboardRun};
use crate::data::BlsClient;
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::report::Kpis;

mod plotters_chart;
pub mod series;

use plotters_chart::LaborPlottersChart;
use series::{ChartData, ChartKind, chart_data};

/// Start the TUI.
///
/// The first fetch happens before the terminal is taken over so a failure is
/// reported like any other command error.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let client = BlsClient::from_config(&config)?;
    let run = pipeline::run_with_source(&client, &config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, client, run);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: DashboardConfig,
    client: BlsClient,
    run: DashboardRun,
    kpis: Option<Kpis>,
    chart: ChartKind,
    /// Rebuilt whenever the run or the selected chart changes.
    chart_data: ChartData,
    status: String,
}

impl App {
    fn new(config: DashboardConfig, client: BlsClient, run: DashboardRun) -> Self {
        let chart = ChartKind::UnemploymentRate;
        let status = loaded_status(&run);
        Self {
            kpis: Kpis::from_run(&run),
            chart_data: chart_data(&run, chart),
            config,
            client,
            run,
            chart,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code, terminal)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key<B: ratatui::backend::Backend>(
        &mut self,
        code: KeyCode,
        terminal: &mut Terminal<B>,
    ) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Right | KeyCode::Tab => self.select_chart(self.chart.next()),
            KeyCode::Left | KeyCode::BackTab => self.select_chart(self.chart.prev()),
            KeyCode::Char('r') => {
                self.status = "Fetching BLS data...".to_string();
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                self.refetch();
            }
            _ => {}
        }
        Ok(false)
    }

    fn select_chart(&mut self, chart: ChartKind) {
        self.chart = chart;
        self.chart_data = chart_data(&self.run, chart);
    }

    /// A failed refetch keeps the current data on screen.
    fn refetch(&mut self) {
        match pipeline::run_with_source(&self.client, &self.config) {
            Ok(run) => {
                self.status = loaded_status(&run);
                self.kpis = Kpis::from_run(&run);
                self.chart_data = chart_data(&run, self.chart);
                self.run = run;
            }
            Err(err) => {
                tracing::warn!(error = %err, "refetch failed");
                self.status = format!("Refetch failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_kpis(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let latest = self
            .kpis
            .as_ref()
            .map(|k| k.latest_month_label())
            .unwrap_or_else(|| "-".to_string());

        let line = Line::from(vec![
            Span::styled(
                "U.S. Labor Market Dashboard",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(
                format!("All data is for the latest month: {latest}"),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_kpis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(kpis) = &self.kpis else {
            frame.render_widget(Paragraph::new("No KPIs available.").block(Block::default().borders(Borders::ALL)), area);
            return;
        };

        let n = kpis.cards.len().max(1) as u32;
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..n).map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
            .split(area);

        for (card, cell) in kpis.cards.iter().zip(cells.iter()) {
            let value_style = match card.value {
                Some(_) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                None => Style::default().fg(Color::DarkGray),
            };
            let text = Text::from(vec![
                Line::from(Span::styled(card.formatted(), value_style)),
                Line::from(Span::styled(card.title, Style::default().fg(Color::Gray))),
            ]);
            let p = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, *cell);
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let position = ChartKind::ALL.iter().position(|k| *k == self.chart).unwrap_or(0) + 1;
        let title = format!(" {} ({position}/{}) ", self.chart.title(), ChartKind::ALL.len());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        frame.render_widget(LaborPlottersChart { data: &self.chart_data }, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ or Tab chart  r refetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn loaded_status(run: &DashboardRun) -> String {
    let mut status = format!("{} months loaded", run.table.len());
    if !run.skipped.is_empty() {
        status.push_str(&format!(", {} observations skipped", run.skipped.len()));
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::{StubSource, sample_batch};
    use crate::domain::SeriesPoint;

    #[test]
    fn status_mentions_skips_only_when_present() {
        let config = DashboardConfig::new("k", 2024);
        let run = pipeline::run_with_source(&StubSource::ok(sample_batch()), &config).unwrap();
        assert_eq!(loaded_status(&run), "5 months loaded");

        let mut batch = sample_batch();
        batch.series[0].points.push(SeriesPoint {
            year: "2023".into(),
            period: "M13".into(),
            value: "1.0".into(),
        });
        let run = pipeline::run_with_source(&StubSource::ok(batch), &config).unwrap();
        assert_eq!(loaded_status(&run), "5 months loaded, 1 observations skipped");
    }
}
