//! KPI cards and text reports.

use chrono::NaiveDate;

use crate::app::pipeline::DashboardRun;
use crate::domain::Indicator;

pub mod format;

pub use format::{format_count, format_summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiFormat {
    /// One decimal with a `%` suffix.
    Percent,
    /// Whole number with thousands separators.
    Count,
}

/// One headline card.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub title: &'static str,
    /// `None` when the latest month has no value for this card.
    pub value: Option<f64>,
    pub format: KpiFormat,
}

impl Kpi {
    pub fn formatted(&self) -> String {
        match (self.value, self.format) {
            (None, _) => "n/a".to_string(),
            (Some(v), KpiFormat::Percent) => format!("{v:.1}%"),
            (Some(v), KpiFormat::Count) => format_count(v),
        }
    }
}

/// Headline values for the latest month.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub latest_date: NaiveDate,
    pub cards: Vec<Kpi>,
}

impl Kpis {
    pub fn from_run(run: &DashboardRun) -> Option<Kpis> {
        let latest_date = run.table.latest_date()?;
        let table = &run.table;
        let derived = &run.derived;

        let cards = vec![
            Kpi {
                title: "Unemployment Rate",
                value: table.latest_value(Indicator::UnemploymentRate.label()),
                format: KpiFormat::Percent,
            },
            Kpi {
                title: "Nonfarm Jobs Added (Monthly)",
                value: derived.latest_month_over_month_display(),
                format: KpiFormat::Count,
            },
            Kpi {
                title: "Total Nonfarm Employment",
                value: table
                    .latest_value(Indicator::NonfarmPayrolls.label())
                    .map(|v| derived.scale(v)),
                format: KpiFormat::Count,
            },
            Kpi {
                title: "Labor Force Participation Rate",
                value: table.latest_value(Indicator::ParticipationRate.label()),
                format: KpiFormat::Percent,
            },
            Kpi {
                title: "Employment-Population Ratio",
                value: table.latest_value(Indicator::EmploymentPopulationRatio.label()),
                format: KpiFormat::Percent,
            },
        ];

        Some(Kpis { latest_date, cards })
    }

    /// e.g. `March 2024`.
    pub fn latest_month_label(&self) -> String {
        self.latest_date.format("%B %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_with_source;
    use crate::app::pipeline::tests::{StubSource, sample_batch};
    use crate::domain::DashboardConfig;

    #[test]
    fn kpis_from_latest_month() {
        let run = run_with_source(&StubSource::ok(sample_batch()), &DashboardConfig::new("k", 2024)).unwrap();
        let kpis = Kpis::from_run(&run).unwrap();

        assert_eq!(kpis.latest_month_label(), "March 2024");
        assert_eq!(kpis.cards.len(), 5);

        // Unemployment rate: base 400 + 1 + 3.
        assert_eq!(kpis.cards[0].value, Some(404.0));
        assert_eq!(kpis.cards[0].formatted(), "404.0%");
        assert_eq!(kpis.cards[1].formatted(), "1,000");
        // Nonfarm: (500 + 1 + 3) thousand.
        assert_eq!(kpis.cards[2].formatted(), "504,000");
    }

    #[test]
    fn gap_on_latest_month_shows_unavailable() {
        let mut batch = sample_batch();
        let ur = batch
            .series
            .iter_mut()
            .find(|s| s.series_id == Indicator::UnemploymentRate.series_id())
            .unwrap();
        ur.points[0].value = "-".into();

        let run = run_with_source(&StubSource::ok(batch), &DashboardConfig::new("k", 2024)).unwrap();
        let kpis = Kpis::from_run(&run).unwrap();
        assert_eq!(kpis.cards[0].value, None);
        assert_eq!(kpis.cards[0].formatted(), "n/a");
    }
}
