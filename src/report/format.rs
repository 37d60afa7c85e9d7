//! Formatted terminal output for the `summary` command.
//!
//! Formatting lives here so the pipeline stays presentation-free and output
//! changes stay localized.

use crate::app::pipeline::DashboardRun;
use crate::report::Kpis;

/// Format the full text summary: headline, KPI cards, yearly changes, recent rows.
pub fn format_summary(run: &DashboardRun, kpis: &Kpis, recent_rows: usize) -> String {
    let mut out = String::new();

    out.push_str("=== U.S. Labor Market Dashboard ===\n");
    out.push_str(&format!(
        "All data is for the latest month: {}\n",
        kpis.latest_month_label()
    ));
    out.push_str(&format!(
        "Rows: {} | columns: {} | skipped observations: {} | API status: {}\n",
        run.table.len(),
        run.table.columns().len(),
        run.skipped.len(),
        if run.api_status.is_empty() { "-" } else { run.api_status.as_str() },
    ));

    out.push_str("\nKPIs:\n");
    for card in &kpis.cards {
        out.push_str(&format!("  {:<32} {:>14}\n", card.title, card.formatted()));
    }

    out.push_str(&format!(
        "\nYearly change in {} (display units):\n",
        run.derived.level_column
    ));
    if run.derived.yearly_change.is_empty() {
        out.push_str("  (not enough years)\n");
    }
    for change in &run.derived.yearly_change {
        out.push_str(&format!(
            "  {}  {:>14}\n",
            change.year,
            format_signed_count(run.derived.scale(change.change))
        ));
    }

    out.push_str(&format_recent_rows(run, recent_rows));
    out
}

fn format_recent_rows(run: &DashboardRun, n: usize) -> String {
    let mut out = String::new();
    if n == 0 || run.table.is_empty() {
        return out;
    }

    out.push_str(&format!("\nRecent observations (last {}):\n", n.min(run.table.len())));

    let mut header = format!("{:<10}", "date");
    let mut rule = format!("{:-<10}", "");
    for col in run.table.columns() {
        header.push_str(&format!(" {:>12}", truncate(col.key(), 12)));
        rule.push_str(&format!(" {:-<12}", ""));
    }
    header.push_str(&format!(" {:>12}", "mom chg"));
    rule.push_str(&format!(" {:-<12}", ""));
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    let start = run.table.len().saturating_sub(n);
    for i in start..run.table.len() {
        let mut line = format!("{:<10}", run.table.dates()[i].format("%Y-%m-%d").to_string());
        for col in run.table.columns() {
            line.push_str(&format!(" {:>12}", fmt_cell(col.values()[i])));
        }
        line.push_str(&format!(" {:>12}", fmt_cell(run.derived.month_over_month[i])));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Whole number with `,` thousands separators, e.g. `-1,234,568`.
pub fn format_count(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_signed_count(v: f64) -> String {
    if v.round() > 0.0 {
        format!("+{}", format_count(v))
    } else {
        format_count(v)
    }
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_with_source;
    use crate::app::pipeline::tests::{StubSource, sample_batch};
    use crate::domain::DashboardConfig;

    #[test]
    fn count_grouping() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.4), "999");
        assert_eq!(format_count(1_000.0), "1,000");
        assert_eq!(format_count(158_123_456.0), "158,123,456");
        assert_eq!(format_count(-12_345.0), "-12,345");
        assert_eq!(format_signed_count(2_500.0), "+2,500");
        assert_eq!(format_signed_count(-2_500.0), "-2,500");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Unemployment Rate", 12), "Unemploymen.");
        assert_eq!(truncate("short", 12), "short");
    }

    #[test]
    fn summary_contains_headline_and_rows() {
        let run = run_with_source(&StubSource::ok(sample_batch()), &DashboardConfig::new("k", 2024)).unwrap();
        let kpis = Kpis::from_run(&run).unwrap();
        let txt = format_summary(&run, &kpis, 2);

        assert!(txt.contains("All data is for the latest month: March 2024"));
        assert!(txt.contains("Nonfarm Jobs Added (Monthly)"));
        assert!(txt.contains("Yearly change in Total Nonfarm Employment"));
        assert!(txt.contains("Recent observations (last 2):"));
        assert!(txt.contains("2024-02-01"));
        assert!(txt.contains("2024-03-01"));
        assert!(!txt.contains("2024-01-01"));
    }
}
