//! Export the observation table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Gaps are written as empty fields.

use std::path::Path;

use crate::app::pipeline::DashboardRun;
use crate::error::AppError;

/// Write every table column plus the monthly change of the level column.
pub fn write_table_csv(path: &Path, run: &DashboardRun) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["date".to_string()];
    header.extend(run.table.columns().iter().map(|c| c.key().to_string()));
    header.push(format!("{} monthly change", run.derived.level_column));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, date) in run.table.dates().iter().enumerate() {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        row.extend(run.table.columns().iter().map(|col| fmt_opt(col.values()[i])));
        row.push(fmt_opt(run.derived.month_over_month[i]));
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row {date}: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), rows = run.table.len(), "table exported");
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::app::pipeline::run_with_source;
    use crate::app::pipeline::tests::{StubSource, sample_batch};
    use crate::domain::{DashboardConfig, Indicator};
    use crate::table::rename;

    fn sample_run() -> DashboardRun {
        run_with_source(&StubSource::ok(sample_batch()), &DashboardConfig::new("k", 2024)).unwrap()
    }

    #[test]
    fn writes_header_and_one_line_per_date() {
        let run = sample_run();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labor.csv");

        write_table_csv(&path, &run).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + run.table.len());
        assert!(lines[0].starts_with("date,Civilian Labor Force,"));
        assert!(lines[0].ends_with("Total Nonfarm Employment monthly change"));
        assert_eq!(lines[0].split(',').count(), 2 + Indicator::ALL.len());
        // First row has no monthly change.
        assert!(lines[1].starts_with("2023-11-01,"));
        assert!(lines[1].ends_with(','));
        assert!(lines[5].starts_with("2024-03-01,"));
        assert!(lines[5].ends_with(",1"));
    }

    #[test]
    fn labels_with_commas_and_quotes_read_back_intact() {
        let mut run = sample_run();
        let mapping = HashMap::from([(
            Indicator::LaborForce.label().to_string(),
            "Labor force, \"civilian\"".to_string(),
        )]);
        run.table = rename(&run.table, &mapping);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labor.csv");
        write_table_csv(&path, &run).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 2 + Indicator::ALL.len());
        assert_eq!(&headers[1], "Labor force, \"civilian\"");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), run.table.len());
        assert!(rows.iter().all(|r| r.len() == headers.len()));
        assert_eq!(&rows[0][headers.len() - 1], "");
    }

    #[test]
    fn unwritable_path_is_a_config_error() {
        let run = sample_run();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("labor.csv");

        let err = write_table_csv(&path, &run).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("labor.csv"));
    }
}
