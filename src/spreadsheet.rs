//! Spreadsheet export
//!
//! One CSV row per projected year, same columns and order as the
//! narrative's financial table.

use crate::models::{FinancialProjection, PROJECTION_COLUMNS, YEAR_COLUMN};
use crate::Result;
use std::path::Path;
use tracing::debug;

/// Cell text for a projected amount
pub fn format_cell(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn export(projection: &FinancialProjection, destination: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(destination)?;

    let mut header = Vec::with_capacity(PROJECTION_COLUMNS.len() + 1);
    header.push(YEAR_COLUMN);
    header.extend(PROJECTION_COLUMNS);
    writer.write_record(&header)?;

    for row in projection.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.label());
        record.extend(row.values().iter().map(|v| format_cell(*v)));
        writer.write_record(&record)?;
    }

    writer.flush()?;

    debug!(path = %destination.display(), rows = projection.rows().len(), "Spreadsheet written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::project;
    use crate::models::ProjectBrief;

    #[test]
    fn test_export_rows_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("financials.csv");

        let mut brief = ProjectBrief::new("Rice Mill", "rice processing unit");
        brief.capacity = Some(2000.0);
        let (projection, _) = project(&brief);

        export(&projection, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, vec!["Year", "Revenue", "Variable Cost", "Fixed Cost", "EBITDA"]);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 5);
        assert_eq!(&records[0][0], "Year 1");
        assert_eq!(&records[0][1], "200000.00");
        assert_eq!(&records[0][4], "-80000.00");
        assert_eq!(&records[4][0], "Year 5");
        assert_eq!(&records[4][4], "-81600.00");
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("financials.csv");
        let (projection, _) = project(&ProjectBrief::new("Plant", "x"));
        assert!(export(&projection, &path).is_err());
    }
}
