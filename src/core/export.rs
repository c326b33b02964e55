//! CSV export of product records.
//!
//! One row per record with a header row of field names. The caller picks
//! whether an existing file is replaced or appended to.

use crate::entities::{ProductRecord, ProductRecordColumn};
use crate::errors::Result;
use sea_orm::{IdenStatic, Iterable};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::info;

/// What to do with an existing file at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    #[default]
    Overwrite,
    /// Adds rows to the end; the header is written only if the file is empty.
    Append,
}

/// Writes `records` to `path` as CSV and returns the number of rows written.
pub fn export_records<P: AsRef<Path>>(
    records: &[ProductRecord],
    path: P,
    mode: ExportMode,
) -> Result<usize> {
    let path = path.as_ref();

    // Ensure parent directories exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file = match mode {
        ExportMode::Overwrite => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
        ExportMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
    };
    let write_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if write_header {
        let header: Vec<String> = ProductRecordColumn::iter()
            .map(|column| column.as_str().to_owned())
            .collect();
        writer.write_record(&header)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Exported {} records to {}", records.len(), path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{sample_record, test_date};

    const HEADER: &str = "date,stockcode,store,product_name,price,is_on_special,is_half_price,\
                          was_price,savings_amount,package_size,unit_weight_in_grams,\
                          cup_price,cup_measure,cup_string";

    #[test]
    fn test_overwrite_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("products.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale content\n").unwrap();

        let records = vec![
            sample_record("woolworths", "100", test_date(), 4.5),
            sample_record("coles", "200", test_date(), 3.0),
        ];
        let written = export_records(&records, &path, ExportMode::Overwrite).unwrap();
        assert_eq!(written, 2);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("2024-05-01,100,woolworths,Test Product 100,4.5,"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_header_follows_entity_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        export_records(&[], &path, ExportMode::Append).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let header: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(header.len(), 14);
        assert_eq!(header.first(), Some(&"date"));
        assert_eq!(header.last(), Some(&"cup_string"));
    }

    #[test]
    fn test_append_adds_rows_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        export_records(
            &[sample_record("woolworths", "1", test_date(), 1.0)],
            &path,
            ExportMode::Append,
        )
        .unwrap();
        export_records(
            &[sample_record("woolworths", "2", test_date(), 2.0)],
            &path,
            ExportMode::Append,
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.matches("product_name").count(), 1);
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/products.csv");

        assert_eq!(export_records(&[], &path, ExportMode::Overwrite).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap().trim_end(), HEADER);
    }

    #[test]
    fn test_missing_optional_fields_are_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let mut record = sample_record("coles", "9", test_date(), 1.0);
        record.cup_price = None;
        record.cup_measure = None;
        record.cup_string = None;

        export_records(&[record], &path, ExportMode::Overwrite).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(",,,"));
    }
}
