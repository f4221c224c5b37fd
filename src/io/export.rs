//! CSV exports of event records and ECDF tables.
//!
//! Record exports use the observed dataset's column names so a simulation can
//! be reloaded with `load_records`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{EcdfRow, EventRecord};
use crate::error::AppError;

/// Write event records to a CSV file.
pub fn write_records_csv(path: &Path, records: &[EventRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create records CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    for r in records {
        writer
            .serialize(r)
            .map_err(|e| AppError::config(format!("Failed to write records CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush records CSV: {e}")))?;
    Ok(())
}

/// Write an ECDF table to a CSV file.
pub fn write_ecdf_csv(path: &Path, rows: &[EcdfRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create ECDF CSV '{}': {e}", path.display())))?;
    write_ecdf(file, rows)
}

/// Write an ECDF table as CSV to any writer (e.g. stdout).
pub fn write_ecdf<W: Write>(sink: W, rows: &[EcdfRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    for r in rows {
        writer
            .serialize(r)
            .map_err(|e| AppError::config(format!("Failed to write ECDF CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush ECDF CSV: {e}")))?;
    Ok(())
}

/// Read an ECDF table written by `write_ecdf_csv`.
pub fn read_ecdf_csv(path: &Path) -> Result<Vec<EcdfRow>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open ECDF CSV '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    reader
        .deserialize()
        .enumerate()
        .map(|(idx, row)| {
            row.map_err(|e| AppError::config(format!("Invalid ECDF CSV row at line {}: {e}", idx + 2)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_records;

    #[test]
    fn exported_records_reload_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.csv");
        let records = vec![
            EventRecord {
                user_id: "User_0".to_string(),
                post_id: "P1".to_string(),
                time: 0.125,
                sequence_index: 1,
            },
            EventRecord {
                user_id: "User_0".to_string(),
                post_id: "P1".to_string(),
                time: 0.5,
                sequence_index: 2,
            },
        ];
        write_records_csv(&path, &records).unwrap();
        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded.records, records);
        assert!(loaded.row_errors.is_empty());
    }

    #[test]
    fn ecdf_table_reloads_with_named_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecdf.csv");
        let rows = vec![EcdfRow {
            post_id: "P1".to_string(),
            time_grid_value: 0.25,
            share: 0.5,
            share_cc: 0.25,
        }];
        write_ecdf_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("post_id,time_grid_value,share,share_cc"));
        assert_eq!(read_ecdf_csv(&path).unwrap(), rows);
    }
}
