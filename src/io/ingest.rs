//! CSV ingest of comment records.
//!
//! Reads the observed social dataset (or a previously exported simulation)
//! into `EventRecord`s.
//!
//! Design goals:
//! - **Strict schema** for the four required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Pass-through tolerance**: extra columns are ignored

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{COL_POST_ID, COL_SEQUENCE, COL_TIME, COL_USER_ID, EventRecord};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 4] = [COL_USER_ID, COL_POST_ID, COL_TIME, COL_SEQUENCE];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed records + row errors.
#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<EventRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load comment records from a CSV file.
pub fn load_records(path: &Path) -> Result<IngestedRecords, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_records(file)?;

    if !ingested.row_errors.is_empty() {
        warn!(
            path = %path.display(),
            skipped = ingested.row_errors.len(),
            first_line = ingested.row_errors[0].line,
            first_error = %ingested.row_errors[0].message,
            "skipped invalid rows"
        );
    }
    info!(path = %path.display(), rows = ingested.records.len(), "records loaded");
    Ok(ingested)
}

/// Parse comment records from any CSV source.
pub fn read_records<R: Read>(source: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::config(format!("Missing required column: `{name}`")));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map) {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::data("No valid rows remain after parsing."));
    }

    Ok(IngestedRecords {
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<EventRecord, String> {
    let user_id = get_required(record, header_map, COL_USER_ID)?.to_string();
    let post_id = get_required(record, header_map, COL_POST_ID)?.to_string();

    let raw_time = get_required(record, header_map, COL_TIME)?;
    let time = raw_time
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid `{COL_TIME}` value '{raw_time}'."))?;

    let raw_seq = get_required(record, header_map, COL_SEQUENCE)?;
    let sequence_index = parse_sequence(raw_seq)
        .ok_or_else(|| format!("Invalid `{COL_SEQUENCE}` value '{raw_seq}' (expected integer >= 1)."))?;

    Ok(EventRecord {
        user_id,
        post_id,
        time,
        sequence_index,
    })
}

/// Accept `3` as well as `3.0` (dataframe exports often write floats).
fn parse_sequence(s: &str) -> Option<u32> {
    if let Ok(v) = s.parse::<u32>() {
        return (v >= 1).then_some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.fract() == 0.0 && v >= 1.0 && v <= u32::MAX as f64 {
        Some(v as u32)
    } else {
        None
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const HEADER: &str =
        "post_id,user_id,temporal_distance_birth_base_100h,sequential_number_of_comment_by_user_in_thread,platform\n";

    #[test]
    fn reads_required_columns_in_any_order() {
        let csv = format!("{HEADER}P1,u1,0.25,1,fb\nP1,u1,0.5,2.0,fb\n");
        let out = read_records(csv.as_bytes()).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].sequence_index, 2);
        assert_eq!(out.records[1].time, 0.5);
        assert_eq!(out.records[0].user_id, "u1");
    }

    #[test]
    fn bad_rows_are_reported_and_skipped() {
        let csv = format!("{HEADER}P1,u1,abc,1,fb\nP1,u2,0.3,0,fb\nP2,u1,0.1,1,fb\n,u3,0.1,1,fb\n");
        let out = read_records(csv.as_bytes()).unwrap();
        assert_eq!(out.rows_read, 4);
        assert_eq!(out.records.len(), 1);
        let lines: Vec<usize> = out.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 5]);
    }

    #[test]
    fn bom_and_case_in_headers_are_tolerated() {
        let csv = "\u{feff}Post_ID,USER_ID,temporal_distance_birth_base_100h,sequential_number_of_comment_by_user_in_thread\nP,u,0.1,1\n";
        let out = read_records(csv.as_bytes()).unwrap();
        assert_eq!(out.records[0].post_id, "P");
    }

    #[test]
    fn missing_column_is_a_config_error() {
        let csv = "post_id,user_id,temporal_distance_birth_base_100h\nP,u,0.1\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains(COL_SEQUENCE));
    }

    #[test]
    fn no_valid_rows_is_a_data_error() {
        let csv = format!("{HEADER}P1,u1,x,1,fb\n");
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}
