#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Case table loading for the outbreak map.
//!
//! The case file is a CSV export of the simulation output: one row per
//! location per day, with a `zid` join key, `x`/`y` coordinates, a `date`
//! day number, and an open-ended set of scenario count columns. Columns
//! beyond the four reserved ones are classified as numeric or text by
//! scanning their values — the scenario set is data, not schema.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use outbreak_map_epidemic_models::{CaseRow, CaseTable, Location};
use thiserror::Error;

/// Columns with fixed meaning; everything else is a data column.
static RESERVED_COLUMNS: &[&str] = &["zid", "x", "y", "date"];

/// Errors from case table loading.
#[derive(Debug, Error)]
pub enum CasesError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header.
    #[error("Case table is missing required column '{name}'")]
    MissingColumn {
        /// The absent column name.
        name: String,
    },

    /// A key field failed to parse.
    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidField {
        /// Column holding the bad value.
        column: String,
        /// The unparseable value.
        value: String,
        /// 1-based line number in the source file.
        line: u64,
    },
}

/// Loads the case table from a CSV file.
///
/// # Errors
///
/// Returns [`CasesError`] if the file cannot be read, the `zid` or `date`
/// column is absent, or a key field fails to parse.
pub fn load_case_table(path: &Path) -> Result<CaseTable, CasesError> {
    let file = std::fs::File::open(path)?;
    let table = read_case_table(file)?;
    log::info!(
        "Loaded {} case rows ({} numeric columns) from {}",
        table.len(),
        table.numeric_columns.len(),
        path.display()
    );
    Ok(table)
}

/// Extracts the distinct locations from a case CSV file.
///
/// # Errors
///
/// Returns [`CasesError`] if the file cannot be read or lacks the
/// `zid`/`x`/`y` columns.
pub fn load_locations(path: &Path) -> Result<Vec<Location>, CasesError> {
    let file = std::fs::File::open(path)?;
    let locations = read_locations(file)?;
    log::info!(
        "Found {} distinct locations in {}",
        locations.len(),
        path.display()
    );
    Ok(locations)
}

/// Reads the case table from any CSV reader.
///
/// # Errors
///
/// Returns [`CasesError`] on malformed CSV, a missing `zid`/`date`
/// column, or an unparseable key field.
pub fn read_case_table<R: Read>(reader: R) -> Result<CaseTable, CasesError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let zid_idx = column_index(&headers, "zid")?;
    let date_idx = column_index(&headers, "date")?;

    let records = csv_reader
        .into_records()
        .collect::<Result<Vec<_>, _>>()?;

    // Classify the non-reserved columns: numeric iff every non-empty
    // value parses as a float and at least one value is present.
    let data_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !RESERVED_COLUMNS.contains(name))
        .collect();

    let numeric_columns: Vec<String> = data_columns
        .iter()
        .filter(|(idx, _)| {
            let mut any = false;
            let all_parse = records.iter().all(|record| {
                match record.get(*idx).map(str::trim) {
                    None | Some("") => true,
                    Some(value) => {
                        any = true;
                        value.parse::<f64>().is_ok()
                    }
                }
            });
            any && all_parse
        })
        .map(|(_, name)| (*name).to_string())
        .collect();

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let line = record.position().map_or(0, csv::Position::line);
        let zid: i64 = parse_field(record, zid_idx, "zid", line)?;
        let date: u32 = parse_field(record, date_idx, "date", line)?;

        let mut numeric = BTreeMap::new();
        let mut text = BTreeMap::new();
        for (idx, name) in &data_columns {
            let Some(value) = record.get(*idx).map(str::trim) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            if numeric_columns.iter().any(|c| c == name) {
                // Classified numeric above, so the parse cannot fail here.
                if let Ok(parsed) = value.parse::<f64>() {
                    numeric.insert((*name).to_string(), parsed);
                }
            } else {
                text.insert((*name).to_string(), value.to_string());
            }
        }

        rows.push(CaseRow {
            zid,
            date,
            numeric,
            text,
        });
    }

    Ok(CaseTable {
        numeric_columns,
        rows,
    })
}

/// Reads the distinct locations from any CSV reader.
///
/// One location per `zid`; the first occurrence of each identifier wins,
/// matching the cache's one-address-per-identifier contract.
///
/// # Errors
///
/// Returns [`CasesError`] on malformed CSV, missing `zid`/`x`/`y`
/// columns, or an unparseable field.
pub fn read_locations<R: Read>(reader: R) -> Result<Vec<Location>, CasesError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let zid_idx = column_index(&headers, "zid")?;
    let x_idx = column_index(&headers, "x")?;
    let y_idx = column_index(&headers, "y")?;

    let mut seen = std::collections::BTreeSet::new();
    let mut locations = Vec::new();

    for record in csv_reader.into_records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let zid: i64 = parse_field(&record, zid_idx, "zid", line)?;

        if !seen.insert(zid) {
            continue;
        }

        let x: f64 = parse_field(&record, x_idx, "x", line)?;
        let y: f64 = parse_field(&record, y_idx, "y", line)?;
        locations.push(Location { zid, x, y });
    }

    Ok(locations)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, CasesError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| CasesError::MissingColumn {
            name: name.to_string(),
        })
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<T, CasesError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| CasesError::InvalidField {
        column: column.to_string(),
        value: raw.to_string(),
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
zid,x,y,date,sick,sick_1,rel,comment
1,37.61,55.75,1,3,1,0.4,ok
1,37.61,55.75,2,5,2,0.6,
2,36.90,55.40,1,7,3,1.2,check
";

    #[test]
    fn classifies_numeric_and_text_columns() {
        let table = read_case_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.numeric_columns, vec!["sick", "sick_1", "rel"]);
        assert_eq!(table.len(), 3);

        let first = &table.rows[0];
        assert_eq!(first.zid, 1);
        assert_eq!(first.date, 1);
        assert_eq!(first.numeric["sick"], 3.0);
        assert_eq!(first.text["comment"], "ok");
    }

    #[test]
    fn empty_values_are_absent_not_zero() {
        let table = read_case_table(SAMPLE.as_bytes()).unwrap();
        assert!(!table.rows[1].text.contains_key("comment"));
    }

    #[test]
    fn coordinates_are_not_data_columns() {
        let table = read_case_table(SAMPLE.as_bytes()).unwrap();
        assert!(!table.numeric_columns.iter().any(|c| c == "x" || c == "y"));
    }

    #[test]
    fn missing_zid_column_is_an_error() {
        let err = read_case_table("date,sick\n1,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CasesError::MissingColumn { ref name } if name == "zid"));
    }

    #[test]
    fn invalid_date_reports_line() {
        let data = "zid,date,sick\n1,April,3\n";
        let err = read_case_table(data.as_bytes()).unwrap_err();
        match err {
            CasesError::InvalidField { column, line, .. } => {
                assert_eq!(column, "date");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn locations_are_distinct_by_zid() {
        let locations = read_locations(SAMPLE.as_bytes()).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].zid, 1);
        assert!((locations[0].latitude() - 55.75).abs() < 1e-9);
        assert!((locations[0].longitude() - 37.61).abs() < 1e-9);
        assert_eq!(locations[1].zid, 2);
    }

    #[test]
    fn locations_require_coordinates() {
        let err = read_locations("zid,date,sick\n1,1,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CasesError::MissingColumn { ref name } if name == "x"));
    }
}
