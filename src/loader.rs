//! Dataset loading with extension-based format dispatch.
//!
//! `.csv`/`.tsv` sources go through the `csv` crate; anything else is treated
//! as a spreadsheet and read with `calamine`. Rows are head-truncated to the
//! caller's cap so exploratory queries never pull an entire workbook into
//! memory.

use std::{env, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use log::debug;

use crate::{data::Value, error::AnalysisError, io_utils, table::Table};

/// Upper bound on rows read at the analyze/export entry points; the caller's
/// `top` applies to the filtered result, not the load.
pub const LOAD_CEILING: usize = 50_000;

const SAMPLE_DATA_ENV: &str = "REALTY_SAMPLE_DATA";

/// Location of the built-in sample dataset, overridable for deployments
/// where the manifest directory is not shipped.
pub fn sample_data_path() -> PathBuf {
    env::var_os(SAMPLE_DATA_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("sample_data")
                .join("dataset.csv")
        })
}

pub fn load_table(source: Option<&Path>, top: usize) -> Result<Table, AnalysisError> {
    let path = match source {
        Some(path) => path.to_path_buf(),
        None => sample_data_path(),
    };
    if !path.is_file() {
        return Err(AnalysisError::DataUnavailable(format!(
            "no dataset at {}",
            path.display()
        )));
    }
    debug!("Loading dataset from {:?} (cap {top} rows)", path);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let table = match extension.as_deref() {
        Some("csv") | Some("tsv") => read_delimited(&path, top),
        _ => read_spreadsheet(&path, top),
    }
    .map_err(AnalysisError::LoadFailure)?;
    debug!(
        "Loaded {} row(s) across {} column(s)",
        table.len(),
        table.columns.len()
    );
    Ok(table)
}

fn read_delimited(path: &Path, top: usize) -> Result<Table> {
    let delimiter = io_utils::resolve_input_delimiter(path);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = reader
        .headers()
        .with_context(|| format!("Reading headers from {path:?}"))?
        .iter()
        .enumerate()
        .map(|(idx, name)| header_name(name, idx))
        .collect::<Vec<_>>();
    let mut table = Table::new(headers);

    for (row_idx, record) in reader.records().enumerate() {
        if row_idx >= top {
            break;
        }
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let row = record.iter().map(Value::from_raw).collect();
        table.push_row(row);
    }
    Ok(table)
}

fn read_spreadsheet(path: &Path, top: usize) -> Result<Table> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook {path:?} has no worksheets"))?
        .with_context(|| format!("Reading first worksheet of {path:?}"))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header_row| {
            header_row
                .iter()
                .enumerate()
                .map(|(idx, cell)| header_name(&cell.to_string(), idx))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let mut table = Table::new(headers);

    for row in rows.take(top) {
        let converted = row.iter().map(cell_value).collect();
        table.push_row(converted);
    }
    Ok(table)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Str(b.to_string()),
        Data::String(s) => Value::from_raw(s),
        Data::DateTime(dt) => Value::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Str(s.clone()),
    }
}

fn header_name(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create csv");
        file.write_all(contents.as_bytes()).expect("write csv");
        path
    }

    #[test]
    fn missing_source_is_data_unavailable() {
        let err = load_table(Some(Path::new("/nonexistent/data.csv")), 10).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable(_)));
    }

    #[test]
    fn csv_rows_are_typed_and_head_truncated() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_csv(
            &dir,
            "data.csv",
            "Final Location,year,price\nWakad,2022,8500\nBaner,2023,9100.5\nAundh,2024,\n",
        );
        let table = load_table(Some(&path), 2).expect("load");
        assert_eq!(table.columns, vec!["Final Location", "year", "price"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], Value::Int(2022));
        assert_eq!(table.rows[1][2], Value::Float(9100.5));
    }

    #[test]
    fn blank_headers_get_synthetic_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_csv(&dir, "data.csv", "a,,c\n1,2,3\n");
        let table = load_table(Some(&path), 10).expect("load");
        assert_eq!(table.columns[1], "column_2");
    }
}
