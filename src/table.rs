//! Row-oriented table owned by a single request's pipeline.
//!
//! Columns are fixed for the lifetime of the table; rows are padded or
//! truncated to the column count on insert so downstream indexing never has
//! to guard against ragged data from well-behaved loaders. The only
//! post-load mutations are the year-column coercions driven by role
//! resolution.

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};

use crate::data::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Same column schema, zero rows. Used when resolution fails so the
    /// payload shape stays consistent even on zero matches.
    pub fn empty_like(&self) -> Table {
        Table::new(self.columns.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn head(&self, top: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(top).cloned().collect(),
        }
    }

    /// Rows where `mask` is true, in original order. The mask must cover
    /// every row; a short or long mask is a caller bug surfaced as an error
    /// rather than a partially filtered table.
    pub fn select_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.rows.len() {
            anyhow::bail!(
                "row mask covers {} row(s) but table has {}",
                mask.len(),
                self.rows.len()
            );
        }
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Rewrites a column in place as integer-or-null years.
    pub fn coerce_column_to_year(&mut self, name: &str) {
        let Some(idx) = self.column_index(name) else {
            return;
        };
        for row in &mut self.rows {
            row[idx] = match row[idx].as_year() {
                Some(year) => Value::Int(year),
                None => Value::Null,
            };
        }
    }

    /// Appends a derived column computed per row from the existing cells.
    pub fn append_column<F>(&mut self, name: &str, mut derive: F)
    where
        F: FnMut(&[Value]) -> Value,
    {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            let derived = derive(row);
            row.push(derived);
        }
    }

    /// First `limit` rows as JSON objects, with nulls rendered as empty
    /// strings for display stability in the payload.
    pub fn to_json_records(&self, limit: usize) -> Vec<Map<String, JsonValue>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, value)| {
                        let rendered = match value {
                            Value::Null => JsonValue::String(String::new()),
                            other => serde_json::to_value(other)
                                .unwrap_or_else(|_| JsonValue::String(other.as_display())),
                        };
                        (name.clone(), rendered)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = crate::io_utils::open_csv_writer(writer);
        csv_writer
            .write_record(&self.columns)
            .context("Writing CSV header")?;
        for (idx, row) in self.rows.iter().enumerate() {
            let record = row.iter().map(Value::as_display).collect::<Vec<_>>();
            csv_writer
                .write_record(&record)
                .with_context(|| format!("Writing CSV row {}", idx + 2))?;
        }
        csv_writer.flush().context("Flushing CSV output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["Final Location".to_string(), "year".to_string()]);
        table.push_row(vec![Value::Str("Wakad".to_string()), Value::Int(2022)]);
        table.push_row(vec![Value::Str("Baner".to_string()), Value::Null]);
        table
    }

    #[test]
    fn push_row_pads_short_rows() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![Value::Int(1)]);
        assert_eq!(table.rows[0], vec![Value::Int(1), Value::Null]);
    }

    #[test]
    fn select_rows_rejects_mismatched_mask() {
        let table = sample_table();
        assert!(table.select_rows(&[true]).is_err());
        let kept = table.select_rows(&[false, true]).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.rows[0][0], Value::Str("Baner".to_string()));
    }

    #[test]
    fn coerce_column_to_year_nulls_unparseable_cells() {
        let mut table = Table::new(vec!["year".to_string()]);
        table.push_row(vec![Value::Str("2021".to_string())]);
        table.push_row(vec![Value::Str("unknown".to_string())]);
        table.coerce_column_to_year("year");
        assert_eq!(table.rows[0][0], Value::Int(2021));
        assert_eq!(table.rows[1][0], Value::Null);
    }

    #[test]
    fn json_records_render_nulls_as_empty_strings() {
        let table = sample_table();
        let records = table.to_json_records(10);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["year"], JsonValue::String(String::new()));
        assert_eq!(records[0]["year"], JsonValue::from(2022));
    }

    #[test]
    fn write_csv_round_trips_display_values() {
        let table = sample_table();
        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("\"Final Location\",\"year\""));
        assert!(text.contains("\"Wakad\",\"2022\""));
        assert!(text.contains("\"Baner\",\"\""));
    }
}
