//! xlsx interchange for [`Table`].
//!
//! A worksheet keeps cell types, so strings, numbers and booleans survive a
//! round trip without the quoting rules CSV needs. Two things do not:
//! `null` and a missing key are both an empty cell, and nested arrays and
//! objects are stored as their compact JSON text. Numbers are stored as
//! IEEE doubles, so whole-valued floats read back as integers and integers
//! beyond 2^53 are stored as text.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{ExportError, ExportResult};
use crate::table::{check_headers, Table};

/// File name offered for a worksheet download.
pub const DEFAULT_XLSX_NAME: &str = "formatted_json.xlsx";

const SHEET_NAME: &str = "merged";

/// Largest integer an xlsx number cell holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Table {
    /// The table as an xlsx workbook held in memory.
    pub fn to_xlsx(&self) -> ExportResult<Vec<u8>> {
        let mut workbook = self.workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Write the table as an xlsx workbook at `path`.
    pub fn write_xlsx(&self, path: &Path) -> ExportResult<()> {
        let mut workbook = self.workbook()?;
        workbook.save(path)?;
        debug!(
            path = %path.display(),
            rows = self.row_count(),
            columns = self.headers().len(),
            "wrote workbook"
        );
        Ok(())
    }

    fn workbook(&self) -> ExportResult<Workbook> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (c, header) in self.headers().iter().enumerate() {
            sheet.write_string(0, column_index(c)?, header.as_str())?;
        }
        for (r, row) in self.rows().iter().enumerate() {
            let row_index = row_index(r + 1)?;
            for (c, cell) in row.iter().enumerate() {
                if let Some(value) = cell {
                    write_cell(sheet, row_index, column_index(c)?, value)?;
                }
            }
        }
        Ok(workbook)
    }
}

fn row_index(row: usize) -> ExportResult<u32> {
    u32::try_from(row).map_err(|_| ExportError::SheetBounds(format!("{row} rows")))
}

fn column_index(column: usize) -> ExportResult<u16> {
    u16::try_from(column).map_err(|_| ExportError::SheetBounds(format!("{column} columns")))
}

fn write_cell(sheet: &mut Worksheet, row: u32, column: u16, value: &Value) -> ExportResult<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            sheet.write_boolean(row, column, *b)?;
        }
        Value::Number(n) => match exact_f64(n) {
            Some(f) => {
                sheet.write_number(row, column, f)?;
            }
            None => {
                sheet.write_string(row, column, n.to_string())?;
            }
        },
        Value::String(s) => {
            sheet.write_string(row, column, s.as_str())?;
        }
        nested => {
            sheet.write_string(row, column, nested.to_string())?;
        }
    }
    Ok(())
}

/// `n` as a double, or `None` when the conversion would change its value.
fn exact_f64(n: &Number) -> Option<f64> {
    if let Some(i) = n.as_i64() {
        return (i.unsigned_abs() as f64 <= MAX_EXACT_INTEGER).then_some(i as f64);
    }
    if let Some(u) = n.as_u64() {
        return (u as f64 <= MAX_EXACT_INTEGER).then_some(u as f64);
    }
    n.as_f64()
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read the first worksheet of an xlsx, xls or ods file into an array of
/// objects.
///
/// The first non-empty row is the header row. Empty cells are omitted and
/// rows with no cells left are skipped, matching [`crate::rows_from_csv`].
pub fn rows_from_xlsx(path: &Path) -> ExportResult<Value> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Value::Array(Vec::new())),
    };

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Ok(Value::Array(Vec::new()));
    };
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
    check_headers(&headers)?;

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let object: Map<String, Value> = headers
            .iter()
            .zip(sheet_row)
            .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
            .collect();
        if !object.is_empty() {
            rows.push(Value::Object(object));
        }
    }
    debug!(path = %path.display(), rows = rows.len(), "read workbook");
    Ok(Value::Array(rows))
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(float_value(*f)),
        Data::String(s) => Some(Value::String(s.clone())),
        other => Some(Value::String(other.to_string())),
    }
}

fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip(value: &Value) -> Value {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_XLSX_NAME);
        Table::from_value(value).unwrap().write_xlsx(&path).unwrap();
        rows_from_xlsx(&path).unwrap()
    }

    #[test]
    fn cells_keep_their_types() {
        let original = json!([
            {"id": "42", "flag": "true", "n": 7, "ok": false, "ratio": 1.5, "s": "x"},
            {"s": "y"},
        ]);
        assert_eq!(round_trip(&original), original);
    }

    #[test]
    fn null_and_nested_values() {
        let value = json!([
            {"name": "a", "gone": null, "tags": ["x", "y"], "meta": {"k": 1}},
        ]);
        assert_eq!(
            round_trip(&value),
            json!([{"name": "a", "tags": "[\"x\",\"y\"]", "meta": "{\"k\":1}"}])
        );
    }

    #[test]
    fn large_integers_are_kept_as_text() {
        let value = json!([{"big": 9_007_199_254_740_993u64, "neg": -12}]);
        assert_eq!(
            round_trip(&value),
            json!([{"big": "9007199254740993", "neg": -12}])
        );
    }

    #[test]
    fn workbook_bytes_are_a_zip_container() {
        let table = Table::from_value(&json!([{"a": 1}])).unwrap();
        let bytes = table.to_xlsx().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_table_reads_back_empty() {
        assert_eq!(round_trip(&json!([])), json!([]));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = rows_from_xlsx(&dir.path().join("absent.xlsx")).unwrap_err();
        assert!(matches!(err, ExportError::Workbook(_)));
    }

    #[test]
    fn exact_doubles() {
        assert_eq!(exact_f64(&Number::from(3)), Some(3.0));
        assert_eq!(exact_f64(&Number::from(u64::MAX)), None);
        assert_eq!(exact_f64(&Number::from(i64::MIN)), None);
    }
}
