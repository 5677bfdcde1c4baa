//! Tabular projection of an array of objects, plus CSV interchange.
//!
//! Spreadsheet import and export both go through [`Table`]: exporting turns
//! an array of objects into rows under the union of their keys, importing
//! turns header-plus-rows text back into an array of objects. The xlsx
//! counterpart of the CSV functions lives in [`crate::sheet`].

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::error::{ExportError, ExportResult};

/// An array of objects laid out as rows and columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    /// Project `value` into a table.
    ///
    /// `value` must be an array whose elements are all objects. Columns are
    /// the union of row keys in first-seen order; a row missing a column
    /// gets an empty cell.
    pub fn from_value(value: &Value) -> ExportResult<Self> {
        let items = value.as_array().ok_or_else(|| {
            ExportError::NotTabular("table view needs an array of objects".into())
        })?;

        let mut headers: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| {
                ExportError::NotTabular(format!("row {index} is not an object"))
            })?;
            for key in object.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
            objects.push(object);
        }

        let rows = objects
            .into_iter()
            .map(|object| headers.iter().map(|h| object.get(h).cloned()).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell as shown in the table view: the JSON text of the value, or
    /// empty when the row has no such key.
    pub fn display_cell(&self, row: usize, column: usize) -> String {
        match self.rows.get(row).and_then(|r| r.get(column)) {
            Some(Some(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    /// Rows in column order; `None` where a row has no such key.
    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    /// RFC 4180 CSV that [`rows_from_csv`] reads back to the same scalars.
    ///
    /// Strings that would otherwise read back as another type are quoted,
    /// `null` is written as `null`, and a missing key is an empty field.
    /// Nested arrays and objects are written as compact JSON text.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, self.headers.iter().map(|h| (h.as_str(), false)));
        for row in &self.rows {
            let cells: Vec<(String, bool)> = row.iter().map(csv_cell).collect();
            write_record(&mut out, cells.iter().map(|(text, quote)| (text.as_str(), *quote)));
        }
        out
    }

    /// Column-aligned plain text, one line per row.
    pub fn to_text(&self) -> String {
        if self.headers.is_empty() {
            return String::from("(no rows)\n");
        }

        let grid: Vec<Vec<String>> = (0..self.rows.len())
            .map(|r| (0..self.headers.len()).map(|c| self.display_cell(r, c)).collect())
            .collect();

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(c, header)| {
                grid.iter()
                    .map(|row| row[c].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        push_line(&mut out, self.headers.iter().map(String::as_str), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        for row in &grid {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }
        out
    }
}

/// A CSV field and whether it must be quoted regardless of content.
///
/// Unquoted fields are read back as JSON literals where possible, so a
/// string that would read back as a number, boolean or `null` is always
/// quoted. `null` is written as the bare word and a missing key as an empty
/// field.
fn csv_cell(cell: &Option<Value>) -> (String, bool) {
    match cell {
        None => (String::new(), false),
        Some(Value::String(s)) => (s.clone(), s.is_empty() || reads_as_literal(s)),
        Some(other) => (other.to_string(), false),
    }
}

fn reads_as_literal(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = (&'a str, bool)>) {
    for (i, (field, force_quote)) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if force_quote || field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (cell, width) in cells.zip(widths) {
        if !line.is_empty() {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read CSV text into an array of objects.
///
/// The first record is the header row. Each following record becomes an
/// object keyed by header. Quoted fields are always strings. An unquoted
/// field that parses as a JSON literal (number, boolean, `null`, or a
/// bracketed value) takes that type, an empty unquoted field is omitted,
/// and anything else is a string. Records with no fields left are skipped.
pub fn rows_from_csv(text: &str) -> ExportResult<Value> {
    let mut records = parse_csv(text)?.into_iter();
    let Some((_, header_fields)) = records.next() else {
        return Ok(Value::Array(Vec::new()));
    };
    let headers: Vec<String> = header_fields.into_iter().map(|f| f.text).collect();
    check_headers(&headers)?;

    let mut rows = Vec::new();
    for (line, record) in records {
        if record.len() > headers.len() {
            return Err(ExportError::MalformedCsv {
                line,
                message: format!(
                    "{} fields but only {} headers",
                    record.len(),
                    headers.len()
                ),
            });
        }
        let mut object = Map::new();
        for (header, field) in headers.iter().zip(record) {
            if let Some(value) = field.into_value() {
                object.insert(header.clone(), value);
            }
        }
        if !object.is_empty() {
            rows.push(Value::Object(object));
        }
    }
    Ok(Value::Array(rows))
}

/// Rows are keyed by header, so a repeated header would shadow a column.
pub(crate) fn check_headers(headers: &[String]) -> ExportResult<()> {
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(ExportError::DuplicateHeader(header.clone()));
        }
    }
    Ok(())
}

/// One parsed CSV field.
#[derive(Debug, Default, PartialEq, Eq)]
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    fn into_value(self) -> Option<Value> {
        if self.quoted {
            return Some(Value::String(self.text));
        }
        if self.text.is_empty() {
            return None;
        }
        match serde_json::from_str(&self.text) {
            Ok(value) => Some(value),
            Err(_) => Some(Value::String(self.text)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    Outside,
    Inside,
    Closed,
}

/// Split CSV text into records, each tagged with its starting line number.
fn parse_csv(text: &str) -> ExportResult<Vec<(usize, Vec<Field>)>> {
    let mut records = Vec::new();
    let mut record: Vec<Field> = Vec::new();
    let mut field = Field::default();
    let mut quote = Quote::Outside;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Inside => match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.text.push('"');
                }
                '"' => quote = Quote::Closed,
                '\n' => {
                    line += 1;
                    field.text.push(c);
                }
                _ => field.text.push(c),
            },
            Quote::Outside | Quote::Closed => match c {
                ',' => {
                    record.push(std::mem::take(&mut field));
                    quote = Quote::Outside;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' | '\r' => {
                    record.push(std::mem::take(&mut field));
                    records.push((record_line, std::mem::take(&mut record)));
                    quote = Quote::Outside;
                    line += 1;
                    record_line = line;
                }
                _ if quote == Quote::Closed => {
                    return Err(ExportError::MalformedCsv {
                        line,
                        message: "text after a closing quote".into(),
                    })
                }
                '"' if field.text.is_empty() => {
                    field.quoted = true;
                    quote = Quote::Inside;
                }
                '"' => {
                    return Err(ExportError::MalformedCsv {
                        line,
                        message: "quote inside an unquoted field".into(),
                    })
                }
                _ => field.text.push(c),
            },
        }
    }

    if quote == Quote::Inside {
        return Err(ExportError::MalformedCsv {
            line: record_line,
            message: "unterminated quoted field".into(),
        });
    }
    if field.quoted || !field.text.is_empty() || !record.is_empty() {
        record.push(field);
        records.push((record_line, record));
    }
    Ok(records)
}
