//! Presentation and export for JSON Meld.
//!
//! Everything here treats a merge result as read-only. JSON output is
//! lossless: key order, numbers, strings and nesting come out as they went
//! in. The spreadsheet formats keep scalar types; see [`sheet`] and
//! [`table`] for what a worksheet or CSV file cannot hold.
//!
//! # Key Types
//!
//! - [`ViewMode`] / [`render`] -- Tree, table, and text views
//! - [`Table`] -- Array-of-objects projection with xlsx and CSV export
//! - [`rows_from_xlsx`] / [`rows_from_csv`] -- Spreadsheet import back into
//!   JSON rows

pub mod error;
pub mod json;
pub mod sheet;
pub mod table;
pub mod tree;
pub mod view;

pub use error::{ExportError, ExportResult};
pub use json::{to_compact_json, to_pretty_json, write_json_file, DEFAULT_OUTPUT_NAME};
pub use sheet::{rows_from_xlsx, DEFAULT_XLSX_NAME};
pub use table::{rows_from_csv, Table};
pub use tree::{render_tree, DEFAULT_COLLAPSE_DEPTH};
pub use view::{render, RenderOptions, ViewMode};
