//! Lossless JSON serialization of merge results.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Default file name for a downloaded merge result.
pub const DEFAULT_OUTPUT_NAME: &str = "merged_json_output.json";

/// Two-space indented JSON. Key order, numbers and strings are preserved.
pub fn to_pretty_json(value: &Value) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_compact_json(value: &Value) -> ExportResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Write `value` as pretty JSON with a trailing newline.
pub fn write_json_file(path: &Path, value: &Value) -> ExportResult<()> {
    let mut text = to_pretty_json(value)?;
    text.push('\n');
    fs::write(path, &text).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "wrote JSON output");
    Ok(())
}
