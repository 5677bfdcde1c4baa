use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExportError, ExportResult};
use crate::json::to_pretty_json;
use crate::table::Table;
use crate::tree::{render_tree, DEFAULT_COLLAPSE_DEPTH};

/// The three ways a document can be shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Tree,
    Table,
    Text,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tree => "tree",
            Self::Table => "table",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for ViewMode {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(Self::Tree),
            "table" => Ok(Self::Table),
            "text" => Ok(Self::Text),
            other => Err(ExportError::UnknownView(other.to_string())),
        }
    }
}

/// Options for [`render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub mode: ViewMode,
    /// Collapse depth for the tree view.
    pub collapse_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: ViewMode::Tree,
            collapse_depth: DEFAULT_COLLAPSE_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn mode(mode: ViewMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Render `value` for display. Only the table view can fail, when `value`
/// is not an array of objects.
pub fn render(value: &Value, options: RenderOptions) -> ExportResult<String> {
    match options.mode {
        ViewMode::Tree => Ok(render_tree(value, options.collapse_depth)),
        ViewMode::Table => Ok(Table::from_value(value)?.to_text()),
        ViewMode::Text => {
            let mut text = to_pretty_json(value)?;
            text.push('\n');
            Ok(text)
        }
    }
}
