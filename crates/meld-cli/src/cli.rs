use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use meld_export::ViewMode;

#[derive(Parser)]
#[command(
    name = "meld",
    about = "JSON Meld: deep-merge JSON documents with an override or preserve policy",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deep-merge two or more JSON documents in the order given
    Merge(MergeArgs),
    /// Show a JSON or CSV document as a tree, table, or text
    Format(FormatArgs),
    /// Convert an array of JSON objects to an xlsx or CSV spreadsheet
    Export(ExportArgs),
    /// Start the HTTP merge service
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Documents to merge; later files take precedence under override
    pub files: Vec<PathBuf>,
    /// Also merge every *.json file under this directory (sorted by path)
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Keep the first value seen for conflicting keys
    #[arg(long)]
    pub no_override: bool,
    /// Write the merged document to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Plan limit in megabytes
    #[arg(long, default_value_t = meld_gate::DEFAULT_LIMIT_MB)]
    pub limit_mb: f64,
    /// Storage already used in megabytes
    #[arg(long, default_value_t = 0.0)]
    pub used_mb: f64,
    /// Print every leaf conflict and how it was resolved
    #[arg(long)]
    pub report: bool,
}

#[derive(Args)]
pub struct FormatArgs {
    /// A .json file, or a spreadsheet (.xlsx, .xls, .ods, .csv) read as rows
    pub file: PathBuf,
    #[arg(long, default_value_t = ViewMode::Tree)]
    pub view: ViewMode,
    /// Tree depth beyond which containers are collapsed
    #[arg(long, default_value_t = meld_export::DEFAULT_COLLAPSE_DEPTH)]
    pub depth: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

#[derive(Args)]
pub struct ExportArgs {
    pub file: PathBuf,
    /// Destination file. CSV goes to stdout when omitted; xlsx goes to
    /// formatted_json.xlsx
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Spreadsheet format; inferred from the output extension, else xlsx
    #[arg(long = "to", value_enum)]
    pub sheet: Option<SheetFormat>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// TOML server configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
}
