use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use meld_export::{
    render, rows_from_csv, rows_from_xlsx, write_json_file, RenderOptions, Table, DEFAULT_XLSX_NAME,
};
use meld_gate::{Denial, GateConfig, GateOutcome, MergeGate, MergeRequest, UsageReport};
use meld_ingest::{collect_json_files, load_files, DocumentSet};
use meld_merge::{MergeReport, Merger, Resolution};
use meld_server::{MeldServer, ServerConfig};
use meld_types::{ContentDigest, MergePolicy};
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, format),
        Command::Format(args) => cmd_format(args),
        Command::Export(args) => cmd_export(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

/// A finished merge, before it is printed or written.
#[derive(Debug)]
struct Merged {
    set: DocumentSet,
    value: Value,
    report: MergeReport,
    digest: ContentDigest,
}

fn input_paths(args: &MergeArgs) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = args.files.clone();
    if let Some(dir) = &args.dir {
        let found = collect_json_files(dir)
            .with_context(|| format!("scanning {}", dir.display()))?;
        paths.extend(found);
    }
    Ok(paths)
}

fn merge_files(args: &MergeArgs) -> anyhow::Result<Merged> {
    let paths = input_paths(args)?;
    let set = load_files(&paths)?;

    let gate = MergeGate::with_default_stages(GateConfig::from_megabytes(
        args.limit_mb,
        args.used_mb,
    )?);
    let verdict = gate.evaluate(&MergeRequest::new(set.len(), set.total_size()))?;
    if let GateOutcome::Denied(denial) = verdict.outcome {
        match denial {
            Denial::LimitExceeded(usage) => bail!(upgrade_message(&usage)),
            Denial::Rejected { reason, .. } => bail!(reason),
        }
    }

    let policy = if args.no_override {
        MergePolicy::Preserve
    } else {
        MergePolicy::Override
    };
    let (value, report) = Merger::new(policy).merge_with_report(set.values())?;
    let digest = ContentDigest::of_value(&value)?;
    tracing::debug!(documents = set.len(), digest = %digest.short_hex(), "merge complete");
    Ok(Merged {
        set,
        value,
        report,
        digest,
    })
}

fn upgrade_message(usage: &UsageReport) -> String {
    format!(
        "this merge needs {} but your plan allows {} ({} already used, {} attempted). \
         Upgrade your plan to merge larger documents.",
        usage.total(),
        usage.limit,
        usage.used,
        usage.attempted
    )
}

fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let merged = merge_files(&args)?;

    if let Some(path) = &args.output {
        write_json_file(path, &merged.value)?;
    }

    match format {
        OutputFormat::Json => {
            let mut out = json!({
                "documents": merged.set.names().collect::<Vec<_>>(),
                "policy": merged.report.policy,
                "digest": merged.digest.to_hex(),
            });
            if args.output.is_none() {
                out["merged"] = merged.value.clone();
            }
            if args.report {
                out["report"] = serde_json::to_value(&merged.report)?;
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            match &args.output {
                Some(path) => println!(
                    "{} Merged {} documents into {}",
                    "✓".green().bold(),
                    merged.set.len().to_string().bold(),
                    path.display().to_string().bold()
                ),
                None => println!("{}", meld_export::to_pretty_json(&merged.value)?),
            }
            if args.report {
                print_report(&merged.report);
            }
            eprintln!(
                "  {} {} ({})",
                "digest:".dimmed(),
                merged.digest.short_hex().cyan(),
                merged.report.policy
            );
        }
    }
    Ok(())
}

fn print_report(report: &MergeReport) {
    if report.is_clean() {
        eprintln!("{} No conflicting leaves.", "✓".green());
        return;
    }
    eprintln!(
        "{} conflicts ({} type mismatches):",
        report.conflict_count().to_string().yellow().bold(),
        report.type_mismatches()
    );
    for conflict in &report.conflicts {
        let outcome = match conflict.resolution {
            Resolution::TookLater => "took later".yellow(),
            Resolution::KeptEarlier => "kept earlier".green(),
        };
        let path = if conflict.path.is_empty() {
            "(root)"
        } else {
            conflict.path.as_str()
        };
        eprintln!(
            "  {} {} -> {} in document {}: {}",
            path.bold(),
            conflict.earlier,
            conflict.later,
            conflict.document,
            outcome
        );
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    match extension(path).as_deref() {
        Some("xlsx" | "xlsm" | "xls" | "ods") => Ok(rows_from_xlsx(path)?),
        Some("csv") => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(rows_from_csv(&text)?)
        }
        _ => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))
        }
    }
}

fn cmd_format(args: FormatArgs) -> anyhow::Result<()> {
    let value = read_document(&args.file)?;
    let options = RenderOptions {
        mode: args.view,
        collapse_depth: args.depth,
    };
    print!("{}", render(&value, options)?);
    Ok(())
}

fn sheet_format(args: &ExportArgs) -> SheetFormat {
    if let Some(sheet) = args.sheet {
        return sheet;
    }
    match args.output.as_deref().and_then(extension).as_deref() {
        Some("csv") => SheetFormat::Csv,
        _ => SheetFormat::Xlsx,
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let value = read_document(&args.file)?;
    let table = Table::from_value(&value)?;
    let written = match (sheet_format(&args), &args.output) {
        (SheetFormat::Csv, None) => {
            print!("{}", table.to_csv());
            return Ok(());
        }
        (SheetFormat::Csv, Some(path)) => {
            fs::write(path, table.to_csv())
                .with_context(|| format!("writing {}", path.display()))?;
            path.clone()
        }
        (SheetFormat::Xlsx, output) => {
            let path = output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_XLSX_NAME));
            table.write_xlsx(&path)?;
            path
        }
    };
    println!(
        "{} Exported {} rows to {}",
        "✓".green().bold(),
        table.row_count(),
        written.display().to_string().bold()
    );
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    println!("meld server on {}", config.bind_addr.to_string().bold());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(MeldServer::new(config).serve())?;
    Ok(())
}
