// SPDX-License-Identifier: PMPL-1.0-or-later

//! vracer CLI: a thin driver over the `vracer` library — file discovery,
//! per-file parallel dispatch, and text/JSON result formatting. All HDL
//! semantics live in the library; this binary never re-implements them.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vracer::{build_design_from_path, detect_races, diagnostics, DetectOptions, Diagnostic, RaceRecord, VracerError};

macro_rules! qprintln {
    ($quiet:expr, $($arg:tt)+) => {
        if !$quiet {
            println!($($arg)+);
        }
    };
}

#[derive(Parser)]
#[command(name = "vracer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Static race-hazard detection for Verilog / Verilog-AMS")]
struct Cli {
    /// Verilog/Verilog-AMS source files, or directories to scan for them
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Disable Write-Write detection
    #[arg(long)]
    no_ww: bool,

    /// Disable Read-Write detection
    #[arg(long)]
    no_rw: bool,

    /// Disable Trigger detection
    #[arg(long)]
    no_tr: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Suppress the per-file summary banner
    #[arg(short, long)]
    quiet: bool,

    /// Print diagnostics even when a file has none
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

struct FileOutcome {
    path: PathBuf,
    result: Result<(Vec<RaceRecord>, Vec<Diagnostic>), VracerError>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "[ERR]".red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let options = DetectOptions {
        enable_ww: !cli.no_ww,
        enable_rw: !cli.no_rw,
        enable_tr: !cli.no_tr,
    };

    let targets = collect_source_files(&cli.files).context("collecting source files")?;
    if targets.is_empty() {
        qprintln!(cli.quiet, "no Verilog source files found");
        return Ok(ExitCode::SUCCESS);
    }

    let outcomes: Vec<FileOutcome> = targets
        .par_iter()
        .map(|path| {
            let result = build_design_from_path(path)
                .map(|(design, diags)| (detect_races(&design, options), diags));
            FileOutcome { path: path.clone(), result }
        })
        .collect();

    let mut fatal = false;
    let mut all_records: Vec<(PathBuf, RaceRecord)> = Vec::new();

    for outcome in &outcomes {
        let path_str = outcome.path.display().to_string();
        match &outcome.result {
            Ok((records, diags)) => {
                if cli.verbose || !diags.is_empty() {
                    diagnostics::print_diagnostics(&path_str, diags);
                }
                for record in records {
                    all_records.push((outcome.path.clone(), record.clone()));
                }
            }
            Err(err) => {
                diagnostics::print_fatal(&path_str, err);
                fatal = true;
            }
        }
    }

    match cli.format {
        OutputFormat::Text => print_text(&cli, &all_records),
        OutputFormat::Json => print_json(&all_records)?,
    }

    Ok(if fatal { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn print_text(cli: &Cli, records: &[(PathBuf, RaceRecord)]) {
    qprintln!(cli.quiet, "vracer: {} hazard(s) found", records.len());
    for (path, record) in records {
        println!(
            "{} {}: {} target={} source={} [{} <-> {}]",
            record.kind.to_string().bold(),
            path.display(),
            record.process_a,
            record.target_signal,
            record.source_signal,
            record.anchor_a,
            record.anchor_b,
        );
    }
}

fn print_json(records: &[(PathBuf, RaceRecord)]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct Entry<'a> {
        file: String,
        #[serde(flatten)]
        record: &'a RaceRecord,
    }
    let entries: Vec<Entry> = records
        .iter()
        .map(|(path, record)| Entry { file: path.display().to_string(), record })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Expand CLI arguments into a flat file list: directories are walked for
/// `.v`/`.vams`/`.sv` sources, plain files are passed through unchanged.
fn collect_source_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in walkdir::WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_verilog_source(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    Ok(files)
}

fn is_verilog_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("v") | Some("vams") | Some("va") | Some("sv") | Some("svh")
    )
}
