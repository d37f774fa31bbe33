//! Output formatters for conversion progress

use anyhow::Result;
use colored::*;
use serde::Serialize;
use sheetpivot_core::{ConvertError, ProgressEvent, ProgressSink, Severity, WriteResult};
use std::path::{Path, PathBuf};

/// Prints each progress event as it arrives, colored by severity
pub struct HumanSink;

impl ProgressSink for HumanSink {
    fn emit(&mut self, event: &ProgressEvent) {
        let line = event.to_string();
        match event.severity() {
            Severity::Info => println!("{}", line),
            Severity::Warning => println!("{}", line.yellow()),
            Severity::Error => eprintln!("{}", line.red().bold()),
        }
    }
}

pub fn print_human_summary(outcome: &std::result::Result<WriteResult, ConvertError>) {
    match outcome {
        Ok(result) => {
            println!();
            println!(
                "{} {}",
                "✓ Converted".green().bold(),
                result.destination.display().to_string().cyan()
            );
        }
        Err(e) => {
            if let Some(source) = std::error::Error::source(e) {
                eprintln!("  {} {}", "caused by:".dimmed(), source);
            }
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a Path,
    output: Option<&'a PathBuf>,
    data_rows: Option<usize>,
    total_rows: Option<usize>,
    columns: Option<usize>,
    events: Vec<String>,
    error: Option<String>,
}

/// Print the whole conversion as a single JSON object
pub fn print_json(
    input: &Path,
    outcome: &std::result::Result<WriteResult, ConvertError>,
    events: Vec<String>,
) -> Result<()> {
    let result = outcome.as_ref().ok();
    let report = JsonReport {
        input,
        output: result.map(|r| &r.destination),
        data_rows: result.map(|r| r.data_rows),
        total_rows: result.map(|r| r.total_rows),
        columns: result.map(|r| r.columns),
        events,
        error: outcome.as_ref().err().map(|e| e.to_string()),
    };

    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}
