//! Conversion session: select an input, convert, retry on failure

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::pivot::reshape;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::reader::read_table;
use crate::writer::{self, WriteResult, output_path_for};
use std::path::{Path, PathBuf};
use tracing::info_span;

/// Where a session is in the `Idle -> Loaded -> Converted` sequence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loaded { input: PathBuf },
    Converted { input: PathBuf, result: WriteResult },
}

/// Drives conversions for one selected input file.
///
/// A failed conversion leaves the session `Loaded` with the same input so
/// the caller can retry.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: ConverterConfig,
    output: Option<PathBuf>,
    state: SessionState,
}

impl Session {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            output: None,
            state: SessionState::Idle,
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn input(&self) -> Option<&Path> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Loaded { input } | SessionState::Converted { input, .. } => Some(input),
        }
    }

    /// Select the input file. Existence is only checked when converting.
    pub fn select(&mut self, input: impl Into<PathBuf>) {
        self.state = SessionState::Loaded {
            input: input.into(),
        };
    }

    /// Override the derived output path
    pub fn set_output(&mut self, output: Option<PathBuf>) {
        self.output = output;
    }

    /// Destination of the next conversion, if an input is selected
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input()?;
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| output_path_for(input, &self.config.output.suffix)),
        )
    }

    /// Run one conversion of the selected input
    pub fn convert(&mut self, sink: &mut dyn ProgressSink) -> Result<WriteResult> {
        let (Some(input), Some(output)) = (self.input().map(Path::to_path_buf), self.output_path())
        else {
            sink.emit(&ProgressEvent::NoInputSelected);
            return Err(ConvertError::NoInputSelected);
        };

        match convert_file(&input, &output, &self.config, sink) {
            Ok(result) => {
                self.state = SessionState::Converted {
                    input,
                    result: result.clone(),
                };
                Ok(result)
            }
            Err(e) => {
                self.state = SessionState::Loaded { input };
                Err(e)
            }
        }
    }
}

/// Convert `input` into a pivoted workbook at `output`.
///
/// Progress goes to `sink`; a failure is reported there once as an error
/// event and returned.
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
    sink: &mut dyn ProgressSink,
) -> Result<WriteResult> {
    let _span = info_span!("convert", input = %input.display()).entered();

    run(input, output, config, sink).inspect_err(|e| {
        tracing::error!(error = %e, "conversion failed");
        sink.emit(&ProgressEvent::Failed(e.to_string()));
    })
}

fn run(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
    sink: &mut dyn ProgressSink,
) -> Result<WriteResult> {
    config.validate()?;
    sink.emit(&ProgressEvent::Started);

    let raw = read_table(input, config.input_sheet.as_deref())?;
    sink.emit(&ProgressEvent::RowsRead(raw.len()));

    let pivot = reshape(&raw, &config.columns, &config.method_set())?;
    let table = &pivot.table;
    sink.emit(&ProgressEvent::UniqueModels(table.row_count()));

    for dup in &pivot.duplicates {
        sink.emit(&ProgressEvent::DuplicateOverwritten {
            model: dup.model.clone(),
            method: dup.method.clone(),
        });
    }
    if !pivot.ignored_methods.is_empty() {
        sink.emit(&ProgressEvent::MethodsIgnored(pivot.ignored_methods.clone()));
    }
    sink.emit(&ProgressEvent::Processed {
        rows: table.row_count(),
        columns: table.column_count(),
    });

    let result = writer::write(table, output, &config.writer_options())?;
    sink.emit(&ProgressEvent::Saved(result.destination.clone()));
    sink.emit(&ProgressEvent::Completed {
        rows: result.total_rows,
    });

    Ok(result)
}
