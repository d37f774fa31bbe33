//! Human-readable progress reporting
//!
//! A conversion reports what it is doing as a stream of [`ProgressEvent`]s
//! pushed into a [`ProgressSink`]. The sink decides how to present them; the
//! core never prints.

use std::fmt;
use std::path::PathBuf;

/// How prominently an event should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One status update from a conversion
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started,
    RowsRead(usize),
    UniqueModels(usize),
    DuplicateOverwritten { model: String, method: String },
    MethodsIgnored(Vec<String>),
    Processed { rows: usize, columns: usize },
    Saved(PathBuf),
    /// Total rows in the output sheet, header included
    Completed { rows: usize },
    NoInputSelected,
    Failed(String),
}

impl ProgressEvent {
    pub fn severity(&self) -> Severity {
        match self {
            ProgressEvent::DuplicateOverwritten { .. } | ProgressEvent::MethodsIgnored(_) => {
                Severity::Warning
            }
            ProgressEvent::NoInputSelected | ProgressEvent::Failed(_) => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Started => write!(f, "Starting conversion..."),
            ProgressEvent::RowsRead(n) => write!(f, "Read {} rows from the input file", n),
            ProgressEvent::UniqueModels(n) => write!(f, "Found {} unique model combinations", n),
            ProgressEvent::DuplicateOverwritten { model, method } => write!(
                f,
                "Warning: duplicate entry for model \"{}\" and method \"{}\", keeping the last value",
                model, method
            ),
            ProgressEvent::MethodsIgnored(methods) => {
                write!(f, "Ignoring unrecognized methods: {}", methods.join(", "))
            }
            ProgressEvent::Processed { rows, columns } => {
                write!(f, "Processed data: {} rows, {} columns", rows, columns)
            }
            ProgressEvent::Saved(path) => {
                write!(f, "Converted file saved as: {}", path.display())
            }
            ProgressEvent::Completed { rows } => {
                write!(f, "Conversion complete. Output file has {} rows.", rows)
            }
            ProgressEvent::NoInputSelected => write!(f, "Please select a file first"),
            ProgressEvent::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Receiver of progress events
pub trait ProgressSink {
    fn emit(&mut self, event: &ProgressEvent);
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: &ProgressEvent) {
        self.push(event.clone());
    }
}

impl ProgressSink for Vec<String> {
    fn emit(&mut self, event: &ProgressEvent) {
        self.push(event.to_string());
    }
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(&ProgressEvent)> ProgressSink for FnSink<F> {
    fn emit(&mut self, event: &ProgressEvent) {
        (self.0)(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: &ProgressEvent) {}
}

/// Forwards events to `tracing` at a level matching their severity
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&mut self, event: &ProgressEvent) {
        match event.severity() {
            Severity::Info => tracing::info!("{}", event),
            Severity::Warning => tracing::warn!("{}", event),
            Severity::Error => tracing::error!("{}", event),
        }
    }
}
