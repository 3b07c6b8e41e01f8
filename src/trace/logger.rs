use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::trace::trace::TraceEvent;

/// Appends one JSON object per extractor operation to a trace file.
///
/// Shared by every request the extractor serves; a logger without a sink
/// accepts events and drops them.
pub struct TraceLogger {
    sink: Option<TraceSink>,
}

struct TraceSink {
    path: PathBuf,
    writer: Mutex<LineWriter<File>>,
}

impl TraceLogger {
    /// Open (or create) `path` for appending. Falls back to a disabled
    /// logger with a warning when the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                sink: Some(TraceSink {
                    path: path.to_path_buf(),
                    writer: Mutex::new(LineWriter::new(file)),
                }),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn from_path(path: Option<&str>) -> Self {
        path.map_or_else(Self::disabled, Self::new)
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Warning: failed to serialize {} trace event: {}", event.operation, e);
                return;
            }
        };

        // A panic mid-write leaves at worst a torn line; keep tracing.
        let mut writer = sink.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line) {
            eprintln!(
                "Warning: failed to write trace event to '{}': {}",
                sink.path.display(),
                e
            );
        }
    }
}
