//! Append-only CSV history of predictions.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::{AppError, ResultExt};
use crate::models::PredictionLogEntry;
use crate::schema::history_header;

/// Default history file, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "logs_previsoes.csv";

/// Appends prediction rows to a flat CSV file.
///
/// The file is created with a header on first use and only ever appended to
/// afterwards. Appends from one process are serialized; separate processes
/// sharing the same path are not coordinated.
#[derive(Debug)]
pub struct HistoryLogger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one entry, preceded by the header if the file is new or empty.
    pub fn append(&self, entry: &PredictionLogEntry) -> Result<(), AppError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::LoggingFailure("history lock poisoned".to_string()))?;

        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(history_header())?;
            tracing::info!("Created prediction history at {}", self.path.display());
        }
        writer.write_record(entry.to_row())?;
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", self.path.display()))?;

        tracing::debug!(
            "Appended prediction (p={:.4}) to {}",
            entry.probability,
            self.path.display()
        );
        Ok(())
    }
}
