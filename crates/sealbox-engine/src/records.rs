//! Metadata record persistence
//!
//! From the pipeline's point of view this is fire-and-forget: a failed
//! append is logged, never surfaced as a file failure.

use std::io::Write;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};
use crate::record::FileRecord;

pub trait RecordStore: Send + Sync {
    fn append(&self, record: &FileRecord) -> EngineResult<()>;
}

/// Appends one JSON object per line to a local file.
#[derive(Debug, Clone)]
pub struct JsonlRecordStore {
    path: PathBuf,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read back all records (malformed lines are skipped with a warning).
    pub fn load(&self) -> EngineResult<Vec<FileRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(line = idx + 1, error = %e, "skipping malformed record line")
                }
            }
        }
        Ok(records)
    }
}

impl RecordStore for JsonlRecordStore {
    fn append(&self, record: &FileRecord) -> EngineResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line =
            serde_json::to_string(record).map_err(|e| EngineError::Record(e.to_string()))?;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

/// Discards records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecordStore;

impl RecordStore for NoopRecordStore {
    fn append(&self, _record: &FileRecord) -> EngineResult<()> {
        Ok(())
    }
}
