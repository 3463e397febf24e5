//! Per-file lifecycle tracking and persisted metadata rows

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Lifecycle of one file through an encrypt/decrypt pipeline.
///
/// `Pending → Processing → Completed | Error`; terminal states are never
/// left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// Result data for a completed pipeline.
#[derive(Debug, Clone)]
pub enum Outcome {
    Encrypted {
        /// Local path or remote object key of the container
        locator: String,
        encrypted_filename: String,
        file_size: u64,
    },
    Decrypted {
        /// Filename recovered from the container header
        original_filename: String,
        /// Local path of the recovered file
        locator: String,
        file_size: u64,
    },
}

/// One selected file tracked through a batch. Exists only in memory; it is
/// discarded when the batch result is dropped.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub id: Uuid,
    pub path: PathBuf,
    pub status: FileStatus,
    /// Last reported progress percentage
    pub progress: u8,
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
}

impl ProcessedFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            status: FileStatus::Pending,
            progress: 0,
            outcome: None,
            error: None,
        }
    }
}

/// Metadata row persisted after a successful encrypt-and-persist. A
/// fire-and-forget side effect; not part of the cryptographic contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub original_filename: String,
    pub encrypted_filename: String,
    pub file_size: u64,
    pub storage_path: String,
    /// Unix timestamp (seconds)
    pub created_at: u64,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
